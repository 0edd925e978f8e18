//! Bottom-up rewriting of bound trees. Every method returns its input `Rc`
//! untouched when nothing below it changed, so unchanged subtrees are
//! shared between the old and the new tree.

use crate::bound_tree::{BoundExpression, BoundStatement};
use std::rc::Rc;

pub trait BoundTreeRewriter {
    fn rewrite_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        match node.as_ref() {
            BoundStatement::Block { .. } => self.rewrite_block_statement(node),
            BoundStatement::Expression { .. } => self.rewrite_expression_statement(node),
            BoundStatement::VariableDeclaration { .. } => self.rewrite_variable_declaration(node),
            BoundStatement::If { .. } => self.rewrite_if_statement(node),
            BoundStatement::While { .. } => self.rewrite_while_statement(node),
            BoundStatement::For { .. } => self.rewrite_for_statement(node),
            BoundStatement::Goto { .. } => self.rewrite_goto_statement(node),
            BoundStatement::ConditionalGoto { .. } => self.rewrite_conditional_goto_statement(node),
            BoundStatement::Label { .. } => self.rewrite_label_statement(node),
        }
    }

    fn rewrite_block_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        let BoundStatement::Block { statements } = node.as_ref() else {
            unreachable!("rewrite_block_statement called with {:?}", node.kind());
        };

        let rewritten: Vec<Rc<BoundStatement>> = statements
            .iter()
            .map(|statement| self.rewrite_statement(statement))
            .collect();

        if unchanged(statements, &rewritten) {
            return Rc::clone(node);
        }
        Rc::new(BoundStatement::Block {
            statements: rewritten,
        })
    }

    fn rewrite_expression_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        let BoundStatement::Expression { expression } = node.as_ref() else {
            unreachable!("rewrite_expression_statement called with {:?}", node.kind());
        };

        let rewritten = self.rewrite_expression(expression);
        if Rc::ptr_eq(expression, &rewritten) {
            return Rc::clone(node);
        }
        Rc::new(BoundStatement::Expression {
            expression: rewritten,
        })
    }

    fn rewrite_variable_declaration(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        let BoundStatement::VariableDeclaration {
            variable,
            initializer,
        } = node.as_ref()
        else {
            unreachable!("rewrite_variable_declaration called with {:?}", node.kind());
        };

        let rewritten = self.rewrite_expression(initializer);
        if Rc::ptr_eq(initializer, &rewritten) {
            return Rc::clone(node);
        }
        Rc::new(BoundStatement::VariableDeclaration {
            variable: variable.clone(),
            initializer: rewritten,
        })
    }

    fn rewrite_if_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        let BoundStatement::If {
            condition,
            then_statement,
            else_statement,
        } = node.as_ref()
        else {
            unreachable!("rewrite_if_statement called with {:?}", node.kind());
        };

        let new_condition = self.rewrite_expression(condition);
        let new_then = self.rewrite_statement(then_statement);
        let new_else = else_statement
            .as_ref()
            .map(|statement| self.rewrite_statement(statement));

        let else_unchanged = match (else_statement, &new_else) {
            (Some(old), Some(new)) => Rc::ptr_eq(old, new),
            (None, None) => true,
            _ => false,
        };
        if Rc::ptr_eq(condition, &new_condition) && Rc::ptr_eq(then_statement, &new_then) && else_unchanged {
            return Rc::clone(node);
        }
        Rc::new(BoundStatement::If {
            condition: new_condition,
            then_statement: new_then,
            else_statement: new_else,
        })
    }

    fn rewrite_while_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        let BoundStatement::While { condition, body } = node.as_ref() else {
            unreachable!("rewrite_while_statement called with {:?}", node.kind());
        };

        let new_condition = self.rewrite_expression(condition);
        let new_body = self.rewrite_statement(body);
        if Rc::ptr_eq(condition, &new_condition) && Rc::ptr_eq(body, &new_body) {
            return Rc::clone(node);
        }
        Rc::new(BoundStatement::While {
            condition: new_condition,
            body: new_body,
        })
    }

    fn rewrite_for_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        let BoundStatement::For {
            variable,
            lower_bound,
            upper_bound,
            body,
            span,
        } = node.as_ref()
        else {
            unreachable!("rewrite_for_statement called with {:?}", node.kind());
        };

        let new_lower = self.rewrite_expression(lower_bound);
        let new_upper = self.rewrite_expression(upper_bound);
        let new_body = self.rewrite_statement(body);
        if Rc::ptr_eq(lower_bound, &new_lower)
            && Rc::ptr_eq(upper_bound, &new_upper)
            && Rc::ptr_eq(body, &new_body)
        {
            return Rc::clone(node);
        }
        Rc::new(BoundStatement::For {
            variable: variable.clone(),
            lower_bound: new_lower,
            upper_bound: new_upper,
            body: new_body,
            span: *span,
        })
    }

    fn rewrite_goto_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        Rc::clone(node)
    }

    fn rewrite_conditional_goto_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        let BoundStatement::ConditionalGoto {
            label,
            condition,
            jump_if_true,
        } = node.as_ref()
        else {
            unreachable!("rewrite_conditional_goto_statement called with {:?}", node.kind());
        };

        let new_condition = self.rewrite_expression(condition);
        if Rc::ptr_eq(condition, &new_condition) {
            return Rc::clone(node);
        }
        Rc::new(BoundStatement::ConditionalGoto {
            label: *label,
            condition: new_condition,
            jump_if_true: *jump_if_true,
        })
    }

    fn rewrite_label_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        Rc::clone(node)
    }

    fn rewrite_expression(&mut self, node: &Rc<BoundExpression>) -> Rc<BoundExpression> {
        match node.as_ref() {
            BoundExpression::Error
            | BoundExpression::Literal { .. }
            | BoundExpression::Variable { .. } => Rc::clone(node),
            BoundExpression::Assignment {
                variable,
                expression,
            } => {
                let rewritten = self.rewrite_expression(expression);
                if Rc::ptr_eq(expression, &rewritten) {
                    return Rc::clone(node);
                }
                Rc::new(BoundExpression::Assignment {
                    variable: variable.clone(),
                    expression: rewritten,
                })
            }
            BoundExpression::Unary {
                operator,
                operand,
                span,
            } => {
                let rewritten = self.rewrite_expression(operand);
                if Rc::ptr_eq(operand, &rewritten) {
                    return Rc::clone(node);
                }
                Rc::new(BoundExpression::Unary {
                    operator: *operator,
                    operand: rewritten,
                    span: *span,
                })
            }
            BoundExpression::Binary {
                left,
                operator,
                right,
                span,
            } => {
                let new_left = self.rewrite_expression(left);
                let new_right = self.rewrite_expression(right);
                if Rc::ptr_eq(left, &new_left) && Rc::ptr_eq(right, &new_right) {
                    return Rc::clone(node);
                }
                Rc::new(BoundExpression::Binary {
                    left: new_left,
                    operator: *operator,
                    right: new_right,
                    span: *span,
                })
            }
            BoundExpression::Call {
                function,
                arguments,
            } => {
                let rewritten: Vec<Rc<BoundExpression>> = arguments
                    .iter()
                    .map(|argument| self.rewrite_expression(argument))
                    .collect();
                if unchanged(arguments, &rewritten) {
                    return Rc::clone(node);
                }
                Rc::new(BoundExpression::Call {
                    function: *function,
                    arguments: rewritten,
                })
            }
            BoundExpression::Conversion { ty, expression } => {
                let rewritten = self.rewrite_expression(expression);
                if Rc::ptr_eq(expression, &rewritten) {
                    return Rc::clone(node);
                }
                Rc::new(BoundExpression::Conversion {
                    ty: *ty,
                    expression: rewritten,
                })
            }
        }
    }
}

fn unchanged<T>(old: &[Rc<T>], new: &[Rc<T>]) -> bool {
    old.len() == new.len() && old.iter().zip(new).all(|(a, b)| Rc::ptr_eq(a, b))
}
