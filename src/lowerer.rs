use crate::bound_tree::{BoundBlock, BoundExpression, BoundStatement};
use crate::lexer::TokenType;
use crate::operators::BoundBinaryOperator;
use crate::rewriter::BoundTreeRewriter;
use crate::symbols::{LabelSymbol, TypeSymbol};
use crate::value::Value;
use std::rc::Rc;

/// Rewrites structured control flow into labels and gotos.
pub struct Lowerer {
    label_count: usize,
}

impl Lowerer {
    fn new() -> Self {
        Self { label_count: 0 }
    }

    fn generate_label(&mut self) -> LabelSymbol {
        self.label_count += 1;
        LabelSymbol(self.label_count)
    }
}

/// Lowers `statement` and flattens the result into the form the evaluator runs.
pub fn lower(statement: &Rc<BoundStatement>) -> BoundBlock {
    let mut lowerer = Lowerer::new();
    let result = lowerer.rewrite_statement(statement);
    let block = flatten(result);

    tracing::debug!(
        statements = block.statements.len(),
        labels = lowerer.label_count,
        "lowered program"
    );

    block
}

fn flatten(statement: Rc<BoundStatement>) -> BoundBlock {
    let mut statements = Vec::new();
    let mut stack = vec![statement];

    while let Some(current) = stack.pop() {
        if let BoundStatement::Block { statements: children } = current.as_ref() {
            for child in children.iter().rev() {
                stack.push(Rc::clone(child));
            }
        } else {
            statements.push(current);
        }
    }

    BoundBlock { statements }
}

fn block(statements: Vec<BoundStatement>) -> Rc<BoundStatement> {
    Rc::new(BoundStatement::Block {
        statements: statements.into_iter().map(Rc::new).collect(),
    })
}

impl BoundTreeRewriter for Lowerer {
    fn rewrite_if_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        let BoundStatement::If {
            condition,
            then_statement,
            else_statement,
        } = node.as_ref()
        else {
            unreachable!("rewrite_if_statement called with {:?}", node.kind());
        };

        let result = match else_statement {
            // gotoFalse <condition> end
            // <then>
            // end:
            None => {
                let end_label = self.generate_label();
                Rc::new(BoundStatement::Block {
                    statements: vec![
                        Rc::new(BoundStatement::ConditionalGoto {
                            label: end_label,
                            condition: Rc::clone(condition),
                            jump_if_true: false,
                        }),
                        Rc::clone(then_statement),
                        Rc::new(BoundStatement::Label { label: end_label }),
                    ],
                })
            }
            // gotoFalse <condition> else
            // <then>
            // goto end
            // else:
            // <else>
            // end:
            Some(else_statement) => {
                let else_label = self.generate_label();
                let end_label = self.generate_label();
                Rc::new(BoundStatement::Block {
                    statements: vec![
                        Rc::new(BoundStatement::ConditionalGoto {
                            label: else_label,
                            condition: Rc::clone(condition),
                            jump_if_true: false,
                        }),
                        Rc::clone(then_statement),
                        Rc::new(BoundStatement::Goto { label: end_label }),
                        Rc::new(BoundStatement::Label { label: else_label }),
                        Rc::clone(else_statement),
                        Rc::new(BoundStatement::Label { label: end_label }),
                    ],
                })
            }
        };

        self.rewrite_statement(&result)
    }

    // goto check
    // continue:
    // <body>
    // check:
    // gotoTrue <condition> continue
    // end:
    fn rewrite_while_statement(&mut self, node: &Rc<BoundStatement>) -> Rc<BoundStatement> {
        let BoundStatement::While { condition, body } = node.as_ref() else {
            unreachable!("rewrite_while_statement called with {:?}", node.kind());
        };

        let continue_label = self.generate_label();
        let check_label = self.generate_label();
        let end_label = self.generate_label();

        let result = Rc::new(BoundStatement::Block {
            statements: vec![
                Rc::new(BoundStatement::Goto { label: check_label }),
                Rc::new(BoundStatement::Label {
                    label: continue_label,
                }),
                Rc::clone(body),
                Rc::new(BoundStatement::Label { label: check_label }),
                Rc::new(BoundStatement::ConditionalGoto {
                    label: continue_label,
                    condition: Rc::clone(condition),
                    jump_if_true: true,
                }),
                Rc::new(BoundStatement::Label { label: end_label }),
            ],
        });

        self.rewrite_statement(&result)
    }

    // var <variable> = <lower>
    // while (<variable> < <upper>)
    // {
    //     <body>
    //     <variable> = <variable> + 1
    // }
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

        let less = BoundBinaryOperator::bind(TokenType::Less, TypeSymbol::Number, TypeSymbol::Number)
            .expect("operator table defines number < number");
        let plus = BoundBinaryOperator::bind(TokenType::Plus, TypeSymbol::Number, TypeSymbol::Number)
            .expect("operator table defines number + number");

        let variable_expression = Rc::new(BoundExpression::Variable {
            variable: variable.clone(),
            span: *span,
        });
        let condition = Rc::new(BoundExpression::Binary {
            left: Rc::clone(&variable_expression),
            operator: less,
            right: Rc::clone(upper_bound),
            span: *span,
        });
        let increment = BoundStatement::Expression {
            expression: Rc::new(BoundExpression::Assignment {
                variable: variable.clone(),
                expression: Rc::new(BoundExpression::Binary {
                    left: variable_expression,
                    operator: plus,
                    right: Rc::new(BoundExpression::Literal {
                        value: Value::Number(1),
                    }),
                    span: *span,
                }),
            }),
        };

        let while_body = Rc::new(BoundStatement::Block {
            statements: vec![Rc::clone(body), Rc::new(increment)],
        });
        let result = block(vec![
            BoundStatement::VariableDeclaration {
                variable: variable.clone(),
                initializer: Rc::clone(lower_bound),
            },
            BoundStatement::While {
                condition,
                body: while_body,
            },
        ]);

        self.rewrite_statement(&result)
    }
}
