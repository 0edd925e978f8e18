//! The bound tree: syntax with names resolved to symbols and every
//! expression typed. Children sit behind `Rc` so rewrites can share
//! subtrees they leave alone.

use crate::error::TextSpan;
use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::symbols::{BuiltinFunction, LabelSymbol, TypeSymbol, VariableSymbol};
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundNodeKind {
    // Expressions
    ErrorExpression,
    LiteralExpression,
    VariableExpression,
    AssignmentExpression,
    UnaryExpression,
    BinaryExpression,
    CallExpression,
    ConversionExpression,

    // Statements
    BlockStatement,
    ExpressionStatement,
    VariableDeclaration,
    IfStatement,
    WhileStatement,
    ForStatement,
    GotoStatement,
    ConditionalGotoStatement,
    LabelStatement,
}

#[derive(Debug, Clone)]
pub enum BoundExpression {
    Error,
    Literal {
        value: Value,
    },
    Variable {
        variable: VariableSymbol,
        span: TextSpan,
    },
    Assignment {
        variable: VariableSymbol,
        expression: Rc<BoundExpression>,
    },
    Unary {
        operator: &'static BoundUnaryOperator,
        operand: Rc<BoundExpression>,
        span: TextSpan,
    },
    Binary {
        left: Rc<BoundExpression>,
        operator: &'static BoundBinaryOperator,
        right: Rc<BoundExpression>,
        span: TextSpan,
    },
    Call {
        function: BuiltinFunction,
        arguments: Vec<Rc<BoundExpression>>,
    },
    Conversion {
        ty: TypeSymbol,
        expression: Rc<BoundExpression>,
    },
}

impl BoundExpression {
    pub fn ty(&self) -> TypeSymbol {
        match self {
            BoundExpression::Error => TypeSymbol::Error,
            BoundExpression::Literal { value } => value.static_type(),
            BoundExpression::Variable { variable, .. } => variable.ty(),
            BoundExpression::Assignment { variable, .. } => variable.ty(),
            BoundExpression::Unary { operator, .. } => operator.result_type,
            BoundExpression::Binary { operator, .. } => operator.result_type,
            BoundExpression::Call { function, .. } => function.return_type(),
            BoundExpression::Conversion { ty, .. } => *ty,
        }
    }

    pub fn kind(&self) -> BoundNodeKind {
        match self {
            BoundExpression::Error => BoundNodeKind::ErrorExpression,
            BoundExpression::Literal { .. } => BoundNodeKind::LiteralExpression,
            BoundExpression::Variable { .. } => BoundNodeKind::VariableExpression,
            BoundExpression::Assignment { .. } => BoundNodeKind::AssignmentExpression,
            BoundExpression::Unary { .. } => BoundNodeKind::UnaryExpression,
            BoundExpression::Binary { .. } => BoundNodeKind::BinaryExpression,
            BoundExpression::Call { .. } => BoundNodeKind::CallExpression,
            BoundExpression::Conversion { .. } => BoundNodeKind::ConversionExpression,
        }
    }
}

#[derive(Debug, Clone)]
pub enum BoundStatement {
    Block {
        statements: Vec<Rc<BoundStatement>>,
    },
    Expression {
        expression: Rc<BoundExpression>,
    },
    VariableDeclaration {
        variable: VariableSymbol,
        initializer: Rc<BoundExpression>,
    },
    If {
        condition: Rc<BoundExpression>,
        then_statement: Rc<BoundStatement>,
        else_statement: Option<Rc<BoundStatement>>,
    },
    While {
        condition: Rc<BoundExpression>,
        body: Rc<BoundStatement>,
    },
    For {
        variable: VariableSymbol,
        lower_bound: Rc<BoundExpression>,
        upper_bound: Rc<BoundExpression>,
        body: Rc<BoundStatement>,
        /// From `for` through the upper bound; the lowered loop check and
        /// increment report runtime errors here.
        span: TextSpan,
    },
    Goto {
        label: LabelSymbol,
    },
    ConditionalGoto {
        label: LabelSymbol,
        condition: Rc<BoundExpression>,
        jump_if_true: bool,
    },
    Label {
        label: LabelSymbol,
    },
}

impl BoundStatement {
    pub fn kind(&self) -> BoundNodeKind {
        match self {
            BoundStatement::Block { .. } => BoundNodeKind::BlockStatement,
            BoundStatement::Expression { .. } => BoundNodeKind::ExpressionStatement,
            BoundStatement::VariableDeclaration { .. } => BoundNodeKind::VariableDeclaration,
            BoundStatement::If { .. } => BoundNodeKind::IfStatement,
            BoundStatement::While { .. } => BoundNodeKind::WhileStatement,
            BoundStatement::For { .. } => BoundNodeKind::ForStatement,
            BoundStatement::Goto { .. } => BoundNodeKind::GotoStatement,
            BoundStatement::ConditionalGoto { .. } => BoundNodeKind::ConditionalGotoStatement,
            BoundStatement::Label { .. } => BoundNodeKind::LabelStatement,
        }
    }
}

/// A flat statement list containing only expression statements, variable
/// declarations, gotos, conditional gotos and labels.
#[derive(Debug, Clone, Default)]
pub struct BoundBlock {
    pub statements: Vec<Rc<BoundStatement>>,
}

// Printing

impl fmt::Display for BoundExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BoundExpression::Error => write!(f, "?"),
            BoundExpression::Literal {
                value: Value::String(text),
            } => write!(f, "\"{}\"", text.replace('"', "\"\"")),
            BoundExpression::Literal { value } => write!(f, "{}", value),
            BoundExpression::Variable { variable, .. } => write!(f, "{}", variable.name()),
            BoundExpression::Assignment {
                variable,
                expression,
            } => write!(f, "({} = {})", variable.name(), expression),
            BoundExpression::Unary {
                operator, operand, ..
            } => {
                write!(f, "{}{}", operator.syntax_text(), operand)
            }
            BoundExpression::Binary {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator.syntax_text(), right),
            BoundExpression::Call {
                function,
                arguments,
            } => {
                write!(f, "{}(", function.name())?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")
            }
            BoundExpression::Conversion { ty, expression } => write!(f, "{}({})", ty, expression),
        }
    }
}

fn write_statement(f: &mut fmt::Formatter, statement: &BoundStatement, indent: usize) -> fmt::Result {
    let pad = "";
    match statement {
        BoundStatement::Block { statements } => {
            writeln!(f, "{:indent$}{{", pad, indent = indent)?;
            for statement in statements {
                write_statement(f, statement, indent + 4)?;
            }
            writeln!(f, "{:indent$}}}", pad, indent = indent)
        }
        BoundStatement::Expression { expression } => {
            writeln!(f, "{:indent$}{}", pad, expression, indent = indent)
        }
        BoundStatement::VariableDeclaration {
            variable,
            initializer,
        } => {
            let keyword = if variable.is_read_only() { "let" } else { "var" };
            writeln!(
                f,
                "{:indent$}{} {} = {}",
                pad,
                keyword,
                variable.name(),
                initializer,
                indent = indent
            )
        }
        BoundStatement::If {
            condition,
            then_statement,
            else_statement,
        } => {
            writeln!(f, "{:indent$}if {}", pad, condition, indent = indent)?;
            write_statement(f, then_statement, indent + 4)?;
            if let Some(else_statement) = else_statement {
                writeln!(f, "{:indent$}else", pad, indent = indent)?;
                write_statement(f, else_statement, indent + 4)?;
            }
            Ok(())
        }
        BoundStatement::While { condition, body } => {
            writeln!(f, "{:indent$}while {}", pad, condition, indent = indent)?;
            write_statement(f, body, indent + 4)
        }
        BoundStatement::For {
            variable,
            lower_bound,
            upper_bound,
            body,
            ..
        } => {
            writeln!(
                f,
                "{:indent$}for {} = {} to {}",
                pad,
                variable.name(),
                lower_bound,
                upper_bound,
                indent = indent
            )?;
            write_statement(f, body, indent + 4)
        }
        BoundStatement::Goto { label } => {
            writeln!(f, "{:indent$}goto {}", pad, label, indent = indent)
        }
        BoundStatement::ConditionalGoto {
            label,
            condition,
            jump_if_true,
        } => {
            let keyword = if *jump_if_true { "gotoTrue" } else { "gotoFalse" };
            writeln!(f, "{:indent$}{} {} {}", pad, keyword, condition, label, indent = indent)
        }
        BoundStatement::Label { label } => writeln!(f, "{}:", label),
    }
}

impl fmt::Display for BoundStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_statement(f, self, 0)
    }
}

impl fmt::Display for BoundBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for statement in &self.statements {
            write_statement(f, statement, 4)?;
        }
        Ok(())
    }
}
