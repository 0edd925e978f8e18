use crate::bound_tree::{BoundBlock, BoundExpression, BoundStatement};
use crate::error::{Diagnostic, TextSpan};
use crate::host::Host;
use crate::operators::{BoundBinaryOperatorKind, BoundUnaryOperatorKind};
use crate::symbols::{BuiltinFunction, LabelSymbol, TypeSymbol, VariableSymbol};
use crate::value::Value;
use std::collections::HashMap;

/// Values of every variable assigned so far. Outlives a single evaluation
/// so REPL submissions see the globals of earlier ones.
pub type Variables = HashMap<VariableSymbol, Value>;

/// Runs a lowered program with an instruction pointer over its statements.
pub struct Evaluator<'a> {
    program: &'a BoundBlock,
    variables: &'a mut Variables,
    host: &'a mut dyn Host,
    last_value: Value,
}

impl<'a> Evaluator<'a> {
    pub fn new(program: &'a BoundBlock, variables: &'a mut Variables, host: &'a mut dyn Host) -> Self {
        Self {
            program,
            variables,
            host,
            last_value: Value::Nil,
        }
    }

    /// Runs the program to completion and returns the value of the last
    /// expression statement or variable declaration executed.
    pub fn evaluate(&mut self) -> Result<Value, Diagnostic> {
        let program = self.program;
        let statements = &program.statements;
        let labels = label_targets(program);

        let mut index = 0;
        while index < statements.len() {
            if self.host.is_cancelled() {
                return Err(Diagnostic::runtime_error(
                    TextSpan::default(),
                    "Evaluation cancelled".to_string(),
                ));
            }

            let statement = &statements[index];
            tracing::trace!(index, kind = ?statement.kind(), "step");

            match statement.as_ref() {
                BoundStatement::Expression { expression } => {
                    self.last_value = self.evaluate_expression(expression)?;
                    index += 1;
                }
                BoundStatement::VariableDeclaration {
                    variable,
                    initializer,
                } => {
                    let value = self.evaluate_expression(initializer)?;
                    self.variables.insert(variable.clone(), value.clone());
                    self.last_value = value;
                    index += 1;
                }
                BoundStatement::Goto { label } => {
                    index = jump_target(&labels, *label);
                }
                BoundStatement::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                } => {
                    let condition = match self.evaluate_expression(condition)? {
                        Value::Bool(condition) => condition,
                        other => panic!("branch condition evaluated to {}", other.type_name()),
                    };
                    if condition == *jump_if_true {
                        index = jump_target(&labels, *label);
                    } else {
                        index += 1;
                    }
                }
                BoundStatement::Label { .. } => index += 1,
                other => unreachable!("{:?} left in a lowered program", other.kind()),
            }
        }

        Ok(std::mem::take(&mut self.last_value))
    }

    fn evaluate_expression(&mut self, expression: &BoundExpression) -> Result<Value, Diagnostic> {
        match expression {
            BoundExpression::Literal { value } => Ok(value.clone()),
            BoundExpression::Variable { variable, span } => match self.variables.get(variable) {
                Some(value) => Ok(value.clone()),
                None => Err(Diagnostic::runtime_error(
                    *span,
                    format!("Variable '{}' has no value", variable.name()),
                )),
            },
            BoundExpression::Assignment {
                variable,
                expression,
            } => {
                let value = self.evaluate_expression(expression)?;
                self.variables.insert(variable.clone(), value.clone());
                Ok(value)
            }
            BoundExpression::Unary {
                operator,
                operand,
                span,
            } => {
                let operand = self.evaluate_expression(operand)?;
                match (operator.kind, operand) {
                    (BoundUnaryOperatorKind::Identity, Value::Number(n)) => Ok(Value::Number(n)),
                    (BoundUnaryOperatorKind::Negation, Value::Number(n)) => Ok(Value::Number(n.wrapping_neg())),
                    (BoundUnaryOperatorKind::LogicalNegation, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (_, operand) => Err(Diagnostic::runtime_error(
                        *span,
                        format!(
                            "Cannot apply '{}' to {}",
                            operator.syntax_text(),
                            operand.type_name()
                        ),
                    )),
                }
            }
            BoundExpression::Binary {
                left,
                operator,
                right,
                span,
            } => {
                // && and || skip the right operand when the left decides
                match operator.kind {
                    BoundBinaryOperatorKind::LogicalAnd => {
                        if !self.evaluate_condition(left, *span)? {
                            return Ok(Value::Bool(false));
                        }
                        return Ok(Value::Bool(self.evaluate_condition(right, *span)?));
                    }
                    BoundBinaryOperatorKind::LogicalOr => {
                        if self.evaluate_condition(left, *span)? {
                            return Ok(Value::Bool(true));
                        }
                        return Ok(Value::Bool(self.evaluate_condition(right, *span)?));
                    }
                    _ => {}
                }

                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                evaluate_binary_op(operator.kind, left, right, *span)
            }
            BoundExpression::Call {
                function,
                arguments,
            } => {
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate_expression(argument)?);
                }
                Ok(self.call_builtin(*function, values))
            }
            BoundExpression::Conversion { ty, expression } => {
                let value = self.evaluate_expression(expression)?;
                match ty {
                    TypeSymbol::String => Ok(Value::String(value.to_string())),
                    _ => Ok(value),
                }
            }
            BoundExpression::Error => unreachable!("error expression reached the evaluator"),
        }
    }

    fn evaluate_condition(&mut self, expression: &BoundExpression, span: TextSpan) -> Result<bool, Diagnostic> {
        match self.evaluate_expression(expression)? {
            Value::Bool(b) => Ok(b),
            other => Err(Diagnostic::runtime_error(
                span,
                format!("Expected bool but found {}", other.type_name()),
            )),
        }
    }

    fn call_builtin(&mut self, function: BuiltinFunction, arguments: Vec<Value>) -> Value {
        tracing::debug!(function = function.name(), "calling builtin");

        match function {
            BuiltinFunction::Print => {
                let text = arguments.first().map(Value::to_string).unwrap_or_default();
                self.host.print(&text);
                Value::Nil
            }
            BuiltinFunction::Read => Value::String(self.host.read()),
            BuiltinFunction::ParseInt => match arguments.first() {
                Some(Value::String(text)) => text.trim().parse::<i64>().map(Value::Number).unwrap_or(Value::Nil),
                _ => Value::Nil,
            },
        }
    }
}

/// Maps each label to the index of the statement following it.
fn label_targets(program: &BoundBlock) -> HashMap<LabelSymbol, usize> {
    program
        .statements
        .iter()
        .enumerate()
        .filter_map(|(index, statement)| match statement.as_ref() {
            BoundStatement::Label { label } => Some((*label, index + 1)),
            _ => None,
        })
        .collect()
}

fn jump_target(labels: &HashMap<LabelSymbol, usize>, label: LabelSymbol) -> usize {
    match labels.get(&label) {
        Some(target) => *target,
        None => panic!("jump to undefined label {}", label),
    }
}

fn evaluate_binary_op(
    operator: BoundBinaryOperatorKind,
    left: Value,
    right: Value,
    span: TextSpan,
) -> Result<Value, Diagnostic> {
    use BoundBinaryOperatorKind::*;

    match operator {
        Addition => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l.wrapping_add(r))),
            (l @ Value::String(_), r) | (l, r @ Value::String(_)) => Ok(Value::String(format!("{}{}", l, r))),
            (l, r) => Err(operand_error("add", &l, &r, span)),
        },
        Subtraction => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l.wrapping_sub(r))),
            (l, r) => Err(operand_error("subtract", &l, &r, span)),
        },
        Multiplication => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l.wrapping_mul(r))),
            (l, r) => Err(operand_error("multiply", &l, &r, span)),
        },
        Division => match (left, right) {
            (Value::Number(_), Value::Number(0)) => {
                Err(Diagnostic::runtime_error(span, "Division by zero".to_string()))
            }
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l.wrapping_div(r))),
            (l, r) => Err(operand_error("divide", &l, &r, span)),
        },
        Remainder => match (left, right) {
            (Value::Number(_), Value::Number(0)) => {
                Err(Diagnostic::runtime_error(span, "Division by zero".to_string()))
            }
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l.wrapping_rem(r))),
            (l, r) => Err(operand_error("take the remainder of", &l, &r, span)),
        },
        Equals => Ok(Value::Bool(left == right)),
        NotEquals => Ok(Value::Bool(left != right)),
        Less | LessOrEquals | Greater | GreaterOrEquals => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Bool(match operator {
                Less => l < r,
                LessOrEquals => l <= r,
                Greater => l > r,
                _ => l >= r,
            })),
            (l, r) => Err(operand_error("compare", &l, &r, span)),
        },
        LogicalAnd | LogicalOr => unreachable!("logical operators short-circuit before reaching here"),
    }
}

fn operand_error(verb: &str, left: &Value, right: &Value, span: TextSpan) -> Diagnostic {
    Diagnostic::runtime_error(
        span,
        format!("Cannot {} {} and {}", verb, left.type_name(), right.type_name()),
    )
}
