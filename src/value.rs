use crate::symbols::TypeSymbol;
use std::fmt;

/// A runtime value. `Nil` is the result of statements that produce nothing
/// and of `parseInt` on text that isn't a number.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Number(i64),
    String(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// Static type a literal of this value binds to.
    pub fn static_type(&self) -> TypeSymbol {
        match self {
            Value::Nil => TypeSymbol::Void,
            Value::Bool(_) => TypeSymbol::Bool,
            Value::Number(_) => TypeSymbol::Number,
            Value::String(_) => TypeSymbol::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}
