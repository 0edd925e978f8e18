use crate::symbols::TypeSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same type; no conversion node is needed.
    Identity,
    /// Allowed wherever a value of the target type is expected.
    Implicit,
    /// Only through a `type(expr)` conversion expression.
    Explicit,
    Invalid,
}

impl Conversion {
    pub fn classify(from: TypeSymbol, to: TypeSymbol) -> Conversion {
        if from == to {
            return Conversion::Identity;
        }

        match (from, to) {
            (TypeSymbol::Number, TypeSymbol::String) | (TypeSymbol::Bool, TypeSymbol::String) => {
                Conversion::Explicit
            }
            _ => Conversion::Invalid,
        }
    }

    pub fn exists(self) -> bool {
        self != Conversion::Invalid
    }

    pub fn is_implicit(self) -> bool {
        matches!(self, Conversion::Identity | Conversion::Implicit)
    }
}
