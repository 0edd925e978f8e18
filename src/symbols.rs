//! Names the binder resolves: types, variables, built-in functions, labels.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// The closed set of static types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSymbol {
    Void,
    Number,
    Bool,
    String,
    /// Type of an expression that failed to bind; operations on it report nothing.
    Error,
}

impl TypeSymbol {
    pub fn name(self) -> &'static str {
        match self {
            TypeSymbol::Void => "void",
            TypeSymbol::Number => "number",
            TypeSymbol::Bool => "bool",
            TypeSymbol::String => "string",
            TypeSymbol::Error => "?",
        }
    }

    /// Types a program can name, e.g. in `var x: number = 1` or `string(5)`.
    pub fn lookup(name: &str) -> Option<TypeSymbol> {
        match name {
            "number" => Some(TypeSymbol::Number),
            "bool" => Some(TypeSymbol::Bool),
            "string" => Some(TypeSymbol::String),
            _ => None,
        }
    }

    pub fn nameable() -> [TypeSymbol; 3] {
        [TypeSymbol::Bool, TypeSymbol::Number, TypeSymbol::String]
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Global,
    Local,
}

#[derive(Debug)]
struct VariableData {
    name: String,
    kind: VariableKind,
    read_only: bool,
    ty: TypeSymbol,
}

/// A declared variable. Equality and hashing go by identity, so two
/// declarations of the same name are distinct keys in the variable store.
#[derive(Debug, Clone)]
pub struct VariableSymbol(Rc<VariableData>);

impl VariableSymbol {
    pub fn new(name: impl Into<String>, kind: VariableKind, read_only: bool, ty: TypeSymbol) -> Self {
        Self(Rc::new(VariableData {
            name: name.into(),
            kind,
            read_only,
            ty,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> VariableKind {
        self.0.kind
    }

    pub fn is_read_only(&self) -> bool {
        self.0.read_only
    }

    pub fn ty(&self) -> TypeSymbol {
        self.0.ty
    }
}

impl PartialEq for VariableSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for VariableSymbol {}

impl Hash for VariableSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Display for VariableSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSymbol {
    pub name: &'static str,
    pub ty: TypeSymbol,
}

impl fmt::Display for ParameterSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// The fixed set of functions programs can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFunction {
    Print,
    Read,
    ParseInt,
}

const TEXT_PARAMETER: [ParameterSymbol; 1] = [ParameterSymbol {
    name: "text",
    ty: TypeSymbol::String,
}];

impl BuiltinFunction {
    pub const ALL: [BuiltinFunction; 3] = [
        BuiltinFunction::Print,
        BuiltinFunction::Read,
        BuiltinFunction::ParseInt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinFunction::Print => "print",
            BuiltinFunction::Read => "read",
            BuiltinFunction::ParseInt => "parseInt",
        }
    }

    pub fn parameters(self) -> &'static [ParameterSymbol] {
        match self {
            BuiltinFunction::Print | BuiltinFunction::ParseInt => &TEXT_PARAMETER,
            BuiltinFunction::Read => &[],
        }
    }

    pub fn return_type(self) -> TypeSymbol {
        match self {
            BuiltinFunction::Print => TypeSymbol::Void,
            BuiltinFunction::Read => TypeSymbol::String,
            BuiltinFunction::ParseInt => TypeSymbol::Number,
        }
    }

    pub fn lookup(name: &str) -> Option<BuiltinFunction> {
        Self::ALL.into_iter().find(|function| function.name() == name)
    }
}

impl fmt::Display for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parameters = self
            .parameters()
            .iter()
            .map(ParameterSymbol::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({}): {}", self.name(), parameters, self.return_type())
    }
}

/// A jump target minted by the lowerer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelSymbol(pub usize);

impl fmt::Display for LabelSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Label{}", self.0)
    }
}

/// Any named entity the pipeline knows about. Completion lists only ever
/// hold variables, functions and types.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(VariableSymbol),
    Parameter(ParameterSymbol),
    Function(BuiltinFunction),
    Type(TypeSymbol),
    Label(LabelSymbol),
}

impl Symbol {
    pub fn name(&self) -> String {
        match self {
            Symbol::Variable(variable) => variable.name().to_string(),
            Symbol::Parameter(parameter) => parameter.name.to_string(),
            Symbol::Function(function) => function.name().to_string(),
            Symbol::Type(ty) => ty.name().to_string(),
            Symbol::Label(label) => label.to_string(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Variable(variable) => {
                let keyword = if variable.is_read_only() { "let" } else { "var" };
                write!(f, "{} {}: {}", keyword, variable.name(), variable.ty())
            }
            Symbol::Parameter(parameter) => write!(f, "{}", parameter),
            Symbol::Function(function) => write!(f, "{}", function),
            Symbol::Type(ty) => write!(f, "type {}", ty),
            Symbol::Label(label) => write!(f, "{}:", label),
        }
    }
}
