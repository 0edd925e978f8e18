use crate::symbols::VariableSymbol;
use std::collections::HashMap;

/// One level of name resolution. Lookups walk outward through `parent`.
#[derive(Debug, Clone, Default)]
pub struct BoundScope {
    variables: HashMap<String, VariableSymbol>,
    parent: Option<Box<BoundScope>>,
}

impl BoundScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: BoundScope) -> Self {
        Self {
            variables: HashMap::new(),
            parent: Some(Box::new(parent)),
        }
    }

    /// Detaches and returns the parent, leaving this scope as a root.
    pub fn take_parent(&mut self) -> Option<BoundScope> {
        self.parent.take().map(|parent| *parent)
    }

    /// Declares `variable` here. Returns false when this scope already has
    /// a variable of that name; outer scopes don't count.
    pub fn try_declare(&mut self, variable: VariableSymbol) -> bool {
        if self.variables.contains_key(variable.name()) {
            return false;
        }
        self.variables.insert(variable.name().to_string(), variable);
        true
    }

    pub fn try_lookup(&self, name: &str) -> Option<VariableSymbol> {
        if let Some(variable) = self.variables.get(name) {
            Some(variable.clone())
        } else if let Some(ref parent) = self.parent {
            parent.try_lookup(name)
        } else {
            None
        }
    }

    /// Variables declared directly in this scope, sorted by name.
    pub fn declared_variables(&self) -> Vec<VariableSymbol> {
        let mut variables: Vec<VariableSymbol> = self.variables.values().cloned().collect();
        variables.sort_by(|a, b| a.name().cmp(b.name()));
        variables
    }
}
