//! Ties the pipeline together: parse, bind, lower, evaluate. A compilation
//! can continue an earlier one, which is how REPL submissions see the
//! globals declared before them.

use crate::ast::SyntaxTree;
use crate::binder::{bind_global_scope, BoundGlobalScope};
use crate::bound_tree::BoundBlock;
use crate::error::Diagnostic;
use crate::evaluator::{Evaluator, Variables};
use crate::host::Host;
use crate::lowerer::lower;
use crate::symbols::{BuiltinFunction, Symbol, TypeSymbol};
use crate::value::Value;
use std::cell::OnceCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug)]
pub struct EvaluationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub value: Option<Value>,
}

impl EvaluationResult {
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub struct Compilation {
    previous: Option<Rc<Compilation>>,
    syntax_tree: SyntaxTree,
    global_scope: OnceCell<Rc<BoundGlobalScope>>,
}

impl Compilation {
    pub fn new(syntax_tree: SyntaxTree) -> Self {
        Self {
            previous: None,
            syntax_tree,
            global_scope: OnceCell::new(),
        }
    }

    /// A compilation of `syntax_tree` that sees every global declared by
    /// `previous` and the compilations it continues.
    pub fn continue_with(previous: Rc<Compilation>, syntax_tree: SyntaxTree) -> Self {
        Self {
            previous: Some(previous),
            syntax_tree,
            global_scope: OnceCell::new(),
        }
    }

    pub fn syntax_tree(&self) -> &SyntaxTree {
        &self.syntax_tree
    }

    /// Binds the syntax tree on first use. Later calls return the same scope.
    pub fn global_scope(&self) -> &Rc<BoundGlobalScope> {
        self.global_scope.get_or_init(|| {
            let previous = self
                .previous
                .as_ref()
                .map(|previous| Rc::clone(previous.global_scope()));
            Rc::new(bind_global_scope(previous, &self.syntax_tree))
        })
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.global_scope().diagnostics.iter().cloned().collect()
    }

    /// The flat label/goto program the evaluator runs.
    pub fn lowered_program(&self) -> BoundBlock {
        lower(&self.global_scope().statement)
    }

    /// Runs the program unless parsing or binding reported anything, in
    /// which case the diagnostics come back and nothing is evaluated.
    pub fn evaluate(&self, variables: &mut Variables, host: &mut dyn Host) -> EvaluationResult {
        let diagnostics = self.diagnostics();
        if !diagnostics.is_empty() {
            tracing::debug!(count = diagnostics.len(), "skipping evaluation");
            return EvaluationResult {
                diagnostics,
                value: None,
            };
        }

        let program = self.lowered_program();
        match Evaluator::new(&program, variables, host).evaluate() {
            Ok(value) => EvaluationResult {
                diagnostics: Vec::new(),
                value: Some(value),
            },
            Err(diagnostic) => {
                tracing::debug!(message = %diagnostic.message, "runtime error");
                EvaluationResult {
                    diagnostics: vec![diagnostic],
                    value: None,
                }
            }
        }
    }

    /// Every name a submission could refer to: globals from this compilation
    /// back to the first (a later declaration hides an earlier one), then the
    /// builtin functions and the type names.
    pub fn visible_symbols(&self) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        let mut seen = HashSet::new();

        let mut current = Some(self.global_scope());
        while let Some(scope) = current {
            for variable in &scope.variables {
                if seen.insert(variable.name().to_string()) {
                    symbols.push(Symbol::Variable(variable.clone()));
                }
            }
            current = scope.previous.as_ref();
        }

        symbols.extend(BuiltinFunction::ALL.iter().copied().map(Symbol::Function));
        symbols.extend(TypeSymbol::nameable().into_iter().map(Symbol::Type));
        symbols
    }
}
