// Flint Language Library
//
// Lexing, parsing, binding, lowering and evaluation for Flint, a small
// statically typed scripting language with a REPL.

// Front end
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod source;

// Semantic analysis
pub mod binder;
pub mod bound_tree;
pub mod conversion;
pub mod operators;
pub mod scope;
pub mod symbols;

// Back end
pub mod compilation;
pub mod evaluator;
pub mod host;
pub mod lowerer;
pub mod rewriter;
pub mod value;

pub mod error;
pub mod repl;
pub mod runner;

// Re-export commonly used items
pub use ast::{Expr, Stmt, SyntaxTree};
pub use compilation::{Compilation, EvaluationResult};
pub use error::{Diagnostic, DiagnosticBag, DiagnosticKind, TextSpan};
pub use evaluator::{Evaluator, Variables};
pub use host::{ConsoleHost, Host};
pub use lexer::{Lexer, Token, TokenType};
pub use source::SourceText;
pub use symbols::{BuiltinFunction, Symbol, TypeSymbol, VariableSymbol};
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::{run, RunOptions};
