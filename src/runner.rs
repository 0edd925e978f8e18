use crate::ast::SyntaxTree;
use crate::compilation::Compilation;
use crate::evaluator::Variables;
use crate::host::ConsoleHost;

/// Extra output requested on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub show_tree: bool,
    pub show_program: bool,
}

/// Compiles and runs a whole script against the console. Diagnostics are
/// reported to stderr; returns false if there were any.
pub fn run(source: &str, filename: Option<&str>, options: RunOptions) -> bool {
    let compilation = Compilation::new(SyntaxTree::parse(source));
    if options.show_tree {
        print!("{}", compilation.syntax_tree().root);
    }
    if options.show_program && compilation.diagnostics().is_empty() {
        print!("{}", compilation.lowered_program());
    }

    let mut variables = Variables::new();
    let mut host = ConsoleHost;
    let result = compilation.evaluate(&mut variables, &mut host);

    for diagnostic in &result.diagnostics {
        diagnostic.report(source, filename);
    }

    tracing::info!(
        file = filename.unwrap_or("<input>"),
        diagnostics = result.diagnostics.len(),
        "run finished"
    );

    result.is_success()
}
