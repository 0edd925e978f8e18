use crate::ast::SyntaxTree;
use crate::compilation::{Compilation, EvaluationResult};
use crate::evaluator::Variables;
use crate::host::{ConsoleHost, Host};
use crate::symbols::VariableKind;
use crate::value::Value;
use std::io::{self, Write};
use std::rc::Rc;

/// What the REPL should do after a `#` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    Continue,
    Exit,
}

/// State that survives between submissions: the compilation chain, the
/// values of globals and the display toggles.
#[derive(Default)]
pub struct Repl {
    previous: Option<Rc<Compilation>>,
    variables: Variables,
    show_tree: bool,
    show_program: bool,
}

impl Repl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of the globals declared by successful submissions.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// True when `text` should be submitted as is. A blank last line
    /// forces submission so a broken statement can't trap the prompt.
    pub fn is_complete_submission(text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        if text.ends_with('\n') && text.lines().last().map_or(true, |line| line.trim().is_empty()) {
            return true;
        }
        SyntaxTree::parse(text).is_complete()
    }

    /// Compiles `text` on top of the earlier submissions and runs it. Only
    /// a submission without diagnostics becomes visible to later ones.
    pub fn evaluate_submission(&mut self, text: &str, host: &mut dyn Host) -> (Rc<Compilation>, EvaluationResult) {
        let syntax_tree = SyntaxTree::parse(text);
        if self.show_tree {
            print!("{}", syntax_tree.root);
        }

        let compilation = Rc::new(match self.previous.take() {
            Some(previous) => {
                let compilation = Compilation::continue_with(Rc::clone(&previous), syntax_tree);
                self.previous = Some(previous);
                compilation
            }
            None => Compilation::new(syntax_tree),
        });

        if self.show_program && compilation.diagnostics().is_empty() {
            print!("{}", compilation.lowered_program());
        }

        // Values are committed only with the compilation that declared them;
        // a failed submission's symbols are unreachable afterwards
        let mut variables = self.variables.clone();
        let result = compilation.evaluate(&mut variables, host);
        if result.is_success() {
            variables.retain(|variable, _| variable.kind() == VariableKind::Global);
            self.variables = variables;
            self.previous = Some(Rc::clone(&compilation));
        }

        (compilation, result)
    }

    pub fn run_meta_command(&mut self, command: &str) -> MetaCommand {
        match command.trim() {
            "#exit" => return MetaCommand::Exit,
            "#showTree" => {
                self.show_tree = !self.show_tree;
                println!("{}", if self.show_tree { "Showing parse trees." } else { "Not showing parse trees." });
            }
            "#showProgram" => {
                self.show_program = !self.show_program;
                println!(
                    "{}",
                    if self.show_program { "Showing bound programs." } else { "Not showing bound programs." }
                );
            }
            "#reset" => {
                self.previous = None;
                self.variables.clear();
                println!("Cleared all previous submissions.");
            }
            "#symbols" => match &self.previous {
                Some(compilation) => {
                    for symbol in compilation.visible_symbols() {
                        println!("{}", symbol);
                    }
                }
                None => println!("No submissions yet."),
            },
            other => eprintln!("Invalid command {}.", other),
        }
        MetaCommand::Continue
    }
}

pub fn start() {
    println!("Flint {}", env!("CARGO_PKG_VERSION"));
    println!("Type #exit, exit or quit to leave, or press Ctrl+D");
    println!();

    let mut repl = Repl::new();
    let mut host = ConsoleHost;
    let mut text = String::new();

    loop {
        print!("{}", if text.is_empty() { "> " } else { "| " });
        if let Err(error) = io::stdout().flush() {
            tracing::warn!(%error, "failed to flush stdout");
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                if text.is_empty() {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if trimmed == "exit" || trimmed == "quit" {
                        break;
                    }
                    if trimmed.starts_with('#') {
                        if repl.run_meta_command(trimmed) == MetaCommand::Exit {
                            break;
                        }
                        continue;
                    }
                }

                text.push_str(&line);
                if !Repl::is_complete_submission(&text) {
                    continue;
                }

                let source = std::mem::take(&mut text);
                let (_, result) = repl.evaluate_submission(&source, &mut host);
                for diagnostic in &result.diagnostics {
                    diagnostic.report(&source, None);
                }
                match result.value {
                    Some(Value::Nil) | None => {}
                    Some(value) => println!("{}", value),
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}
