use clap::{Arg, ArgAction, Command};
use flint::{repl, runner, RunOptions};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("flint")
        .about("Interpreter and REPL for the Flint scripting language")
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("show-tree")
                .long("show-tree")
                .help("Print the parse tree before running")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("show-program")
                .long("show-program")
                .help("Print the lowered program before running")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log pipeline stages to stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_tracing(matches.get_flag("verbose"));

    let options = RunOptions {
        show_tree: matches.get_flag("show-tree"),
        show_program: matches.get_flag("show-program"),
    };

    match matches.get_one::<String>("file") {
        Some(file_path) if !matches.get_flag("interactive") => run_file(file_path, options),
        _ => repl::start(),
    }
}

/// RUST_LOG wins over the default level when set.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_file(path: &str, options: RunOptions) {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        std::process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.to_string_lossy();
            if !runner::run(&source, Some(&filename), options) {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
