use std::io::{self, BufRead, Write};

/// What a program can reach outside itself while it runs.
pub trait Host {
    fn print(&mut self, text: &str);

    fn read(&mut self) -> String;

    /// Polled before every evaluation step; returning true stops the program.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Host wired to the process's stdin and stdout.
#[derive(Debug, Default)]
pub struct ConsoleHost;

impl Host for ConsoleHost {
    fn print(&mut self, text: &str) {
        println!("{}", text);
    }

    fn read(&mut self) -> String {
        // Make sure a prompt printed without a newline shows up first
        if let Err(error) = io::stdout().flush() {
            tracing::warn!(%error, "failed to flush stdout");
        }

        let mut line = String::new();
        if let Err(error) = io::stdin().lock().read_line(&mut line) {
            tracing::warn!(%error, "failed to read from stdin");
            return String::new();
        }
        line.trim_end_matches(['\r', '\n']).to_string()
    }
}
