//! Persistent interactive session: holds one `Interpreter` across lines so
//! bindings and function definitions accumulate the way a real terminal
//! session would.

use std::io::{self, BufRead, Write as _};

use log::info;

use crate::{config::RunConfig, host::HttpServer as _, interpreter::Interpreter, lexer::lex};

pub struct Repl {
    interp: Interpreter,
}

impl Repl {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self {
            interp: Interpreter::new(config),
        }
    }

    /// Runs the `>>> ` prompt loop against standard input until `exit`,
    /// `quit`, or EOF.
    pub fn run(&mut self) {
        if !self.interp.config.quiet {
            println!("zen {} — type 'exit' or 'quit' to leave", env!("CARGO_PKG_VERSION"));
        }
        let stdin = io::stdin();
        loop {
            print!(">>> ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            let bytes_read = stdin.lock().read_line(&mut line).unwrap_or(0);
            if bytes_read == 0 {
                break;
            }
            let trimmed = line.trim();
            if trimmed == "exit" || trimmed == "quit" {
                break;
            }
            self.eval_line(trimmed);
        }
        self.interp.host.http.stop();
    }

    fn eval_line(&mut self, line: &str) {
        info!("zen::repl: executing line ({} bytes)", line.len());
        let tokens = lex(line);
        self.interp.exec_program(&tokens);
    }

    #[must_use]
    pub fn interpreter(&self) -> &Interpreter {
        &self.interp
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interp
    }
}
