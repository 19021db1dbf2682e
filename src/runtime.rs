use std::io::{self, Stderr, Stdout, Write};
use tracing::{debug, warn};

use crate::{
    ast_printer,
    error::Error,
    interpreter::Interpreter,
    parser::Parser,
    scanner::Scanner,
};

/// What a session does with each chunk of source it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Run a whole script.
    Script,
    /// Run one prompt line at a time, echoing expression values.
    Interactive,
    /// Print the scanned tokens instead of running anything.
    Tokens,
    /// Print the parsed statements instead of running them.
    Ast,
}

/// Runs chunks of source and remembers whether any of them failed.
///
/// Program output goes to `out`, diagnostics to `err`.
pub struct Session<O: Write = Stdout, E: Write = Stderr> {
    mode: Mode,
    out: O,
    err: E,
    had_error: bool,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self::with_writers(mode, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Session<O, E> {
    pub fn with_writers(mode: Mode, out: O, err: E) -> Self {
        Self {
            mode,
            out,
            err,
            had_error: false,
        }
    }

    /// Runs one chunk whose first line is `line`. Returns `false` if a
    /// diagnostic was reported.
    pub fn run(&mut self, source: &str, line: usize) -> bool {
        match self.run_chunk(source, line) {
            Ok(()) => true,
            Err(error) => {
                self.report(&error);
                false
            }
        }
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn reset_error(&mut self) {
        self.had_error = false;
    }

    fn run_chunk(&mut self, source: &str, line: usize) -> Result<(), Error> {
        let scanner = Scanner::with_line(source, line);

        if self.mode == Mode::Tokens {
            for token in scanner {
                writeln!(self.out, "{}", token?)?;
            }
            return Ok(());
        }

        let tokens = scanner.scan_tokens()?;
        let statements = Parser::new(tokens).parse()?;

        if self.mode == Mode::Ast {
            for statement in &statements {
                writeln!(self.out, "{}", ast_printer::print_stmt(statement))?;
            }
            return Ok(());
        }

        Interpreter::new(&mut self.out, self.mode == Mode::Interactive).interpret(&statements)
    }

    fn report(&mut self, error: &Error) {
        let stage = match error {
            Error::Syntax(e) if e.is_lexical() => "scan",
            Error::Syntax(_) => "parse",
            Error::Runtime(_) => "evaluate",
            Error::Output(_) => "output",
        };
        debug!(stage, %error, "reporting diagnostic");
        self.had_error = true;
        if let Err(e) = writeln!(self.err, "{error}") {
            warn!("failed to write diagnostic: {e}");
        }
    }
}

/// Inputs that end an interactive session.
pub fn is_exit_command(input: &str) -> bool {
    matches!(input.trim(), "exit!" | "exit" | "quit")
}
