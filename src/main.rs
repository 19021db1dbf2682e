use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use tlox::{runtime::is_exit_command, Mode, Session};
use tracing::debug;

/// Exit status for scripts that reported a diagnostic.
const EXIT_DATA_ERROR: i32 = 65;

/// tlox - run Lox scripts or an interactive prompt
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print the scanned tokens instead of running
    #[arg(long, conflicts_with = "ast")]
    tokens: bool,

    /// Print the parsed statements instead of running
    #[arg(long)]
    ast: bool,

    /// Script to run (starts a prompt if omitted)
    script: Option<PathBuf>,
}

impl Args {
    fn mode(&self, interactive: bool) -> Mode {
        if self.tokens {
            Mode::Tokens
        } else if self.ast {
            Mode::Ast
        } else if interactive {
            Mode::Interactive
        } else {
            Mode::Script
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match &args.script {
        Some(path) => run_file(path, args.mode(false)),
        None => run_prompt(args.mode(true)),
    }
}

fn run_file(file_path: &Path, mode: Mode) -> Result<()> {
    let source = fs::read_to_string(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;

    let mut session = Session::new(mode);
    session.run(&source, 1);

    if session.had_error() {
        process::exit(EXIT_DATA_ERROR);
    }
    Ok(())
}

fn run_prompt(mode: Mode) -> Result<()> {
    let mut session = Session::new(mode);
    let mut lines = io::stdin().lock().lines();
    let mut line = 1;

    loop {
        print!("({line:03}) -> ");
        io::stdout().flush()?;

        let Some(input) = lines.next() else {
            println!();
            break;
        };
        let input = input?;
        if is_exit_command(&input) {
            break;
        }

        session.run(&input, line);
        if session.had_error() {
            debug!(line, "resetting error flag");
            session.reset_error();
        }
        line += 1;
    }
    Ok(())
}
