//! Command-line driver: compile, format, and check Text Mode documents

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use textmode::diagnostics::has_errors;
use textmode::pipeline::{compile, parse};
use textmode::printer::{print_program, PrintOptions};
use textmode::Diagnostic;

#[derive(Parser)]
#[command(
    name = "textmode",
    version,
    about = "Compile and format Text Mode graphing documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a document to the calculator's JSON format
    Compile {
        /// Input file; stdin when omitted
        input: Option<PathBuf>,
        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Indented JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Reformat a document
    Fmt {
        /// Input file; stdin when omitted
        input: Option<PathBuf>,
        /// Rewrite the input file in place
        #[arg(short, long)]
        write: bool,
        /// Drop every optional space
        #[arg(long)]
        no_spaces: bool,
        /// Put the whole document on one line
        #[arg(long)]
        no_newlines: bool,
    },
    /// Parse and report diagnostics without producing output
    Check {
        /// Input file; stdin when omitted
        input: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> io::Result<ExitCode> {
    match cli.command {
        Command::Compile {
            input,
            output,
            pretty,
        } => {
            let source = read_input(input.as_deref())?;
            let result = compile(&source, &[]);
            report(&source, &result.diagnostics);
            let Some(wire) = result.wire else {
                return Ok(ExitCode::FAILURE);
            };
            let json = if pretty {
                serde_json::to_string_pretty(&wire)
            } else {
                serde_json::to_string(&wire)
            }
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            match output {
                Some(path) => fs::write(path, json + "\n")?,
                None => println!("{}", json),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Fmt {
            input,
            write,
            no_spaces,
            no_newlines,
        } => {
            let source = read_input(input.as_deref())?;
            let result = parse(&source, &[]);
            report(&source, &result.diagnostics);
            if has_errors(&result.diagnostics) {
                return Ok(ExitCode::FAILURE);
            }
            let options = PrintOptions {
                suppress_spaces: no_spaces,
                suppress_newlines: no_newlines,
            };
            let formatted = print_program(&result.program, &options);
            if write {
                let Some(path) = &input else {
                    eprintln!("error: --write requires an input file");
                    return Ok(ExitCode::FAILURE);
                };
                fs::write(path, &formatted)?;
            } else {
                print!("{}", formatted);
                if no_newlines && !formatted.is_empty() {
                    println!();
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { input } => {
            let source = read_input(input.as_deref())?;
            let result = compile(&source, &[]);
            report(&source, &result.diagnostics);
            if has_errors(&result.diagnostics) {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn report(source: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.span {
            Some(span) => {
                let (line, column) = line_column(source, span.start);
                eprintln!(
                    "{}:{}: {}: {}",
                    line, column, diagnostic.severity, diagnostic.message
                );
            }
            None => eprintln!("{}: {}", diagnostic.severity, diagnostic.message),
        }
    }
}

fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
