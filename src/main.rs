use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap::Subcommand;
use mel_interpreter::lex::{LexError, StringTerminationError};
use mel_interpreter::parse::ParseError;
use mel_interpreter::{Lexer, Options, RuntimeError, UnknownChar};
use miette::IntoDiagnostic;
use miette::WrapErr;

#[derive(Parser, Debug)]
#[command(name = "mel", about = "Tokenize, parse or run MEL programs")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print one token per line
    Tokenize {
        filename: PathBuf,
        /// Reject characters that no token matches instead of skipping them
        #[arg(long)]
        strict: bool,
    },
    /// Print the program as s-expressions
    Parse {
        filename: PathBuf,
        #[arg(long)]
        strict: bool,
    },
    Run {
        filename: PathBuf,
        #[arg(long)]
        strict: bool,
        /// Abort a `@` loop after this many iterations
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Maximum nesting of function calls and embedded programs
        #[arg(long, default_value_t = Options::default().max_call_depth)]
        max_depth: usize,
    },
}

fn unknown_policy(strict: bool) -> UnknownChar {
    if strict {
        UnknownChar::Error
    } else {
        UnknownChar::Discard
    }
}

fn read_source(filename: &Path) -> String {
    match fs::read_to_string(filename)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading `{}` failed", filename.display()))
    {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(74);
        }
    }
}

/// Prints a known MEL error and exits with its code. Anything else is handed
/// back to `main`.
fn fail(e: miette::Report) -> miette::Result<()> {
    if let Some(lex_error) = e.downcast_ref::<LexError>() {
        eprintln!(
            "[line {}] Error: Unexpected character: {}",
            lex_error.line, lex_error.token
        );
        eprintln!("{e:?}");
        std::process::exit(65);
    } else if let Some(string_termination_error) = e.downcast_ref::<StringTerminationError>() {
        eprintln!(
            "[line {}] Error: Unterminated string",
            string_termination_error.line
        );
        eprintln!("{e:?}");
        std::process::exit(65);
    } else if let Some(parse_error) = e.downcast_ref::<ParseError>() {
        eprintln!("[line {}] Error: {parse_error}", parse_error.line);
        eprintln!("{e:?}");
        std::process::exit(65);
    } else if let Some(runtime_error) = e.downcast_ref::<RuntimeError>() {
        eprintln!("MEL Runtime Error: {runtime_error}");
        eprintln!("{e:?}");
        std::process::exit(70);
    }
    Err(e)
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Tokenize { filename, strict } => {
            let file_contents = read_source(&filename);

            let lexer =
                Lexer::new(filename.to_str(), &file_contents).with_unknown(unknown_policy(strict));
            for token in lexer {
                match token {
                    Ok(token) => println!("{token}"),
                    Err(e) => return fail(e),
                }
            }
        }
        Commands::Parse { filename, strict } => {
            let file_contents = read_source(&filename);

            let lexer =
                Lexer::new(filename.to_str(), &file_contents).with_unknown(unknown_policy(strict));
            let parsed =
                mel_interpreter::Parser::from_lexer(lexer).and_then(|parser| parser.parse());
            let program = match parsed {
                Ok(program) => program,
                Err(e) => return fail(e),
            };
            println!("{program}");
        }
        Commands::Run {
            filename,
            strict,
            max_iterations,
            max_depth,
        } => {
            let file_contents = read_source(&filename);
            let options = Options {
                unknown: unknown_policy(strict),
                max_loop_iterations: max_iterations,
                max_call_depth: max_depth,
            };

            let mut out = io::stdout().lock();
            let mut input = io::stdin().lock();
            let result = mel_interpreter::run(
                filename.to_str(),
                &file_contents,
                &mut out,
                &mut input,
                &options,
            );
            if let Err(e) = result {
                return fail(e);
            }
        }
    }
    Ok(())
}
