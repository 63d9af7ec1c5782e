use std::io::{BufRead, Write};

pub mod env;
pub mod eval;
pub mod lex;
pub mod parse;
pub mod system;

pub use eval::{Interpreter, RuntimeError, Value};
pub use lex::{Lexer, UnknownChar};
pub use parse::Parser;

/// Knobs shared by the lexer and the interpreter, including interpreters
/// started by `->> :`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub unknown: UnknownChar,
    /// `None` lets a `@` loop run forever.
    pub max_loop_iterations: Option<usize>,
    /// Nesting limit for user function calls and embedded programs.
    pub max_call_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            unknown: UnknownChar::default(),
            max_loop_iterations: None,
            max_call_depth: 128,
        }
    }
}

/// Lexes, parses and runs a whole MEL program.
pub fn run(
    filename: Option<&str>,
    source: &str,
    out: &mut dyn Write,
    input: &mut dyn BufRead,
    options: &Options,
) -> miette::Result<()> {
    let lexer = Lexer::new(filename, source).with_unknown(options.unknown);
    let program = Parser::from_lexer(lexer)?.parse()?;
    let mut interpreter = Interpreter::new(out, input, options.clone());
    interpreter.interpret(&program)?;
    Ok(())
}
