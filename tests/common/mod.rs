#![allow(dead_code)]

use mel_interpreter::{Interpreter, Options, Parser, RuntimeError};

pub fn program(body: &str) -> String {
    format!("::: Program start\n{body}\n;;; Program end\n")
}

pub fn execute_with(body: &str, input: &str, options: &Options) -> (String, miette::Result<()>) {
    let source = program(body);
    let mut out = Vec::new();
    let mut input = input.as_bytes();
    let result = mel_interpreter::run(Some("test.mel"), &source, &mut out, &mut input, options);
    (String::from_utf8(out).expect("utf-8 output"), result)
}

pub fn execute(body: &str, input: &str) -> (String, miette::Result<()>) {
    execute_with(body, input, &Options::default())
}

/// Output of a program that must succeed.
pub fn output(body: &str) -> String {
    let (out, result) = execute(body, "");
    if let Err(e) = result {
        panic!("program failed: {e:?}");
    }
    out
}

/// Output so far and the error of a program that must fail at runtime.
pub fn runtime_error(body: &str) -> (String, RuntimeError) {
    failure(execute(body, ""))
}

pub fn failure((out, result): (String, miette::Result<()>)) -> (String, RuntimeError) {
    let e = result.expect_err("program should fail");
    let error = e
        .downcast_ref::<RuntimeError>()
        .unwrap_or_else(|| panic!("expected a runtime error, got {e:?}"))
        .clone();
    (out, error)
}

/// Display form of `name` after running `body`, or `None` if it is unbound.
pub fn variable(body: &str, name: &str) -> Option<String> {
    let source = program(body);
    let program = Parser::new(None, &source)
        .and_then(|parser| parser.parse())
        .expect("parses");
    let mut out = Vec::new();
    let mut input: &[u8] = b"";
    let mut interpreter = Interpreter::new(&mut out, &mut input, Options::default());
    interpreter.interpret(&program).expect("runs");
    interpreter.variable(name).map(ToString::to_string)
}

/// `n` written as a `;;` multi-bit literal.
pub fn bits(n: u32) -> String {
    let sentinels: Vec<&str> = format!("{n:b}")
        .chars()
        .map(|c| if c == '1' { "$$$$$$$$" } else { "$$$$$$$" })
        .collect();
    format!(";;{}", sentinels.join(";"))
}
