mod common;

use common::{bits, execute, execute_with, failure, output, program, runtime_error, variable};
use mel_interpreter::lex::LexError;
use mel_interpreter::parse::ParseError;
use mel_interpreter::{Interpreter, Options, Parser, UnknownChar, Value};

#[test]
fn multi_bit_literals_round_trip() {
    for n in 0..1024u32 {
        let source = program(&format!("x = {}", bits(n)));
        let program = Parser::new(None, &source)
            .and_then(|parser| parser.parse())
            .expect("parses");
        let mut out = Vec::new();
        let mut input: &[u8] = b"";
        let mut interpreter = Interpreter::new(&mut out, &mut input, Options::default());
        interpreter.interpret(&program).expect("runs");
        assert_eq!(interpreter.variable("x"), Some(&Value::Int(i64::from(n))), "{n}");
    }
}

#[test]
fn numbers_print_as_characters() {
    // 0b1000001 = 65
    let body = format!("> {}\n> \"hello\"", bits(65));
    assert_eq!(output(&body), "Ah");
}

#[test]
fn output_buffer_is_consumed_oldest_first() {
    let body = "
        > \"A\"
        > \"B\"
        > \"C\"
        > \"D\"
        >> ;;$$$$$$$$;$$$$$$$$
        << $$$$$$$$
    ";
    assert_eq!(output(body), "ABCDCBAD");

    let (out, error) = runtime_error(&format!("{body}\n<< $$$$$$$$"));
    assert_eq!(out, "ABCDCBAD");
    assert_eq!(
        error.message,
        "Cannot retrieve 1 characters, only 0 available in buffer."
    );
}

#[test]
fn buffer_keeps_the_unconsumed_tail() {
    let source = program("> \"A\"\n> \"B\"\n> \"C\"\n> \"D\"\n>> ;;$$$$$$$$;$$$$$$$$");
    let program = Parser::new(None, &source)
        .and_then(|parser| parser.parse())
        .expect("parses");
    let mut out = Vec::new();
    let mut input: &[u8] = b"";
    let mut interpreter = Interpreter::new(&mut out, &mut input, Options::default());
    interpreter.interpret(&program).expect("runs");
    assert_eq!(interpreter.buffered(), "D");
}

#[test]
fn functions_see_the_callers_bindings() {
    let body = "
        -> show
            > who
            ^
        -> first
            who = \"F\"
            ->> show
            ^
        -> second
            who = \"S\"
            ->> show
            ^
        ->> first
        ->> second
    ";
    assert_eq!(output(body), "FS");

    let (_, error) = runtime_error("-> show\n> who\n^\n->> show");
    assert_eq!(error.message, "Undefined variable 'who'");
}

#[test]
fn function_returns_a_value() {
    let body = "
        -> add a b
            ^ a $+ b
        total = ->> add $$$$$$$$ ;;$$$$$$$$;$$$$$$$
    ";
    assert_eq!(variable(body, "total").as_deref(), Some("3"));
    assert_eq!(variable(body, "a"), None, "parameters stay in the call frame");
}

#[test]
fn return_skips_the_rest_of_the_body() {
    let body = "
        -> pick n
            ? n
                ^ \"y\"
            !
            > \"-\"
            ^ \"n\"
        > ->> pick $$$
        > ->> pick $$
    ";
    assert_eq!(output(body), "y-n");
}

#[test]
fn arity_and_unknown_functions_are_errors() {
    let (_, error) = runtime_error("-> add a b\n^ a $+ b\n->> add $$$$$$$$");
    assert_eq!(error.message, "Function 'add' expects 2 arguments, got 1");

    let (_, error) = runtime_error("->> nope");
    assert_eq!(error.message, "Undefined function 'nope'");
}

#[test]
fn while_stops_on_the_first_false_check() {
    let body = "
        i = $$$$$$
        @ i $< ;;$$$$$$$$;$$$$$$$$
            > \"x\"
            i = i $+ $$$$$$$$
        !@!
        > \".\"
    ";
    assert_eq!(output(body), "xxx.");
    assert_eq!(variable(body, "i").as_deref(), Some("3"));

    let never = "
        i = ;;$$$$$$$$;$$$$$$$$
        @ i $< ;;$$$$$$$$;$$$$$$$$
            > \"x\"
        !@!
    ";
    assert_eq!(output(never), "");
}

#[test]
fn for_iterates_in_its_own_frame() {
    let body = "
        letters = [\"x\", \"y\", \"z\"]
        #@# letter letters
            > letter
        !@!
    ";
    assert_eq!(output(body), "xyz");
    assert_eq!(variable(body, "letter"), None);

    let (_, error) = runtime_error("#@# c \"abc\"\n> c\n!@!");
    assert_eq!(
        error.message,
        "For loop range expression must be an array, got string"
    );
}

#[test]
fn conditionals_take_the_first_true_branch() {
    let body = "
        n = ;;$$$$$$$$;$$$$$$$
        ? n $= $$$$$$$$
            > \"1\"
        ??# n $= ;;$$$$$$$$;$$$$$$$
            > \"2\"
        ??:
            > \"?\"
        !
        ? $$$$
            > \"nil is true\"
        !
    ";
    assert_eq!(output(body), "2");
}

#[test]
fn division_by_zero_jumps_to_catch() {
    let body = "
        %%
            > \"a\"
            x = $$$$$$$$ $/ $$$$$$
            > \"b\"
        %%%%
            > \"c\"
        ? $$$
            > \"d\"
        !
    ";
    assert_eq!(output(body), "acd");
}

#[test]
fn exception_literals_raise() {
    let (out, error) = runtime_error("> \"a\"\n(Boom)\n> \"b\"");
    assert_eq!(out, "a");
    assert_eq!(error.message, "Boom");

    assert_eq!(output("%%\n(Boom)\n%%%%\n> \"c\""), "c");
}

#[test]
fn catch_does_not_swallow_returns() {
    let body = "
        -> f
            %%
                ^ \"r\"
            %%%%
                > \"c\"
            ^ \"z\"
        > ->> f
    ";
    assert_eq!(output(body), "r");
}

#[test]
fn top_level_return_ends_the_program() {
    assert_eq!(output("> \"a\"\n^\n> \"b\""), "a");
}

#[test]
fn real_and_binary_families() {
    assert_eq!(variable("x = ### #/ ##", "x").as_deref(), Some("1.5"));
    assert_eq!(variable("x = #:## #* ##", "x").as_deref(), Some("2.4"));
    assert_eq!(
        variable("x = ;;$$$$$$$$;$$$$$$$$;$$$$$$$$ $/ ;;$$$$$$$$;$$$$$$$", "x").as_deref(),
        Some("3")
    );
    assert_eq!(variable("x = | $$$$$$$$", "x").as_deref(), Some("-1"));
    assert_eq!(variable("x = ### #< ####", "x").as_deref(), Some("true"));

    let (_, error) = runtime_error("x = ### $+ $$$$$$$$");
    assert_eq!(
        error.message,
        "Binary operator '$+' expects integers, got real and integer"
    );
}

#[test]
fn negative_factorial_and_square_root_fail() {
    let (_, error) = runtime_error("x = | $$$$$$$$ $!");
    assert_eq!(error.message, "Binary factorial of negative number");
    let (_, error) = runtime_error("x = | ## #\\");
    assert_eq!(error.message, "Real square root of negative number");
}

#[test]
fn input_reads_one_line_into_a_bound_name() {
    let body = "
        name = \"\"
        < name
        > name
        ->> list name
    ";
    let (out, result) = execute(body, "Zed\nignored\n");
    result.expect("runs");
    assert_eq!(out, "ZZed");

    let (_, error) = failure(execute(body, ""));
    assert_eq!(error.message, "Unexpected end of input");

    let (_, error) = failure(execute("< ghost", "boo\n"));
    assert_eq!(error.message, "Undefined variable 'ghost'");
}

#[test]
fn embedded_programs_are_isolated() {
    let body = r#"
        inner = "outer"
        code = "::: Program start > \"E\" inner = \"changed\" ;;; Program end"
        ->> : code
        > inner
    "#;
    assert_eq!(output(body), "Eo");

    let (_, error) = runtime_error(r#"->> : "::: Program start > nope ;;; Program end""#);
    assert_eq!(
        error.message,
        "error in embedded program: Undefined variable 'nope'"
    );

    let (_, error) = runtime_error(r#"->> : "x = $$$""#);
    assert!(
        error.message.starts_with("error in embedded program: expected"),
        "{}",
        error.message
    );
}

#[test]
fn reverse_twice_restores_strings_and_arrays() {
    let body = r#"
        s = "stressed"
        r = ->> reverse s
        rr = ->> reverse r
        a = ["x", "y", "z"]
        ra = ->> reverse a
        rra = ->> reverse ra
    "#;
    assert_eq!(variable(body, "r").as_deref(), Some("desserts"));
    assert_eq!(variable(body, "rr"), variable(body, "s"));
    assert_eq!(variable(body, "ra").as_deref(), Some("[\"z\", \"y\", \"x\"]"));
    assert_eq!(variable(body, "rra"), variable(body, "a"));
}

#[test]
fn getitem_past_the_end_of_an_array_fails() {
    let body = "
        a = [\"a\", \"b\", \"c\"]
        x = ->> getitem a ;;$$$$$$$$;$$$$$$$;$$$$$$$
    ";
    let (_, error) = runtime_error(body);
    assert_eq!(error.message, "getitem index 4 out of bounds (1-based)");
}

#[test]
fn binary_comparisons_reject_booleans() {
    let (_, error) = runtime_error("f = $$$\n? f $= $$$\n> \"y\"\n!");
    assert_eq!(
        error.message,
        "Binary operator '$=' expects integers, got boolean and boolean"
    );

    assert_eq!(output("> $$$\n> $$$$"), "tn");
}

#[test]
fn comments_are_ignored() {
    let body = "
        ~ a whole line
        > \"a\" ~ trailing
        > ~ marked
        > \"b\"
    ";
    assert_eq!(output(body), "ab");
}

#[test]
fn safety_limits() {
    let options = Options {
        max_loop_iterations: Some(10),
        max_call_depth: 16,
        ..Options::default()
    };

    let (_, error) = failure(execute_with("@ $$$\n!@!", "", &options));
    assert_eq!(error.message, "while loop exceeded 10 iterations");

    let (_, error) = failure(execute_with("-> down\n->> down\n^\n->> down", "", &options));
    assert_eq!(error.message, "maximum call depth of 16 exceeded");
}

#[test]
fn structural_errors_are_not_runtime_errors() {
    let (_, result) = execute("x =", "");
    let e = result.expect_err("parse fails");
    assert!(e.downcast_ref::<ParseError>().is_some(), "{e:?}");

    let strict = Options {
        unknown: UnknownChar::Error,
        ..Options::default()
    };
    let (_, result) = execute_with("> \"a\" €", "", &strict);
    let e = result.expect_err("lex fails");
    let lex = e.downcast_ref::<LexError>().expect("lex error");
    assert_eq!(lex.token, '€');

    assert_eq!(output("> \"a\" €"), "a");
}
