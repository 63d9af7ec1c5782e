use std::fmt::Display;

use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[error("Unexpected character '{token}'")]
#[diagnostic(
    code(mel::lex::unexpected_character),
    help("remove or correct the character: `{token}`")
)]
pub struct LexError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this character")]
    bad_bit: SourceSpan,

    pub token: char,
    pub line: usize,
    pub column: usize,
}

#[derive(Error, Debug, Diagnostic)]
#[error("unterminated double quote string")]
#[diagnostic(code(mel::lex::unterminated_string))]
pub struct StringTerminationError {
    #[source_code]
    src: NamedSource<String>,

    #[label("Syntax Error: Missing trailing `\"` symbol to terminate the string literal")]
    bad_line: SourceSpan,

    pub line: usize,
    pub column: usize,
}

/// What the lexer does with a character that no rule recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownChar {
    /// Skip it silently, the way MEL always has.
    #[default]
    Discard,
    /// Stop with a [`LexError`] (or [`StringTerminationError`] for a lone `"`).
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// `#` operators: float arithmetic.
    Real,
    /// `$` operators: integer arithmetic.
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Factorial,
    Sqrt,
    Mod,
    Pow,
    Less,
    Equal,
    Greater,
    LessEqual,
    GreaterEqual,
    NotEqual,
}

impl Op {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Op::Less | Op::Equal | Op::Greater | Op::LessEqual | Op::GreaterEqual | Op::NotEqual
        )
    }

    pub fn is_additive(self) -> bool {
        matches!(self, Op::Add | Op::Sub)
    }

    pub fn is_term(self) -> bool {
        matches!(
            self,
            Op::Mul | Op::Div | Op::Mod | Op::Pow | Op::Factorial | Op::Sqrt
        )
    }

    /// Factorial and square root only look at their left operand.
    pub fn is_postfix(self) -> bool {
        matches!(self, Op::Factorial | Op::Sqrt)
    }

    fn name(self) -> &'static str {
        match self {
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Factorial => "FACTORIAL",
            Op::Sqrt => "SQRT",
            Op::Mod => "MOD",
            Op::Pow => "POW",
            Op::Less => "LT",
            Op::Equal => "EQ",
            Op::Greater => "GT",
            Op::LessEqual => "LE_EQ",
            Op::GreaterEqual => "GE_EQ",
            Op::NotEqual => "NE_EQ",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Factorial => "!",
            Op::Sqrt => "\\",
            Op::Mod => "%",
            Op::Pow => "^",
            Op::Less => "<",
            Op::Equal => "=",
            Op::Greater => ">",
            Op::LessEqual => "<=",
            Op::GreaterEqual => ">=",
            Op::NotEqual => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator {
    pub family: Family,
    pub op: Op,
}

impl Operator {
    pub const fn real(op: Op) -> Self {
        Operator {
            family: Family::Real,
            op,
        }
    }

    pub const fn binary(op: Op) -> Self {
        Operator {
            family: Family::Binary,
            op,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.family {
            Family::Real => '#',
            Family::Binary => '$',
        };
        write!(f, "{prefix}{}", self.op.suffix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    pub line: usize,
    pub column: usize,
    /// Byte offset of the literal in the source.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    ProgramStart,
    ProgramEnd,
    String,
    ArrayStart,
    ArrayEnd,
    RealNumber,
    BinaryPrefix,
    Operator(Operator),
    Assign,
    Negate,
    BitOne,
    BitZero,
    Zero,
    Empty,
    Nil,
    True,
    False,
    Input,
    OutputReversed,
    OutputNormal,
    OutputChar,
    Call,
    Def,
    Try,
    Catch,
    If,
    ElseIf,
    Else,
    EndIf,
    While,
    For,
    EndLoop,
    Return,
    Comma,
    Semicolon,
    LeftParen,
    RightParen,
    Colon,
    Ident,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::ProgramStart => "PROGRAM_START",
            TokenKind::ProgramEnd => "PROGRAM_END",
            TokenKind::String => "STRING",
            TokenKind::ArrayStart => "ARRAY_START",
            TokenKind::ArrayEnd => "ARRAY_END",
            TokenKind::RealNumber => "REAL_NUMBER",
            TokenKind::BinaryPrefix => "BINARY_LITERAL_PREFIX",
            TokenKind::Operator(op) => {
                let family = match op.family {
                    Family::Real => "REAL",
                    Family::Binary => "BINARY",
                };
                return write!(f, "{family}_{}", op.op.name());
            }
            TokenKind::Assign => "ASSIGN",
            TokenKind::Negate => "UNARY_NEGATE",
            TokenKind::BitOne => "BINARY_BIT_ONE",
            TokenKind::BitZero => "BINARY_BIT_ZERO",
            TokenKind::Zero => "BINARY_ZERO_DECIMAL",
            TokenKind::Empty => "BINARY_EMPTY",
            TokenKind::Nil => "BINARY_ABSENCE",
            TokenKind::True => "BINARY_TRUE",
            TokenKind::False => "BINARY_FALSE",
            TokenKind::Input => "INPUT",
            TokenKind::OutputReversed => "OUTPUT_REVERSED",
            TokenKind::OutputNormal => "OUTPUT_NORMAL",
            TokenKind::OutputChar => "OUTPUT_CHAR",
            TokenKind::Call => "FUNCTION_CALL_PREFIX",
            TokenKind::Def => "FUNCTION_DEF",
            TokenKind::Try => "TRY",
            TokenKind::Catch => "CATCH",
            TokenKind::If => "IF",
            TokenKind::ElseIf => "ELSE_IF",
            TokenKind::Else => "ELSE",
            TokenKind::EndIf => "END_CONDITIONAL",
            TokenKind::While => "WHILE_LOOP",
            TokenKind::For => "FOR_LOOP",
            TokenKind::EndLoop => "END_LOOP",
            TokenKind::Return => "RETURN",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON_DELIMITER",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::Colon => "COLON",
            TokenKind::Ident => "IDENTIFIER",
        };
        f.write_str(name)
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}:{}] {} {}",
            self.line, self.column, self.kind, self.literal
        )
    }
}

#[derive(Clone, Copy)]
enum Pattern {
    Exact(&'static str),
    Scan(fn(&str) -> Option<usize>),
}

impl Pattern {
    fn matches(self, rest: &str) -> Option<usize> {
        match self {
            Pattern::Exact(text) => rest.starts_with(text).then_some(text.len()),
            Pattern::Scan(scan) => scan(rest).filter(|&len| len > 0),
        }
    }
}

#[derive(Clone, Copy)]
enum Action {
    Emit(TokenKind),
    Skip,
    Unknown,
}

const fn real(op: Op) -> Action {
    Action::Emit(TokenKind::Operator(Operator::real(op)))
}

const fn binary(op: Op) -> Action {
    Action::Emit(TokenKind::Operator(Operator::binary(op)))
}

/// The lexer takes the first rule that matches at the cursor, not the longest
/// one, so any rule whose text is a prefix of another's must come after it.
static RULES: &[(Action, Pattern)] = &[
    (Action::Emit(TokenKind::ProgramStart), Pattern::Scan(program_start)),
    (Action::Emit(TokenKind::ProgramEnd), Pattern::Scan(program_end)),
    (Action::Skip, Pattern::Scan(marked_comment)),
    (Action::Skip, Pattern::Scan(line_comment)),
    (Action::Emit(TokenKind::String), Pattern::Scan(string_literal)),
    (Action::Emit(TokenKind::ArrayStart), Pattern::Exact("[")),
    (Action::Emit(TokenKind::ArrayEnd), Pattern::Exact("]")),
    (Action::Emit(TokenKind::For), Pattern::Exact("#@#")),
    (real(Op::LessEqual), Pattern::Exact("#<=")),
    (real(Op::GreaterEqual), Pattern::Exact("#>=")),
    (real(Op::NotEqual), Pattern::Exact("#!=")),
    (binary(Op::LessEqual), Pattern::Exact("$<=")),
    (binary(Op::GreaterEqual), Pattern::Exact("$>=")),
    (binary(Op::NotEqual), Pattern::Exact("$!=")),
    (real(Op::Add), Pattern::Exact("#+")),
    (real(Op::Sub), Pattern::Exact("#-")),
    (real(Op::Mul), Pattern::Exact("#*")),
    (real(Op::Div), Pattern::Exact("#/")),
    (real(Op::Factorial), Pattern::Exact("#!")),
    (real(Op::Sqrt), Pattern::Exact("#\\")),
    (real(Op::Mod), Pattern::Exact("#%")),
    (real(Op::Pow), Pattern::Exact("#^")),
    (binary(Op::Add), Pattern::Exact("$+")),
    (binary(Op::Sub), Pattern::Exact("$-")),
    (binary(Op::Mul), Pattern::Exact("$*")),
    (binary(Op::Div), Pattern::Exact("$/")),
    (binary(Op::Factorial), Pattern::Exact("$!")),
    (binary(Op::Sqrt), Pattern::Exact("$\\")),
    (binary(Op::Mod), Pattern::Exact("$%")),
    (binary(Op::Pow), Pattern::Exact("$^")),
    (real(Op::Less), Pattern::Exact("#<")),
    (real(Op::Equal), Pattern::Exact("#=")),
    (real(Op::Greater), Pattern::Exact("#>")),
    (binary(Op::Less), Pattern::Exact("$<")),
    (binary(Op::Equal), Pattern::Exact("$=")),
    (binary(Op::Greater), Pattern::Exact("$>")),
    (Action::Emit(TokenKind::RealNumber), Pattern::Scan(real_number)),
    (Action::Emit(TokenKind::BinaryPrefix), Pattern::Exact(";;")),
    (Action::Emit(TokenKind::Assign), Pattern::Exact("=")),
    (Action::Emit(TokenKind::Negate), Pattern::Exact("|")),
    (Action::Emit(TokenKind::BitOne), Pattern::Exact("$$$$$$$$")),
    (Action::Emit(TokenKind::BitZero), Pattern::Exact("$$$$$$$")),
    (Action::Emit(TokenKind::Zero), Pattern::Exact("$$$$$$")),
    (Action::Emit(TokenKind::Empty), Pattern::Exact("$$$$$")),
    (Action::Emit(TokenKind::Nil), Pattern::Exact("$$$$")),
    (Action::Emit(TokenKind::True), Pattern::Exact("$$$")),
    (Action::Emit(TokenKind::False), Pattern::Exact("$$")),
    (Action::Emit(TokenKind::Call), Pattern::Exact("->>")),
    (Action::Emit(TokenKind::Def), Pattern::Exact("->")),
    (Action::Emit(TokenKind::OutputReversed), Pattern::Exact(">>")),
    (Action::Emit(TokenKind::OutputNormal), Pattern::Exact("<<")),
    (Action::Emit(TokenKind::OutputChar), Pattern::Exact(">")),
    (Action::Emit(TokenKind::Input), Pattern::Exact("<")),
    (Action::Emit(TokenKind::Catch), Pattern::Exact("%%%%")),
    (Action::Emit(TokenKind::Try), Pattern::Exact("%%")),
    (Action::Emit(TokenKind::ElseIf), Pattern::Exact("??#")),
    (Action::Emit(TokenKind::Else), Pattern::Exact("??:")),
    (Action::Emit(TokenKind::If), Pattern::Exact("?")),
    (Action::Emit(TokenKind::EndLoop), Pattern::Exact("!@!")),
    (Action::Emit(TokenKind::EndIf), Pattern::Exact("!")),
    (Action::Emit(TokenKind::While), Pattern::Exact("@")),
    (Action::Emit(TokenKind::Return), Pattern::Exact("^")),
    (Action::Emit(TokenKind::Comma), Pattern::Exact(",")),
    (Action::Emit(TokenKind::Semicolon), Pattern::Exact(";")),
    (Action::Emit(TokenKind::LeftParen), Pattern::Exact("(")),
    (Action::Emit(TokenKind::RightParen), Pattern::Exact(")")),
    (Action::Emit(TokenKind::Colon), Pattern::Exact(":")),
    (Action::Emit(TokenKind::Ident), Pattern::Scan(identifier)),
    (Action::Skip, Pattern::Scan(whitespace)),
    (Action::Unknown, Pattern::Scan(any_char)),
];

fn program_marker(rest: &str, lead: &str, word: &str) -> Option<usize> {
    let after = rest.strip_prefix(lead)?.trim_start();
    let after = after.strip_prefix("Program")?.trim_start();
    let after = after.strip_prefix(word)?;
    Some(rest.len() - after.len())
}

fn program_start(rest: &str) -> Option<usize> {
    program_marker(rest, ":::", "start")
}

fn program_end(rest: &str) -> Option<usize> {
    program_marker(rest, ";;;", "end")
}

fn line_comment(rest: &str) -> Option<usize> {
    if !rest.starts_with('~') {
        return None;
    }
    Some(rest.find('\n').unwrap_or(rest.len()))
}

// `> ~ ...` is a comment, not an output of whatever follows.
fn marked_comment(rest: &str) -> Option<usize> {
    let trimmed = rest.strip_prefix('>')?.trim_start();
    let comment = line_comment(trimmed)?;
    Some(rest.len() - trimmed.len() + comment)
}

fn string_literal(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices();
    if chars.next()?.1 != '"' {
        return None;
    }
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some(i + 1),
            '\\' => {
                chars.next()?;
            }
            _ => {}
        }
    }
    None
}

fn real_number(rest: &str) -> Option<usize> {
    let run = |s: &str| s.len() - s.trim_start_matches('#').len();
    let mut len = run(rest);
    if len == 0 {
        return None;
    }
    while let Some(group) = rest[len..].strip_prefix(':') {
        match run(group) {
            0 => break,
            n => len += 1 + n,
        }
    }
    Some(len)
}

fn identifier(rest: &str) -> Option<usize> {
    let first = rest.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    Some(
        rest.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len()),
    )
}

fn whitespace(rest: &str) -> Option<usize> {
    Some(rest.len() - rest.trim_start().len())
}

fn any_char(rest: &str) -> Option<usize> {
    rest.chars().next().map(char::len_utf8)
}

pub struct Lexer<'de> {
    filename: Option<&'de str>,
    whole: &'de str,
    rest: &'de str,
    byte: usize,
    line: usize,
    column: usize,
    unknown: UnknownChar,
}

impl<'de> Lexer<'de> {
    pub fn new(filename: Option<&'de str>, input: &'de str) -> Self {
        Lexer {
            filename,
            whole: input,
            rest: input,
            byte: 0,
            line: 1,
            column: 1,
            unknown: UnknownChar::default(),
        }
    }

    pub fn with_unknown(mut self, unknown: UnknownChar) -> Self {
        self.unknown = unknown;
        self
    }

    pub fn filename(&self) -> Option<&'de str> {
        self.filename
    }

    pub fn source(&self) -> &'de str {
        self.whole
    }

    fn advance(&mut self, len: usize) {
        for c in self.rest[..len].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.byte += len;
        self.rest = &self.rest[len..];
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.filename.unwrap_or("<input>"), self.whole.to_string())
    }

    fn unknown_error(&self, literal: &str, offset: usize, line: usize, column: usize) -> Error {
        if literal == "\"" {
            StringTerminationError {
                src: self.named_source(),
                bad_line: SourceSpan::from(offset..self.whole.len()),
                line,
                column,
            }
            .into()
        } else {
            LexError {
                src: self.named_source(),
                bad_bit: SourceSpan::from(offset..offset + literal.len()),
                token: literal.chars().next().unwrap_or_default(),
                line,
                column,
            }
            .into()
        }
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let first = self.rest.chars().next()?;
            let (action, len) = RULES
                .iter()
                .find_map(|(action, pattern)| pattern.matches(self.rest).map(|len| (*action, len)))
                .unwrap_or((Action::Unknown, first.len_utf8()));

            let literal = &self.rest[..len];
            let (offset, line, column) = (self.byte, self.line, self.column);
            self.advance(len);

            match action {
                Action::Emit(kind) => {
                    return Some(Ok(Token {
                        kind,
                        literal,
                        line,
                        column,
                        offset,
                    }));
                }
                Action::Skip => continue,
                Action::Unknown => match self.unknown {
                    UnknownChar::Discard => continue,
                    UnknownChar::Error => {
                        return Some(Err(self.unknown_error(literal, offset, line, column)));
                    }
                },
            }
        }
    }
}

pub fn tokenize<'de>(
    filename: Option<&'de str>,
    source: &'de str,
    unknown: UnknownChar,
) -> Result<Vec<Token<'de>>, Error> {
    Lexer::new(filename, source).with_unknown(unknown).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(None, source, UnknownChar::Discard)
            .expect("lexes")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn dollar_runs_are_single_sentinels() {
        let expected = [
            (2, TokenKind::False),
            (3, TokenKind::True),
            (4, TokenKind::Nil),
            (5, TokenKind::Empty),
            (6, TokenKind::Zero),
            (7, TokenKind::BitZero),
            (8, TokenKind::BitOne),
        ];
        for (count, kind) in expected {
            let source = "$".repeat(count);
            assert_eq!(kinds(&source), vec![kind], "{count} dollars");
        }
    }

    #[test]
    fn longer_operators_win_over_their_prefixes() {
        assert_eq!(
            kinds("#<= #< $!= $! ->> -> >> > << < %%%% %% ??# ??: ? !@! !"),
            vec![
                TokenKind::Operator(Operator::real(Op::LessEqual)),
                TokenKind::Operator(Operator::real(Op::Less)),
                TokenKind::Operator(Operator::binary(Op::NotEqual)),
                TokenKind::Operator(Operator::binary(Op::Factorial)),
                TokenKind::Call,
                TokenKind::Def,
                TokenKind::OutputReversed,
                TokenKind::OutputChar,
                TokenKind::OutputNormal,
                TokenKind::Input,
                TokenKind::Catch,
                TokenKind::Try,
                TokenKind::ElseIf,
                TokenKind::Else,
                TokenKind::If,
                TokenKind::EndLoop,
                TokenKind::EndIf,
            ]
        );
    }

    #[test]
    fn hash_operators_are_not_real_numbers() {
        assert_eq!(
            kinds("### #+ # #@# x"),
            vec![
                TokenKind::RealNumber,
                TokenKind::Operator(Operator::real(Op::Add)),
                TokenKind::RealNumber,
                TokenKind::For,
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn real_number_takes_colon_groups() {
        let tokens = tokenize(None, "###:# #:", UnknownChar::Discard).unwrap();
        assert_eq!(tokens[0].literal, "###:#");
        assert_eq!(tokens[1].literal, "#");
        assert_eq!(tokens[2].kind, TokenKind::Colon);
    }

    #[test]
    fn program_markers_allow_whitespace() {
        assert_eq!(
            kinds(":::   Program\tstart\n;;;Program end"),
            vec![TokenKind::ProgramStart, TokenKind::ProgramEnd]
        );
        assert_eq!(
            kinds(";;$$$$$$$$;$$$$$$$"),
            vec![
                TokenKind::BinaryPrefix,
                TokenKind::BitOne,
                TokenKind::Semicolon,
                TokenKind::BitZero,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("x ~ anything > \"here\"\n> ~ also a comment\n> y"),
            vec![TokenKind::Ident, TokenKind::OutputChar, TokenKind::Ident]
        );
    }

    #[test]
    fn strings_keep_escapes_and_newlines() {
        let tokens = tokenize(None, "\"a\\\"b\nc\" z", UnknownChar::Discard).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, "\"a\\\"b\nc\"");
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].column, 4);
    }

    #[test]
    fn tracks_lines_and_columns() {
        let tokens = tokenize(None, "a = $$$\n  > a", UnknownChar::Discard).unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(positions, vec![(1, 1), (1, 3), (1, 5), (2, 3), (2, 5)]);
        assert_eq!(tokens[3].offset, 10);
    }

    #[test]
    fn unknown_characters_follow_the_policy() {
        assert_eq!(kinds("a & b"), vec![TokenKind::Ident, TokenKind::Ident]);

        let err = tokenize(None, "a & b", UnknownChar::Error).unwrap_err();
        let err = err.downcast_ref::<LexError>().expect("lex error");
        assert_eq!(err.token, '&');
        assert_eq!((err.line, err.column), (1, 3));

        let err = tokenize(None, "x = \"open", UnknownChar::Error).unwrap_err();
        assert!(err.downcast_ref::<StringTerminationError>().is_some());
    }

    #[test]
    fn tokenizing_is_deterministic() {
        let source = "::: Program start\nx = ;;$$$$$$$$;$$$$$$$ $+ ##:#\n> x\n;;; Program end";
        let first = tokenize(None, source, UnknownChar::Discard).unwrap();
        let second = tokenize(None, source, UnknownChar::Discard).unwrap();
        assert_eq!(first, second);
    }
}
