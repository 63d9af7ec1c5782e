use std::{borrow::Cow, fmt::Display, rc::Rc};

use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

use crate::lex::{Lexer, Op, Operator, Token, TokenKind};

#[derive(Error, Debug, Diagnostic)]
#[error("expected {expected}, found {found}")]
#[diagnostic(code(mel::parse), help("use {expected} here instead"))]
pub struct ParseError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    pub expected: String,
    pub found: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program<'de> {
    pub statements: Vec<Statement<'de>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'de> {
    Assign {
        name: &'de str,
        value: Expr<'de>,
    },
    Input {
        name: &'de str,
    },
    Output(Expr<'de>),
    OutputMany {
        direction: Direction,
        count: Expr<'de>,
    },
    Call(Call<'de>),
    Function(Rc<FunctionDef<'de>>),
    Return(Option<Expr<'de>>),
    If {
        branches: Vec<Branch<'de>>,
        otherwise: Option<Vec<Statement<'de>>>,
    },
    While {
        condition: Expr<'de>,
        body: Vec<Statement<'de>>,
    },
    For {
        variable: &'de str,
        range: Expr<'de>,
        body: Vec<Statement<'de>>,
    },
    Try {
        body: Vec<Statement<'de>>,
        handler: Vec<Statement<'de>>,
    },
    Throw(Cow<'de, str>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch<'de> {
    pub condition: Expr<'de>,
    pub body: Vec<Statement<'de>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `>>`
    Reversed,
    /// `<<`
    Normal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'de> {
    Str(Cow<'de, str>),
    Real(f64),
    Bits(BinaryLiteral),
    Array(Vec<Expr<'de>>),
    Ident(&'de str),
    Negate(Box<Expr<'de>>),
    Binary {
        lhs: Box<Expr<'de>>,
        op: Operator,
        rhs: Box<Expr<'de>>,
    },
    /// Factorial and square root. Whatever follows the operator is kept in
    /// `trailing` but never evaluated.
    Postfix {
        operand: Box<Expr<'de>>,
        op: Operator,
        trailing: Option<Box<Expr<'de>>>,
    },
    Call(Call<'de>),
    Exception(Cow<'de, str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryLiteral {
    False,
    True,
    Nil,
    Empty,
    Zero,
    BitZero,
    BitOne,
    /// `;;` followed by bit sentinels, most significant first.
    Bits(Vec<bool>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call<'de> {
    pub callee: Callee<'de>,
    pub args: Vec<Expr<'de>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee<'de> {
    Named(&'de str),
    /// `->> :` runs its string argument as a separate program.
    Embedded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef<'de> {
    pub name: &'de str,
    pub params: Vec<&'de str>,
    pub body: Vec<Statement<'de>>,
}

/// Tokens that end a delimiter-free run of expressions: call arguments, the
/// value of a `^`, and the optional operand after a postfix operator.
const EXPRESSION_END: &[TokenKind] = &[
    TokenKind::ProgramEnd,
    TokenKind::Assign,
    TokenKind::Input,
    TokenKind::OutputChar,
    TokenKind::OutputReversed,
    TokenKind::OutputNormal,
    TokenKind::Def,
    TokenKind::Call,
    TokenKind::Return,
    TokenKind::Try,
    TokenKind::If,
    TokenKind::ElseIf,
    TokenKind::Else,
    TokenKind::EndIf,
    TokenKind::While,
    TokenKind::For,
    TokenKind::EndLoop,
    TokenKind::Catch,
    TokenKind::Comma,
    TokenKind::Semicolon,
    TokenKind::RightParen,
    TokenKind::ArrayEnd,
    TokenKind::ArrayStart,
    TokenKind::LeftParen,
    TokenKind::Colon,
];

// Block terminators. A block stops in front of these without consuming them.
const PROGRAM_BODY_END: &[TokenKind] = &[TokenKind::ProgramEnd];
const FUNCTION_BODY_END: &[TokenKind] = &[TokenKind::Return, TokenKind::Def, TokenKind::ProgramEnd];
const IF_BODY_END: &[TokenKind] = &[TokenKind::EndIf, TokenKind::ElseIf, TokenKind::Else];
const ELSE_BODY_END: &[TokenKind] = &[TokenKind::EndIf];
const LOOP_BODY_END: &[TokenKind] = &[TokenKind::EndLoop];
const TRY_BODY_END: &[TokenKind] = &[TokenKind::Catch];
// The catch body has no closing token of its own.
const CATCH_BODY_END: &[TokenKind] = &[
    TokenKind::ProgramEnd,
    TokenKind::Def,
    TokenKind::Return,
    TokenKind::Try,
    TokenKind::If,
    TokenKind::While,
    TokenKind::For,
    TokenKind::EndIf,
    TokenKind::EndLoop,
    TokenKind::ElseIf,
    TokenKind::Else,
    TokenKind::Catch,
];

pub struct Parser<'de> {
    filename: Option<&'de str>,
    whole: &'de str,
    tokens: Vec<Token<'de>>,
    cursor: usize,
}

impl<'de> Parser<'de> {
    pub fn new(filename: Option<&'de str>, whole: &'de str) -> Result<Self, Error> {
        Self::from_lexer(Lexer::new(filename, whole))
    }

    pub fn from_lexer(lexer: Lexer<'de>) -> Result<Self, Error> {
        let filename = lexer.filename();
        let whole = lexer.source();
        let tokens = lexer.collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_tokens(filename, whole, tokens))
    }

    pub fn from_tokens(
        filename: Option<&'de str>,
        whole: &'de str,
        tokens: Vec<Token<'de>>,
    ) -> Self {
        Parser {
            filename,
            whole,
            tokens,
            cursor: 0,
        }
    }

    pub fn parse(mut self) -> Result<Program<'de>, Error> {
        self.expect(TokenKind::ProgramStart, "`::: Program start`")?;
        let statements = self.parse_block(PROGRAM_BODY_END)?;
        self.expect(TokenKind::ProgramEnd, "`;;; Program end`")?;
        Ok(Program { statements })
    }

    fn current(&self) -> Option<Token<'de>> {
        self.tokens.get(self.cursor).copied()
    }

    fn peek_kind(&self, ahead: usize) -> Option<TokenKind> {
        self.tokens.get(self.cursor + ahead).map(|token| token.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind(0) == Some(kind)
    }

    fn advance(&mut self) -> Option<Token<'de>> {
        let token = self.current()?;
        self.cursor += 1;
        Some(token)
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token<'de>, Error> {
        match self.current() {
            Some(token) if token.kind == kind => {
                self.cursor += 1;
                Ok(token)
            }
            _ => Err(self.error(expected)),
        }
    }

    fn error(&self, expected: impl Into<String>) -> Error {
        let src = NamedSource::new(self.filename.unwrap_or("<input>"), self.whole.to_string());
        let (span, found, line, column) = match self.current() {
            Some(token) => (
                SourceSpan::from(token.offset..token.offset + token.literal.len()),
                format!("'{}' ({})", token.literal, token.kind),
                token.line,
                token.column,
            ),
            None => {
                let (line, column) = self
                    .tokens
                    .last()
                    .map_or((1, 1), |token| (token.line, token.column));
                (
                    SourceSpan::from(self.whole.len()..self.whole.len()),
                    "end of input".to_string(),
                    line,
                    column,
                )
            }
        };
        ParseError {
            src,
            span,
            expected: expected.into(),
            found,
            line,
            column,
        }
        .into()
    }

    /// True when the next token cannot continue the current run of
    /// expressions. An identifier followed by `=` starts the next statement.
    fn at_expression_end(&self) -> bool {
        match self.peek_kind(0) {
            None => true,
            Some(kind) if EXPRESSION_END.contains(&kind) => true,
            Some(TokenKind::Ident) => self.peek_kind(1) == Some(TokenKind::Assign),
            Some(_) => false,
        }
    }

    fn at_exception_literal(&self) -> bool {
        self.check(TokenKind::LeftParen)
            && matches!(self.peek_kind(1), Some(TokenKind::Ident | TokenKind::String))
            && self.peek_kind(2) == Some(TokenKind::RightParen)
    }

    fn parse_block(&mut self, terminators: &[TokenKind]) -> Result<Vec<Statement<'de>>, Error> {
        let mut statements = Vec::new();
        loop {
            match self.peek_kind(0) {
                Some(kind) if terminators.contains(&kind) => break,
                None | Some(TokenKind::ProgramEnd) => {
                    let expected = terminators
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(" or ");
                    return Err(self.error(expected));
                }
                Some(_) => statements.push(self.parse_statement()?),
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement<'de>, Error> {
        let Some(token) = self.current() else {
            return Err(self.error("a statement"));
        };
        match token.kind {
            TokenKind::Ident if self.peek_kind(1) == Some(TokenKind::Assign) => {
                self.cursor += 2;
                let value = self.parse_expression()?;
                Ok(Statement::Assign {
                    name: token.literal,
                    value,
                })
            }
            TokenKind::Def => self.parse_function(),
            TokenKind::Call => Ok(Statement::Call(self.parse_call()?)),
            TokenKind::OutputChar => {
                self.advance();
                Ok(Statement::Output(self.parse_expression()?))
            }
            TokenKind::OutputReversed | TokenKind::OutputNormal => {
                self.advance();
                let direction = if token.kind == TokenKind::OutputReversed {
                    Direction::Reversed
                } else {
                    Direction::Normal
                };
                let count = self.parse_expression()?;
                Ok(Statement::OutputMany { direction, count })
            }
            TokenKind::Input => {
                self.advance();
                let name = self.expect(TokenKind::Ident, "a variable name")?.literal;
                Ok(Statement::Input { name })
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => {
                self.advance();
                let condition = self.parse_expression()?;
                let body = self.parse_block(LOOP_BODY_END)?;
                self.expect(TokenKind::EndLoop, "`!@!` to close the loop")?;
                Ok(Statement::While { condition, body })
            }
            TokenKind::For => {
                self.advance();
                let variable = self.expect(TokenKind::Ident, "a loop variable")?.literal;
                let range = self.parse_expression()?;
                let body = self.parse_block(LOOP_BODY_END)?;
                self.expect(TokenKind::EndLoop, "`!@!` to close the loop")?;
                Ok(Statement::For {
                    variable,
                    range,
                    body,
                })
            }
            TokenKind::Try => {
                self.advance();
                let body = self.parse_block(TRY_BODY_END)?;
                self.expect(TokenKind::Catch, "`%%%%`")?;
                let handler = self.parse_block(CATCH_BODY_END)?;
                Ok(Statement::Try { body, handler })
            }
            TokenKind::Return => self.parse_return(),
            TokenKind::LeftParen if self.at_exception_literal() => {
                Ok(Statement::Throw(self.parse_exception()?))
            }
            _ => Err(self.error("a statement")),
        }
    }

    fn parse_function(&mut self) -> Result<Statement<'de>, Error> {
        self.expect(TokenKind::Def, "`->`")?;
        let name = self.expect(TokenKind::Ident, "a function name")?.literal;

        let mut params = Vec::new();
        while self.check(TokenKind::Ident) && self.peek_kind(1) != Some(TokenKind::Assign) {
            if let Some(param) = self.advance() {
                params.push(param.literal);
            }
        }

        let mut body = self.parse_block(FUNCTION_BODY_END)?;
        if self.check(TokenKind::Return) {
            body.push(self.parse_return()?);
        }

        Ok(Statement::Function(Rc::new(FunctionDef { name, params, body })))
    }

    fn parse_return(&mut self) -> Result<Statement<'de>, Error> {
        self.expect(TokenKind::Return, "`^`")?;
        if self.at_expression_end() {
            return Ok(Statement::Return(None));
        }
        Ok(Statement::Return(Some(self.parse_expression()?)))
    }

    fn parse_if(&mut self) -> Result<Statement<'de>, Error> {
        self.expect(TokenKind::If, "`?`")?;
        let mut branches = Vec::new();

        let condition = self.parse_expression()?;
        let body = self.parse_block(IF_BODY_END)?;
        branches.push(Branch { condition, body });

        while self.check(TokenKind::ElseIf) {
            self.advance();
            let condition = self.parse_expression()?;
            let body = self.parse_block(IF_BODY_END)?;
            branches.push(Branch { condition, body });
        }

        let otherwise = if self.check(TokenKind::Else) {
            self.advance();
            Some(self.parse_block(ELSE_BODY_END)?)
        } else {
            None
        };

        self.expect(TokenKind::EndIf, "`!` to close the conditional")?;
        Ok(Statement::If {
            branches,
            otherwise,
        })
    }

    fn parse_call(&mut self) -> Result<Call<'de>, Error> {
        self.expect(TokenKind::Call, "`->>`")?;
        let callee = if self.check(TokenKind::Colon) {
            self.advance();
            Callee::Embedded
        } else {
            Callee::Named(self.expect(TokenKind::Ident, "a function name or `:`")?.literal)
        };

        let mut args = Vec::new();
        while !self.at_expression_end() {
            args.push(self.parse_expression()?);
        }
        Ok(Call { callee, args })
    }

    fn parse_exception(&mut self) -> Result<Cow<'de, str>, Error> {
        self.expect(TokenKind::LeftParen, "`(`")?;
        let message = match self.current() {
            Some(token) if token.kind == TokenKind::Ident => Cow::Borrowed(token.literal),
            Some(token) if token.kind == TokenKind::String => string_value(token.literal),
            _ => return Err(self.error("an exception name or message")),
        };
        self.advance();
        self.expect(TokenKind::RightParen, "`)`")?;
        Ok(message)
    }

    pub fn parse_expression(&mut self) -> Result<Expr<'de>, Error> {
        self.parse_comparison()
    }

    fn operator_where(&self, class: fn(Op) -> bool) -> Option<Operator> {
        match self.peek_kind(0) {
            Some(TokenKind::Operator(operator)) if class(operator.op) => Some(operator),
            _ => None,
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr<'de>, Error> {
        let mut lhs = self.parse_additive()?;
        while let Some(op) = self.operator_where(Op::is_comparison) {
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr<'de>, Error> {
        let mut lhs = self.parse_term()?;
        while let Some(op) = self.operator_where(Op::is_additive) {
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr<'de>, Error> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.operator_where(Op::is_term) {
            self.advance();
            lhs = if op.op.is_postfix() {
                let operand_follows = !self.at_expression_end()
                    && !matches!(self.peek_kind(0), Some(TokenKind::Operator(_)));
                let trailing = if operand_follows {
                    Some(Box::new(self.parse_unary()?))
                } else {
                    None
                };
                Expr::Postfix {
                    operand: Box::new(lhs),
                    op,
                    trailing,
                }
            } else {
                let rhs = self.parse_unary()?;
                Expr::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                }
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr<'de>, Error> {
        if self.check(TokenKind::Negate) {
            self.advance();
            let operand = self.parse_primary()?;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr<'de>, Error> {
        let Some(token) = self.current() else {
            return Err(self.error("an expression"));
        };

        let sentinel = match token.kind {
            TokenKind::False => Some(BinaryLiteral::False),
            TokenKind::True => Some(BinaryLiteral::True),
            TokenKind::Nil => Some(BinaryLiteral::Nil),
            TokenKind::Empty => Some(BinaryLiteral::Empty),
            TokenKind::Zero => Some(BinaryLiteral::Zero),
            TokenKind::BitZero => Some(BinaryLiteral::BitZero),
            TokenKind::BitOne => Some(BinaryLiteral::BitOne),
            _ => None,
        };
        if let Some(literal) = sentinel {
            self.advance();
            return Ok(Expr::Bits(literal));
        }

        match token.kind {
            TokenKind::String => {
                self.advance();
                Ok(Expr::Str(string_value(token.literal)))
            }
            TokenKind::RealNumber => {
                let value = self.real_value(token.literal)?;
                self.advance();
                Ok(Expr::Real(value))
            }
            TokenKind::BinaryPrefix => {
                self.advance();
                let mut bits = Vec::new();
                loop {
                    match self.peek_kind(0) {
                        Some(TokenKind::BitZero) => bits.push(false),
                        Some(TokenKind::BitOne) => bits.push(true),
                        _ => break,
                    }
                    self.advance();
                    if self.check(TokenKind::Semicolon) {
                        self.advance();
                    }
                }
                Ok(Expr::Bits(BinaryLiteral::Bits(bits)))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(Expr::Ident(token.literal))
            }
            TokenKind::ArrayStart => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(TokenKind::ArrayEnd) {
                    elements.push(self.parse_expression()?);
                    while self.check(TokenKind::Comma) {
                        self.advance();
                        elements.push(self.parse_expression()?);
                    }
                }
                self.expect(TokenKind::ArrayEnd, "`]`")?;
                Ok(Expr::Array(elements))
            }
            TokenKind::LeftParen if self.at_exception_literal() => {
                Ok(Expr::Exception(self.parse_exception()?))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "`)`")?;
                Ok(expr)
            }
            TokenKind::Call => Ok(Expr::Call(self.parse_call()?)),
            _ => Err(self.error("an expression")),
        }
    }

    /// Each `:`-separated run of `#` contributes its length as one digit
    /// string: `###:#` is `3.1`, `##########` is `10.0`.
    fn real_value(&self, literal: &str) -> Result<f64, Error> {
        let digits: Vec<usize> = literal.split(':').map(str::len).collect();
        let text = match digits.as_slice() {
            [whole] => whole.to_string(),
            [whole, fraction] => format!("{whole}.{fraction}"),
            _ => {
                return Err(self.error("a real number with at most one `:` separator"));
            }
        };
        text.parse()
            .map_err(|_| self.error("a real number with at most one `:` separator"))
    }
}

fn string_value(literal: &str) -> Cow<'_, str> {
    let raw = literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(literal);
    unescape(raw)
}

fn unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

struct Block<'a, 'de>(&'a [Statement<'de>]);

impl Display for Block<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, statement) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{statement}")?;
        }
        write!(f, ")")
    }
}

impl Display for Program<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl Display for Statement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Assign { name, value } => write!(f, "(= {name} {value})"),
            Statement::Input { name } => write!(f, "(< {name})"),
            Statement::Output(expr) => write!(f, "(> {expr})"),
            Statement::OutputMany { direction, count } => match direction {
                Direction::Reversed => write!(f, "(>> {count})"),
                Direction::Normal => write!(f, "(<< {count})"),
            },
            Statement::Call(call) => write!(f, "{call}"),
            Statement::Function(def) => {
                write!(f, "(-> {} ({}) {})", def.name, def.params.join(" "), Block(&def.body))
            }
            Statement::Return(None) => write!(f, "(^)"),
            Statement::Return(Some(value)) => write!(f, "(^ {value})"),
            Statement::If {
                branches,
                otherwise,
            } => {
                write!(f, "(?")?;
                for (i, branch) in branches.iter().enumerate() {
                    let keyword = if i == 0 { "" } else { "??# " };
                    write!(f, " ({keyword}{} {})", branch.condition, Block(&branch.body))?;
                }
                if let Some(body) = otherwise {
                    write!(f, " (??: {})", Block(body))?;
                }
                write!(f, ")")
            }
            Statement::While { condition, body } => write!(f, "(@ {condition} {})", Block(body)),
            Statement::For {
                variable,
                range,
                body,
            } => write!(f, "(#@# {variable} {range} {})", Block(body)),
            Statement::Try { body, handler } => {
                write!(f, "(%% {} (%%%% {}))", Block(body), Block(handler))
            }
            Statement::Throw(message) => write!(f, "(throw {message:?})"),
        }
    }
}

impl Display for Call<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.callee {
            Callee::Named(name) => write!(f, "(->> {name}")?,
            Callee::Embedded => write!(f, "(->> :")?,
        }
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        write!(f, ")")
    }
}

impl Display for BinaryLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryLiteral::False => write!(f, "false"),
            BinaryLiteral::True => write!(f, "true"),
            BinaryLiteral::Nil => write!(f, "nil"),
            BinaryLiteral::Empty => write!(f, "[]"),
            BinaryLiteral::Zero => write!(f, "0"),
            BinaryLiteral::BitZero => write!(f, "0b0"),
            BinaryLiteral::BitOne => write!(f, "0b1"),
            BinaryLiteral::Bits(bits) => {
                write!(f, "0b")?;
                for bit in bits {
                    write!(f, "{}", u8::from(*bit))?;
                }
                Ok(())
            }
        }
    }
}

impl Display for Expr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Str(s) => write!(f, "{s:?}"),
            Expr::Real(n) => write!(f, "{n:?}"),
            Expr::Bits(literal) => write!(f, "{literal}"),
            Expr::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::Negate(operand) => write!(f, "(| {operand})"),
            Expr::Binary { lhs, op, rhs } => write!(f, "({op} {lhs} {rhs})"),
            Expr::Postfix { operand, op, .. } => write!(f, "({op} {operand})"),
            Expr::Call(call) => write!(f, "{call}"),
            Expr::Exception(message) => write!(f, "(exception {message:?})"),
        }
    }
}
