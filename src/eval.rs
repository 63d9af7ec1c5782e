use std::{
    borrow::Cow,
    cell::RefCell,
    collections::HashMap,
    fmt::Display,
    io::{BufRead, Write},
    rc::Rc,
};

use miette::Diagnostic;
use thiserror::Error;

use crate::{
    Options,
    env::Environment,
    lex::{Family, Lexer, Op, Operator},
    parse::{BinaryLiteral, Call, Callee, Direction, Expr, FunctionDef, Parser, Program, Statement},
    system,
};

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
#[error("{message}")]
#[diagnostic(code(mel::runtime))]
pub struct RuntimeError {
    pub message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        RuntimeError {
            message: message.into(),
        }
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(format!("Undefined variable '{name}'"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value<'de> {
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(Cow<'de, str>),
    /// Shared: aliases of an array see each other's appends.
    Array(Rc<RefCell<Vec<Value<'de>>>>),
    Nil,
}

impl<'de> Value<'de> {
    pub fn array(items: Vec<Value<'de>>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Real(_) => "real",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Nil => "nil",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Real(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(items) => !items.borrow().is_empty(),
            Value::Nil => false,
        }
    }

    fn as_real(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Real(n) => Some(*n),
            _ => None,
        }
    }
}

impl Display for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Real(n) => write!(f, "{n:?}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        Value::Str(s) => write!(f, "{s:?}")?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "]")
            }
            Value::Nil => write!(f, "nil"),
        }
    }
}

/// Why a block stopped early. A `^` and a runtime error unwind through the
/// same statements but are only ever caught at different boundaries: calls
/// catch returns, `%%`/`%%%%` catches errors.
#[derive(Debug)]
pub enum Flow<'de> {
    Return(Value<'de>),
    Error(RuntimeError),
}

impl From<RuntimeError> for Flow<'_> {
    fn from(error: RuntimeError) -> Self {
        Flow::Error(error)
    }
}

pub struct Interpreter<'de, 'io> {
    environment: Environment<'de>,
    functions: HashMap<&'de str, Rc<FunctionDef<'de>>>,
    buffer: Vec<char>,
    out: &'io mut dyn Write,
    input: &'io mut dyn BufRead,
    options: Options,
    depth: usize,
}

impl<'de, 'io> Interpreter<'de, 'io> {
    pub fn new(out: &'io mut dyn Write, input: &'io mut dyn BufRead, options: Options) -> Self {
        Self {
            environment: Environment::new(),
            functions: HashMap::new(),
            buffer: Vec::new(),
            out,
            input,
            options,
            depth: 0,
        }
    }

    /// Runs a whole program. A `^` outside any function ends the program
    /// normally.
    pub fn interpret(&mut self, program: &Program<'de>) -> Result<(), RuntimeError> {
        match self.exec_block(&program.statements) {
            Ok(()) | Err(Flow::Return(_)) => Ok(()),
            Err(Flow::Error(error)) => Err(error),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Value<'de>> {
        self.environment.get(name).ok()
    }

    /// Characters written by `>` that `>>`/`<<` have not consumed yet.
    pub fn buffered(&self) -> String {
        self.buffer.iter().collect()
    }

    pub(crate) fn environment(&self) -> &Environment<'de> {
        &self.environment
    }

    pub(crate) fn environment_mut(&mut self) -> &mut Environment<'de> {
        &mut self.environment
    }

    pub(crate) fn write_text(&mut self, text: &str) -> Result<(), RuntimeError> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| RuntimeError::new(format!("output error: {e}")))
    }

    /// Lexes, parses and runs `source` in a fresh interpreter that shares
    /// only our output and input streams.
    pub(crate) fn run_nested(&mut self, source: &str) -> Result<(), miette::Error> {
        if self.depth >= self.options.max_call_depth {
            return Err(self.depth_exceeded().into());
        }
        let lexer = Lexer::new(None, source).with_unknown(self.options.unknown);
        let program = Parser::from_lexer(lexer)?.parse()?;
        let mut nested = Interpreter::new(&mut *self.out, &mut *self.input, self.options.clone());
        nested.depth = self.depth + 1;
        nested.interpret(&program)?;
        Ok(())
    }

    fn depth_exceeded(&self) -> RuntimeError {
        RuntimeError::new(format!(
            "maximum call depth of {} exceeded",
            self.options.max_call_depth
        ))
    }

    fn exec_block(&mut self, statements: &[Statement<'de>]) -> Result<(), Flow<'de>> {
        for statement in statements {
            self.exec(statement)?;
        }
        Ok(())
    }

    fn exec(&mut self, statement: &Statement<'de>) -> Result<(), Flow<'de>> {
        match statement {
            Statement::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.define(Cow::Borrowed(*name), value);
            }
            Statement::Input { name } => {
                let line = self.read_line()?;
                self.environment.assign(name, Value::Str(Cow::Owned(line)))?;
            }
            Statement::Output(expr) => {
                let value = self.evaluate(expr)?;
                self.output_char(&value)?;
            }
            Statement::OutputMany { direction, count } => {
                let count = self.evaluate(count)?;
                self.output_many(*direction, &count)?;
            }
            Statement::Call(call) => {
                self.call(call)?;
            }
            Statement::Function(def) => {
                self.functions.insert(def.name, Rc::clone(def));
            }
            Statement::Return(value) => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                return Err(Flow::Return(value));
            }
            Statement::If {
                branches,
                otherwise,
            } => {
                for branch in branches {
                    if self.evaluate(&branch.condition)?.is_truthy() {
                        return self.exec_block(&branch.body);
                    }
                }
                if let Some(body) = otherwise {
                    self.exec_block(body)?;
                }
            }
            Statement::While { condition, body } => {
                let mut iterations = 0usize;
                while self.evaluate(condition)?.is_truthy() {
                    iterations += 1;
                    if let Some(limit) = self.options.max_loop_iterations {
                        if iterations > limit {
                            return Err(RuntimeError::new(format!(
                                "while loop exceeded {limit} iterations"
                            ))
                            .into());
                        }
                    }
                    self.exec_block(body)?;
                }
            }
            Statement::For {
                variable,
                range,
                body,
            } => {
                let items = match self.evaluate(range)? {
                    Value::Array(items) => items.borrow().clone(),
                    other => {
                        return Err(RuntimeError::new(format!(
                            "For loop range expression must be an array, got {}",
                            other.type_name()
                        ))
                        .into());
                    }
                };
                self.environment.push();
                let result = items.into_iter().try_for_each(|item| {
                    self.environment.define(Cow::Borrowed(*variable), item);
                    self.exec_block(body)
                });
                self.environment.pop();
                result?;
            }
            Statement::Try { body, handler } => match self.exec_block(body) {
                Err(Flow::Error(_)) => self.exec_block(handler)?,
                other => other?,
            },
            Statement::Throw(message) => {
                return Err(RuntimeError::new(message.to_string()).into());
            }
        }
        Ok(())
    }

    pub fn evaluate(&mut self, expr: &Expr<'de>) -> Result<Value<'de>, RuntimeError> {
        Ok(match expr {
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Real(n) => Value::Real(*n),
            Expr::Bits(literal) => bits_value(literal)?,
            Expr::Array(elements) => Value::array(
                elements
                    .iter()
                    .map(|element| self.evaluate(element))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::Ident(name) => self.environment.get(name)?.clone(),
            Expr::Negate(operand) => match self.evaluate(operand)? {
                Value::Int(n) => Value::Int(n.checked_neg().ok_or_else(overflow)?),
                Value::Real(n) => Value::Real(-n),
                other => {
                    return Err(RuntimeError::new(format!(
                        "Unary negate operator '|' expects a number, got {}",
                        other.type_name()
                    )));
                }
            },
            Expr::Binary { lhs, op, rhs } => {
                let lhs = self.evaluate(lhs)?;
                let rhs = self.evaluate(rhs)?;
                apply(*op, &lhs, &rhs)?
            }
            Expr::Postfix { operand, op, .. } => {
                let operand = self.evaluate(operand)?;
                apply_postfix(*op, &operand)?
            }
            Expr::Call(call) => self.call(call)?,
            Expr::Exception(message) => return Err(RuntimeError::new(message.to_string())),
        })
    }

    fn call(&mut self, call: &Call<'de>) -> Result<Value<'de>, RuntimeError> {
        let args = call
            .args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<Result<Vec<_>, _>>()?;

        match call.callee {
            Callee::Embedded => system::embedded(self, &args),
            Callee::Named("append") => {
                let target = match call.args.first() {
                    Some(Expr::Ident(name)) => Some(*name),
                    _ => None,
                };
                system::append(self, target, &args)
            }
            Callee::Named("length") => system::length(self, &args),
            Callee::Named("getitem") => system::getitem(self, &args),
            Callee::Named("list") => system::list(self, &args),
            Callee::Named("reverse") => system::reverse(self, &args),
            Callee::Named(name) => self.call_function(name, args),
        }
    }

    fn call_function(
        &mut self,
        name: &str,
        args: Vec<Value<'de>>,
    ) -> Result<Value<'de>, RuntimeError> {
        let Some(def) = self.functions.get(name).cloned() else {
            return Err(RuntimeError::new(format!("Undefined function '{name}'")));
        };
        if args.len() != def.params.len() {
            return Err(RuntimeError::new(format!(
                "Function '{name}' expects {} arguments, got {}",
                def.params.len(),
                args.len()
            )));
        }
        if self.depth >= self.options.max_call_depth {
            return Err(self.depth_exceeded());
        }

        // The new frame sits on the caller's current frame, not on the frame
        // the function was defined in.
        self.environment.push();
        for (param, value) in def.params.iter().zip(args) {
            self.environment.define(Cow::Borrowed(*param), value);
        }
        self.depth += 1;
        let result = self.exec_block(&def.body);
        self.depth -= 1;
        self.environment.pop();

        match result {
            Ok(()) => Ok(Value::Nil),
            Err(Flow::Return(value)) => Ok(value),
            Err(Flow::Error(error)) => Err(error),
        }
    }

    fn read_line(&mut self) -> Result<String, RuntimeError> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| RuntimeError::new(format!("input error: {e}")))?;
        if read == 0 {
            return Err(RuntimeError::new("Unexpected end of input"));
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn output_char(&mut self, value: &Value<'de>) -> Result<(), RuntimeError> {
        let c = match value {
            Value::Str(s) => s.chars().next(),
            Value::Int(n) => Some(
                u32::try_from(*n)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| not_a_char(value))?,
            ),
            Value::Real(n) => {
                let code = n.trunc();
                let c = (code >= 0.0 && code <= f64::from(u32::MAX))
                    .then(|| code as u32)
                    .and_then(char::from_u32);
                Some(c.ok_or_else(|| not_a_char(value))?)
            }
            other => other.to_string().chars().next(),
        };
        let Some(c) = c else {
            return Ok(());
        };
        self.buffer.push(c);
        self.write_text(c.encode_utf8(&mut [0; 4]))
    }

    fn output_many(
        &mut self,
        direction: Direction,
        count: &Value<'de>,
    ) -> Result<(), RuntimeError> {
        let count = match count {
            Value::Int(n) => usize::try_from(*n).ok(),
            _ => None,
        }
        .ok_or_else(|| {
            RuntimeError::new(format!(
                "Multi-character output count must be a non-negative integer, got {count}"
            ))
        })?;

        if count > self.buffer.len() {
            return Err(RuntimeError::new(format!(
                "Cannot retrieve {count} characters, only {} available in buffer.",
                self.buffer.len()
            )));
        }

        // Oldest characters first: after `ABCD`, `>> 3` writes `CBA`.
        let mut chars: Vec<char> = self.buffer.drain(..count).collect();
        if direction == Direction::Reversed {
            chars.reverse();
        }
        let text: String = chars.into_iter().collect();
        self.write_text(&text)
    }
}

fn not_a_char(value: &Value<'_>) -> RuntimeError {
    RuntimeError::new(format!("Cannot convert number {value} to a character"))
}

fn overflow() -> RuntimeError {
    RuntimeError::new("integer overflow")
}

fn bits_value<'de>(literal: &BinaryLiteral) -> Result<Value<'de>, RuntimeError> {
    Ok(match literal {
        BinaryLiteral::False => Value::Bool(false),
        BinaryLiteral::True => Value::Bool(true),
        BinaryLiteral::Nil => Value::Nil,
        BinaryLiteral::Empty => Value::array(Vec::new()),
        BinaryLiteral::Zero | BinaryLiteral::BitZero => Value::Int(0),
        BinaryLiteral::BitOne => Value::Int(1),
        BinaryLiteral::Bits(bits) => {
            let mut n: i64 = 0;
            for &bit in bits {
                n = n
                    .checked_mul(2)
                    .and_then(|n| n.checked_add(i64::from(bit)))
                    .ok_or_else(|| RuntimeError::new("binary literal does not fit in 64 bits"))?;
            }
            Value::Int(n)
        }
    })
}

fn apply<'de>(
    operator: Operator,
    lhs: &Value<'de>,
    rhs: &Value<'de>,
) -> Result<Value<'de>, RuntimeError> {
    match operator.family {
        Family::Binary => match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => integer_op(operator.op, *a, *b),
            _ => Err(RuntimeError::new(format!(
                "Binary operator '{operator}' expects integers, got {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        },
        Family::Real => match (lhs.as_real(), rhs.as_real()) {
            (Some(a), Some(b)) => real_op(operator.op, a, b),
            _ => Err(RuntimeError::new(format!(
                "Real operator '{operator}' expects numbers, got {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        },
    }
}

fn apply_postfix<'de>(
    operator: Operator,
    operand: &Value<'de>,
) -> Result<Value<'de>, RuntimeError> {
    match (operator.family, operand, operand.as_real()) {
        (Family::Binary, Value::Int(n), _) => integer_postfix(operator.op, *n),
        (Family::Real, _, Some(n)) => real_postfix(operator.op, n),
        _ => Err(RuntimeError::new(format!(
            "Operator '{operator}' cannot be applied to {}",
            operand.type_name()
        ))),
    }
}

fn integer_op<'de>(op: Op, a: i64, b: i64) -> Result<Value<'de>, RuntimeError> {
    let value = match op {
        Op::Add => Value::Int(a.checked_add(b).ok_or_else(overflow)?),
        Op::Sub => Value::Int(a.checked_sub(b).ok_or_else(overflow)?),
        Op::Mul => Value::Int(a.checked_mul(b).ok_or_else(overflow)?),
        Op::Div => {
            if b == 0 {
                return Err(RuntimeError::new("Binary division by zero"));
            }
            Value::Int(floor_div(a, b).ok_or_else(overflow)?)
        }
        Op::Mod => {
            if b == 0 {
                return Err(RuntimeError::new("Binary modulo by zero"));
            }
            Value::Int(floor_mod(a, b))
        }
        Op::Pow => {
            let exponent = u32::try_from(b).map_err(|_| {
                RuntimeError::new(format!(
                    "Binary power exponent must be between 0 and {}",
                    u32::MAX
                ))
            })?;
            Value::Int(a.checked_pow(exponent).ok_or_else(overflow)?)
        }
        Op::Factorial | Op::Sqrt => return integer_postfix(op, a),
        Op::Less => Value::Bool(a < b),
        Op::Equal => Value::Bool(a == b),
        Op::Greater => Value::Bool(a > b),
        Op::LessEqual => Value::Bool(a <= b),
        Op::GreaterEqual => Value::Bool(a >= b),
        Op::NotEqual => Value::Bool(a != b),
    };
    Ok(value)
}

fn integer_postfix<'de>(op: Op, n: i64) -> Result<Value<'de>, RuntimeError> {
    match op {
        Op::Factorial => {
            if n < 0 {
                return Err(RuntimeError::new("Binary factorial of negative number"));
            }
            let product = (1..=n).try_fold(1i64, |acc, k| acc.checked_mul(k));
            Ok(Value::Int(product.ok_or_else(overflow)?))
        }
        Op::Sqrt => {
            if n < 0 {
                return Err(RuntimeError::new("Binary square root of negative number"));
            }
            Ok(Value::Int(n.isqrt()))
        }
        other => Err(RuntimeError::new(format!("{other:?} is not a postfix operator"))),
    }
}

fn real_op<'de>(op: Op, a: f64, b: f64) -> Result<Value<'de>, RuntimeError> {
    let value = match op {
        Op::Add => Value::Real(a + b),
        Op::Sub => Value::Real(a - b),
        Op::Mul => Value::Real(a * b),
        Op::Div => {
            if b == 0.0 {
                return Err(RuntimeError::new("Real division by zero"));
            }
            Value::Real(a / b)
        }
        Op::Mod => {
            if b == 0.0 {
                return Err(RuntimeError::new("Real modulo by zero"));
            }
            let r = a % b;
            Value::Real(if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r })
        }
        Op::Pow => Value::Real(a.powf(b)),
        Op::Factorial | Op::Sqrt => return real_postfix(op, a),
        Op::Less => Value::Bool(a < b),
        Op::Equal => Value::Bool(a == b),
        Op::Greater => Value::Bool(a > b),
        Op::LessEqual => Value::Bool(a <= b),
        Op::GreaterEqual => Value::Bool(a >= b),
        Op::NotEqual => Value::Bool(a != b),
    };
    Ok(value)
}

fn real_postfix<'de>(op: Op, n: f64) -> Result<Value<'de>, RuntimeError> {
    match op {
        Op::Factorial => {
            if n < 0.0 {
                return Err(RuntimeError::new("Real factorial of negative number"));
            }
            // 171! is already infinite as an f64.
            if n >= 171.0 {
                return Ok(Value::Real(f64::INFINITY));
            }
            let product = (1..=n.trunc() as i64).fold(1.0, |acc, k| acc * k as f64);
            Ok(Value::Real(product))
        }
        Op::Sqrt => {
            if n < 0.0 {
                return Err(RuntimeError::new("Real square root of negative number"));
            }
            Ok(Value::Real(n.sqrt()))
        }
        other => Err(RuntimeError::new(format!("{other:?} is not a postfix operator"))),
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) { r + b } else { r }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(op: Op, a: i64, b: i64) -> Result<Value<'static>, RuntimeError> {
        apply(Operator::binary(op), &Value::Int(a), &Value::Int(b))
    }

    fn real(op: Op, a: f64, b: f64) -> Result<Value<'static>, RuntimeError> {
        apply(Operator::real(op), &Value::Real(a), &Value::Real(b))
    }

    #[test]
    fn binary_division_floors() {
        assert_eq!(binary(Op::Div, 7, 2), Ok(Value::Int(3)));
        assert_eq!(binary(Op::Div, -7, 2), Ok(Value::Int(-4)));
        assert_eq!(binary(Op::Mod, -7, 3), Ok(Value::Int(2)));
        assert_eq!(binary(Op::Mod, 7, -3), Ok(Value::Int(-2)));
    }

    #[test]
    fn zero_divisors_are_errors() {
        assert_eq!(
            binary(Op::Div, 1, 0).unwrap_err().message,
            "Binary division by zero"
        );
        assert_eq!(
            binary(Op::Mod, 1, 0).unwrap_err().message,
            "Binary modulo by zero"
        );
        assert_eq!(
            real(Op::Div, 1.0, 0.0).unwrap_err().message,
            "Real division by zero"
        );
    }

    #[test]
    fn postfix_operators() {
        let fact = |n| apply_postfix(Operator::binary(Op::Factorial), &Value::Int(n));
        assert_eq!(fact(5), Ok(Value::Int(120)));
        assert_eq!(fact(0), Ok(Value::Int(1)));
        assert!(fact(-1).is_err());
        assert!(fact(30).is_err(), "overflow is reported");

        let sqrt = |n| apply_postfix(Operator::binary(Op::Sqrt), &Value::Int(n));
        assert_eq!(sqrt(17), Ok(Value::Int(4)));
        assert!(sqrt(-4).is_err());

        let real_sqrt = apply_postfix(Operator::real(Op::Sqrt), &Value::Int(9));
        assert_eq!(real_sqrt, Ok(Value::Real(3.0)));
        let real_fact = apply_postfix(Operator::real(Op::Factorial), &Value::Real(4.5));
        assert_eq!(real_fact, Ok(Value::Real(24.0)));
    }

    #[test]
    fn real_operators_accept_integers() {
        let sum = apply(Operator::real(Op::Add), &Value::Int(3), &Value::Real(0.5));
        assert_eq!(sum, Ok(Value::Real(3.5)));
        let cmp = apply(Operator::real(Op::Less), &Value::Int(3), &Value::Real(3.5));
        assert_eq!(cmp, Ok(Value::Bool(true)));
    }

    #[test]
    fn binary_operators_reject_reals() {
        let err = apply(Operator::binary(Op::Add), &Value::Real(1.0), &Value::Int(1)).unwrap_err();
        assert_eq!(
            err.message,
            "Binary operator '$+' expects integers, got real and integer"
        );
    }

    #[test]
    fn multi_bit_literals() {
        let bits = |s: &str| BinaryLiteral::Bits(s.chars().map(|c| c == '1').collect());
        assert_eq!(bits_value(&bits("")), Ok(Value::Int(0)));
        assert_eq!(bits_value(&bits("1011")), Ok(Value::Int(11)));
        assert!(bits_value(&bits(&"1".repeat(64))).is_err());
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Str(Cow::Borrowed("")).is_truthy());
        assert!(!Value::array(Vec::new()).is_truthy());
        assert!(!Value::Nil.is_truthy());
        assert!(Value::Real(0.5).is_truthy());
    }

    #[test]
    fn display_quotes_strings_inside_arrays() {
        let value = Value::array(vec![
            Value::Str(Cow::Borrowed("apple")),
            Value::Int(2),
            Value::Real(2.5),
            Value::Bool(true),
        ]);
        assert_eq!(value.to_string(), "[\"apple\", 2, 2.5, true]");
    }
}
