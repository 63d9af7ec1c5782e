use std::{borrow::Cow, rc::Rc};

use crate::eval::{Interpreter, RuntimeError, Value};

/// `->> append target item...`
///
/// `target` is the variable named by the first argument when it was written
/// as a bare identifier. A string first argument names the variable instead.
pub fn append<'de>(
    interpreter: &mut Interpreter<'de, '_>,
    target: Option<&'de str>,
    input: &[Value<'de>],
) -> Result<Value<'de>, RuntimeError> {
    let [first, items @ ..] = input else {
        return Err(RuntimeError::new("append requires an array and at least one item"));
    };
    if items.is_empty() {
        return Err(RuntimeError::new("append requires an array and at least one item"));
    }

    let (array, name) = match first {
        Value::Array(array) => (Rc::clone(array), target.map(Cow::Borrowed)),
        Value::Str(name) => match interpreter.environment().get(name)? {
            Value::Array(array) => (Rc::clone(array), Some(name.clone())),
            other => {
                return Err(RuntimeError::new(format!(
                    "append: variable '{name}' holds {}, not an array",
                    other.type_name()
                )));
            }
        },
        other => {
            return Err(RuntimeError::new(format!(
                "append expects an array or a variable name, got {}",
                other.type_name()
            )));
        }
    };

    array.borrow_mut().extend(items.iter().cloned());
    if let Some(name) = name {
        interpreter
            .environment_mut()
            .assign(&name, Value::Array(array))?;
    }
    Ok(Value::Nil)
}

pub fn length<'de>(
    _: &mut Interpreter<'de, '_>,
    input: &[Value<'de>],
) -> Result<Value<'de>, RuntimeError> {
    let len = match input {
        [Value::Str(s)] => s.chars().count(),
        [Value::Array(items)] => items.borrow().len(),
        [other] => {
            return Err(RuntimeError::new(format!(
                "length expects a string or an array, got {}",
                other.type_name()
            )));
        }
        _ => return Err(RuntimeError::new("length requires exactly one argument")),
    };
    Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
}

/// 1-based indexing into a string or an array.
pub fn getitem<'de>(
    _: &mut Interpreter<'de, '_>,
    input: &[Value<'de>],
) -> Result<Value<'de>, RuntimeError> {
    let [collection, index] = input else {
        return Err(RuntimeError::new("getitem requires a collection and an index"));
    };
    let Value::Int(index) = index else {
        return Err(RuntimeError::new(format!(
            "getitem index must be an integer, got {}",
            index.type_name()
        )));
    };
    let out_of_bounds =
        || RuntimeError::new(format!("getitem index {index} out of bounds (1-based)"));
    let position = usize::try_from(*index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .ok_or_else(out_of_bounds)?;

    match collection {
        Value::Str(s) => s
            .chars()
            .nth(position)
            .map(|c| Value::Str(Cow::Owned(c.to_string())))
            .ok_or_else(out_of_bounds),
        Value::Array(items) => items
            .borrow()
            .get(position)
            .cloned()
            .ok_or_else(out_of_bounds),
        other => Err(RuntimeError::new(format!(
            "getitem expects a string or an array, got {}",
            other.type_name()
        ))),
    }
}

/// Writes a string as is and an array in its display form. Bypasses the
/// `>` buffer.
pub fn list<'de>(
    interpreter: &mut Interpreter<'de, '_>,
    input: &[Value<'de>],
) -> Result<Value<'de>, RuntimeError> {
    match input {
        [value @ (Value::Str(_) | Value::Array(_))] => {
            let text = value.to_string();
            interpreter.write_text(&text)?;
            Ok(Value::Nil)
        }
        [other] => Err(RuntimeError::new(format!(
            "list expects a string or an array, got {}",
            other.type_name()
        ))),
        _ => Err(RuntimeError::new("list requires exactly one argument")),
    }
}

pub fn reverse<'de>(
    _: &mut Interpreter<'de, '_>,
    input: &[Value<'de>],
) -> Result<Value<'de>, RuntimeError> {
    match input {
        [Value::Str(s)] => Ok(Value::Str(Cow::Owned(s.chars().rev().collect()))),
        [Value::Array(items)] => Ok(Value::array(items.borrow().iter().rev().cloned().collect())),
        [other] => Err(RuntimeError::new(format!(
            "reverse expects a string or an array, got {}",
            other.type_name()
        ))),
        _ => Err(RuntimeError::new("reverse requires exactly one argument")),
    }
}

/// `->> : "code"` runs `code` as its own program.
pub fn embedded<'de>(
    interpreter: &mut Interpreter<'de, '_>,
    input: &[Value<'de>],
) -> Result<Value<'de>, RuntimeError> {
    let [Value::Str(code)] = input else {
        return Err(RuntimeError::new(
            "Run MEL string code (->> :) expects a single string argument.",
        ));
    };
    interpreter
        .run_nested(code)
        .map_err(|e| RuntimeError::new(format!("error in embedded program: {e}")))?;
    Ok(Value::Nil)
}
