use std::{borrow::Cow, collections::HashMap};

use crate::eval::{RuntimeError, Value};

/// Variable scopes.
///
/// Child scopes are opened by calls and `for` loops and always closed in
/// reverse order, so each frame's parent is simply the frame beneath it on
/// the stack. A call pushes on top of whatever frame is current at the call
/// site, which is what gives MEL functions the caller's view of names.
#[derive(Debug)]
pub struct Environment<'de> {
    stack: Stack<'de>,
}

impl<'de> Default for Environment<'de> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de> Environment<'de> {
    pub fn new() -> Self {
        Environment {
            stack: Stack {
                values: vec![HashMap::new()],
            },
        }
    }

    pub fn get(&self, name: &str) -> Result<&Value<'de>, RuntimeError> {
        self.stack
            .iter()
            .find_map(|frame| frame.get(name))
            .ok_or_else(|| RuntimeError::undefined_variable(name))
    }

    /// Binds `name` in the innermost frame, shadowing any outer binding.
    pub fn define(&mut self, name: Cow<'de, str>, value: Value<'de>) {
        self.stack.current_mut().insert(name, value);
    }

    /// Rebinds `name` in the innermost frame that already has it.
    pub fn assign(&mut self, name: &str, value: Value<'de>) -> Result<(), RuntimeError> {
        let slot = self
            .stack
            .iter_mut()
            .find_map(|frame| frame.get_mut(name))
            .ok_or_else(|| RuntimeError::undefined_variable(name))?;
        *slot = value;
        Ok(())
    }

    pub fn push(&mut self) {
        self.stack.push();
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.stack.values.len()
    }
}

#[derive(Debug)]
struct Stack<'de> {
    values: Vec<HashMap<Cow<'de, str>, Value<'de>>>,
}

impl<'de> Stack<'de> {
    fn push(&mut self) {
        self.values.push(HashMap::new());
    }

    // The global frame is never popped.
    fn pop(&mut self) {
        if self.values.len() > 1 {
            self.values.pop();
        }
    }

    fn iter(&self) -> impl Iterator<Item = &HashMap<Cow<'de, str>, Value<'de>>> {
        self.values.iter().rev()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut HashMap<Cow<'de, str>, Value<'de>>> {
        self.values.iter_mut().rev()
    }

    fn current_mut(&mut self) -> &mut HashMap<Cow<'de, str>, Value<'de>> {
        let last = self.values.len() - 1;
        &mut self.values[last]
    }
}
