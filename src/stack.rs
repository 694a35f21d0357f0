//! Unbounded data and call stack

use crate::bytecode::Word;

/// Last-in-first-out storage shared by `PUSH`/`POP` and `CALL`/`RET`.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Stack {
    data: Vec<Word>,
}

impl Stack {
    pub fn new() -> Self {
        Stack { data: Vec::new() }
    }

    pub fn push(&mut self, value: Word) {
        self.data.push(value);
    }

    /// Remove the top value. `None` when the stack is empty.
    pub fn pop(&mut self) -> Option<Word> {
        self.data.pop()
    }

    pub fn peek(&self) -> Option<Word> {
        self.data.last().copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Values from bottom to top.
    pub fn as_slice(&self) -> &[Word] {
        &self.data
    }
}
