use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Size limited stack
///
/// Pushing past the limit is `OUT OF MEMORY` with the message given at
/// construction. Indexing is from the bottom.

pub struct Stack<T> {
    overflow_message: &'static str,
    limit: usize,
    items: Vec<T>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T> Stack<T> {
    pub fn new(limit: usize, overflow_message: &'static str) -> Stack<T> {
        Stack {
            overflow_message,
            limit,
            items: Vec::new(),
        }
    }

    /// A stack that starts out holding `bottom`.
    pub fn with_bottom(limit: usize, overflow_message: &'static str, bottom: T) -> Stack<T> {
        let mut stack = Stack::new(limit, overflow_message);
        stack.items.push(bottom);
        stack
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len)
    }

    pub fn push(&mut self, item: T) -> Result<()> {
        if self.items.len() >= self.limit {
            return Err(error!(OutOfMemory; self.overflow_message));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<T> {
        self.items
            .pop()
            .ok_or_else(|| error!(InternalError; "STACK UNDERFLOW"))
    }
}
