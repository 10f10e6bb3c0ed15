//! Persistent stack.
//!
//! Cloning a [`Stack`] shares every frame with the original, so snapshots of
//! the parser's pending work are O(1). Pushing and popping on one copy never
//! affects another.

use std::fmt;
use std::rc::Rc;

struct Frame<T> {
    value: T,
    below: Option<Rc<Frame<T>>>,
}

pub struct Stack<T> {
    head: Option<Rc<Frame<T>>>,
    len: usize,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn push(&mut self, value: T) {
        let below = self.head.take();
        self.head = Some(Rc::new(Frame { value, below }));
        self.len += 1;
    }

    pub fn peek(&self) -> Option<&T> {
        self.head.as_deref().map(|frame| &frame.value)
    }

    /// Iterate from the top of the stack down
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            frame: self.head.as_deref(),
        }
    }
}

impl<T: Clone> Stack<T> {
    /// Pop the top value, cloning it only when the frame is shared.
    pub fn pop(&mut self) -> Option<T> {
        let frame = self.head.take()?;
        self.len -= 1;
        match Rc::try_unwrap(frame) {
            Ok(Frame { value, below }) => {
                self.head = below;
                Some(value)
            }
            Err(shared) => {
                self.head = shared.below.clone();
                Some(shared.value.clone())
            }
        }
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Stack<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

impl<T> Drop for Stack<T> {
    fn drop(&mut self) {
        // Unlink uniquely owned frames one at a time to avoid deep recursion
        let mut head = self.head.take();
        while let Some(frame) = head {
            match Rc::try_unwrap(frame) {
                Ok(mut frame) => head = frame.below.take(),
                Err(_) => break,
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct Iter<'a, T> {
    frame: Option<&'a Frame<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.frame?;
        self.frame = frame.below.as_deref();
        Some(&frame.value)
    }
}
