//! Bounded rewind window over a lazy sequence.

use std::collections::VecDeque;

/// A bidirectional cursor over a lazily-pulled iterator.
///
/// At most `capacity` already-pulled items are retained. Moving forward past
/// the newest retained item pulls from the source and evicts the oldest item
/// once the window is full. Moving backward before the oldest retained item
/// leaves the buffer invalid.
#[derive(Debug)]
pub struct Buffer<I: Iterator> {
    source: I,
    window: VecDeque<I::Item>,
    capacity: usize,
    /// Index into `window`; out of range means invalid
    cursor: isize,
}

impl<I: Iterator> Buffer<I> {
    pub fn new(source: I, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            source,
            window: VecDeque::with_capacity(capacity),
            capacity,
            cursor: -1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently retained
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Move to the oldest retained item, pulling the first one if needed.
    pub fn rewind(&mut self) -> bool {
        if self.window.is_empty() {
            self.cursor = -1;
            return self.advance();
        }
        self.cursor = 0;
        true
    }

    pub fn current(&self) -> Option<&I::Item> {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|index| self.window.get(index))
    }

    pub fn is_valid(&self) -> bool {
        self.current().is_some()
    }

    /// Advance by one item. Returns whether the buffer is still valid.
    pub fn advance(&mut self) -> bool {
        let len = self.window.len() as isize;
        let next = self.cursor + 1;
        if next < len {
            self.cursor = next;
        } else if next == len {
            match self.source.next() {
                Some(item) => {
                    if self.window.len() == self.capacity {
                        self.window.pop_front();
                    }
                    self.window.push_back(item);
                    self.cursor = self.window.len() as isize - 1;
                }
                None => self.cursor = len,
            }
        }
        self.is_valid()
    }

    /// Step back by one item. Returns whether the buffer is still valid.
    pub fn previous(&mut self) -> bool {
        if self.cursor >= 0 {
            self.cursor -= 1;
        }
        self.is_valid()
    }
}
