//! One-item lookahead over an iterator.

/// Wraps an iterator, exposing the current item, the one after it, and the
/// 0-based index of the current item.
#[derive(Debug)]
pub struct Lookahead<I: Iterator> {
    source: I,
    current: Option<I::Item>,
    upcoming: Option<I::Item>,
    key: usize,
}

impl<I: Iterator> Lookahead<I> {
    pub fn new(mut source: I) -> Self {
        let current = source.next();
        let upcoming = source.next();
        Self {
            source,
            current,
            upcoming,
            key: 0,
        }
    }

    pub fn current(&self) -> Option<&I::Item> {
        self.current.as_ref()
    }

    /// Index of the current item in the underlying sequence
    pub fn key(&self) -> usize {
        self.key
    }

    pub fn has_next(&self) -> bool {
        self.upcoming.is_some()
    }

    pub fn peek_next(&self) -> Option<&I::Item> {
        self.upcoming.as_ref()
    }

    pub fn advance(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.current = self.upcoming.take();
        self.upcoming = self.source.next();
        self.key += 1;
    }
}
