//! Foundation types for the llkit toolchain.
//!
//! This module provides the primitives the lexer, analyzer and parser are
//! built on:
//! - [`Buffer`] - Bounded bidirectional window over a lazy sequence
//! - [`Lookahead`] - One-item lookahead wrapper with a positional key
//! - [`Stack`] - Persistent stack with O(1) snapshots
//! - [`LineIndex`], [`Position`] - Offset to line/column conversion
//!
//! This module has NO dependencies on other llkit modules.

mod buffer;
mod lookahead;
mod position;
mod stack;

pub use buffer::Buffer;
pub use lookahead::Lookahead;
pub use position::{ColumnUnit, LineIndex, Position};
pub use stack::Stack;

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
