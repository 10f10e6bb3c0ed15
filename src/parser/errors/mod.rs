//! Lexer and parser error handling
//!
//! Grammar-level errors (malformed grammar files, rule syntax) are in
//! [`crate::error`]; this module holds the errors produced while turning
//! input text into tokens and trees.

mod error;

pub use error::{LexerConfigError, LexerError, UnexpectedTokenError, UnrecognizedTokenError};
