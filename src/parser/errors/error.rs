//! Lexing and parsing error types
//!
//! Two families live here:
//! - Configuration errors raised while a token table is built or used
//!   ([`LexerConfigError`])
//! - Positional errors pointing at a character or token of the input
//!   ([`UnrecognizedTokenError`], [`UnexpectedTokenError`])
//!
//! Positional errors carry a 1-based line and column plus an excerpt: the
//! source line followed by a caret line.

use smol_str::SmolStr;
use text_size::TextSize;
use thiserror::Error;

use crate::base::{ColumnUnit, LineIndex};
use crate::parser::Token;

/// A token table that cannot be used to lex
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerConfigError {
    #[error("A lexeme must not match an empty value, which is the case of \"{lexeme}\" ({pattern}).")]
    EmptyMatch { lexeme: SmolStr, pattern: String },

    #[error(
        "Cannot shift namespace {count}-times, from token {lexeme} in namespace {namespace}, because the stack contains only {available} namespaces."
    )]
    ShiftOverflow {
        count: usize,
        lexeme: SmolStr,
        namespace: SmolStr,
        available: usize,
    },

    #[error("Namespace {target} does not exist, called by token {lexeme} in namespace {namespace}.")]
    UnknownNamespace {
        target: SmolStr,
        lexeme: SmolStr,
        namespace: SmolStr,
    },

    #[error("Lexeme {lexeme} in namespace {namespace} has an invalid pattern ({pattern}): {message}")]
    InvalidPattern {
        lexeme: SmolStr,
        namespace: SmolStr,
        pattern: String,
        message: String,
    },
}

/// No lexeme of the active namespace matches at some offset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized token \"{character}\" at line {line} and column {column}:\n{excerpt}")]
pub struct UnrecognizedTokenError {
    /// The character at the failing offset
    pub character: String,
    pub line: usize,
    pub column: usize,
    pub offset: TextSize,
    pub excerpt: String,
}

impl UnrecognizedTokenError {
    pub fn at(text: &str, offset: TextSize, unit: ColumnUnit) -> Self {
        let index = LineIndex::new(text);
        let position = index.position(offset, unit);
        Self {
            character: index.char_at(offset),
            line: position.line + 1,
            column: position.column + 1,
            offset,
            excerpt: index.excerpt(offset),
        }
    }
}

/// Anything the lexer can fail with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    #[error(transparent)]
    Config(#[from] LexerConfigError),
    #[error(transparent)]
    Unrecognized(#[from] UnrecognizedTokenError),
    #[error("Input is too large to lex: offset {offset} does not fit in a 32-bit text size.")]
    InputTooLarge { offset: usize },
}

/// The parser could not continue at a token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Unexpected token \"{}\" ({}) at line {line} and column {column}:\n{excerpt}",
    .token.value,
    .token.kind
)]
pub struct UnexpectedTokenError {
    pub token: Token,
    pub line: usize,
    pub column: usize,
    pub excerpt: String,
}

impl UnexpectedTokenError {
    pub fn at(text: &str, token: Token, unit: ColumnUnit) -> Self {
        let index = LineIndex::new(text);
        let position = index.position(token.offset, unit);
        Self {
            line: position.line + 1,
            column: position.column + 1,
            excerpt: index.excerpt(token.offset),
            token,
        }
    }
}
