//! Crate-level error type
//!
//! Every fallible public operation returns [`Result`]. The variants wrap the
//! narrower error families so callers can match on the phase that failed.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::{LexerConfigError, LexerError, UnexpectedTokenError, UnrecognizedTokenError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Invalid repetition bounds
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Cannot repeat with a min ({min}) greater than max ({max}).")]
    InvalidBounds { min: i64, max: i64 },
}

/// A grammar that cannot be read or compiled into rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("The grammar is empty at \"{source_name}\"")]
    Empty { source_name: String },

    #[error("Unrecognized instructions:\n    {line_text}\nin file {source_name} at line {line}.")]
    UnrecognizedInstruction {
        line_text: String,
        source_name: String,
        line: usize,
    },

    #[error("Rule declaration \"{line_text}\" must end with a colon in file {source_name} at line {line}.")]
    MalformedRuleHeader {
        line_text: String,
        source_name: String,
        line: usize,
    },

    #[error("No rules specified!")]
    NoRules,

    #[error("Error while parsing rule {rule}.{}", detail(.message))]
    Syntax { rule: String, message: String },

    #[error("Cannot call rule {name}() in rule {rule} because it does not exist.")]
    UnknownRule { name: String, rule: String },

    #[error("Token {reference} does not exist in rule {rule}.")]
    UnknownToken { reference: String, rule: String },

    #[error("Upper bound {max} must be greater or equal to lower bound {min} in rule {rule}.")]
    InvalidBounds { min: i64, max: i64, rule: String },

    #[error("Malformed token reference {reference} in rule {rule}.")]
    MalformedToken { reference: String, rule: String },
}

fn detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(" {message}")
    }
}

impl GrammarError {
    pub fn syntax(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Syntax {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    UnexpectedToken(#[from] UnexpectedTokenError),

    #[error("Internal parser error: {message}")]
    Internal { message: String },

    #[error("Tree cannot hold more than {} nodes.", u32::MAX)]
    TreeTooLarge,

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<LexerConfigError> for Error {
    fn from(err: LexerConfigError) -> Self {
        Self::Lexer(err.into())
    }
}

impl From<UnrecognizedTokenError> for Error {
    fn from(err: UnrecognizedTokenError) -> Self {
        Self::Lexer(err.into())
    }
}
