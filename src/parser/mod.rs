//! Lexer and backtracking parser
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (TokenTable, per-namespace regexes) → Tokens
//!     ↓
//! Buffer (bounded rewind window)
//!     ↓
//! Compiler (todo stack + trace, backtracking) → Trace
//!     ↓
//! Tree builder → Tree
//! ```

#[allow(clippy::module_inception)]
mod parser;

pub mod errors;
mod lexer;
mod token_table;
mod trace;
mod tree_builder;

pub use errors::{LexerConfigError, LexerError, UnexpectedTokenError, UnrecognizedTokenError};
pub use lexer::{Lexer, Token, tokenize};
pub use parser::Compiler;
pub use token_table::{DEFAULT_NAMESPACE, EOF_TOKEN, Lexeme, SKIP_LEXEME, TokenTable, Transition};
pub use trace::{Invocation, MatchedToken, Step, Todo, TraceEntry};
