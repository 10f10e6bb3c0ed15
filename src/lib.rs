//! # llkit
//!
//! LL(k) grammar compiler: reads a grammar written in the `.pp` meta-grammar,
//! lexes input with per-namespace regular expressions, and parses it with a
//! trace-based backtracking parser into a [`Tree`].
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! parser    → Compiler, lexer, trace, tree builder
//!   ↓
//! rules     → Rule model, meta-grammar analyzer
//!   ↓
//! grammar   → Grammar reader, pragmas
//!   ↓
//! tree      → Arena-backed syntax trees
//!   ↓
//! base      → Primitives (token buffer, lookahead, persistent stack, positions)
//! ```
//!
//! ## Example
//!
//! ```
//! use llkit::Compiler;
//!
//! let compiler = Compiler::from_source(
//!     "%skip space \\s\n%token a a\n%token b b\n#pair:\n  <a> <b>\n",
//!     "pair.pp",
//! )?;
//! let tree = compiler.parse("a b", None)?;
//! assert_eq!(tree.root().id(), "#pair");
//! # Ok::<(), llkit::Error>(())
//! ```

/// Foundation types: token buffer, lookahead iterator, persistent stack, positions
pub mod base;

/// Crate-level error and result types
pub mod error;

/// Grammar files: token declarations, raw rules, pragmas
pub mod grammar;

/// Lexer and backtracking parser
pub mod parser;

/// Rule model and analyzer
pub mod rules;

/// Syntax trees
pub mod tree;

pub use error::{Error, GrammarError, Result, RuleError};
pub use grammar::{Grammar, PragmaValue, Pragmas};
pub use parser::{Compiler, Lexer, Token, TokenTable, TraceEntry, tokenize};
pub use rules::{Rule, RuleKey, Rules, analyze};
pub use tree::{NodeIndex, TokenValue, Tree, TreeNode};
