//! Grammar definitions
//!
//! A [`Grammar`] is the raw material the compiler works from: token
//! declarations grouped by namespace, rule bodies as text, and pragmas.
//! Grammars are usually read from the line-oriented grammar format with
//! [`Grammar::read`].

mod pragma;
mod reader;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::parser::DEFAULT_NAMESPACE;

pub use pragma::{DEFAULT_LOOKAHEAD, LEXER_UNICODE, PARSER_LOOKAHEAD, PragmaValue, Pragmas};

/// Namespace name to ordered lexeme key to pattern
pub type TokenMap = IndexMap<SmolStr, IndexMap<SmolStr, String>>;

/// Rule name, possibly `#`-prefixed, to rule body text
pub type RawRules = IndexMap<SmolStr, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    tokens: TokenMap,
    raw_rules: RawRules,
    pragmas: Pragmas,
}

impl Grammar {
    /// The `default` namespace is always present.
    pub fn new(mut tokens: TokenMap, raw_rules: RawRules, pragmas: Pragmas) -> Self {
        if !tokens.contains_key(DEFAULT_NAMESPACE) {
            tokens.insert(SmolStr::new_static(DEFAULT_NAMESPACE), IndexMap::new());
        }
        Self {
            tokens,
            raw_rules,
            pragmas,
        }
    }

    pub fn tokens(&self) -> &TokenMap {
        &self.tokens
    }

    pub fn raw_rules(&self) -> &RawRules {
        &self.raw_rules
    }

    pub fn pragmas(&self) -> &Pragmas {
        &self.pragmas
    }

    /// Whether a rule named `name` or `#name` is declared
    pub fn declares_rule(&self, name: &str) -> bool {
        self.raw_rules.contains_key(name) || self.raw_rules.contains_key(format!("#{name}").as_str())
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new(TokenMap::new(), RawRules::new(), Pragmas::default())
    }
}
