//! Parse trace
//!
//! The engine records what it did as a flat list of entries: rule entries
//! and exits bracketing the tokens matched in between. Successful traces
//! are turned into trees; entries that carry a `todo` snapshot are
//! backtracking points.

use std::fmt;

use smol_str::SmolStr;

use crate::base::Stack;
use crate::rules::RuleKey;

/// Pending work of the engine
pub type Todo = Stack<Step>;

#[derive(Debug, Clone)]
pub enum Step {
    Entry(Invocation),
    Exit(Invocation),
}

/// One use of a rule
#[derive(Debug, Clone)]
pub struct Invocation {
    pub rule: RuleKey,
    /// Alternative index for choices, repetition count for repetitions
    pub data: usize,
    /// Work left to do when this invocation was recorded
    pub todo: Todo,
    pub depth: isize,
    /// Whether the rule has no representation
    pub transitional: bool,
}

impl Invocation {
    pub fn new(rule: RuleKey, data: usize, transitional: bool) -> Self {
        Self {
            rule,
            data,
            todo: Todo::new(),
            depth: -1,
            transitional,
        }
    }

    pub fn with_todo(mut self, todo: Todo) -> Self {
        self.todo = todo;
        self
    }

    pub fn with_depth(mut self, depth: isize) -> Self {
        self.depth = depth;
        self
    }
}

/// A token consumed by a token rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedToken {
    pub rule: RuleKey,
    pub kind: SmolStr,
    pub value: String,
    pub namespace: SmolStr,
    /// Pattern of the lexeme that produced the token
    pub representation: String,
    pub unification: Option<usize>,
    pub kept: bool,
}

#[derive(Debug, Clone)]
pub enum TraceEntry {
    Entry(Invocation),
    Exit(Invocation),
    Token(MatchedToken),
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(inv) => write!(f, "> {} ({}) @{}", inv.rule, inv.data, inv.depth),
            Self::Exit(inv) => write!(f, "< {} ({}) @{}", inv.rule, inv.data, inv.depth),
            Self::Token(token) => write!(f, "  {}: {}", token.kind, token.value),
        }
    }
}
