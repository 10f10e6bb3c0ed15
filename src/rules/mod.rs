//! Grammar rules
//!
//! [`analyze`] turns the raw rule bodies of a [`Grammar`](crate::grammar::Grammar)
//! into a flat [`Rules`] table. Named rules keep their declared name; the
//! anonymous sub-rules they are built from get numeric keys and are called
//! transitional.

mod analyzer;
mod rule;

pub use analyzer::analyze;
pub use rule::{
    MERGE_RECURSIVE, MERGE_SHALLOW, NodeId, Repetition, Rule, RuleKey, RuleKind, Rules, TokenRule,
};
