//! Rule model
//!
//! Rules reference each other by [`RuleKey`] and live in one ordered
//! [`Rules`] arena. A rule is *transitional* until a representation (the
//! declared body text) is attached; only non-transitional rules show up as
//! nesting levels during parsing and tree building.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::RuleError;

/// Merge a node into a preceding sibling with the same id
pub const MERGE_SHALLOW: char = 'M';
/// Merge a node into a preceding sibling with the same id, recursively
pub const MERGE_RECURSIVE: char = 'm';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKey {
    /// Declared in the grammar
    Named(SmolStr),
    /// Synthesized by the analyzer
    Transitional(u32),
}

impl RuleKey {
    pub fn named(name: impl Into<SmolStr>) -> Self {
        Self::Named(name.into())
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Transitional(_) => None,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Transitional(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for RuleKey {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

/// Tree node id with merge options, written `#id` or `#id:options`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    id: SmolStr,
    options: Vec<char>,
}

impl NodeId {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((id, options)) => Self {
                id: SmolStr::new(id),
                options: options.chars().collect(),
            },
            None => Self {
                id: SmolStr::new(raw),
                options: Vec::new(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &[char] {
        &self.options
    }

    pub fn has_option(&self, option: char) -> bool {
        self.options.contains(&option)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)?;
        if !self.options.is_empty() {
            f.write_str(":")?;
            for option in &self.options {
                write!(f, "{option}")?;
            }
        }
        Ok(())
    }
}

/// Matches one token of a given kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRule {
    token: SmolStr,
    unification: Option<usize>,
    kept: bool,
}

impl TokenRule {
    pub fn new(token: impl Into<SmolStr>, unification: Option<usize>, kept: bool) -> Self {
        Self {
            token: token.into(),
            unification,
            kept,
        }
    }

    /// Kind of token this rule matches
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Tokens sharing a unification index must carry equal values within one
    /// rule invocation
    pub fn unification(&self) -> Option<usize> {
        self.unification
    }

    /// Whether the matched token becomes a tree leaf
    pub fn is_kept(&self) -> bool {
        self.kept
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repetition {
    min: usize,
    max: Option<usize>,
    child: RuleKey,
}

impl Repetition {
    /// `max == -1` means unbounded. `min` is clamped to 0 and `max` to -1.
    pub fn new(min: i64, max: i64, child: RuleKey) -> Result<Self, RuleError> {
        let min = min.max(0);
        let max = max.max(-1);
        if max != -1 && min > max {
            return Err(RuleError::InvalidBounds { min, max });
        }
        Ok(Self {
            min: usize::try_from(min).unwrap_or(usize::MAX),
            max: usize::try_from(max).ok(),
            child,
        })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn is_infinite(&self) -> bool {
        self.max.is_none()
    }

    pub fn child(&self) -> &RuleKey {
        &self.child
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Token(TokenRule),
    Concatenation(Vec<RuleKey>),
    Choice(Vec<RuleKey>),
    Repetition(Repetition),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: RuleKey,
    kind: RuleKind,
    node_id: Option<NodeId>,
    default_id: Option<NodeId>,
    representation: Option<String>,
}

impl Rule {
    pub fn new(name: RuleKey, kind: RuleKind) -> Self {
        Self {
            name,
            kind,
            node_id: None,
            default_id: None,
            representation: None,
        }
    }

    pub fn token(name: RuleKey, token: TokenRule) -> Self {
        Self::new(name, RuleKind::Token(token))
    }

    pub fn concatenation(name: RuleKey, children: Vec<RuleKey>) -> Self {
        Self::new(name, RuleKind::Concatenation(children))
    }

    pub fn choice(name: RuleKey, children: Vec<RuleKey>) -> Self {
        Self::new(name, RuleKind::Choice(children))
    }

    pub fn repetition(name: RuleKey, repetition: Repetition) -> Self {
        Self::new(name, RuleKind::Repetition(repetition))
    }

    pub fn name(&self) -> &RuleKey {
        &self.name
    }

    pub fn set_name(&mut self, name: RuleKey) {
        self.name = name;
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Keys of the rules this one invokes
    pub fn children(&self) -> &[RuleKey] {
        match &self.kind {
            RuleKind::Token(_) => &[],
            RuleKind::Concatenation(children) | RuleKind::Choice(children) => children,
            RuleKind::Repetition(repetition) => std::slice::from_ref(&repetition.child),
        }
    }

    pub fn node_id(&self) -> Option<&NodeId> {
        self.node_id.as_ref()
    }

    pub fn set_node_id(&mut self, raw: Option<&str>) {
        self.node_id = raw.map(NodeId::parse);
    }

    pub fn default_id(&self) -> Option<&NodeId> {
        self.default_id.as_ref()
    }

    pub fn set_default_id(&mut self, raw: Option<&str>) {
        self.default_id = raw.map(NodeId::parse);
    }

    pub fn representation(&self) -> Option<&str> {
        self.representation.as_deref()
    }

    pub fn set_representation(&mut self, representation: impl Into<String>) {
        self.representation = Some(representation.into());
    }

    pub fn is_transitional(&self) -> bool {
        self.representation.is_none()
    }
}

/// Ordered rule arena
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rules {
    rules: IndexMap<RuleKey, Rule>,
}

impl Rules {
    pub fn new(rules: IndexMap<RuleKey, Rule>) -> Self {
        Self { rules }
    }

    pub fn get(&self, key: &RuleKey) -> Option<&Rule> {
        self.rules.get(key)
    }

    /// Look up a declared rule by name
    pub fn named(&self, name: &str) -> Option<&Rule> {
        self.rules.get(&RuleKey::named(name))
    }

    pub fn contains(&self, key: &RuleKey) -> bool {
        self.rules.contains_key(key)
    }

    /// The first declared rule
    pub fn root(&self) -> Option<&RuleKey> {
        self.rules.keys().find(|key| key.is_named())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RuleKey, &Rule)> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<IndexMap<RuleKey, Rule>> for Rules {
    fn from(rules: IndexMap<RuleKey, Rule>) -> Self {
        Self::new(rules)
    }
}
