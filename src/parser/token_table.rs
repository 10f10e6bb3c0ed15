//! Compiled lexeme table, grouped by namespace.
//!
//! A lexeme key is either `name` or `name:target`. The target names the
//! namespace to switch to after the lexeme matches, or is a shift directive
//! `__shift__` / `__shift__ * n` that returns to the n-th previous namespace.

use indexmap::IndexMap;
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input, meta};
use smol_str::SmolStr;
use tracing::debug;

use super::errors::LexerConfigError;
use crate::grammar::TokenMap;

/// Namespace every token table starts in
pub const DEFAULT_NAMESPACE: &str = "default";
/// Lexemes with this name are matched but never emitted
pub const SKIP_LEXEME: &str = "skip";
/// Kind of the end-of-input token
pub const EOF_TOKEN: &str = "EOF";

const SHIFT_PREFIX: &str = "__shift__";

/// What happens to the active namespace after a lexeme matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Switch(SmolStr),
    Shift(usize),
}

impl Transition {
    fn parse(target: &str) -> Self {
        match parse_shift(target) {
            Some(count) => Self::Shift(count),
            None => Self::Switch(SmolStr::new(target)),
        }
    }
}

/// `__shift__` or `__shift__ * n`
fn parse_shift(target: &str) -> Option<usize> {
    let rest = target.strip_prefix(SHIFT_PREFIX)?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return Some(1);
    }
    let digits = rest.strip_prefix('*')?.trim_start();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A lexeme pattern, matched anchored at an offset of the whole input so
/// look-behind assertions such as `\b` see the preceding text
#[derive(Debug, Clone)]
struct Matcher(meta::Regex);

impl Matcher {
    fn compile(pattern: &str, unicode: bool) -> Result<Self, meta::BuildError> {
        meta::Regex::builder()
            .configure(meta::Config::new().utf8_empty(unicode))
            .syntax(syntax::Config::new().unicode(unicode).utf8(unicode))
            .build(pattern)
            .map(Self)
    }

    /// Byte length of the match starting exactly at `offset`, if any
    fn match_len(&self, text: &str, offset: usize) -> Option<usize> {
        let input = Input::new(text).range(offset..).anchored(Anchored::Yes);
        self.0.search(&input).map(|m| m.end() - offset)
    }
}

/// A compiled lexeme
#[derive(Debug, Clone)]
pub struct Lexeme {
    name: SmolStr,
    key: SmolStr,
    pattern: String,
    transition: Transition,
    matcher: Matcher,
}

impl Lexeme {
    /// Token kind produced by this lexeme
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared key, including any `:target` suffix
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    pub(crate) fn match_len(&self, text: &str, offset: usize) -> Option<usize> {
        self.matcher.match_len(text, offset)
    }
}

/// Lexemes of every namespace, in declaration order
#[derive(Debug, Clone)]
pub struct TokenTable {
    namespaces: IndexMap<SmolStr, Vec<Lexeme>>,
    uses_shift: bool,
    unicode: bool,
}

impl TokenTable {
    /// Compile a table from `(namespace, [(key, pattern)])` groups.
    pub fn new<'a, N, L>(namespaces: N, unicode: bool) -> Result<Self, LexerConfigError>
    where
        N: IntoIterator<Item = (&'a str, L)>,
        L: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = IndexMap::new();
        let mut uses_shift = false;

        for (namespace, lexemes) in namespaces {
            let mut compiled = Vec::new();
            for (key, pattern) in lexemes {
                let (name, transition) = match key.split_once(':') {
                    Some((name, target)) => {
                        uses_shift |= target.starts_with(SHIFT_PREFIX);
                        (name, Transition::parse(target))
                    }
                    None => (key, Transition::Stay),
                };
                let matcher = Matcher::compile(pattern, unicode).map_err(|err| {
                    LexerConfigError::InvalidPattern {
                        lexeme: SmolStr::new(name),
                        namespace: SmolStr::new(namespace),
                        pattern: pattern.to_string(),
                        message: err.to_string(),
                    }
                })?;
                compiled.push(Lexeme {
                    name: SmolStr::new(name),
                    key: SmolStr::new(key),
                    pattern: pattern.to_string(),
                    transition,
                    matcher,
                });
            }
            table
                .entry(SmolStr::new(namespace))
                .or_insert_with(Vec::new)
                .extend(compiled);
        }

        debug!(
            namespaces = table.len(),
            uses_shift, unicode, "compiled token table"
        );

        Ok(Self {
            namespaces: table,
            uses_shift,
            unicode,
        })
    }

    /// Compile the tokens declared by a grammar
    pub fn from_map(tokens: &TokenMap, unicode: bool) -> Result<Self, LexerConfigError> {
        Self::new(
            tokens.iter().map(|(namespace, lexemes)| {
                (
                    namespace.as_str(),
                    lexemes.iter().map(|(key, pattern)| (key.as_str(), pattern.as_str())),
                )
            }),
            unicode,
        )
    }

    pub fn namespace(&self, name: &str) -> Option<&[Lexeme]> {
        self.namespaces.get(name).map(Vec::as_slice)
    }

    pub fn contains_namespace(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &[Lexeme])> {
        self.namespaces
            .iter()
            .map(|(name, lexemes)| (name.as_str(), lexemes.as_slice()))
    }

    /// Whether any lexeme shifts back, which requires a namespace stack
    pub fn uses_shift(&self) -> bool {
        self.uses_shift
    }

    pub fn is_unicode(&self) -> bool {
        self.unicode
    }

    /// Whether some lexeme in any namespace produces tokens of kind `name`
    pub fn declares(&self, name: &str) -> bool {
        self.namespaces
            .values()
            .flatten()
            .any(|lexeme| lexeme.name == name)
    }

    /// Pattern of lexeme `name` in `namespace`
    pub fn representation(&self, namespace: &str, name: &str) -> Option<&str> {
        self.namespace(namespace)?
            .iter()
            .find(|lexeme| lexeme.name == name)
            .map(Lexeme::pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_parsing() {
        assert_eq!(Transition::parse("foo"), Transition::Switch("foo".into()));
        assert_eq!(Transition::parse("__shift__"), Transition::Shift(1));
        assert_eq!(Transition::parse("__shift__ * 2"), Transition::Shift(2));
        assert_eq!(Transition::parse("__shift__*12"), Transition::Shift(12));
        assert_eq!(
            Transition::parse("__shift__x"),
            Transition::Switch("__shift__x".into())
        );
    }

    #[test]
    fn test_keys_split_into_name_and_transition() {
        let table = TokenTable::new(
            [
                ("default", vec![("quote_:string", "\""), ("a", "a")]),
                ("string", vec![("_quote:__shift__", "\"")]),
            ],
            true,
        )
        .unwrap();

        let default = table.namespace("default").unwrap();
        assert_eq!(default[0].name(), "quote_");
        assert_eq!(default[0].key(), "quote_:string");
        assert_eq!(default[0].transition(), &Transition::Switch("string".into()));
        assert_eq!(default[1].transition(), &Transition::Stay);
        assert!(table.uses_shift());
        assert!(table.declares("_quote"));
        assert!(!table.declares("b"));
    }

    #[test]
    fn test_representation_lookup() {
        let table = TokenTable::new([("default", vec![("num", r"\d+")])], true).unwrap();
        assert_eq!(table.representation("default", "num"), Some(r"\d+"));
        assert_eq!(table.representation("default", "nope"), None);
        assert_eq!(table.representation("other", "num"), None);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = TokenTable::new([("default", vec![("bad", "(")])], true).unwrap_err();
        assert!(matches!(err, LexerConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_anchored_matching() {
        let table = TokenTable::new([("default", vec![("b", "b+")])], true).unwrap();
        let lexeme = &table.namespace("default").unwrap()[0];
        assert_eq!(lexeme.match_len("abbb", 0), None);
        assert_eq!(lexeme.match_len("abbb", 1), Some(3));
    }

    #[test]
    fn test_word_boundary_sees_preceding_text() {
        let table = TokenTable::new([("default", vec![("kw", r"\bif"), ("bol", "^x")])], true).unwrap();
        let lexemes = table.namespace("default").unwrap();
        assert_eq!(lexemes[0].match_len("xif", 1), None);
        assert_eq!(lexemes[0].match_len("x if", 2), Some(2));
        assert_eq!(lexemes[1].match_len("xx", 0), Some(1));
        assert_eq!(lexemes[1].match_len("xx", 1), None);
    }

    #[test]
    fn test_byte_mode_word_boundary() {
        let table = TokenTable::new([("default", vec![("kw", r"\bif")])], false).unwrap();
        let lexeme = &table.namespace("default").unwrap()[0];
        assert_eq!(lexeme.match_len("xif", 1), None);
        assert_eq!(lexeme.match_len("(if", 1), Some(2));
    }
}
