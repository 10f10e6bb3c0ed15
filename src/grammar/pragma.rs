//! Grammar pragmas

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

/// Size of the parser's token rewind window
pub const PARSER_LOOKAHEAD: &str = "parser.lookahead";
/// Whether lexeme patterns are matched as Unicode
pub const LEXER_UNICODE: &str = "lexer.unicode";

pub const DEFAULT_LOOKAHEAD: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PragmaValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl PragmaValue {
    /// `true`/`false`, then all-digit integers, then plain strings
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = raw.parse() {
                return Self::Int(value);
            }
        }
        Self::Str(raw.to_string())
    }

    fn as_int(&self) -> i64 {
        match self {
            Self::Bool(value) => i64::from(*value),
            Self::Int(value) => *value,
            Self::Str(value) => value.trim().parse().unwrap_or(0),
        }
    }
}

impl fmt::Display for PragmaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pragmas(IndexMap<SmolStr, PragmaValue>);

impl Pragmas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PragmaValue> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<SmolStr>, value: PragmaValue) -> Option<PragmaValue> {
        self.0.insert(name.into(), value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PragmaValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Token rewind window size, never negative
    pub fn lookahead(&self) -> usize {
        self.get(PARSER_LOOKAHEAD)
            .map(|value| usize::try_from(value.as_int().max(0)).unwrap_or(usize::MAX))
            .unwrap_or(DEFAULT_LOOKAHEAD)
    }

    /// Unicode matching unless the pragma is set to anything but `true`
    pub fn unicode(&self) -> bool {
        match self.get(LEXER_UNICODE) {
            None => true,
            Some(value) => *value == PragmaValue::Bool(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_parsing() {
        assert_eq!(PragmaValue::parse("true"), PragmaValue::Bool(true));
        assert_eq!(PragmaValue::parse("false"), PragmaValue::Bool(false));
        assert_eq!(PragmaValue::parse("42"), PragmaValue::Int(42));
        assert_eq!(PragmaValue::parse("-1"), PragmaValue::Str("-1".into()));
        assert_eq!(PragmaValue::parse("foo bar"), PragmaValue::Str("foo bar".into()));
        assert_eq!(PragmaValue::parse(""), PragmaValue::Str(String::new()));
    }

    #[test]
    fn test_defaults() {
        let pragmas = Pragmas::new();
        assert_eq!(pragmas.lookahead(), DEFAULT_LOOKAHEAD);
        assert!(pragmas.unicode());
    }

    #[test]
    fn test_typed_accessors() {
        let mut pragmas = Pragmas::new();
        pragmas.insert(PARSER_LOOKAHEAD, PragmaValue::Int(3));
        pragmas.insert(LEXER_UNICODE, PragmaValue::Bool(false));
        assert_eq!(pragmas.lookahead(), 3);
        assert!(!pragmas.unicode());

        pragmas.insert(PARSER_LOOKAHEAD, PragmaValue::Str("-5".into()));
        assert_eq!(pragmas.lookahead(), 0);

        pragmas.insert(LEXER_UNICODE, PragmaValue::Str("yes".into()));
        assert!(!pragmas.unicode());
    }
}
