//! Line-oriented grammar reader
//!
//! ```text
//! %pragma parser.lookahead 16
//! %skip   space        \s
//! %token  quote_       "        -> string
//! %token  string:chars [^"]+
//! %token  string:_quote "       -> default
//!
//! // rules are indented bodies under a `name:` header
//! #text:
//!     ::quote_:: <chars>? ::_quote::
//! ```

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;
use tracing::debug;

use super::{Grammar, PragmaValue, Pragmas, RawRules, TokenMap};
use crate::error::GrammarError;
use crate::parser::{DEFAULT_NAMESPACE, SKIP_LEXEME};

static PRAGMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^%pragma[ \t]+([^ \t]+)[ \t]+(.*)$").expect("pragma pattern is valid")
});

static SKIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^%skip[ \t]+(?:([^:\s]+):)?([^ \t]+)[ \t]+(.*)$").expect("skip pattern is valid")
});

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^%token[ \t]+(?:([^:\s]+):)?([^ \t]+)[ \t]+(.*?)(?:[ \t]+->[ \t]+(.*))?$")
        .expect("token pattern is valid")
});

impl Grammar {
    /// Read a grammar from its textual form. `source_name` only appears in
    /// error messages.
    pub fn read(text: &str, source_name: &str) -> Result<Self, GrammarError> {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut tokens = TokenMap::new();
        tokens.insert(SmolStr::new_static(DEFAULT_NAMESPACE), IndexMap::new());
        let mut raw_rules = RawRules::new();
        let mut pragmas = Pragmas::new();

        let mut i = 0;
        while i < lines.len() {
            let line_number = i + 1;
            let line = lines[i].trim_end();
            i += 1;

            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if line.starts_with('%') {
                read_instruction(line, &mut tokens, &mut pragmas).ok_or_else(|| {
                    GrammarError::UnrecognizedInstruction {
                        line_text: line.to_string(),
                        source_name: source_name.to_string(),
                        line: line_number,
                    }
                })?;
                continue;
            }

            let Some(name) = line.strip_suffix(':') else {
                return Err(GrammarError::MalformedRuleHeader {
                    line_text: line.to_string(),
                    source_name: source_name.to_string(),
                    line: line_number,
                });
            };

            let mut body = String::new();
            while let Some(next) = lines.get(i) {
                if next.is_empty() || !(next.starts_with(' ') || next.starts_with('\t') || next.starts_with("//")) {
                    break;
                }
                i += 1;
                if next.trim_start().starts_with("//") {
                    continue;
                }
                body.push(' ');
                body.push_str(next.trim());
            }
            raw_rules.insert(SmolStr::new(name.trim()), body);
        }

        debug!(
            source = source_name,
            namespaces = tokens.len(),
            rules = raw_rules.len(),
            pragmas = pragmas.len(),
            "read grammar"
        );

        Ok(Grammar::new(tokens, raw_rules, pragmas))
    }
}

/// `None` when the line is not a known instruction
fn read_instruction(line: &str, tokens: &mut TokenMap, pragmas: &mut Pragmas) -> Option<()> {
    if let Some(caps) = PRAGMA.captures(line) {
        pragmas.insert(&caps[1], PragmaValue::parse(&caps[2]));
        return Some(());
    }

    if let Some(caps) = SKIP.captures(line) {
        let namespace = caps.get(1).map_or(DEFAULT_NAMESPACE, |m| m.as_str());
        let pattern = &caps[3];
        let lexemes = tokens.entry(SmolStr::new(namespace)).or_default();
        let combined = match lexemes.get(SKIP_LEXEME) {
            Some(previous) => format!("(?:{previous}|{pattern})"),
            None => pattern.to_string(),
        };
        lexemes.insert(SmolStr::new_static(SKIP_LEXEME), combined);
        return Some(());
    }

    if let Some(caps) = TOKEN.captures(line) {
        let namespace = caps.get(1).map_or(DEFAULT_NAMESPACE, |m| m.as_str());
        let key = match caps.get(4) {
            Some(target) => format!("{}:{}", &caps[2], target.as_str()),
            None => caps[2].to_string(),
        };
        tokens
            .entry(SmolStr::new(namespace))
            .or_default()
            .insert(SmolStr::new(key), caps[3].to_string());
        return Some(());
    }

    None
}
