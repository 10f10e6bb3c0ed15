//! Rule analyzer
//!
//! Compiles the textual rule bodies of a grammar into a [`Rules`] arena.
//! Bodies are themselves lexed with a fixed meta-grammar token table and
//! parsed by recursive descent:
//!
//! ```text
//! rule          := choice
//! choice        := concatenation ( '|' concatenation )*
//! concatenation := repetition+
//! repetition    := simple quantifier? node?
//! simple        := '(' choice ')' | '::'token'::' | '<'token'>' | name'()'
//! quantifier    := '?' | '+' | '*' | '{n,m}' | '{,m}' | '{n,}' | '{n}'
//! node          := '#'name ( ':' options )?
//! ```
//!
//! A node marker sets the *pending* node id of the enclosing concatenation.
//! A concatenation with a pending id is always wrapped in its own rule so the
//! enclosing choice can attach the id to it. Declared `#name` rules start with
//! `#name` pending.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::debug;

use super::{Repetition, Rule, RuleKey, Rules, TokenRule};
use crate::base::Lookahead;
use crate::error::GrammarError;
use crate::grammar::{Grammar, RawRules};
use crate::parser::{EOF_TOKEN, Lexer, LexerConfigError, LexerError, Token, TokenTable};

/// Lexemes of the rule body language, in priority order
const META_LEXEMES: &[(&str, &str)] = &[
    ("skip", r"\s"),
    ("or", r"\|"),
    ("zero_or_one", r"\?"),
    ("one_or_more", r"\+"),
    ("zero_or_more", r"\*"),
    ("n_to_m", r"\{[0-9]+,[0-9]+\}"),
    ("zero_to_m", r"\{,[0-9]+\}"),
    ("n_or_more", r"\{[0-9]+,\}"),
    ("exactly_n", r"\{[0-9]+\}"),
    ("skipped", r"::[a-zA-Z_][a-zA-Z0-9_]*(\[\d+\])?::"),
    ("kept", r"<[a-zA-Z_][a-zA-Z0-9_]*(\[\d+\])?>"),
    ("named", r"[a-zA-Z_][a-zA-Z0-9_]*\(\)"),
    ("node", r"#[a-zA-Z_][a-zA-Z0-9_]*(:[mM])?"),
    ("capturing_", r"\("),
    ("_capturing", r"\)"),
];

static META_TABLE: Lazy<Result<TokenTable, LexerConfigError>> =
    Lazy::new(|| TokenTable::new([("default", META_LEXEMES.iter().copied())], true));

type Cursor<'t> = Lookahead<Lexer<'t, 'static>>;

/// Compile every rule declared by `grammar`
pub fn analyze(grammar: &Grammar) -> Result<Rules, GrammarError> {
    Analyzer::new(grammar).analyze()
}

struct Analyzer<'g> {
    raw_rules: &'g RawRules,
    /// Token kinds declared in any namespace
    tokens: FxHashSet<&'g str>,
    /// Declared rule names with any `#` prefix removed
    declared: FxHashSet<&'g str>,
    parsed: IndexMap<RuleKey, Rule>,
    counter: u32,
    /// Name of the rule being analyzed, for error messages
    current: SmolStr,
}

impl<'g> Analyzer<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let tokens = grammar
            .tokens()
            .values()
            .flat_map(|lexemes| lexemes.keys())
            .map(|key| key.split_once(':').map_or(key.as_str(), |(name, _)| name))
            .collect();
        let declared = grammar
            .raw_rules()
            .keys()
            .map(|key| key.strip_prefix('#').unwrap_or(key))
            .collect();
        Self {
            raw_rules: grammar.raw_rules(),
            tokens,
            declared,
            parsed: IndexMap::new(),
            counter: 0,
            current: SmolStr::default(),
        }
    }

    fn analyze(mut self) -> Result<Rules, GrammarError> {
        if self.raw_rules.is_empty() {
            return Err(GrammarError::NoRules);
        }
        let table = Lazy::force(&META_TABLE)
            .as_ref()
            .map_err(|err| GrammarError::syntax("<meta>", err.to_string()))?;

        for (key, body) in self.raw_rules {
            let (name, node_id) = match key.strip_prefix('#') {
                Some(name) => (name, Some(key.as_str())),
                None => (key.as_str(), None),
            };
            self.current = SmolStr::new(name);

            let mut cursor = Lookahead::new(Lexer::new(body, table));
            let mut pending = node_id.map(String::from);
            let top = self
                .choice(&mut cursor, &mut pending)?
                .ok_or_else(|| GrammarError::syntax(name, ""))?;
            self.expect_end(&cursor)?;

            let mut rule = if top.is_named() {
                // A bare call to another rule, e.g. `(other())`
                Rule::concatenation(top.clone(), vec![top])
            } else {
                self.parsed
                    .shift_remove(&top)
                    .ok_or_else(|| GrammarError::syntax(name, ""))?
            };
            rule.set_name(RuleKey::named(name));
            rule.set_representation(body.as_str());
            if node_id.is_some() {
                rule.set_default_id(node_id);
            }
            self.parsed.insert(RuleKey::named(name), rule);
        }

        debug!(
            declared = self.raw_rules.len(),
            total = self.parsed.len(),
            "analyzed rules"
        );
        Ok(Rules::new(self.parsed))
    }

    fn next_key(&mut self) -> RuleKey {
        let key = RuleKey::Transitional(self.counter);
        self.counter += 1;
        key
    }

    fn insert(&mut self, build: impl FnOnce(RuleKey) -> Rule) -> RuleKey {
        let key = self.next_key();
        self.parsed.insert(key.clone(), build(key.clone()));
        key
    }

    fn current_token<'c>(&self, cursor: &'c Cursor<'_>) -> Result<Option<&'c Token>, GrammarError> {
        match cursor.current() {
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(err)) => Err(self.lexer_error(err)),
            None => Ok(None),
        }
    }

    fn current_kind<'c>(&self, cursor: &'c Cursor<'_>) -> Result<&'c str, GrammarError> {
        Ok(self
            .current_token(cursor)?
            .map_or(EOF_TOKEN, |token| token.kind.as_str()))
    }

    fn lexer_error(&self, err: &LexerError) -> GrammarError {
        GrammarError::syntax(self.current.as_str(), err.to_string())
    }

    fn expect_end(&self, cursor: &Cursor<'_>) -> Result<(), GrammarError> {
        match self.current_token(cursor)? {
            Some(token) if !token.is_eof() => Err(GrammarError::syntax(
                self.current.as_str(),
                format!("Unexpected \"{}\".", token.value),
            )),
            _ => Ok(()),
        }
    }

    fn choice(
        &mut self,
        cursor: &mut Cursor<'_>,
        pending: &mut Option<String>,
    ) -> Result<Option<RuleKey>, GrammarError> {
        let mut children = Vec::new();

        loop {
            let mut branch = pending.clone();
            let Some(rule) = self.concatenation(cursor, &mut branch)? else {
                return Ok(None);
            };
            if let Some(id) = branch.as_deref() {
                self.set_node_id(&rule, id);
            }
            children.push(rule);

            if self.current_kind(cursor)? != "or" {
                break;
            }
            cursor.advance();
        }

        *pending = None;

        if children.len() == 1 {
            return Ok(children.pop());
        }
        Ok(Some(self.insert(|key| Rule::choice(key, children))))
    }

    fn concatenation(
        &mut self,
        cursor: &mut Cursor<'_>,
        pending: &mut Option<String>,
    ) -> Result<Option<RuleKey>, GrammarError> {
        let Some(first) = self.repetition(cursor, pending)? else {
            return Ok(None);
        };
        let mut children = vec![first];
        while let Some(rule) = self.repetition(cursor, pending)? {
            children.push(rule);
        }

        if children.len() == 1 && pending.is_none() {
            return Ok(children.pop());
        }
        Ok(Some(self.insert(|key| Rule::concatenation(key, children))))
    }

    fn repetition(
        &mut self,
        cursor: &mut Cursor<'_>,
        pending: &mut Option<String>,
    ) -> Result<Option<RuleKey>, GrammarError> {
        let Some(child) = self.simple(cursor, pending)? else {
            return Ok(None);
        };

        let bounds = match self.current_token(cursor)? {
            Some(token) => self.quantifier(token)?,
            None => None,
        };
        if bounds.is_some() {
            cursor.advance();
        }

        if let Some(token) = self.current_token(cursor)? {
            if token.kind == "node" {
                *pending = Some(token.value.clone());
                cursor.advance();
            }
        }

        let Some((min, max)) = bounds else {
            return Ok(Some(child));
        };
        if max != -1 && max < min {
            return Err(GrammarError::InvalidBounds {
                min,
                max,
                rule: self.current.to_string(),
            });
        }
        let repetition = Repetition::new(min, max, child).map_err(|err| {
            GrammarError::syntax(self.current.as_str(), err.to_string())
        })?;
        Ok(Some(self.insert(|key| Rule::repetition(key, repetition))))
    }

    /// `(min, max)` of a quantifier token, `max == -1` for unbounded
    fn quantifier(&self, token: &Token) -> Result<Option<(i64, i64)>, GrammarError> {
        let bound = |raw: &str| -> Result<i64, GrammarError> {
            raw.parse().map_err(|_| {
                GrammarError::syntax(
                    self.current.as_str(),
                    format!("Invalid bound in \"{}\".", token.value),
                )
            })
        };
        let inner = token.value.trim_start_matches('{').trim_end_matches('}');

        let bounds = match token.kind.as_str() {
            "zero_or_one" => (0, 1),
            "one_or_more" => (1, -1),
            "zero_or_more" => (0, -1),
            "exactly_n" => {
                let n = bound(inner)?;
                (n, n)
            }
            "n_to_m" | "zero_to_m" | "n_or_more" => {
                let (min, max) = inner.split_once(',').unwrap_or((inner, ""));
                let min = if min.is_empty() { 0 } else { bound(min)? };
                let max = if max.is_empty() { -1 } else { bound(max)? };
                (min, max)
            }
            _ => return Ok(None),
        };
        Ok(Some(bounds))
    }

    fn simple(
        &mut self,
        cursor: &mut Cursor<'_>,
        pending: &mut Option<String>,
    ) -> Result<Option<RuleKey>, GrammarError> {
        let Some(token) = self.current_token(cursor)?.cloned() else {
            return Ok(None);
        };

        match token.kind.as_str() {
            "capturing_" => {
                cursor.advance();
                let Some(rule) = self.choice(cursor, pending)? else {
                    return Ok(None);
                };
                if self.current_kind(cursor)? != "_capturing" {
                    return Ok(None);
                }
                cursor.advance();
                Ok(Some(rule))
            }
            "skipped" => {
                let reference = token.value.trim_matches(':');
                let rule = self.token_rule(reference, &token.value, false)?;
                cursor.advance();
                Ok(Some(rule))
            }
            "kept" => {
                let reference = token.value.trim_start_matches('<').trim_end_matches('>');
                let rule = self.token_rule(reference, &token.value, true)?;
                cursor.advance();
                Ok(Some(rule))
            }
            "named" => {
                let name = token.value.trim_end_matches(['(', ')']);
                if !self.declared.contains(name) {
                    return Err(GrammarError::UnknownRule {
                        name: name.to_string(),
                        rule: self.current.to_string(),
                    });
                }
                let call = RuleKey::named(name);
                let whole_body = cursor.key() == 0
                    && matches!(cursor.peek_next(), Some(Ok(next)) if next.is_eof());
                cursor.advance();
                if whole_body {
                    return Ok(Some(self.insert(|key| Rule::concatenation(key, vec![call]))));
                }
                Ok(Some(call))
            }
            _ => Ok(None),
        }
    }

    /// `reference` is `name` or `name[index]`
    fn token_rule(
        &mut self,
        reference: &str,
        written: &str,
        kept: bool,
    ) -> Result<RuleKey, GrammarError> {
        let (name, unification) = match reference.strip_suffix(']') {
            Some(indexed) => {
                let (name, index) = indexed.split_once('[').ok_or_else(|| self.malformed(written))?;
                let index = index.parse().map_err(|_| self.malformed(written))?;
                (name, Some(index))
            }
            None => (reference, None),
        };

        if !self.tokens.contains(name) {
            return Err(GrammarError::UnknownToken {
                reference: written.to_string(),
                rule: self.current.to_string(),
            });
        }

        let token = TokenRule::new(name, unification, kept);
        Ok(self.insert(|key| Rule::token(key, token)))
    }

    fn malformed(&self, written: &str) -> GrammarError {
        GrammarError::MalformedToken {
            reference: written.to_string(),
            rule: self.current.to_string(),
        }
    }

    fn set_node_id(&mut self, key: &RuleKey, id: &str) {
        // Declared rules are never targeted: a pending id always forces a
        // synthesized wrapper
        if key.is_named() {
            return;
        }
        if let Some(rule) = self.parsed.get_mut(key) {
            rule.set_node_id(Some(id));
        }
    }
}
