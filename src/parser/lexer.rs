//! Multi-namespace regex lexer
//!
//! Lexes input text lazily against a [`TokenTable`]. Each namespace is an
//! ordered list of lexemes; the first one that matches at the current offset
//! wins. A match may move the lexer into another namespace, or shift back to
//! a previously active one.

use smol_str::SmolStr;
use text_size::TextSize;
use tracing::trace;

use super::errors::{LexerConfigError, LexerError, UnrecognizedTokenError};
use super::token_table::{
    DEFAULT_NAMESPACE, EOF_TOKEN, Lexeme, SKIP_LEXEME, TokenTable, Transition,
};
use crate::base::ColumnUnit;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SmolStr,
    pub value: String,
    /// Length of `value` in characters
    pub length: usize,
    /// Namespace the token was lexed in
    pub namespace: SmolStr,
    pub keep: bool,
    /// Byte offset in the input
    pub offset: TextSize,
}

impl Token {
    /// The end-of-input token at `offset`
    pub fn eof(offset: TextSize) -> Self {
        Self {
            kind: SmolStr::new_static(EOF_TOKEN),
            value: String::from(EOF_TOKEN),
            length: 0,
            namespace: SmolStr::new_static(DEFAULT_NAMESPACE),
            keep: true,
            offset,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == EOF_TOKEN
    }
}

/// Byte offset as a [`TextSize`], which is limited to 32 bits
fn text_offset(offset: usize) -> Result<TextSize, LexerError> {
    TextSize::try_from(offset).map_err(|_| LexerError::InputTooLarge { offset })
}

/// Lazy token stream over one input text
pub struct Lexer<'t, 'g> {
    text: &'t str,
    table: &'g TokenTable,
    offset: usize,
    namespace: SmolStr,
    /// Previously active namespaces, only tracked when the table shifts
    stack: Option<Vec<SmolStr>>,
    finished: bool,
}

impl<'t, 'g> Lexer<'t, 'g> {
    pub fn new(text: &'t str, table: &'g TokenTable) -> Self {
        Self {
            text,
            table,
            offset: 0,
            namespace: SmolStr::new_static(DEFAULT_NAMESPACE),
            stack: table.uses_shift().then(Vec::new),
            finished: false,
        }
    }

    /// Namespace the next token will be lexed in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn column_unit(&self) -> ColumnUnit {
        if self.table.is_unicode() {
            ColumnUnit::Chars
        } else {
            ColumnUnit::Bytes
        }
    }

    fn lex_one(&mut self) -> Result<Token, LexerError> {
        let table = self.table;
        let lexemes = table.namespace(&self.namespace).unwrap_or_default();
        for lexeme in lexemes {
            let Some(len) = lexeme.match_len(self.text, self.offset) else {
                continue;
            };
            if len == 0 {
                return Err(LexerConfigError::EmptyMatch {
                    lexeme: SmolStr::new(lexeme.name()),
                    pattern: lexeme.pattern().to_string(),
                }
                .into());
            }

            let bytes = &self.text.as_bytes()[self.offset..self.offset + len];
            let value = String::from_utf8_lossy(bytes).into_owned();
            let token = Token {
                kind: SmolStr::new(lexeme.name()),
                length: value.chars().count(),
                value,
                namespace: self.namespace.clone(),
                keep: lexeme.name() != SKIP_LEXEME,
                offset: text_offset(self.offset)?,
            };

            self.transition(lexeme)?;
            self.offset += len;
            return Ok(token);
        }

        let offset = text_offset(self.offset)?;
        Err(UnrecognizedTokenError::at(self.text, offset, self.column_unit()).into())
    }

    fn transition(&mut self, lexeme: &Lexeme) -> Result<(), LexerConfigError> {
        let target = match lexeme.transition() {
            Transition::Stay => return Ok(()),
            Transition::Switch(target) if *target == self.namespace => return Ok(()),
            Transition::Switch(target) => {
                if let Some(stack) = self.stack.as_mut() {
                    stack.push(self.namespace.clone());
                }
                target.clone()
            }
            Transition::Shift(count) => {
                let stack = self.stack.get_or_insert_with(Vec::new);
                if *count == 0 || *count > stack.len() {
                    return Err(LexerConfigError::ShiftOverflow {
                        count: *count,
                        lexeme: SmolStr::new(lexeme.name()),
                        namespace: self.namespace.clone(),
                        available: stack.len(),
                    });
                }
                let keep = stack.len() - count;
                let target = stack[keep].clone();
                stack.truncate(keep);
                target
            }
        };

        if !self.table.contains_namespace(&target) {
            return Err(LexerConfigError::UnknownNamespace {
                target,
                lexeme: SmolStr::new(lexeme.name()),
                namespace: self.namespace.clone(),
            });
        }

        trace!(from = %self.namespace, to = %target, lexeme = %lexeme.name(), "namespace switch");
        self.namespace = target;
        Ok(())
    }
}

impl Iterator for Lexer<'_, '_> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.offset >= self.text.len() {
                self.finished = true;
                return Some(text_offset(self.offset).map(Token::eof));
            }
            match self.lex_one() {
                Ok(token) if token.keep => return Some(Ok(token)),
                Ok(_) => continue,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl std::iter::FusedIterator for Lexer<'_, '_> {}

/// Lex the whole input eagerly, stopping at the first error
pub fn tokenize(text: &str, table: &TokenTable) -> Result<Vec<Token>, LexerError> {
    Lexer::new(text, table).collect()
}
