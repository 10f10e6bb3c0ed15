//! Trace-based backtracking LL(k) parser
//!
//! The engine keeps a `todo` stack of rule entries/exits still to process
//! and appends everything it does to a `trace`. Choices and repetitions
//! record a snapshot of `todo` in the trace; when a step fails, the trace is
//! unwound to the most recent such point, the token buffer is rewound by the
//! number of tokens unwound, and the next alternative (or one more
//! repetition) is tried.
//!
//! Parsing is worst-case exponential in the input length for ambiguous
//! grammars. Rewinding is bounded by the `parser.lookahead` pragma.

use std::path::Path;

use rayon::prelude::*;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::errors::UnexpectedTokenError;
use super::lexer::{Lexer, Token};
use super::token_table::TokenTable;
use super::trace::{Invocation, MatchedToken, Step, Todo, TraceEntry};
use super::tree_builder;
use crate::base::{Buffer, ColumnUnit};
use crate::error::{Error, GrammarError, Result};
use crate::grammar::{Grammar, Pragmas};
use crate::rules::{Rule, RuleKey, RuleKind, Rules, TokenRule, analyze};
use crate::tree::Tree;

/// A compiled grammar, ready to parse any number of inputs
#[derive(Debug, Clone)]
pub struct Compiler {
    grammar: Grammar,
    table: TokenTable,
    rules: Rules,
}

impl Compiler {
    /// Compile `grammar`: build its token table and analyze its rules.
    pub fn new(grammar: Grammar) -> Result<Self> {
        let rules = analyze(&grammar)?;
        Self::with_rules(grammar, rules)
    }

    /// Use already analyzed `rules` for `grammar`
    pub fn with_rules(grammar: Grammar, rules: Rules) -> Result<Self> {
        let table = TokenTable::from_map(grammar.tokens(), grammar.pragmas().unicode())?;
        debug!(
            rules = rules.len(),
            root = ?rules.root(),
            lookahead = grammar.pragmas().lookahead(),
            "compiled grammar"
        );
        Ok(Self {
            grammar,
            table,
            rules,
        })
    }

    /// Read and compile grammar text. `source_name` is used in messages.
    pub fn from_source(text: &str, source_name: &str) -> Result<Self> {
        Self::new(Grammar::read(text, source_name)?)
    }

    /// Read and compile a grammar file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let source_name = path.display().to_string();
        if text.trim().is_empty() {
            return Err(GrammarError::Empty { source_name }.into());
        }
        Self::from_source(&text, &source_name)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn pragmas(&self) -> &Pragmas {
        self.grammar.pragmas()
    }

    pub fn token_table(&self) -> &TokenTable {
        &self.table
    }

    /// The first declared rule
    pub fn root_rule(&self) -> Option<&RuleKey> {
        self.rules.root()
    }

    /// Lex `text` with this grammar's tokens
    pub fn tokens<'t>(&self, text: &'t str) -> Lexer<'t, '_> {
        Lexer::new(text, &self.table)
    }

    /// Parse `text` from rule `start`, or from the root rule when `start` is
    /// `None` or not a declared rule.
    pub fn parse(&self, text: &str, start: Option<&str>) -> Result<Tree> {
        let root = self.start_rule(start)?;
        let state = self.run(text, &root)?;
        let tree = tree_builder::build(&state.trace, &self.rules, &root)?;
        debug!(root = %root, trace = state.trace.len(), "parsed input");
        Ok(tree)
    }

    /// Parse `text` and return the raw trace of the successful run
    pub fn trace(&self, text: &str, start: Option<&str>) -> Result<Vec<TraceEntry>> {
        let root = self.start_rule(start)?;
        Ok(self.run(text, &root)?.trace)
    }

    /// Parse independent inputs in parallel, each from the root rule
    pub fn parse_all(&self, inputs: &[&str]) -> Vec<Result<Tree>> {
        inputs
            .par_iter()
            .map(|text| self.parse(text, None))
            .collect()
    }

    fn start_rule(&self, start: Option<&str>) -> Result<RuleKey> {
        start
            .map(RuleKey::named)
            .filter(|key| self.rules.contains(key))
            .or_else(|| self.rules.root().cloned())
            .ok_or_else(|| Error::internal("grammar has no declared rule"))
    }

    fn run<'t>(&self, text: &'t str, root: &RuleKey) -> Result<ParseState<'_, 't>> {
        let mut state = ParseState::new(self, text);
        state.run(root)?;
        Ok(state)
    }
}

/// Mutable state of one parse
struct ParseState<'c, 't> {
    rules: &'c Rules,
    table: &'c TokenTable,
    text: &'t str,
    tokens: Buffer<Lexer<'t, 'c>>,
    todo: Todo,
    trace: Vec<TraceEntry>,
    depth: isize,
    /// Furthest token reached by a successful match
    error_token: Option<Token>,
}

impl<'c, 't> ParseState<'c, 't> {
    fn new(compiler: &'c Compiler, text: &'t str) -> Self {
        Self {
            rules: &compiler.rules,
            table: &compiler.table,
            text,
            tokens: Buffer::new(
                Lexer::new(text, &compiler.table),
                compiler.pragmas().lookahead(),
            ),
            todo: Todo::new(),
            trace: Vec::new(),
            depth: -1,
            error_token: None,
        }
    }

    fn rule(&self, key: &RuleKey) -> Result<&'c Rule> {
        self.rules
            .get(key)
            .ok_or_else(|| Error::internal(format!("unknown rule {key}")))
    }

    fn invocation(&self, key: &RuleKey, data: usize) -> Result<Invocation> {
        let rule = self.rule(key)?;
        Ok(Invocation::new(key.clone(), data, rule.is_transitional()))
    }

    fn current_token(&self) -> Result<&Token> {
        match self.tokens.current() {
            Some(Ok(token)) => Ok(token),
            Some(Err(err)) => Err(err.clone().into()),
            None => Err(Error::internal("token stream ended before EOF")),
        }
    }

    fn run(&mut self, root: &RuleKey) -> Result<()> {
        self.tokens.rewind();
        let root = self.invocation(root, 0)?;
        self.todo.push(Step::Exit(root.clone()));
        self.todo.push(Step::Entry(root));

        loop {
            // `false` means backtracking already gave up, possibly with the
            // token window exhausted, so the trace must not be unwound again
            if !self.unfold()? {
                return Err(self.unexpected_token()?.into());
            }
            if self.current_token()?.is_eof() {
                return Ok(());
            }
            if !self.backtrack()? {
                return Err(self.unexpected_token()?.into());
            }
        }
    }

    fn unexpected_token(&self) -> Result<UnexpectedTokenError> {
        let token = match &self.error_token {
            Some(token) => token.clone(),
            None => self.current_token()?.clone(),
        };
        let unit = if self.table.is_unicode() {
            ColumnUnit::Chars
        } else {
            ColumnUnit::Bytes
        };
        Ok(UnexpectedTokenError::at(self.text, token, unit))
    }

    /// Run steps until `todo` is empty. `false` when a step failed and no
    /// backtracking point is left.
    fn unfold(&mut self) -> Result<bool> {
        while let Some(step) = self.todo.pop() {
            match step {
                Step::Exit(exit) => {
                    let transitional = exit.transitional;
                    self.trace.push(TraceEntry::Exit(exit.with_depth(self.depth)));
                    if !transitional {
                        self.depth -= 1;
                    }
                }
                Step::Entry(entry) => {
                    if !self.step(&entry.rule, entry.data)? && !self.backtrack()? {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    fn step(&mut self, key: &RuleKey, index: usize) -> Result<bool> {
        let rule = self.rule(key)?;
        let transitional = rule.is_transitional();

        match rule.kind() {
            RuleKind::Token(token) => self.match_token(key, token),

            RuleKind::Concatenation(children) => {
                if !transitional {
                    self.depth += 1;
                }
                let entry = Invocation::new(key.clone(), 0, transitional).with_depth(self.depth);
                self.trace.push(TraceEntry::Entry(entry));
                for child in children.iter().rev() {
                    self.push_call(child)?;
                }
                Ok(true)
            }

            RuleKind::Choice(children) => {
                let Some(child) = children.get(index) else {
                    trace!(rule = %key, index, "choice exhausted");
                    return Ok(false);
                };
                if !transitional {
                    self.depth += 1;
                }
                let entry = Invocation::new(key.clone(), index, transitional)
                    .with_todo(self.todo.clone())
                    .with_depth(self.depth);
                self.trace.push(TraceEntry::Entry(entry));
                self.push_call(child)?;
                Ok(true)
            }

            RuleKind::Repetition(repetition) => {
                if index == 0 {
                    let min = repetition.min();
                    if !transitional {
                        self.depth += 1;
                    }
                    let entry = Invocation::new(key.clone(), min, transitional).with_depth(self.depth);
                    self.trace.push(TraceEntry::Entry(entry));
                    // Replace our own pending exit by one remembering `min`
                    self.todo.pop();
                    let exit = Invocation::new(key.clone(), min, transitional).with_todo(self.todo.clone());
                    self.todo.push(Step::Exit(exit));
                    for _ in 0..min {
                        self.push_call(repetition.child())?;
                    }
                } else {
                    if repetition.max().is_some_and(|max| max < index) {
                        return Ok(false);
                    }
                    let exit = Invocation::new(key.clone(), index, transitional).with_todo(self.todo.clone());
                    self.todo.push(Step::Exit(exit));
                    self.push_call(repetition.child())?;
                }
                Ok(true)
            }
        }
    }

    /// Schedule a full invocation of `key`: entry first, then exit
    fn push_call(&mut self, key: &RuleKey) -> Result<()> {
        let call = self.invocation(key, 0)?;
        self.todo.push(Step::Exit(call.clone()));
        self.todo.push(Step::Entry(call));
        Ok(())
    }

    fn match_token(&mut self, key: &RuleKey, rule: &TokenRule) -> Result<bool> {
        let token = self.current_token()?;
        if token.kind != rule.token() {
            return Ok(false);
        }
        let value = token.value.clone();
        let namespace = token.namespace.clone();

        if let Some(index) = rule.unification() {
            if !self.unifies(index, &value) {
                trace!(rule = %key, index, value = %value, "unification failed");
                return Ok(false);
            }
        }

        let representation = self
            .table
            .representation(&namespace, rule.token())
            .unwrap_or_default()
            .to_string();

        // A token rule has no trace entry or exit of its own
        self.todo.pop();
        self.trace.push(TraceEntry::Token(MatchedToken {
            rule: key.clone(),
            kind: SmolStr::new(rule.token()),
            value,
            namespace,
            representation,
            unification: rule.unification(),
            kept: rule.is_kept(),
        }));
        self.tokens.advance();
        self.record_progress()?;
        Ok(true)
    }

    fn record_progress(&mut self) -> Result<()> {
        let token = self.current_token()?;
        let further = self
            .error_token
            .as_ref()
            .is_none_or(|furthest| token.offset >= furthest.offset);
        if further {
            self.error_token = Some(token.clone());
        }
        Ok(())
    }

    /// Whether `value` agrees with every earlier token of the same
    /// unification index within the current rule invocation.
    fn unifies(&self, index: usize, value: &str) -> bool {
        let mut skip = 0isize;
        for entry in self.trace.iter().rev() {
            match entry {
                TraceEntry::Entry(entry) if !entry.transitional => {
                    if entry.depth <= self.depth {
                        break;
                    }
                    skip -= 1;
                }
                TraceEntry::Exit(exit) if !exit.transitional => {
                    if exit.depth > self.depth {
                        skip += 1;
                    }
                }
                _ => {}
            }
            if skip > 0 {
                continue;
            }
            if let TraceEntry::Token(token) = entry {
                if token.unification == Some(index) && token.value != value {
                    return false;
                }
            }
        }
        true
    }

    /// Unwind to the latest choice or repetition and schedule its next try.
    fn backtrack(&mut self) -> Result<bool> {
        let rules = self.rules;
        while let Some(last) = self.trace.pop() {
            match last {
                TraceEntry::Entry(entry) => {
                    if matches!(rules.get(&entry.rule).map(Rule::kind), Some(RuleKind::Choice(_))) {
                        // Re-entering the choice increments the depth again
                        let depth = if entry.transitional { entry.depth } else { entry.depth - 1 };
                        self.resume(entry, depth);
                        return Ok(true);
                    }
                }
                TraceEntry::Exit(exit) => {
                    if matches!(rules.get(&exit.rule).map(Rule::kind), Some(RuleKind::Repetition(_))) {
                        let depth = exit.depth;
                        self.resume(exit, depth);
                        return Ok(true);
                    }
                }
                TraceEntry::Token(_) => {
                    if !self.tokens.previous() {
                        trace!("token window exhausted while backtracking");
                        return Ok(false);
                    }
                }
            }
        }
        Ok(false)
    }

    fn resume(&mut self, point: Invocation, depth: isize) {
        trace!(rule = %point.rule, next = point.data + 1, depth, "backtrack");
        let next = Invocation::new(point.rule, point.data + 1, point.transitional);
        self.depth = depth;
        self.todo = point.todo;
        self.todo.push(Step::Entry(next));
    }
}
