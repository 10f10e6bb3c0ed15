//! Tree reconstruction from a successful trace
//!
//! Walks the trace once. Kept tokens become leaves; every non-transitional
//! rule entry pushes a marker, and its exit collects everything above the
//! marker. Collected children are wrapped in a node when the rule (or a
//! transitional rule inside it) carries a node id, and spliced into the
//! enclosing level otherwise.

use tracing::trace;

use super::trace::TraceEntry;
use crate::error::{Error, Result};
use crate::rules::{MERGE_RECURSIVE, MERGE_SHALLOW, NodeId, Rule, RuleKey, Rules};
use crate::tree::{NodeIndex, TokenValue, Tree, TreeArena};

enum Pending {
    Node(NodeIndex),
    /// Start of the children of a non-transitional rule
    Marker(RuleKey),
    Id(NodeId),
}

pub(crate) fn build(trace: &[TraceEntry], rules: &Rules, root: &RuleKey) -> Result<Tree> {
    let mut builder = TreeBuilder {
        rules,
        arena: TreeArena::default(),
        pending: Vec::new(),
    };
    builder.walk(trace)?;
    builder.finish(root)
}

struct TreeBuilder<'r> {
    rules: &'r Rules,
    arena: TreeArena,
    pending: Vec<Pending>,
}

impl<'r> TreeBuilder<'r> {
    fn rule(&self, key: &RuleKey) -> Result<&'r Rule> {
        self.rules
            .get(key)
            .ok_or_else(|| Error::internal(format!("trace refers to unknown rule {key}")))
    }

    fn walk(&mut self, trace: &[TraceEntry]) -> Result<()> {
        let mut open: Vec<(&'r Rule, bool)> = Vec::new();
        let mut i = 0;

        while let Some(entry) = trace.get(i) {
            i += 1;
            match entry {
                TraceEntry::Entry(entry) => {
                    if matches!(trace.get(i), Some(TraceEntry::Exit(exit)) if exit.rule == entry.rule) {
                        i += 1;
                        continue;
                    }
                    let rule = self.rule(&entry.rule)?;
                    if !entry.transitional {
                        self.pending.push(Pending::Marker(entry.rule.clone()));
                    }
                    if let Some(id) = rule.node_id() {
                        self.pending.push(Pending::Id(id.clone()));
                    }
                    open.push((rule, entry.transitional));
                }
                TraceEntry::Exit(_) => {
                    let (rule, transitional) = open
                        .pop()
                        .ok_or_else(|| Error::internal("trace exits a rule it never entered"))?;
                    if !transitional {
                        self.close(rule)?;
                    }
                }
                TraceEntry::Token(token) => {
                    if token.kept {
                        let leaf = self.arena.token(TokenValue {
                            kind: token.kind.clone(),
                            text: token.value.clone(),
                            namespace: token.namespace.clone(),
                        })?;
                        self.pending.push(Pending::Node(leaf));
                    }
                }
            }
        }

        if !open.is_empty() {
            return Err(Error::internal(format!(
                "trace leaves {} rule(s) open",
                open.len()
            )));
        }
        Ok(())
    }

    fn close(&mut self, rule: &Rule) -> Result<()> {
        let mut handle = Vec::new();
        let mut chosen: Option<NodeId> = None;
        while let Some(pending) = self.pending.pop() {
            match pending {
                Pending::Node(node) => handle.push(node),
                Pending::Id(id) => {
                    if chosen.is_none() {
                        chosen = Some(id);
                    }
                }
                Pending::Marker(name) => {
                    if name == *rule.name() {
                        break;
                    }
                }
            }
        }

        let Some(id) = chosen.or_else(|| rule.default_id().cloned()) else {
            self.pending
                .extend(handle.into_iter().rev().map(Pending::Node));
            return Ok(());
        };
        handle.reverse();

        if id.has_option(MERGE_SHALLOW) && self.merge_into_last(&id, &handle, false) {
            return Ok(());
        }
        if id.has_option(MERGE_RECURSIVE) && self.merge_into_last(&id, &handle, true) {
            return Ok(());
        }

        let label = rule.node_id().unwrap_or(&id).id();
        let node = self.arena.alloc(label, None)?;
        for child in handle {
            self.arena.append_child(node, child);
        }
        self.pending.push(Pending::Node(node));
        Ok(())
    }

    fn merge_into_last(&mut self, id: &NodeId, handle: &[NodeIndex], recursive: bool) -> bool {
        let Some(&Pending::Node(last)) = self.pending.last() else {
            return false;
        };
        if self.arena.id(last) != id.id() {
            return false;
        }
        trace!(id = id.id(), recursive, children = handle.len(), "merging node");
        for &child in handle {
            if recursive {
                self.merge_recursive(last, child);
            } else {
                self.arena.append_child(last, child);
            }
        }
        true
    }

    fn merge_recursive(&mut self, node: NodeIndex, new: NodeIndex) {
        if self.arena.is_token(new) {
            self.arena.append_child(node, new);
            return;
        }
        match self.arena.last_child(node) {
            Some(last) if self.arena.id(last) == self.arena.id(new) => {
                for child in self.arena.children(new).to_vec() {
                    self.merge_recursive(last, child);
                }
            }
            _ => self.arena.append_child(node, new),
        }
    }

    fn finish(mut self, root: &RuleKey) -> Result<Tree> {
        let mut nodes: Vec<NodeIndex> = self
            .pending
            .drain(..)
            .filter_map(|pending| match pending {
                Pending::Node(node) => Some(node),
                Pending::Marker(_) | Pending::Id(_) => None,
            })
            .collect();

        if nodes.len() == 1 {
            if let Some(node) = nodes.pop() {
                return Ok(self.arena.finish(node));
            }
        }

        // Zero or several top-level children get a node of their own
        let rule = self.rule(root)?;
        let label = match rule.node_id().or(rule.default_id()) {
            Some(id) => id.id().to_string(),
            None => format!("#{root}"),
        };
        let wrapper = self.arena.alloc(label, None)?;
        for node in nodes {
            self.arena.append_child(wrapper, node);
        }
        Ok(self.arena.finish(wrapper))
    }
}
