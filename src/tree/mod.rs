//! Syntax trees produced by the parser
//!
//! Nodes live in a flat arena owned by [`Tree`] and refer to each other by
//! [`NodeIndex`]. Read access goes through [`TreeNode`] handles. Rule nodes
//! carry an id such as `#object`; token leaves have the id `token` and a
//! [`TokenValue`].
//!
//! Displaying a tree renders it one node per line, each prefixed by `>  `
//! once per level:
//!
//! ```text
//! >  #pair
//! >  >  token(string:string, foo)
//! >  >  token(true, true)
//! ```

use std::fmt;

use smol_str::SmolStr;

use crate::error::{Error, Result};

use crate::parser::DEFAULT_NAMESPACE;

/// Id of token leaves
pub const TOKEN_NODE_ID: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    fn new(index: usize) -> Result<Self> {
        u32::try_from(index)
            .map(Self)
            .map_err(|_| Error::TreeTooLarge)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of a token leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenValue {
    pub kind: SmolStr,
    pub text: String,
    pub namespace: SmolStr,
}

#[derive(Debug, Clone)]
struct NodeData {
    id: SmolStr,
    value: Option<TokenValue>,
    children: Vec<NodeIndex>,
    parent: Option<NodeIndex>,
}

/// Node storage used while a tree is being assembled
#[derive(Debug, Default)]
pub(crate) struct TreeArena {
    nodes: Vec<NodeData>,
}

impl TreeArena {
    pub(crate) fn alloc(
        &mut self,
        id: impl Into<SmolStr>,
        value: Option<TokenValue>,
    ) -> Result<NodeIndex> {
        let index = NodeIndex::new(self.nodes.len())?;
        self.nodes.push(NodeData {
            id: id.into(),
            value,
            children: Vec::new(),
            parent: None,
        });
        Ok(index)
    }

    pub(crate) fn token(&mut self, value: TokenValue) -> Result<NodeIndex> {
        self.alloc(TOKEN_NODE_ID, Some(value))
    }

    pub(crate) fn id(&self, node: NodeIndex) -> &str {
        &self.nodes[node.index()].id
    }

    pub(crate) fn is_token(&self, node: NodeIndex) -> bool {
        self.id(node) == TOKEN_NODE_ID
    }

    pub(crate) fn children(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.nodes[node.index()].children
    }

    pub(crate) fn last_child(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.children(node).last().copied()
    }

    pub(crate) fn append_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
    }

    pub(crate) fn finish(self, root: NodeIndex) -> Tree {
        Tree {
            nodes: self.nodes,
            root,
        }
    }
}

/// A parsed syntax tree
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeIndex,
}

impl Tree {
    pub fn root(&self) -> TreeNode<'_> {
        TreeNode {
            tree: self,
            index: self.root,
        }
    }

    pub fn get(&self, index: NodeIndex) -> Option<TreeNode<'_>> {
        (index.index() < self.nodes.len()).then_some(TreeNode { tree: self, index })
    }

    fn data(&self, index: NodeIndex) -> &NodeData {
        &self.nodes[index.index()]
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root(), f)
    }
}

/// Borrowed view of one node
#[derive(Clone, Copy)]
pub struct TreeNode<'a> {
    tree: &'a Tree,
    index: NodeIndex,
}

impl<'a> TreeNode<'a> {
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn id(&self) -> &'a str {
        &self.tree.data(self.index).id
    }

    pub fn value(&self) -> Option<&'a TokenValue> {
        self.tree.data(self.index).value.as_ref()
    }

    pub fn is_token(&self) -> bool {
        self.id() == TOKEN_NODE_ID
    }

    /// Kind of the token, for token leaves
    pub fn token_kind(&self) -> Option<&'a str> {
        self.value().map(|value| value.kind.as_str())
    }

    /// Matched text, for token leaves
    pub fn token_text(&self) -> Option<&'a str> {
        self.value().map(|value| value.text.as_str())
    }

    pub fn child_count(&self) -> usize {
        self.tree.data(self.index).children.len()
    }

    pub fn child(&self, i: usize) -> Option<TreeNode<'a>> {
        let index = *self.tree.data(self.index).children.get(i)?;
        Some(TreeNode {
            tree: self.tree,
            index,
        })
    }

    pub fn children(self) -> impl ExactSizeIterator<Item = TreeNode<'a>> {
        let tree = self.tree;
        tree.data(self.index)
            .children
            .iter()
            .map(move |&index| TreeNode { tree, index })
    }

    pub fn parent(&self) -> Option<TreeNode<'a>> {
        let index = self.tree.data(self.index).parent?;
        Some(TreeNode {
            tree: self.tree,
            index,
        })
    }

    /// Number of ancestors
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), |node| node.parent()).count()
    }

    fn write_dump(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            f.write_str(">  ")?;
        }
        f.write_str(self.id())?;
        if let Some(value) = self.value() {
            f.write_str("(")?;
            if value.namespace != DEFAULT_NAMESPACE {
                write!(f, "{}:", value.namespace)?;
            }
            write!(f, "{}, {})", value.kind, value.text)?;
        }
        f.write_str("\n")?;
        for child in self.children() {
            child.write_dump(f, depth + 1)?;
        }
        Ok(())
    }
}

impl PartialEq for TreeNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for TreeNode<'_> {}

impl fmt::Debug for TreeNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("id", &self.id())
            .field("value", &self.value())
            .field("children", &self.child_count())
            .finish()
    }
}

impl fmt::Display for TreeNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_dump(f, 1)
    }
}
