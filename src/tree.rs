//! Arena-backed token tree produced by the tokenizer.
//!
//! The tree owns the original source string and every node; nodes refer to
//! each other through `TokenId` indices, so the parent back-reference is a
//! plain non-owning index used only to walk upward when recomputing
//! collection bounds. Children are owned exclusively by their parent's child
//! list.
//!
//! Offsets are **character** offsets into the original source (the source
//! may be non-ASCII); a precomputed char→byte index makes `source_text` an
//! O(1) slice after the parent walk.
//!
//! Child indexing accepts negative values counting from the end (`-1` is the
//! last child), with explicit `child` / `set_child` / `remove_child` /
//! `contains_child` operations.

use crate::kind::TokenKind;

/// Index of a node within its [`TokenTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(usize);

#[derive(Debug)]
struct Node {
    kind: TokenKind,
    content: Option<String>,
    start: Option<usize>,
    end: Option<usize>,
    parent: Option<TokenId>,
    children: Vec<TokenId>,
}

impl Node {
    fn new(kind: TokenKind, content: Option<String>, start: Option<usize>, end: Option<usize>) -> Self {
        Self {
            kind,
            content,
            start,
            end,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// The result of one tokenization call: the root `Code` token and every node
/// below it, together with the original source text.
#[derive(Debug)]
pub struct TokenTree {
    source: String,
    /// Byte offset of each character, plus a one-past-the-end sentinel.
    char_to_byte: Vec<usize>,
    nodes: Vec<Node>,
    root: TokenId,
}

impl TokenTree {
    /// Create a tree holding `source` with an empty `Code` root.
    pub fn new(source: String) -> Self {
        let mut char_to_byte: Vec<usize> = source.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(source.len());
        let root_node = Node::new(TokenKind::Code, None, None, None);
        Self {
            source,
            char_to_byte,
            nodes: vec![root_node],
            root: TokenId(0),
        }
    }

    pub fn root(&self) -> TokenId {
        self.root
    }

    /// The original source text, in full.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Length of the source in characters.
    pub fn char_len(&self) -> usize {
        self.char_to_byte.len() - 1
    }

    /// Allocate a detached leaf node.
    pub fn new_leaf(
        &mut self,
        kind: TokenKind,
        content: Option<String>,
        start: usize,
        end: usize,
    ) -> TokenId {
        debug_assert!(kind.is_leaf());
        self.push(Node::new(kind, content, Some(start), Some(end)))
    }

    /// Allocate a detached, childless collection node with unset bounds.
    pub fn new_collection(&mut self, kind: TokenKind) -> TokenId {
        debug_assert!(kind.is_collection());
        self.push(Node::new(kind, None, None, None))
    }

    fn push(&mut self, node: Node) -> TokenId {
        let id = TokenId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn kind(&self, id: TokenId) -> TokenKind {
        self.nodes[id.0].kind
    }

    pub fn content(&self, id: TokenId) -> Option<&str> {
        self.nodes[id.0].content.as_deref()
    }

    pub fn parent(&self, id: TokenId) -> Option<TokenId> {
        self.nodes[id.0].parent
    }

    /// Character offset range of the node, if set. Empty collections have no
    /// bounds until they receive a child.
    pub fn bounds(&self, id: TokenId) -> Option<(usize, usize)> {
        let node = &self.nodes[id.0];
        Some((node.start?, node.end?))
    }

    pub fn children(&self, id: TokenId) -> &[TokenId] {
        &self.nodes[id.0].children
    }

    pub fn child_count(&self, id: TokenId) -> usize {
        self.nodes[id.0].children.len()
    }

    pub fn has_children(&self, id: TokenId) -> bool {
        !self.nodes[id.0].children.is_empty()
    }

    /// Normalize a possibly negative child index against `len`.
    fn normalize(len: usize, index: isize) -> Option<usize> {
        if index >= 0 {
            let index = index as usize;
            (index < len).then_some(index)
        } else {
            len.checked_sub(index.unsigned_abs())
        }
    }

    /// Child at `index`; negative indices count from the end.
    pub fn child(&self, id: TokenId, index: isize) -> Option<TokenId> {
        let children = &self.nodes[id.0].children;
        Self::normalize(children.len(), index).map(|i| children[i])
    }

    /// True if a child exists at `index`.
    pub fn contains_child(&self, id: TokenId, index: isize) -> bool {
        self.child(id, index).is_some()
    }

    /// Append `child` to `parent`'s child list and recompute bounds upward.
    pub fn append_child(&mut self, parent: TokenId, child: TokenId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.recompute_bounds_upward(parent);
    }

    /// Replace the child at `index`, returning the previous id. The replaced
    /// node stays in the arena but is detached from the tree.
    pub fn set_child(&mut self, parent: TokenId, index: isize, child: TokenId) -> Option<TokenId> {
        let len = self.nodes[parent.0].children.len();
        let index = Self::normalize(len, index)?;
        let old = self.nodes[parent.0].children[index];
        self.nodes[old.0].parent = None;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children[index] = child;
        self.recompute_bounds_upward(parent);
        Some(old)
    }

    /// Remove and return the child at `index`; later children shift down.
    pub fn remove_child(&mut self, parent: TokenId, index: isize) -> Option<TokenId> {
        let len = self.nodes[parent.0].children.len();
        let index = Self::normalize(len, index)?;
        let removed = self.nodes[parent.0].children.remove(index);
        self.nodes[removed.0].parent = None;
        self.recompute_bounds_upward(parent);
        Some(removed)
    }

    /// Re-derive a collection's bounds from its first and last child and
    /// propagate the recomputation to the root.
    pub fn recompute_bounds_upward(&mut self, id: TokenId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            if node.kind.is_collection() && !node.children.is_empty() {
                let start = node
                    .children
                    .iter()
                    .find_map(|c| self.nodes[c.0].start);
                let end = node
                    .children
                    .iter()
                    .rev()
                    .find_map(|c| self.nodes[c.0].end);
                let node = &mut self.nodes[id.0];
                node.start = start;
                node.end = end;
            }
            current = self.nodes[id.0].parent;
        }
    }

    /// Pin the root's span to the entire source. Called once scanning is
    /// done so the root reproduces the input exactly, leading and trailing
    /// trivia included.
    pub(crate) fn finalize_root_bounds(&mut self) {
        let len = self.char_len();
        let root = &mut self.nodes[self.root.0];
        root.start = Some(0);
        root.end = Some(len);
    }

    /// Exact original text covered by the node's character span.
    ///
    /// All offsets are global to the root's source, so this is a direct
    /// slice through the char→byte index; an empty collection yields `""`.
    pub fn source_text(&self, id: TokenId) -> &str {
        match self.bounds(id) {
            Some((start, end)) => {
                let start = self.char_to_byte[start];
                let end = self.char_to_byte[end];
                &self.source[start..end]
            }
            None => "",
        }
    }
}
