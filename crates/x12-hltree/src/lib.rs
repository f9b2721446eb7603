//! # x12-hltree
//!
//! Builds the HL (Hierarchical Level) forest out of a tokenized X12
//! transaction and answers structural queries over it.
//!
//! X12's HL segments encode an arbitrary-depth tree (billing provider →
//! subscriber → patient → claim → service line, for an 837) as a flat,
//! linearly-linked sequence: each `HL` segment carries its own id (HL01),
//! its parent's id (HL02, absent for roots), and a level code (HL03). This
//! crate turns that linked list into a proper forest, stored as a flat
//! arena of [`HLNode`]s addressed by index rather than a pointer-chasing
//! tree — there is no lifetime to thread through the tree itself, only
//! through the borrowed [`x12_tokenizer::Document`] each node's segment
//! range resolves against.

mod builder;
mod node;

pub use builder::build;
pub use node::HLNode;

use thiserror::Error;

/// Errors that can occur while building an HL tree.
#[derive(Error, Debug)]
pub enum Error {
    /// The transaction has no `HL` segments at all.
    #[error("no HL segments found in transaction")]
    NoHLSegments,

    /// An `HL` segment is missing its own id (HL01).
    #[error("HL segment at document position {index} is missing HL01 (own id)")]
    MissingHLID { index: usize },

    /// An `HL` segment is missing its level code (HL03).
    #[error("HL segment {id} is missing HL03 (level code)")]
    MissingLevelCode { id: String },

    /// An `HL` segment's HL02 references an id no earlier HL segment
    /// declared.
    #[error("HL segment {child} references parent {parent} which was not found")]
    ParentNotFound { child: String, parent: String },

    /// The tree has no root nodes (every node claims a parent).
    #[error("HL tree has no root nodes")]
    NoRootNodes,
}

pub type Result<T> = std::result::Result<T, Error>;

/// A forest of [`HLNode`]s, stored as a flat arena.
///
/// Indices into the arena are stable for the lifetime of the `HLTree` and
/// are what [`HLNode::parent`] and [`HLNode::children`] reference — walking
/// the tree is array indexing, never pointer chasing.
#[derive(Debug)]
pub struct HLTree {
    nodes: Vec<HLNode>,
    roots: Vec<usize>,
}

impl HLTree {
    pub(crate) fn new(nodes: Vec<HLNode>, roots: Vec<usize>) -> Self {
        Self { nodes, roots }
    }

    /// The node at arena index `idx`.
    #[must_use]
    pub fn node(&self, idx: usize) -> Option<&HLNode> {
        self.nodes.get(idx)
    }

    /// Arena indices of the top-level (parentless) nodes, in document
    /// order.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Total number of nodes in the tree.
    #[must_use]
    pub fn count_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Find a node by its HL01 id.
    #[must_use]
    pub fn find_node_by_id(&self, id: &str) -> Option<&HLNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// All nodes whose level code (HL03) equals `code`, in document order.
    pub fn nodes_by_level_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a HLNode> {
        self.nodes.iter().filter(move |n| n.level_code() == code)
    }

    /// Number of descendants (not counting `idx` itself) under the node at
    /// `idx`.
    #[must_use]
    pub fn descendants_count(&self, idx: usize) -> usize {
        let Some(node) = self.nodes.get(idx) else {
            return 0;
        };
        node.children()
            .iter()
            .map(|&child| 1 + self.descendants_count(child))
            .sum()
    }

    /// Pre-order traversal of the whole forest: each root, then its
    /// descendants depth-first, before moving to the next root.
    pub fn pre_order(&self) -> PreOrder<'_> {
        let stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        PreOrder { tree: self, stack }
    }
}

/// Depth-first, pre-order iterator over an [`HLTree`]'s nodes.
pub struct PreOrder<'a> {
    tree: &'a HLTree,
    stack: Vec<usize>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a HLNode;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = self.tree.node(idx)?;
        for &child in node.children().iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
