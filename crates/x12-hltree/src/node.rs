use std::ops::Range;

use x12_tokenizer::{Document, Segment};

/// One node of the HL forest.
///
/// Stores its identity (HL01/HL02/HL03), its arena-index links to parent
/// and children, and the contiguous range of document segment positions
/// that belong to it directly — not to any descendant.
#[derive(Debug, Clone)]
pub struct HLNode {
    pub(crate) id: String,
    pub(crate) parent_hl_id: Option<String>,
    pub(crate) level_code: String,
    pub(crate) has_children: bool,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) segment_start: usize,
    pub(crate) segment_end: usize,
}

impl HLNode {
    /// HL01: this node's own id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// HL02: the parent's id, or `None` for a root node.
    #[must_use]
    pub fn parent_hl_id(&self) -> Option<&str> {
        self.parent_hl_id.as_deref()
    }

    /// HL03: the level code (e.g. `20` billing provider, `22` subscriber,
    /// `23` patient).
    #[must_use]
    pub fn level_code(&self) -> &str {
        &self.level_code
    }

    /// HL04: whether the source segment declared children (`1`).
    ///
    /// Kept even though `children().is_empty()` is the authoritative answer
    /// — the field is part of the wire data and tests assert it can diverge
    /// from the actual child count (§8 boundary behaviours).
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.has_children
    }

    /// Arena index of the parent node, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Arena indices of this node's direct children, in document order.
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// The document segment-position range `[start, end)` owned directly
    /// by this node: its own `HL` segment plus any non-hierarchical detail
    /// that follows it, up to (but not including) the next `HL` segment in
    /// the document.
    #[must_use]
    pub fn segment_range(&self) -> Range<usize> {
        self.segment_start..self.segment_end
    }

    /// Resolve this node's segment range against `document`.
    #[must_use]
    pub fn segments<'doc>(&self, document: &'doc Document) -> Vec<Segment<'doc>> {
        document.range(self.segment_range())
    }
}
