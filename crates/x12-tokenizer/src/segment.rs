//! Segment views over a [`Document`](crate::Document).

use crate::document::Document;
use crate::element::{Element, ElementSpan};

/// Byte-range bookkeeping for one segment, stored inside a `Document`.
#[derive(Debug, Clone)]
pub(crate) struct SegmentSpan {
    pub(crate) elements: Vec<ElementSpan>,
    pub(crate) index: usize,
}

/// A borrowed view of one segment (a terminator-delimited record) in a
/// `Document`.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'doc> {
    doc: &'doc Document,
    span: &'doc SegmentSpan,
}

impl<'doc> Segment<'doc> {
    pub(crate) fn new(doc: &'doc Document, span: &'doc SegmentSpan) -> Self {
        Self { doc, span }
    }

    /// The segment identifier, i.e. the value of its first element (`ISA`,
    /// `GS`, `ST`, `HL`, `NM1`, ...).
    #[must_use]
    pub fn id(&self) -> &'doc [u8] {
        self.span
            .elements
            .first()
            .map(|e| &self.doc.buffer()[e.range.clone()])
            .unwrap_or(&[])
    }

    /// Whether this segment's id matches `tag` (ASCII-cased comparison).
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.id() == tag.as_bytes()
    }

    /// All elements in this segment, including the id at position 0.
    #[must_use]
    pub fn elements(&self) -> Vec<Element<'doc>> {
        self.span
            .elements
            .iter()
            .map(|span| Element::new(self.doc, span))
            .collect()
    }

    /// The element at `pos` (0-based, id included), or `None` if out of
    /// range.
    #[must_use]
    pub fn element(&self, pos: usize) -> Option<Element<'doc>> {
        self.span.elements.get(pos).map(|span| Element::new(self.doc, span))
    }

    /// Number of elements in this segment, id included.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.span.elements.len()
    }

    /// This segment's 0-based position within the document.
    #[must_use]
    pub fn index(&self) -> usize {
        self.span.index
    }
}
