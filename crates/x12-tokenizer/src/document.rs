//! Tokenizes a normalized X12 buffer into an indexed sequence of segments.

use std::ops::Range;

use crate::element::{Element, ElementSpan};
use crate::segment::{Segment, SegmentSpan};
use crate::syntax::{self, Delimiters};
use crate::{Error, Result};

/// A tokenized X12 interchange.
///
/// `Document` owns the normalized buffer it was parsed from; every
/// [`Segment`]/[`Element`] handed out by its accessors is a lightweight view
/// borrowing from that buffer, computed on demand from stored byte ranges
/// rather than materialized as separate owned copies.
#[derive(Debug)]
pub struct Document {
    buffer: Vec<u8>,
    delimiters: Delimiters,
    segments: Vec<SegmentSpan>,
}

impl Document {
    /// Normalize and tokenize `raw` into a `Document`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingISA`]/[`Error::InvalidISA`] when delimiter
    /// detection fails, and [`Error::MissingIEA`] when the interchange has
    /// no closing trailer.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let buffer = syntax::normalize(raw);
        let delimiters = Delimiters::detect(&buffer)?;

        let mut segments = Vec::new();
        let mut start = 0usize;
        for (i, &byte) in buffer.iter().enumerate() {
            if byte == delimiters.segment_terminator {
                push_segment(&mut segments, &buffer, start..i, &delimiters)?;
                start = i + 1;
            }
        }
        if start < buffer.len() {
            push_segment(&mut segments, &buffer, start..buffer.len(), &delimiters)?;
        }

        if segments.first().map(|s| &buffer[s.elements[0].range.clone()]) != Some(b"ISA".as_slice())
        {
            return Err(Error::MissingISA);
        }
        if !segments
            .iter()
            .any(|s| buffer[s.elements[0].range.clone()] == *b"IEA")
        {
            return Err(Error::MissingIEA);
        }

        tracing::debug!(segment_count = segments.len(), "tokenized document");

        Ok(Self {
            buffer,
            delimiters,
            segments,
        })
    }

    pub(crate) fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The delimiter bytes detected for this document.
    #[must_use]
    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    /// Total number of segments in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the document has no segments (never true for a successfully
    /// parsed document, since ISA/IEA are both required).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segment at document position `index`.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<Segment<'_>> {
        self.segments.get(index).map(|span| Segment::new(self, span))
    }

    /// All segments in document order.
    pub fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        self.segments.iter().map(move |span| Segment::new(self, span))
    }

    /// The first segment with id `tag`, searching from the start.
    #[must_use]
    pub fn find_first(&self, tag: &str) -> Option<Segment<'_>> {
        self.find_index_from(tag, 0)
    }

    /// All segments with id `tag`, in document order.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = Segment<'a>> {
        self.segments().filter(move |s| s.is(tag))
    }

    /// Number of segments with id `tag`.
    #[must_use]
    pub fn count(&self, tag: &str) -> usize {
        self.find_all(tag).count()
    }

    /// The segments in `range` (by document position), as a view.
    #[must_use]
    pub fn range(&self, range: Range<usize>) -> Vec<Segment<'_>> {
        self.segments
            .get(range)
            .into_iter()
            .flatten()
            .map(|span| Segment::new(self, span))
            .collect()
    }

    /// The first segment with id `tag` at or after document position
    /// `from`.
    #[must_use]
    pub fn find_index_from(&self, tag: &str, from: usize) -> Option<Segment<'_>> {
        self.segments
            .get(from..)?
            .iter()
            .find(|span| self.buffer[span.elements[0].range.clone()] == *tag.as_bytes())
            .map(|span| Segment::new(self, span))
    }

    /// Segments with id `tag`, found strictly after document position
    /// `after` and within `max_distance` positions of it, scanning stops
    /// as soon as a segment whose id is in `stop_set` is encountered.
    ///
    /// Backs the out-of-scope 837-structured mapper (§4.2's "used by the
    /// 837-structured variant" note); kept as a general Document index
    /// primitive since it costs nothing extra to provide.
    #[must_use]
    pub fn find_following(
        &self,
        tag: &str,
        after: usize,
        max_distance: usize,
        stop_set: &[&str],
    ) -> Vec<Segment<'_>> {
        let end = (after + 1 + max_distance).min(self.segments.len());
        let Some(window) = self.segments.get(after + 1..end) else {
            return Vec::new();
        };
        let mut matches = Vec::new();
        for span in window {
            let id = &self.buffer[span.elements[0].range.clone()];
            if stop_set.iter().any(|stop| *id == *stop.as_bytes()) {
                break;
            }
            if *id == *tag.as_bytes() {
                matches.push(Segment::new(self, span));
            }
        }
        matches
    }
}

fn push_segment(
    segments: &mut Vec<SegmentSpan>,
    buffer: &[u8],
    range: Range<usize>,
    delimiters: &Delimiters,
) -> Result<()> {
    let slice = &buffer[range.clone()];
    let trimmed_start = slice
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(slice.len());
    let trimmed_end = slice
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(trimmed_start, |p| p + 1);
    if trimmed_start >= trimmed_end {
        return Ok(());
    }
    let segment_start = range.start + trimmed_start;
    let segment_end = range.start + trimmed_end;

    let mut elements = Vec::new();
    let mut elem_start = segment_start;
    for i in segment_start..segment_end {
        if buffer[i] == delimiters.element {
            elements.push(element_span(buffer, elem_start..i, delimiters));
            elem_start = i + 1;
        }
    }
    elements.push(element_span(buffer, elem_start..segment_end, delimiters));

    if elements[0].range.is_empty() {
        return Err(Error::InvalidSegment {
            reason: format!("segment at byte offset {segment_start} has an empty id"),
        });
    }

    segments.push(SegmentSpan {
        index: segments.len(),
        elements,
    });
    Ok(())
}

fn element_span(buffer: &[u8], range: Range<usize>, delimiters: &Delimiters) -> ElementSpan {
    let slice = &buffer[range.clone()];
    let components = if slice.contains(&delimiters.composite) {
        let mut components = Vec::new();
        let mut start = range.start;
        for i in range.clone() {
            if buffer[i] == delimiters.composite {
                components.push(start..i);
                start = i + 1;
            }
        }
        components.push(start..range.end);
        components
    } else {
        Vec::new()
    };
    ElementSpan { range, components }
}
