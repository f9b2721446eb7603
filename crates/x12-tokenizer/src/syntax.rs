//! X12 delimiter detection from the ISA segment.
//!
//! Unlike EDIFACT's UNA service string advice (self-describing, variable
//! position), X12 fixes its delimiters at absolute byte offsets inside the
//! 106-byte ISA segment. There is no scanning involved.

use crate::{Error, Result};

/// Byte offset of the element separator within a normalized ISA segment.
pub const ELEMENT_SEPARATOR_OFFSET: usize = 3;
/// Byte offset of the repetition separator (ISA16).
pub const REPETITION_SEPARATOR_OFFSET: usize = 82;
/// Byte offset of the composite separator (ISA16 sibling byte).
pub const COMPOSITE_SEPARATOR_OFFSET: usize = 104;
/// Byte offset of the segment terminator, immediately after ISA.
pub const SEGMENT_TERMINATOR_OFFSET: usize = 105;
/// Minimum length of a normalized buffer for delimiter detection to proceed.
pub const MIN_ISA_LENGTH: usize = 106;

/// The four delimiter bytes that govern how a document is tokenized.
///
/// Immutable once detected: every subsequent parse in the document uses
/// these same four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    /// Separates elements within a segment (ISA3, typically `*`).
    pub element: u8,
    /// Terminates a segment (byte right after ISA, typically `~`).
    pub segment_terminator: u8,
    /// Separates components within a composite element (ISA16, typically `:`).
    pub composite: u8,
    /// Separates repeated occurrences within a single element (typically `^`).
    pub repetition: u8,
}

impl Delimiters {
    /// Detect delimiters from a normalized buffer's ISA segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidISA`] when the buffer is shorter than
    /// [`MIN_ISA_LENGTH`], and [`Error::MissingISA`] when it doesn't start
    /// with `ISA`.
    pub fn detect(buf: &[u8]) -> Result<Self> {
        if buf.len() < 3 || &buf[..3] != b"ISA" {
            return Err(Error::MissingISA);
        }
        if buf.len() < MIN_ISA_LENGTH {
            return Err(Error::InvalidISA {
                reason: format!(
                    "expected at least {MIN_ISA_LENGTH} bytes, got {}",
                    buf.len()
                ),
            });
        }

        let delimiters = Self {
            element: buf[ELEMENT_SEPARATOR_OFFSET],
            segment_terminator: buf[SEGMENT_TERMINATOR_OFFSET],
            composite: buf[COMPOSITE_SEPARATOR_OFFSET],
            repetition: buf[REPETITION_SEPARATOR_OFFSET],
        };

        tracing::debug!(
            element = delimiters.element as char,
            segment_terminator = delimiters.segment_terminator as char,
            composite = delimiters.composite as char,
            repetition = delimiters.repetition as char,
            "detected X12 delimiters"
        );

        Ok(delimiters)
    }

    /// Whether `byte` is a composite-separated component boundary.
    #[inline]
    #[must_use]
    pub fn is_composite(&self, byte: u8) -> bool {
        byte == self.composite
    }
}

/// Strip `\n`/`\r` from `input`, producing the owned buffer the tokenizer
/// downstream borrows from.
#[must_use]
pub fn normalize(input: &[u8]) -> Vec<u8> {
    input
        .iter()
        .copied()
        .filter(|&b| b != b'\n' && b != b'\r')
        .collect()
}
