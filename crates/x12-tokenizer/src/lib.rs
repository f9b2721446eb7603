//! # x12-tokenizer
//!
//! Delimiter-detecting, zero-copy tokenizer for ANSI X12 interchanges.
//!
//! X12 fixes its field/segment/composite/repetition delimiters at absolute
//! byte offsets inside the leading ISA segment, rather than EDIFACT's
//! self-describing UNA service string. [`syntax::Delimiters::detect`] reads
//! those four bytes once; everything downstream — segment splitting,
//! element splitting, composite and repetition parsing — uses them
//! verbatim for the rest of the interchange.
//!
//! [`Document::parse`] normalizes and tokenizes a raw interchange in one
//! pass. The resulting [`Document`] owns the normalized buffer; every
//! [`Segment`]/[`Element`] it hands out is a borrowed view computed from
//! stored byte ranges, not a separate copy.

pub mod document;
pub mod element;
pub mod segment;
pub mod syntax;

pub use document::Document;
pub use element::Element;
pub use segment::Segment;
pub use syntax::Delimiters;

use thiserror::Error;

/// Errors that can occur while tokenizing an X12 interchange.
#[derive(Error, Debug)]
pub enum Error {
    /// The buffer doesn't begin with an `ISA` segment.
    #[error("missing ISA segment")]
    MissingISA,

    /// An `ISA` segment was found but malformed (too short to carry all
    /// four delimiter positions).
    #[error("invalid ISA segment: {reason}")]
    InvalidISA { reason: String },

    /// The interchange has no `IEA` trailer segment.
    #[error("missing IEA segment")]
    MissingIEA,

    /// A segment could not be tokenized into elements.
    #[error("invalid segment: {reason}")]
    InvalidSegment { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
