//! # x12-mapping
//!
//! The schema-driven document processor: walks a [`Document`](x12_tokenizer::Document)
//! and an [`HLTree`](x12_hltree::HLTree) under the direction of a
//! [`Schema`](x12_schema::Schema), emitting a [`JsonBuilder`](x12_json::JsonBuilder).
//!
//! Four phases, run in order by [`process`]: header, sequential sections,
//! hierarchy (recursive HL walk with non-hierarchical loop processing at
//! each node), trailer.

mod hierarchy;
mod loop_processing;
mod processor;
mod qualifier;
mod segment_apply;
mod transforms;

pub use processor::process;

use thiserror::Error;

/// Errors that can occur while running the document processor.
#[derive(Error, Debug)]
pub enum Error {
    /// A required `SegmentDef` (header, trailer, or otherwise non-optional)
    /// had no matching segment in its search window.
    #[error("missing required field for segment `{0}`")]
    MissingRequiredField(String),

    /// An HL node's level code has no entry in `schema.hl_levels`.
    #[error("unknown HL level code `{0}`")]
    UnknownHLLevel(String),

    /// A transform name outside the closed vocabulary was requested.
    #[error("unsupported transform `{0}`")]
    UnsupportedTransform(String),

    /// Propagated from the JSON tree when a write's shape conflicts with
    /// what is already there.
    #[error(transparent)]
    Json(#[from] x12_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
