//! # x12-core
//!
//! The safe Rust facade over the tokenizer, HL tree builder, schema loader,
//! and document processor: `load_schema` + `process`, plus the stable
//! [`StatusCode`] a caller maps subsystem errors onto. This is the boundary
//! described as a C ABI in the original contract — here it stays plain
//! Rust: no `extern "C"`, no file I/O, no CLI. A caller that wants those
//! builds them on top of this crate.
//!
//! `process` performs no retries and this crate never logs on its own
//! behalf; subsystem crates emit `tracing` events at `debug`/`warn`, and an
//! embedding application decides whether those are surfaced.

mod status;

pub use status::{error_message, StatusCode};

use std::sync::Arc;

use thiserror::Error;
use x12_schema::Schema;

/// A loaded, immutable schema, cheaply clonable and shareable across
/// concurrent [`process`] calls (§5: a `Schema` is immutable after
/// construction).
pub type SchemaHandle = Arc<Schema>;

/// Errors that can occur at the `x12-core` boundary, aggregating every
/// subsystem's own error type.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Tokenizer(#[from] x12_tokenizer::Error),
    #[error(transparent)]
    HlTree(#[from] x12_hltree::Error),
    #[error(transparent)]
    Schema(#[from] x12_schema::Error),
    #[error(transparent)]
    Mapping(#[from] x12_mapping::Error),
}

impl CoreError {
    /// The stable [`StatusCode`] this error maps onto.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Tokenizer(x12_tokenizer::Error::InvalidISA { .. }) => StatusCode::InvalidISA,
            Self::Tokenizer(
                x12_tokenizer::Error::MissingISA
                | x12_tokenizer::Error::MissingIEA
                | x12_tokenizer::Error::InvalidSegment { .. },
            ) => StatusCode::ParseError,
            Self::HlTree(_) => StatusCode::ParseError,
            Self::Schema(_) => StatusCode::SchemaLoadError,
            Self::Mapping(x12_mapping::Error::UnknownHLLevel(_)) => StatusCode::UnknownHLLevel,
            Self::Mapping(x12_mapping::Error::Json(x12_json::Error::PathConflict(_))) => StatusCode::PathConflict,
            Self::Mapping(
                x12_mapping::Error::MissingRequiredField(_) | x12_mapping::Error::UnsupportedTransform(_),
            ) => StatusCode::UnknownError,
        }
    }
}

/// Load and fully resolve a schema from its JSON byte representation.
///
/// # Errors
///
/// Returns [`CoreError::Schema`] for malformed JSON, missing required
/// fields, or an unresolvable `$ref`.
pub fn load_schema(bytes: &[u8]) -> Result<SchemaHandle, CoreError> {
    Ok(Arc::new(Schema::load(bytes)?))
}

/// Tokenize `bytes`, build its HL tree (if it has any `HL` segments at
/// all), and run the schema-driven transform, returning the resulting JSON
/// document as owned UTF-8 bytes.
///
/// A transaction with no `HL` segments is a legal, if degenerate, input
/// (scenario S1: an interchange envelope carrying only header/trailer
/// data) — the hierarchy phase is skipped and no
/// `schema.hierarchical_output_array` key appears in the output.
///
/// # Errors
///
/// Returns [`CoreError`] for any tokenizer, HL tree, or processor failure.
/// See [`CoreError::status_code`] for the stable code a caller should
/// surface.
pub fn process(bytes: &[u8], schema: &SchemaHandle) -> Result<Vec<u8>, CoreError> {
    let document = x12_tokenizer::Document::parse(bytes)?;
    let tree = if document.count("HL") == 0 {
        None
    } else {
        Some(x12_hltree::build(&document)?)
    };
    let builder = x12_mapping::process(&document, tree.as_ref(), schema)?;
    Ok(builder.stringify().into_bytes())
}
