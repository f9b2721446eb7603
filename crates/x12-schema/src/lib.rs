//! # x12-schema
//!
//! Typed model and JSON loader for the declarative mapping schema that
//! drives [`x12-mapping`](../x12_mapping/index.html)'s document processor.
//!
//! The schema format supports a `definitions` block of reusable loop and
//! segment templates, referenced elsewhere via `{"$ref": "#/definitions/..."}`
//! with sibling-field overrides. [`loader::load`] inlines every reference
//! before the typed [`model::Schema`] is handed back, so the rest of the
//! system never has to think about `$ref` again.

pub mod loader;
pub mod model;

pub use loader::MAX_REF_DEPTH;
pub use model::{
    Definition, ElementMapping, HLLevel, NonHierarchicalLoop, Qualifier, RepeatingElementPattern,
    RepeatingElements, RepeatingField, Schema, SegmentDef, SequentialSection, TransactionInfo,
};

use thiserror::Error;

/// Errors that can occur while loading a schema.
#[derive(Error, Debug)]
pub enum Error {
    /// The schema JSON is malformed or missing a required field.
    #[error("schema load error: {0}")]
    SchemaLoadError(String),

    /// A `$ref` could not be resolved: unknown path, cycle, or excessive
    /// depth.
    #[error("invalid $ref: {0}")]
    InvalidReference(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Schema {
    /// Load a schema from its JSON byte representation.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub fn load(bytes: &[u8]) -> Result<Schema> {
        loader::load(bytes)
    }
}
