//! # x12-json
//!
//! A path-addressed JSON tree with lazy array creation, used as the
//! document processor's output sink.
//!
//! `set`/`push_to_array`/`get_or_create_array` all take dotted paths
//! (`"billing_providers.0.subscribers"` is not supported — paths only ever
//! address object keys; array indexing happens implicitly via append) and
//! create intermediate objects on demand. Wraps `serde_json::Value` with
//! the `preserve_order` feature so object keys round-trip in insertion
//! order.

mod builder;

pub use builder::{JsonBuilder, JsonObject, JsonSink};
pub use serde_json::Value;

use thiserror::Error;

/// Errors that can occur while building a JSON tree.
#[derive(Error, Debug)]
pub enum Error {
    /// A write attempted to treat a non-object as an object, or a
    /// non-array as an array.
    #[error("path conflict at `{0}`")]
    PathConflict(String),
}

pub type Result<T> = std::result::Result<T, Error>;
