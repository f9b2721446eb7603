//! The path-addressed JSON tree itself.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// An object-rooted JSON tree, built up by dotted-path writes.
///
/// Backed by `serde_json::Value` with the `preserve_order` feature, so
/// object keys come back out in insertion order on [`JsonBuilder::stringify`].
/// All strings stored in the tree are owned — the builder has no borrowed
/// data and can outlive whatever buffer produced the values written into it.
#[derive(Debug)]
pub struct JsonBuilder {
    root: Value,
}

impl Default for JsonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonBuilder {
    /// A fresh builder with an empty object root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Write `value` at dotted `path`, creating intermediate objects on
    /// demand.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathConflict`] if an intermediate segment already
    /// holds a non-object value. Per the resolved ambiguity in the
    /// underlying contract, this never silently overwrites.
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        set_in(&mut self.root, path, value)
    }

    /// Read the value at dotted `path`, if present.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        get_in(&self.root, path)
    }

    /// Append `object` to the array at dotted `path`.
    ///
    /// Creates a fresh single-element array if the path is currently
    /// absent (lazy allocation — arrays never appear empty).
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathConflict`] if the path resolves to a
    /// non-array value, or an intermediate segment is a non-object.
    pub fn push_to_array(&mut self, path: &str, object: Value) -> Result<()> {
        push_to_array_in(&mut self.root, path, object)
    }

    /// Return a mutable reference to the array at dotted `path`, creating
    /// it (and any missing intermediate objects) if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathConflict`] if the path resolves to a
    /// non-array value, or an intermediate segment is a non-object.
    pub fn get_or_create_array(&mut self, path: &str) -> Result<&mut Vec<Value>> {
        get_or_create_array_in(&mut self.root, path)
    }

    /// Serialize the tree to a canonical JSON string.
    ///
    /// Key order reflects insertion order; whitespace is not guaranteed
    /// stable across implementations.
    #[must_use]
    pub fn stringify(&self) -> String {
        self.root.to_string()
    }

    /// Borrow the root as a raw `serde_json::Value`.
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }
}

/// A standalone object-rooted JSON value, built with the same
/// path-addressed API as [`JsonBuilder`].
///
/// Used by callers (the document processor, in particular) that need to
/// assemble one JSON object in isolation — an HL node, a loop instance —
/// before handing the finished value to a parent builder's
/// `push_to_array`.
#[derive(Debug)]
pub struct JsonObject(Value);

impl Default for JsonObject {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonObject {
    #[must_use]
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        set_in(&mut self.0, path, value)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        get_in(&self.0, path)
    }

    pub fn push_to_array(&mut self, path: &str, object: Value) -> Result<()> {
        push_to_array_in(&mut self.0, path, object)
    }

    pub fn get_or_create_array(&mut self, path: &str) -> Result<&mut Vec<Value>> {
        get_or_create_array_in(&mut self.0, path)
    }

    /// Consume this object, yielding the underlying `Value`.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

fn set_in(root: &mut Value, path: &str, value: Value) -> Result<()> {
    let (parent_path, key) = split_last(path);
    let parent = navigate_create(root, parent_path)?;
    let map = parent
        .as_object_mut()
        .ok_or_else(|| Error::PathConflict(parent_path.to_string()))?;
    map.insert(key.to_string(), value);
    Ok(())
}

fn get_in<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn push_to_array_in(root: &mut Value, path: &str, object: Value) -> Result<()> {
    let array = get_or_create_array_in(root, path)?;
    array.push(object);
    Ok(())
}

/// Common path-addressed write surface shared by [`JsonBuilder`] and
/// [`JsonObject`], so callers that assemble a sub-object in isolation
/// (before handing it to a parent builder) can write through the same
/// interface regardless of which one they hold.
pub trait JsonSink {
    fn set(&mut self, path: &str, value: Value) -> Result<()>;
    fn push_to_array(&mut self, path: &str, object: Value) -> Result<()>;
    fn get_or_create_array(&mut self, path: &str) -> Result<&mut Vec<Value>>;
}

impl JsonSink for JsonBuilder {
    fn set(&mut self, path: &str, value: Value) -> Result<()> {
        JsonBuilder::set(self, path, value)
    }
    fn push_to_array(&mut self, path: &str, object: Value) -> Result<()> {
        JsonBuilder::push_to_array(self, path, object)
    }
    fn get_or_create_array(&mut self, path: &str) -> Result<&mut Vec<Value>> {
        JsonBuilder::get_or_create_array(self, path)
    }
}

impl JsonSink for JsonObject {
    fn set(&mut self, path: &str, value: Value) -> Result<()> {
        JsonObject::set(self, path, value)
    }
    fn push_to_array(&mut self, path: &str, object: Value) -> Result<()> {
        JsonObject::push_to_array(self, path, object)
    }
    fn get_or_create_array(&mut self, path: &str) -> Result<&mut Vec<Value>> {
        JsonObject::get_or_create_array(self, path)
    }
}

fn get_or_create_array_in<'a>(root: &'a mut Value, path: &str) -> Result<&'a mut Vec<Value>> {
    let (parent_path, key) = split_last(path);
    let parent = navigate_create(root, parent_path)?;
    let map = parent
        .as_object_mut()
        .ok_or_else(|| Error::PathConflict(parent_path.to_string()))?;
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    entry
        .as_array_mut()
        .ok_or_else(|| Error::PathConflict(path.to_string()))
}

fn split_last(path: &str) -> (&str, &str) {
    match path.rsplit_once('.') {
        Some((parent, key)) => (parent, key),
        None => ("", path),
    }
}

/// Walk `path`'s segments from `root`, creating empty objects for any
/// missing intermediate segment. Fails if an existing segment is present
/// but not an object.
fn navigate_create<'a>(root: &'a mut Value, path: &str) -> Result<&'a mut Value> {
    let mut current = root;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let map = current
            .as_object_mut()
            .ok_or_else(|| Error::PathConflict(segment.to_string()))?;
        let next = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !next.is_object() {
            return Err(Error::PathConflict(segment.to_string()));
        }
        current = next;
    }
    Ok(current)
}
