//! Typed shape of the mapping schema, mirroring the JSON schema file format.
//!
//! These types are the *resolved* form: by the time a [`Schema`] exists,
//! every `$ref` has already been inlined by [`crate::loader`] and every
//! field here is exactly what the document processor consumes — no further
//! indirection.

use std::collections::HashMap;

use serde::Deserialize;

/// One element-to-JSON-path mapping within a [`SegmentDef`].
#[derive(Debug, Clone, Deserialize)]
pub struct ElementMapping {
    /// Segment id this mapping applies to, when used inside a `group`.
    /// Absent (or equal to the owning `SegmentDef`'s id) for the common case.
    #[serde(default)]
    pub seg: Option<String>,
    /// 0-based position *after* the segment id (the `+1` offset into the
    /// physical element vector is applied by the document processor).
    pub pos: usize,
    /// Dotted output path this value is written to.
    pub path: String,
    /// Literal the raw value must equal for this mapping to apply.
    #[serde(default)]
    pub expect: Option<String>,
    /// Literal-to-literal value substitution.
    #[serde(default)]
    pub value_map: Option<HashMap<String, String>>,
    /// Ordered transform names applied before writing.
    #[serde(default)]
    pub transforms: Vec<String>,
    /// Composite component indices to extract from. Only index 0 is
    /// consulted (§3 Open Question 3).
    #[serde(default)]
    pub composite: Vec<usize>,
    /// When `true`, a missing element is not an error.
    #[serde(default = "default_true")]
    pub optional: bool,
}

fn default_true() -> bool {
    true
}

/// One field extracted from a repeating element's qualifier-tagged
/// component.
#[derive(Debug, Clone, Deserialize)]
pub struct RepeatingField {
    pub component_index: usize,
    pub name: String,
}

/// A pattern matched against a repeating element's leading qualifier
/// component (e.g. HI-segment diagnosis codes).
#[derive(Debug, Clone, Deserialize)]
pub struct RepeatingElementPattern {
    pub when_qualifier: Vec<String>,
    pub output_array: String,
    pub fields: Vec<RepeatingField>,
}

/// Repeating-element extraction configuration for a [`SegmentDef`].
#[derive(Debug, Clone, Deserialize)]
pub struct RepeatingElements {
    /// The single byte (as a one-character string in the JSON format) that
    /// separates repeated occurrences within an element.
    pub separator: String,
    pub patterns: Vec<RepeatingElementPattern>,
}

impl RepeatingElements {
    /// The separator as a raw byte.
    #[must_use]
    pub fn separator_byte(&self) -> u8 {
        self.separator.as_bytes().first().copied().unwrap_or(b'^')
    }
}

/// A `(position, literal)` qualifier match, or a `value_prefix` match.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Qualifier {
    Position(usize, String),
    Prefix { value_prefix: String, pos: usize },
}

impl Qualifier {
    /// The 0-based position (after the segment id) this qualifier checks.
    #[must_use]
    pub fn pos(&self) -> usize {
        match self {
            Self::Position(pos, _) => *pos,
            Self::Prefix { pos, .. } => *pos,
        }
    }

    /// Whether `value` satisfies this qualifier.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Position(_, literal) => value == literal,
            Self::Prefix { value_prefix, .. } => value.starts_with(value_prefix.as_str()),
        }
    }
}

/// One segment definition: id, optional qualifier/group, its element
/// mappings, and optional repeating-element extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentDef {
    pub id: String,
    #[serde(default)]
    pub qualifier: Option<Qualifier>,
    #[serde(default)]
    pub group: Vec<String>,
    #[serde(default)]
    pub elements: Vec<ElementMapping>,
    #[serde(default)]
    pub repeating_elements: Option<RepeatingElements>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub max_use: Option<usize>,

    /// Present only on an unresolved `$ref` node; consumed and cleared by
    /// [`crate::loader`] before the rest of the fields are trusted.
    #[serde(rename = "$ref", default)]
    pub(crate) reference: Option<String>,
}

/// A non-hierarchical sub-loop (e.g. `NM1`-triggered service provider
/// loops, `HI` diagnosis loops with nested detail).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NonHierarchicalLoop {
    pub name: String,
    pub trigger: String,
    pub output_array: String,
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
    #[serde(default)]
    pub nested_loops: Vec<NonHierarchicalLoop>,

    #[serde(rename = "$ref", default)]
    pub(crate) reference: Option<String>,
}

/// One level of the HL hierarchy (e.g. billing provider, subscriber,
/// patient).
#[derive(Debug, Clone, Deserialize)]
pub struct HLLevel {
    pub name: String,
    #[serde(default)]
    pub output_array: Option<String>,
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
    #[serde(default)]
    pub child_levels: Vec<String>,
    #[serde(default)]
    pub non_hierarchical_loops: Vec<NonHierarchicalLoop>,
}

/// A sequential (non-hierarchical, non-repeating) block of segments
/// written under a fixed output path.
#[derive(Debug, Clone, Deserialize)]
pub struct SequentialSection {
    pub name: String,
    pub output_path: String,
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionInfo {
    pub id: String,
    pub version: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    #[serde(default)]
    pub description: String,
}

/// A resolved definitions-block entry: either a loop or a segment
/// template.
#[derive(Debug, Clone)]
pub enum Definition {
    Loop(NonHierarchicalLoop),
    Segment(SegmentDef),
}

/// The fully-resolved, immutable schema.
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: String,
    pub transaction: TransactionInfo,
    pub header_segments: Vec<SegmentDef>,
    pub sequential_sections: Vec<SequentialSection>,
    pub hl_levels: HashMap<String, HLLevel>,
    pub trailer_segments: Vec<SegmentDef>,
    pub hierarchical_output_array: String,
    pub definitions: HashMap<String, Definition>,
    pub boundary_set: std::collections::HashSet<String>,
}

impl Schema {
    /// Look up the level config for an HL node's level code.
    #[must_use]
    pub fn level(&self, code: &str) -> Option<&HLLevel> {
        self.hl_levels.get(code)
    }
}
