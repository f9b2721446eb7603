//! Top-level orchestration: header, sequential sections, hierarchy,
//! trailer, in that order.

use std::ops::Range;

use x12_hltree::HLTree;
use x12_schema::Schema;
use x12_tokenizer::Document;

use crate::hierarchy::emit_node;
use crate::segment_apply::apply_segment_def;
use crate::Result;

/// Run the full document transform, producing a [`x12_json::JsonBuilder`]
/// ready to be stringified.
///
/// `tree` is `None` for a transaction with no `HL` segments at all (a
/// legal, if degenerate, input per the header-only scenario) — the
/// hierarchy phase is then skipped entirely and no
/// `schema.hierarchical_output_array` key is ever created, consistent with
/// the JSON builder's lazy-array-creation contract.
///
/// # Errors
///
/// Fails on a missing required header/trailer segment, an HL node whose
/// level code has no schema entry, an unsupported transform name, or a
/// JSON path conflict.
pub fn process(document: &Document, tree: Option<&HLTree>, schema: &Schema) -> Result<x12_json::JsonBuilder> {
    let mut builder = x12_json::JsonBuilder::new();
    let whole: Range<usize> = 0..document.len();

    for def in &schema.header_segments {
        apply_segment_def(document, def, whole.clone(), schema, &mut builder, true)?;
    }

    for section in &schema.sequential_sections {
        let mut object = x12_json::JsonObject::new();
        // Anchor the section's whole scan window at the first document
        // occurrence of its first SegmentDef's id, so a segment id shared
        // with the header or another section is never matched outside the
        // section's own occurrence.
        let anchor = section
            .segments
            .first()
            .and_then(|first| document.find_first(&first.id))
            .map_or(document.len(), |segment| segment.index());
        let window: Range<usize> = anchor..document.len();
        for def in &section.segments {
            apply_segment_def(document, def, window.clone(), schema, &mut object, false)?;
        }
        builder.set(&section.output_path, object.into_value())?;
    }

    if let Some(tree) = tree {
        for &root in tree.roots() {
            let object = emit_node(document, tree, root, schema)?;
            builder.push_to_array(&schema.hierarchical_output_array, object.into_value())?;
        }
    }

    for def in &schema.trailer_segments {
        apply_segment_def(document, def, whole.clone(), schema, &mut builder, true)?;
    }

    Ok(builder)
}
