//! Recursive HL-tree walk: for each node, apply its level's segments and
//! non-hierarchical loops, then recurse into children before closing the
//! node's object.

use x12_hltree::HLTree;
use x12_schema::Schema;
use x12_tokenizer::Document;

use crate::loop_processing::apply_loop;
use crate::segment_apply::apply_segment_def;
use crate::{Error, Result};

/// Build the JSON object for the HL node at arena index `idx`, recursing
/// into its children first and nesting each child's object into the
/// child level's `output_array`.
pub(crate) fn emit_node(
    document: &Document,
    tree: &HLTree,
    idx: usize,
    schema: &Schema,
) -> Result<x12_json::JsonObject> {
    let node = tree.node(idx).expect("idx comes from the tree's own arena");
    let level = schema
        .level(node.level_code())
        .ok_or_else(|| Error::UnknownHLLevel(node.level_code().to_string()))?;

    let mut object = x12_json::JsonObject::new();
    let range = node.segment_range();

    for def in &level.segments {
        apply_segment_def(document, def, range.clone(), schema, &mut object, false)?;
    }
    for nhl in &level.non_hierarchical_loops {
        apply_loop(document, nhl, range.clone(), schema, &mut object)?;
    }

    for &child_idx in node.children() {
        let child_node = tree.node(child_idx).expect("idx comes from the tree's own arena");
        let child_level = schema
            .level(child_node.level_code())
            .ok_or_else(|| Error::UnknownHLLevel(child_node.level_code().to_string()))?;
        let child_object = emit_node(document, tree, child_idx, schema)?;

        let array_path = match &child_level.output_array {
            Some(path) => path.as_str(),
            None => {
                tracing::warn!(
                    level = child_level.name.as_str(),
                    "HL level has no output_array configured, falling back to its name"
                );
                child_level.name.as_str()
            }
        };
        object.push_to_array(array_path, child_object.into_value())?;
    }

    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::collections::HashMap;
    use x12_schema::{HLLevel, SegmentDef, TransactionInfo};

    fn document() -> Document {
        let segments = [
            "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230101*1200*^*00501*000000001*0*P*:",
            "HL*1**20*1",
            "NM1*85*2*ACME CLINIC",
            "HL*2*1*22*0",
            "NM1*IL*1*DOE*JANE",
            "IEA*1*000000001",
        ];
        let mut buf = segments.join("~").into_bytes();
        buf.push(b'~');
        Document::parse(&buf).unwrap()
    }

    fn schema() -> Schema {
        let mut hl_levels = HashMap::new();
        hl_levels.insert(
            "20".to_string(),
            HLLevel {
                name: "billing_provider".into(),
                output_array: Some("billing_providers".into()),
                segments: vec![SegmentDef {
                    id: "NM1".into(),
                    optional: true,
                    elements: vec![x12_schema::ElementMapping {
                        seg: None,
                        pos: 2,
                        path: "name".into(),
                        expect: None,
                        value_map: None,
                        transforms: Vec::new(),
                        composite: Vec::new(),
                        optional: true,
                    }],
                    ..Default::default()
                }],
                child_levels: vec!["22".into()],
                non_hierarchical_loops: Vec::new(),
            },
        );
        hl_levels.insert(
            "22".to_string(),
            HLLevel {
                name: "subscriber".into(),
                output_array: None,
                segments: vec![SegmentDef {
                    id: "NM1".into(),
                    optional: true,
                    elements: vec![x12_schema::ElementMapping {
                        seg: None,
                        pos: 2,
                        path: "last_name".into(),
                        expect: None,
                        value_map: None,
                        transforms: Vec::new(),
                        composite: Vec::new(),
                        optional: true,
                    }],
                    ..Default::default()
                }],
                child_levels: Vec::new(),
                non_hierarchical_loops: Vec::new(),
            },
        );
        Schema {
            version: "1".into(),
            transaction: TransactionInfo {
                id: "837".into(),
                version: "005010X222A1".into(),
                transaction_type: "837".into(),
                description: String::new(),
            },
            header_segments: Vec::new(),
            sequential_sections: Vec::new(),
            hl_levels,
            trailer_segments: Vec::new(),
            hierarchical_output_array: "billing_providers".into(),
            definitions: Default::default(),
            boundary_set: ["HL".to_string()].into_iter().collect(),
        }
    }

    #[test]
    fn child_node_nests_under_parent_via_output_array() {
        let doc = document();
        let schema = schema();
        let tree = x12_hltree::build(&doc).unwrap();
        let root = tree.roots()[0];
        let object = emit_node(&doc, &tree, root, &schema).unwrap();
        assert_eq!(object.get("name"), Some(&Value::String("ACME CLINIC".into())));
        // subscriber level has no output_array configured, so it falls back
        // to the level's own name ("subscriber") rather than the billing
        // provider's own output array.
        let subscribers = object.get("subscriber").unwrap().as_array().unwrap();
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0]["last_name"], Value::String("DOE".into()));
    }

    #[test]
    fn unknown_level_code_is_an_error() {
        let doc = document();
        let mut schema = schema();
        schema.hl_levels.remove("22");
        let tree = x12_hltree::build(&doc).unwrap();
        let root = tree.roots()[0];
        let result = emit_node(&doc, &tree, root, &schema);
        assert!(matches!(result, Err(Error::UnknownHLLevel(code)) if code == "22"));
    }
}
