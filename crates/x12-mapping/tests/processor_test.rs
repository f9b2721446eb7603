//! Integration test: a multi-level HL hierarchy with a nested loop,
//! exercised through the public `process` entry point rather than any one
//! internal module.

use std::collections::HashMap;

use serde_json::Value;
use x12_mapping::process;
use x12_schema::{ElementMapping, HLLevel, NonHierarchicalLoop, Schema, SegmentDef, TransactionInfo};
use x12_tokenizer::Document;

fn document() -> Document {
    let segments = [
        "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230101*1200*^*00501*000000001*0*P*:",
        "HL*1**20*1",
        "NM1*85*2*ACME CLINIC",
        "HL*2*1*22*0",
        "CLM*123456*150.00",
        "LX*1",
        "SV1*HC:99213*75*UN*1",
        "LX*2",
        "SV1*HC:85025*75*UN*1",
        "IEA*1*000000001",
    ];
    let mut buf = segments.join("~").into_bytes();
    buf.push(b'~');
    Document::parse(&buf).unwrap()
}

fn schema() -> Schema {
    let name_mapping = |pos: usize, path: &str| ElementMapping {
        seg: None,
        pos,
        path: path.to_string(),
        expect: None,
        value_map: None,
        transforms: Vec::new(),
        composite: Vec::new(),
        optional: true,
    };

    let mut hl_levels = HashMap::new();
    hl_levels.insert(
        "20".to_string(),
        HLLevel {
            name: "billing_provider".into(),
            output_array: Some("billing_providers".into()),
            segments: vec![SegmentDef {
                id: "NM1".into(),
                optional: true,
                elements: vec![name_mapping(2, "name")],
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
            output_array: Some("subscribers".into()),
            segments: Vec::new(),
            child_levels: Vec::new(),
            non_hierarchical_loops: vec![NonHierarchicalLoop {
                name: "claim".into(),
                trigger: "CLM".into(),
                output_array: "claims".into(),
                segments: vec![SegmentDef {
                    id: "CLM".into(),
                    optional: true,
                    elements: vec![name_mapping(0, "claim_id"), name_mapping(1, "total_charges")],
                    ..Default::default()
                }],
                nested_loops: vec![NonHierarchicalLoop {
                    name: "service_line".into(),
                    trigger: "LX".into(),
                    output_array: "service_lines".into(),
                    segments: vec![SegmentDef {
                        id: "SV1".into(),
                        optional: true,
                        elements: vec![ElementMapping {
                            composite: vec![1],
                            ..name_mapping(0, "procedure_code")
                        }],
                        ..Default::default()
                    }],
                    nested_loops: Vec::new(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
        },
    );

    Schema {
        version: "1.0".into(),
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
        definitions: HashMap::new(),
        boundary_set: ["HL".to_string()].into_iter().collect(),
    }
}

#[test]
fn claim_loop_nests_service_lines_under_the_subscriber() {
    let doc = document();
    let tree = x12_hltree::build(&doc).unwrap();
    let schema = schema();

    let builder = process(&doc, Some(&tree), &schema).unwrap();

    let providers = builder.get("billing_providers").unwrap().as_array().unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0]["name"], Value::String("ACME CLINIC".into()));

    let subscribers = providers[0]["subscribers"].as_array().unwrap();
    assert_eq!(subscribers.len(), 1);

    let claims = subscribers[0]["claims"].as_array().unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0]["claim_id"], Value::String("123456".into()));
    assert_eq!(claims[0]["total_charges"], Value::String("150.00".into()));

    let lines = claims[0]["service_lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["procedure_code"], Value::String("99213".into()));
    assert_eq!(lines[1]["procedure_code"], Value::String("85025".into()));
}
