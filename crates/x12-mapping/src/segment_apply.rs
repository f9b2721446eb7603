//! Applies a matched segment's element mappings, repeating elements, and
//! group members into a JSON sink.

use std::collections::HashSet;
use std::ops::Range;

use serde_json::Value;
use x12_schema::{ElementMapping, RepeatingElements, Schema, SegmentDef};
use x12_tokenizer::{Document, Segment};

use crate::qualifier;
use crate::{transforms, Error, Result};

/// Scan `window` for the first (or every, if `def.multiple`) segment
/// matching `def`'s id and qualifier, applying each match.
///
/// When `strict` and nothing matches a non-optional `def`, fails with
/// [`Error::MissingRequiredField`] — used by header/trailer phases, which
/// the specification calls out explicitly; hierarchy/loop segment scans
/// pass `strict = false` since an absent optional segment there is a soft
/// mismatch.
pub(crate) fn apply_segment_def(
    document: &Document,
    def: &SegmentDef,
    window: Range<usize>,
    schema: &Schema,
    sink: &mut impl x12_json::JsonSink,
    strict: bool,
) -> Result<()> {
    let mut matched = false;
    for segment in document.range(window) {
        if qualifier::matches(&segment, def) {
            apply_matched_segment(&segment, def, document, schema, sink)?;
            matched = true;
            if !def.multiple {
                break;
            }
        }
    }
    if !matched && strict && !def.optional {
        return Err(Error::MissingRequiredField(def.id.clone()));
    }
    Ok(())
}

fn apply_matched_segment(
    segment: &Segment,
    def: &SegmentDef,
    document: &Document,
    schema: &Schema,
    sink: &mut impl x12_json::JsonSink,
) -> Result<()> {
    apply_element_mappings(segment, &def.elements, &def.id, false, sink)?;
    if let Some(repeating) = &def.repeating_elements {
        apply_repeating_elements(segment, repeating, sink)?;
    }
    if def.group.len() > 1 {
        apply_group(document, segment, def, schema, sink)?;
    }
    Ok(())
}

/// Apply `mappings` against `segment`.
///
/// When `require_seg_match` is `false` (the common, non-group case), a
/// mapping applies when `E.seg` is absent or equals `owning_id`. When
/// `true` (group member application), only an exact `E.seg == owning_id`
/// counts — group members never fall back to the "absent means apply"
/// rule, since a group mixes several segment ids under one `SegmentDef`.
fn apply_element_mappings(
    segment: &Segment,
    mappings: &[ElementMapping],
    owning_id: &str,
    require_seg_match: bool,
    sink: &mut impl x12_json::JsonSink,
) -> Result<()> {
    for mapping in mappings {
        let applies = match &mapping.seg {
            Some(seg) => seg == owning_id,
            None => !require_seg_match,
        };
        if !applies {
            continue;
        }

        let Some(element) = segment.element(mapping.pos + 1) else {
            if mapping.expect.is_some() && !mapping.optional {
                return Err(Error::MissingRequiredField(format!(
                    "{owning_id}[{}]",
                    mapping.pos
                )));
            }
            continue;
        };

        let mut value = if let Some(&component_index) = mapping.composite.first() {
            let components = element.components();
            match components.get(component_index) {
                Some(component) if !component.is_empty() => {
                    String::from_utf8_lossy(component).into_owned()
                }
                _ => continue,
            }
        } else {
            if element.value().is_empty() {
                continue;
            }
            element.as_str().into_owned()
        };

        for transform in &mapping.transforms {
            value = transforms::apply(transform, &value)?;
        }

        if let Some(value_map) = &mapping.value_map {
            if let Some(mapped) = value_map.get(&value) {
                value = mapped.clone();
            }
        }

        if let Some(expect) = &mapping.expect {
            if &value != expect {
                continue;
            }
        }

        sink.set(&mapping.path, Value::String(value))?;
    }
    Ok(())
}

fn apply_repeating_elements(
    segment: &Segment,
    repeating: &RepeatingElements,
    sink: &mut impl x12_json::JsonSink,
) -> Result<()> {
    let separator = repeating.separator_byte();
    for element in segment.elements().iter().skip(1) {
        let raw = element.value();
        if raw.is_empty() {
            continue;
        }
        let split = element.split_by(separator);
        let parts: Vec<&[u8]> = if split.is_empty() { vec![raw] } else { split };
        let qualifier_value = String::from_utf8_lossy(parts[0]);

        for pattern in &repeating.patterns {
            if !pattern.when_qualifier.iter().any(|q| q == qualifier_value.as_ref()) {
                continue;
            }
            let mut fields = serde_json::Map::new();
            for field in &pattern.fields {
                if let Some(part) = parts.get(field.component_index) {
                    fields.insert(field.name.clone(), Value::String(String::from_utf8_lossy(part).into_owned()));
                }
            }
            sink.push_to_array(&pattern.output_array, Value::Object(fields))?;
            break;
        }
    }
    Ok(())
}

/// Scan forward from `segment` (exclusive) for each id in `def.group[1..]`,
/// applying that member's own `E.seg`-matched mappings. Halts on the
/// schema's boundary set or a repeat of the trigger id.
fn apply_group(
    document: &Document,
    segment: &Segment,
    def: &SegmentDef,
    schema: &Schema,
    sink: &mut impl x12_json::JsonSink,
) -> Result<()> {
    let remaining: HashSet<&str> = def.group[1..].iter().map(String::as_str).collect();
    let mut index = segment.index() + 1;
    while let Some(candidate) = document.segment(index) {
        let id = String::from_utf8_lossy(candidate.id());
        if schema.boundary_set.contains(id.as_ref()) || id.as_ref() == def.id {
            break;
        }
        if remaining.contains(id.as_ref()) {
            apply_element_mappings(&candidate, &def.elements, id.as_ref(), true, sink)?;
        }
        index += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use x12_schema::{Qualifier, RepeatingElementPattern, RepeatingField};

    fn parse(segments: &[&str]) -> Document {
        let mut buf = segments.join("~").into_bytes();
        buf.push(b'~');
        Document::parse(&buf).unwrap()
    }

    fn empty_schema() -> Schema {
        Schema {
            version: "1".into(),
            transaction: x12_schema::TransactionInfo {
                id: "837".into(),
                version: "005010X222A1".into(),
                transaction_type: "837".into(),
                description: String::new(),
            },
            header_segments: Vec::new(),
            sequential_sections: Vec::new(),
            hl_levels: Default::default(),
            trailer_segments: Vec::new(),
            hierarchical_output_array: "billing_providers".into(),
            definitions: Default::default(),
            boundary_set: ["HL".to_string()].into_iter().collect(),
        }
    }

    #[test]
    fn composite_extraction_picks_first_index() {
        let doc = parse(&[
            "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230101*1200*^*00501*000000001*0*P*:",
            "CLM*X*100***11:B:1*Y",
            "IEA*1*000000001",
        ]);
        let clm = doc.find_first("CLM").unwrap();
        let def = SegmentDef {
            id: "CLM".into(),
            elements: vec![ElementMapping {
                seg: None,
                pos: 4,
                path: "place_of_service".into(),
                expect: None,
                value_map: None,
                transforms: Vec::new(),
                composite: vec![0],
                optional: true,
            }],
            ..Default::default()
        };
        let mut sink = x12_json::JsonObject::new();
        apply_matched_segment(&clm, &def, &doc, &empty_schema(), &mut sink).unwrap();
        assert_eq!(sink.get("place_of_service"), Some(&Value::String("11".into())));
    }

    #[test]
    fn value_map_substitutes_mapped_literal() {
        let doc = parse(&[
            "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230101*1200*^*00501*000000001*0*P*:",
            "SBR*P*18",
            "IEA*1*000000001",
        ]);
        let sbr = doc.find_first("SBR").unwrap();
        let def = SegmentDef {
            id: "SBR".into(),
            elements: vec![ElementMapping {
                seg: None,
                pos: 0,
                path: "relationship".into(),
                expect: None,
                value_map: Some(
                    [("P".to_string(), "primary".to_string()), ("S".to_string(), "secondary".to_string())]
                        .into_iter()
                        .collect(),
                ),
                transforms: Vec::new(),
                composite: Vec::new(),
                optional: true,
            }],
            ..Default::default()
        };
        let mut sink = x12_json::JsonObject::new();
        apply_matched_segment(&sbr, &def, &doc, &empty_schema(), &mut sink).unwrap();
        assert_eq!(sink.get("relationship"), Some(&Value::String("primary".into())));
    }

    #[test]
    fn repeating_elements_extract_hi_diagnosis_codes() {
        let doc = parse(&[
            "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230101*1200*^*00501*000000001*0*P*:",
            "HI*ABK:I269*ABF:I4891*ABF:E119",
            "IEA*1*000000001",
        ]);
        let hi = doc.find_first("HI").unwrap();
        let def = SegmentDef {
            id: "HI".into(),
            repeating_elements: Some(RepeatingElements {
                separator: ":".into(),
                patterns: vec![RepeatingElementPattern {
                    when_qualifier: vec!["ABK".into(), "ABF".into()],
                    output_array: "diagnosis_codes".into(),
                    fields: vec![
                        RepeatingField { component_index: 0, name: "qualifier".into() },
                        RepeatingField { component_index: 1, name: "code".into() },
                    ],
                }],
            }),
            ..Default::default()
        };
        let mut sink = x12_json::JsonObject::new();
        apply_matched_segment(&hi, &def, &doc, &empty_schema(), &mut sink).unwrap();
        let codes = sink.get("diagnosis_codes").unwrap().as_array().unwrap();
        assert_eq!(codes.len(), 3);
        assert_eq!(codes[0]["qualifier"], "ABK");
        assert_eq!(codes[0]["code"], "I269");
        assert_eq!(codes[2]["code"], "E119");
    }

    #[test]
    fn qualifier_filters_which_segment_def_matches() {
        let doc = parse(&[
            "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230101*1200*^*00501*000000001*0*P*:",
            "NM1*85*2*ACME CLINIC",
            "NM1*IL*1*DOE*JANE",
            "IEA*1*000000001",
        ]);
        let def = SegmentDef {
            id: "NM1".into(),
            qualifier: Some(Qualifier::Position(0, "IL".into())),
            elements: vec![ElementMapping {
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
        };
        let mut sink = x12_json::JsonBuilder::new();
        apply_segment_def(&doc, &def, 0..doc.len(), &empty_schema(), &mut sink, false).unwrap();
        assert_eq!(sink.get("last_name"), Some(&Value::String("DOE".into())));
    }

    #[test]
    fn group_applies_each_member_segment_until_boundary() {
        let doc = parse(&[
            "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230101*1200*^*00501*000000001*0*P*:",
            "NM1*85*2*ACME CLINIC",
            "N3*123 MAIN ST",
            "N4*ANYTOWN*CA*12345",
            "HL*1**20*1",
            "N3*SHOULD NOT APPEAR",
            "IEA*1*000000001",
        ]);
        let nm1 = doc.find_first("NM1").unwrap();
        let def = SegmentDef {
            id: "NM1".into(),
            group: vec!["NM1".into(), "N3".into(), "N4".into()],
            elements: vec![
                ElementMapping {
                    seg: Some("NM1".into()),
                    pos: 2,
                    path: "name".into(),
                    expect: None,
                    value_map: None,
                    transforms: Vec::new(),
                    composite: Vec::new(),
                    optional: true,
                },
                ElementMapping {
                    seg: Some("N3".into()),
                    pos: 0,
                    path: "street".into(),
                    expect: None,
                    value_map: None,
                    transforms: Vec::new(),
                    composite: Vec::new(),
                    optional: true,
                },
                ElementMapping {
                    seg: Some("N4".into()),
                    pos: 0,
                    path: "city".into(),
                    expect: None,
                    value_map: None,
                    transforms: Vec::new(),
                    composite: Vec::new(),
                    optional: true,
                },
                ElementMapping {
                    seg: Some("N4".into()),
                    pos: 1,
                    path: "state".into(),
                    expect: None,
                    value_map: None,
                    transforms: Vec::new(),
                    composite: Vec::new(),
                    optional: true,
                },
            ],
            ..Default::default()
        };
        let mut sink = x12_json::JsonObject::new();
        apply_matched_segment(&nm1, &def, &doc, &empty_schema(), &mut sink).unwrap();
        assert_eq!(sink.get("name"), Some(&Value::String("ACME CLINIC".into())));
        assert_eq!(sink.get("street"), Some(&Value::String("123 MAIN ST".into())));
        assert_eq!(sink.get("city"), Some(&Value::String("ANYTOWN".into())));
        assert_eq!(sink.get("state"), Some(&Value::String("CA".into())));
    }

    #[test]
    fn group_member_mapping_never_falls_back_to_seg_absent_rule() {
        // A mapping with `seg: None` must not apply to a group member just
        // because the matching element is present there; group application
        // always requires an exact `E.seg` match (`require_seg_match = true`),
        // unlike the trigger segment's own (non-group) mapping pass.
        let doc = parse(&[
            "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230101*1200*^*00501*000000001*0*P*:",
            "NM1*85",
            "N3*123 MAIN ST*SUITE 4",
            "IEA*1*000000001",
        ]);
        let nm1 = doc.find_first("NM1").unwrap();
        let def = SegmentDef {
            id: "NM1".into(),
            group: vec!["NM1".into(), "N3".into()],
            elements: vec![ElementMapping {
                seg: None,
                pos: 1,
                path: "leaked".into(),
                expect: None,
                value_map: None,
                transforms: Vec::new(),
                composite: Vec::new(),
                optional: true,
            }],
            ..Default::default()
        };
        let mut sink = x12_json::JsonObject::new();
        apply_matched_segment(&nm1, &def, &doc, &empty_schema(), &mut sink).unwrap();
        assert_eq!(sink.get("leaked"), None);
    }

    #[test]
    fn missing_required_header_segment_is_fatal() {
        let doc = parse(&[
            "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230101*1200*^*00501*000000001*0*P*:",
            "IEA*1*000000001",
        ]);
        let def = SegmentDef {
            id: "GS".into(),
            optional: false,
            ..Default::default()
        };
        let mut sink = x12_json::JsonBuilder::new();
        let result = apply_segment_def(&doc, &def, 0..doc.len(), &empty_schema(), &mut sink, true);
        assert!(matches!(result, Err(Error::MissingRequiredField(_))));
    }
}
