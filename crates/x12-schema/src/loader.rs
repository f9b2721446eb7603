//! Loads the JSON schema file format of §6 into the typed model of §3,
//! resolving every `$ref` along the way.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::model::{
    Definition, HLLevel, NonHierarchicalLoop, Schema, SegmentDef, SequentialSection,
    TransactionInfo,
};
use crate::{Error, Result};

/// Maximum `$ref` resolution depth, guarding against pathological schemas
/// even though cycle detection (below) already catches true cycles.
pub const MAX_REF_DEPTH: usize = 32;

/// Sibling keys a `$ref` node pointing at `#/definitions/loops/<name>` may
/// override on the resolved clone. Anything else alongside a loop `$ref`
/// (`segments`, `trigger`, `nested_loops`, ...) is ignored rather than
/// silently clobbering the referenced definition's own contract.
const LOOP_OVERRIDE_KEYS: &[&str] = &["name", "output_array"];

/// Sibling keys a `$ref` node pointing at `#/definitions/segments/<name>`
/// may override on the resolved clone. Anything else alongside a segment
/// `$ref` (`elements`, `qualifier`, `group`, ...) is ignored.
const SEGMENT_OVERRIDE_KEYS: &[&str] = &["optional", "multiple", "max_use"];

struct Definitions {
    loops: HashMap<String, Value>,
    segments: HashMap<String, Value>,
}

/// Load and fully resolve a schema from its JSON byte representation.
///
/// # Errors
///
/// Returns [`Error::SchemaLoadError`] for malformed/missing fields and
/// [`Error::InvalidReference`] for unresolved, cyclic, or too-deep `$ref`s.
pub fn load(bytes: &[u8]) -> Result<Schema> {
    let raw: Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::SchemaLoadError(format!("invalid JSON: {e}")))?;

    let definitions = extract_definitions(&raw)?;

    let version = field_str(&raw, "schema_version")?;
    let transaction: TransactionInfo = serde_json::from_value(
        raw.get("transaction")
            .cloned()
            .ok_or_else(|| Error::SchemaLoadError("missing `transaction`".into()))?,
    )
    .map_err(|e| Error::SchemaLoadError(format!("invalid `transaction`: {e}")))?;

    let header_segments = resolve_segment_list(&raw, "transaction_header", &definitions)?;
    let trailer_segments = resolve_segment_list(&raw, "transaction_trailer", &definitions)?;

    let sequential_sections = match raw.get("sequential_sections") {
        Some(value) => {
            let resolved = resolve(value, &definitions, &mut HashSet::new(), 0)?;
            serde_json::from_value::<Vec<SequentialSection>>(resolved)
                .map_err(|e| Error::SchemaLoadError(format!("invalid `sequential_sections`: {e}")))?
        }
        None => Vec::new(),
    };

    let hierarchical = raw
        .get("hierarchical_structure")
        .ok_or_else(|| Error::SchemaLoadError("missing `hierarchical_structure`".into()))?;
    let hierarchical_output_array = field_str(hierarchical, "output_array")?;
    let levels_raw = hierarchical
        .get("levels")
        .ok_or_else(|| Error::SchemaLoadError("missing `hierarchical_structure.levels`".into()))?;
    let levels_resolved = resolve(levels_raw, &definitions, &mut HashSet::new(), 0)?;
    let hl_levels: HashMap<String, HLLevel> = serde_json::from_value(levels_resolved)
        .map_err(|e| Error::SchemaLoadError(format!("invalid `hierarchical_structure.levels`: {e}")))?;

    let resolved_definitions = resolve_definitions(&definitions)?;

    let mut boundary_set: HashSet<String> = HashSet::new();
    boundary_set.insert("HL".to_string());
    for level in hl_levels.values() {
        collect_triggers(&level.non_hierarchical_loops, &mut boundary_set);
    }

    tracing::debug!(
        levels = hl_levels.len(),
        boundary_set = boundary_set.len(),
        "loaded schema"
    );

    Ok(Schema {
        version,
        transaction,
        header_segments,
        sequential_sections,
        hl_levels,
        trailer_segments,
        hierarchical_output_array,
        definitions: resolved_definitions,
        boundary_set,
    })
}

fn field_str(value: &Value, key: &str) -> Result<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::SchemaLoadError(format!("missing or non-string `{key}`")))
}

fn resolve_segment_list(
    raw: &Value,
    section: &str,
    definitions: &Definitions,
) -> Result<Vec<SegmentDef>> {
    let Some(segments) = raw.get(section).and_then(|v| v.get("segments")) else {
        return Ok(Vec::new());
    };
    let resolved = resolve(segments, definitions, &mut HashSet::new(), 0)?;
    serde_json::from_value(resolved)
        .map_err(|e| Error::SchemaLoadError(format!("invalid `{section}.segments`: {e}")))
}

fn extract_definitions(raw: &Value) -> Result<Definitions> {
    let Some(defs) = raw.get("definitions") else {
        return Ok(Definitions {
            loops: HashMap::new(),
            segments: HashMap::new(),
        });
    };
    let loops = defs
        .get("loops")
        .and_then(Value::as_object)
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();
    let segments = defs
        .get("segments")
        .and_then(Value::as_object)
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();
    Ok(Definitions { loops, segments })
}

fn resolve_definitions(definitions: &Definitions) -> Result<HashMap<String, Definition>> {
    let mut resolved = HashMap::new();
    for (name, value) in &definitions.loops {
        let resolved_value = resolve(value, definitions, &mut HashSet::new(), 0)?;
        let l: NonHierarchicalLoop = serde_json::from_value(resolved_value)
            .map_err(|e| Error::SchemaLoadError(format!("invalid loop definition `{name}`: {e}")))?;
        resolved.insert(name.clone(), Definition::Loop(l));
    }
    for (name, value) in &definitions.segments {
        let resolved_value = resolve(value, definitions, &mut HashSet::new(), 0)?;
        let s: SegmentDef = serde_json::from_value(resolved_value).map_err(|e| {
            Error::SchemaLoadError(format!("invalid segment definition `{name}`: {e}"))
        })?;
        resolved.insert(name.clone(), Definition::Segment(s));
    }
    Ok(resolved)
}

/// Recursively walk `value`, inlining every `$ref` node found (deep-clone
/// plus sibling overrides), detecting cycles via `path` and bounding
/// recursion via `depth`.
fn resolve(
    value: &Value,
    definitions: &Definitions,
    path: &mut HashSet<String>,
    depth: usize,
) -> Result<Value> {
    if depth > MAX_REF_DEPTH {
        return Err(Error::InvalidReference(
            "$ref resolution exceeded maximum depth".to_string(),
        ));
    }

    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                let (kind, name) = parse_ref(reference)?;
                let key = format!("{kind}/{name}");
                if !path.insert(key.clone()) {
                    return Err(Error::InvalidReference(format!(
                        "cyclic $ref through `{reference}`"
                    )));
                }

                let target = match kind {
                    "loops" => definitions.loops.get(name),
                    "segments" => definitions.segments.get(name),
                    _ => None,
                }
                .ok_or_else(|| Error::InvalidReference(reference.clone()))?;

                let mut resolved = resolve(target, definitions, path, depth + 1)?;
                path.remove(&key);

                if let Value::Object(resolved_map) = &mut resolved {
                    let allowed: &[&str] = match kind {
                        "loops" => LOOP_OVERRIDE_KEYS,
                        "segments" => SEGMENT_OVERRIDE_KEYS,
                        _ => &[],
                    };
                    for (k, v) in map {
                        if allowed.contains(&k.as_str()) {
                            resolved_map.insert(k.clone(), v.clone());
                        }
                    }
                }
                Ok(resolved)
            } else {
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), resolve(v, definitions, path, depth)?);
                }
                Ok(Value::Object(out))
            }
        }
        Value::Array(items) => {
            let resolved = items
                .iter()
                .map(|v| resolve(v, definitions, path, depth))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(resolved))
        }
        other => Ok(other.clone()),
    }
}

/// Parse `#/definitions/loops/<name>` or `#/definitions/segments/<name>`.
fn parse_ref(reference: &str) -> Result<(&str, &str)> {
    let rest = reference
        .strip_prefix("#/definitions/")
        .ok_or_else(|| Error::InvalidReference(reference.to_string()))?;
    let mut parts = rest.splitn(2, '/');
    let kind = parts.next().ok_or_else(|| Error::InvalidReference(reference.to_string()))?;
    let name = parts.next().ok_or_else(|| Error::InvalidReference(reference.to_string()))?;
    if kind != "loops" && kind != "segments" {
        return Err(Error::InvalidReference(reference.to_string()));
    }
    Ok((kind, name))
}

fn collect_triggers(loops: &[NonHierarchicalLoop], set: &mut HashSet<String>) {
    for l in loops {
        set.insert(l.trigger.clone());
        collect_triggers(&l.nested_loops, set);
    }
}
