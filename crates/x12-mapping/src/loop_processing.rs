//! Non-hierarchical loop processing.
//!
//! A loop is a repeated run of segments inside a larger window, each
//! occurrence opened by a trigger segment id (e.g. an `LX` service-line
//! loop inside a claim, or a nested `SVD` loop inside it). Unlike the HL
//! hierarchy, loop nesting and repetition is entirely positional: a single
//! forward scan over `range` drives an explicit [`LoopState`] rather than
//! pre-collecting trigger positions and computing window ends after the
//! fact — searching for the next occurrence, collecting its segments, and
//! closing it the moment the next trigger or a schema boundary segment is
//! seen.

use std::ops::Range;

use x12_schema::{NonHierarchicalLoop, Schema};
use x12_tokenizer::Document;

use crate::segment_apply::apply_segment_def;
use crate::Result;

/// Scan state for [`apply_loop`]'s single forward pass.
enum LoopState {
    /// No occurrence open yet; watching for the next trigger segment.
    Searching,
    /// An occurrence is open, started at this index; watching for whatever
    /// closes it (the next trigger, or a boundary segment).
    Collecting { start: usize },
}

/// Find every occurrence of `loop_def.trigger` within `range`, emit one
/// object per occurrence, and push each into `sink` at
/// `loop_def.output_array`.
pub(crate) fn apply_loop(
    document: &Document,
    loop_def: &NonHierarchicalLoop,
    range: Range<usize>,
    schema: &Schema,
    sink: &mut impl x12_json::JsonSink,
) -> Result<()> {
    let mut state = LoopState::Searching;
    let mut occurrences: Vec<Range<usize>> = Vec::new();

    for index in range.start..range.end {
        let Some(segment) = document.segment(index) else { continue };
        let is_trigger = segment.is(&loop_def.trigger);
        let is_boundary = schema.boundary_set.contains(std::str::from_utf8(segment.id()).unwrap_or(""));

        match state {
            LoopState::Searching => {
                if is_trigger {
                    state = LoopState::Collecting { start: index };
                }
            }
            LoopState::Collecting { start } => {
                if is_trigger {
                    // Closing transition: the prior occurrence ends here,
                    // and this same segment immediately opens the next one.
                    occurrences.push(start..index);
                    state = LoopState::Collecting { start: index };
                } else if is_boundary {
                    // Closing transition: the boundary ends the occurrence
                    // but opens nothing; resume searching past it.
                    occurrences.push(start..index);
                    state = LoopState::Searching;
                }
            }
        }
    }
    if let LoopState::Collecting { start } = state {
        occurrences.push(start..range.end);
    }

    for occurrence in occurrences {
        let mut instance = x12_json::JsonObject::new();
        for def in &loop_def.segments {
            apply_segment_def(document, def, occurrence.clone(), schema, &mut instance, false)?;
        }
        for nested in &loop_def.nested_loops {
            apply_loop(document, nested, occurrence.clone(), schema, &mut instance)?;
        }
        sink.push_to_array(&loop_def.output_array, instance.into_value())?;
    }
    Ok(())
}
