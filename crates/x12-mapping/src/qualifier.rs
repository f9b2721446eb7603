//! Qualifier and id matching for `SegmentDef`s.

use x12_schema::SegmentDef;
use x12_tokenizer::Segment;

/// Whether `segment` is a candidate for `def`: same id, and qualifier (if
/// any) satisfied.
///
/// The `+1` offset in the qualifier position reflects that schema
/// positions are counted after the segment id, while the physical element
/// vector stores the id at index 0.
pub(crate) fn matches(segment: &Segment, def: &SegmentDef) -> bool {
    if segment.id() != def.id.as_bytes() {
        return false;
    }
    match &def.qualifier {
        None => true,
        Some(qualifier) => segment
            .element(qualifier.pos() + 1)
            .is_some_and(|element| qualifier.matches(&element.as_str())),
    }
}
