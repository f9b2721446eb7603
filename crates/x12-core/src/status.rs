//! Stable wire-value status codes for the external boundary.

/// A stable status code for the `process`/`load_schema` boundary.
///
/// Values are part of the wire contract and must never be renumbered; new
/// failure modes get a new variant, not a reused value. `FileNotFound` has
/// no producer in this crate (file-path variants are an external
/// collaborator's concern) but is kept for numbering stability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StatusCode {
    Success = 0,
    OutOfMemory = 1,
    InvalidISA = 2,
    FileNotFound = 3,
    ParseError = 4,
    SchemaLoadError = 5,
    UnknownHLLevel = 6,
    PathConflict = 7,
    InvalidArgument = 8,
    UnknownError = 99,
}

/// A free-form, stable-enough-to-log message for `code`.
#[must_use]
pub fn error_message(code: StatusCode) -> &'static str {
    match code {
        StatusCode::Success => "completed",
        StatusCode::OutOfMemory => "allocation failed",
        StatusCode::InvalidISA => "ISA segment missing or not exactly 106 bytes at the expected offsets",
        StatusCode::FileNotFound => "external file not found",
        StatusCode::ParseError => "tokenizer failed to parse the X12 interchange",
        StatusCode::SchemaLoadError => "schema JSON is malformed or fails structural validation",
        StatusCode::UnknownHLLevel => "an HL node's level code has no entry in the schema",
        StatusCode::PathConflict => "attempted to overwrite a non-object with an object, or push onto a non-array",
        StatusCode::InvalidArgument => "invalid argument (null pointer or invalid handle)",
        StatusCode::UnknownError => "unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_match_the_stable_table() {
        assert_eq!(StatusCode::Success as i32, 0);
        assert_eq!(StatusCode::OutOfMemory as i32, 1);
        assert_eq!(StatusCode::InvalidISA as i32, 2);
        assert_eq!(StatusCode::FileNotFound as i32, 3);
        assert_eq!(StatusCode::ParseError as i32, 4);
        assert_eq!(StatusCode::SchemaLoadError as i32, 5);
        assert_eq!(StatusCode::UnknownHLLevel as i32, 6);
        assert_eq!(StatusCode::PathConflict as i32, 7);
        assert_eq!(StatusCode::InvalidArgument as i32, 8);
        assert_eq!(StatusCode::UnknownError as i32, 99);
    }

    #[test]
    fn every_code_has_a_message() {
        for code in [
            StatusCode::Success,
            StatusCode::OutOfMemory,
            StatusCode::InvalidISA,
            StatusCode::FileNotFound,
            StatusCode::ParseError,
            StatusCode::SchemaLoadError,
            StatusCode::UnknownHLLevel,
            StatusCode::PathConflict,
            StatusCode::InvalidArgument,
            StatusCode::UnknownError,
        ] {
            assert!(!error_message(code).is_empty());
        }
    }
}
