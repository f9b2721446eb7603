//! The closed transform vocabulary (§3 Open Question 4).
//!
//! The schema format's `transforms` list is open-ended in principle but
//! this processor only ever implements `trim_whitespace`; anything else is
//! an `UnsupportedTransform` rather than a silent no-op, so a schema typo
//! surfaces immediately instead of shipping unmapped data.

use crate::{Error, Result};

/// Apply the transform named `name` to `value`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedTransform`] for any name outside the closed
/// vocabulary.
pub fn apply(name: &str, value: &str) -> Result<String> {
    match name {
        "trim_whitespace" => Ok(value.trim_matches(|c: char| c.is_ascii_whitespace()).to_string()),
        other => Err(Error::UnsupportedTransform(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_whitespace_strips_ascii_whitespace() {
        assert_eq!(apply("trim_whitespace", "  SENDER   ").unwrap(), "SENDER");
    }

    #[test]
    fn unknown_transform_is_unsupported() {
        assert!(matches!(apply("uppercase", "x"), Err(Error::UnsupportedTransform(_))));
    }

    #[test]
    fn trim_whitespace_leaves_unicode_whitespace_in_place() {
        // U+00A0 (no-break space) is Unicode-whitespace but not ASCII-whitespace;
        // `str::trim` would strip it, the ASCII-only contract must not.
        let value = "\u{a0}SENDER\u{a0}";
        assert_eq!(apply("trim_whitespace", value).unwrap(), value);
    }
}
