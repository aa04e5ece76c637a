//! Identifier validation with a single, consistent taxonomy.
//!
//! Every caller-supplied identifier (operation tokens, continuation tokens,
//! submission URLs) is checked before a request is issued. A value that is
//! absent or blank is a [`ValidationError::MissingField`]; a value that is
//! present but not in the expected shape is a
//! [`ValidationError::InvalidFormat`].

use thiserror::Error;

/// Errors produced when validating caller-supplied identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value is absent or contains only whitespace.
    #[error("missing {field}: a non-empty value is required")]
    MissingField { field: &'static str },

    /// The value is present but malformed.
    #[error("invalid {field}: {reason}")]
    InvalidFormat { field: &'static str, reason: String },
}

/// Validates that a value is present and non-blank.
///
/// Returns the trimmed value so callers never forward stray whitespace
/// to the wire.
pub fn require_non_empty<'a>(
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed)
}

/// Validates that a value is a usable absolute HTTP(S) URL.
///
/// Operation tokens and continuation tokens in the REST bindings are
/// follow-up URLs handed back by the service, so anything that does not
/// carry an HTTP scheme cannot be re-queried.
pub fn require_http_url<'a>(
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ValidationError> {
    let trimmed = require_non_empty(field, value)?;
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: format!("expected an absolute http(s) URL, got '{trimmed}'"),
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_is_missing_field() {
        let err = require_non_empty("operation token", "").unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "operation token"
            }
        );
    }

    #[test]
    fn whitespace_only_value_is_missing_field() {
        let err = require_non_empty("continuation token", "   \t").unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { .. }));
    }

    #[test]
    fn non_empty_value_is_trimmed() {
        let value = require_non_empty("operation token", "  abc  ").unwrap();
        assert_eq!(value, "abc");
    }

    #[test]
    fn non_url_value_is_invalid_format() {
        let err = require_http_url("continuation token", "not-a-url").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn missing_beats_malformed() {
        // An absent value reports MissingField even when checked for URL shape.
        let err = require_http_url("continuation token", " ").unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { .. }));
    }

    #[test]
    fn https_and_http_urls_are_accepted() {
        assert!(require_http_url("token", "https://example.com/op/1").is_ok());
        assert!(require_http_url("token", "http://localhost:8080/op/1").is_ok());
    }
}
