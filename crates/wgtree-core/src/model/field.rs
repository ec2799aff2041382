//! Field rules for workgroup names and descriptions.

use serde::Serialize;
use std::fmt;

use crate::error::ErrorCode;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// A user-entered value that breaks a field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
    pub suggestion: &'static str,
}

impl FieldError {
    pub(crate) fn new(
        field: &'static str,
        reason: impl Into<String>,
        suggestion: &'static str,
    ) -> Self {
        Self {
            field,
            reason: reason.into(),
            suggestion,
        }
    }

    pub const fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidField
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.reason)
    }
}

/// Names are 1–255 characters, trimmed, without control characters.
///
/// # Errors
///
/// Returns the first rule the name breaks.
pub fn validate_name(s: &str) -> Result<(), FieldError> {
    if s.trim().is_empty() {
        return Err(FieldError::new(
            "name",
            "must not be empty",
            "provide a non-empty name",
        ));
    }
    if s.trim() != s {
        return Err(FieldError::new(
            "name",
            "must not start or end with whitespace",
            "trim leading/trailing whitespace from the name",
        ));
    }
    if s.chars().count() > MAX_NAME_LEN {
        return Err(FieldError::new(
            "name",
            format!("must be <= {MAX_NAME_LEN} characters"),
            "shorten the name",
        ));
    }
    if s.chars().any(char::is_control) {
        return Err(FieldError::new(
            "name",
            "must not contain control characters",
            "remove control characters from the name",
        ));
    }
    Ok(())
}

/// Descriptions are optional and at most 1000 characters.
///
/// # Errors
///
/// Returns an error when the description is too long.
pub fn validate_description(s: &str) -> Result<(), FieldError> {
    if s.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(FieldError::new(
            "description",
            format!("must be <= {MAX_DESCRIPTION_LEN} characters"),
            "shorten the description",
        ));
    }
    Ok(())
}
