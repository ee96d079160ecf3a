//! Input validation errors.

use thiserror::Error;

/// Result type for measurement and request validation.
pub type ConfigResult<T> = Result<T, ValidationError>;

/// Bad user input, reported before any geometry work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending field, e.g. `chest_circumference`.
    pub field: String,
    /// What is wrong with it.
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A value outside its allowed range.
    #[must_use]
    pub fn out_of_range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::new(
            field,
            format!("{value} is outside the allowed range [{min}, {max}]"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_field() {
        let err = ValidationError::out_of_range("chest_circumference", 500.0, 700.0, 1500.0);
        let msg = err.to_string();
        assert!(msg.starts_with("invalid chest_circumference"));
        assert!(msg.contains("[700, 1500]"));
    }
}
