//! Domain-level validation errors.
//!
//! Value objects report the first rule they violate as a single
//! [`ValidationErrorDetail`]. Aggregates that validate several values at
//! once collect every failure into [`ValidationFailures`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One failed field-level rule.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{field}: {message}")]
pub struct ValidationErrorDetail {
    /// Field the rule was applied to (wire name)
    pub field: String,
    /// Rule that failed, e.g. `required`, `min`, `regex`, `entropy`
    pub rule: String,
    /// Rule parameter, e.g. the bound of a length rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    /// Human readable message
    pub message: String,
}

impl ValidationErrorDetail {
    /// Create a detail without a rule parameter
    pub fn new(
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            param: None,
            message: message.into(),
        }
    }

    /// Attach a rule parameter
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }
}

/// Every failure found while validating a group of values.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{} validation rule(s) failed", .0.len())]
pub struct ValidationFailures(pub Vec<ValidationErrorDetail>);

impl ValidationFailures {
    /// Record the error side of a value object result, returning the value if present
    pub fn collect<T>(&mut self, result: DomainResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(detail) => {
                self.0.push(detail);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_details(self) -> Vec<ValidationErrorDetail> {
        self.0
    }
}

impl From<ValidationErrorDetail> for ValidationFailures {
    fn from(detail: ValidationErrorDetail) -> Self {
        Self(vec![detail])
    }
}

/// Result type for value object construction
pub type DomainResult<T> = Result<T, ValidationErrorDetail>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_keeps_values_and_errors() {
        let mut failures = ValidationFailures::default();

        let ok: DomainResult<u8> = Ok(1);
        let err: DomainResult<u8> = Err(ValidationErrorDetail::new("age", "min", "too small"));

        assert_eq!(failures.collect(ok), Some(1));
        assert_eq!(failures.collect(err), None);
        assert_eq!(failures.0.len(), 1);
        assert_eq!(failures.0[0].field, "age");
    }

    #[test]
    fn test_detail_display_names_field() {
        let detail = ValidationErrorDetail::new("email", "required", "Email is required.")
            .with_param("254");

        assert_eq!(detail.to_string(), "email: Email is required.");
        assert_eq!(detail.param.as_deref(), Some("254"));
        assert_eq!(ValidationFailures::from(detail).0.len(), 1);
    }
}
