use std::fmt;

use super::NAME_REGEX;
use crate::constants::MAX_NAME_LENGTH;
use crate::error::{DomainResult, ValidationErrorDetail};

/// First or last name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    /// Validate a name reported under `field` (e.g. `firstName`).
    pub fn parse(field: &str, value: &str) -> DomainResult<Self> {
        let value = value.trim();

        if value.is_empty() {
            return Err(ValidationErrorDetail::new(field, "required", "Name is required."));
        }
        if value.len() > MAX_NAME_LENGTH {
            return Err(ValidationErrorDetail::new(
                field,
                "max",
                format!("Name cannot exceed {MAX_NAME_LENGTH} characters."),
            )
            .with_param(MAX_NAME_LENGTH.to_string()));
        }
        if !NAME_REGEX.is_match(value) {
            return Err(ValidationErrorDetail::new(field, "regex", "Invalid name format."));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
