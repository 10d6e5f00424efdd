use std::fmt;

use super::USERNAME_REGEX;
use crate::constants::{MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH};
use crate::error::{DomainResult, ValidationErrorDetail};

const FIELD: &str = "username";

/// Public handle of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate and wrap a username. Surrounding whitespace is trimmed.
    pub fn parse(value: &str) -> DomainResult<Self> {
        let value = value.trim();

        if value.is_empty() {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "required",
                "Username is required.",
            ));
        }
        if value.len() < MIN_USERNAME_LENGTH {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "min",
                format!("Username cannot be less than {MIN_USERNAME_LENGTH} characters."),
            )
            .with_param(MIN_USERNAME_LENGTH.to_string()));
        }
        if value.len() > MAX_USERNAME_LENGTH {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "max",
                format!("Username cannot exceed {MAX_USERNAME_LENGTH} characters."),
            )
            .with_param(MAX_USERNAME_LENGTH.to_string()));
        }
        if !USERNAME_REGEX.is_match(value) {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "regex",
                "Invalid username format.",
            ));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
