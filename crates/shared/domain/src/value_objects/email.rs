use std::fmt;

use super::EMAIL_REGEX;
use crate::constants::MAX_EMAIL_LENGTH;
use crate::error::{DomainResult, ValidationErrorDetail};

const FIELD: &str = "email";

/// Email address, stored trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and normalize an email address.
    ///
    /// Rules run against the raw input; the stored value is the trimmed,
    /// lower-cased form.
    pub fn parse(value: &str) -> DomainResult<Self> {
        if value.is_empty() {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "required",
                "Email is required.",
            ));
        }
        if value.len() > MAX_EMAIL_LENGTH {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "max",
                format!("Email cannot exceed {MAX_EMAIL_LENGTH} characters."),
            )
            .with_param(MAX_EMAIL_LENGTH.to_string()));
        }
        if !EMAIL_REGEX.is_match(value) || !local_part_dots_are_valid(value) {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "regex",
                "Invalid email format.",
            ));
        }

        Ok(Self(value.trim().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// No leading, trailing or consecutive dots before the `@`.
fn local_part_dots_are_valid(value: &str) -> bool {
    let Some((local, _domain)) = value.rsplit_once('@') else {
        return false;
    };
    !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
