use std::fmt;

use super::PASSWORD_HASH_REGEX;
use crate::error::{DomainResult, ValidationErrorDetail};

const FIELD: &str = "passwordHash";

/// Argon2 PHC hash string as produced by the password hasher.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasswordHash").field(&"[REDACTED]").finish()
    }
}

impl PasswordHash {
    pub fn parse(value: &str) -> DomainResult<Self> {
        if value.is_empty() {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "required",
                "Password hash is required.",
            ));
        }
        if !PASSWORD_HASH_REGEX.is_match(value) {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "regex",
                "Invalid password hash format.",
            ));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
                          J8iYWpn1mO/3H/Ud7fItXb+7l8Plzi7aQ61HBZNAr5M";

    #[test]
    fn test_accepts_argon2_phc_string() {
        assert!(PasswordHash::parse(SAMPLE).is_ok());
        assert!(PasswordHash::parse(&SAMPLE.replace("argon2id", "argon2i")).is_ok());
    }

    #[test]
    fn test_rejects_other_formats() {
        assert_eq!(PasswordHash::parse("").unwrap_err().rule, "required");
        for value in [
            "plaintext",
            "$2b$14$abcdefghijklmnopqrstuuABCDEFGHIJKLMNOPQRSTUVWXYZ01234",
            "$argon2id$v=19$m=19456,t=2,p=1$salt",
        ] {
            assert_eq!(PasswordHash::parse(value).unwrap_err().rule, "regex", "{value}");
        }
    }
}
