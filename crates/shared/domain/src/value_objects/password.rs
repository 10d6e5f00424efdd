//! Plain-text password value object.
//!
//! Strength is judged by an entropy estimate rather than composition rules:
//! the character categories present in the password select an assumed
//! alphabet size, and `entropy = length * log2(alphabet)` must reach
//! [`MIN_PASSWORD_ENTROPY_BITS`]. The alphabet sizes are fixed per category
//! (26/26/10/32) regardless of the actual characters, so the estimate is an
//! approximation, kept exact for compatibility with stored policy messages.

use std::fmt;

use crate::constants::{
    DIGIT_ALPHABET_SIZE, LOWERCASE_ALPHABET_SIZE, MAX_PASSWORD_LENGTH, MIN_PASSWORD_ENTROPY_BITS,
    MIN_PASSWORD_LENGTH, SYMBOL_ALPHABET_SIZE, UPPERCASE_ALPHABET_SIZE,
};
use crate::error::{DomainResult, ValidationErrorDetail};

use super::{LOWERCASE_REGEX, NUMBER_REGEX, SYMBOL_REGEX, UPPERCASE_REGEX};

const FIELD: &str = "password";

/// Password that passed the length and entropy policy.
///
/// Holds the plain text only until it is hashed; never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

// Don't expose the secret in debug output
impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Password").field(&"[REDACTED]").finish()
    }
}

impl Password {
    /// Validate a password. Surrounding whitespace is trimmed before any rule runs.
    pub fn parse(value: &str) -> DomainResult<Self> {
        let value = value.trim();

        if value.is_empty() {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "required",
                "Password is required.",
            ));
        }
        if value.len() < MIN_PASSWORD_LENGTH {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "min",
                format!("Password cannot be less than {MIN_PASSWORD_LENGTH} characters."),
            )
            .with_param(MIN_PASSWORD_LENGTH.to_string()));
        }
        if value.len() > MAX_PASSWORD_LENGTH {
            return Err(ValidationErrorDetail::new(
                FIELD,
                "max",
                format!("Password cannot exceed {MAX_PASSWORD_LENGTH} characters."),
            )
            .with_param(MAX_PASSWORD_LENGTH.to_string()));
        }

        match estimate_entropy_bits(value) {
            None => Err(ValidationErrorDetail::new(
                FIELD,
                "charCategories",
                "Password must contain at least one recognized character category \
                 (lowercase, uppercase, number, or symbol).",
            )),
            Some(bits) if bits < MIN_PASSWORD_ENTROPY_BITS => Err(ValidationErrorDetail::new(
                FIELD,
                "entropy",
                "Password must have a minimum entropy of 100 bits.",
            )
            .with_param("100")),
            Some(_) => Ok(Self(value.to_string())),
        }
    }

    /// Expose the secret for hashing or verification.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// Estimate password entropy in bits.
///
/// A category counts when any character belongs to it: lowercase (`Ll`),
/// uppercase (`Lu`), number (`N`), or punctuation and symbols (`P`, `S`).
/// Other letters, marks and format characters add nothing. Returns `None`
/// when no category is present. Length is measured in bytes.
pub fn estimate_entropy_bits(password: &str) -> Option<f64> {
    let alphabet: u32 = [
        (&LOWERCASE_REGEX, LOWERCASE_ALPHABET_SIZE),
        (&UPPERCASE_REGEX, UPPERCASE_ALPHABET_SIZE),
        (&NUMBER_REGEX, DIGIT_ALPHABET_SIZE),
        (&SYMBOL_REGEX, SYMBOL_ALPHABET_SIZE),
    ]
    .iter()
    .filter(|(category, _)| category.is_match(password))
    .map(|(_, size)| size)
    .sum();

    if alphabet == 0 {
        return None;
    }

    Some(password.len() as f64 * f64::from(alphabet).log2())
}
