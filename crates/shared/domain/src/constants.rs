//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Username
// =============================================================================

/// Minimum username length in bytes
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length in bytes
pub const MAX_USERNAME_LENGTH: usize = 30;

// =============================================================================
// Email
// =============================================================================

/// Maximum email length (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

// =============================================================================
// Password
// =============================================================================

/// Minimum password length in bytes
pub const MIN_PASSWORD_LENGTH: usize = 16;

/// Maximum password length in bytes (hash input limit)
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Minimum estimated password entropy in bits
pub const MIN_PASSWORD_ENTROPY_BITS: f64 = 100.0;

/// Assumed alphabet size when a lowercase letter is present
pub const LOWERCASE_ALPHABET_SIZE: u32 = 26;

/// Assumed alphabet size when an uppercase letter is present
pub const UPPERCASE_ALPHABET_SIZE: u32 = 26;

/// Assumed alphabet size when a digit is present
pub const DIGIT_ALPHABET_SIZE: u32 = 10;

/// Assumed alphabet size when a symbol or punctuation mark is present
pub const SYMBOL_ALPHABET_SIZE: u32 = 32;

// =============================================================================
// Name
// =============================================================================

/// Maximum first/last name length in bytes
pub const MAX_NAME_LENGTH: usize = 70;

// =============================================================================
// Date of birth
// =============================================================================

/// Youngest allowed age in years (inclusive bound on the birth date)
pub const MIN_AGE_YEARS: u32 = 16;

/// Oldest allowed age in years (exclusive bound on the birth date)
pub const MAX_AGE_YEARS: u32 = 120;

// =============================================================================
// Authentication
// =============================================================================

/// Token lifetime in hours
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Longest configurable token lifetime, one year
pub const MAX_TOKEN_LIFETIME_HOURS: i64 = 24 * 365;

/// Issuer written into every token
pub const TOKEN_ISSUER: &str = "BlueFox";

/// Audience every token must carry
pub const TOKEN_AUDIENCE: &str = "users";

/// Minimum signing secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authorization header prefix for bearer tokens.
///
/// Note the colon: clients send `Authorization: Bearer: <token>`.
pub const BEARER_TOKEN_PREFIX: &str = "Bearer: ";
