//! Self-validating value objects.
//!
//! Each value object is constructed through a `parse` factory that checks
//! its rules in a fixed order (presence, then length bounds, then format)
//! and reports the first violated rule. Once constructed, a value object is
//! valid for its whole lifetime: there are no setters and no unchecked
//! constructors.

mod date_of_birth;
mod email;
mod name;
mod password;
mod password_hash;
mod username;

pub use date_of_birth::DateOfBirth;
pub use email::Email;
pub use name::Name;
pub use password::{estimate_entropy_bits, Password};
pub use password_hash::PasswordHash;
pub use username::Username;

use once_cell::sync::Lazy;
use regex::Regex;

/// Alphanumeric segments joined by single `_` or `-` separators.
const USERNAME_PATTERN: &str = r"^[a-zA-Z0-9]+(?:[_-][a-zA-Z0-9]+)*$";

/// Starts and ends with a letter; apostrophes and hyphens allowed in between.
const NAME_PATTERN: &str = r"^[a-zA-Z][a-zA-Z'-]+[a-zA-Z]$";

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// PHC string produced by the Argon2 hasher.
const PASSWORD_HASH_PATTERN: &str =
    r"^\$argon2(?:id|i|d)\$v=\d+\$m=\d+,t=\d+,p=\d+\$[A-Za-z0-9+/]+\$[A-Za-z0-9+/]+$";

/// General categories counted by the password entropy estimate.
const LOWERCASE_CATEGORY: &str = r"\p{Ll}";
const UPPERCASE_CATEGORY: &str = r"\p{Lu}";
const NUMBER_CATEGORY: &str = r"\p{N}";
const SYMBOL_CATEGORY: &str = r"[\p{P}\p{S}]";

// Compiled once; read-only afterwards.
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| compile(USERNAME_PATTERN));
static NAME_REGEX: Lazy<Regex> = Lazy::new(|| compile(NAME_PATTERN));
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| compile(EMAIL_PATTERN));
static PASSWORD_HASH_REGEX: Lazy<Regex> = Lazy::new(|| compile(PASSWORD_HASH_PATTERN));
static LOWERCASE_REGEX: Lazy<Regex> = Lazy::new(|| compile(LOWERCASE_CATEGORY));
static UPPERCASE_REGEX: Lazy<Regex> = Lazy::new(|| compile(UPPERCASE_CATEGORY));
static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| compile(NUMBER_CATEGORY));
static SYMBOL_REGEX: Lazy<Regex> = Lazy::new(|| compile(SYMBOL_CATEGORY));

fn compile(pattern: &str) -> Regex {
    // Literal patterns; covered by `test_all_patterns_compile`.
    Regex::new(pattern).expect("value object pattern must compile")
}
