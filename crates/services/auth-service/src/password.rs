//! Password hashing.
//!
//! Hashes are Argon2id PHC strings. The hasher sits behind a trait so the
//! use cases can be tested without paying for real key derivation.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier,
        SaltString,
    },
    Argon2,
};
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use common::{ApiResult, ErrorCode};
use domain::{Password, PasswordHash};

/// Hashes and verifies passwords.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a validated password.
    fn hash(&self, password: &Password) -> ApiResult<PasswordHash>;

    /// Check a plain-text candidate against a stored hash.
    fn verify(&self, candidate: &str, hash: &PasswordHash) -> bool;
}

/// Argon2id with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &Password) -> ApiResult<PasswordHash> {
        let salt = SaltString::generate(&mut OsRng);

        let phc = Argon2::default()
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|e| {
                ErrorCode::InternalServer
                    .with_detail("Failed to hash password")
                    .with_cause(e)
            })?
            .to_string();

        PasswordHash::parse(&phc).map_err(|detail| {
            ErrorCode::InternalServer
                .with_detail("Hasher produced an unexpected format")
                .with_cause(detail)
        })
    }

    fn verify(&self, candidate: &str, hash: &PasswordHash) -> bool {
        match PhcString::new(hash.as_str()) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
