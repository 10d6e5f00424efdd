//! Auth Service Library
//!
//! Password hashing, bearer token issuance and verification, and the login
//! use case. User records are reached through [`client::UserDirectory`].

pub mod client;
pub mod password;
pub mod service;
pub mod token;

pub use password::{Argon2Hasher, PasswordHasher};
pub use service::{AuthService, Authenticator, LoginOutcome};
pub use token::{Claims, TokenService};
