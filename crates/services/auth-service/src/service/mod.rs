//! Authentication service business logic.

mod auth_service;

pub use auth_service::{AuthService, Authenticator, LoginOutcome};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
