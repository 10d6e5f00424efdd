//! Authentication use cases.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use tracing::{debug, info};

use crate::client::UserDirectory;
use crate::password::PasswordHasher;
use crate::token::{Claims, TokenService};
use common::{ApiResult, ErrorCode};
use domain::{Email, User};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed bearer token
    pub token: String,
    pub user: User,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and issue a token.
    async fn login(&self, email: &Email, password: &str) -> ApiResult<LoginOutcome>;

    /// Verify a bearer token and extract its claims.
    fn verify_token(&self, token: &str) -> ApiResult<Claims>;
}

/// Concrete [`AuthService`] over a user directory.
pub struct Authenticator {
    users: Arc<dyn UserDirectory>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenService,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenService,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn login(&self, email: &Email, password: &str) -> ApiResult<LoginOutcome> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ErrorCode::NotFound.with_detail("User not found"))?;

        if !self.hasher.verify(password, &user.password_hash) {
            debug!(user_id = %user.id, "password mismatch");
            return Err(ErrorCode::Unauthorized.with_detail("Invalid credentials"));
        }

        let token = self.tokens.issue(
            user.username.as_str(),
            user.id,
            user.profile_picture_asset_id,
        )?;

        info!(user_id = %user.id, event = "user_login_success", "User logged in");
        Ok(LoginOutcome { token, user })
    }

    fn verify_token(&self, token: &str) -> ApiResult<Claims> {
        self.tokens.verify(token)
    }
}
