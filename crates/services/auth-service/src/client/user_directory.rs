use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use common::ApiResult;
use domain::{Email, User};

/// User lookups needed to authenticate.
///
/// Implemented by whatever owns user storage; the login use case only needs
/// to resolve an email to a user and its stored password hash.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by normalized email address.
    async fn find_by_email(&self, email: &Email) -> ApiResult<Option<User>>;
}
