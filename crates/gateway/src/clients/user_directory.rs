//! In-process user directory backed by the user service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use auth_service_lib::client::UserDirectory;
use common::ApiResult;
use domain::{Email, User};
use user_service_lib::UserService;

/// Resolves login lookups through the user service.
pub struct UserServiceDirectory {
    users: Arc<dyn UserService>,
}

impl UserServiceDirectory {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for UserServiceDirectory {
    async fn find_by_email(&self, email: &Email) -> ApiResult<Option<User>> {
        debug!("Looking up user by email for login");
        self.users.find_user_by_email(email).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use domain::NewUser;
    use user_service_lib::service::MockUserService;
    use uuid::Uuid;

    use super::*;

    const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
                        J8iYWpn1mO/3H/Ud7fItXb+7l8Plzi7aQ61HBZNAr5M";

    #[tokio::test]
    async fn test_delegates_to_user_service() {
        let user = NewUser::new(
            "jane_doe",
            "jane@example.com",
            HASH,
            Utc::now() - Duration::days(365 * 30),
        )
        .unwrap()
        .into_user(Uuid::new_v4(), Utc::now());
        let id = user.id;

        let mut service = MockUserService::new();
        service
            .expect_find_user_by_email()
            .withf(|email| email.as_str() == "jane@example.com")
            .returning(move |_| Ok(Some(user.clone())));

        let directory = UserServiceDirectory::new(Arc::new(service));
        let email = Email::parse("jane@example.com").unwrap();

        let found = directory.find_by_email(&email).await.unwrap().unwrap();
        assert_eq!(found.id, id);
    }
}
