//! User service - Handles user-related business logic.

use std::sync::Arc;

use async_trait::async_trait;
use auth_service_lib::PasswordHasher;
use chrono::{DateTime, Utc};
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use tracing::info;
use uuid::Uuid;

use common::{ApiResult, ErrorCode};
use domain::{
    DateOfBirth, Email, Name, NewUser, Password, User, UserPatch, Username, ValidationFailures,
};

use crate::repository::UserRepository;

/// Registration input as received from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateUserCommand {
    pub username: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: DateTime<Utc>,
}

/// Partial update as received from the client.
///
/// Each present field is validated on its own; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUserCommand {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub profile_picture_asset_id: Option<Uuid>,
}

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Register a user; the password is hashed before storage
    async fn create_user(&self, command: CreateUserCommand) -> ApiResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> ApiResult<User>;

    /// Get user by email, if any
    async fn find_user_by_email(&self, email: &Email) -> ApiResult<Option<User>>;

    /// Apply a partial update
    async fn update_user(&self, id: Uuid, command: UpdateUserCommand) -> ApiResult<User>;

    /// Delete user by ID
    async fn delete_user(&self, id: Uuid) -> ApiResult<()>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Validate every present field of `command` into a typed patch.
    fn build_patch(&self, command: UpdateUserCommand) -> ApiResult<UserPatch> {
        let mut failures = ValidationFailures::default();

        let username = command
            .username
            .as_deref()
            .and_then(|v| failures.collect(Username::parse(v)));
        let email = command
            .email
            .as_deref()
            .and_then(|v| failures.collect(Email::parse(v)));
        let password = command
            .password
            .as_deref()
            .and_then(|v| failures.collect(Password::parse(v)));
        let first_name = command
            .first_name
            .as_deref()
            .and_then(|v| failures.collect(Name::parse("firstName", v)));
        let last_name = command
            .last_name
            .as_deref()
            .and_then(|v| failures.collect(Name::parse("lastName", v)));
        let date_of_birth = command
            .date_of_birth
            .and_then(|v| failures.collect(DateOfBirth::parse(v)));

        if !failures.is_empty() {
            return Err(failures.into());
        }

        let password_hash = password
            .map(|password| self.hasher.hash(&password))
            .transpose()?;

        Ok(UserPatch {
            username,
            email,
            password_hash,
            first_name,
            last_name,
            bio: command.bio,
            location: command.location,
            date_of_birth,
            profile_picture_asset_id: command.profile_picture_asset_id,
        })
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, command: CreateUserCommand) -> ApiResult<User> {
        let mut failures = ValidationFailures::default();

        let username = failures.collect(Username::parse(&command.username));
        let date_of_birth = failures.collect(DateOfBirth::parse(command.date_of_birth));
        let email = failures.collect(Email::parse(&command.email));
        let password = failures.collect(Password::parse(&command.password));

        let (Some(username), Some(date_of_birth), Some(email), Some(password)) =
            (username, date_of_birth, email, password)
        else {
            return Err(failures.into());
        };

        let new_user = NewUser {
            username,
            email,
            password_hash: self.hasher.hash(&password)?,
            date_of_birth,
        };

        let user = self.repo.create(new_user).await?;
        info!(user_id = %user.id, event = "user_created", "User created");
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> ApiResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ErrorCode::NotFound.with_detail("User not found"))
    }

    async fn find_user_by_email(&self, email: &Email) -> ApiResult<Option<User>> {
        self.repo.find_by_email(email).await
    }

    async fn update_user(&self, id: Uuid, command: UpdateUserCommand) -> ApiResult<User> {
        let patch = self.build_patch(command)?;
        let user = self.repo.update(id, patch).await?;

        info!(user_id = %user.id, event = "user_updated", "User updated");
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> ApiResult<()> {
        self.repo.delete(id).await?;

        info!(user_id = %id, event = "user_deleted", "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auth_service_lib::password::MockPasswordHasher;
    use chrono::Duration;
    use domain::PasswordHash;
    use mockall::predicate::eq;
    use tokio_test::assert_ok;

    use super::*;
    use crate::repository::MockUserRepository;

    const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
                        J8iYWpn1mO/3H/Ud7fItXb+7l8Plzi7aQ61HBZNAr5M";
    const PASSWORD: &str = "Correct-Horse-Battery-9";

    fn adult() -> DateTime<Utc> {
        Utc::now() - Duration::days(365 * 30)
    }

    fn stored_user() -> User {
        NewUser::new("jane_doe", "jane@example.com", HASH, adult())
            .unwrap()
            .into_user(Uuid::new_v4(), Utc::now())
    }

    fn hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Ok(PasswordHash::parse(HASH).unwrap()));
        hasher
    }

    fn create_command() -> CreateUserCommand {
        CreateUserCommand {
            username: "jane_doe".into(),
            email: "Jane@Example.com".into(),
            password: PASSWORD.into(),
            date_of_birth: adult(),
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|user| {
                user.password_hash.as_str() == HASH && user.email.as_str() == "jane@example.com"
            })
            .times(1)
            .returning(|user| Ok(user.into_user(Uuid::new_v4(), Utc::now())));

        let service = UserManager::new(Arc::new(repo), Arc::new(hasher()));
        let user = service.create_user(create_command()).await.unwrap();

        assert_eq!(user.username.as_str(), "jane_doe");
    }

    #[tokio::test]
    async fn test_create_user_reports_all_failures() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().never();

        let service = UserManager::new(Arc::new(repo), Arc::new(hasher));
        let command = CreateUserCommand {
            username: "x".into(),
            email: "nope".into(),
            password: "short".into(),
            date_of_birth: Utc::now() + Duration::days(1),
        };

        let err = service.create_user(command).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnprocessableEntity);

        let details = err.details().and_then(|d| d.as_array()).unwrap();
        let fields: Vec<&str> = details.iter().filter_map(|d| d["field"].as_str()).collect();
        assert_eq!(fields, ["username", "dateOfBirth", "email", "password"]);
    }

    #[tokio::test]
    async fn test_create_user_propagates_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().returning(|_| {
            Err(ErrorCode::UniqueKeyViolation
                .with_detail("A user with the same email already exists"))
        });

        let service = UserManager::new(Arc::new(repo), Arc::new(hasher()));
        let err = service.create_user(create_command()).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::UniqueKeyViolation);
        assert_eq!(err.status().as_u16(), 409);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = UserManager::new(Arc::new(repo), Arc::new(MockPasswordHasher::new()));
        let err = service.get_user(Uuid::new_v4()).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_validates_only_present_fields() {
        let user = stored_user();
        let id = user.id;

        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .withf(move |uid, patch| {
                *uid == id
                    && patch.first_name.as_ref().map(Name::as_str) == Some("Jane")
                    && patch.username.is_none()
                    && patch.password_hash.is_none()
            })
            .returning(move |_, _| Ok(user.clone()));

        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().never();

        let service = UserManager::new(Arc::new(repo), Arc::new(hasher));
        let command = UpdateUserCommand {
            first_name: Some("Jane".into()),
            ..Default::default()
        };

        assert_ok!(service.update_user(id, command).await);
    }

    #[tokio::test]
    async fn test_update_hashes_new_password() {
        let user = stored_user();
        let id = user.id;

        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .withf(|_, patch| patch.password_hash.is_some())
            .returning(move |_, _| Ok(user.clone()));

        let service = UserManager::new(Arc::new(repo), Arc::new(hasher()));
        let command = UpdateUserCommand {
            password: Some(PASSWORD.into()),
            ..Default::default()
        };

        assert_ok!(service.update_user(id, command).await);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_update().never();

        let service = UserManager::new(Arc::new(repo), Arc::new(MockPasswordHasher::new()));
        let command = UpdateUserCommand {
            email: Some("not-an-email".into()),
            last_name: Some("X".into()),
            ..Default::default()
        };

        let err = service.update_user(Uuid::new_v4(), command).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnprocessableEntity);
        assert_eq!(err.details().and_then(|d| d.as_array()).map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_delete().with(eq(id)).times(1).returning(|_| Ok(()));

        let service = UserManager::new(Arc::new(repo), Arc::new(MockPasswordHasher::new()));
        assert_ok!(service.delete_user(id).await);
    }
}
