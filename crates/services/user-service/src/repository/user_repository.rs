//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{classify_db_error, ApiResult, ErrorCode};
use domain::{Email, NewUser, User, UserPatch};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Storage failures come back already classified; a missing row on
/// update/delete is `NOT_FOUND`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<User>>;

    /// Find user by normalized email address
    async fn find_by_email(&self, email: &Email) -> ApiResult<Option<User>>;

    /// Insert a new user with a fresh identifier
    async fn create(&self, user: NewUser) -> ApiResult<User>;

    /// Apply a patch and return the stored result
    async fn update(&self, id: Uuid, patch: UserPatch) -> ApiResult<User>;

    /// Delete user by ID
    async fn delete(&self, id: Uuid) -> ApiResult<()>;
}

/// SeaORM implementation of [`UserRepository`].
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> ApiResult<Option<user::Model>> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(classify_db_error)
    }
}

fn not_found() -> common::ClassifiedError {
    ErrorCode::NotFound.with_detail("User not found")
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<User>> {
        self.find_model(id).await?.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> ApiResult<Option<User>> {
        UserEntity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .map_err(classify_db_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn create(&self, user: NewUser) -> ApiResult<User> {
        let user = user.into_user(Uuid::new_v4(), Utc::now());

        let model = ActiveModel::from(&user)
            .insert(&self.db)
            .await
            .map_err(classify_db_error)?;

        User::try_from(model)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> ApiResult<User> {
        let model = self.find_model(id).await?.ok_or_else(not_found)?;
        let mut user = User::try_from(model)?;

        if !user.apply_patch(patch, Utc::now()) {
            return Ok(user);
        }

        let model = ActiveModel::from(&user)
            .update(&self.db)
            .await
            .map_err(classify_db_error)?;

        User::try_from(model)
    }

    async fn delete(&self, id: Uuid) -> ApiResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(classify_db_error)?;

        if result.rows_affected == 0 {
            return Err(not_found());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
                        J8iYWpn1mO/3H/Ud7fItXb+7l8Plzi7aQ61HBZNAr5M";

    fn row(id: Uuid) -> user::Model {
        let now = Utc::now();
        user::Model {
            id,
            username: "jane_doe".into(),
            email: "jane@example.com".into(),
            password_hash: HASH.into(),
            first_name: None,
            last_name: None,
            bio: None,
            location: None,
            date_of_birth: now - Duration::days(365 * 30),
            is_verified: false,
            profile_picture_asset_id: None,
            created_at: now,
            updated_at: None,
            last_online: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(id)]])
            .into_connection();
        let store = UserStore::new(db);

        let user = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username.as_str(), "jane_doe");
    }

    #[tokio::test]
    async fn test_find_missing_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let store = UserStore::new(db);

        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let store = UserStore::new(db);

        let err = store
            .update(Uuid::new_v4(), UserPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_empty_patch_skips_write() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(id)]])
            .into_connection();
        let store = UserStore::new(db);

        let user = store.update(id, UserPatch::default()).await.unwrap();
        assert!(user.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let store = UserStore::new(db);

        let err = store.delete(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_storage_failure_is_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([sea_orm::DbErr::Custom("connection reset".into())])
            .into_connection();
        let store = UserStore::new(db);

        let email = Email::parse("jane@example.com").unwrap();
        let err = store.find_by_email(&email).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }
}
