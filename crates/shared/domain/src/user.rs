//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationFailures;
use crate::value_objects::{DateOfBirth, Email, Name, PasswordHash, Username};

/// User domain entity
///
/// Every validated attribute is held as a value object, so a `User` can only
/// exist with domain-valid data.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: Username,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub first_name: Option<Name>,
    pub last_name: Option<Name>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: DateOfBirth,
    pub is_verified: bool,
    pub profile_picture_asset_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_online: Option<DateTime<Utc>>,
}

impl User {
    /// Apply a partial update. Returns `false` when the patch changes nothing.
    pub fn apply_patch(&mut self, patch: UserPatch, now: DateTime<Utc>) -> bool {
        if patch.is_empty() {
            return false;
        }

        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = Some(first_name);
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = Some(last_name);
        }
        if let Some(bio) = patch.bio {
            self.bio = Some(bio);
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(asset_id) = patch.profile_picture_asset_id {
            self.profile_picture_asset_id = Some(asset_id);
        }

        self.updated_at = Some(now);
        true
    }
}

/// Validated data for registering a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub date_of_birth: DateOfBirth,
}

impl NewUser {
    /// Validate every attribute, reporting all failures at once.
    pub fn new(
        username: &str,
        email: &str,
        password_hash: &str,
        date_of_birth: DateTime<Utc>,
    ) -> Result<Self, ValidationFailures> {
        let mut failures = ValidationFailures::default();

        let username = failures.collect(Username::parse(username));
        let date_of_birth = failures.collect(DateOfBirth::parse(date_of_birth));
        let email = failures.collect(Email::parse(email));
        let password_hash = failures.collect(PasswordHash::parse(password_hash));

        match (username, email, password_hash, date_of_birth) {
            (Some(username), Some(email), Some(password_hash), Some(date_of_birth)) => Ok(Self {
                username,
                email,
                password_hash,
                date_of_birth,
            }),
            _ => Err(failures),
        }
    }

    /// Materialize the entity with a fresh identifier.
    pub fn into_user(self, id: Uuid, created_at: DateTime<Utc>) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            first_name: None,
            last_name: None,
            bio: None,
            location: None,
            date_of_birth: self.date_of_birth,
            is_verified: false,
            profile_picture_asset_id: None,
            created_at,
            updated_at: None,
            last_online: None,
        }
    }
}

/// Partial update of a user. Only present fields are changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub password_hash: Option<PasswordHash>,
    pub first_name: Option<Name>,
    pub last_name: Option<Name>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<DateOfBirth>,
    pub profile_picture_asset_id: Option<Uuid>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.location.is_none()
            && self.date_of_birth.is_none()
            && self.profile_picture_asset_id.is_none()
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub date_of_birth: DateTime<Utc>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_asset_id: Option<Uuid>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_online: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            first_name: user.first_name.as_ref().map(|n| n.as_str().to_string()),
            last_name: user.last_name.as_ref().map(|n| n.as_str().to_string()),
            bio: user.bio.clone(),
            location: user.location.clone(),
            date_of_birth: user.date_of_birth.value(),
            is_verified: user.is_verified,
            profile_picture_asset_id: user.profile_picture_asset_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_online: user.last_online,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}
