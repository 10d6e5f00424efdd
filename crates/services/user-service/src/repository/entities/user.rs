//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use common::{ClassifiedError, ErrorCode};
use domain::{DateOfBirth, Email, Name, PasswordHash, User, Username, ValidationFailures};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: DateTimeUtc,
    pub is_verified: bool,
    pub profile_picture_asset_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub last_online: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert a stored row to the domain entity.
///
/// Every column goes back through its value object, so a corrupt row is
/// reported instead of served. The date of birth is checked against the
/// row's last write rather than the current time.
impl TryFrom<Model> for User {
    type Error = ClassifiedError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let mut failures = ValidationFailures::default();

        let username = failures.collect(Username::parse(&model.username));
        let email = failures.collect(Email::parse(&model.email));
        let password_hash = failures.collect(PasswordHash::parse(&model.password_hash));
        let written_at = model.updated_at.unwrap_or(model.created_at);
        let date_of_birth =
            failures.collect(DateOfBirth::from_stored(model.date_of_birth, written_at));
        let first_name = model
            .first_name
            .as_deref()
            .and_then(|value| failures.collect(Name::parse("firstName", value)));
        let last_name = model
            .last_name
            .as_deref()
            .and_then(|value| failures.collect(Name::parse("lastName", value)));

        match (username, email, password_hash, date_of_birth) {
            (Some(username), Some(email), Some(password_hash), Some(date_of_birth))
                if failures.is_empty() =>
            {
                Ok(User {
                    id: model.id,
                    username,
                    email,
                    password_hash,
                    first_name,
                    last_name,
                    bio: model.bio,
                    location: model.location,
                    date_of_birth,
                    is_verified: model.is_verified,
                    profile_picture_asset_id: model.profile_picture_asset_id,
                    created_at: model.created_at,
                    updated_at: model.updated_at,
                    last_online: model.last_online,
                })
            }
            _ => Err(ErrorCode::InternalServer
                .with_detail("Stored user record is invalid")
                .with_cause(failures)),
        }
    }
}

/// Full active model for a domain user; every column is set.
impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            id: Set(user.id),
            username: Set(user.username.as_str().to_string()),
            email: Set(user.email.as_str().to_string()),
            password_hash: Set(user.password_hash.as_str().to_string()),
            first_name: Set(user.first_name.as_ref().map(|n| n.as_str().to_string())),
            last_name: Set(user.last_name.as_ref().map(|n| n.as_str().to_string())),
            bio: Set(user.bio.clone()),
            location: Set(user.location.clone()),
            date_of_birth: Set(user.date_of_birth.value()),
            is_verified: Set(user.is_verified),
            profile_picture_asset_id: Set(user.profile_picture_asset_id),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
            last_online: Set(user.last_online),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Months, Utc};

    use super::*;

    const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
                        J8iYWpn1mO/3H/Ud7fItXb+7l8Plzi7aQ61HBZNAr5M";

    fn row() -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            username: "jane_doe".into(),
            email: "jane@example.com".into(),
            password_hash: HASH.into(),
            first_name: Some("Jane".into()),
            last_name: None,
            bio: None,
            location: Some("Budapest".into()),
            date_of_birth: now - Duration::days(365 * 30),
            is_verified: true,
            profile_picture_asset_id: None,
            created_at: now,
            updated_at: None,
            last_online: None,
        }
    }

    #[test]
    fn test_row_hydrates_into_user() {
        let model = row();
        let user = User::try_from(model.clone()).unwrap();

        assert_eq!(user.id, model.id);
        assert_eq!(user.first_name.as_ref().map(Name::as_str), Some("Jane"));
        assert!(user.is_verified);
    }

    #[test]
    fn test_invalid_row_is_internal_error() {
        let model = Model {
            password_hash: "plaintext".into(),
            ..row()
        };

        let err = User::try_from(model).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InternalServer);
    }

    #[test]
    fn test_user_past_age_limit_still_loads() {
        let registered_at = Utc::now() - Duration::days(2);
        let dob = registered_at
            .checked_sub_months(Months::new(120 * 12))
            .unwrap()
            + Duration::days(1);
        assert!(DateOfBirth::parse_at(dob, registered_at).is_ok());

        let model = Model {
            date_of_birth: dob,
            created_at: registered_at,
            ..row()
        };

        let user = User::try_from(model).unwrap();
        assert_eq!(user.date_of_birth.value(), dob);
    }

    #[test]
    fn test_birth_date_after_write_is_internal_error() {
        let model = row();
        let model = Model {
            date_of_birth: model.created_at + Duration::days(1),
            ..model
        };

        let err = User::try_from(model).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InternalServer);
    }

    #[test]
    fn test_active_model_round_trip() {
        let user = User::try_from(row()).unwrap();
        let active = ActiveModel::from(&user);

        assert_eq!(active.username.clone().unwrap(), "jane_doe");
        assert_eq!(active.location.clone().unwrap().as_deref(), Some("Budapest"));
    }
}
