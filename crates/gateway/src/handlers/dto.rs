//! Request bodies accepted by the API.
//!
//! Fields are optional on the wire so that a missing field is reported by the
//! `required` rule alongside every other failure, instead of failing decode.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::{ApiResult, ClassifiedError, ErrorCode};
use user_service_lib::{CreateUserCommand, UpdateUserCommand};

use crate::validation::{DomainRules, NamedRule};

fn unvalidated() -> ClassifiedError {
    ErrorCode::InternalServer.with_detail("Request body was not validated")
}

/// Every rule name referenced by a request body.
pub fn request_rule_names() -> Vec<&'static str> {
    let mut names = CreateUserRequest::rule_names();
    names.extend(UpdateUserRequest::rule_names());
    names.extend(LoginRequest::rule_names());
    names.sort_unstable();
    names.dedup();
    names
}

/// Registration request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(required, length(min = 3, max = 30))]
    #[schema(example = "jane_doe")]
    pub username: Option<String>,
    #[validate(required, length(max = 254))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    #[validate(required, length(min = 16, max = 72))]
    #[schema(example = "Correct-Horse-Battery-9")]
    pub password: Option<String>,
    #[validate(required)]
    pub date_of_birth: Option<DateTime<Utc>>,
}

impl DomainRules for CreateUserRequest {
    fn named_rules(&self) -> Vec<NamedRule<'_>> {
        vec![
            NamedRule::new("username", "username", self.username.as_deref()),
            NamedRule::new("email", "email", self.email.as_deref()),
            NamedRule::new("password", "password", self.password.as_deref()),
            NamedRule::new("dateOfBirth", "dateofbirth", self.date_of_birth),
        ]
    }
}

impl CreateUserRequest {
    pub fn into_command(self) -> ApiResult<CreateUserCommand> {
        match (self.username, self.email, self.password, self.date_of_birth) {
            (Some(username), Some(email), Some(password), Some(date_of_birth)) => {
                Ok(CreateUserCommand {
                    username,
                    email,
                    password,
                    date_of_birth,
                })
            }
            _ => Err(unvalidated()),
        }
    }
}

/// Partial profile update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 30))]
    pub username: Option<String>,
    #[validate(length(max = 254))]
    pub email: Option<String>,
    #[validate(length(min = 16, max = 72))]
    pub password: Option<String>,
    #[validate(length(max = 70))]
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    #[validate(length(max = 70))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
    #[schema(example = "Budapest")]
    pub location: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub profile_picture_asset_id: Option<Uuid>,
}

impl DomainRules for UpdateUserRequest {
    fn named_rules(&self) -> Vec<NamedRule<'_>> {
        vec![
            NamedRule::new("username", "username", self.username.as_deref()),
            NamedRule::new("email", "email", self.email.as_deref()),
            NamedRule::new("password", "password", self.password.as_deref()),
            NamedRule::new("firstName", "name", self.first_name.as_deref()),
            NamedRule::new("lastName", "name", self.last_name.as_deref()),
            NamedRule::new("dateOfBirth", "dateofbirth", self.date_of_birth),
        ]
    }
}

impl From<UpdateUserRequest> for UpdateUserCommand {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            bio: request.bio,
            location: request.location,
            date_of_birth: request.date_of_birth,
            profile_picture_asset_id: request.profile_picture_asset_id,
        }
    }
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(required, length(max = 254))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    #[validate(required)]
    pub password: Option<String>,
}

impl DomainRules for LoginRequest {
    fn named_rules(&self) -> Vec<NamedRule<'_>> {
        vec![NamedRule::new("email", "email", self.email.as_deref())]
    }
}

impl LoginRequest {
    /// `(email, password)` of a validated request
    pub fn into_credentials(self) -> ApiResult<(String, String)> {
        self.email.zip(self.password).ok_or_else(unvalidated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::validation::{decode_json, validate_rules, RuleRegistry};

    fn rules() -> RuleRegistry {
        RuleRegistry::with_domain_rules().unwrap()
    }

    fn failed_fields<T: DomainRules>(request: &T) -> Vec<String> {
        let err = validate_rules(request, &rules()).unwrap_err();
        err.details()
            .and_then(|d| d.as_array())
            .unwrap()
            .iter()
            .filter_map(|d| d["field"].as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_empty_registration_reports_every_field() {
        let request: CreateUserRequest = decode_json(b"{}").unwrap();

        assert_eq!(
            failed_fields(&request),
            ["dateOfBirth", "email", "password", "username"]
        );
    }

    #[test]
    fn test_valid_registration_converts() {
        let body = serde_json::json!({
            "username": "jane_doe",
            "email": "jane@example.com",
            "password": "Correct-Horse-Battery-9",
            "dateOfBirth": Utc::now() - Duration::days(365 * 30),
        });
        let request: CreateUserRequest = decode_json(body.to_string().as_bytes()).unwrap();

        assert!(validate_rules(&request, &rules()).is_ok());
        assert_eq!(request.into_command().unwrap().username, "jane_doe");
    }

    #[test]
    fn test_update_checks_only_present_fields() {
        let request = UpdateUserRequest {
            first_name: Some("J4ne".into()),
            bio: Some("anything goes".into()),
            ..Default::default()
        };

        assert_eq!(failed_fields(&request), ["firstName"]);
        assert!(validate_rules(&UpdateUserRequest::default(), &rules()).is_ok());
    }

    #[test]
    fn test_login_does_not_check_password_strength() {
        let request = LoginRequest {
            email: Some("jane@example.com".into()),
            password: Some("short".into()),
        };

        assert!(validate_rules(&request, &rules()).is_ok());
        assert_eq!(
            request.into_credentials().unwrap(),
            ("jane@example.com".to_string(), "short".to_string())
        );
    }

    #[test]
    fn test_request_rule_names_are_registered() {
        assert_eq!(
            request_rule_names(),
            ["dateofbirth", "email", "name", "password", "username"]
        );
        assert!(rules().ensure_registered(request_rule_names()).is_ok());
        assert!(RuleRegistry::new()
            .ensure_registered(LoginRequest::rule_names())
            .is_err());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = decode_json::<LoginRequest>(br#"{"email": "a@b.co", "role": "admin"}"#)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::JsonUnknownField);
    }
}
