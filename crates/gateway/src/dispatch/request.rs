//! Request view handed to wrapped handlers.

use axum::{body::Body, http::request::Parts};
use serde::de::DeserializeOwned;

use common::{ApiResult, ErrorCode};

use crate::middleware::CurrentUser;
use crate::validation::{validate_request, DomainRules, RuleRegistry};

/// Inbound request without any way to answer it.
#[derive(Debug)]
pub struct ApiRequest {
    parts: Parts,
    body: Body,
}

impl ApiRequest {
    pub fn new(parts: Parts, body: Body) -> Self {
        Self { parts, body }
    }

    /// Caller identity placed by the bearer-auth middleware.
    pub fn current_user(&self) -> ApiResult<CurrentUser> {
        self.parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ErrorCode::Unauthorized.with_detail("Missing authenticated user"))
    }

    /// Read the body and run it through both validation stages.
    pub async fn json<T>(self, rules: &RuleRegistry) -> ApiResult<T>
    where
        T: DeserializeOwned + DomainRules,
    {
        validate_request(self.body, rules).await
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use uuid::Uuid;

    use super::*;

    fn request(body: &'static str) -> ApiRequest {
        let (parts, body) = Request::builder()
            .uri("/users/me")
            .body(Body::from(body))
            .unwrap()
            .into_parts();
        ApiRequest::new(parts, body)
    }

    #[test]
    fn test_missing_user_is_unauthorized() {
        let err = request("").current_user().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn test_current_user_from_extensions() {
        let mut req = request("");
        let user = CurrentUser {
            id: Uuid::new_v4(),
            username: "jane_doe".into(),
            profile_picture_asset_id: None,
        };
        req.parts.extensions.insert(user.clone());

        assert_eq!(req.current_user().unwrap().id, user.id);
    }
}
