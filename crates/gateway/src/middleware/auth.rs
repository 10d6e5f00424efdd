//! Authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use common::{ApiResult, ErrorCode};
use domain::BEARER_TOKEN_PREFIX;

use crate::state::AppState;

const COMPONENT: &str = "auth_middleware";

/// Current authenticated user extracted from JWT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub profile_picture_asset_id: Option<Uuid>,
}

/// Authentication middleware that validates JWT tokens.
///
/// Rejections are answered through the dispatcher like any handler error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()) {
        Ok(current_user) => {
            debug!(user_id = %current_user.id, path = %request.uri().path(), "Request authenticated");
            request.extensions_mut().insert(current_user);
            next.run(request).await
        }
        Err(error) => state.dispatcher.reject(COMPONENT, request, error).await,
    }
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> ApiResult<CurrentUser> {
    let token = extract_token(headers)?;
    let claims = state.auth_service.verify_token(token)?;

    Ok(CurrentUser {
        id: claims.id,
        username: claims.username,
        profile_picture_asset_id: claims.profile_picture_asset_id,
    })
}

/// Token following the `Bearer: ` prefix of the Authorization header.
pub fn extract_token(headers: &HeaderMap) -> ApiResult<&str> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ErrorCode::Unauthorized.with_detail("Missing authorization header"))?;

    header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ErrorCode::Unauthorized.with_detail("Invalid authorization header"))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use tokio_test::assert_err;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extracts_token_after_prefix() {
        assert_eq!(extract_token(&headers("Bearer: abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn test_rejects_standard_bearer_scheme() {
        let err = extract_token(&headers("Bearer abc.def")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[test]
    fn test_rejects_missing_or_empty_token() {
        assert_err!(extract_token(&HeaderMap::new()));
        assert_err!(extract_token(&headers("Bearer: ")));
    }
}
