//! Authentication handlers.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    response::Response,
    routing::post,
    Router,
};

use common::{ApiResponse, ApiResult, ErrorCode, ResponseData};
use domain::{Email, UserResponse, BEARER_TOKEN_PREFIX};

use super::dto::LoginRequest;
use crate::dispatch::{ApiRequest, HandlerOutput};
use crate::state::AppState;

const COMPONENT: &str = "auth_handler";

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Login with email and password
///
/// The token is returned in the `Authorization` response header as
/// `Bearer: <token>`.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserResponse,
            headers(("Authorization" = String, description = "Bearer: <token>"))),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn login(State(state): State<AppState>, request: Request) -> Response {
    let dispatcher = state.dispatcher;
    dispatcher
        .serve(COMPONENT, request, |req| async move {
            HandlerOutput::from_result(None, authenticate(&state, req).await)
        })
        .await
}

async fn authenticate(
    state: &AppState,
    request: ApiRequest,
) -> ApiResult<ApiResponse<UserResponse>> {
    let payload: LoginRequest = request.json(&state.rules).await?;
    let (email, password) = payload.into_credentials()?;
    let email = Email::parse(&email)?;

    let outcome = state.auth_service.login(&email, &password).await?;
    let header = bearer_header(&outcome.token)?;

    Ok(ApiResponse::new(None, None, None)
        .with_data(
            "User logged in successfully.",
            ResponseData::single(UserResponse::from(outcome.user)),
            StatusCode::OK,
        )
        .with_header(AUTHORIZATION, header))
}

fn bearer_header(token: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(&format!("{BEARER_TOKEN_PREFIX}{token}")).map_err(|e| {
        ErrorCode::InternalServer
            .with_detail("Failed to build authorization header")
            .with_cause(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_header_keeps_colon_scheme() {
        assert_eq!(bearer_header("abc.def.ghi").unwrap(), "Bearer: abc.def.ghi");
    }

    #[test]
    fn test_bearer_header_rejects_control_characters() {
        let err = bearer_header("abc\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InternalServer);
    }
}
