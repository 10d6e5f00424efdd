//! User handlers.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use common::{ApiResponse, ApiResult, ErrorCode, Params, ResponseData};
use domain::UserResponse;

use super::dto::{CreateUserRequest, UpdateUserRequest};
use crate::dispatch::{ApiRequest, HandlerOutput};
use crate::state::AppState;

const COMPONENT: &str = "user_handler";

/// Routes open to anonymous callers
pub fn public_user_routes() -> Router<AppState> {
    Router::new().route("/", post(create_user))
}

/// Routes behind the bearer-auth middleware
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Malformed request body"),
        (status = 409, description = "Username or email already taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_user(State(state): State<AppState>, request: Request) -> Response {
    let dispatcher = state.dispatcher;
    dispatcher
        .serve(COMPONENT, request, |req| async move {
            HandlerOutput::from_result(None, create(&state, req).await)
        })
        .await
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(State(state): State<AppState>, request: Request) -> Response {
    let dispatcher = state.dispatcher;
    dispatcher
        .serve(COMPONENT, request, |req| async move {
            HandlerOutput::from_result(None, current(&state, req).await)
        })
        .await
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 400, description = "Malformed user ID"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Response {
    let dispatcher = state.dispatcher;
    dispatcher
        .serve(COMPONENT, request, |req| async move {
            let params = id_params(&id);
            let result = fetch(&state, &id, params.clone(), req).await;
            HandlerOutput::from_result(Some(params), result)
        })
        .await
}

/// Update own profile
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Can only update own profile"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Response {
    let dispatcher = state.dispatcher;
    dispatcher
        .serve(COMPONENT, request, |req| async move {
            let params = id_params(&id);
            let result = update(&state, &id, params.clone(), req).await;
            HandlerOutput::from_result(Some(params), result)
        })
        .await
}

/// Delete own account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 400, description = "Malformed user ID"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Can only delete own account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Response {
    let dispatcher = state.dispatcher;
    dispatcher
        .serve(COMPONENT, request, |req| async move {
            let params = id_params(&id);
            let result = remove(&state, &id, params.clone(), req).await;
            HandlerOutput::from_result(Some(params), result)
        })
        .await
}

async fn create(state: &AppState, request: ApiRequest) -> ApiResult<ApiResponse<UserResponse>> {
    let payload: CreateUserRequest = request.json(&state.rules).await?;
    let user = state.user_service.create_user(payload.into_command()?).await?;

    Ok(ApiResponse::new(None, None, None).with_data(
        "User created successfully.",
        ResponseData::single(UserResponse::from(user)),
        StatusCode::CREATED,
    ))
}

async fn current(state: &AppState, request: ApiRequest) -> ApiResult<ApiResponse<UserResponse>> {
    let caller = request.current_user()?;
    let user = state.user_service.get_user(caller.id).await?;

    Ok(ApiResponse::new(None, None, None).with_data(
        "User fetched successfully.",
        ResponseData::single(UserResponse::from(user)),
        StatusCode::OK,
    ))
}

async fn fetch(
    state: &AppState,
    id: &str,
    params: Params,
    request: ApiRequest,
) -> ApiResult<ApiResponse<UserResponse>> {
    request.current_user()?;
    let id = parse_id(id)?;
    let user = state.user_service.get_user(id).await?;

    Ok(ApiResponse::new(Some(params), None, None).with_data(
        "User fetched successfully.",
        ResponseData::single(UserResponse::from(user)),
        StatusCode::OK,
    ))
}

async fn update(
    state: &AppState,
    id: &str,
    params: Params,
    request: ApiRequest,
) -> ApiResult<ApiResponse<UserResponse>> {
    let caller = request.current_user()?;
    let id = parse_id(id)?;
    require_self(caller.id, id, "You can only update your own profile")?;

    let payload: UpdateUserRequest = request.json(&state.rules).await?;
    let user = state.user_service.update_user(id, payload.into()).await?;
    let updated = user.updated_at.unwrap_or_else(Utc::now);

    Ok(ApiResponse::new(Some(params), None, None).with_data(
        "User updated successfully.",
        ResponseData::single(UserResponse::from(user)).updated(updated),
        StatusCode::OK,
    ))
}

async fn remove(
    state: &AppState,
    id: &str,
    params: Params,
    request: ApiRequest,
) -> ApiResult<ApiResponse<UserResponse>> {
    let caller = request.current_user()?;
    let id = parse_id(id)?;
    require_self(caller.id, id, "You can only delete your own account")?;

    state.user_service.delete_user(id).await?;

    Ok(ApiResponse::new(Some(params), None, None).with_data(
        "User deleted successfully.",
        ResponseData::default().deleted(true),
        StatusCode::OK,
    ))
}

fn id_params(id: &str) -> Params {
    let mut params = Params::new();
    params.insert("id".into(), Value::String(id.to_string()));
    params
}

fn parse_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| {
        ErrorCode::InvalidInput
            .with_detail(format!("Invalid user ID: {id}"))
            .with_cause(e)
    })
}

fn require_self(caller: Uuid, target: Uuid, detail: &str) -> ApiResult<()> {
    if caller == target {
        Ok(())
    } else {
        Err(ErrorCode::Forbidden.with_detail(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);

        let err = parse_id("42").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_require_self() {
        let id = Uuid::new_v4();
        assert!(require_self(id, id, "no").is_ok());

        let err = require_self(id, Uuid::new_v4(), "no").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn test_id_params() {
        assert_eq!(id_params("abc")["id"], "abc");
    }
}
