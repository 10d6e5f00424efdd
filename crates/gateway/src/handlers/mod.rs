//! HTTP handlers.
//!
//! Every API handler is a thin axum adapter over the dispatcher; the work is
//! done in a function returning `ApiResult<ApiResponse<_>>`.

pub mod auth_handler;
pub mod dto;
pub mod health_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use health_handler::{health_routes, HealthCheck};
pub use user_handler::{public_user_routes, user_routes};
