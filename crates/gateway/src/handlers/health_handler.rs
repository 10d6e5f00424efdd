//! Liveness endpoint reporting the reachability of backing stores.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use serde::Serialize;
use tracing::warn;

use common::{ApiResponse, ErrorCode, ResponseData};
use user_service_lib::Database;

use crate::dispatch::HandlerOutput;
use crate::state::AppState;

const COMPONENT: &str = "health_handler";

/// Dependency that can report whether it is reachable.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), String>;
}

#[async_trait]
impl HealthCheck for Database {
    async fn ping(&self) -> Result<(), String> {
        Database::ping(self).await.map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Unhealthy,
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: Status,
    pub services: Services,
}

#[derive(Debug, Serialize)]
pub struct Services {
    pub database: Checked,
}

/// Outcome of a single dependency check.
#[derive(Debug, Serialize)]
pub struct Checked {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<(), String>> for Checked {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self {
                status: Status::Healthy,
                error: None,
            },
            Err(error) => Self {
                status: Status::Unhealthy,
                error: Some(error),
            },
        }
    }
}

impl HealthReport {
    fn new(database: Checked) -> Self {
        let status = match database.status {
            Status::Healthy => Status::Healthy,
            _ => Status::Degraded,
        };
        Self {
            status,
            services: Services { database },
        }
    }

    /// Healthy reports are data; anything else is `SERVICE_UNAVAILABLE`
    /// carrying the report as details.
    fn into_output(self) -> HandlerOutput<HealthReport> {
        match self.status {
            Status::Healthy => HandlerOutput::success(ApiResponse::new(None, None, None).with_data(
                "Service is healthy.",
                ResponseData::single(self),
                StatusCode::OK,
            )),
            _ => {
                let details = serde_json::to_value(&self).ok();
                HandlerOutput::error_only(ErrorCode::ServiceUnavailable.new_error(details, None))
            }
        }
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// `GET /health`: 200 when every dependency answers, 503 otherwise.
pub async fn health_check(State(state): State<AppState>, request: Request) -> Response {
    let dispatcher = state.dispatcher;
    dispatcher
        .serve(COMPONENT, request, |_req| async move {
            let database = Checked::from(state.database.ping().await);
            if let Some(error) = &database.error {
                warn!(dependency = "database", error = %error, "Health check failed");
            }
            HealthReport::new(database).into_output()
        })
        .await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_failed_check_degrades_report() {
        let output = HealthReport::new(Checked::from(Err("timeout".to_string()))).into_output();

        assert!(output.envelope().is_none());
        let error = output.error().unwrap();
        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            error.details().unwrap(),
            &json!({
                "status": "degraded",
                "services": {"database": {"status": "unhealthy", "error": "timeout"}}
            })
        );
    }

    #[test]
    fn test_healthy_report() {
        let output = HealthReport::new(Checked::from(Ok(()))).into_output();

        assert!(output.error().is_none());
        let envelope = output.envelope().unwrap();
        assert_eq!(envelope.status(), StatusCode::OK);
        assert_eq!(envelope.data().unwrap().items[0].status, Status::Healthy);
    }
}
