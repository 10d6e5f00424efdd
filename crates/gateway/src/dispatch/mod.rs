//! Dispatch wrapper.
//!
//! Every API handler runs through a [`Dispatcher`]. Handlers return a
//! [`HandlerOutput`] and never see the response; the dispatcher logs the
//! outcome and writes exactly one response per request:
//!
//! - error and envelope: logged at the error's severity, written with the
//!   error's status
//! - envelope only: logged at info, written with the envelope's status
//! - error only: an error envelope is built for it
//! - neither: handler defect, answered with a bare 500 envelope; a
//!   panicking handler is treated the same way
//!
//! A handler that runs past the deadline, or whose request is dropped, gets
//! no response from the dispatcher at all.

mod context;
mod output;
mod request;
mod sink;

pub use context::{correlation_id, RequestContext, REQUEST_ID_HEADER, VERCEL_ID_HEADER};
pub use output::HandlerOutput;
pub use request::ApiRequest;
pub use sink::{ChannelSink, ResponseSink};

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use common::{ApiResponse, ClassifiedError, ErrorCode, Severity};

/// Body written when an envelope cannot be encoded.
const ENCODING_FAILED_BODY: &[u8] = br#"{"error":{"code":"INTERNAL_SERVER_ERROR","message":"An internal server error occurred."},"message":"An internal server error occurred."}"#;

macro_rules! log_at {
    ($severity:expr, $($arg:tt)+) => {
        match $severity {
            Severity::Debug => tracing::debug!($($arg)+),
            Severity::Info => tracing::info!($($arg)+),
            Severity::Warn => tracing::warn!($($arg)+),
            Severity::Error | Severity::Fatal => tracing::error!($($arg)+),
        }
    };
}

/// Runs wrapped handlers under a deadline.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `handler` for an axum request and return its single response.
    ///
    /// When the dispatcher wrote nothing, the connection is answered with a
    /// `SERVICE_UNAVAILABLE` error envelope.
    pub async fn serve<T, F, Fut>(
        &self,
        component: &'static str,
        request: Request,
        handler: F,
    ) -> Response
    where
        T: Serialize,
        F: FnOnce(ApiRequest) -> Fut,
        Fut: Future<Output = HandlerOutput<T>>,
    {
        let (parts, body) = request.into_parts();
        let ctx = RequestContext::from_parts(&parts, component);
        let (tx, rx) = oneshot::channel();

        self.dispatch(&ctx, ChannelSink::new(tx), handler(ApiRequest::new(parts, body)))
            .await;

        rx.await.unwrap_or_else(|_| {
            ErrorCode::ServiceUnavailable
                .with_detail("Request did not complete in time")
                .into_response()
        })
    }

    /// Answer `request` with `error` without running a handler.
    pub async fn reject(
        &self,
        component: &'static str,
        request: Request,
        error: ClassifiedError,
    ) -> Response {
        self.serve(component, request, |_| async move {
            HandlerOutput::<()>::error_only(error)
        })
        .await
    }

    /// Await `handler` and write its outcome to `sink`.
    pub async fn dispatch<T, S, Fut>(&self, ctx: &RequestContext, sink: S, handler: Fut)
    where
        T: Serialize,
        S: ResponseSink,
        Fut: Future<Output = HandlerOutput<T>>,
    {
        let mut guard = CancelGuard::new(ctx);

        let handler = AssertUnwindSafe(handler).catch_unwind();
        let output = match tokio::time::timeout(self.timeout, handler).await {
            Ok(Ok(output)) => output,
            Ok(Err(_)) => {
                error!(
                    request_id = %ctx.request_id,
                    method = %ctx.method,
                    path = %ctx.path,
                    component = ctx.component,
                    status = "failed",
                    event = "api_handler_panicked",
                    "API handler panicked"
                );
                HandlerOutput::empty()
            }
            Err(_) => {
                guard.reason = "deadline_exceeded";
                return;
            }
        };

        guard.disarm();
        finish(ctx, sink, output);
    }
}

fn finish<T, S>(ctx: &RequestContext, sink: S, output: HandlerOutput<T>)
where
    T: Serialize,
    S: ResponseSink,
{
    match (output.envelope, output.error) {
        (Some(envelope), Some(error)) => {
            log_failure(ctx, &error);
            write(ctx, sink, error.status(), &envelope);
        }
        (Some(envelope), None) => {
            info!(
                request_id = %ctx.request_id,
                method = %ctx.method,
                path = %ctx.path,
                component = ctx.component,
                status = "success",
                event = "api_handler_success",
                "API handler completed successfully"
            );
            write(ctx, sink, envelope.status(), &envelope);
        }
        (None, Some(error)) => {
            log_failure(ctx, &error);
            let status = error.status();
            write(ctx, sink, status, &ApiResponse::<T>::from_error(error));
        }
        (None, None) => {
            error!(
                request_id = %ctx.request_id,
                method = %ctx.method,
                path = %ctx.path,
                component = ctx.component,
                status = "failed",
                event = "api_handler_failed",
                "API handler returned neither a response nor an error"
            );
            let envelope: ApiResponse<T> = ApiResponse::new(
                None,
                Some(StatusCode::INTERNAL_SERVER_ERROR),
                Some("Internal Server Error"),
            );
            write(ctx, sink, StatusCode::INTERNAL_SERVER_ERROR, &envelope);
        }
    }
}

fn log_failure(ctx: &RequestContext, error: &ClassifiedError) {
    let details = error.details().map(|d| d.to_string()).unwrap_or_default();
    let cause = error.cause().map(|c| c.to_string()).unwrap_or_default();

    log_at!(
        error.severity(),
        request_id = %ctx.request_id,
        method = %ctx.method,
        path = %ctx.path,
        component = ctx.component,
        status = "failed",
        event = "api_error_occurred",
        error_code = %error.code(),
        error_message = error.message(),
        details = %details,
        cause = %cause,
        "Error occurred in API handler"
    );
}

fn write<T, S>(ctx: &RequestContext, sink: S, status: StatusCode, envelope: &ApiResponse<T>)
where
    T: Serialize,
    S: ResponseSink,
{
    match serde_json::to_vec(envelope) {
        Ok(body) => sink.write(status, envelope.headers().clone(), body),
        Err(err) => {
            error!(
                request_id = %ctx.request_id,
                method = %ctx.method,
                path = %ctx.path,
                component = ctx.component,
                status = "failed",
                event = "api_response_encoding_failed",
                error = %err,
                "Failed to encode API response"
            );
            sink.write(
                StatusCode::INTERNAL_SERVER_ERROR,
                HeaderMap::new(),
                ENCODING_FAILED_BODY.to_vec(),
            );
        }
    }
}

/// Logs a cancellation unless the handler finished.
struct CancelGuard<'a> {
    ctx: &'a RequestContext,
    reason: &'static str,
    armed: bool,
}

impl<'a> CancelGuard<'a> {
    fn new(ctx: &'a RequestContext) -> Self {
        Self {
            ctx,
            reason: "request_dropped",
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(
                request_id = %self.ctx.request_id,
                method = %self.ctx.method,
                path = %self.ctx.path,
                component = self.ctx.component,
                status = "cancelled",
                event = "api_request_cancelled",
                reason = self.reason,
                "Request cancelled before a response was written"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, HeaderValue, Method},
    };
    use common::{ErrorCode, ResponseData};
    use serde::ser::Error as _;
    use serde_json::{json, Value};

    use super::*;

    type Written = Arc<Mutex<Vec<(StatusCode, HeaderMap, Vec<u8>)>>>;

    /// Sink recording every write.
    struct RecordingSink(Written);

    impl ResponseSink for RecordingSink {
        fn write(self, status: StatusCode, headers: HeaderMap, body: Vec<u8>) {
            self.0.lock().unwrap().push((status, headers, body));
        }
    }

    fn ctx() -> RequestContext {
        RequestContext {
            request_id: "req-1".into(),
            method: Method::GET,
            path: "/users/me".into(),
            component: "test",
        }
    }

    async fn run<T: Serialize>(
        dispatcher: Dispatcher,
        output: impl Future<Output = HandlerOutput<T>>,
    ) -> Vec<(StatusCode, HeaderMap, Vec<u8>)> {
        let written: Written = Arc::default();
        dispatcher
            .dispatch(&ctx(), RecordingSink(written.clone()), output)
            .await;
        let writes = written.lock().unwrap().clone();
        writes
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Duration::from_secs(5))
    }

    fn body(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_with_envelope_uses_error_status() {
        let output = HandlerOutput::<()>::failure(
            ApiResponse::new(None, None, None),
            ErrorCode::UniqueKeyViolation.with_detail("A user with the same email already exists"),
        );

        let writes = run(dispatcher(), async { output }).await;

        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, StatusCode::CONFLICT);
        let json = body(&writes[0].2);
        assert_eq!(json["error"]["code"], "UNIQUE_KEY_VIOLATION");
        assert_eq!(json["error"]["details"], "A user with the same email already exists");
    }

    #[tokio::test]
    async fn test_success_uses_envelope_status_and_headers() {
        let envelope = ApiResponse::new(None, None, None)
            .with_data("created", ResponseData::single(7), StatusCode::CREATED)
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer: t"));

        let writes = run(dispatcher(), async { HandlerOutput::success(envelope) }).await;

        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, StatusCode::CREATED);
        assert_eq!(writes[0].1[AUTHORIZATION], "Bearer: t");
        assert_eq!(
            body(&writes[0].2),
            json!({"data": {"items": [7]}, "message": "created"})
        );
    }

    #[tokio::test]
    async fn test_error_only_synthesizes_envelope() {
        let writes = run(dispatcher(), async {
            HandlerOutput::<()>::error_only(ErrorCode::Forbidden.error())
        })
        .await;

        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, StatusCode::FORBIDDEN);
        assert_eq!(body(&writes[0].2)["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_empty_output_is_internal_error() {
        let writes = run(dispatcher(), async { HandlerOutput::<()>::empty() }).await;

        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(&writes[0].2), json!({"message": "Internal Server Error"}));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_answered() {
        let writes = run(dispatcher(), async {
            if true {
                panic!("handler bug");
            }
            HandlerOutput::<()>::empty()
        })
        .await;

        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_timeout_writes_nothing() {
        let dispatcher = Dispatcher::new(Duration::from_millis(10));
        let writes = run(dispatcher, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            HandlerOutput::<()>::empty()
        })
        .await;

        assert!(writes.is_empty());
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot encode"))
        }
    }

    #[tokio::test]
    async fn test_encoding_failure_writes_static_error() {
        let envelope = ApiResponse::new(None, None, None).with_data(
            "ok",
            ResponseData::single(Unencodable),
            StatusCode::OK,
        );

        let writes = run(dispatcher(), async { HandlerOutput::success(envelope) }).await;

        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(&writes[0].2)["error"]["code"], "INTERNAL_SERVER_ERROR");
    }

    #[tokio::test]
    async fn test_serve_returns_written_response() {
        let request = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = dispatcher()
            .serve("test", request, |_req| async {
                HandlerOutput::<()>::error_only(ErrorCode::NotFound.error())
            })
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body(&bytes)["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_serve_timeout_answers_service_unavailable() {
        let request = axum::http::Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = Dispatcher::new(Duration::from_millis(10))
            .serve("test", request, |_req| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                HandlerOutput::<()>::empty()
            })
            .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = body(&bytes);
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
        assert_eq!(body["message"], "The service is temporarily unavailable.");
    }

    #[tokio::test]
    async fn test_reject_writes_error_envelope() {
        let request = axum::http::Request::builder()
            .uri("/users/me")
            .header(REQUEST_ID_HEADER, "req-7")
            .body(Body::empty())
            .unwrap();

        let response = dispatcher()
            .reject("test", request, ErrorCode::Unauthorized.with_detail("Missing token"))
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = body(&bytes);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["details"], "Missing token");
        assert_eq!(body["message"], "Authentication failed.");
    }
}
