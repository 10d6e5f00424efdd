//! Per-request logging context.

use axum::http::{request::Parts, HeaderMap, Method};
use uuid::Uuid;

/// Inbound correlation header, checked first.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation header set by the Vercel edge.
pub const VERCEL_ID_HEADER: &str = "x-vercel-id";

/// Fields attached to every dispatch log line of one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub path: String,
    pub component: &'static str,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts, component: &'static str) -> Self {
        Self {
            request_id: correlation_id(&parts.headers),
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            component,
        }
    }
}

/// Correlation id from the inbound trace headers, or a fresh one.
pub fn correlation_id(headers: &HeaderMap) -> String {
    [REQUEST_ID_HEADER, VERCEL_ID_HEADER]
        .into_iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
