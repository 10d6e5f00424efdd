//! Uniform response envelope.
//!
//! Every API response body is an [`ApiResponse`]. A terminal envelope carries
//! either `data` or `error`, never both; the builder methods below keep that
//! invariant by clearing the other side.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ClassifiedError;

/// Request echo attached to an envelope for diagnostics.
pub type Params = Map<String, Value>;

/// Pagination metadata of a list response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_items: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_link: Option<String>,
}

/// Data payload of a successful response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseData<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ResponseData<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            deleted: None,
            updated: None,
            pagination: None,
        }
    }

    /// Payload holding a single item
    pub fn single(item: T) -> Self {
        Self::new(vec![item])
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = Some(deleted);
        self
    }

    pub fn updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn paginated(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl<T> Default for ResponseData<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Response envelope. The HTTP status and headers travel out of band.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Params>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<ResponseData<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ClassifiedError>,
    #[serde(skip_serializing_if = "String::is_empty")]
    message: String,
    #[serde(skip)]
    status: StatusCode,
    #[serde(skip)]
    headers: HeaderMap,
}

impl<T> ApiResponse<T> {
    /// Start an envelope. `status` defaults to 200 and `message` to the
    /// status' canonical reason.
    pub fn new(params: Option<Params>, status: Option<StatusCode>, message: Option<&str>) -> Self {
        let status = status.unwrap_or(StatusCode::OK);
        let message = match message {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => reason(status),
        };

        Self {
            params,
            data: None,
            error: None,
            message,
            status,
            headers: HeaderMap::new(),
        }
    }

    /// Terminal success envelope. Clears any error.
    pub fn with_data(
        mut self,
        message: impl Into<String>,
        data: ResponseData<T>,
        status: StatusCode,
    ) -> Self {
        self.message = message.into();
        self.data = Some(data);
        self.error = None;
        self.status = status;
        self
    }

    /// Terminal error envelope carrying the error's own status. Clears any data.
    pub fn with_error(mut self, error: ClassifiedError) -> Self {
        self.message = error.message().to_string();
        self.status = error.status();
        self.error = Some(error);
        self.data = None;
        self
    }

    /// Attach a response header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Error envelope for `error` with no params.
    pub fn from_error(error: ClassifiedError) -> Self {
        Self::new(None, None, None).with_error(error)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn data(&self) -> Option<&ResponseData<T>> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ClassifiedError> {
        self.error.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_defaults_to_ok() {
        let response: ApiResponse<()> = ApiResponse::new(None, None, None);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.message(), "OK");
        assert_eq!(serde_json::to_value(&response).unwrap(), json!({"message": "OK"}));
    }

    #[test]
    fn test_default_message_follows_status() {
        let response: ApiResponse<()> =
            ApiResponse::new(None, Some(StatusCode::INTERNAL_SERVER_ERROR), Some(""));
        assert_eq!(response.message(), "Internal Server Error");
    }

    #[test]
    fn test_data_and_error_are_exclusive() {
        let response = ApiResponse::new(None, None, None)
            .with_data("ok", ResponseData::single(1), StatusCode::CREATED)
            .with_error(ErrorCode::NotFound.error());

        assert!(response.data().is_none());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.message(), "The requested resource could not be found.");

        let response = response.with_data("back", ResponseData::single(2), StatusCode::OK);
        assert!(response.error().is_none());
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_wire_shape_omits_empty_fields() {
        let mut params = Params::new();
        params.insert("id".into(), json!("42"));

        let response = ApiResponse::new(Some(params), None, None).with_data(
            "User deleted successfully",
            ResponseData::<String>::default().deleted(true),
            StatusCode::OK,
        );

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "params": {"id": "42"},
                "data": {"items": [], "deleted": true},
                "message": "User deleted successfully"
            })
        );
    }

    #[test]
    fn test_headers_are_not_serialized() {
        let response: ApiResponse<()> = ApiResponse::new(None, None, Some("ok")).with_header(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer: abc"),
        );

        assert_eq!(response.headers().len(), 1);
        assert_eq!(serde_json::to_value(&response).unwrap(), json!({"message": "ok"}));
    }

    #[test]
    fn test_pagination_is_camel_case() {
        let data = ResponseData::new(vec!["a"]).paginated(Pagination {
            total_items: 1,
            items_per_page: Some(10),
            ..Default::default()
        });

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["pagination"], json!({"totalItems": 1, "itemsPerPage": 10}));
    }

    #[test]
    fn test_error_envelope_wire_shape() {
        let response: ApiResponse<()> =
            ApiResponse::from_error(ErrorCode::BadRequest.with_detail("Request body is empty"));

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "error": {
                    "code": "BAD_REQUEST",
                    "message": "The request was invalid or malformed.",
                    "details": "Request body is empty"
                },
                "message": "The request was invalid or malformed."
            })
        );
    }
}
