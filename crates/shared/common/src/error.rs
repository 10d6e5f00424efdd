//! Error taxonomy and classified errors.
//!
//! Every failure that reaches a client is a [`ClassifiedError`], and every
//! `ClassifiedError` is created through [`ErrorCode::new_error`]. The HTTP
//! status, log severity and default message therefore always come from the
//! same taxonomy entry.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{ValidationErrorDetail, ValidationFailures};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Shared, cloneable underlying cause.
pub type BoxError = Arc<dyn StdError + Send + Sync + 'static>;

/// Result type alias used below the dispatch wrapper.
pub type ApiResult<T> = Result<T, ClassifiedError>;

// =============================================================================
// Severity
// =============================================================================

/// Log severity attached to a taxonomy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    /// Tracing level used when logging at this severity.
    ///
    /// `tracing` has no fatal level; fatal entries log as errors.
    pub fn level(self) -> tracing::Level {
        match self {
            Severity::Debug => tracing::Level::DEBUG,
            Severity::Info => tracing::Level::INFO,
            Severity::Warn => tracing::Level::WARN,
            Severity::Error | Severity::Fatal => tracing::Level::ERROR,
        }
    }
}

// =============================================================================
// Taxonomy
// =============================================================================

/// Fixed (message, status, severity) triple of an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub code: &'static str,
    pub message: &'static str,
    pub status: StatusCode,
    pub severity: Severity,
}

/// Closed set of error codes known to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadRequest,
    JsonSyntax,
    JsonTypeMismatch,
    JsonUnknownField,
    InvalidInput,
    UnprocessableEntity,
    NotFound,
    Unauthorized,
    Forbidden,
    InternalServer,
    DatabaseError,
    UniqueKeyViolation,
    ServiceUnavailable,
    DatabaseInitialize,
    EnvironmentVariableNotFound,
    ValidationRegistration,
    Generic,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 17] = [
        ErrorCode::BadRequest,
        ErrorCode::JsonSyntax,
        ErrorCode::JsonTypeMismatch,
        ErrorCode::JsonUnknownField,
        ErrorCode::InvalidInput,
        ErrorCode::UnprocessableEntity,
        ErrorCode::NotFound,
        ErrorCode::Unauthorized,
        ErrorCode::Forbidden,
        ErrorCode::InternalServer,
        ErrorCode::DatabaseError,
        ErrorCode::UniqueKeyViolation,
        ErrorCode::ServiceUnavailable,
        ErrorCode::DatabaseInitialize,
        ErrorCode::EnvironmentVariableNotFound,
        ErrorCode::ValidationRegistration,
        ErrorCode::Generic,
    ];

    /// Taxonomy entry of this code.
    pub const fn entry(self) -> TaxonomyEntry {
        let (code, message, status, severity) = match self {
            ErrorCode::BadRequest => (
                "BAD_REQUEST",
                "The request was invalid or malformed.",
                StatusCode::BAD_REQUEST,
                Severity::Warn,
            ),
            ErrorCode::JsonSyntax => (
                "JSON_SYNTAX_ERROR",
                "The request body contains malformed JSON or invalid JSON syntax.",
                StatusCode::BAD_REQUEST,
                Severity::Warn,
            ),
            ErrorCode::JsonTypeMismatch => (
                "JSON_TYPE_MISMATCH_ERROR",
                "The request body contains a field with an unexpected type.",
                StatusCode::BAD_REQUEST,
                Severity::Warn,
            ),
            ErrorCode::JsonUnknownField => (
                "JSON_UNKNOWN_FIELD_ERROR",
                "The request body contains an unknown field.",
                StatusCode::BAD_REQUEST,
                Severity::Warn,
            ),
            ErrorCode::InvalidInput => (
                "INVALID_INPUT",
                "The provided input is malformed.",
                StatusCode::BAD_REQUEST,
                Severity::Warn,
            ),
            ErrorCode::UnprocessableEntity => (
                "UNPROCESSABLE_ENTITY",
                "One or more input values are invalid.",
                StatusCode::UNPROCESSABLE_ENTITY,
                Severity::Warn,
            ),
            ErrorCode::NotFound => (
                "NOT_FOUND",
                "The requested resource could not be found.",
                StatusCode::NOT_FOUND,
                Severity::Info,
            ),
            ErrorCode::Unauthorized => (
                "UNAUTHORIZED",
                "Authentication failed.",
                StatusCode::UNAUTHORIZED,
                Severity::Warn,
            ),
            ErrorCode::Forbidden => (
                "FORBIDDEN",
                "You do not have permission to perform this action.",
                StatusCode::FORBIDDEN,
                Severity::Warn,
            ),
            ErrorCode::InternalServer => (
                "INTERNAL_SERVER_ERROR",
                "An internal server error occurred.",
                StatusCode::INTERNAL_SERVER_ERROR,
                Severity::Error,
            ),
            ErrorCode::DatabaseError => (
                "DATABASE_ERROR",
                "A database operation failed.",
                StatusCode::INTERNAL_SERVER_ERROR,
                Severity::Error,
            ),
            ErrorCode::UniqueKeyViolation => (
                "UNIQUE_KEY_VIOLATION",
                "A unique key violation occurred.",
                StatusCode::CONFLICT,
                Severity::Warn,
            ),
            ErrorCode::ServiceUnavailable => (
                "SERVICE_UNAVAILABLE",
                "The service is temporarily unavailable.",
                StatusCode::SERVICE_UNAVAILABLE,
                Severity::Error,
            ),
            ErrorCode::DatabaseInitialize => (
                "DATABASE_INITIALIZE",
                "Database initialization failed.",
                StatusCode::INTERNAL_SERVER_ERROR,
                Severity::Fatal,
            ),
            ErrorCode::EnvironmentVariableNotFound => (
                "ENVIRONMENT_VARIABLE_NOT_FOUND",
                "Environment variable not found.",
                StatusCode::INTERNAL_SERVER_ERROR,
                Severity::Error,
            ),
            ErrorCode::ValidationRegistration => (
                "VALIDATION_REGISTRATION_ERROR",
                "The validator domain specific registration failed.",
                StatusCode::INTERNAL_SERVER_ERROR,
                Severity::Fatal,
            ),
            ErrorCode::Generic => (
                "GENERIC_ERROR",
                "An unexpected error occurred.",
                StatusCode::INTERNAL_SERVER_ERROR,
                Severity::Error,
            ),
        };

        TaxonomyEntry {
            code,
            message,
            status,
            severity,
        }
    }

    /// Wire name of the code.
    pub const fn as_str(self) -> &'static str {
        self.entry().code
    }

    /// Resolve a wire name. Unknown names degrade to [`ErrorCode::Generic`].
    pub fn lookup(code: &str) -> ErrorCode {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == code)
            .unwrap_or(ErrorCode::Generic)
    }

    /// Create a classified error for this code.
    pub fn new_error(self, details: Option<Value>, cause: Option<BoxError>) -> ClassifiedError {
        ClassifiedError {
            code: self,
            details,
            cause,
        }
    }

    /// Shorthand for an error with neither details nor cause.
    pub fn error(self) -> ClassifiedError {
        self.new_error(None, None)
    }

    /// Shorthand for an error whose details are a single message.
    pub fn with_detail(self, detail: impl Into<String>) -> ClassifiedError {
        self.new_error(Some(Value::String(detail.into())), None)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// =============================================================================
// Classified error
// =============================================================================

/// Error instance built from a taxonomy entry.
///
/// Serializes to the `error` member of the response envelope:
/// `{code, message, details?}`. The cause is never serialized.
#[derive(Clone)]
pub struct ClassifiedError {
    code: ErrorCode,
    details: Option<Value>,
    cause: Option<BoxError>,
}

impl ClassifiedError {
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &'static str {
        self.code.entry().message
    }

    pub fn status(&self) -> StatusCode {
        self.code.entry().status
    }

    pub fn severity(&self) -> Severity {
        self.code.entry().severity
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn cause(&self) -> Option<&BoxError> {
        self.cause.as_ref()
    }

    /// Attach an underlying cause.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }
}

impl ClassifiedError {
    fn wire(&self) -> WireError<'_> {
        WireError {
            code: self.code,
            message: self.message(),
            details: self.details.as_ref(),
        }
    }
}

impl Serialize for ClassifiedError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.wire().serialize(serializer)
    }
}

#[derive(Serialize)]
struct WireError<'a> {
    code: ErrorCode,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl fmt::Debug for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifiedError")
            .field("code", &self.code)
            .field("details", &self.details)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message())
    }
}

impl StdError for ClassifiedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl From<ValidationFailures> for ClassifiedError {
    fn from(failures: ValidationFailures) -> Self {
        validation_error(failures.into_details())
    }
}

impl From<ValidationErrorDetail> for ClassifiedError {
    fn from(detail: ValidationErrorDetail) -> Self {
        validation_error(vec![detail])
    }
}

/// `UNPROCESSABLE_ENTITY` carrying every failed rule.
pub fn validation_error(details: Vec<ValidationErrorDetail>) -> ClassifiedError {
    // Plain structs of strings; serialization cannot fail.
    let details = serde_json::to_value(details).unwrap_or(Value::Null);
    ErrorCode::UnprocessableEntity.new_error(Some(details), None)
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

/// Error envelope body, `{"error": {...}, "message": "..."}`.
#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: WireError<'a>,
    message: &'static str,
}

impl IntoResponse for ClassifiedError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.wire(),
            message: self.message(),
        };

        (self.status(), Json(body)).into_response()
    }
}
