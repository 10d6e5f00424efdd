//! Wire decoding stage.
//!
//! Fail-fast: the first structural problem with the body is reported as a
//! single classified error. Unknown fields are rejected by the target types
//! (`#[serde(deny_unknown_fields)]`).

use std::error::Error as StdError;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::rejection::JsonRejection,
    Json,
};
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use common::{ApiResult, ClassifiedError, ErrorCode};

/// Upper bound on a request body read by the pipeline.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Read the whole body. Bodies over [`MAX_BODY_BYTES`] are the client's fault.
pub async fn read_body(body: Body) -> ApiResult<Bytes> {
    to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        if exceeds_limit(&e) {
            ErrorCode::BadRequest
                .with_detail("Request body too large")
                .with_cause(e)
        } else {
            ErrorCode::InternalServer
                .with_detail("Failed to read request body")
                .with_cause(e)
        }
    })
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}

/// Decode `bytes` strictly into `T`.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> ApiResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ErrorCode::BadRequest.with_detail("Request body is empty"));
    }

    serde_json::from_slice::<T>(bytes).map_err(|err| classify::<T>(bytes, err))
}

fn classify<T: DeserializeOwned>(bytes: &[u8], err: serde_json::Error) -> ClassifiedError {
    let message = err.to_string();

    match err.classify() {
        Category::Syntax | Category::Eof => ErrorCode::JsonSyntax
            .with_detail(format!("Invalid JSON syntax: {message}"))
            .with_cause(err),
        Category::Data => {
            if let Some(field) = unknown_field(&message) {
                ErrorCode::JsonUnknownField
                    .with_detail(field.to_string())
                    .with_cause(err)
            } else if message.starts_with("invalid type") {
                let field = offending_field::<T>(bytes).unwrap_or_default();
                let expected = expected_type(&message).unwrap_or("unknown");
                ErrorCode::JsonTypeMismatch
                    .with_detail(format!(
                        "Invalid type for field '{field}'. Expected type {expected}."
                    ))
                    .with_cause(err)
            } else {
                body_decoding_failed(err)
            }
        }
        Category::Io => body_decoding_failed(err),
    }
}

fn body_decoding_failed(err: serde_json::Error) -> ClassifiedError {
    ErrorCode::BadRequest
        .with_detail("Body decoding failed")
        .with_cause(err)
}

/// Field named by serde's "unknown field `x`, expected ..." message.
fn unknown_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("unknown field `")?;
    rest.split('`').next()
}

/// Type named after "expected " in a serde message, without the position suffix.
fn expected_type(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once("expected ")?;
    Some(rest.split(" at line").next().unwrap_or(rest))
}

/// Path of the offending field, as reported by axum's path-tracking decoder.
fn offending_field<T: DeserializeOwned>(bytes: &[u8]) -> Option<String> {
    match Json::<T>::from_bytes(bytes) {
        Err(JsonRejection::JsonDataError(rejection)) => {
            let text = rejection.body_text();
            let located = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(&text);
            // An error at the document root carries no path
            if located.starts_with("invalid type") {
                return None;
            }
            located.split_once(": ").map(|(path, _)| path.to_string())
        }
        _ => None,
    }
}
