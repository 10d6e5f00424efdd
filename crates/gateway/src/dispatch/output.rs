//! What a wrapped handler hands back to the dispatcher.

use common::{ApiResponse, ApiResult, ClassifiedError, Params};

/// Envelope and error returned by a handler. Either side may be absent.
#[derive(Debug)]
pub struct HandlerOutput<T> {
    pub(crate) envelope: Option<ApiResponse<T>>,
    pub(crate) error: Option<ClassifiedError>,
}

impl<T> HandlerOutput<T> {
    pub fn success(envelope: ApiResponse<T>) -> Self {
        Self {
            envelope: Some(envelope),
            error: None,
        }
    }

    /// Failed request; `envelope` is turned into the error envelope.
    pub fn failure(envelope: ApiResponse<T>, error: ClassifiedError) -> Self {
        Self {
            envelope: Some(envelope.with_error(error.clone())),
            error: Some(error),
        }
    }

    /// Error without an envelope. The dispatcher builds one.
    pub fn error_only(error: ClassifiedError) -> Self {
        Self {
            envelope: None,
            error: Some(error),
        }
    }

    /// Neither side present. Always a handler defect.
    pub fn empty() -> Self {
        Self {
            envelope: None,
            error: None,
        }
    }

    /// Lift a handler result, echoing `params` on failure.
    pub fn from_result(params: Option<Params>, result: ApiResult<ApiResponse<T>>) -> Self {
        match result {
            Ok(envelope) => Self::success(envelope),
            Err(error) => Self::failure(ApiResponse::new(params, None, None), error),
        }
    }

    pub fn envelope(&self) -> Option<&ApiResponse<T>> {
        self.envelope.as_ref()
    }

    pub fn error(&self) -> Option<&ClassifiedError> {
        self.error.as_ref()
    }
}
