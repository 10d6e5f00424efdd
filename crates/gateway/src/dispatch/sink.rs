//! Response sinks.
//!
//! Only the dispatcher holds a sink. `write` consumes it, so a sink answers
//! at most once.

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};
use tokio::sync::oneshot;

/// Destination of the single response of a request.
pub trait ResponseSink: Send {
    fn write(self, status: StatusCode, headers: HeaderMap, body: Vec<u8>);
}

/// Sink handing the finished response to the HTTP adapter.
#[derive(Debug)]
pub struct ChannelSink(oneshot::Sender<Response>);

impl ChannelSink {
    pub fn new(sender: oneshot::Sender<Response>) -> Self {
        Self(sender)
    }
}

impl ResponseSink for ChannelSink {
    fn write(self, status: StatusCode, headers: HeaderMap, body: Vec<u8>) {
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Receiver gone means the client went away
        let _ = self.0.send(response);
    }
}
