//! Per-call observer contract.
//!
//! One event instance is created at the start of each request (by the
//! config's factory, or [`NoopEvent`] when none is set) and follows that
//! single call through its lifecycle. Callbacks fire in a fixed order:
//! `request_start`, `request_read`*, `response_header`, `response_read`*,
//! `response_finish`, and optionally `response_check`. Instances are never
//! shared across calls.

use tracing::info;

use crate::error::ClientError;

/// Observer for a single request/response lifecycle.
///
/// All methods have no-op defaults, so implementations only override the
/// phases they care about.
pub trait RestEvent: Send {
    /// Called once before the request is issued.
    fn request_start(&mut self, _method: &str, _url: &str) {}

    /// Called with request body bytes as they are handed to the transport.
    fn request_read(&mut self, _data: &[u8]) {}

    /// Called once when response headers arrive.
    fn response_header(&mut self, _status: u16, _headers: &reqwest::header::HeaderMap) {}

    /// Called with response body bytes as they are read.
    fn response_read(&mut self, _data: &[u8]) {}

    /// Called exactly once when the body is fully read or the call fails.
    fn response_finish(&mut self, _err: Option<&ClientError>) {}

    /// Called exactly once when the body is materialized and validated.
    fn response_check(&mut self, _err: Option<&ClientError>) {}
}

/// Default event handler that observes nothing.
#[derive(Debug, Default)]
pub struct NoopEvent;

impl RestEvent for NoopEvent {}

/// Event handler that accumulates the whole exchange and emits one
/// structured log line when the call finishes.
#[derive(Debug, Default)]
pub struct TraceEvent {
    method: String,
    url: String,
    status: u16,
    request: Vec<u8>,
    response: Vec<u8>,
}

impl TraceEvent {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RestEvent for TraceEvent {
    fn request_start(&mut self, method: &str, url: &str) {
        self.method = method.to_string();
        self.url = url.to_string();
    }

    fn request_read(&mut self, data: &[u8]) {
        self.request.extend_from_slice(data);
    }

    fn response_header(&mut self, status: u16, _headers: &reqwest::header::HeaderMap) {
        self.status = status;
    }

    fn response_read(&mut self, data: &[u8]) {
        self.response.extend_from_slice(data);
    }

    fn response_finish(&mut self, err: Option<&ClientError>) {
        info!(
            method = %self.method,
            url = %self.url,
            status = self.status,
            request = %String::from_utf8_lossy(&self.request),
            response = %String::from_utf8_lossy(&self.response),
            error = err.map(|e| e.to_string()),
            "rest call finished"
        );
    }
}
