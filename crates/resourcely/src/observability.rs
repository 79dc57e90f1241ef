//! Structured diagnostics for HTTP traffic
//!
//! Every request made by the transport is described here at `debug` level.
//! Failures are returned to the caller, never reported by logging; these
//! events only help while reading a trace.

use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path
    pub path: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body_size: None,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log the outgoing request
    pub fn log_sending(&self) {
        debug!(
            method = %self.method,
            path = %self.path,
            body_size = self.body_size,
            "Sending Resourcely request"
        );
    }
}

/// HTTP response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// Time from first attempt to final response
    pub elapsed: Duration,
    /// Response body size in bytes
    pub body_size: usize,
    /// Retries taken before this response
    pub retries: u32,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: u16, elapsed: Duration) -> Self {
        Self {
            status,
            elapsed,
            body_size: 0,
            retries: 0,
        }
    }

    /// Set the response body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = size;
        self
    }

    /// Set the retry count
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Log the completed exchange
    pub fn log_completed(&self, request: &RequestMetadata) {
        debug!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            body_size = self.body_size,
            retries = self.retries,
            "Resourcely request completed"
        );
    }

    /// Whether [`log_error_body`](Self::log_error_body) records anything.
    ///
    /// Only non-2xx bodies are logged, except 401 bodies: those come from
    /// the auth layer and are never decoded.
    pub fn logs_error_body(&self) -> bool {
        !(200..300).contains(&self.status) && self.status != 401
    }

    /// Log a non-2xx response body at trace level
    pub fn log_error_body(&self, request: &RequestMetadata, body: &[u8]) {
        if !self.logs_error_body() {
            return;
        }
        trace!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            body = %String::from_utf8_lossy(body),
            "Non-2xx response body"
        );
    }
}

/// Timer for measuring request duration
#[derive(Debug)]
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_metadata_creation() {
        let metadata = RequestMetadata::new("PUT", "api/v1/blueprints");
        assert_eq!(metadata.method, "PUT");
        assert_eq!(metadata.path, "api/v1/blueprints");
        assert_eq!(metadata.body_size, None);

        let metadata = metadata.with_body_size(512);
        assert_eq!(metadata.body_size, Some(512));
    }

    #[test]
    fn test_response_metadata_builders() {
        let metadata = ResponseMetadata::new(200, Duration::from_millis(40))
            .with_body_size(128)
            .with_retries(2);
        assert_eq!(metadata.status, 200);
        assert_eq!(metadata.body_size, 128);
        assert_eq!(metadata.retries, 2);
    }

    #[test]
    fn test_error_body_logging_skips_success_and_unauthorized() {
        let at = |status| ResponseMetadata::new(status, Duration::ZERO).logs_error_body();
        assert!(!at(200));
        assert!(!at(204));
        assert!(!at(401));
        assert!(at(404));
        assert!(at(422));
        assert!(at(503));
    }

    #[test]
    fn test_request_timer() {
        let timer = RequestTimer::start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed() >= Duration::from_millis(5));
    }
}
