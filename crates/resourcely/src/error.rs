//! Error types for the Resourcely client
//!
//! Every failure is returned to the caller as a value. Non-2xx responses are
//! classified into a single structured [`ApiError`]; everything else (network
//! failures, cancellation, decoding problems, configuration mistakes) gets its
//! own [`Error`] variant.

use http::{HeaderMap, Method, StatusCode};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Result type alias for operations that can fail with a Resourcely error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Resourcely client.
#[derive(Debug, Error)]
pub enum Error {
    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Network or connection error, after retries were exhausted.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single attempt exceeded the configured HTTP timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The caller's context was cancelled.
    #[error("context canceled")]
    Cancelled,

    /// The caller's context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// A 2xx response body could not be decoded into the expected type.
    #[error("Failed to decode {method} {url} response body: {source}")]
    Decode {
        /// Request method
        method: Method,
        /// Request URL
        url: Url,
        /// Underlying decoder error
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx response carried no body where a record was required.
    #[error("Empty response body from {method} {url}")]
    EmptyBody {
        /// Request method
        method: Method,
        /// Request URL
        url: Url,
    },

    /// A secondary-key lookup matched more than one record.
    #[error("Found {matches} {kind} with key '{key}'. Expected just one.")]
    AmbiguousKey {
        /// Entity kind that was queried
        kind: &'static str,
        /// The key that was looked up
        key: String,
        /// Number of matches the server reported
        matches: usize,
        /// Best-effort first match, by series id
        first: Box<crate::types::GlobalValue>,
    },

    /// The health endpoint reported something other than "ok".
    #[error("system/health: available: {status}")]
    Unhealthy {
        /// Status string returned by the server
        status: String,
    },

    /// The auth token could not be introspected.
    #[error("Error parsing Resourcely auth token: {0}")]
    InvalidToken(String),

    /// The token's tenant is not in the allow-list.
    #[error("Resourcely tenant not allowed: {tenant}. Allowed tenants are {allowed:?}")]
    TenantNotAllowed {
        /// Tenant named in the token
        tenant: String,
        /// Tenants the host accepts
        allowed: Vec<String>,
    },

    /// Malformed JSON handed to an equivalence check.
    #[error(transparent)]
    InvalidJson(#[from] resourcely_core::json::JsonError),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP client configuration or initialization error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Request body serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or malformed configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid HTTP header name.
    #[error("Invalid HTTP header name: {0}")]
    InvalidHeaderName(String),

    /// Invalid HTTP header value.
    #[error("Invalid HTTP header value: {0}")]
    InvalidHeaderValue(String),

    /// Other errors not covered by specific variants.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// HTTP status of the response that caused this error, if there was one.
    ///
    /// Callers use this to tell "not found" apart during drift detection.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(api) => Some(api.status),
            _ => None,
        }
    }

    /// `true` when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// `true` for [`Error::Cancelled`] and [`Error::DeadlineExceeded`].
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }

    /// Server-side request id, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Api(api) => api.request_id(),
            _ => None,
        }
    }

    /// The record kept from an ambiguous key lookup.
    pub fn ambiguous_first(&self) -> Option<&crate::types::GlobalValue> {
        match self {
            Error::AmbiguousKey { first, .. } => Some(first.as_ref()),
            _ => None,
        }
    }

    /// The structured error, if this is an API error.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }
}

/// The uniform JSON shape the API uses to report failures.
///
/// Every field defaults when missing so that a partially valid body still
/// yields what it can.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ErrorEnvelope {
    /// Status code as reported in the body
    pub status: u32,
    /// Server request id
    pub request_id: String,
    /// Human-readable messages; `null` reads as none
    #[serde(deserialize_with = "crate::types::null_as_default")]
    pub errors: Vec<String>,
    /// Path of the failing request, as the server saw it
    pub request_path: String,
    /// Server application version
    pub app_version: String,
}

impl ErrorEnvelope {
    /// The envelope synthesized for authentication failures.
    pub fn unauthorized() -> Self {
        Self {
            status: 401,
            errors: vec!["Unauthorized".to_string()],
            ..Default::default()
        }
    }
}

/// Structured error for a non-2xx response.
///
/// Carries the request that failed alongside the response metadata, so the
/// display form is enough to correlate with server-side logs.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// HTTP status of the response
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Decoded error body
    pub envelope: ErrorEnvelope,
}

impl ApiError {
    /// Classify a non-2xx response.
    ///
    /// A 401 never looks at the body: authentication layers in front of the
    /// API return arbitrary content, so a fixed "Unauthorized" envelope is
    /// used. Any other status gets a best-effort decode of the envelope; if
    /// that fails the envelope stays empty but the status is kept.
    pub fn from_response(
        method: Method,
        url: Url,
        status: StatusCode,
        headers: HeaderMap,
        body: &[u8],
    ) -> Self {
        let envelope = if status == StatusCode::UNAUTHORIZED {
            ErrorEnvelope::unauthorized()
        } else {
            serde_json::from_slice(body).unwrap_or_default()
        };

        Self {
            method,
            url,
            status,
            headers,
            envelope,
        }
    }

    /// Server request id from the body, falling back to `x-request-id`.
    pub fn request_id(&self) -> Option<&str> {
        if !self.envelope.request_id.is_empty() {
            return Some(&self.envelope.request_id);
        }
        self.headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
    }

    /// Server-supplied messages.
    pub fn errors(&self) -> &[String] {
        &self.envelope.errors
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: [{}] {} - {}",
            self.method,
            self.url,
            self.status.as_u16(),
            self.request_id().unwrap_or_default(),
            self.envelope.errors.join(", ")
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn url() -> Url {
        "https://api.resourcely.io/api/v1/blueprints/series/abc"
            .parse()
            .unwrap()
    }

    fn classify(status: u16, body: &str) -> ApiError {
        ApiError::from_response(
            Method::GET,
            url(),
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            body.as_bytes(),
        )
    }

    #[test]
    fn test_401_ignores_body() {
        let error = classify(401, "<html>login required</html>");
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.envelope, ErrorEnvelope::unauthorized());
        assert_eq!(error.errors(), ["Unauthorized"]);
    }

    #[test]
    fn test_401_ignores_even_a_valid_envelope() {
        let error = classify(401, r#"{"status":401,"errors":["token expired"]}"#);
        assert_eq!(error.errors(), ["Unauthorized"]);
    }

    #[test]
    fn test_422_envelope_decoded_exactly() {
        let body = r#"{
            "status": 422,
            "request_id": "req-123",
            "errors": ["name is required", "content is invalid"],
            "request_path": "/api/v1/blueprints",
            "app_version": "1.42.0"
        }"#;
        let error = classify(422, body);

        assert_eq!(
            error.envelope,
            ErrorEnvelope {
                status: 422,
                request_id: "req-123".to_string(),
                errors: vec![
                    "name is required".to_string(),
                    "content is invalid".to_string()
                ],
                request_path: "/api/v1/blueprints".to_string(),
                app_version: "1.42.0".to_string(),
            }
        );
    }

    #[test]
    fn test_undecodable_body_keeps_status() {
        let error = classify(502, "Bad Gateway");
        assert_eq!(error.status, StatusCode::BAD_GATEWAY);
        assert_eq!(error.envelope, ErrorEnvelope::default());
    }

    #[test]
    fn test_empty_body_keeps_status() {
        let error = classify(404, "");
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert!(error.errors().is_empty());
    }

    #[test]
    fn test_null_errors_keep_other_fields() {
        let error = classify(
            404,
            r#"{"status":404,"request_id":"req-7","errors":null,"request_path":"/api/v1/blueprints/series/abc","app_version":"1.2.3"}"#,
        );
        assert_eq!(error.envelope.status, 404);
        assert_eq!(error.request_id(), Some("req-7"));
        assert!(error.errors().is_empty());
        assert_eq!(error.envelope.app_version, "1.2.3");
        assert_eq!(
            error.to_string(),
            "GET https://api.resourcely.io/api/v1/blueprints/series/abc: [404] req-7 - "
        );
    }

    #[test]
    fn test_partial_envelope() {
        let error = classify(409, r#"{"errors": ["version conflict"]}"#);
        assert_eq!(error.errors(), ["version conflict"]);
        assert_eq!(error.envelope.request_id, "");
    }

    #[test]
    fn test_display_format() {
        let error = classify(
            422,
            r#"{"request_id": "req-9", "errors": ["a", "b"]}"#,
        );
        assert_eq!(
            error.to_string(),
            "GET https://api.resourcely.io/api/v1/blueprints/series/abc: [422] req-9 - a, b"
        );
    }

    #[test]
    fn test_request_id_header_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "hdr-1".parse().unwrap());
        let error = ApiError::from_response(
            Method::DELETE,
            url(),
            StatusCode::INTERNAL_SERVER_ERROR,
            headers,
            b"oops",
        );
        assert_eq!(error.request_id(), Some("hdr-1"));
    }

    #[test]
    fn test_error_accessors() {
        let error = Error::from(classify(404, ""));
        assert!(error.is_not_found());
        assert_eq!(error.status(), Some(StatusCode::NOT_FOUND));
        assert!(!error.is_cancellation());

        assert!(Error::Cancelled.is_cancellation());
        assert!(Error::DeadlineExceeded.is_cancellation());
        assert_eq!(Error::Cancelled.status(), None);
        assert_eq!(Error::Cancelled.to_string(), "context canceled");
    }

    #[test]
    fn test_ambiguous_key_message() {
        let error = Error::AmbiguousKey {
            kind: "global values",
            key: "regions".to_string(),
            matches: 2,
            first: Box::default(),
        };
        assert_eq!(
            error.to_string(),
            "Found 2 global values with key 'regions'. Expected just one."
        );
    }
}
