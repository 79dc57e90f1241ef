//! HTTP response handling

use crate::error::{ApiError, Error, Result};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// A fully read HTTP response, before classification.
#[derive(Debug, Clone)]
pub struct Response {
    method: Method,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    retries_taken: u32,
    elapsed: Duration,
}

impl Response {
    /// Create a new response.
    pub fn new(
        method: Method,
        url: Url,
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            url,
            status,
            headers,
            body,
            retries_taken: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub(crate) fn with_timing(mut self, retries_taken: u32, elapsed: Duration) -> Self {
        self.retries_taken = retries_taken;
        self.elapsed = elapsed;
        self
    }

    /// Method of the request this answers.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URL of the request this answers.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Retries taken before this response arrived.
    pub fn retries_taken(&self) -> u32 {
        self.retries_taken
    }

    /// Time from the first attempt to this response.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Check if the response is successful (2xx status).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// A body with nothing but whitespace counts as no body at all.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Turn a non-2xx response into an [`ApiError`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(Error::Api(ApiError::from_response(
            self.method,
            self.url,
            self.status,
            self.headers,
            &self.body,
        )))
    }

    /// Decode the body as JSON, or `None` when the body is empty.
    pub fn json<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|source| Error::Decode {
                method: self.method.clone(),
                url: self.url.clone(),
                source,
            })
    }

    /// Copy the raw body into `sink` without decoding it.
    pub fn copy_to<W: std::io::Write + ?Sized>(&self, sink: &mut W) -> Result<()> {
        sink.write_all(&self.body)
            .and_then(|()| sink.flush())
            .map_err(|e| Error::Other(anyhow::Error::new(e).context("writing response body")))
    }

    /// Attach a parsed body, keeping the HTTP metadata.
    pub fn into_raw<T>(self, parsed: T) -> RawResponse<T> {
        RawResponse {
            parsed,
            status: self.status,
            headers: self.headers,
            retries_taken: self.retries_taken,
            elapsed: self.elapsed,
        }
    }
}

/// A decoded body together with the HTTP response it came from.
#[derive(Debug, Clone)]
pub struct RawResponse<T> {
    parsed: T,
    status: StatusCode,
    headers: HeaderMap,
    retries_taken: u32,
    elapsed: Duration,
}

impl<T> RawResponse<T> {
    /// The decoded body.
    pub fn parsed(&self) -> &T {
        &self.parsed
    }

    /// Consume and return the decoded body.
    pub fn into_parsed(self) -> T {
        self.parsed
    }

    /// HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of `x-request-id`, if the server sent one.
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
    }

    /// Retries taken before the final response.
    pub fn retries_taken(&self) -> u32 {
        self.retries_taken
    }

    /// Time from the first attempt to the final response.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Transform the parsed body, keeping the metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RawResponse<U> {
        RawResponse {
            parsed: f(self.parsed),
            status: self.status,
            headers: self.headers,
            retries_taken: self.retries_taken,
            elapsed: self.elapsed,
        }
    }

    /// Fallible [`map`](Self::map).
    pub fn try_map<U, E>(
        self,
        f: impl FnOnce(T) -> std::result::Result<U, E>,
    ) -> std::result::Result<RawResponse<U>, E> {
        Ok(RawResponse {
            parsed: f(self.parsed)?,
            status: self.status,
            headers: self.headers,
            retries_taken: self.retries_taken,
            elapsed: self.elapsed,
        })
    }
}
