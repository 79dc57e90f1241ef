//! HTTP request builder

use super::Response;
use crate::error::{Error, Result};
use crate::observability::{RequestMetadata, RequestTimer, ResponseMetadata};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use resourcely_core::retry::{RetryDecision, RetryPolicy, retry};
use std::time::Duration;
use url::Url;

/// Builder for a single logical request, possibly sent several times.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    timeout: Duration,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set a header, replacing any previous value.
    pub fn header(mut self, key: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Try to set a header from strings.
    ///
    /// # Errors
    /// Returns an error if the header name or value contains invalid characters.
    pub fn try_header(self, key: &str, value: &str) -> Result<Self> {
        let key = key
            .parse::<HeaderName>()
            .map_err(|_| Error::InvalidHeaderName(key.to_string()))?;
        let value = value
            .parse::<HeaderValue>()
            .map_err(|_| Error::InvalidHeaderValue(value.to_string()))?;
        Ok(self.header(key, value))
    }

    /// Add every header in `headers`, replacing existing values.
    pub fn headers(mut self, headers: &HeaderMap) -> Self {
        for (key, value) in headers {
            self.headers.insert(key.clone(), value.clone());
        }
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the headers.
    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the body, if one was set.
    pub fn body_bytes(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Send the request, retrying transient failures under `policy`.
    ///
    /// The response is returned whatever its status; classification is the
    /// caller's job. Only transport failures that outlive the retry policy
    /// come back as errors.
    pub async fn send(&self, client: &reqwest::Client, policy: &RetryPolicy) -> Result<Response> {
        let metadata = RequestMetadata::new(self.method.as_str(), self.url.path())
            .with_body_size(self.body.as_ref().map_or(0, Bytes::len));
        metadata.log_sending();

        let timer = RequestTimer::start();
        let max_delay = policy.backoff().max_delay();
        let outcome = retry(
            policy,
            || self.attempt(client),
            |outcome| classify(policy, max_delay, outcome),
        )
        .await;

        let response = outcome.value?.with_timing(outcome.retries, timer.elapsed());

        let response_metadata = ResponseMetadata::new(response.status().as_u16(), response.elapsed())
            .with_body_size(response.body().len())
            .with_retries(response.retries_taken());
        response_metadata.log_completed(&metadata);
        response_metadata.log_error_body(&metadata, response.body());

        Ok(response)
    }

    async fn attempt(&self, client: &reqwest::Client) -> Result<Response> {
        let mut request = client
            .request(self.method.clone(), self.url.clone())
            .timeout(self.timeout)
            .headers(self.headers.clone());

        if let Some(body) = &self.body {
            request = request.body(body.clone());
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(Response::new(
            self.method.clone(),
            self.url.clone(),
            status,
            headers,
            body,
        ))
    }
}

fn classify(policy: &RetryPolicy, max_delay: Duration, outcome: &Result<Response>) -> RetryDecision {
    match outcome {
        Ok(response) if policy.is_retryable_status(response.status().as_u16()) => {
            match retry_after(response.status(), response.headers(), Utc::now()) {
                Some(delay) => RetryDecision::RetryAfter(delay.min(max_delay)),
                None => RetryDecision::Retry,
            }
        }
        Ok(_) => RetryDecision::Stop,
        Err(Error::Connection(_) | Error::Timeout(_)) => RetryDecision::Retry,
        Err(_) => RetryDecision::Stop,
    }
}

fn transport_error(error: reqwest::Error) -> Error {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(&error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    if error.is_timeout() {
        Error::Timeout(message)
    } else {
        Error::Connection(message)
    }
}

/// Delay requested by a `Retry-After` header on a 429 or 503.
///
/// Accepts both forms the header allows: a number of seconds or an
/// HTTP-date. A date in the past means retry immediately.
pub(crate) fn retry_after(
    status: StatusCode,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> Option<Duration> {
    if status != StatusCode::TOO_MANY_REQUESTS && status != StatusCode::SERVICE_UNAVAILABLE {
        return None;
    }

    let value = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::RETRY_AFTER, value.parse().unwrap());
        headers
    }

    #[rstest]
    #[case(StatusCode::TOO_MANY_REQUESTS, "3", Some(Duration::from_secs(3)))]
    #[case(StatusCode::SERVICE_UNAVAILABLE, " 10 ", Some(Duration::from_secs(10)))]
    #[case(StatusCode::BAD_GATEWAY, "3", None)]
    #[case(StatusCode::TOO_MANY_REQUESTS, "soon", None)]
    fn test_retry_after_seconds(
        #[case] status: StatusCode,
        #[case] value: &str,
        #[case] expected: Option<Duration>,
    ) {
        assert_eq!(retry_after(status, &headers_with(value), Utc::now()), expected);
    }

    #[test]
    fn test_retry_after_http_date() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 27, 30).unwrap();
        let delay = retry_after(
            StatusCode::TOO_MANY_REQUESTS,
            &headers_with("Wed, 21 Oct 2015 07:28:00 GMT"),
            now,
        );
        assert_eq!(delay, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_retry_after_date_in_past_is_zero() {
        let now = Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap();
        let delay = retry_after(
            StatusCode::SERVICE_UNAVAILABLE,
            &headers_with("Wed, 21 Oct 2015 07:28:00 GMT"),
            now,
        );
        assert_eq!(delay, Some(Duration::ZERO));
    }

    #[test]
    fn test_retry_after_missing() {
        assert_eq!(
            retry_after(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new(), Utc::now()),
            None
        );
    }

    #[test]
    fn test_classify_transport_errors() {
        let policy = RetryPolicy::default();
        let max = Duration::from_secs(30);

        let connection: Result<Response> = Err(Error::Connection("reset".to_string()));
        assert_eq!(classify(&policy, max, &connection), RetryDecision::Retry);

        let cancelled: Result<Response> = Err(Error::Cancelled);
        assert_eq!(classify(&policy, max, &cancelled), RetryDecision::Stop);
    }

    #[test]
    fn test_try_header_rejects_invalid_name() {
        let url: Url = "https://api.resourcely.io".parse().unwrap();
        let result = RequestBuilder::new(Method::GET, url).try_header("bad header", "x");
        assert!(matches!(result, Err(Error::InvalidHeaderName(_))));
    }
}
