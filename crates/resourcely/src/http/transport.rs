//! Authenticated JSON transport shared by every entity service

use super::{RawResponse, RequestBuilder, Response};
use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::{Error, Result};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method};
use resourcely_core::retry::RetryPolicy;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const DEFAULT_SCHEME: &str = "https";

fn application_json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

/// One long-lived HTTP configuration: base URL, credentials, retry policy.
///
/// Immutable after construction and shared by reference between all entity
/// services. Paths handed to its methods are relative to the base path, so
/// `get(ctx, "blueprints/series/abc", &[])` requests
/// `https://<host>/api/v1/blueprints/series/abc`.
#[derive(Debug, Clone)]
pub struct Transport {
    http_client: reqwest::Client,
    base_url: Url,
    base_path: String,
    user_agent: HeaderValue,
    auth_token: Option<SecretString>,
    timeout: Duration,
    retry: RetryPolicy,
    default_headers: HeaderMap,
}

impl Transport {
    /// Build a transport with its own connection pool.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;
        Self::with_http_client(config, http_client)
    }

    /// Build a transport on top of an existing `reqwest` client.
    pub fn with_http_client(config: &ClientConfig, http_client: reqwest::Client) -> Result<Self> {
        let host = config
            .host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| Error::Config("a Resourcely host is required".to_string()))?;

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| Error::InvalidHeaderValue(config.user_agent.clone()))?;

        Ok(Self {
            http_client,
            base_url: parse_host(host)?,
            base_path: config.base_path.trim_matches('/').to_string(),
            user_agent,
            auth_token: config.auth_token.clone(),
            timeout: config.timeout,
            retry: config.retry.clone(),
            default_headers: config.default_headers.clone(),
        })
    }

    /// Scheme, host and port every request goes to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Path prefix every request is made under.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// The configured bearer token.
    pub fn auth_token(&self) -> Option<&SecretString> {
        self.auth_token.as_ref()
    }

    /// Resolve a path relative to the base path, with query parameters.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let path = path.trim_start_matches('/');
        let relative = if self.base_path.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", self.base_path, path)
        };

        let mut url = self
            .base_url
            .join(&relative)
            .map_err(|e| Error::InvalidUrl(format!("{relative}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Build an authenticated request, encoding `body` as JSON if given.
    ///
    /// `Content-Type` is only set when there is a body.
    pub fn new_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<RequestBuilder> {
        let mut request = RequestBuilder::new(method, self.endpoint(path, query)?)
            .timeout(self.timeout)
            .headers(&self.default_headers)
            .header(ACCEPT, application_json())
            .header(USER_AGENT, self.user_agent.clone());

        if let Some(token) = &self.auth_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| Error::InvalidHeaderValue("Authorization".to_string()))?;
            value.set_sensitive(true);
            request = request.header(AUTHORIZATION, value);
        }

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, application_json())
                .body(serde_json::to_vec(body)?);
        }

        Ok(request)
    }

    /// Send `request` under `ctx` and classify the response.
    ///
    /// Non-2xx responses come back as [`Error::Api`].
    pub async fn execute(&self, ctx: &Context, request: RequestBuilder) -> Result<Response> {
        ctx.run(request.send(&self.http_client, &self.retry))
            .await?
            .error_for_status()
    }

    /// `GET` and decode. An empty body decodes to `None`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<RawResponse<Option<T>>> {
        let request = self.new_request::<()>(Method::GET, path, query, None)?;
        self.decode(ctx, request).await
    }

    /// `POST` a JSON body and decode the response.
    pub async fn post<B, T>(&self, ctx: &Context, path: &str, body: &B) -> Result<RawResponse<Option<T>>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.new_request(Method::POST, path, &[], Some(body))?;
        self.decode(ctx, request).await
    }

    /// `PUT` a JSON body and decode the response.
    pub async fn put<B, T>(&self, ctx: &Context, path: &str, body: &B) -> Result<RawResponse<Option<T>>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.new_request(Method::PUT, path, &[], Some(body))?;
        self.decode(ctx, request).await
    }

    /// `PATCH` a JSON body and decode the response.
    pub async fn patch<B, T>(&self, ctx: &Context, path: &str, body: &B) -> Result<RawResponse<Option<T>>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.new_request(Method::PATCH, path, &[], Some(body))?;
        self.decode(ctx, request).await
    }

    /// `DELETE`, ignoring any response body.
    pub async fn delete(&self, ctx: &Context, path: &str) -> Result<RawResponse<()>> {
        let request = self.new_request::<()>(Method::DELETE, path, &[], None)?;
        Ok(self.execute(ctx, request).await?.into_raw(()))
    }

    /// `GET` and copy the raw body into `sink` instead of decoding it.
    pub async fn get_to_writer<W: std::io::Write + ?Sized>(
        &self,
        ctx: &Context,
        path: &str,
        query: &[(&str, &str)],
        sink: &mut W,
    ) -> Result<RawResponse<()>> {
        let request = self.new_request::<()>(Method::GET, path, query, None)?;
        let response = self.execute(ctx, request).await?;
        response.copy_to(sink)?;
        Ok(response.into_raw(()))
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        request: RequestBuilder,
    ) -> Result<RawResponse<Option<T>>> {
        let response = self.execute(ctx, request).await?;
        let parsed = response.json()?;
        Ok(response.into_raw(parsed))
    }
}

/// Parse a host, defaulting the scheme to https. The result always ends
/// in `/` so relative paths are appended rather than replacing a segment.
fn parse_host(host: &str) -> Result<Url> {
    let host = host.trim();
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("{DEFAULT_SCHEME}://{host}")
    };

    let mut url =
        Url::parse(&with_scheme).map_err(|e| Error::InvalidUrl(format!("{host}: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn transport(host: &str) -> Transport {
        Transport::new(&ClientConfig::new(host, "secret-token")).unwrap()
    }

    #[rstest]
    #[case("api.resourcely.io", "https://api.resourcely.io/api/v1/blueprints")]
    #[case("http://localhost:8080", "http://localhost:8080/api/v1/blueprints")]
    #[case("https://example.com/proxy", "https://example.com/proxy/api/v1/blueprints")]
    fn test_endpoint_resolution(#[case] host: &str, #[case] expected: &str) {
        let url = transport(host).endpoint("blueprints", &[]).unwrap();
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn test_endpoint_with_query() {
        let url = transport("api.resourcely.io")
            .endpoint("presets", &[("key", "a b"), ("page_size", "2")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.resourcely.io/api/v1/presets?key=a+b&page_size=2"
        );
    }

    #[test]
    fn test_missing_host_is_config_error() {
        let result = Transport::new(&ClientConfig::default());
        assert_matches!(result, Err(Error::Config(_)));
    }

    #[test]
    fn test_request_headers_without_body() {
        let request = transport("api.resourcely.io")
            .new_request::<()>(Method::GET, "system/health", &[], None)
            .unwrap();
        let headers = request.header_map();

        assert_eq!(headers[AUTHORIZATION], "Bearer secret-token");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[ACCEPT], "application/json");
        assert!(headers[USER_AGENT].to_str().unwrap().starts_with("resourcely-rust/"));
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(request.body_bytes().is_none());
    }

    #[test]
    fn test_request_body_is_not_html_escaped() {
        let body = serde_json::json!({ "content": "<a href=\"x\">&</a>" });
        let request = transport("api.resourcely.io")
            .new_request(Method::POST, "blueprints", &[], Some(&body))
            .unwrap();

        assert_eq!(request.header_map()[CONTENT_TYPE], "application/json");
        let sent = std::str::from_utf8(request.body_bytes().unwrap()).unwrap();
        assert_eq!(sent, r#"{"content":"<a href=\"x\">&</a>"}"#);
    }

    #[test]
    fn test_no_token_no_authorization_header() {
        let config = ClientConfig::builder().host("api.resourcely.io").build();
        let request = Transport::new(&config)
            .unwrap()
            .new_request::<()>(Method::GET, "system/health", &[], None)
            .unwrap();
        assert!(request.header_map().get(AUTHORIZATION).is_none());
    }
}
