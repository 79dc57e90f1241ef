//! Configuration for the Resourcely client

use http::HeaderMap;
use resourcely_core::retry::RetryPolicy;
use secrecy::SecretString;
use std::time::Duration;

/// Configuration for the Resourcely client.
///
/// Constructed once at startup and handed to [`Client::from_config`]; the
/// transport built from it is read-only afterwards.
///
/// [`Client::from_config`]: crate::Client::from_config
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API host, e.g. `https://api.resourcely.io`. The scheme defaults to
    /// `https` when omitted.
    pub host: Option<String>,

    /// Bearer token sent in the `Authorization` header
    pub auth_token: Option<SecretString>,

    /// Versioned path prefix every request is made under
    pub base_path: String,

    /// Value of the `User-Agent` header
    pub user_agent: String,

    /// Timeout for a single HTTP attempt
    pub timeout: Duration,

    /// Retry policy for transient failures
    pub retry: RetryPolicy,

    /// Custom headers to include with every request
    pub default_headers: HeaderMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: None,
            auth_token: None,
            base_path: crate::DEFAULT_BASE_PATH.to_string(),
            user_agent: crate::default_user_agent(),
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            default_headers: HeaderMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration for a host and auth token.
    pub fn new(host: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            auth_token: Some(SecretString::new(auth_token.into().into_boxed_str())),
            ..Default::default()
        }
    }

    /// Start building a configuration.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    /// This will look for:
    /// - `RESOURCELY_HOST` for the API host
    /// - `RESOURCELY_AUTH_TOKEN` for authentication
    /// - `RESOURCELY_TIMEOUT` for the per-attempt timeout (in seconds)
    /// - `RESOURCELY_MAX_RETRIES` for the maximum number of retries
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self, crate::error::Error> {
        use resourcely_core::retry::ExponentialBackoff;
        use std::env;

        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(host) = env::var("RESOURCELY_HOST") {
            config.host = Some(host);
        }

        if let Ok(auth_token) = env::var("RESOURCELY_AUTH_TOKEN") {
            config.auth_token = Some(SecretString::new(auth_token.into_boxed_str()));
        }

        if let Ok(timeout_str) = env::var("RESOURCELY_TIMEOUT") {
            let secs = timeout_str.parse::<u64>().map_err(|_| {
                crate::error::Error::Config(format!(
                    "RESOURCELY_TIMEOUT must be a number of seconds, got '{}'",
                    timeout_str
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Ok(max_retries_str) = env::var("RESOURCELY_MAX_RETRIES") {
            let max_retries = max_retries_str.parse::<u32>().map_err(|_| {
                crate::error::Error::Config(format!(
                    "RESOURCELY_MAX_RETRIES must be a non-negative integer, got '{}'",
                    max_retries_str
                ))
            })?;
            let backoff = config.retry.backoff();
            config.retry = RetryPolicy::new(
                ExponentialBackoff::builder()
                    .max_retries(max_retries)
                    .initial_delay(backoff.initial_delay())
                    .max_delay(backoff.max_delay())
                    .build(),
            );
        }

        Ok(config)
    }

    /// Merge this configuration with another, with the other taking precedence.
    ///
    /// Plain values (timeout, retry policy, base path, user agent) are taken
    /// from `other` only when they differ from the defaults.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        let defaults = ClientConfig::default();

        if other.host.is_some() {
            self.host = other.host;
        }
        if other.auth_token.is_some() {
            self.auth_token = other.auth_token;
        }
        if other.base_path != defaults.base_path {
            self.base_path = other.base_path;
        }
        if other.user_agent != defaults.user_agent {
            self.user_agent = other.user_agent;
        }
        if other.timeout != defaults.timeout {
            self.timeout = other.timeout;
        }
        if other.retry != defaults.retry {
            self.retry = other.retry;
        }
        for (key, value) in other.default_headers.iter() {
            self.default_headers.insert(key.clone(), value.clone());
        }

        self
    }
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = Some(host.into());
        self
    }

    /// Set the auth token.
    pub fn auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.config.auth_token = Some(SecretString::new(auth_token.into().into_boxed_str()));
        self
    }

    /// Set the versioned base path.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.config.base_path = base_path.into();
        self
    }

    /// Override the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> crate::Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        let key: http::HeaderName = key_str
            .parse()
            .map_err(|_| crate::Error::InvalidHeaderName(key_str.clone()))?;
        let value: http::HeaderValue = value_str
            .parse()
            .map_err(|_| crate::Error::InvalidHeaderValue(value_str.clone()))?;

        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resourcely_core::retry::{BackoffStrategy, ExponentialBackoff};
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.base_path, "api/v1");
        assert!(config.user_agent.starts_with("resourcely-rust/"));
        assert!(config.host.is_none());
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfigBuilder::new()
            .host("https://example.com")
            .auth_token("token")
            .timeout(Duration::from_secs(30))
            .retry(RetryPolicy::never())
            .build();

        assert_eq!(config.host.as_deref(), Some("https://example.com"));
        assert_eq!(config.auth_token.unwrap().expose_secret(), "token");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_retries(), 0);
    }

    #[test]
    fn test_invalid_default_header() {
        let result = ClientConfigBuilder::new().default_header("bad header", "value");
        assert!(matches!(result, Err(crate::Error::InvalidHeaderName(_))));
    }

    #[test]
    fn test_config_merge() {
        let base = ClientConfig::new("https://a.example.com", "token-a");
        let overlay = ClientConfigBuilder::new()
            .host("https://b.example.com")
            .timeout(Duration::from_secs(5))
            .default_header("x-team", "platform")
            .unwrap()
            .build();

        let merged = base.merge(overlay);
        assert_eq!(merged.host.as_deref(), Some("https://b.example.com"));
        assert_eq!(merged.auth_token.unwrap().expose_secret(), "token-a");
        assert_eq!(merged.timeout, Duration::from_secs(5));
        assert!(merged.default_headers.contains_key("x-team"));
    }

    #[test]
    fn test_merge_keeps_non_default_retry() {
        let base = ClientConfigBuilder::new()
            .retry(RetryPolicy::new(
                ExponentialBackoff::builder().max_retries(9).build(),
            ))
            .build();
        let merged = base.merge(ClientConfig::default());
        assert_eq!(merged.retry.max_retries(), 9);
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("RESOURCELY_HOST", Some("https://env.example.com")),
                ("RESOURCELY_AUTH_TOKEN", Some("env-token")),
                ("RESOURCELY_TIMEOUT", Some("15")),
                ("RESOURCELY_MAX_RETRIES", Some("1")),
            ],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.host.as_deref(), Some("https://env.example.com"));
                assert_eq!(config.auth_token.unwrap().expose_secret(), "env-token");
                assert_eq!(config.timeout, Duration::from_secs(15));
                assert_eq!(config.retry.max_retries(), 1);
            },
        );
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_from_env_rejects_bad_timeout() {
        temp_env::with_vars(
            [
                ("RESOURCELY_HOST", Some("https://env.example.com")),
                ("RESOURCELY_TIMEOUT", Some("soon")),
            ],
            || {
                assert!(ClientConfig::from_env().is_err());
            },
        );
    }
}
