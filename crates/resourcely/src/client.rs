//! Main client for the Resourcely API

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use resourcely_core::retry::RetryPolicy;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth,
    config::ClientConfig,
    context::Context,
    error::{Error, Result},
    http::Transport,
    resources::{
        BlueprintTemplates, Blueprints, ContextQuestions, EntityService, GlobalValues, Guardrails,
        SystemService,
    },
};

/// Client for the Resourcely API.
///
/// Cheap to clone: every clone and every entity service shares one
/// [`Transport`].
///
/// # Example
///
/// ```rust,no_run
/// use resourcely::{Client, Context};
///
/// # async fn example() -> resourcely::Result<()> {
/// let client = Client::builder()
///     .host("api.resourcely.io")
///     .auth_token("eyJ...")
///     .build()?;
///
/// let ctx = Context::background();
/// client.check(&ctx).await?;
/// let blueprint = client.blueprints().get_by_series_id(&ctx, "0c8d...").await?;
/// println!("{} v{}", blueprint.fields.name, blueprint.version);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    transport: Arc<Transport>,

    blueprints: OnceLock<Blueprints>,
    blueprint_templates: OnceLock<BlueprintTemplates>,
    context_questions: OnceLock<ContextQuestions>,
    guardrails: OnceLock<Guardrails>,
    global_values: OnceLock<GlobalValues>,
    system: OnceLock<SystemService>,
}

impl Client {
    /// Start building a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from a configuration object.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::from_transport(Transport::new(&config)?))
    }

    /// Create a client on an already built transport.
    pub fn from_transport(transport: Transport) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport: Arc::new(transport),
                blueprints: OnceLock::new(),
                blueprint_templates: OnceLock::new(),
                context_questions: OnceLock::new(),
                guardrails: OnceLock::new(),
                global_values: OnceLock::new(),
                system: OnceLock::new(),
            }),
        }
    }

    /// Build a client, require a healthy API, and enforce the tenant
    /// allow-list when it is non-empty.
    ///
    /// This is the startup sequence a host runs once before serving any
    /// operation; every failure here is fatal for the host.
    pub async fn connect(
        config: ClientConfig,
        ctx: &Context,
        allowed_tenants: &[impl AsRef<str>],
    ) -> Result<Self> {
        let client = Self::from_config(config)?;
        client.check(ctx).await?;
        if !allowed_tenants.is_empty() {
            client.ensure_tenant_allowed(allowed_tenants)?;
        }
        Ok(client)
    }

    /// The shared transport.
    pub fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    /// Blueprint operations.
    pub fn blueprints(&self) -> &Blueprints {
        self.inner
            .blueprints
            .get_or_init(|| EntityService::new(Arc::clone(&self.inner.transport)))
    }

    /// Blueprint template operations.
    pub fn blueprint_templates(&self) -> &BlueprintTemplates {
        self.inner
            .blueprint_templates
            .get_or_init(|| EntityService::new(Arc::clone(&self.inner.transport)))
    }

    /// Context question operations.
    pub fn context_questions(&self) -> &ContextQuestions {
        self.inner
            .context_questions
            .get_or_init(|| EntityService::new(Arc::clone(&self.inner.transport)))
    }

    /// Guardrail operations.
    pub fn guardrails(&self) -> &Guardrails {
        self.inner
            .guardrails
            .get_or_init(|| EntityService::new(Arc::clone(&self.inner.transport)))
    }

    /// Global value operations.
    pub fn global_values(&self) -> &GlobalValues {
        self.inner
            .global_values
            .get_or_init(|| EntityService::new(Arc::clone(&self.inner.transport)))
    }

    /// `system/*` endpoints.
    pub fn system(&self) -> &SystemService {
        self.inner
            .system
            .get_or_init(|| SystemService::new(Arc::clone(&self.inner.transport)))
    }

    /// Fail unless the API reports itself healthy.
    pub async fn check(&self, ctx: &Context) -> Result<()> {
        let health = self.system().health(ctx).await?;
        if !health.is_ok() {
            return Err(Error::Unhealthy {
                status: health.status,
            });
        }
        Ok(())
    }

    /// Tenant named in the auth token. The token is not verified.
    pub fn tenant(&self) -> Result<String> {
        let token = self
            .inner
            .transport
            .auth_token()
            .ok_or_else(|| Error::InvalidToken("no auth token configured".to_string()))?;
        auth::tenant_from_token(token.expose_secret())
    }

    /// Fail unless the token's tenant is in `allowed`, ignoring ASCII case.
    pub fn ensure_tenant_allowed(&self, allowed: &[impl AsRef<str>]) -> Result<()> {
        auth::ensure_tenant_allowed(&self.tenant()?, allowed)
    }
}

/// Builder for creating a configured [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Start from an existing configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the API host. The scheme defaults to `https`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = Some(host.into());
        self
    }

    /// Set the bearer token.
    pub fn auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.config.auth_token = Some(SecretString::new(auth_token.into().into_boxed_str()));
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

    /// Override the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add a custom default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        let key: http::HeaderName = key_str
            .parse()
            .map_err(|_| Error::InvalidHeaderName(key_str.clone()))?;
        let value: http::HeaderValue = value_str
            .parse()
            .map_err(|_| Error::InvalidHeaderValue(value_str.clone()))?;

        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Use an existing `reqwest` client (and its connection pool).
    pub fn http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Build the client with the configured options.
    pub fn build(self) -> Result<Client> {
        let transport = match self.http_client {
            Some(http_client) => Transport::with_http_client(&self.config, http_client)?,
            None => Transport::new(&self.config)?,
        };
        Ok(Client::from_transport(transport))
    }
}
