use std::sync::Arc;
use std::time::Duration;

use reqwest::{Request as ReqwestRequest, Response as ReqwestResponse};
use tower::{Layer, Service};

use crate::api::PartnerContext;
use crate::cache::{MemoryTokenCache, NoopTokenCache, TokenCache};
use crate::config::Config;
use crate::error::GupshupError;
use crate::middleware::{LoggingMiddleware, RetryMiddleware};
use crate::token::{
    AppTokenResolver, PartnerAuthenticator, DEFAULT_CACHE_PREFIX, DEFAULT_TOKEN_EXPIRY_HOURS,
};
use crate::types::{Credentials, Email, Password};

use super::dispatcher::RequestDispatcher;
use super::http_client::{HttpClient, Transport};
use super::GupshupPartner;

type TransportLayer = Box<dyn FnOnce(Transport) -> Transport + Send>;

#[must_use]
#[derive(Default)]
pub struct GupshupPartnerBuilder {
    email: Option<String>,
    password: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    token_expiry_hours: Option<u64>,
    cache: Option<Arc<dyn TokenCache>>,
    cache_prefix: Option<String>,
    memoize_partner_token: Option<bool>,
    default_app_id: Option<String>,
    default_app_name: Option<String>,
    layers: Vec<TransportLayer>,
}

impl std::fmt::Debug for GupshupPartnerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GupshupPartnerBuilder")
            .field("email", &self.email)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("token_expiry_hours", &self.token_expiry_hours)
            .field("cache_prefix", &self.cache_prefix)
            .field("default_app_id", &self.default_app_id)
            .field("layers", &self.layers.len())
            .finish_non_exhaustive()
    }
}

impl GupshupPartnerBuilder {
    pub fn credentials(mut self, credentials: &Credentials) -> Self {
        self.email = Some(credentials.email().as_str().to_string());
        self.password = Some(credentials.password().expose().to_string());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Total per-request deadline. Default: 30 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Connection establishment deadline. Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Provider-side partner token lifetime in hours. Default: 24
    pub fn token_expiry_hours(mut self, hours: u64) -> Self {
        self.token_expiry_hours = Some(hours);
        self
    }

    /// Token store shared by the partner and app token flows. Default: [`MemoryTokenCache`]
    pub fn cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = Some(prefix.into());
        self
    }

    /// Always read the partner token from the cache instead of the in-process copy.
    pub fn without_token_memo(mut self) -> Self {
        self.memoize_partner_token = Some(false);
        self
    }

    pub fn default_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.default_app_id = Some(app_id.into());
        self
    }

    pub fn default_app_name(mut self, name: impl Into<String>) -> Self {
        self.default_app_name = Some(name.into());
        self
    }

    /// Wrap the HTTP transport in a Tower layer.
    ///
    /// Layers apply in registration order: the first one registered sits
    /// closest to the network.
    pub fn with_middleware<L>(mut self, layer: L) -> Self
    where
        L: Layer<Transport> + Send + 'static,
        L::Service: Service<ReqwestRequest, Response = ReqwestResponse, Error = reqwest::Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<ReqwestRequest>>::Future: Send + 'static,
    {
        self.layers.push(Box::new(move |inner: Transport| {
            Transport::from_service(layer.layer(inner))
        }));
        self
    }

    /// Apply every setting from `config`, including retry and logging middleware.
    pub fn from_config(mut self, config: &Config) -> Self {
        if let Some(email) = &config.partner.email {
            self = self.email(email.clone());
        }
        if let Some(password) = &config.partner.password {
            self = self.password(password.clone());
        }
        if let Some(app_id) = &config.default_app.id {
            self = self.default_app_id(app_id.clone());
        }
        if let Some(name) = &config.default_app.name {
            self = self.default_app_name(name.clone());
        }

        self = self
            .base_url(config.partner.base_url.clone())
            .token_expiry_hours(config.partner.token_expiry_hours)
            .cache_prefix(config.cache.prefix.clone())
            .timeout(config.timeout.request)
            .connect_timeout(config.timeout.connection);

        if !config.cache.enabled {
            self = self.cache(Arc::new(NoopTokenCache)).without_token_memo();
        }

        if config.retry.enabled {
            let retries = usize::try_from(config.retry.times.saturating_sub(1)).unwrap_or(0);
            let delay_ms = u64::try_from(config.retry.sleep.as_millis()).unwrap_or(u64::MAX);
            self = self.with_middleware(
                RetryMiddleware::new()
                    .with_max_retries(retries)
                    .with_delay_ms(delay_ms),
            );
        }

        if config.logging.enabled {
            let logging = if config.logging.is_verbose() {
                LoggingMiddleware::new().verbose()
            } else {
                LoggingMiddleware::new()
            };
            self = self.with_middleware(logging);
        }

        self
    }

    /// # Errors
    /// Returns [`GupshupError::Config`] for missing credentials, a zero token
    /// expiry or a non-http(s) base URL, and [`GupshupError::InvalidArgument`]
    /// for a malformed e-mail.
    pub fn build(self) -> Result<GupshupPartner, GupshupError> {
        let email = self
            .email
            .ok_or_else(|| GupshupError::Config("partner email is required".to_string()))?;
        let password = self
            .password
            .ok_or_else(|| GupshupError::Config("partner password is required".to_string()))?;
        let credentials = Credentials::new(Email::new(email)?, Password::new(password)?);

        let token_expiry_hours = self
            .token_expiry_hours
            .unwrap_or(DEFAULT_TOKEN_EXPIRY_HOURS);
        if token_expiry_hours == 0 {
            return Err(GupshupError::Config(
                "token_expiry_hours must be at least 1".to_string(),
            ));
        }

        let mut http = HttpClient::builder();
        if let Some(base_url) = self.base_url {
            http = http.base_url(base_url);
        }
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            http = http.connect_timeout(connect_timeout);
        }
        let http = http.build()?;

        let transport = self
            .layers
            .into_iter()
            .fold(http.direct_transport(), |inner, layer| layer(inner));
        let http = http.with_transport(transport);

        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryTokenCache::new()));
        let cache_prefix = self
            .cache_prefix
            .unwrap_or_else(|| DEFAULT_CACHE_PREFIX.to_string());

        let mut authenticator = PartnerAuthenticator::new(
            http.clone(),
            credentials,
            Arc::clone(&cache),
            &cache_prefix,
            token_expiry_hours,
        );
        if self.memoize_partner_token == Some(false) {
            authenticator = authenticator.without_memo();
        }
        let authenticator = Arc::new(authenticator);

        let dispatcher = Arc::new(RequestDispatcher::new(http, Arc::clone(&authenticator)));
        let app_tokens = Arc::new(AppTokenResolver::new(
            Arc::clone(&dispatcher),
            cache,
            cache_prefix,
        ));
        let context = Arc::new(PartnerContext::new(authenticator, app_tokens, dispatcher));

        Ok(GupshupPartner::new(
            context,
            self.default_app_id,
            self.default_app_name,
        ))
    }
}
