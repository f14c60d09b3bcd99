use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::cache::TokenCache;
use crate::client::http_client::{decode_json, header_map, HttpClient};
use crate::error::GupshupError;
use crate::types::{Credentials, HttpMethod, Params};

use super::{is_expired, partner_token_key, partner_token_ttl};

const LOGIN_PATH: &str = "/partner/account/login";

/// A partner session token and the window it is trusted for.
#[derive(Debug, Clone)]
pub struct PartnerToken {
    pub value: String,
    pub obtained_at: Instant,
    pub ttl: Duration,
}

impl PartnerToken {
    pub fn is_expired(&self) -> bool {
        is_expired(self.obtained_at, self.ttl)
    }
}

/// Obtains and caches the partner token via credential login.
///
/// Lookup order for a non-forced call: the in-memory last known token, then
/// the shared cache, then a login. A forced call always logs in.
pub struct PartnerAuthenticator {
    http: HttpClient,
    credentials: Credentials,
    cache: Arc<dyn TokenCache>,
    cache_key: String,
    ttl: Duration,
    memoize: bool,
    last_known: RwLock<Option<PartnerToken>>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for PartnerAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerAuthenticator")
            .field("email", self.credentials.email())
            .field("cache_key", &self.cache_key)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl PartnerAuthenticator {
    pub fn new(
        http: HttpClient,
        credentials: Credentials,
        cache: Arc<dyn TokenCache>,
        cache_prefix: &str,
        token_expiry_hours: u64,
    ) -> Self {
        let cache_key = partner_token_key(cache_prefix, credentials.email().as_str());
        Self {
            http,
            credentials,
            cache,
            cache_key,
            ttl: partner_token_ttl(token_expiry_hours),
            memoize: true,
            last_known: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Disables the in-memory last known token, so every non-forced call consults the cache.
    pub fn without_memo(mut self) -> Self {
        self.memoize = false;
        self
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns a partner token, logging in when forced or when nothing live is cached.
    ///
    /// # Errors
    /// - [`GupshupError::Authentication`] when the login call fails or returns no token
    /// - [`GupshupError::Decode`] when the login response is not JSON
    pub async fn get_partner_token(&self, force_refresh: bool) -> Result<String, GupshupError> {
        if !force_refresh {
            if let Some(token) = self.lookup().await {
                return Ok(token);
            }
        }

        let _guard = self.refresh_lock.lock().await;

        // A concurrent caller may have logged in while we waited.
        if !force_refresh {
            if let Some(token) = self.lookup().await {
                return Ok(token);
            }
        }

        let token = self.login().await?;
        self.cache
            .put(&self.cache_key, token.value.clone(), self.ttl)
            .await;
        if self.memoize {
            *self.last_known.write().await = Some(token.clone());
        }
        debug!(
            "[GupshupPartner] partner token refreshed (ttl {:?}, forced: {})",
            self.ttl, force_refresh
        );

        Ok(token.value)
    }

    /// Drops both the in-memory token and the cache entry.
    pub async fn invalidate(&self) {
        *self.last_known.write().await = None;
        self.cache.invalidate(&self.cache_key).await;
    }

    async fn lookup(&self) -> Option<String> {
        if self.memoize {
            if let Some(token) = self.last_known.read().await.as_ref() {
                if !token.is_expired() {
                    return Some(token.value.clone());
                }
            }
        }
        self.cache.get(&self.cache_key).await
    }

    async fn login(&self) -> Result<PartnerToken, GupshupError> {
        let params = Params::new()
            .with("email", self.credentials.email().as_str())
            .with("password", self.credentials.password().expose());
        let headers = header_map([("Accept", "application/json")])?;
        let request = self
            .http
            .build_request(HttpMethod::Post, LOGIN_PATH, &params, headers, None)?;

        let response = self.http.send(request).await.map_err(|e| {
            warn!("[GupshupPartner] partner login transport failure: {}", e);
            GupshupError::Authentication {
                message: format!("partner login failed: {}", e),
                status_code: 0,
                response_body: String::new(),
            }
        })?;

        if !response.is_success() {
            warn!(
                "[GupshupPartner] partner login rejected with status {}",
                response.status
            );
            return Err(GupshupError::Authentication {
                message: format!("partner login failed with status {}", response.status),
                status_code: response.status,
                response_body: response.body,
            });
        }

        let value = decode_json(&response.body)?;
        let token = value
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| GupshupError::Authentication {
                message: "partner login response did not contain a token".to_string(),
                status_code: response.status,
                response_body: response.body.clone(),
            })?;

        Ok(PartnerToken {
            value: token.to_string(),
            obtained_at: Instant::now(),
            ttl: self.ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryTokenCache;
    use crate::types::{Email, Password};

    fn create_authenticator(cache: Arc<dyn TokenCache>) -> PartnerAuthenticator {
        let http = HttpClient::builder().build().unwrap();
        let credentials = Credentials::new(
            Email::new("test@example.com").unwrap(),
            Password::new("secret").unwrap(),
        );
        PartnerAuthenticator::new(http, credentials, cache, "gupshup_", 24)
    }

    #[test]
    fn test_partner_token_not_expired() {
        let token = PartnerToken {
            value: "t".to_string(),
            obtained_at: Instant::now(),
            ttl: Duration::from_secs(3600),
        };
        assert!(!token.is_expired());
    }

    #[test]
    fn test_partner_token_zero_ttl_is_expired() {
        let token = PartnerToken {
            value: "t".to_string(),
            obtained_at: Instant::now(),
            ttl: Duration::ZERO,
        };
        assert!(token.is_expired());
    }

    #[tokio::test]
    async fn test_cached_token_is_returned_without_login() {
        let cache = Arc::new(MemoryTokenCache::new());
        let authenticator = create_authenticator(cache.clone());
        cache
            .put(
                authenticator.cache_key(),
                "cached-partner".to_string(),
                Duration::from_secs(60),
            )
            .await;

        // Base URL points at the real provider; a hit must not reach the network.
        let token = authenticator.get_partner_token(false).await.unwrap();
        assert_eq!(token, "cached-partner");
    }

    #[tokio::test]
    async fn test_memo_is_consulted_before_cache() {
        let cache = Arc::new(MemoryTokenCache::new());
        let authenticator = create_authenticator(cache.clone());
        *authenticator.last_known.write().await = Some(PartnerToken {
            value: "memo".to_string(),
            obtained_at: Instant::now(),
            ttl: Duration::from_secs(60),
        });

        assert_eq!(authenticator.get_partner_token(false).await.unwrap(), "memo");
        assert!(!cache.has(authenticator.cache_key()).await);
    }

    #[tokio::test]
    async fn test_invalidate_clears_memo_and_cache() {
        let cache = Arc::new(MemoryTokenCache::new());
        let authenticator = create_authenticator(cache.clone());
        cache
            .put(authenticator.cache_key(), "v".to_string(), Duration::from_secs(60))
            .await;
        *authenticator.last_known.write().await = Some(PartnerToken {
            value: "v".to_string(),
            obtained_at: Instant::now(),
            ttl: Duration::from_secs(60),
        });

        authenticator.invalidate().await;

        assert!(authenticator.last_known.read().await.is_none());
        assert!(!cache.has(authenticator.cache_key()).await);
    }

    #[test]
    fn test_ttl_follows_configured_expiry() {
        let authenticator = create_authenticator(Arc::new(MemoryTokenCache::new()));
        assert_eq!(authenticator.ttl(), Duration::from_secs(23 * 3600));
    }

    #[test]
    fn test_debug_does_not_leak_password() {
        let authenticator = create_authenticator(Arc::new(MemoryTokenCache::new()));
        let debug = format!("{:?}", authenticator);
        assert!(!debug.contains("secret"));
    }
}
