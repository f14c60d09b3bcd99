use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::cache::TokenCache;
use crate::client::RequestDispatcher;
use crate::error::GupshupError;
use crate::types::Params;
use crate::utils::encode_path_segment;

use super::{app_token_key, is_expired};

/// Provider-stated app token lifetime, independent of the partner token setting.
pub const APP_TOKEN_TTL: Duration = Duration::from_secs(23 * 60 * 60);

/// A per-app API key token.
#[derive(Debug, Clone)]
pub struct AppToken {
    pub app_id: String,
    pub value: String,
    pub obtained_at: Instant,
    pub ttl: Duration,
}

impl AppToken {
    pub fn is_expired(&self) -> bool {
        is_expired(self.obtained_at, self.ttl)
    }
}

/// Resolves and caches app tokens.
///
/// Token endpoint calls go through the [`RequestDispatcher`], so they carry the
/// partner token and may trigger a partner login. The resolver never touches
/// the partner token itself.
pub struct AppTokenResolver {
    dispatcher: Arc<RequestDispatcher>,
    cache: Arc<dyn TokenCache>,
    cache_prefix: String,
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for AppTokenResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppTokenResolver")
            .field("cache_prefix", &self.cache_prefix)
            .finish_non_exhaustive()
    }
}

impl AppTokenResolver {
    pub fn new(
        dispatcher: Arc<RequestDispatcher>,
        cache: Arc<dyn TokenCache>,
        cache_prefix: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            cache,
            cache_prefix: cache_prefix.into(),
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache_key(&self, app_id: &str) -> String {
        app_token_key(&self.cache_prefix, app_id)
    }

    /// Returns the app token for `app_id`, fetching it when forced or not cached.
    ///
    /// # Errors
    /// - [`GupshupError::InvalidArgument`] for an empty app id
    /// - [`GupshupError::TokenNotFound`] when the endpoint answers without `token.token`
    /// - any partner login or dispatch error, unmodified
    pub async fn get_app_token(
        &self,
        app_id: &str,
        force_refresh: bool,
    ) -> Result<String, GupshupError> {
        if app_id.trim().is_empty() {
            return Err(GupshupError::InvalidArgument(
                "app id must not be empty".to_string(),
            ));
        }

        let key = self.cache_key(app_id);
        if !force_refresh {
            if let Some(token) = self.cache.get(&key).await {
                return Ok(token);
            }
        }

        let lock = self.refresh_lock(&key).await;
        let result = {
            let _guard = lock.lock().await;
            self.refresh(app_id, &key, force_refresh).await
        };
        self.release_lock(&key, lock).await;

        result
    }

    async fn refresh(
        &self,
        app_id: &str,
        key: &str,
        force_refresh: bool,
    ) -> Result<String, GupshupError> {
        // A concurrent caller may have fetched it while we waited.
        if !force_refresh {
            if let Some(token) = self.cache.get(key).await {
                return Ok(token);
            }
        }

        let token = self.fetch(app_id).await?;
        self.cache.put(key, token.value.clone(), token.ttl).await;
        debug!("[GupshupPartner] app token refreshed for {}", app_id);

        Ok(token.value)
    }

    /// Removes the cached token for `app_id`.
    pub async fn invalidate(&self, app_id: &str) {
        self.cache.invalidate(&self.cache_key(app_id)).await;
    }

    async fn refresh_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    /// Drops the per-app lock once no other caller holds or waits on it.
    async fn release_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.refresh_locks.lock().await;
        // One reference is the map entry, the other is ours. Ours is dropped
        // while the map is held so the next releaser sees an exact count.
        let last = Arc::strong_count(&lock) <= 2;
        drop(lock);
        if last {
            locks.remove(key);
        }
    }

    async fn fetch(&self, app_id: &str) -> Result<AppToken, GupshupError> {
        let path = format!("/partner/app/{}/token/", encode_path_segment(app_id));
        let response = self.dispatcher.get(&path, Params::new(), &[]).await?;

        let value = extract_app_token(&response).ok_or_else(|| GupshupError::TokenNotFound {
            app_id: app_id.to_string(),
        })?;

        Ok(AppToken {
            app_id: app_id.to_string(),
            value: value.to_string(),
            obtained_at: Instant::now(),
            ttl: APP_TOKEN_TTL,
        })
    }
}

fn extract_app_token(response: &Value) -> Option<&str> {
    response
        .pointer("/token/token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_nested_token() {
        let response = serde_json::json!({"status": "success", "token": {"token": "AT"}});
        assert_eq!(extract_app_token(&response), Some("AT"));
    }

    #[test]
    fn test_extract_missing_or_empty_token() {
        assert_eq!(extract_app_token(&serde_json::json!({})), None);
        assert_eq!(extract_app_token(&serde_json::json!({"token": "flat"})), None);
        assert_eq!(extract_app_token(&serde_json::json!({"token": {}})), None);
        assert_eq!(
            extract_app_token(&serde_json::json!({"token": {"token": ""}})),
            None
        );
        assert_eq!(
            extract_app_token(&serde_json::json!({"token": {"token": 12}})),
            None
        );
        assert_eq!(extract_app_token(&Value::Null), None);
    }

    #[tokio::test]
    async fn test_refresh_locks_released_after_fetch() {
        use futures::future::join_all;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/partner/account/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "PT"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/partner/app/app-1/token/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"token": {"token": "AT"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/partner/app/app-2/token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let partner = crate::client::GupshupPartner::builder()
            .email("partner@example.com")
            .password("secret")
            .base_url(server.uri())
            .build()
            .unwrap();
        let resolver = partner.context().app_tokens();

        let results = join_all((0..5).map(|_| resolver.get_app_token("app-1", false))).await;
        assert!(results.iter().all(|r| r.as_deref().ok() == Some("AT")));
        assert!(resolver.get_app_token("app-2", false).await.is_err());

        assert!(resolver.refresh_locks.lock().await.is_empty());
    }

    #[test]
    fn test_app_token_expiry() {
        let token = AppToken {
            app_id: "app-123".to_string(),
            value: "AT".to_string(),
            obtained_at: Instant::now(),
            ttl: APP_TOKEN_TTL,
        };
        assert!(!token.is_expired());
    }
}
