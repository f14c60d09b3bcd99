//! Token cache
//!
//! Time-bounded key-value storage for bearer tokens. The SDK only talks to the
//! [`TokenCache`] trait, so any backing store (in-memory, file, networked) can
//! be injected through [`GupshupPartnerBuilder::cache`](crate::GupshupPartnerBuilder::cache).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Storage for cached tokens.
///
/// Implementations must treat an entry whose TTL has elapsed as absent, even
/// if it has not been physically removed yet, and must be safe to share
/// between concurrent callers.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Returns the live value for `key`, or `None` on miss or logical expiry.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key` for `ttl`, replacing any existing entry.
    async fn put(&self, key: &str, value: String, ttl: Duration);

    /// Returns `true` if a live entry exists for `key`.
    async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    /// Removes the entry for `key`, if any.
    async fn invalidate(&self, key: &str);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process [`TokenCache`] backed by a `HashMap` behind a `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryTokenCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Physically removes every expired entry and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it unless a concurrent put already replaced it.
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(Instant::now()))
        {
            entries.remove(key);
        }
        None
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }

    async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// A [`TokenCache`] that stores nothing. Every read is a miss.
///
/// Used when caching is disabled in configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTokenCache;

#[async_trait]
impl TokenCache for NoopTokenCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Duration) {}

    async fn invalidate(&self, _key: &str) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = MemoryTokenCache::new();
        cache
            .put("app_token:a", "tok".to_string(), Duration::from_secs(60))
            .await;

        assert_eq!(cache.get("app_token:a").await.as_deref(), Some("tok"));
        assert!(cache.has("app_token:a").await);
        assert!(!cache.has("app_token:b").await);
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_entry() {
        let cache = MemoryTokenCache::new();
        cache.put("k", "first".to_string(), Duration::from_secs(60)).await;
        cache.put("k", "second".to_string(), Duration::from_secs(60)).await;

        assert_eq!(cache.get("k").await.as_deref(), Some("second"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryTokenCache::new();
        cache.put("k", "v".to_string(), Duration::from_secs(10)).await;

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.has("k").await);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!cache.has("k").await);
        assert!(cache.get("k").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_visible() {
        let cache = MemoryTokenCache::new();
        cache.put("k", "v".to_string(), Duration::ZERO).await;
        assert!(!cache.has("k").await);
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = MemoryTokenCache::new();
        cache.put("k", "v".to_string(), Duration::from_secs(60)).await;
        cache.invalidate("k").await;
        assert!(cache.get("k").await.is_none());

        // Invalidating a missing key is a no-op.
        cache.invalidate("missing").await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_keeps_live_entries() {
        let cache = MemoryTokenCache::new();
        cache.put("short", "a".to_string(), Duration::from_secs(1)).await;
        cache.put("long", "b".to_string(), Duration::from_secs(100)).await;

        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.has("long").await);
    }

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopTokenCache;
        cache.put("k", "v".to_string(), Duration::from_secs(60)).await;
        assert!(!cache.has("k").await);
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_writers_do_not_corrupt_entries() {
        let cache = Arc::new(MemoryTokenCache::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let key = format!("app_token:{}", i % 4);
                cache
                    .put(&key, format!("tok-{i}"), Duration::from_secs(60))
                    .await;
                cache.get(&key).await
            }));
        }

        for handle in handles {
            let value = handle.await.unwrap();
            assert!(value.unwrap().starts_with("tok-"));
        }
        assert_eq!(cache.len().await, 4);
    }

    #[tokio::test]
    async fn test_trait_object_usage() {
        let cache: Arc<dyn TokenCache> = Arc::new(MemoryTokenCache::new());
        cache.put("k", "v".to_string(), Duration::from_secs(60)).await;
        assert!(cache.has("k").await);
    }
}
