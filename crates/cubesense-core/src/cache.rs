// ── Expiring cache ──
//
// Time-to-live key/value store that holds the latest aggregate.
// Lookups on expired or never-set keys report absence; only a failing
// backend reports an error.

use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use tokio::time::Instant;
use tracing::trace;

/// Failure of the cache backend itself, as opposed to a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache backend failure: {0}")]
    Backend(String),
}

/// Storage seam for the repository's aggregate.
///
/// Both calls may suspend, so a remote or on-disk backend can stand in
/// for [`ExpiringCache`].
pub trait CacheBackend<V>: Send + Sync {
    /// Return the value under `key` if it has not expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<V>, CacheError>> + Send;

    /// Store `value` under `key` with the backend's configured ttl,
    /// replacing whatever was there.
    fn set(&self, key: &str, value: V) -> impl Future<Output = Result<(), CacheError>> + Send;
}

struct Entry<V> {
    value: V,
    /// `None` never expires.
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// In-memory [`CacheBackend`] with a single, fixed ttl for every entry.
///
/// Uses `tokio::time::Instant`, so tests can drive expiry with a paused
/// clock. Expired entries are dropped lazily on lookup.
pub struct ExpiringCache<V> {
    entries: DashMap<String, Entry<V>>,
    ttl: Duration,
}

impl<V: Clone + Send + Sync> ExpiringCache<V> {
    /// A zero `ttl` keeps entries until they are replaced or removed.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Synchronous lookup used by the async trait method.
    pub fn get_now(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Some(entry.value.clone());
            }
        }

        if self.entries.remove_if(key, |_, e| !e.is_live(now)).is_some() {
            trace!(key, "evicted expired cache entry");
        }
        None
    }

    /// Synchronous store used by the async trait method.
    ///
    /// A ttl too large to add to the clock is treated like a zero ttl.
    pub fn set_now(&self, key: &str, value: V) {
        let expires_at = if self.ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(self.ttl)
        };
        self.entries.insert(key.to_owned(), Entry { value, expires_at });
    }

    /// Evict one key. Returns the value if it was present (expired or not).
    pub fn remove(&self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|(_, e)| e.value)
    }

    /// Evict everything.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone + Send + Sync> CacheBackend<V> for ExpiringCache<V> {
    async fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        Ok(self.get_now(key))
    }

    async fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        self.set_now(key, value);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn get_returns_value_before_expiry() {
        let cache = ExpiringCache::new(Duration::from_secs(30));
        cache.set("k", 7u32).await.unwrap();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get("k").await.unwrap(), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn get_reports_absence_after_expiry() {
        let cache = ExpiringCache::new(Duration::from_secs(30));
        cache.set("k", 7u32).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty(), "expired entry should be evicted on lookup");
    }

    #[tokio::test]
    async fn never_set_key_is_absent() {
        let cache: ExpiringCache<u32> = ExpiringCache::new(Duration::from_secs(1));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn set_replaces_and_restarts_ttl() {
        let cache = ExpiringCache::new(Duration::from_secs(10));
        cache.set("k", 1u32).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("k", 2u32).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get("k").await.unwrap(), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_never_expires() {
        let cache = ExpiringCache::new(Duration::ZERO);
        cache.set("k", "v".to_string()).await.unwrap();
        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_ttl_never_expires() {
        let cache = ExpiringCache::new(Duration::from_secs(u64::MAX));
        cache.set("k", 1u32).await.unwrap();
        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;
        assert_eq!(cache.get("k").await.unwrap(), Some(1));
    }

    #[test]
    fn remove_and_clear_evict() {
        let cache = ExpiringCache::new(Duration::from_secs(10));
        cache.set_now("a", 1u32);
        cache.set_now("b", 2u32);

        assert_eq!(cache.remove("a"), Some(1));
        assert_eq!(cache.get_now("a"), None);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn trait_and_sync_views_agree() {
        let cache = ExpiringCache::new(Duration::from_secs(10));
        tokio_test::block_on(cache.set("k", 3u32)).unwrap();

        assert_eq!(cache.get_now("k"), Some(3));
        assert_eq!(tokio_test::block_on(cache.get("k")).unwrap(), Some(3));
    }
}
