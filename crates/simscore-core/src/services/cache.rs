use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// In-memory cache whose entries expire a fixed time after insertion.
///
/// Expiry is checked on read. Every insert also drops expired entries, so the
/// map never holds more than the keys written within one TTL.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(inserted_at, _)| inserted_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, (inserted_at, _)| inserted_at.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), value));
    }

    pub async fn invalidate(&self, key: &K) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Drop expired entries and return how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, (inserted_at, _)| inserted_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Number of stored entries, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_fresh_entry() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("alice".to_string(), 42_u32).await;

        assert_eq!(cache.get(&"alice".to_string()).await, Some(42));
        assert_eq!(cache.get(&"bob".to_string()).await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert(1_u8, "value").await;

        assert_eq!(cache.get(&1).await, None);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_insert_evicts_expired_entries() {
        let cache = TtlCache::new(Duration::ZERO);
        for key in 0..100_u32 {
            cache.insert(key, key).await;
        }
        assert_eq!(cache.len().await, 1);

        let cache = TtlCache::new(Duration::from_millis(20));
        cache.insert("old", 1).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.insert("new", 2).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"new").await, Some(2));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.insert("k", 1).await;
        assert_eq!(cache.get(&"k").await, Some(1));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get(&"k").await, None);
    }

    #[tokio::test]
    async fn test_insert_overwrites_and_refreshes() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("k", 1).await;
        cache.insert("k", 2).await;

        assert_eq!(cache.get(&"k").await, Some(2));
        assert_eq!(cache.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1).await;
        cache.insert("b", 2).await;

        assert!(cache.invalidate(&"a").await);
        assert!(!cache.invalidate(&"a").await);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
