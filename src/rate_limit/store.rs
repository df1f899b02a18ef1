use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::GuardError;

/// Counter state for one (client, action) key.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Hits recorded in the current window.
    pub hits: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
    /// When the record was first created. Diagnostic only; a window restart
    /// reuses the record and does not touch this field.
    pub created_at: DateTime<Utc>,
}

impl RateLimitInfo {
    /// Seconds until the window resets, clamped at zero.
    pub fn available_in(&self) -> i64 {
        (self.reset_at - Utc::now()).num_seconds().max(0)
    }
}

/// Keyed fixed-window counter store.
///
/// Implement this trait for custom storage (redis, postgres, etc.). The
/// limiter holds no state of its own, so swapping the store is enough to go
/// from a single process to a distributed deployment.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records a hit and returns the post-increment state.
    ///
    /// Creates the key with 1 hit if it doesn't exist. If the window has
    /// expired (`now >= reset_at`), restarts the count at 1 with a fresh
    /// window. Must be atomic with respect to the read-then-write of a
    /// single record: two concurrent increments for the same key must never
    /// both observe the same pre-increment value.
    async fn increment(&self, key: &str, window_secs: u64) -> Result<RateLimitInfo, GuardError>;

    async fn get(&self, key: &str) -> Result<Option<RateLimitInfo>, GuardError>;

    async fn reset(&self, key: &str) -> Result<(), GuardError>;

    /// Remaining hits before the ceiling. Does not increment the counter.
    async fn remaining(&self, key: &str, ceiling: u32) -> Result<u32, GuardError> {
        Ok(self.get(key).await?.map_or(ceiling, |info| {
            if info.reset_at < Utc::now() {
                ceiling
            } else {
                ceiling.saturating_sub(info.hits)
            }
        }))
    }
}

/// For distributed deployments, use a shared store like redis or postgres.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, RateLimitInfo>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Drops entries whose window has passed.
    ///
    /// The store never deletes records on its own, so long-running
    /// applications should call this periodically to bound memory growth.
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, info| info.reset_at > now);
        }
    }

    /// Number of live records, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
#[allow(clippy::significant_drop_tightening)]
impl RateLimitStore for InMemoryStore {
    async fn increment(&self, key: &str, window_secs: u64) -> Result<RateLimitInfo, GuardError> {
        let now = Utc::now();
        let window = chrono::Duration::try_seconds(i64::try_from(window_secs).unwrap_or(i64::MAX))
            .unwrap_or(chrono::Duration::MAX);
        // Saturate instead of overflowing for absurdly large windows
        let window_end = now
            .checked_add_signed(window)
            .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);

        let mut entries = self
            .entries
            .write()
            .map_err(|_| GuardError::StoreUnavailable("failed to acquire lock".to_owned()))?;

        let info = entries
            .entry(key.to_owned())
            .and_modify(|info| {
                if info.reset_at <= now {
                    // Window expired, start a new one
                    info.hits = 1;
                    info.reset_at = window_end;
                } else {
                    info.hits += 1;
                }
            })
            .or_insert_with(|| RateLimitInfo {
                hits: 1,
                reset_at: window_end,
                created_at: now,
            });

        Ok(info.clone())
    }

    async fn get(&self, key: &str) -> Result<Option<RateLimitInfo>, GuardError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| GuardError::StoreUnavailable("failed to acquire lock".to_owned()))?;

        Ok(entries.get(key).cloned())
    }

    async fn reset(&self, key: &str) -> Result<(), GuardError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| GuardError::StoreUnavailable("failed to acquire lock".to_owned()))?;

        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_increment() {
        let store = InMemoryStore::new();

        let info = store.increment("test-key", 60).await.unwrap();
        assert_eq!(info.hits, 1);

        let info = store.increment("test-key", 60).await.unwrap();
        assert_eq!(info.hits, 2);

        let info = store.increment("test-key", 60).await.unwrap();
        assert_eq!(info.hits, 3);
    }

    #[tokio::test]
    async fn test_in_memory_store_keys_are_independent() {
        let store = InMemoryStore::new();

        store.increment("key-a", 60).await.unwrap();
        store.increment("key-a", 60).await.unwrap();
        let info = store.increment("key-b", 60).await.unwrap();

        assert_eq!(info.hits, 1);
        assert_eq!(store.get("key-a").await.unwrap().unwrap().hits, 2);
    }

    #[tokio::test]
    async fn test_in_memory_store_get() {
        let store = InMemoryStore::new();

        // Key doesn't exist
        let info = store.get("nonexistent").await.unwrap();
        assert!(info.is_none());

        // After increment
        store.increment("test-key", 60).await.unwrap();
        let info = store.get("test-key").await.unwrap();
        assert!(info.is_some());
        assert_eq!(info.unwrap().hits, 1);
    }

    #[tokio::test]
    async fn test_in_memory_store_reset() {
        let store = InMemoryStore::new();

        store.increment("test-key", 60).await.unwrap();
        store.increment("test-key", 60).await.unwrap();

        let info = store.get("test-key").await.unwrap();
        assert_eq!(info.unwrap().hits, 2);

        store.reset("test-key").await.unwrap();

        let info = store.get("test-key").await.unwrap();
        assert!(info.is_none());
    }

    #[tokio::test]
    async fn test_in_memory_store_remaining() {
        let store = InMemoryStore::new();

        // Full capacity
        let remaining = store.remaining("test-key", 5).await.unwrap();
        assert_eq!(remaining, 5);

        // After some hits
        store.increment("test-key", 60).await.unwrap();
        store.increment("test-key", 60).await.unwrap();

        let remaining = store.remaining("test-key", 5).await.unwrap();
        assert_eq!(remaining, 3);
    }

    #[tokio::test]
    async fn test_in_memory_store_window_restart() {
        let store = InMemoryStore::new();

        // Zero-length window expires immediately, so the next hit restarts
        // the count instead of stacking on the old one.
        let info = store.increment("test-key", 0).await.unwrap();
        assert_eq!(info.hits, 1);

        let info = store.increment("test-key", 60).await.unwrap();
        assert_eq!(info.hits, 1);

        let info = store.increment("test-key", 60).await.unwrap();
        assert_eq!(info.hits, 2);
    }

    #[tokio::test]
    async fn test_in_memory_store_created_at_survives_restart() {
        let store = InMemoryStore::new();

        let first = store.increment("test-key", 0).await.unwrap();
        let restarted = store.increment("test-key", 60).await.unwrap();

        assert_eq!(restarted.hits, 1);
        assert_eq!(restarted.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_in_memory_store_huge_window_does_not_panic() {
        let store = InMemoryStore::new();

        let info = store.increment("test-key", u64::MAX).await.unwrap();
        assert_eq!(info.hits, 1);
        assert!(info.reset_at > Utc::now());

        let info = store.increment("test-key", u64::MAX).await.unwrap();
        assert_eq!(info.hits, 2);
    }

    #[tokio::test]
    async fn test_in_memory_store_cleanup_expired() {
        let store = InMemoryStore::new();

        store.increment("expired", 0).await.unwrap();
        store.increment("live", 60).await.unwrap();
        assert_eq!(store.len(), 2);

        store.cleanup_expired();

        assert_eq!(store.len(), 1);
        assert!(store.get("expired").await.unwrap().is_none());
        assert!(store.get("live").await.unwrap().is_some());
    }
}
