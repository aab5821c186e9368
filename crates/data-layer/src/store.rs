//! Key/value storage trait and in-memory implementation.
//!
//! [`KeyValueStore`] is the seam between the [`Cache`](crate::cache::Cache)
//! wrapper and a concrete backend, so the same caching logic can run against
//! a remote server or [`MemoryStore`] in tests.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Trait for byte-valued key/value storage with optional expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// `None` stores the value without expiry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Read the value under `key`.
    ///
    /// Returns None if the key doesn't exist or has expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove `key`. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Set a new time-to-live on an existing key. Returns whether it existed.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process implementation of KeyValueStore.
///
/// Expired entries are invisible to readers and dropped on the next write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining time-to-live of a live key, `None` for keys without expiry
    /// or missing keys.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let entry = entries.get(key).filter(|e| e.is_live(now))?;
        entry.expires_at.map(|at| at.saturating_duration_since(now))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.is_live(now));
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some_and(|e| e.is_live(now)))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = MemoryStore::new();
        store
            .set("k", b"v".to_vec(), Some(Duration::from_secs(10)))
            .await
            .unwrap();
        store.set("forever", b"v".to_vec(), None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.get("forever").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_extends_live_keys_only() {
        let store = MemoryStore::new();
        store
            .set("k", b"v".to_vec(), Some(Duration::from_secs(5)))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(store.expire("k", Duration::from_secs(60)).await.unwrap());
        assert_eq!(store.ttl("k").await, Some(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(store.get("k").await.unwrap().is_some());
        assert!(!store.expire("missing", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.set("k", b"v".to_vec(), None).await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(store.is_empty().await);
    }
}
