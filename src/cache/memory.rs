//! In-Process Store Module
//!
//! HashMap-backed implementation of the store capability with fixed-TTL
//! expiry. Safe for concurrent access from every request handler via an
//! internal async RwLock.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::cache::{CacheStore, StoredEntry};
use crate::error::StoreError;

// == Memory Store ==
/// In-process key/byte-blob store with fixed-TTL expiry.
///
/// Expired entries become unavailable immediately on read; the bytes are
/// reclaimed either by that read or by the periodic expiry sweep.
#[derive(Debug)]
pub struct MemoryStore {
    /// Key-value storage
    entries: RwLock<HashMap<String, StoredEntry>>,
    /// Fixed TTL in seconds applied to every write
    ttl: u64,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a new MemoryStore whose entries expire `ttl_seconds`
    /// after they are written.
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: ttl_seconds,
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    /// Retrieves a value by key.
    ///
    /// An expired entry is removed on the spot and reported as absent,
    /// so callers never observe stale bytes.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.body.clone())),
            None => Ok(None),
        }
    }

    /// Stores a value under `key` with the fixed TTL.
    ///
    /// Overwrites any existing entry and resets its expiry.
    async fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        let entry = StoredEntry::new(value, self.ttl);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    /// Removes every entry in the store.
    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }

    /// Drops all entries. The in-process store holds no external
    /// connection, so close and clear coincide.
    async fn close(&self) -> Result<(), StoreError> {
        self.clear().await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_store_new() {
        let store = MemoryStore::new(600);
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_set_and_get() {
        let store = MemoryStore::new(600);

        store.set("key1", Bytes::from_static(b"value1")).await.unwrap();
        let value = store.get("key1").await.unwrap();

        assert_eq!(value, Some(Bytes::from_static(b"value1")));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let store = MemoryStore::new(600);

        let value = store.get("nonexistent").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_store_overwrite_resets_value() {
        let store = MemoryStore::new(600);

        store.set("key1", Bytes::from_static(b"value1")).await.unwrap();
        store.set("key1", Bytes::from_static(b"value2")).await.unwrap();

        let value = store.get("key1").await.unwrap();
        assert_eq!(value, Some(Bytes::from_static(b"value2")));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_ttl_expiration() {
        let store = MemoryStore::new(1);

        store.set("key1", Bytes::from_static(b"value1")).await.unwrap();

        // Accessible immediately
        assert!(store.get("key1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        // Expired: reported as absent and removed from the map
        assert_eq!(store.get("key1").await.unwrap(), None);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_store_clear() {
        let store = MemoryStore::new(600);

        store.set("key1", Bytes::from_static(b"value1")).await.unwrap();
        store.set("key2", Bytes::from_static(b"value2")).await.unwrap();

        store.clear().await.unwrap();

        assert!(store.is_empty().await);
        assert_eq!(store.get("key1").await.unwrap(), None);
        assert_eq!(store.get("key2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_cleanup_expired() {
        let short = MemoryStore::new(1);
        short.set("gone", Bytes::from_static(b"value1")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let removed = short.cleanup_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(short.len().await, 0);
    }

    #[tokio::test]
    async fn test_store_cleanup_keeps_live_entries() {
        let store = MemoryStore::new(600);
        store.set("live", Bytes::from_static(b"value1")).await.unwrap();

        let removed = store.cleanup_expired().await;
        assert_eq!(removed, 0);
        assert!(store.get("live").await.unwrap().is_some());
    }
}
