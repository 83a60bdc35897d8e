//! Cache Store Module
//!
//! Defines the store capability consumed by the request router and the
//! in-process TTL-expiring implementation backing it.
//!
//! The router only ever talks to the [`CacheStore`] trait, so it can be
//! tested against mocks (including deliberately failing stores) without
//! a real backend.

mod entry;
mod memory;

// Re-export public types
pub use entry::StoredEntry;
pub use memory::MemoryStore;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

// == Store Capability ==
/// Key/byte-blob store with fixed-TTL expiry and a bulk-clear operation.
///
/// `get` distinguishes an absent entry (`Ok(None)`) from a store failure
/// (`Err`). The router maps both to a cache miss, but failures are logged
/// while absences are the normal cold path.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Retrieves the bytes stored under `key`, if present and unexpired.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    /// Stores `value` under `key` with the store's fixed TTL.
    ///
    /// Overwrites any existing value and resets its expiry.
    async fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError>;

    /// Removes every entry in the store.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Releases the store's underlying resources. Called once at shutdown.
    async fn close(&self) -> Result<(), StoreError>;
}
