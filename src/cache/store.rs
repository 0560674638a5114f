//! Cache Store Interface
//!
//! The narrow key-value contract the orchestrator needs from a backend.
//! Implementations must make `get` and `set` atomic per key.

use async_trait::async_trait;

use crate::cache::CacheStats;
use crate::error::StoreError;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the live payload for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), StoreError>;

    /// Removes `key`. Returns whether an entry was present.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Removes every key matching the glob `pattern` and returns the count.
    ///
    /// Backends that cannot enumerate keys return
    /// [`StoreError::PatternUnsupported`] instead of reporting zero.
    async fn delete_matching(&self, pattern: &str) -> Result<usize, StoreError>;

    /// Backend counters, when the backend keeps any.
    async fn stats(&self) -> Option<CacheStats> {
        None
    }

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}
