//! In-Memory Store Module
//!
//! HashMap storage with LRU eviction and per-entry expiry, shared behind a
//! tokio `RwLock` and exposed through the [`CacheStore`] trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, CacheStats, CacheStore, LruTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::StoreError;

// == LRU Store ==
/// Single-threaded store core. Callers serialize access.
#[derive(Debug)]
pub struct LruStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
}

impl LruStore {
    /// Creates a store that holds at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Set ==
    /// Stores a payload, overwriting any previous entry and resetting its TTL.
    ///
    /// When full, the least recently used entry is evicted first.
    pub fn set(&mut self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), StoreError> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(StoreError::Write(format!(
                "key length must be between 1 and {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(StoreError::Write(format!(
                "value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
            }
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl_seconds));
        self.lru.touch(key);
        self.stats.record_write();
        self.stats.set_total_entries(self.entries.len());
        Ok(())
    }

    // == Get ==
    /// Returns the payload if present and live. Expired entries are dropped
    /// and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Delete ==
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            self.stats.record_invalidations(1);
        }
        removed
    }

    // == Delete Matching ==
    /// Removes every key matching the glob `pattern`.
    pub fn delete_matching(&mut self, pattern: &str) -> Result<usize, StoreError> {
        let matcher = glob::Pattern::new(pattern)
            .map_err(|e| StoreError::InvalidPattern(format!("{}: {}", pattern, e.msg)))?;

        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| matcher.matches(key))
            .cloned()
            .collect();

        for key in &doomed {
            self.remove_entry(key);
        }
        self.stats.record_invalidations(doomed.len());
        Ok(doomed.len())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        if self.is_empty() {
            return 0;
        }

        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        self.stats.record_expirations(expired.len());
        expired.len()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }
}

// == Memory Store ==
/// Process-local [`CacheStore`] backend. Cloning shares the same storage.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<LruStore>>,
}

impl MemoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LruStore::new(max_entries))),
        }
    }

    /// Sweeps expired entries. Used by the background cleanup task.
    pub async fn cleanup_expired(&self) -> usize {
        self.inner.write().await.cleanup_expired()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        // Write lock: a read updates recency and counters.
        Ok(self.inner.write().await.get(key))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), StoreError> {
        self.inner.write().await.set(key, value, ttl_seconds)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.delete(key))
    }

    async fn delete_matching(&self, pattern: &str) -> Result<usize, StoreError> {
        self.inner.write().await.delete_matching(pattern)
    }

    async fn stats(&self) -> Option<CacheStats> {
        Some(self.inner.read().await.stats())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
