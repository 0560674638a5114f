//! Cache Entry Module
//!
//! A stored response payload together with its expiry instant.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A serialized upstream payload and its metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload bytes
    pub value: Vec<u8>,
    /// When the entry stops being served; `None` when the TTL is too large
    /// to represent, in which case only eviction or invalidation removes it
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl_seconds` from now.
    ///
    /// A zero TTL produces an entry that is already expired.
    pub fn new(value: Vec<u8>, ttl_seconds: u64) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(Duration::from_secs(ttl_seconds)),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current instant reaches `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}
