//! Cache Module
//!
//! Response caching in front of the upstream API: key derivation, TTL
//! policy, the store interface with its in-memory backend, and the
//! cached-fetch orchestrator.

mod entry;
mod key;
mod lru;
mod memory;
mod orchestrator;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{
    derive_key, operation_pattern, ParamSet, ParamValue, KEY_DIGEST_BYTES, KEY_DIGEST_THRESHOLD,
};
pub use lru::LruTracker;
pub use memory::{LruStore, MemoryStore};
pub use orchestrator::CachedFetcher;
pub use stats::CacheStats;
pub use store::CacheStore;
pub use ttl::TtlPolicy;

// == Public Constants ==
/// Maximum allowed key length in bytes. Derived keys stay well below it.
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed payload size in bytes
pub const MAX_VALUE_SIZE: usize = 4 * 1024 * 1024; // 4 MB
