//! Cached Fetch Module
//!
//! Get-or-fetch-and-populate in front of the upstream API.
//!
//! Cache failures are logged and absorbed (a read error is a miss, a write
//! error is a no-op). Upstream failures always reach the caller and are
//! never cached. Concurrent misses on the same key are not coalesced; each
//! caller fetches and writes independently, last write wins.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::{derive_key, operation_pattern, CacheStore, ParamSet, TtlPolicy};
use crate::error::{StoreError, UpstreamError};
use crate::operation::Operation;

// == Cached Fetcher ==
/// Stateless orchestrator; all shared mutable state lives in the store.
#[derive(Clone)]
pub struct CachedFetcher {
    store: Arc<dyn CacheStore>,
    policy: Arc<TtlPolicy>,
}

impl CachedFetcher {
    pub fn new(store: Arc<dyn CacheStore>, policy: TtlPolicy) -> Self {
        Self {
            store,
            policy: Arc::new(policy),
        }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }

    // == Fetch With Cache ==
    /// Returns the cached payload for `(operation, params)` or calls `fetch`
    /// and stores its result.
    ///
    /// `params` must not contain credentials. `fetch` runs at most once and
    /// is not run at all on a hit. An operation with a zero TTL never
    /// touches the store.
    pub async fn fetch_with_cache<F, Fut>(
        &self,
        operation: Operation,
        params: &ParamSet,
        fetch: F,
    ) -> Result<Value, UpstreamError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, UpstreamError>>,
    {
        if !self.policy.is_cacheable(operation) {
            debug!(operation = %operation, "Cache BYPASS (ttl=0)");
            return fetch().await.inspect_err(|err| log_upstream_failure(operation, err));
        }

        let ttl = self.policy.ttl_for(operation);
        let key = derive_key(operation.as_str(), params);
        if let Some(payload) = self.read(&key).await {
            return Ok(payload);
        }

        let payload = fetch()
            .await
            .inspect_err(|err| log_upstream_failure(operation, err))?;

        self.write(&key, &payload, ttl.as_secs()).await;
        Ok(payload)
    }

    // == Invalidation ==
    /// Drops the entry for one `(operation, params)` pair.
    pub async fn invalidate(
        &self,
        operation: Operation,
        params: &ParamSet,
    ) -> Result<bool, StoreError> {
        let key = derive_key(operation.as_str(), params);
        let removed = self.store.delete(&key).await?;
        debug!(key = %key, removed, "Cache DELETE");
        Ok(removed)
    }

    /// Drops every entry of `operation`.
    pub async fn invalidate_operation(&self, operation: Operation) -> Result<usize, StoreError> {
        self.invalidate_matching(&operation_pattern(operation.as_str()))
            .await
    }

    /// Drops every entry whose key matches the glob `pattern`.
    pub async fn invalidate_matching(&self, pattern: &str) -> Result<usize, StoreError> {
        let count = self.store.delete_matching(pattern).await?;
        debug!(pattern = %pattern, count, "Cache CLEAR pattern");
        Ok(count)
    }

    async fn read(&self, key: &str) -> Option<Value> {
        match self.store.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(payload) => {
                    debug!(key = %key, "Cache HIT");
                    Some(payload)
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "Unreadable cache entry, treating as miss");
                    None
                }
            },
            Ok(None) => {
                debug!(key = %key, "Cache MISS");
                None
            }
            Err(err) => {
                warn!(
                    key = %key,
                    backend = self.store.name(),
                    error = %err,
                    "Cache read failed, treating as miss"
                );
                None
            }
        }
    }

    async fn write(&self, key: &str, payload: &Value, ttl_seconds: u64) {
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key = %key, error = %err, "Payload not serializable, skipping cache write");
                return;
            }
        };

        match self.store.set(key, bytes, ttl_seconds).await {
            Ok(()) => debug!(key = %key, ttl = ttl_seconds, "Cache SET"),
            Err(err) => warn!(
                key = %key,
                backend = self.store.name(),
                error = %err,
                "Cache write failed, result served uncached"
            ),
        }
    }
}

fn log_upstream_failure(operation: Operation, err: &UpstreamError) {
    error!(
        operation = %operation,
        kind = err.kind(),
        error = %err,
        "Upstream fetch failed"
    );
}
