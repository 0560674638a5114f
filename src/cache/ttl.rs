//! TTL Policy Module
//!
//! Static mapping from operation to cache lifetime, built once at startup.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::{Config, DEFAULT_CACHE_TTL};
use crate::operation::Operation;

// == TTL Policy ==
/// Per-operation cache lifetimes.
///
/// Operations without an entry resolve to the default TTL. An explicit
/// zero disables caching for that operation.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    table: HashMap<Operation, u64>,
    default_ttl: u64,
}

impl TtlPolicy {
    pub fn new(table: HashMap<Operation, u64>, default_ttl: u64) -> Self {
        Self { table, default_ttl }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_ttl.clone(), config.default_ttl)
    }

    /// Resolves the lifetime for `operation`.
    pub fn ttl_for(&self, operation: Operation) -> Duration {
        let secs = self
            .table
            .get(&operation)
            .copied()
            .unwrap_or(self.default_ttl);
        Duration::from_secs(secs)
    }

    /// False when the operation must bypass the cache store entirely.
    pub fn is_cacheable(&self, operation: Operation) -> bool {
        !self.ttl_for(operation).is_zero()
    }

    /// Resolved lifetime of every operation, in declaration order.
    pub fn entries(&self) -> Vec<(Operation, Duration)> {
        Operation::ALL
            .iter()
            .map(|op| (*op, self.ttl_for(*op)))
            .collect()
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(
            Operation::ALL
                .iter()
                .map(|op| (*op, op.default_ttl()))
                .collect(),
            DEFAULT_CACHE_TTL,
        )
    }
}
