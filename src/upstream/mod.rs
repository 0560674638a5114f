//! Upstream Module
//!
//! The interface to the third-party movie metadata API and its
//! reqwest-backed implementation.

mod tmdb;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::ParamSet;
use crate::error::UpstreamError;

pub use tmdb::TmdbClient;

/// A single-attempt call to the upstream API.
///
/// Implementations add their own credentials; `params` never carries them.
/// A call either returns the whole decoded body or a typed failure, never
/// partial data.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn call(&self, endpoint: &str, params: &ParamSet) -> Result<Value, UpstreamError>;
}
