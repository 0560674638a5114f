//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::collections::HashMap;
use std::env;

use crate::error::ConfigError;
use crate::operation::Operation;

/// Fallback TTL in seconds for operations without a configured entry.
pub const DEFAULT_CACHE_TTL: u64 = 3600;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults,
/// except the upstream credential which must be provided.
#[derive(Debug, Clone)]
pub struct Config {
    /// TMDb API key, appended to every upstream request
    pub tmdb_api_key: String,
    /// TMDb REST base URL
    pub tmdb_base_url: String,
    /// TMDb image CDN base URL
    pub tmdb_image_base_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of entries the in-memory cache can hold
    pub max_entries: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// TTL used for operations missing from `cache_ttl`
    pub default_ttl: u64,
    /// Per-operation TTL in seconds; zero disables caching
    pub cache_ttl: HashMap<Operation, u64>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TMDB_API_KEY` - Upstream credential (required, see [`Config::validate`])
    /// - `TMDB_BASE_URL` - Upstream base URL (default: https://api.themoviedb.org/3)
    /// - `TMDB_IMAGE_BASE_URL` - Image base URL (default: https://image.tmdb.org/t/p/)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 10000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream timeout in seconds (default: 10)
    /// - `CACHE_DEFAULT_TTL` - Fallback TTL in seconds (default: 3600)
    /// - `CACHE_TTL_<OPERATION>` - Per-operation TTL, e.g. `CACHE_TTL_TRENDING`
    ///
    /// Unparseable numeric values are rejected rather than silently defaulted.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut cache_ttl = HashMap::new();
        for op in Operation::ALL {
            let ttl = parse_var(&op.ttl_env_var())?.unwrap_or_else(|| op.default_ttl());
            cache_ttl.insert(op, ttl);
        }

        Ok(Self {
            tmdb_api_key: env::var("TMDB_API_KEY").unwrap_or_default(),
            tmdb_base_url: env::var("TMDB_BASE_URL").unwrap_or(defaults.tmdb_base_url),
            tmdb_image_base_url: env::var("TMDB_IMAGE_BASE_URL")
                .unwrap_or(defaults.tmdb_image_base_url),
            server_port: parse_var("SERVER_PORT")?.unwrap_or(defaults.server_port),
            max_entries: parse_var("MAX_ENTRIES")?.unwrap_or(defaults.max_entries),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")?.unwrap_or(defaults.cleanup_interval),
            upstream_timeout: parse_var("UPSTREAM_TIMEOUT_SECS")?
                .unwrap_or(defaults.upstream_timeout),
            default_ttl: parse_var("CACHE_DEFAULT_TTL")?.unwrap_or(defaults.default_ttl),
            cache_ttl,
        })
    }

    /// Rejects configurations that would send unauthenticated requests.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tmdb_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb_api_key: String::new(),
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_image_base_url: "https://image.tmdb.org/t/p/".to_string(),
            server_port: 8000,
            max_entries: 10_000,
            cleanup_interval: 60,
            upstream_timeout: 10,
            default_ttl: DEFAULT_CACHE_TTL,
            cache_ttl: Operation::ALL
                .iter()
                .map(|op| (*op, op.default_ttl()))
                .collect(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                var: var.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
