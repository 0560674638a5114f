//! Movie Proxy - a caching HTTP front for the TMDB movie API
//!
//! Upstream responses are cached per operation and parameter set with
//! per-operation TTLs, in an in-memory store with LRU eviction. Per-user
//! favorites and watchlists are kept alongside a local movie catalog.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod operation;
pub mod service;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use cache::{CachedFetcher, CacheStore, MemoryStore, TtlPolicy};
pub use catalog::Catalog;
pub use config::Config;
pub use library::Library;
pub use operation::Operation;
pub use service::MovieService;
pub use tasks::spawn_cleanup_task;
pub use upstream::{TmdbClient, Upstream};
