//! Response DTOs for the movie API

use serde::Serialize;

use crate::cache::CacheStats;
use crate::catalog::GenreSync;
use crate::library::LibraryEntry;

/// Response body for `GET /api/cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Store backend name
    pub backend: &'static str,
    #[serde(flatten)]
    pub stats: CacheStats,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    /// Resolved TTL per operation, in seconds
    pub ttl: Vec<TtlEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TtlEntry {
    pub operation: &'static str,
    pub seconds: u64,
}

impl StatsResponse {
    pub fn new(backend: &'static str, stats: CacheStats, ttl: Vec<TtlEntry>) -> Self {
        Self {
            backend,
            hit_rate: stats.hit_rate(),
            stats,
            ttl,
        }
    }
}

/// Response body for cache invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub pattern: String,
    pub deleted: usize,
}

/// Response body for `/api/genres/fetch-from-tmdb`
#[derive(Debug, Clone, Serialize)]
pub struct GenreSyncResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: GenreSync,
}

impl GenreSyncResponse {
    pub fn new(summary: GenreSync) -> Self {
        Self {
            message: "Genres synchronized successfully".to_string(),
            summary,
        }
    }
}

/// Response body for adding to favorites
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteResponse {
    pub message: String,
    pub favorite: LibraryEntry,
}

/// Response body for adding to the watchlist
#[derive(Debug, Clone, Serialize)]
pub struct WatchlistResponse {
    pub message: String,
    pub watchlist: LibraryEntry,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteCheck {
    pub is_favorite: bool,
    pub tmdb_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchlistCheck {
    pub is_in_watchlist: bool,
    pub tmdb_id: i64,
}

/// Plain `{"message": ...}` body
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_flattens_counters() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(
            "memory",
            stats,
            vec![TtlEntry {
                operation: "trending",
                seconds: 3600,
            }],
        );
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["backend"], "memory");
        assert_eq!(json["hits"], 3);
        assert_eq!(json["hit_rate"], 0.75);
        assert_eq!(json["ttl"][0]["operation"], "trending");
    }

    #[test]
    fn test_genre_sync_response_serialize() {
        let resp = GenreSyncResponse::new(GenreSync {
            created: 2,
            updated: 1,
            total: 3,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["created"], 2);
        assert_eq!(json["total"], 3);
        assert!(json["message"].as_str().unwrap().contains("synchronized"));
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
