//! Request DTOs for the movie API
//!
//! Query strings are taken as raw strings and parsed leniently, so a
//! malformed `page` falls back to the first page instead of a 400.

use serde::Deserialize;

/// Parses a page number; `None` when absent or not a positive integer.
pub fn parse_page(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|p| p.trim().parse::<u32>().ok())
        .filter(|p| *p >= 1)
}

/// `?page=` for list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

impl PageQuery {
    /// Requested page, defaulting to 1.
    pub fn page(&self) -> u32 {
        parse_page(self.page.as_deref()).unwrap_or(1)
    }
}

/// `?time_window=&page=` for trending
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendingQuery {
    #[serde(default)]
    pub time_window: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

/// `?query=&page=` for search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl SearchQuery {
    /// Trimmed search text, or an error message when blank.
    pub fn validate(&self) -> Result<String, String> {
        match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => Ok(q.to_string()),
            _ => Err("Query parameter is required".to_string()),
        }
    }
}

/// `?pattern=` for cache invalidation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateQuery {
    #[serde(default)]
    pub pattern: Option<String>,
}

impl InvalidateQuery {
    /// The pattern as given, or an error message when absent or blank.
    pub fn validate(&self) -> Result<String, String> {
        match self.pattern.as_deref() {
            Some(p) if !p.trim().is_empty() => Ok(p.to_string()),
            _ => Err("Pattern parameter is required".to_string()),
        }
    }
}

/// Body for adding a movie to favorites or the watchlist
#[derive(Debug, Clone, Deserialize)]
pub struct AddToListRequest {
    pub tmdb_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl AddToListRequest {
    pub fn validate(&self) -> Option<String> {
        if self.tmdb_id <= 0 {
            return Some("tmdb_id must be a positive integer".to_string());
        }
        None
    }
}
