//! Movie and genre models
//!
//! Typed views over upstream payloads plus the records kept in the local
//! catalog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Image size used for posters.
pub const POSTER_SIZE: &str = "w500";
/// Image size used for backdrops.
pub const BACKDROP_SIZE: &str = "original";

// == Image URLs ==
/// Builds absolute image URLs from upstream image paths.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base: String,
}

impl ImageUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    /// `None` for a missing or empty path.
    pub fn url(&self, path: Option<&str>, size: &str) -> Option<String> {
        match path {
            Some(p) if !p.is_empty() => Some(format!("{}{}{}", self.base, size, p)),
            _ => None,
        }
    }

    pub fn poster(&self, path: Option<&str>) -> Option<String> {
        self.url(path, POSTER_SIZE)
    }

    pub fn backdrop(&self, path: Option<&str>) -> Option<String> {
        self.url(path, BACKDROP_SIZE)
    }
}

/// Vote average on a 0..=100 scale, truncated.
pub fn rating_percentage(vote_average: f64) -> i64 {
    (vote_average * 10.0) as i64
}

// == Genre ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(rename = "tmdb_id", alias = "id")]
    pub tmdb_id: i64,
    pub name: String,
}

impl Genre {
    /// Reads the `genres` array of a genre-list payload.
    pub fn list_from_payload(payload: &Value) -> Vec<Genre> {
        payload
            .get("genres")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

// == Upstream movie (list item) ==
#[derive(Debug, Clone, Deserialize)]
struct UpstreamMovie {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    vote_count: i64,
    #[serde(default)]
    popularity: f64,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    original_language: String,
    #[serde(default)]
    adult: bool,
    #[serde(default)]
    genre_ids: Vec<i64>,
}

// == Movie Summary ==
/// One entry of a movie list response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub original_language: String,
    pub adult: bool,
    pub genre_ids: Vec<i64>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub rating_percentage: i64,
}

impl MovieSummary {
    /// Parses one upstream list item. Items without an integer `id` are skipped.
    pub fn from_upstream(item: &Value, images: &ImageUrls) -> Option<Self> {
        let movie: UpstreamMovie = match serde_json::from_value(item.clone()) {
            Ok(movie) => movie,
            Err(err) => {
                debug!(error = %err, "Skipping malformed movie entry");
                return None;
            }
        };

        Some(Self {
            poster_url: images.poster(movie.poster_path.as_deref()),
            backdrop_url: images.backdrop(movie.backdrop_path.as_deref()),
            rating_percentage: rating_percentage(movie.vote_average),
            id: movie.id,
            title: movie.title,
            overview: movie.overview,
            release_date: movie.release_date.filter(|d| !d.is_empty()),
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            popularity: movie.popularity,
            poster_path: movie.poster_path,
            backdrop_path: movie.backdrop_path,
            original_language: movie.original_language,
            adult: movie.adult,
            genre_ids: movie.genre_ids,
        })
    }
}

// == Movie List ==
/// Paged list of movies as returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieList {
    pub page: i64,
    pub total_pages: i64,
    pub total_results: i64,
    pub results: Vec<MovieSummary>,
}

impl MovieList {
    /// Shapes an upstream list payload. Missing paging fields default to
    /// the requested page, one page and zero results.
    pub fn from_upstream(payload: &Value, requested_page: u32, images: &ImageUrls) -> Self {
        let results = payload
            .get("results")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| MovieSummary::from_upstream(item, images))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            page: payload
                .get("page")
                .and_then(Value::as_i64)
                .unwrap_or(i64::from(requested_page)),
            total_pages: payload
                .get("total_pages")
                .and_then(Value::as_i64)
                .unwrap_or(1),
            total_results: payload
                .get("total_results")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            results,
        }
    }
}

// == Movie (catalog record) ==
#[derive(Debug, Clone, Deserialize)]
struct UpstreamMovieDetails {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    original_title: String,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    tagline: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    runtime: Option<i64>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    vote_count: i64,
    #[serde(default)]
    popularity: f64,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    original_language: String,
    #[serde(default)]
    adult: bool,
    #[serde(default)]
    video: bool,
    #[serde(default)]
    genres: Vec<Genre>,
}

/// A movie stored in the local catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub tmdb_id: i64,
    pub title: String,
    pub original_title: String,
    pub overview: String,
    pub tagline: String,
    pub release_date: Option<NaiveDate>,
    pub runtime: Option<i64>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub popularity: f64,
    pub poster_path: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_path: Option<String>,
    pub backdrop_url: Option<String>,
    pub original_language: String,
    pub adult: bool,
    pub video: bool,
    pub genres: Vec<Genre>,
    pub rating_percentage: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// Builds a catalog record from a movie-details payload.
    pub fn from_details(payload: &Value, images: &ImageUrls) -> Option<Self> {
        let details: UpstreamMovieDetails = serde_json::from_value(payload.clone()).ok()?;
        let now = Utc::now();
        let vote_average = details.vote_average.clamp(0.0, 10.0);

        Some(Self {
            tmdb_id: details.id,
            title: details.title,
            original_title: details.original_title,
            overview: details.overview,
            tagline: details.tagline.unwrap_or_default(),
            release_date: details
                .release_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            runtime: details.runtime,
            vote_average,
            vote_count: details.vote_count,
            popularity: details.popularity,
            poster_url: images.poster(details.poster_path.as_deref()),
            poster_path: details.poster_path,
            backdrop_url: images.backdrop(details.backdrop_path.as_deref()),
            backdrop_path: details.backdrop_path,
            original_language: details.original_language,
            adult: details.adult,
            video: details.video,
            genres: details.genres,
            rating_percentage: rating_percentage(vote_average),
            created_at: now,
            updated_at: now,
        })
    }
}
