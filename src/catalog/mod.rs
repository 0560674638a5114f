//! Catalog Module
//!
//! Process-local catalog of genres and movies synchronized from the
//! upstream API.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::models::{Genre, Movie};

// == Genre Sync Summary ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenreSync {
    pub created: usize,
    pub updated: usize,
    pub total: usize,
}

#[derive(Debug, Default)]
struct CatalogInner {
    genres: HashMap<i64, Genre>,
    movies: HashMap<i64, Movie>,
}

// == Catalog ==
/// Cloning shares the same records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    inner: Arc<RwLock<CatalogInner>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts genres by `tmdb_id`.
    pub async fn sync_genres(&self, genres: Vec<Genre>) -> GenreSync {
        let mut inner = self.inner.write().await;
        let mut summary = GenreSync {
            created: 0,
            updated: 0,
            total: genres.len(),
        };

        for genre in genres {
            match inner.genres.insert(genre.tmdb_id, genre) {
                Some(_) => summary.updated += 1,
                None => summary.created += 1,
            }
        }
        summary
    }

    /// All genres ordered by name.
    pub async fn genres(&self) -> Vec<Genre> {
        let mut genres: Vec<Genre> = self.inner.read().await.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name).then(a.tmdb_id.cmp(&b.tmdb_id)));
        genres
    }

    /// Inserts or refreshes a movie, keeping its original `created_at`.
    /// Returns true when the movie was new.
    pub async fn upsert_movie(&self, mut movie: Movie) -> bool {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.movies.get(&movie.tmdb_id) {
            movie.created_at = existing.created_at;
        }
        for genre in &movie.genres {
            inner
                .genres
                .entry(genre.tmdb_id)
                .or_insert_with(|| genre.clone());
        }
        inner.movies.insert(movie.tmdb_id, movie).is_none()
    }

    /// Movies ordered by popularity, then vote average, both descending.
    pub async fn movies(&self) -> Vec<Movie> {
        let mut movies: Vec<Movie> = self.inner.read().await.movies.values().cloned().collect();
        movies.sort_by(|a, b| {
            b.popularity
                .partial_cmp(&a.popularity)
                .unwrap_or(Ordering::Equal)
                .then(
                    b.vote_average
                        .partial_cmp(&a.vote_average)
                        .unwrap_or(Ordering::Equal),
                )
                .then(a.tmdb_id.cmp(&b.tmdb_id))
        });
        movies
    }

    pub async fn movie(&self, tmdb_id: i64) -> Option<Movie> {
        self.inner.read().await.movies.get(&tmdb_id).cloned()
    }
}
