//! Library Module
//!
//! Per-user favorites and watchlist, held in process. Lists are keyed by
//! the caller id; a movie appears at most once per list.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

// == List Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Favorites,
    Watchlist,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Favorites => "favorites",
            ListKind::Watchlist => "watchlist",
        }
    }
}

// == Library Entry ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryEntry {
    /// Record id, unique across all lists
    pub id: u64,
    pub tmdb_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Movie fields supplied when adding to a list.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub tmdb_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
}

#[derive(Debug, Default)]
struct LibraryInner {
    next_id: u64,
    lists: HashMap<(String, ListKind), Vec<LibraryEntry>>,
}

// == Library ==
/// Cloning shares the same lists.
#[derive(Debug, Clone, Default)]
pub struct Library {
    inner: Arc<RwLock<LibraryInner>>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a movie to the caller's list. Returns the stored entry and
    /// whether it was created; an existing entry is returned unchanged.
    pub async fn add(&self, user: &str, kind: ListKind, new: NewEntry) -> (LibraryEntry, bool) {
        let mut inner = self.inner.write().await;

        let key = (user.to_string(), kind);
        if let Some(existing) = inner
            .lists
            .get(&key)
            .and_then(|list| list.iter().find(|e| e.tmdb_id == new.tmdb_id))
        {
            return (existing.clone(), false);
        }

        inner.next_id += 1;
        let entry = LibraryEntry {
            id: inner.next_id,
            tmdb_id: new.tmdb_id,
            title: new.title,
            poster_path: new.poster_path,
            added_at: Utc::now(),
        };
        inner.lists.entry(key).or_default().push(entry.clone());
        (entry, true)
    }

    /// Removes a movie from the caller's list. False when it was not there.
    pub async fn remove(&self, user: &str, kind: ListKind, tmdb_id: i64) -> bool {
        let mut inner = self.inner.write().await;
        let Some(list) = inner.lists.get_mut(&(user.to_string(), kind)) else {
            return false;
        };
        let before = list.len();
        list.retain(|e| e.tmdb_id != tmdb_id);
        before != list.len()
    }

    /// The caller's list, most recently added first.
    pub async fn list(&self, user: &str, kind: ListKind) -> Vec<LibraryEntry> {
        let inner = self.inner.read().await;
        let mut entries = inner
            .lists
            .get(&(user.to_string(), kind))
            .cloned()
            .unwrap_or_default();
        entries.reverse();
        entries
    }

    pub async fn contains(&self, user: &str, kind: ListKind, tmdb_id: i64) -> bool {
        self.inner
            .read()
            .await
            .lists
            .get(&(user.to_string(), kind))
            .is_some_and(|list| list.iter().any(|e| e.tmdb_id == tmdb_id))
    }
}
