//! API Handlers
//!
//! HTTP request handlers for the movie proxy endpoints.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::{ApiError, Result};
use crate::library::{Library, LibraryEntry, ListKind, NewEntry};
use crate::models::{
    parse_page, AddToListRequest, FavoriteCheck, FavoriteResponse, Genre, GenreSyncResponse,
    HealthResponse, ImageUrls, InvalidateQuery, InvalidateResponse, MessageResponse, Movie,
    MovieList, PageQuery, SearchQuery, StatsResponse, TrendingQuery, TtlEntry, WatchlistCheck,
    WatchlistResponse,
};
use crate::operation::Operation;
use crate::service::{MovieService, TimeWindow};

/// Header carrying the caller id on per-user endpoints.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: MovieService,
    pub catalog: Catalog,
    pub library: Library,
    pub images: ImageUrls,
}

impl AppState {
    /// State with an empty favorites/watchlist library.
    pub fn new(service: MovieService, catalog: Catalog, images: ImageUrls) -> Self {
        Self {
            service,
            catalog,
            library: Library::new(),
            images,
        }
    }
}

fn parse_movie_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::InvalidRequest(format!("Invalid movie id: {}", raw)))
}

fn shape_list(state: &AppState, payload: &Value, page: u32) -> Json<MovieList> {
    Json(MovieList::from_upstream(payload, page, &state.images))
}

// == Upstream-backed lists ==

/// GET /api/movies/trending
pub async fn trending_handler(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<MovieList>> {
    let window = TimeWindow::parse_lenient(query.time_window.as_deref());
    let page = parse_page(query.page.as_deref()).unwrap_or(1);

    let payload = state
        .service
        .trending(window, page)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch trending movies", e))?;
    Ok(shape_list(&state, &payload, page))
}

/// GET /api/movies/popular
pub async fn popular_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MovieList>> {
    let page = query.page();
    let payload = state
        .service
        .popular(page)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch popular movies", e))?;
    Ok(shape_list(&state, &payload, page))
}

/// GET /api/movies/top-rated
pub async fn top_rated_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MovieList>> {
    let page = query.page();
    let payload = state
        .service
        .top_rated(page)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch top rated movies", e))?;
    Ok(shape_list(&state, &payload, page))
}

/// GET /api/movies/now-playing
pub async fn now_playing_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MovieList>> {
    let page = query.page();
    let payload = state
        .service
        .now_playing(page)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch now playing movies", e))?;
    Ok(shape_list(&state, &payload, page))
}

/// GET /api/movies/upcoming
pub async fn upcoming_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MovieList>> {
    let page = query.page();
    let payload = state
        .service
        .upcoming(page)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch upcoming movies", e))?;
    Ok(shape_list(&state, &payload, page))
}

/// GET /api/movies/search
///
/// A blank query is rejected before any cache or upstream access.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<MovieList>> {
    let text = query.validate().map_err(ApiError::InvalidRequest)?;
    let page = parse_page(query.page.as_deref()).unwrap_or(1);

    let payload = state
        .service
        .search(&text, page)
        .await
        .map_err(|e| ApiError::upstream("Failed to search movies", e))?;
    Ok(shape_list(&state, &payload, page))
}

/// GET /api/movies/discover
pub async fn discover_handler(
    State(state): State<AppState>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<Json<MovieList>> {
    let page = parse_page(filters.get("page").map(String::as_str)).unwrap_or(1);
    let payload = state
        .service
        .discover(&filters, page)
        .await
        .map_err(|e| ApiError::upstream("Failed to discover movies", e))?;
    Ok(shape_list(&state, &payload, page))
}

/// GET /api/movies/:id/recommendations
pub async fn recommendations_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MovieList>> {
    let movie_id = parse_movie_id(&id)?;
    let page = query.page();
    let payload = state
        .service
        .recommendations(movie_id, page)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch recommendations", e))?;
    Ok(shape_list(&state, &payload, page))
}

/// GET /api/movies/:id/similar
pub async fn similar_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MovieList>> {
    let movie_id = parse_movie_id(&id)?;
    let page = query.page();
    let payload = state
        .service
        .similar(movie_id, page)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch similar movies", e))?;
    Ok(shape_list(&state, &payload, page))
}

/// GET /api/movies/:id/details
///
/// Returns the upstream payload verbatim and records the movie in the
/// local catalog.
pub async fn details_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let movie_id = parse_movie_id(&id)?;
    let payload = state
        .service
        .movie_details(movie_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch movie details", e))?;

    match Movie::from_details(&payload, &state.images) {
        Some(movie) => {
            let created = state.catalog.upsert_movie(movie).await;
            debug!(movie_id, created, "Catalog upsert");
        }
        None => warn!(movie_id, "Details payload has no usable movie record"),
    }

    Ok(Json(payload))
}

// == Local catalog ==

/// GET /api/movies
pub async fn list_movies_handler(State(state): State<AppState>) -> Json<Vec<Movie>> {
    Json(state.catalog.movies().await)
}

/// GET /api/movies/:id
pub async fn get_movie_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Movie>> {
    let movie_id = parse_movie_id(&id)?;
    state
        .catalog
        .movie(movie_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Movie {} not found", movie_id)))
}

/// GET /api/genres
pub async fn list_genres_handler(State(state): State<AppState>) -> Json<Vec<Genre>> {
    Json(state.catalog.genres().await)
}

/// GET /api/genres/fetch-from-tmdb
///
/// Syncs the catalog from the cached genre list.
pub async fn sync_genres_handler(State(state): State<AppState>) -> Result<Json<GenreSyncResponse>> {
    let payload = state
        .service
        .genres()
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch genres", e))?;
    Ok(Json(apply_genres(&state, &payload).await))
}

/// POST /api/genres/fetch-from-tmdb
///
/// Drops the cached genre list before syncing.
pub async fn refresh_genres_handler(
    State(state): State<AppState>,
) -> Result<Json<GenreSyncResponse>> {
    let payload = state
        .service
        .refresh_genres()
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch genres", e))?;
    Ok(Json(apply_genres(&state, &payload).await))
}

async fn apply_genres(state: &AppState, payload: &Value) -> GenreSyncResponse {
    let summary = state
        .catalog
        .sync_genres(Genre::list_from_payload(payload))
        .await;
    GenreSyncResponse::new(summary)
}

// == Favorites and watchlist ==

fn caller_id(headers: &HeaderMap) -> Result<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::Unauthorized(format!("{} header is required", USER_ID_HEADER))
        })
}

/// Validates the body and fills a missing title from the catalog.
async fn new_entry(state: &AppState, req: AddToListRequest) -> Result<NewEntry> {
    if let Some(msg) = req.validate() {
        return Err(ApiError::InvalidRequest(msg));
    }

    let title = match req.title.filter(|t| !t.trim().is_empty()) {
        Some(title) => title,
        None => state
            .catalog
            .movie(req.tmdb_id)
            .await
            .map(|m| m.title)
            .unwrap_or_default(),
    };
    Ok(NewEntry {
        tmdb_id: req.tmdb_id,
        title,
        poster_path: req.poster_path,
    })
}

async fn add_entry(
    state: &AppState,
    headers: &HeaderMap,
    kind: ListKind,
    req: AddToListRequest,
) -> Result<(LibraryEntry, bool)> {
    let user = caller_id(headers)?;
    let new = new_entry(state, req).await?;
    let (entry, created) = state.library.add(&user, kind, new).await;
    debug!(user = %user, list = kind.as_str(), tmdb_id = entry.tmdb_id, created, "List add");
    Ok((entry, created))
}

async fn remove_entry(
    state: &AppState,
    headers: &HeaderMap,
    kind: ListKind,
    raw_id: &str,
) -> Result<Json<MessageResponse>> {
    let user = caller_id(headers)?;
    let tmdb_id = parse_movie_id(raw_id)?;
    let (removed, missing) = match kind {
        ListKind::Favorites => ("Movie removed from favorites", "Movie not in favorites"),
        ListKind::Watchlist => ("Movie removed from watchlist", "Movie not in watchlist"),
    };

    if state.library.remove(&user, kind, tmdb_id).await {
        Ok(Json(MessageResponse::new(removed)))
    } else {
        Err(ApiError::NotFound(missing.to_string()))
    }
}

fn created_status(created: bool) -> StatusCode {
    if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

/// GET /api/favorites
pub async fn list_favorites_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<LibraryEntry>>> {
    let user = caller_id(&headers)?;
    Ok(Json(state.library.list(&user, ListKind::Favorites).await))
}

/// POST /api/favorites
///
/// 201 when added, 200 with the existing entry when already present.
pub async fn add_favorite_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AddToListRequest>,
) -> Result<(StatusCode, Json<FavoriteResponse>)> {
    let (favorite, created) = add_entry(&state, &headers, ListKind::Favorites, req).await?;
    let message = if created {
        "Movie added to favorites"
    } else {
        "Movie already in favorites"
    };
    Ok((
        created_status(created),
        Json(FavoriteResponse {
            message: message.to_string(),
            favorite,
        }),
    ))
}

/// DELETE /api/favorites/:movie_id
pub async fn remove_favorite_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    remove_entry(&state, &headers, ListKind::Favorites, &id).await
}

/// GET /api/favorites/check/:movie_id
pub async fn check_favorite_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<FavoriteCheck>> {
    let user = caller_id(&headers)?;
    let tmdb_id = parse_movie_id(&id)?;
    let is_favorite = state
        .library
        .contains(&user, ListKind::Favorites, tmdb_id)
        .await;
    Ok(Json(FavoriteCheck {
        is_favorite,
        tmdb_id,
    }))
}

/// GET /api/watchlist
pub async fn list_watchlist_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<LibraryEntry>>> {
    let user = caller_id(&headers)?;
    Ok(Json(state.library.list(&user, ListKind::Watchlist).await))
}

/// POST /api/watchlist
pub async fn add_watchlist_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AddToListRequest>,
) -> Result<(StatusCode, Json<WatchlistResponse>)> {
    let (watchlist, created) = add_entry(&state, &headers, ListKind::Watchlist, req).await?;
    let message = if created {
        "Movie added to watchlist"
    } else {
        "Movie already in watchlist"
    };
    Ok((
        created_status(created),
        Json(WatchlistResponse {
            message: message.to_string(),
            watchlist,
        }),
    ))
}

/// DELETE /api/watchlist/:movie_id
pub async fn remove_watchlist_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    remove_entry(&state, &headers, ListKind::Watchlist, &id).await
}

/// GET /api/watchlist/check/:movie_id
pub async fn check_watchlist_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<WatchlistCheck>> {
    let user = caller_id(&headers)?;
    let tmdb_id = parse_movie_id(&id)?;
    let is_in_watchlist = state
        .library
        .contains(&user, ListKind::Watchlist, tmdb_id)
        .await;
    Ok(Json(WatchlistCheck {
        is_in_watchlist,
        tmdb_id,
    }))
}

// == Cache administration ==

/// GET /api/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let fetcher = state.service.fetcher();
    let stats = fetcher.store().stats().await.unwrap_or_default();
    let ttl = fetcher
        .policy()
        .entries()
        .into_iter()
        .map(|(operation, ttl)| TtlEntry {
            operation: operation.as_str(),
            seconds: ttl.as_secs(),
        })
        .collect();

    Json(StatsResponse::new(fetcher.store().name(), stats, ttl))
}

/// DELETE /api/cache?pattern=
pub async fn invalidate_pattern_handler(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>> {
    let pattern = query.validate().map_err(ApiError::InvalidRequest)?;

    let deleted = state
        .service
        .fetcher()
        .invalidate_matching(&pattern)
        .await?;
    Ok(Json(InvalidateResponse { pattern, deleted }))
}

/// DELETE /api/cache/:operation
pub async fn invalidate_operation_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    let operation: Operation = name.parse().map_err(ApiError::InvalidRequest)?;
    let deleted = state
        .service
        .fetcher()
        .invalidate_operation(operation)
        .await?;
    Ok(Json(InvalidateResponse {
        pattern: crate::cache::operation_pattern(operation.as_str()),
        deleted,
    }))
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
