//! API Routes
//!
//! Configures the Axum router with all movie proxy endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_favorite_handler, add_watchlist_handler, cache_stats_handler, check_favorite_handler,
    check_watchlist_handler, details_handler, discover_handler, get_movie_handler,
    health_handler, invalidate_operation_handler, invalidate_pattern_handler,
    list_favorites_handler, list_genres_handler, list_movies_handler, list_watchlist_handler,
    now_playing_handler, popular_handler, recommendations_handler, refresh_genres_handler,
    remove_favorite_handler, remove_watchlist_handler, search_handler, similar_handler,
    sync_genres_handler, top_rated_handler, trending_handler, upcoming_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// Static segments under `/api/movies` take priority over `/:id`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/movies", get(list_movies_handler))
        .route("/api/movies/trending", get(trending_handler))
        .route("/api/movies/popular", get(popular_handler))
        .route("/api/movies/top-rated", get(top_rated_handler))
        .route("/api/movies/now-playing", get(now_playing_handler))
        .route("/api/movies/upcoming", get(upcoming_handler))
        .route("/api/movies/search", get(search_handler))
        .route("/api/movies/discover", get(discover_handler))
        .route("/api/movies/:id", get(get_movie_handler))
        .route("/api/movies/:id/details", get(details_handler))
        .route("/api/movies/:id/recommendations", get(recommendations_handler))
        .route("/api/movies/:id/similar", get(similar_handler))
        .route("/api/genres", get(list_genres_handler))
        .route(
            "/api/genres/fetch-from-tmdb",
            get(sync_genres_handler).post(refresh_genres_handler),
        )
        .route(
            "/api/favorites",
            get(list_favorites_handler).post(add_favorite_handler),
        )
        .route("/api/favorites/:movie_id", delete(remove_favorite_handler))
        .route("/api/favorites/check/:movie_id", get(check_favorite_handler))
        .route(
            "/api/watchlist",
            get(list_watchlist_handler).post(add_watchlist_handler),
        )
        .route("/api/watchlist/:movie_id", delete(remove_watchlist_handler))
        .route("/api/watchlist/check/:movie_id", get(check_watchlist_handler))
        .route("/api/cache", delete(invalidate_pattern_handler))
        .route("/api/cache/stats", get(cache_stats_handler))
        .route("/api/cache/:operation", delete(invalidate_operation_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
