//! Integration Tests for API Endpoints
//!
//! Full request/response cycles against the router, with a scripted
//! upstream standing in for TMDB.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use movie_proxy::{
    cache::ParamSet, create_router, error::UpstreamError, models::ImageUrls, AppState,
    CachedFetcher, Catalog, MemoryStore, MovieService, TtlPolicy, Upstream,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helpers ==

/// Answers by endpoint and counts calls; `down` makes every call fail.
#[derive(Default)]
struct FakeTmdb {
    calls: AtomicUsize,
    down: AtomicBool,
}

impl FakeTmdb {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for FakeTmdb {
    async fn call(&self, endpoint: &str, params: &ParamSet) -> Result<Value, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(UpstreamError::Http(500));
        }

        let payload = match endpoint {
            "/genre/movie/list" => json!({
                "genres": [{"id": 28, "name": "Action"}, {"id": 18, "name": "Drama"}]
            }),
            "/movie/550" => json!({
                "id": 550,
                "title": "Fight Club",
                "release_date": "1999-10-15",
                "vote_average": 8.4,
                "popularity": 61.4,
                "genres": [{"id": 18, "name": "Drama"}],
                "credits": {"cast": []}
            }),
            _ => json!({
                "page": params.get("page").map(|p| p.to_string()).and_then(|p| p.parse::<i64>().ok()).unwrap_or(1),
                "total_pages": 5,
                "total_results": 100,
                "results": [
                    {"id": 27205, "title": "Inception", "vote_average": 8.37, "poster_path": "/inception.jpg"}
                ]
            }),
        };
        Ok(payload)
    }
}

struct TestApp {
    router: Router,
    upstream: Arc<FakeTmdb>,
}

impl TestApp {
    fn new() -> Self {
        let upstream = Arc::new(FakeTmdb::default());
        let fetcher = CachedFetcher::new(Arc::new(MemoryStore::new(100)), TtlPolicy::default());
        let service = MovieService::new(fetcher, upstream.clone());
        let state = AppState::new(
            service,
            Catalog::new(),
            ImageUrls::new("https://image.tmdb.org/t/p/"),
        );
        Self {
            router: create_router(state),
            upstream,
        }
    }

    async fn request(&self, method: &str, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn as_user(&self, user: &str, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", user);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

// == Cached lists ==

#[tokio::test]
async fn test_trending_second_request_served_from_cache() {
    let app = TestApp::new();

    let (status, first) = app
        .request("GET", "/api/movies/trending?time_window=day&page=1")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.upstream.calls(), 1);

    let (status, second) = app
        .request("GET", "/api/movies/trending?page=1&time_window=day")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.upstream.calls(), 1);
    assert_eq!(first, second);

    let movie = &first["results"][0];
    assert_eq!(movie["title"], "Inception");
    assert_eq!(movie["rating_percentage"], 83);
    assert_eq!(
        movie["poster_url"],
        "https://image.tmdb.org/t/p/w500/inception.jpg"
    );
}

#[tokio::test]
async fn test_different_pages_are_separate_entries() {
    let app = TestApp::new();

    app.request("GET", "/api/movies/popular?page=1").await;
    let (_, body) = app.request("GET", "/api/movies/popular?page=2").await;

    assert_eq!(app.upstream.calls(), 2);
    assert_eq!(body["page"], 2);
}

#[tokio::test]
async fn test_upstream_failure_is_503_and_not_cached() {
    let app = TestApp::new();
    app.upstream.down.store(true, Ordering::SeqCst);

    let (status, body) = app.request("GET", "/api/movies/upcoming").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("upcoming"));

    app.upstream.down.store(false, Ordering::SeqCst);
    let (status, _) = app.request("GET", "/api/movies/upcoming").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.upstream.calls(), 2);

    let (_, stats) = app.request("GET", "/api/cache/stats").await;
    assert_eq!(stats["writes"], 1);
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = TestApp::new();

    let (status, body) = app.request("GET", "/api/movies/search?query=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query parameter is required");

    let (status, _) = app.request("GET", "/api/movies/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.upstream.calls(), 0);

    let (status, _) = app.request("GET", "/api/movies/search?query=inception").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.upstream.calls(), 1);
}

// == Catalog ==

#[tokio::test]
async fn test_genre_sync_then_list() {
    let app = TestApp::new();

    let (status, body) = app.request("POST", "/api/genres/fetch-from-tmdb").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], 2);
    assert_eq!(body["updated"], 0);

    let (_, body) = app.request("GET", "/api/genres/fetch-from-tmdb").await;
    assert_eq!(body["updated"], 2);
    // GET syncs from the cached list
    assert_eq!(app.upstream.calls(), 1);

    // POST drops the cached list first
    app.request("POST", "/api/genres/fetch-from-tmdb").await;
    assert_eq!(app.upstream.calls(), 2);

    let (_, genres) = app.request("GET", "/api/genres").await;
    let names: Vec<&str> = genres
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Action", "Drama"]);
}

#[tokio::test]
async fn test_details_recorded_in_catalog() {
    let app = TestApp::new();

    let (status, _) = app.request("GET", "/api/movies/550").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, details) = app.request("GET", "/api/movies/550/details").await;
    assert_eq!(status, StatusCode::OK);
    assert!(details.get("credits").is_some());

    let (status, movie) = app.request("GET", "/api/movies/550").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(movie["title"], "Fight Club");
    assert_eq!(movie["rating_percentage"], 84);

    let (_, movies) = app.request("GET", "/api/movies").await;
    assert_eq!(movies.as_array().unwrap().len(), 1);
}

// == Favorites and watchlist ==

#[tokio::test]
async fn test_favorites_flow() {
    let app = TestApp::new();
    let movie = json!({"tmdb_id": 550, "title": "Fight Club"});

    let (status, body) = app
        .as_user("alice", "POST", "/api/favorites", Some(movie.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Movie added to favorites");
    assert_eq!(body["favorite"]["tmdb_id"], 550);

    let (status, body) = app
        .as_user("alice", "POST", "/api/favorites", Some(movie))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Movie already in favorites");

    let (_, check) = app.as_user("alice", "GET", "/api/favorites/check/550", None).await;
    assert_eq!(check["is_favorite"], true);
    let (_, check) = app.as_user("bob", "GET", "/api/favorites/check/550", None).await;
    assert_eq!(check["is_favorite"], false);

    let (_, list) = app.as_user("alice", "GET", "/api/favorites", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app.as_user("alice", "DELETE", "/api/favorites/550", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.as_user("alice", "DELETE", "/api/favorites/550", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_watchlist_title_from_catalog() {
    let app = TestApp::new();
    app.request("GET", "/api/movies/550/details").await;

    let (status, body) = app
        .as_user("alice", "POST", "/api/watchlist", Some(json!({"tmdb_id": 550})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["watchlist"]["title"], "Fight Club");

    let (_, check) = app.as_user("alice", "GET", "/api/watchlist/check/550", None).await;
    assert_eq!(check["is_in_watchlist"], true);

    let (status, _) = app.request("GET", "/api/watchlist").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// == Cache administration ==

#[tokio::test]
async fn test_invalidate_operation_forces_refetch() {
    let app = TestApp::new();

    app.request("GET", "/api/movies/top-rated").await;
    app.request("GET", "/api/movies/now-playing").await;
    assert_eq!(app.upstream.calls(), 2);

    let (status, body) = app.request("DELETE", "/api/cache/top_rated").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);
    assert_eq!(body["pattern"], "top_rated:*");

    app.request("GET", "/api/movies/top-rated").await;
    app.request("GET", "/api/movies/now-playing").await;
    assert_eq!(app.upstream.calls(), 3);
}

#[tokio::test]
async fn test_invalidate_by_pattern() {
    let app = TestApp::new();

    app.request("GET", "/api/movies/550/similar").await;
    app.request("GET", "/api/movies/551/similar").await;

    let (status, body) = app.request("DELETE", "/api/cache?pattern=similar:*").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);

    let (status, _) = app.request("DELETE", "/api/cache?pattern=%5B").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.request("DELETE", "/api/cache").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Pattern parameter is required");
}

#[tokio::test]
async fn test_cache_stats_counts() {
    let app = TestApp::new();

    app.request("GET", "/api/movies/popular").await;
    app.request("GET", "/api/movies/popular").await;

    let (status, stats) = app.request("GET", "/api/cache/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["backend"], "memory");
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["total_entries"], 1);
    assert_eq!(stats["hit_rate"], 0.5);
    assert_eq!(stats["ttl"].as_array().unwrap().len(), 11);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();
    let (status, body) = app.request("GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
