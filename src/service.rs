//! Movie Service
//!
//! One method per upstream query shape. Each builds the endpoint path and
//! query, derives the cache-key parameters (query plus path parameters,
//! never the credential) and goes through the cached fetcher.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::cache::{CachedFetcher, ParamSet};
use crate::error::UpstreamError;
use crate::operation::Operation;
use crate::upstream::Upstream;

/// Extra sections requested with movie details.
pub const DETAILS_APPEND: &str = "videos,credits,similar,recommendations";

/// Query names callers may not set through discover filters.
const RESERVED_PARAMS: [&str; 2] = ["api_key", "page"];

// == Time Window ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

impl TimeWindow {
    /// `week` selects the weekly window; anything else is daily.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("week") => TimeWindow::Week,
            _ => TimeWindow::Day,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

// == Movie Service ==
#[derive(Clone)]
pub struct MovieService {
    fetcher: CachedFetcher,
    upstream: Arc<dyn Upstream>,
}

impl MovieService {
    pub fn new(fetcher: CachedFetcher, upstream: Arc<dyn Upstream>) -> Self {
        Self { fetcher, upstream }
    }

    pub fn fetcher(&self) -> &CachedFetcher {
        &self.fetcher
    }

    pub async fn trending(&self, window: TimeWindow, page: u32) -> Result<Value, UpstreamError> {
        self.fetch(
            Operation::Trending,
            format!("/trending/movie/{}", window.as_str()),
            ParamSet::new().with("time_window", window.as_str()),
            paged(page),
        )
        .await
    }

    pub async fn popular(&self, page: u32) -> Result<Value, UpstreamError> {
        self.fetch_list(Operation::Popular, "/movie/popular", page).await
    }

    pub async fn top_rated(&self, page: u32) -> Result<Value, UpstreamError> {
        self.fetch_list(Operation::TopRated, "/movie/top_rated", page).await
    }

    pub async fn now_playing(&self, page: u32) -> Result<Value, UpstreamError> {
        self.fetch_list(Operation::NowPlaying, "/movie/now_playing", page).await
    }

    pub async fn upcoming(&self, page: u32) -> Result<Value, UpstreamError> {
        self.fetch_list(Operation::Upcoming, "/movie/upcoming", page).await
    }

    /// `query` is expected to be trimmed and non-empty.
    pub async fn search(&self, query: &str, page: u32) -> Result<Value, UpstreamError> {
        self.fetch(
            Operation::Search,
            "/search/movie".to_string(),
            ParamSet::new(),
            paged(page).with("query", query),
        )
        .await
    }

    /// Passes `filters` through as query parameters; reserved names are dropped.
    pub async fn discover(
        &self,
        filters: &HashMap<String, String>,
        page: u32,
    ) -> Result<Value, UpstreamError> {
        let mut query = paged(page);
        for (name, value) in filters {
            if !RESERVED_PARAMS.contains(&name.as_str()) {
                query.insert(name.as_str(), value.as_str());
            }
        }
        self.fetch(
            Operation::Discover,
            "/discover/movie".to_string(),
            ParamSet::new(),
            query,
        )
        .await
    }

    pub async fn recommendations(&self, movie_id: i64, page: u32) -> Result<Value, UpstreamError> {
        self.fetch(
            Operation::Recommendations,
            format!("/movie/{}/recommendations", movie_id),
            ParamSet::new().with("movie_id", movie_id),
            paged(page),
        )
        .await
    }

    pub async fn similar(&self, movie_id: i64, page: u32) -> Result<Value, UpstreamError> {
        self.fetch(
            Operation::Similar,
            format!("/movie/{}/similar", movie_id),
            ParamSet::new().with("movie_id", movie_id),
            paged(page),
        )
        .await
    }

    pub async fn movie_details(&self, movie_id: i64) -> Result<Value, UpstreamError> {
        self.fetch(
            Operation::MovieDetails,
            format!("/movie/{}", movie_id),
            ParamSet::new().with("movie_id", movie_id),
            ParamSet::new().with("append_to_response", DETAILS_APPEND),
        )
        .await
    }

    pub async fn genres(&self) -> Result<Value, UpstreamError> {
        self.fetch(
            Operation::Genres,
            "/genre/movie/list".to_string(),
            ParamSet::new(),
            ParamSet::new(),
        )
        .await
    }

    /// Drops the cached genre list, then fetches it again. A failed drop
    /// is logged and the fetch proceeds, possibly served from cache.
    pub async fn refresh_genres(&self) -> Result<Value, UpstreamError> {
        if let Err(err) = self
            .fetcher
            .invalidate(Operation::Genres, &ParamSet::new())
            .await
        {
            warn!(error = %err, "Cache DELETE failed for genres");
        }
        self.genres().await
    }

    async fn fetch_list(
        &self,
        operation: Operation,
        endpoint: &str,
        page: u32,
    ) -> Result<Value, UpstreamError> {
        self.fetch(operation, endpoint.to_string(), ParamSet::new(), paged(page))
            .await
    }

    async fn fetch(
        &self,
        operation: Operation,
        endpoint: String,
        path_params: ParamSet,
        query: ParamSet,
    ) -> Result<Value, UpstreamError> {
        let mut key_params = query.clone();
        for (name, value) in path_params.iter() {
            key_params.insert(name.as_str(), value.clone());
        }

        self.fetcher
            .fetch_with_cache(operation, &key_params, || {
                self.upstream.call(&endpoint, &query)
            })
            .await
    }
}

fn paged(page: u32) -> ParamSet {
    ParamSet::new().with("page", page.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{derive_key, CacheStore, MemoryStore, TtlPolicy};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Upstream double that records every call.
    #[derive(Default)]
    struct ScriptedUpstream {
        calls: Mutex<Vec<(String, ParamSet)>>,
    }

    #[async_trait]
    impl Upstream for ScriptedUpstream {
        async fn call(&self, endpoint: &str, params: &ParamSet) -> Result<Value, UpstreamError> {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), params.clone()));
            Ok(json!({"endpoint": endpoint}))
        }
    }

    fn service() -> (MovieService, Arc<ScriptedUpstream>, Arc<MemoryStore>) {
        let upstream = Arc::new(ScriptedUpstream::default());
        let store = Arc::new(MemoryStore::new(100));
        let fetcher = CachedFetcher::new(store.clone(), TtlPolicy::default());
        (MovieService::new(fetcher, upstream.clone()), upstream, store)
    }

    #[test]
    fn test_time_window_parse() {
        assert_eq!(TimeWindow::parse_lenient(Some("week")), TimeWindow::Week);
        assert_eq!(TimeWindow::parse_lenient(Some("month")), TimeWindow::Day);
        assert_eq!(TimeWindow::parse_lenient(None), TimeWindow::Day);
    }

    #[tokio::test]
    async fn test_trending_endpoint_and_key() {
        let (service, upstream, store) = service();

        service.trending(TimeWindow::Week, 2).await.unwrap();
        service.trending(TimeWindow::Week, 2).await.unwrap();

        let calls = upstream.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/trending/movie/week");
        assert_eq!(calls[0].1, ParamSet::new().with("page", 2u32));

        let key = derive_key(
            "trending",
            &ParamSet::new().with("page", 2u32).with("time_window", "week"),
        );
        assert!(store.get(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_movie_scoped_operations_key_on_movie_id() {
        let (service, upstream, _) = service();

        service.similar(550, 1).await.unwrap();
        service.similar(551, 1).await.unwrap();
        service.recommendations(550, 1).await.unwrap();

        let endpoints: Vec<String> = upstream
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(e, _)| e.clone())
            .collect();
        assert_eq!(
            endpoints,
            vec!["/movie/550/similar", "/movie/551/similar", "/movie/550/recommendations"]
        );
    }

    #[tokio::test]
    async fn test_details_appends_sections() {
        let (service, upstream, _) = service();
        service.movie_details(603).await.unwrap();

        let calls = upstream.calls.lock().unwrap();
        assert_eq!(calls[0].0, "/movie/603");
        assert_eq!(
            calls[0].1.get("append_to_response").map(|v| v.to_string()),
            Some(DETAILS_APPEND.to_string())
        );
    }

    #[tokio::test]
    async fn test_discover_drops_reserved_filters() {
        let (service, upstream, _) = service();
        let mut filters = HashMap::new();
        filters.insert("with_genres".to_string(), "28".to_string());
        filters.insert("api_key".to_string(), "stolen".to_string());

        service.discover(&filters, 0).await.unwrap();

        let calls = upstream.calls.lock().unwrap();
        let params = &calls[0].1;
        assert!(params.get("api_key").is_none());
        assert_eq!(params.get("with_genres").map(|v| v.to_string()).as_deref(), Some("28"));
        assert_eq!(params.get("page").map(|v| v.to_string()).as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_refresh_genres_bypasses_cached_list() {
        let (service, upstream, _) = service();

        service.genres().await.unwrap();
        service.genres().await.unwrap();
        assert_eq!(upstream.calls.lock().unwrap().len(), 1);

        service.refresh_genres().await.unwrap();
        assert_eq!(upstream.calls.lock().unwrap().len(), 2);

        service.genres().await.unwrap();
        assert_eq!(upstream.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_keys_on_query() {
        let (service, upstream, _) = service();
        service.search("alien", 1).await.unwrap();
        service.search("aliens", 1).await.unwrap();
        service.search("alien", 1).await.unwrap();

        assert_eq!(upstream.calls.lock().unwrap().len(), 2);
    }
}
