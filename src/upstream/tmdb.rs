//! TMDb Client
//!
//! Issues GET requests against the TMDb v3 REST API with the configured
//! API key and a bounded timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::cache::ParamSet;
use crate::config::Config;
use crate::error::{ConfigError, UpstreamError};
use crate::upstream::Upstream;

const API_KEY_PARAM: &str = "api_key";

// == TMDb Client ==
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Builds a client from configuration.
    ///
    /// Fails with [`ConfigError::MissingApiKey`] rather than allowing
    /// unauthenticated requests.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(
            &config.tmdb_base_url,
            &config.tmdb_api_key,
            Duration::from_secs(config.upstream_timeout),
        )
    }

    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                var: "UPSTREAM_TIMEOUT_SECS".to_string(),
                value: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Upstream for TmdbClient {
    async fn call(&self, endpoint: &str, params: &ParamSet) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut query = params.to_query();
        query.push((API_KEY_PARAM.to_string(), self.api_key.clone()));

        debug!(endpoint = %endpoint, "Calling upstream");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Http(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

// reqwest errors embed the request URL, which carries the API key.
fn classify(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        return UpstreamError::Timeout;
    }
    let err = err.without_url();
    if err.is_decode() {
        UpstreamError::Decode(err.to_string())
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &mockito::ServerGuard) -> TmdbClient {
        TmdbClient::new(&server.url(), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let result = TmdbClient::new("http://localhost", " ", Duration::from_secs(1));
        assert_eq!(result.unwrap_err(), ConfigError::MissingApiKey);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            TmdbClient::new("https://api.themoviedb.org/3/", "k", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://api.themoviedb.org/3");
    }

    #[tokio::test]
    async fn test_success_sends_params_and_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/movie/popular")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"page":2,"results":[]}"#)
            .create_async()
            .await;

        let body = client_for(&server)
            .call("/movie/popular", &ParamSet::new().with("page", 2i64))
            .await
            .unwrap();

        assert_eq!(body["page"], 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/movie/99999999")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"status_code":34}"#)
            .create_async()
            .await;

        let result = client_for(&server)
            .call("/movie/99999999", &ParamSet::new())
            .await;

        assert_eq!(result, Err(UpstreamError::Http(404)));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/genre/movie/list")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let result = client_for(&server)
            .call("/genre/movie/list", &ParamSet::new())
            .await;

        assert!(matches!(result, Err(UpstreamError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client =
            TmdbClient::new("http://127.0.0.1:1", "k", Duration::from_secs(2)).unwrap();
        let result = client.call("/movie/popular", &ParamSet::new()).await;

        match result {
            Err(UpstreamError::Transport(msg)) => assert!(!msg.contains("api_key")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
