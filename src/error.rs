//! Error types for the movie proxy
//!
//! Errors are split by layer: the cache store (absorbed), the upstream
//! API (surfaced), configuration (fatal at startup) and the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Failures raised by a cache store backend.
///
/// The orchestrator never surfaces these to callers: a read failure is
/// treated as a miss and a write failure as a no-op.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be read
    #[error("cache read failed: {0}")]
    Read(String),

    /// The store could not be written
    #[error("cache write failed: {0}")]
    Write(String),

    /// The invalidation pattern is not a valid glob
    #[error("invalid cache pattern: {0}")]
    InvalidPattern(String),

    /// The backend cannot enumerate keys by pattern
    #[error("cache backend '{0}' does not support pattern deletion")]
    PatternUnsupported(&'static str),
}

// == Upstream Error Enum ==
/// Failures of a single upstream call.
///
/// Callers may treat every variant as "service unavailable"; the subtype
/// is kept for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The request exceeded the configured timeout
    #[error("upstream request timed out")]
    Timeout,

    /// The upstream answered with a non-2xx status
    #[error("upstream returned HTTP {0}")]
    Http(u16),

    /// Connection, TLS or other transport failure
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// The body was not valid JSON
    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout => "timeout",
            UpstreamError::Http(_) => "http",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Decode(_) => "decode",
        }
    }
}

// == Config Error Enum ==
/// Invalid or incomplete configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `TMDB_API_KEY` is missing or empty
    #[error("TMDB_API_KEY is not set")]
    MissingApiKey,

    /// A variable is present but cannot be parsed
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: String, value: String },
}

// == API Error Enum ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No caller identity on a per-user endpoint
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found in the local catalog or a user list
    #[error("Not found: {0}")]
    NotFound(String),

    /// The upstream API could not serve the request
    #[error("{context}")]
    UpstreamUnavailable {
        context: String,
        #[source]
        source: UpstreamError,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wraps an upstream failure with a user-facing message.
    pub fn upstream(context: impl Into<String>, source: UpstreamError) -> Self {
        ApiError::UpstreamUnavailable {
            context: context.into(),
            source,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidPattern(_) => ApiError::InvalidRequest(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::UpstreamUnavailable { context, .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, context.clone())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
