//! Request, response and domain models
//!
//! DTOs for HTTP bodies and query strings, plus typed views over upstream
//! movie payloads.

pub mod movie;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use movie::{Genre, ImageUrls, Movie, MovieList, MovieSummary};
pub use requests::{
    parse_page, AddToListRequest, InvalidateQuery, PageQuery, SearchQuery, TrendingQuery,
};
pub use responses::{
    FavoriteCheck, FavoriteResponse, GenreSyncResponse, HealthResponse, InvalidateResponse,
    MessageResponse, StatsResponse, TtlEntry, WatchlistCheck, WatchlistResponse,
};
