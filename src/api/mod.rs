//! API Module
//!
//! HTTP handlers and routing for the movie proxy REST API.
//!
//! # Endpoints
//! - `GET /api/movies/{trending,popular,top-rated,now-playing,upcoming}` - cached upstream lists
//! - `GET /api/movies/search`, `GET /api/movies/discover` - cached upstream queries
//! - `GET /api/movies/:id/{details,recommendations,similar}` - cached per-movie data
//! - `GET /api/movies`, `GET /api/movies/:id` - local catalog
//! - `GET /api/genres`, `GET|POST /api/genres/fetch-from-tmdb` - genre catalog
//! - `GET|POST /api/{favorites,watchlist}`, `DELETE .../:movie_id`, `GET .../check/:movie_id` - per-user lists
//! - `GET /api/cache/stats`, `DELETE /api/cache?pattern=`, `DELETE /api/cache/:operation`
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
