//! Operation Module
//!
//! The fixed set of upstream query shapes served through the cache.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

// == Operation ==
/// A named upstream query shape. Each operation has its own cache key
/// prefix and TTL entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Trending,
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
    Search,
    Discover,
    Recommendations,
    Similar,
    MovieDetails,
    Genres,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 11] = [
        Operation::Trending,
        Operation::Popular,
        Operation::TopRated,
        Operation::NowPlaying,
        Operation::Upcoming,
        Operation::Search,
        Operation::Discover,
        Operation::Recommendations,
        Operation::Similar,
        Operation::MovieDetails,
        Operation::Genres,
    ];

    /// Stable identifier used as cache key prefix and config suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Trending => "trending",
            Operation::Popular => "popular",
            Operation::TopRated => "top_rated",
            Operation::NowPlaying => "now_playing",
            Operation::Upcoming => "upcoming",
            Operation::Search => "search",
            Operation::Discover => "discover",
            Operation::Recommendations => "recommendations",
            Operation::Similar => "similar",
            Operation::MovieDetails => "movie_details",
            Operation::Genres => "genres",
        }
    }

    /// Built-in TTL in seconds, used when the environment does not override it.
    pub fn default_ttl(&self) -> u64 {
        match self {
            Operation::Trending | Operation::Popular | Operation::NowPlaying => 3_600,
            Operation::Search | Operation::Discover => 1_800,
            Operation::TopRated
            | Operation::Upcoming
            | Operation::Recommendations
            | Operation::Similar
            | Operation::MovieDetails => 86_400,
            Operation::Genres => 604_800,
        }
    }

    /// Name of the environment variable overriding this operation's TTL.
    pub fn ttl_env_var(&self) -> String {
        format!("CACHE_TTL_{}", self.as_str().to_uppercase())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("Unknown operation: {}", s))
    }
}
