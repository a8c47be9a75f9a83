//! Canonical cache keys for logical queries

use std::fmt;
use std::time::Duration;

use crate::data::BoardMode;

/// TTL for flight status lookups; live-tracked data goes stale quickly
const STATUS_TTL: Duration = Duration::from_secs(60);

/// TTL for airport departure/arrival boards
const AIRPORT_TTL: Duration = Duration::from_secs(5 * 60);

/// TTL for route searches
const SEARCH_TTL: Duration = Duration::from_secs(5 * 60);

/// Identifies one logical query
///
/// Callers pass already-normalized parameters; the string form
/// (`status:KE38`, `airport:JFK:departures`, `search:JFK:LAX`) is what gets
/// hashed into a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Status { flight_number: String },
    Airport { code: String, mode: BoardMode },
    Search { from: String, to: String },
}

impl CacheKey {
    /// How long a result for this kind of query stays fresh
    pub fn ttl(&self) -> Duration {
        match self {
            CacheKey::Status { .. } => STATUS_TTL,
            CacheKey::Airport { .. } => AIRPORT_TTL,
            CacheKey::Search { .. } => SEARCH_TTL,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Status { flight_number } => write!(f, "status:{}", flight_number),
            CacheKey::Airport { code, mode } => write!(f, "airport:{}:{}", code, mode),
            CacheKey::Search { from, to } => write!(f, "search:{}:{}", from, to),
        }
    }
}
