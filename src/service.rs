//! Flight query service
//!
//! Puts the disk cache in front of a provider. Each call is independent:
//! check the cache, and on a miss fetch, store and return.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;

use crate::cache::{CacheKey, CacheManager};
use crate::data::{normalize_airport_code, AirportBoardEntry, BoardMode, FlightStatusRecord};
use crate::error::FlightError;
use crate::providers::FlightProvider;

/// A query result and whether it came from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub cached: bool,
}

/// Answers flight queries through an optional cache
///
/// With `cache` set to `None` every call goes upstream.
#[derive(Debug, Clone)]
pub struct FlightService<P> {
    provider: P,
    cache: Option<CacheManager>,
}

impl<P: FlightProvider> FlightService<P> {
    pub fn new(provider: P, cache: Option<CacheManager>) -> Self {
        Self { provider, cache }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current status of one flight
    pub async fn get_status(
        &self,
        flight_number: &str,
    ) -> Result<Fetched<FlightStatusRecord>, FlightError> {
        let flight_number = self.provider.canonical_flight_number(flight_number);
        let key = CacheKey::Status {
            flight_number: flight_number.clone(),
        };
        self.cached_or_fetch(&key, || self.provider.fetch_status(&flight_number))
            .await
    }

    /// Departures or arrivals at an airport
    pub async fn get_airport_board(
        &self,
        airport_code: &str,
        mode: BoardMode,
    ) -> Result<Fetched<Vec<AirportBoardEntry>>, FlightError> {
        let code = normalize_airport_code(airport_code);
        let key = CacheKey::Airport {
            code: code.clone(),
            mode,
        };
        self.cached_or_fetch(&key, || self.provider.fetch_airport_board(&code, mode))
            .await
    }

    /// Flights between two airports
    pub async fn search_route(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Fetched<Vec<AirportBoardEntry>>, FlightError> {
        let from = normalize_airport_code(from);
        let to = normalize_airport_code(to);
        let key = CacheKey::Search {
            from: from.clone(),
            to: to.clone(),
        };
        self.cached_or_fetch(&key, || self.provider.search_route(&from, &to))
            .await
    }

    /// Returns a fresh cache entry for `key`, or runs `fetch` and caches its result
    ///
    /// A failed fetch leaves the cache untouched; a failed cache write is
    /// logged and does not fail the query.
    async fn cached_or_fetch<T, F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<Fetched<T>, FlightError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FlightError>>,
    {
        let key_str = key.to_string();

        if let Some(ref cache) = self.cache {
            if let Some(data) = cache.read::<T>(&key_str) {
                return Ok(Fetched { data, cached: true });
            }
        }

        let data = fetch().await?;

        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.write(&key_str, &data, key.ttl()) {
                log::warn!("failed to cache {}: {}", key_str, e);
            }
        }

        Ok(Fetched {
            data,
            cached: false,
        })
    }
}
