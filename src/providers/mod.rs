//! Upstream flight-data providers
//!
//! Every backend answers the same three questions. Backends that cannot
//! answer one of them fail with [`FlightError::Unsupported`] instead of
//! returning an empty result.

pub mod aviationstack;
pub mod fixture;
pub mod opensky;

pub use aviationstack::AviationStackProvider;
pub use fixture::{FixtureData, FixtureProvider};
pub use opensky::OpenSkyProvider;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::data::{AirportBoardEntry, BoardMode, FlightStatusRecord};
use crate::error::FlightError;

/// Per-request deadline for upstream calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A source of flight data
#[async_trait]
pub trait FlightProvider: Send + Sync {
    /// Human-readable backend name used in messages
    fn name(&self) -> &'static str;

    /// Canonical form of a user-supplied flight number for this backend
    ///
    /// Used both for the upstream request and for the cache key, so two
    /// spellings the backend treats as one flight share a cache entry.
    fn canonical_flight_number(&self, raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    /// Looks up the current status of one flight
    async fn fetch_status(&self, flight_number: &str) -> Result<FlightStatusRecord, FlightError>;

    /// Lists departures or arrivals at an airport, in upstream order
    async fn fetch_airport_board(
        &self,
        airport_code: &str,
        mode: BoardMode,
    ) -> Result<Vec<AirportBoardEntry>, FlightError>;

    /// Lists flights between two airports
    async fn search_route(&self, from: &str, to: &str) -> Result<Vec<AirportBoardEntry>, FlightError>;
}

/// The backends flightcli ships with
#[derive(Debug, Clone)]
pub enum Provider {
    AviationStack(AviationStackProvider),
    OpenSky(OpenSkyProvider),
    Fixture(FixtureProvider),
}

#[async_trait]
impl FlightProvider for Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::AviationStack(p) => p.name(),
            Provider::OpenSky(p) => p.name(),
            Provider::Fixture(p) => p.name(),
        }
    }

    fn canonical_flight_number(&self, raw: &str) -> String {
        match self {
            Provider::AviationStack(p) => p.canonical_flight_number(raw),
            Provider::OpenSky(p) => p.canonical_flight_number(raw),
            Provider::Fixture(p) => p.canonical_flight_number(raw),
        }
    }

    async fn fetch_status(&self, flight_number: &str) -> Result<FlightStatusRecord, FlightError> {
        match self {
            Provider::AviationStack(p) => p.fetch_status(flight_number).await,
            Provider::OpenSky(p) => p.fetch_status(flight_number).await,
            Provider::Fixture(p) => p.fetch_status(flight_number).await,
        }
    }

    async fn fetch_airport_board(
        &self,
        airport_code: &str,
        mode: BoardMode,
    ) -> Result<Vec<AirportBoardEntry>, FlightError> {
        match self {
            Provider::AviationStack(p) => p.fetch_airport_board(airport_code, mode).await,
            Provider::OpenSky(p) => p.fetch_airport_board(airport_code, mode).await,
            Provider::Fixture(p) => p.fetch_airport_board(airport_code, mode).await,
        }
    }

    async fn search_route(&self, from: &str, to: &str) -> Result<Vec<AirportBoardEntry>, FlightError> {
        match self {
            Provider::AviationStack(p) => p.search_route(from, to).await,
            Provider::OpenSky(p) => p.search_route(from, to).await,
            Provider::Fixture(p) => p.search_route(from, to).await,
        }
    }
}

/// Builds the HTTP client shared by the live providers
pub fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            Client::new()
        })
}

/// GETs `url` and returns the body of a successful response
///
/// Transport failures and non-success statuses are reported separately so
/// callers can tell "unreachable" from "refused". The URL is stripped from
/// transport errors since it may carry an access key.
async fn get_text(client: &Client, provider: &'static str, url: &str) -> Result<String, FlightError> {
    let transport = |source: reqwest::Error| FlightError::Transport {
        provider,
        source: source.without_url(),
    };

    let response = client.get(url).send().await.map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FlightError::HttpStatus {
            provider,
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(transport)
}
