//! AviationStack API client
//!
//! Fetches flights from the AviationStack `/flights` endpoint and normalizes
//! them. AviationStack reports altitude in metres, speed in km/h, and local
//! airport times labelled with a `+00:00` offset.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{get_text, FlightProvider};
use crate::data::{
    effective_status, kmh_to_mph, meters_to_feet, normalize_airport_code,
    normalize_flight_number, parse_local_time, pick_best, AirportBoardEntry, BoardMode,
    FlightStatus, FlightStatusRecord, LivePosition, UnknownStatusRank,
};
use crate::error::FlightError;

const PROVIDER_NAME: &str = "AviationStack";

/// Base URL for the AviationStack API
const AVIATIONSTACK_BASE_URL: &str = "http://api.aviationstack.com/v1";

/// Response from the `/flights` endpoint
#[derive(Debug, Deserialize)]
struct FlightsResponse {
    #[serde(default)]
    data: Vec<RawFlight>,
    /// Present instead of `data` when the request was rejected
    error: Option<RawError>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFlight {
    flight_status: Option<String>,
    departure: RawAirport,
    arrival: RawAirport,
    airline: RawAirline,
    flight: RawFlightInfo,
    live: Option<RawLive>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAirport {
    iata: Option<String>,
    timezone: Option<String>,
    scheduled: Option<String>,
    estimated: Option<String>,
    actual: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAirline {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFlightInfo {
    iata: Option<String>,
}

/// Live telemetry; altitude in metres, speed in km/h
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLive {
    latitude: Option<f64>,
    longitude: Option<f64>,
    altitude: Option<f64>,
    speed_horizontal: Option<f64>,
    is_ground: Option<bool>,
}

impl RawFlight {
    fn status_code(&self) -> &str {
        self.flight_status.as_deref().unwrap_or("")
    }
}

impl RawAirport {
    fn code(&self) -> String {
        self.iata.clone().unwrap_or_default()
    }

    fn timezone(&self) -> &str {
        self.timezone.as_deref().unwrap_or("")
    }

    /// Best known time: actual, else estimated, else scheduled
    fn best_time(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        parse_local_time(
            self.timezone(),
            &[
                self.actual.as_deref().unwrap_or(""),
                self.estimated.as_deref().unwrap_or(""),
                self.scheduled.as_deref().unwrap_or(""),
            ],
        )
    }

    fn scheduled_time(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        parse_local_time(self.timezone(), &[self.scheduled.as_deref().unwrap_or("")])
    }
}

impl RawLive {
    fn to_position(&self) -> LivePosition {
        LivePosition::new(
            self.latitude.unwrap_or(0.0),
            self.longitude.unwrap_or(0.0),
            meters_to_feet(self.altitude.unwrap_or(0.0)),
            kmh_to_mph(self.speed_horizontal.unwrap_or(0.0)),
        )
        .on_ground(self.is_ground.unwrap_or(false))
    }
}

/// Client for the AviationStack flight API
#[derive(Debug, Clone)]
pub struct AviationStackProvider {
    client: Client,
    api_key: String,
    /// Base URL for the API (allows override for testing)
    base_url: String,
    unknown_rank: UnknownStatusRank,
}

impl AviationStackProvider {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: AVIATIONSTACK_BASE_URL.to_string(),
            unknown_rank: UnknownStatusRank::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets how statuses outside the priority table rank when several flights match
    pub fn with_unknown_rank(mut self, unknown_rank: UnknownStatusRank) -> Self {
        self.unknown_rank = unknown_rank;
        self
    }

    /// Queries `/flights` with the given filter and returns the raw body
    async fn query(&self, filter: &str) -> Result<String, FlightError> {
        log::debug!("GET {}/flights?{}", self.base_url, filter);
        let url = format!(
            "{}/flights?access_key={}&{}",
            self.base_url, self.api_key, filter
        );
        get_text(&self.client, PROVIDER_NAME, &url).await
    }
}

#[async_trait]
impl FlightProvider for AviationStackProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    /// AviationStack expects "KE38", not "KE038"
    fn canonical_flight_number(&self, raw: &str) -> String {
        normalize_flight_number(raw)
    }

    async fn fetch_status(&self, flight_number: &str) -> Result<FlightStatusRecord, FlightError> {
        let flight_iata = normalize_flight_number(flight_number);
        let body = self.query(&format!("flight_iata={}", flight_iata)).await?;
        parse_status_response(&body, &flight_iata, self.unknown_rank)
    }

    async fn fetch_airport_board(
        &self,
        airport_code: &str,
        mode: BoardMode,
    ) -> Result<Vec<AirportBoardEntry>, FlightError> {
        let code = normalize_airport_code(airport_code);
        let param = match mode {
            BoardMode::Departures => "dep_iata",
            BoardMode::Arrivals => "arr_iata",
        };
        let body = self.query(&format!("{}={}", param, code)).await?;
        let flights = parse_flights(&body)?;
        if flights.is_empty() {
            return Err(FlightError::NotFound(format!(
                "no flights found for airport {}",
                code
            )));
        }
        Ok(to_board_entries(flights, mode))
    }

    async fn search_route(&self, from: &str, to: &str) -> Result<Vec<AirportBoardEntry>, FlightError> {
        let from = normalize_airport_code(from);
        let to = normalize_airport_code(to);
        let body = self
            .query(&format!("dep_iata={}&arr_iata={}", from, to))
            .await?;
        let flights = parse_flights(&body)?;
        if flights.is_empty() {
            return Err(FlightError::NotFound(format!(
                "no flights found from {} to {}",
                from, to
            )));
        }
        Ok(to_board_entries(flights, BoardMode::Departures))
    }
}

/// Parses a `/flights` body into raw flights, surfacing API error bodies
fn parse_flights(body: &str) -> Result<Vec<RawFlight>, FlightError> {
    let response: FlightsResponse = serde_json::from_str(body).map_err(|source| {
        FlightError::Parse {
            provider: PROVIDER_NAME,
            source,
        }
    })?;

    if let Some(error) = response.error {
        let message = error
            .message
            .or(error.code)
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(FlightError::Api {
            provider: PROVIDER_NAME,
            message,
        });
    }

    Ok(response.data)
}

/// Reduces a status response to one normalized record
fn parse_status_response(
    body: &str,
    flight_iata: &str,
    unknown_rank: UnknownStatusRank,
) -> Result<FlightStatusRecord, FlightError> {
    let flights = parse_flights(body)?;
    let best = pick_best(&flights, RawFlight::status_code, unknown_rank)
        .ok_or_else(|| FlightError::NotFound(format!("no flight found for {}", flight_iata)))?;

    let live = best.live.as_ref().map(RawLive::to_position);

    Ok(FlightStatusRecord {
        flight_number: flight_iata.to_string(),
        airline: best.airline.name.clone().unwrap_or_default(),
        departure: best.departure.code(),
        arrival: best.arrival.code(),
        status: effective_status(best.status_code(), live.is_some()),
        departure_time: best.departure.best_time(),
        arrival_time: best.arrival.best_time(),
        live,
    })
}

/// Converts raw flights into board rows, keeping upstream order
fn to_board_entries(flights: Vec<RawFlight>, mode: BoardMode) -> Vec<AirportBoardEntry> {
    flights
        .into_iter()
        .map(|f| {
            let scheduled_time = match mode {
                BoardMode::Departures => f.departure.scheduled_time(),
                BoardMode::Arrivals => f.arrival.scheduled_time(),
            };
            // Only a status lookup upgrades "scheduled"; rows show the raw code
            let status = FlightStatus::from_code(f.status_code());
            AirportBoardEntry {
                flight_number: f.flight.iata.clone().unwrap_or_default(),
                airline: f.airline.name.clone().unwrap_or_default(),
                origin: f.departure.code(),
                destination: f.arrival.code(),
                status,
                scheduled_time,
            }
        })
        .collect()
}
