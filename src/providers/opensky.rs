//! OpenSky Network API client
//!
//! OpenSky only knows live state vectors keyed by callsign, so it can answer
//! status lookups but not airport boards or route searches. State vectors are
//! positional JSON arrays with altitude in metres and velocity in m/s.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{get_text, FlightProvider};
use crate::data::{
    meters_to_feet, mps_to_mph, AirportBoardEntry, BoardMode, FlightStatus, FlightStatusRecord,
    LivePosition,
};
use crate::error::FlightError;

const PROVIDER_NAME: &str = "OpenSky";

/// Base URL for the OpenSky REST API
const OPENSKY_BASE_URL: &str = "https://opensky-network.org/api";

// State vector field positions
const IDX_CALLSIGN: usize = 1;
const IDX_ORIGIN_COUNTRY: usize = 2;
const IDX_LONGITUDE: usize = 5;
const IDX_LATITUDE: usize = 6;
const IDX_BARO_ALTITUDE: usize = 7;
const IDX_ON_GROUND: usize = 8;
const IDX_VELOCITY: usize = 9;

/// Response from `/states/all`
#[derive(Debug, Deserialize)]
struct StatesResponse {
    #[allow(dead_code)]
    time: Option<i64>,
    /// `null` when nothing matched
    states: Option<Vec<Vec<Value>>>,
}

/// Client for the OpenSky Network API
#[derive(Debug, Clone)]
pub struct OpenSkyProvider {
    client: Client,
    base_url: String,
}

impl OpenSkyProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPENSKY_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl FlightProvider for OpenSkyProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_status(&self, flight_number: &str) -> Result<FlightStatusRecord, FlightError> {
        let callsign = flight_number.trim().to_uppercase();
        let url = format!("{}/states/all?callsign={}", self.base_url, callsign);
        log::debug!("GET {}", url);

        let body = get_text(&self.client, PROVIDER_NAME, &url).await?;
        parse_states_response(&body, &callsign)
    }

    async fn fetch_airport_board(
        &self,
        _airport_code: &str,
        _mode: BoardMode,
    ) -> Result<Vec<AirportBoardEntry>, FlightError> {
        Err(FlightError::Unsupported {
            provider: PROVIDER_NAME,
            operation: "airport board lookup",
        })
    }

    async fn search_route(&self, _from: &str, _to: &str) -> Result<Vec<AirportBoardEntry>, FlightError> {
        Err(FlightError::Unsupported {
            provider: PROVIDER_NAME,
            operation: "route search",
        })
    }
}

fn string_at(state: &[Value], idx: usize) -> Option<String> {
    state
        .get(idx)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn float_at(state: &[Value], idx: usize) -> Option<f64> {
    state.get(idx).and_then(Value::as_f64)
}

/// Turns a `/states/all` body into a status record for `callsign`
///
/// Prefers the state whose callsign matches exactly and falls back to the
/// first state returned.
fn parse_states_response(body: &str, callsign: &str) -> Result<FlightStatusRecord, FlightError> {
    let response: StatesResponse = serde_json::from_str(body).map_err(|source| {
        FlightError::Parse {
            provider: PROVIDER_NAME,
            source,
        }
    })?;

    let states = response.states.unwrap_or_default();
    let state = states
        .iter()
        .find(|s| string_at(s, IDX_CALLSIGN).as_deref() == Some(callsign))
        .or_else(|| states.first())
        .ok_or_else(|| {
            FlightError::NotFound(format!("no flight found for callsign {}", callsign))
        })?;

    let on_ground = state
        .get(IDX_ON_GROUND)
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let live = match (float_at(state, IDX_LATITUDE), float_at(state, IDX_LONGITUDE)) {
        (Some(latitude), Some(longitude)) => Some(
            LivePosition::new(
                latitude,
                longitude,
                meters_to_feet(float_at(state, IDX_BARO_ALTITUDE).unwrap_or(0.0)),
                mps_to_mph(float_at(state, IDX_VELOCITY).unwrap_or(0.0)),
            )
            .on_ground(on_ground),
        ),
        _ => None,
    };

    let status = if on_ground {
        FlightStatus::Other("On Ground".to_string())
    } else {
        FlightStatus::Active
    };

    Ok(FlightStatusRecord {
        flight_number: callsign.to_string(),
        airline: string_at(state, IDX_ORIGIN_COUNTRY).unwrap_or_else(|| "Unknown".to_string()),
        departure: String::new(),
        arrival: String::new(),
        status,
        departure_time: None,
        arrival_time: None,
        live,
    })
}
