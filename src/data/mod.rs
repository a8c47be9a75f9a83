//! Core data models for flightcli
//!
//! This module contains the normalized records handed to callers, along with
//! the normalization helpers that turn raw upstream values into them.

pub mod normalize;
pub mod resolver;
pub mod status;

pub use normalize::{
    kmh_to_mph, meters_to_feet, mps_to_mph, normalize_airport_code, normalize_flight_number,
    parse_local_time,
};
pub use resolver::{pick_best, status_priority, UnknownStatusRank};
pub use status::{effective_status, FlightStatus};

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Live telemetry attached to an in-progress flight
///
/// Values are already converted: altitude in feet, speed in mph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LivePosition {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude in feet, never negative
    pub altitude_ft: f64,
    /// Ground speed in mph, never negative
    pub speed_mph: f64,
    /// Whether the upstream reported the aircraft on the ground
    #[serde(default)]
    pub on_ground: bool,
}

impl LivePosition {
    /// Builds a position from already-converted values, clamping altitude and
    /// speed to zero
    pub fn new(latitude: f64, longitude: f64, altitude_ft: f64, speed_mph: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude_ft: altitude_ft.max(0.0),
            speed_mph: speed_mph.max(0.0),
            on_ground: false,
        }
    }

    pub fn on_ground(mut self, on_ground: bool) -> Self {
        self.on_ground = on_ground;
        self
    }
}

/// Normalized status of a single flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightStatusRecord {
    /// Flight identifier as sent upstream (e.g. "KE38")
    pub flight_number: String,
    pub airline: String,
    /// Departure airport code
    pub departure: String,
    /// Arrival airport code
    pub arrival: String,
    pub status: FlightStatus,
    /// Best known departure time (actual, else estimated, else scheduled)
    pub departure_time: Option<DateTime<FixedOffset>>,
    /// Best known arrival time (actual, else estimated, else scheduled)
    pub arrival_time: Option<DateTime<FixedOffset>>,
    /// Live telemetry; `None` means no data, not a reading at (0, 0)
    pub live: Option<LivePosition>,
}

impl FlightStatusRecord {
    pub fn has_live_data(&self) -> bool {
        self.live.is_some()
    }

    /// Total gate-to-gate time, when both ends are known
    pub fn flight_duration(&self) -> Option<Duration> {
        match (self.departure_time, self.arrival_time) {
            (Some(dep), Some(arr)) => Some(arr.signed_duration_since(dep)),
            _ => None,
        }
    }

    /// Time left until arrival, only while `now` falls between departure and arrival
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let dep = self.departure_time?;
        let arr = self.arrival_time?;
        if now > dep && now < arr {
            Some(arr.signed_duration_since(now))
        } else {
            None
        }
    }
}

/// One row of an airport departures/arrivals board or a route search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportBoardEntry {
    pub flight_number: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub status: FlightStatus,
    /// Scheduled departure or arrival time, depending on the query
    pub scheduled_time: Option<DateTime<FixedOffset>>,
}

/// Which side of an airport board to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardMode {
    #[default]
    Departures,
    Arrivals,
}

impl BoardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardMode::Departures => "departures",
            BoardMode::Arrivals => "arrivals",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BoardMode::Departures => "Departures",
            BoardMode::Arrivals => "Arrivals",
        }
    }
}

impl fmt::Display for BoardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "departures" | "departure" | "dep" => Ok(BoardMode::Departures),
            "arrivals" | "arrival" | "arr" => Ok(BoardMode::Arrivals),
            other => Err(format!(
                "invalid board type '{}': expected departures or arrivals",
                other
            )),
        }
    }
}
