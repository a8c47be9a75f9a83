//! Offline provider backed by in-memory records
//!
//! Serves a small built-in sample set, or records loaded from a JSON file with
//! the same shape as [`FixtureData`]. Useful for demos and for exercising the
//! CLI without an API key or network access.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::FlightProvider;
use crate::data::{
    normalize_airport_code, normalize_flight_number, AirportBoardEntry, BoardMode, FlightStatus,
    FlightStatusRecord, LivePosition,
};
use crate::error::FlightError;

const PROVIDER_NAME: &str = "Fixture";

/// Records served by the fixture provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureData {
    /// Status records, matched by normalized flight number
    #[serde(default)]
    pub flights: Vec<FlightStatusRecord>,
    /// Board rows; departures match on origin, arrivals on destination
    #[serde(default)]
    pub board: Vec<AirportBoardEntry>,
}

impl FixtureData {
    /// Loads fixture records from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, FlightError> {
        let content = fs::read_to_string(path)
            .map_err(|e| FlightError::Fixture(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| FlightError::Fixture(format!("{}: {}", path.display(), e)))
    }

    /// A handful of flights around JFK used when no fixture file is given
    pub fn sample() -> Self {
        let flights = vec![
            FlightStatusRecord {
                flight_number: "DL123".to_string(),
                airline: "Delta Air Lines".to_string(),
                departure: "JFK".to_string(),
                arrival: "LAX".to_string(),
                status: FlightStatus::Active,
                departure_time: at(-5, (2026, 1, 15), (8, 30)),
                arrival_time: at(-8, (2026, 1, 15), (11, 45)),
                live: Some(LivePosition::new(39.8283, -98.5795, 34000.0, 510.0)),
            },
            FlightStatusRecord {
                flight_number: "KE38".to_string(),
                airline: "Korean Air".to_string(),
                departure: "ICN".to_string(),
                arrival: "ATL".to_string(),
                status: FlightStatus::Landed,
                departure_time: at(9, (2026, 1, 15), (10, 0)),
                arrival_time: at(-5, (2026, 1, 15), (10, 30)),
                live: None,
            },
            FlightStatusRecord {
                flight_number: "AF7".to_string(),
                airline: "Air France".to_string(),
                departure: "JFK".to_string(),
                arrival: "CDG".to_string(),
                status: FlightStatus::Scheduled,
                departure_time: at(-5, (2026, 1, 15), (17, 30)),
                arrival_time: at(1, (2026, 1, 16), (6, 50)),
                live: None,
            },
        ];

        let board = vec![
            board_entry("DL123", "Delta Air Lines", "JFK", "LAX", FlightStatus::Active, at(-5, (2026, 1, 15), (8, 30))),
            board_entry("AF7", "Air France", "JFK", "CDG", FlightStatus::Scheduled, at(-5, (2026, 1, 15), (17, 30))),
            board_entry("B6615", "JetBlue Airways", "JFK", "LAX", FlightStatus::Scheduled, at(-5, (2026, 1, 15), (19, 5))),
            board_entry("KE38", "Korean Air", "ICN", "ATL", FlightStatus::Landed, at(-5, (2026, 1, 15), (10, 30))),
            board_entry("UA535", "United Airlines", "LAX", "JFK", FlightStatus::Cancelled, at(-5, (2026, 1, 15), (21, 10))),
        ];

        Self { flights, board }
    }
}

/// Fixed-offset timestamp helper for the sample set
fn at(offset_hours: i32, ymd: (i32, u32, u32), hm: (u32, u32)) -> Option<DateTime<FixedOffset>> {
    FixedOffset::east_opt(offset_hours * 3600)?
        .with_ymd_and_hms(ymd.0, ymd.1, ymd.2, hm.0, hm.1, 0)
        .single()
}

fn board_entry(
    flight_number: &str,
    airline: &str,
    origin: &str,
    destination: &str,
    status: FlightStatus,
    scheduled_time: Option<DateTime<FixedOffset>>,
) -> AirportBoardEntry {
    AirportBoardEntry {
        flight_number: flight_number.to_string(),
        airline: airline.to_string(),
        origin: origin.to_string(),
        destination: destination.to_string(),
        status,
        scheduled_time,
    }
}

/// Provider that answers from [`FixtureData`] without any I/O
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    data: Arc<FixtureData>,
}

impl Default for FixtureProvider {
    fn default() -> Self {
        Self::new(FixtureData::sample())
    }
}

impl FixtureProvider {
    pub fn new(data: FixtureData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    fn board_where<F>(&self, keep: F) -> Vec<AirportBoardEntry>
    where
        F: Fn(&AirportBoardEntry) -> bool,
    {
        self.data.board.iter().filter(|e| keep(e)).cloned().collect()
    }
}

#[async_trait]
impl FlightProvider for FixtureProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn canonical_flight_number(&self, raw: &str) -> String {
        normalize_flight_number(raw)
    }

    async fn fetch_status(&self, flight_number: &str) -> Result<FlightStatusRecord, FlightError> {
        let wanted = normalize_flight_number(flight_number);
        self.data
            .flights
            .iter()
            .find(|f| normalize_flight_number(&f.flight_number) == wanted)
            .cloned()
            .ok_or_else(|| FlightError::NotFound(format!("no flight found for {}", wanted)))
    }

    async fn fetch_airport_board(
        &self,
        airport_code: &str,
        mode: BoardMode,
    ) -> Result<Vec<AirportBoardEntry>, FlightError> {
        let code = normalize_airport_code(airport_code);
        let entries = match mode {
            BoardMode::Departures => self.board_where(|e| e.origin == code),
            BoardMode::Arrivals => self.board_where(|e| e.destination == code),
        };
        if entries.is_empty() {
            return Err(FlightError::NotFound(format!(
                "no flights found for airport {}",
                code
            )));
        }
        Ok(entries)
    }

    async fn search_route(&self, from: &str, to: &str) -> Result<Vec<AirportBoardEntry>, FlightError> {
        let from = normalize_airport_code(from);
        let to = normalize_airport_code(to);
        let entries = self.board_where(|e| e.origin == from && e.destination == to);
        if entries.is_empty() {
            return Err(FlightError::NotFound(format!(
                "no flights found from {} to {}",
                from, to
            )));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_lookup_normalizes_flight_number() {
        let provider = FixtureProvider::default();

        let record = provider.fetch_status("ke038").await.unwrap();
        assert_eq!(record.flight_number, "KE38");
        assert_eq!(record.status, FlightStatus::Landed);

        let err = provider.fetch_status("ZZ9").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_board_filters_by_mode_and_keeps_order() {
        let provider = FixtureProvider::default();

        let departures = provider
            .fetch_airport_board("jfk", BoardMode::Departures)
            .await
            .unwrap();
        let numbers: Vec<&str> = departures.iter().map(|e| e.flight_number.as_str()).collect();
        assert_eq!(numbers, vec!["DL123", "AF7", "B6615"]);

        let arrivals = provider
            .fetch_airport_board("JFK", BoardMode::Arrivals)
            .await
            .unwrap();
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].flight_number, "UA535");
    }

    #[tokio::test]
    async fn test_route_search() {
        let provider = FixtureProvider::default();

        let flights = provider.search_route("JFK", "LAX").await.unwrap();
        assert_eq!(flights.len(), 2);

        let err = provider.search_route("LAX", "CDG").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_loads_fixture_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fixture.json");
        let json = serde_json::to_string(&FixtureData::sample()).unwrap();
        fs::write(&path, json).unwrap();

        let provider = FixtureProvider::new(FixtureData::from_file(&path).unwrap());
        let record = provider.fetch_status("DL123").await.unwrap();
        assert!(record.has_live_data());
        assert_eq!(record.departure_time, FixtureData::sample().flights[0].departure_time);
    }

    #[test]
    fn test_hand_written_fixture_accepts_status_codes() {
        let json = r#"{
            "flights": [{
                "flight_number": "LH400",
                "airline": "Lufthansa",
                "departure": "FRA",
                "arrival": "JFK",
                "status": "diverted",
                "departure_time": null,
                "arrival_time": null,
                "live": null
            }]
        }"#;
        let data: FixtureData = serde_json::from_str(json).unwrap();
        assert_eq!(data.flights[0].status, FlightStatus::Diverted);
        assert!(data.board.is_empty());
    }

    #[test]
    fn test_missing_fixture_file_is_reported() {
        let err = FixtureData::from_file(Path::new("/nonexistent/fixture.json")).unwrap_err();
        assert!(matches!(err, FlightError::Fixture(_)));
    }
}
