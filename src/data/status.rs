//! Mapping from upstream status codes to display statuses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display status of a flight
///
/// Serialized as its display label. Codes the classifier does not know are
/// kept verbatim in `Other` so new upstream values still reach the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FlightStatus {
    Scheduled,
    /// Airborne; displayed as "In Flight"
    Active,
    Landed,
    Cancelled,
    Incident,
    Diverted,
    Other(String),
}

impl FlightStatus {
    /// Classifies a lowercase upstream status code
    ///
    /// # Examples
    /// ```
    /// use flightcli::data::FlightStatus;
    /// assert_eq!(FlightStatus::from_code("active").label(), "In Flight");
    /// assert_eq!(FlightStatus::from_code("boarding").label(), "boarding");
    /// ```
    pub fn from_code(code: &str) -> Self {
        match code {
            "scheduled" => FlightStatus::Scheduled,
            "active" => FlightStatus::Active,
            "landed" => FlightStatus::Landed,
            "cancelled" => FlightStatus::Cancelled,
            "incident" => FlightStatus::Incident,
            "diverted" => FlightStatus::Diverted,
            other => FlightStatus::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FlightStatus::Scheduled => "Scheduled",
            FlightStatus::Active => "In Flight",
            FlightStatus::Landed => "Landed",
            FlightStatus::Cancelled => "Cancelled",
            FlightStatus::Incident => "Incident",
            FlightStatus::Diverted => "Diverted",
            FlightStatus::Other(raw) => raw,
        }
    }
}

/// Upgrades "scheduled" to "active" when the chosen record carries live telemetry
///
/// The upstream sometimes keeps a departed flight at "scheduled" even though
/// position data already exists for it.
pub fn effective_status(raw: &str, has_live: bool) -> FlightStatus {
    if raw == "scheduled" && has_live {
        FlightStatus::Active
    } else {
        FlightStatus::from_code(raw)
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<FlightStatus> for String {
    fn from(status: FlightStatus) -> Self {
        status.label().to_string()
    }
}

// Reads display labels back (cache files, fixtures). Lowercase codes are
// accepted too so hand-written fixtures can use upstream vocabulary.
impl From<String> for FlightStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Scheduled" | "scheduled" => FlightStatus::Scheduled,
            "In Flight" | "active" => FlightStatus::Active,
            "Landed" | "landed" => FlightStatus::Landed,
            "Cancelled" | "cancelled" => FlightStatus::Cancelled,
            "Incident" | "incident" => FlightStatus::Incident,
            "Diverted" | "diverted" => FlightStatus::Diverted,
            _ => FlightStatus::Other(label),
        }
    }
}
