//! Normalization of raw upstream values
//!
//! Unit conversions, flight-number canonicalization and the timestamp repair
//! for upstream times that carry a misleading `+00:00` offset.

use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Feet per metre
const FEET_PER_METER: f64 = 3.28084;

/// mph per km/h
const MPH_PER_KMH: f64 = 0.621371;

/// mph per m/s
const MPH_PER_MPS: f64 = 2.23694;

pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

/// Converts km/h to mph. Only valid for providers that report km/h.
pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh * MPH_PER_KMH
}

/// Converts m/s to mph. Only valid for providers that report m/s.
pub fn mps_to_mph(mps: f64) -> f64 {
    mps * MPH_PER_MPS
}

/// Canonicalizes a user-supplied flight number into the token the upstream expects
///
/// Uppercases and trims, then strips leading zeros from the part after the
/// alphabetic carrier prefix ("ke038" becomes "KE38"). Input without a
/// carrier prefix, or without anything after it, is returned uppercased and
/// trimmed but otherwise untouched.
pub fn normalize_flight_number(input: &str) -> String {
    let upper = input.trim().to_uppercase();

    let prefix_len = upper
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(upper.len());
    if prefix_len == 0 || prefix_len == upper.len() {
        return upper;
    }

    let (prefix, suffix) = upper.split_at(prefix_len);
    let number = suffix.trim_start_matches('0');
    if number.is_empty() {
        format!("{}0", prefix)
    } else {
        format!("{}{}", prefix, number)
    }
}

/// Uppercases and trims an airport code
pub fn normalize_airport_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Offset the upstream stamps on every time, whatever the airport
const FAKE_UTC_SUFFIX: &str = "+00:00";

/// Reads the wall-clock fields of an upstream timestamp
///
/// Only the upstream layout `YYYY-MM-DDTHH:MM:SS+00:00` is accepted. A value
/// with any other offset is rejected so the next candidate gets a chance.
fn parse_wall_clock(value: &str) -> Option<NaiveDateTime> {
    let wall_clock = value.strip_suffix(FAKE_UTC_SUFFIX)?;
    NaiveDateTime::parse_from_str(wall_clock, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Pins a wall-clock time to a zone
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap do not exist locally and are moved forward by an hour.
fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    let local = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
    };
    local.map(|dt| dt.fixed_offset())
}

/// Repairs upstream timestamps that are local airport time labelled as UTC
///
/// `candidates` are tried in order (actual, estimated, scheduled); the first
/// non-empty value that parses wins. Its wall-clock fields are reinterpreted in
/// the IANA zone `timezone`, or in UTC when the zone name is unknown. Returns
/// `None` when no candidate parses.
pub fn parse_local_time(timezone: &str, candidates: &[&str]) -> Option<DateTime<FixedOffset>> {
    let tz = timezone.parse::<Tz>().ok();

    candidates
        .iter()
        .filter(|value| !value.is_empty())
        .find_map(|value| {
            let naive = parse_wall_clock(value)?;
            match tz {
                Some(tz) => localize(tz, naive),
                None => Some(Utc.from_utc_datetime(&naive).fixed_offset()),
            }
        })
}
