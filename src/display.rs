//! Text rendering for query results
//!
//! Builds the human-readable output printed by the binary. Status labels are
//! coloured with crossterm; JSON output bypasses this module entirely.

use chrono::{DateTime, Duration, Utc};
use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::{Color, Print, Stylize},
    terminal::{Clear, ClearType},
    tty::IsTty,
};
use std::fmt::Write;
use std::io;
use tokio::task::JoinHandle;

use crate::data::{AirportBoardEntry, FlightStatus, FlightStatusRecord};

/// Colour used for a status label
pub fn status_color(status: &FlightStatus) -> Color {
    match status {
        FlightStatus::Active => Color::Green,
        FlightStatus::Landed => Color::Blue,
        FlightStatus::Scheduled => Color::Yellow,
        FlightStatus::Cancelled | FlightStatus::Diverted | FlightStatus::Incident => Color::Red,
        FlightStatus::Other(_) => Color::Reset,
    }
}

/// Formats a duration as "2h 5m" or "45m", with a leading "-" when negative
pub fn format_duration(d: Duration) -> String {
    if d < Duration::zero() {
        return format!("-{}", format_duration(Duration::zero() - d));
    }
    let hours = d.num_hours();
    let minutes = d.num_minutes() % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

fn label(text: &str) -> String {
    text.cyan().bold().to_string()
}

/// Renders one flight's status block
pub fn render_flight_status(record: &FlightStatusRecord, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}{}", label("Flight:   "), record.flight_number);
    let _ = writeln!(out, "{}{}", label("Airline:  "), record.airline);
    if !record.departure.is_empty() || !record.arrival.is_empty() {
        let _ = writeln!(out, "{}{} → {}", label("Route:    "), record.departure, record.arrival);
    }
    let _ = writeln!(
        out,
        "{}{}",
        label("Status:   "),
        record.status.label().with(status_color(&record.status))
    );

    if let Some(dep) = record.departure_time {
        let _ = writeln!(out, "{}{}", label("Departs:  "), dep.format("%Y-%m-%d %H:%M %:z"));
    }
    if let Some(arr) = record.arrival_time {
        let _ = writeln!(out, "{}{}", label("Arrives:  "), arr.format("%Y-%m-%d %H:%M %:z"));
    }

    if let Some(total) = record.flight_duration() {
        let _ = writeln!(out, "{}{}", label("Flight Time:    "), format_duration(total));
        if let Some(remaining) = record.time_remaining(now) {
            let _ = writeln!(out, "{}{}", label("Time Remaining: "), format_duration(remaining));
        }
    }

    if let Some(live) = record.live {
        let _ = writeln!(out, "{}{:.4}, {:.4}", label("Location: "), live.latitude, live.longitude);
        let _ = writeln!(out, "{}{:.0} ft", label("Altitude: "), live.altitude_ft);
        let _ = writeln!(out, "{}{:.0} mph", label("Speed:    "), live.speed_mph);
    }

    out
}

/// Renders a board or route search as an aligned table
pub fn render_board(title: &str, entries: &[AirportBoardEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", title.bold());

    for entry in entries {
        let time = entry
            .scheduled_time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default();
        let route = format!("{} → {}", entry.origin, entry.destination);
        // Pad before styling so ANSI codes do not break alignment
        let status = format!("{:<12}", entry.status.label());
        let _ = writeln!(
            out,
            "  {:<10} {:<25} {:<14} {} {}",
            entry.flight_number,
            entry.airline,
            route,
            status.with(status_color(&entry.status)),
            time
        );
    }

    out
}

/// Marker printed after results served from the cache
pub fn cached_indicator() -> String {
    "(cached)".dim().to_string()
}

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const SPINNER_TICK: std::time::Duration = std::time::Duration::from_millis(80);

/// Text of one spinner frame
pub fn spinner_line(message: &str, tick: usize) -> String {
    format!("{} {}", SPINNER_FRAMES[tick % SPINNER_FRAMES.len()], message)
}

/// Progress indicator drawn on stderr while a query runs
///
/// Does nothing when disabled or when stderr is not a terminal, so piped
/// output and JSON stay clean. Must be started inside a tokio runtime.
pub struct Spinner {
    task: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start(message: impl Into<String>, enabled: bool) -> Self {
        if !enabled || !io::stderr().is_tty() {
            return Self { task: None };
        }

        let message = message.into();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SPINNER_TICK);
            let mut tick = 0usize;
            loop {
                ticker.tick().await;
                let _ = execute!(
                    io::stderr(),
                    MoveToColumn(0),
                    Clear(ClearType::CurrentLine),
                    Print(spinner_line(&message, tick))
                );
                tick = tick.wrapping_add(1);
            }
        });

        Self { task: Some(task) }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Stops drawing and erases the spinner line
    pub fn stop(self) {
        if let Some(task) = self.task {
            task.abort();
            let _ = execute!(io::stderr(), MoveToColumn(0), Clear(ClearType::CurrentLine));
        }
    }
}
