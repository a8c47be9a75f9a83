//! Command-line interface parsing for flightcli
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into a [`Config`] plus the command to run.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{Config, ProviderKind};
use crate::data::{BoardMode, UnknownStatusRank};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// Live tracking renders continuously and has no JSON form
    #[error("--json is not supported with track (live mode); use 'flightcli status --json' for a one-time JSON snapshot")]
    JsonNotSupported,
}

/// flightcli - Track live flights and airport departures/arrivals
#[derive(Parser, Debug)]
#[command(name = "flightcli")]
#[command(about = "Track live flights and airport departures/arrivals")]
#[command(version)]
pub struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Flight data provider
    #[arg(long, value_enum, env = "FLIGHTCLI_PROVIDER", default_value = "aviationstack", global = true)]
    pub provider: ProviderKind,

    /// AviationStack API key (get a free key at https://aviationstack.com/)
    #[arg(long, env = "AVIATIONSTACK_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Directory for cached responses
    #[arg(long, env = "FLIGHTCLI_CACHE_DIR", value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Always query the provider, never read or write the cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// JSON file with records for the fixture provider
    #[arg(long, value_name = "PATH", global = true)]
    pub fixture: Option<PathBuf>,

    /// Rank unrecognized statuses like "active" when several flights match
    #[arg(long, global = true)]
    pub legacy_unknown_priority: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Get live flight status
    Status {
        /// Flight number, e.g. KE038 or DL123
        flight: String,
    },
    /// Get departures or arrivals for an airport
    Airport {
        /// Airport IATA code, e.g. JFK
        code: String,
        /// Flight type: departures or arrivals
        #[arg(short = 't', long = "type", default_value = "departures")]
        mode: BoardMode,
    },
    /// Search flights between two airports
    Search {
        /// Departure airport IATA code (e.g. JFK)
        #[arg(long)]
        from: String,
        /// Arrival airport IATA code (e.g. LAX)
        #[arg(long)]
        to: String,
    },
    /// Live-track a flight, refreshing automatically
    Track {
        /// Flight number
        flight: String,
        /// Refresh interval in seconds
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}

impl Config {
    /// Creates a Config from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(Config)` with the resolved settings
    /// * `Err(CliError)` if the flags cannot be combined
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.json && matches!(cli.command, Command::Track { .. }) {
            return Err(CliError::JsonNotSupported);
        }

        let unknown_rank = if cli.legacy_unknown_priority {
            UnknownStatusRank::First
        } else {
            UnknownStatusRank::Last
        };

        Ok(Config {
            provider: cli.provider,
            api_key: cli.api_key.clone(),
            cache_dir: cli.cache_dir.clone(),
            // Live tracking must always observe fresh data
            use_cache: !cli.no_cache && !matches!(cli.command, Command::Track { .. }),
            fixture: cli.fixture.clone(),
            unknown_rank,
        })
    }
}
