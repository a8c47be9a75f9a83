//! flightcli - Track live flights and airport departures/arrivals
//!
//! Parses the command line, builds the configured provider and cache, and
//! prints query results as text or JSON.

use std::error::Error;
use std::future::Future;
use std::io;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use crossterm::{
    cursor::MoveTo,
    execute,
    style::Stylize,
    terminal::{Clear, ClearType},
};
use serde::Serialize;

use flightcli::cli::{Cli, Command};
use flightcli::config::Config;
use flightcli::display::{self, Spinner};
use flightcli::providers::Provider;
use flightcli::service::FlightService;
use flightcli::track::{TrackConfig, TrackHandle, TrackMessage};
use flightcli::FlightError;

/// Prints guidance when the AviationStack key is missing
fn print_api_key_help() {
    eprintln!();
    eprintln!("Fix it one of two ways:");
    eprintln!("  1. Export it in your shell:");
    eprintln!("       export AVIATIONSTACK_API_KEY=your_key_here");
    eprintln!("  2. Pass it on the command line:");
    eprintln!("       flightcli --api-key your_key_here status KE38");
    eprintln!();
    eprintln!("Get a free key at https://aviationstack.com/");
    eprintln!("Or try it offline with --provider fixture");
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

/// Runs `query` with a spinner on stderr, unless output is JSON
async fn with_spinner<T>(message: String, json: bool, query: impl Future<Output = T>) -> T {
    let spinner = Spinner::start(message, !json);
    let result = query.await;
    spinner.stop();
    result
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Polls one flight until Ctrl+C, redrawing the screen on every update
async fn run_track(
    service: FlightService<Provider>,
    flight: String,
    interval: u64,
) -> Result<(), Box<dyn Error>> {
    let config = TrackConfig {
        interval: Duration::from_secs(interval),
    };
    let mut spinner = Some(Spinner::start(format!("Fetching status for {}...", flight), true));
    let handle = TrackHandle::spawn(service, flight, config);

    handle
        .run_until(ctrl_c(), |message| -> io::Result<()> {
            if let Some(spinner) = spinner.take() {
                spinner.stop();
            }

            execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
            match message {
                TrackMessage::Updated { record, fetched_at } => {
                    print!("{}", display::render_flight_status(&record, fetched_at));
                    println!();
                    println!("Last updated: {}", fetched_at.with_timezone(&Local).format("%H:%M:%S"));
                }
                TrackMessage::Failed(msg) => eprintln!("Error: {}", msg),
            }
            println!("{}", format!("Refreshing every {}s. Press Ctrl+C to stop", interval).dim());
            Ok(())
        })
        .await?;

    if let Some(spinner) = spinner {
        spinner.stop();
    }
    println!("Stopped tracking.");
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::from_cli(&cli)?;
    let provider = config.build_provider()?;
    let service = FlightService::new(provider, config.cache());

    match cli.command {
        Command::Status { flight } => {
            let fetched = with_spinner(
                format!("Fetching status for {}...", flight.trim().to_uppercase()),
                cli.json,
                service.get_status(&flight),
            )
            .await?;
            if cli.json {
                print_json(&fetched.data)?;
            } else {
                print!("{}", display::render_flight_status(&fetched.data, chrono::Utc::now()));
                if fetched.cached {
                    println!("{}", display::cached_indicator());
                }
            }
        }
        Command::Airport { code, mode } => {
            let code_upper = code.trim().to_uppercase();
            let fetched = with_spinner(
                format!("Fetching {} for {}...", mode.as_str(), code_upper),
                cli.json,
                service.get_airport_board(&code, mode),
            )
            .await?;
            if cli.json {
                print_json(&fetched.data)?;
            } else {
                let title = format!("{} for {}:", mode.label(), code_upper);
                print!("{}", display::render_board(&title, &fetched.data));
                if fetched.cached {
                    println!("{}", display::cached_indicator());
                }
            }
        }
        Command::Search { from, to } => {
            let from_upper = from.trim().to_uppercase();
            let to_upper = to.trim().to_uppercase();
            let fetched = with_spinner(
                format!("Searching flights from {} to {}...", from_upper, to_upper),
                cli.json,
                service.search_route(&from, &to),
            )
            .await?;
            if cli.json {
                print_json(&fetched.data)?;
            } else {
                let title = format!("Flights from {} to {}:", from_upper, to_upper);
                print!("{}", display::render_board(&title, &fetched.data));
                if fetched.cached {
                    println!("{}", display::cached_indicator());
                }
            }
        }
        Command::Track { flight, interval } => {
            run_track(service, flight, interval).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(FlightError::MissingApiKey) = e.downcast_ref::<FlightError>() {
                print_api_key_help();
            }
            ExitCode::FAILURE
        }
    }
}
