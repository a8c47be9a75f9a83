//! flightcli library
//!
//! Flight status, airport boards and route searches from third-party flight
//! APIs, normalized into a few records and cached on disk. The binary in
//! `main.rs` is a thin layer over [`service::FlightService`].

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod display;
pub mod error;
pub mod providers;
pub mod service;
pub mod track;

pub use error::FlightError;
