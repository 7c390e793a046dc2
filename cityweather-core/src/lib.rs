//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Clients for the geocoding and weather services
//! - A shared deadline that bounds every network call
//! - The orchestrator that runs one geocode → weather pipeline per city concurrently
//!
//! It is used by `cityweather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod report;

pub use config::Config;
pub use context::RunContext;
pub use error::FetchError;
pub use model::{Coordinate, PipelineOutcome, RunSummary, Stage, WeatherReading};
pub use orchestrator::Orchestrator;
pub use provider::{CoordinateResolver, WeatherFetcher, providers_from_config};
pub use report::{ConsoleReporter, Reporter};
