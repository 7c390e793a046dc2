use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

use crate::error::FetchError;

/// Latitude/longitude exactly as the geocoder returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: String,
    pub lon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub windspeed_mps: f64,
}

/// Pipeline stage that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Coordinates,
    Weather,
    /// The pipeline task itself died before reporting a stage.
    Pipeline,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Coordinates => "coordinates",
            Stage::Weather => "weather info",
            Stage::Pipeline => "results",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one city's pipeline.
#[derive(Debug)]
pub enum PipelineOutcome {
    Completed {
        city: String,
        reading: WeatherReading,
    },
    Failed {
        city: String,
        stage: Stage,
        error: FetchError,
    },
}

impl PipelineOutcome {
    pub fn city(&self) -> &str {
        match self {
            PipelineOutcome::Completed { city, .. } | PipelineOutcome::Failed { city, .. } => city,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Completed { .. })
    }
}

/// Everything a finished run produced, outcomes in completion order.
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<PipelineOutcome>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn outcome_for(&self, city: &str) -> Option<&PipelineOutcome> {
        self.outcomes.iter().find(|o| o.city() == city)
    }
}
