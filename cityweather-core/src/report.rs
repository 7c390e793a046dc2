//! Console rendering of pipeline outcomes.
//!
//! Numbers use Rust's fixed-precision formatting, which rounds the exact
//! binary value of the `f64` (ties to even). `4.265` is stored as
//! `4.26499...` and therefore prints as `4.26`.

use std::io::Write;

use crate::model::{PipelineOutcome, RunSummary};

/// Receives outcomes as pipelines settle, then the run summary.
pub trait Reporter: Send {
    fn outcome(&mut self, outcome: &PipelineOutcome);
    fn finished(&mut self, summary: &RunSummary);
}

pub fn outcome_line(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::Completed { city, reading } => format!(
            "City: {city}, Temperature: {:.1}°C, Windspeed: {:.2} m/s",
            reading.temperature_c, reading.windspeed_mps
        ),
        PipelineOutcome::Failed { city, stage, error } => {
            format!("Error fetching {stage} for {city}: {error}")
        }
    }
}

pub fn summary_line(summary: &RunSummary) -> String {
    format!("Total time: {:?}", summary.elapsed)
}

/// Writes one line per outcome and a final timing line.
#[derive(Debug)]
pub struct ConsoleReporter<W> {
    out: W,
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}") {
            tracing::warn!(%err, "failed to write report line");
        }
    }
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn outcome(&mut self, outcome: &PipelineOutcome) {
        self.write_line(&outcome_line(outcome));
    }

    fn finished(&mut self, summary: &RunSummary) {
        self.write_line(&summary_line(summary));
        if let Err(err) = self.out.flush() {
            tracing::warn!(%err, "failed to flush report");
        }
    }
}
