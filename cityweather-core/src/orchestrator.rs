use chrono::Utc;
use std::{collections::HashMap, sync::Arc, time::Instant};
use tokio::task::JoinSet;

use crate::{
    context::RunContext,
    error::FetchError,
    model::{PipelineOutcome, RunSummary, Stage},
    provider::{CoordinateResolver, WeatherFetcher},
    report::Reporter,
};

/// Runs one geocode → weather pipeline per city, all at once.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    resolver: Arc<dyn CoordinateResolver>,
    fetcher: Arc<dyn WeatherFetcher>,
}

impl Orchestrator {
    pub fn new(resolver: Arc<dyn CoordinateResolver>, fetcher: Arc<dyn WeatherFetcher>) -> Self {
        Self { resolver, fetcher }
    }

    /// Resolve then fetch for a single city. Stops at the first failure.
    pub async fn run_pipeline(&self, city: String, ctx: &RunContext) -> PipelineOutcome {
        let coord = match self.resolver.resolve(&city, ctx).await {
            Ok(coord) => coord,
            Err(error) => {
                tracing::warn!(%city, kind = error.kind(), %error, "coordinate lookup failed");
                return PipelineOutcome::Failed {
                    city,
                    stage: Stage::Coordinates,
                    error,
                };
            }
        };

        match self.fetcher.fetch(&coord, ctx).await {
            Ok(reading) => PipelineOutcome::Completed { city, reading },
            Err(error) => {
                tracing::warn!(%city, kind = error.kind(), %error, "weather lookup failed");
                PipelineOutcome::Failed {
                    city,
                    stage: Stage::Weather,
                    error,
                }
            }
        }
    }

    /// Launch every pipeline, report each outcome as it settles, then the summary.
    ///
    /// Every network call is bounded by `ctx`, so this returns no later than
    /// shortly after its deadline. A pipeline task that panics still yields a
    /// failed outcome for its city.
    pub async fn run(
        &self,
        cities: &[String],
        ctx: &RunContext,
        reporter: &mut dyn Reporter,
    ) -> RunSummary {
        let started_at = Utc::now();
        let start = Instant::now();

        let mut set = JoinSet::new();
        let mut pending = HashMap::with_capacity(cities.len());
        for city in cities {
            let this = self.clone();
            let ctx = ctx.child();
            let task_city = city.clone();
            let handle = set.spawn(async move { this.run_pipeline(task_city, &ctx).await });
            pending.insert(handle.id(), city.clone());
        }
        tracing::debug!(pipelines = cities.len(), "all pipelines launched");

        let mut outcomes = Vec::with_capacity(cities.len());
        while let Some(res) = set.join_next_with_id().await {
            let outcome = match res {
                Ok((id, outcome)) => {
                    pending.remove(&id);
                    outcome
                }
                Err(err) => {
                    tracing::error!("join error while waiting on city pipeline: {:?}", err);
                    let Some(city) = pending.remove(&err.id()) else {
                        continue;
                    };
                    PipelineOutcome::Failed {
                        city,
                        stage: Stage::Pipeline,
                        error: FetchError::Aborted(err.to_string()),
                    }
                }
            };
            reporter.outcome(&outcome);
            outcomes.push(outcome);
        }

        let summary = RunSummary {
            outcomes,
            started_at,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            started_at = %summary.started_at,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            elapsed = ?summary.elapsed,
            "run finished"
        );
        reporter.finished(&summary);

        summary
    }
}
