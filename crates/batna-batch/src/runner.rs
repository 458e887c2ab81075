use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use batna_engine::{run_negotiation, CompletedNegotiation, EngineError, SessionOptions};

use crate::error::BatchError;
use crate::estimator::{BatnaEstimate, BatnaEstimator};
use crate::generator::Scenario;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionResult {
    pub scenario: Scenario,
    pub estimate: BatnaEstimate,
    pub completed: CompletedNegotiation,
}

/// A scenario dropped because its estimate could not be produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedScenario {
    pub index: usize,
    pub reason: String,
}

/// Everything one strategy produced over a scenario set, ordered by scenario index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchRun {
    pub strategy: String,
    pub results: Vec<SessionResult>,
    pub skipped: Vec<SkippedScenario>,
}

impl BatchRun {
    pub fn sessions(&self) -> impl Iterator<Item = &CompletedNegotiation> {
        self.results.iter().map(|r| &r.completed)
    }

    /// Longest transcript in the run; sizes the CSV round columns.
    pub fn max_rounds(&self) -> usize {
        self.sessions().map(|s| s.rounds.len()).max().unwrap_or(0)
    }
}

/// How session ids and start times are assigned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionIdentity {
    /// Fresh v4 id and the wall clock for every session.
    Random,
    /// Ids derived from the scenario index, one shared start time.
    /// Makes a seeded batch byte-identical across runs.
    Fixed {
        started_at: DateTime<Utc>,
        namespace: u64,
    },
}

impl SessionIdentity {
    fn options_for(&self, index: usize) -> SessionOptions {
        match *self {
            SessionIdentity::Random => SessionOptions::default(),
            SessionIdentity::Fixed {
                started_at,
                namespace,
            } => {
                // Index in the top bits so short ids differ per session.
                let id = Uuid::from_u128(((index as u128) << 96) | u128::from(namespace));
                SessionOptions::fixed(id, started_at)
            }
        }
    }
}

enum TaskOutcome {
    Done(Box<SessionResult>),
    Skipped(SkippedScenario),
    Failed(usize, EngineError),
}

/// Runs one estimator over a scenario set with bounded concurrency.
pub struct BatchRunner {
    estimator: Arc<dyn BatnaEstimator>,
    parallelism: usize,
    identity: SessionIdentity,
}

impl BatchRunner {
    pub fn new(estimator: Arc<dyn BatnaEstimator>) -> Self {
        Self {
            estimator,
            parallelism: 8,
            identity: SessionIdentity::Random,
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn with_identity(mut self, identity: SessionIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn strategy(&self) -> &str {
        self.estimator.name()
    }

    /// Estimate and negotiate every scenario.
    ///
    /// A failed estimate skips its scenario. An engine error means a
    /// contract violation and aborts the whole batch.
    pub async fn run(&self, scenarios: &[Scenario]) -> Result<BatchRun, BatchError> {
        let start = Instant::now();
        let strategy = self.estimator.name().to_string();
        info!(
            strategy = %strategy,
            scenarios = scenarios.len(),
            parallelism = self.parallelism,
            "Starting batch"
        );

        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let mut tasks = JoinSet::new();

        for scenario in scenarios.iter().cloned() {
            let estimator = Arc::clone(&self.estimator);
            let semaphore = Arc::clone(&semaphore);
            let options = self.identity.options_for(scenario.index);

            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only fails on shutdown.
                let _permit = semaphore.acquire_owned().await.ok();

                let estimate = match estimator.estimate(&scenario).await {
                    Ok(estimate) => estimate,
                    Err(e) => {
                        return TaskOutcome::Skipped(SkippedScenario {
                            index: scenario.index,
                            reason: e.to_string(),
                        })
                    }
                };

                let params = scenario.parameters(estimate);
                match run_negotiation(&params, options) {
                    Ok(completed) => TaskOutcome::Done(Box::new(SessionResult {
                        scenario,
                        estimate,
                        completed,
                    })),
                    Err(e) => TaskOutcome::Failed(scenario.index, e),
                }
            });
        }

        let mut results = Vec::with_capacity(scenarios.len());
        let mut skipped = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(TaskOutcome::Done(result)) => {
                    debug!(
                        index = result.scenario.index,
                        outcome = %result.completed.meta.outcome,
                        rounds = result.completed.meta.total_rounds,
                        "Session complete"
                    );
                    results.push(*result);
                }
                Ok(TaskOutcome::Skipped(skip)) => {
                    warn!(index = skip.index, reason = %skip.reason, "Estimate failed, skipping scenario");
                    skipped.push(skip);
                }
                Ok(TaskOutcome::Failed(index, source)) => {
                    error!(index, error = %source, "Session failed");
                    return Err(BatchError::Engine { index, source });
                }
                Err(e) => {
                    error!(error = %e, "Session task panicked");
                    return Err(BatchError::Join(e));
                }
            }
        }

        results.sort_by_key(|r| r.scenario.index);
        skipped.sort_by_key(|s| s.index);

        info!(
            strategy = %strategy,
            sessions = results.len(),
            skipped = skipped.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Batch complete"
        );

        Ok(BatchRun {
            strategy,
            results,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::tests::{scenario, FlakyEstimator};
    use crate::estimator::OracleEstimator;
    use batna_engine::test_support::fixed_start;

    fn fixed() -> SessionIdentity {
        SessionIdentity::Fixed {
            started_at: fixed_start(),
            namespace: 7,
        }
    }

    #[tokio::test]
    async fn results_are_ordered_by_index() {
        let scenarios: Vec<Scenario> = (0..20)
            .map(|i| {
                let mut s = scenario(i);
                s.random_seed = i as u32;
                s
            })
            .collect();
        let run = BatchRunner::new(Arc::new(OracleEstimator))
            .with_parallelism(3)
            .run(&scenarios)
            .await
            .unwrap();

        assert_eq!(run.strategy, "oracle");
        assert_eq!(run.results.len(), 20);
        assert!(run.skipped.is_empty());
        for (i, result) in run.results.iter().enumerate() {
            assert_eq!(result.scenario.index, i);
            assert_eq!(result.completed.meta.random_seed, i as u32);
        }
        assert!(run.max_rounds() >= 2);
    }

    #[tokio::test]
    async fn failed_estimates_are_skipped() {
        let scenarios: Vec<Scenario> = (0..6).map(scenario).collect();
        let run = BatchRunner::new(Arc::new(FlakyEstimator {
            failing: vec![1, 4],
        }))
        .run(&scenarios)
        .await
        .unwrap();

        assert_eq!(run.results.len(), 4);
        let skipped: Vec<usize> = run.skipped.iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![1, 4]);
        assert!(run.skipped[0].reason.contains("mock failure"));
    }

    #[tokio::test]
    async fn fixed_identity_is_reproducible() {
        let scenarios: Vec<Scenario> = (0..8).map(scenario).collect();
        let a = BatchRunner::new(Arc::new(OracleEstimator))
            .with_identity(fixed())
            .run(&scenarios)
            .await
            .unwrap();
        let b = BatchRunner::new(Arc::new(OracleEstimator))
            .with_identity(fixed())
            .with_parallelism(1)
            .run(&scenarios)
            .await
            .unwrap();
        assert_eq!(a, b);

        let short_ids: std::collections::HashSet<String> =
            a.sessions().map(|s| s.meta.short_id()).collect();
        assert_eq!(short_ids.len(), 8);
    }

    #[tokio::test]
    async fn empty_scenario_set() {
        let run = BatchRunner::new(Arc::new(OracleEstimator))
            .run(&[])
            .await
            .unwrap();
        assert!(run.results.is_empty());
        assert_eq!(run.max_rounds(), 0);
    }
}
