use std::sync::Arc;

use tracing::info;

use crate::error::BatchError;
use crate::estimator::BatnaEstimator;
use crate::generator::Scenario;
use crate::runner::{BatchRun, BatchRunner, SessionIdentity};
use crate::stats::{BatchSummary, StrategyComparison};

/// Run every estimator over the same scenarios, one strategy at a time.
///
/// Scenario seeds are shared, so differences between summaries come from
/// the estimates alone.
pub async fn compare_strategies(
    scenarios: &[Scenario],
    estimators: Vec<Arc<dyn BatnaEstimator>>,
    parallelism: usize,
    identity: SessionIdentity,
    seed: Option<u64>,
) -> Result<(StrategyComparison, Vec<BatchRun>), BatchError> {
    let mut runs = Vec::with_capacity(estimators.len());
    for estimator in estimators {
        let run = BatchRunner::new(estimator)
            .with_parallelism(parallelism)
            .with_identity(identity)
            .run(scenarios)
            .await?;
        runs.push(run);
    }

    let summaries: Vec<BatchSummary> = runs.iter().map(BatchSummary::from_run).collect();
    for summary in &summaries {
        info!(
            strategy = %summary.strategy,
            deal_rate = summary.deal_rate,
            mean_rounds = summary.mean_rounds,
            "Strategy summary"
        );
    }

    let comparison = StrategyComparison {
        scenarios: scenarios.len(),
        seed,
        summaries,
    };
    if let Some(best) = comparison.best_by_deal_rate() {
        info!(
            strategy = %best.strategy,
            deal_rate = best.deal_rate,
            "Best strategy by deal rate"
        );
    }

    Ok((comparison, runs))
}
