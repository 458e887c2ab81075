use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use batna_engine::value_analysis;
use batna_models::Outcome;

use crate::runner::BatchRun;

/// Aggregate view of one strategy's batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub strategy: String,
    pub sessions: usize,
    /// Scenarios dropped because no estimate could be produced.
    pub skipped: usize,
    pub deal_rate: f64,
    pub walkaway_rate: f64,
    pub no_deal_rate: f64,
    pub batna_violation_rate: f64,
    pub mean_rounds: f64,
    /// Errors of the supplied estimates against the true BATNAs.
    pub mean_buyer_estimate_abs_error: f64,
    pub mean_seller_estimate_abs_error: f64,
    pub mean_buyer_estimate_signed_error: f64,
    pub mean_seller_estimate_signed_error: f64,
    /// Averages over deals only; None when the batch closed no deals.
    pub mean_final_price: Option<f64>,
    pub mean_seller_surplus: Option<f64>,
    pub mean_buyer_surplus: Option<f64>,
    pub outcomes: BTreeMap<String, usize>,
    pub termination_reasons: BTreeMap<String, usize>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

impl BatchSummary {
    pub fn from_run(run: &BatchRun) -> Self {
        let metas: Vec<_> = run.sessions().map(|s| &s.meta).collect();
        let reports: Vec<_> = metas.iter().map(|m| value_analysis(m)).collect();
        let total = metas.len();

        let mut outcomes = BTreeMap::new();
        let mut termination_reasons = BTreeMap::new();
        for meta in &metas {
            *outcomes.entry(meta.outcome.as_str().to_string()).or_insert(0) += 1;
            *termination_reasons
                .entry(meta.termination_reason.as_str().to_string())
                .or_insert(0) += 1;
        }
        let count = |outcome: Outcome| outcomes.get(outcome.as_str()).copied().unwrap_or(0);

        let deals: Vec<_> = metas
            .iter()
            .filter(|m| m.outcome == Outcome::Deal)
            .collect();

        Self {
            strategy: run.strategy.clone(),
            sessions: total,
            skipped: run.skipped.len(),
            deal_rate: rate(count(Outcome::Deal), total),
            walkaway_rate: rate(count(Outcome::Walkaway), total),
            no_deal_rate: rate(count(Outcome::NoDeal), total),
            batna_violation_rate: rate(count(Outcome::NoDealBatnaViolation), total),
            mean_rounds: mean(metas.iter().map(|m| f64::from(m.total_rounds))).unwrap_or(0.0),
            mean_buyer_estimate_abs_error: mean(
                reports.iter().map(|r| r.buyer_estimation.absolute_error),
            )
            .unwrap_or(0.0),
            mean_seller_estimate_abs_error: mean(
                reports.iter().map(|r| r.seller_estimation.absolute_error),
            )
            .unwrap_or(0.0),
            mean_buyer_estimate_signed_error: mean(
                reports.iter().map(|r| r.buyer_estimation.signed_error),
            )
            .unwrap_or(0.0),
            mean_seller_estimate_signed_error: mean(
                reports.iter().map(|r| r.seller_estimation.signed_error),
            )
            .unwrap_or(0.0),
            mean_final_price: mean(deals.iter().filter_map(|m| m.final_price)),
            mean_seller_surplus: mean(
                deals
                    .iter()
                    .filter_map(|m| m.post_negotiation_analysis.seller_surplus),
            ),
            mean_buyer_surplus: mean(
                deals
                    .iter()
                    .filter_map(|m| m.post_negotiation_analysis.buyer_surplus),
            ),
            outcomes,
            termination_reasons,
        }
    }
}

/// Several strategies measured on one scenario set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyComparison {
    pub scenarios: usize,
    /// Generator seed the scenario set came from, when known.
    pub seed: Option<u64>,
    pub summaries: Vec<BatchSummary>,
}

impl StrategyComparison {
    pub fn summary(&self, strategy: &str) -> Option<&BatchSummary> {
        self.summaries.iter().find(|s| s.strategy == strategy)
    }

    /// Highest deal rate; ties go to the strategy listed first.
    pub fn best_by_deal_rate(&self) -> Option<&BatchSummary> {
        self.summaries
            .iter()
            .reduce(|best, s| if s.deal_rate > best.deal_rate { s } else { best })
    }
}
