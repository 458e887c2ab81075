//! Integration tests for the full batch pipeline: seeded generation,
//! concurrent negotiation, aggregation and export.
//!
//! Run with:
//! ```bash
//! cargo test -p batna-batch --test batch_pipeline
//! ```

use std::sync::Arc;

use batna_batch::{
    bundles, run_to_csv, BaselineEstimator, BatchRunner, BatchSummary, ScenarioGenerator,
    SessionIdentity,
};
use batna_engine::test_support::{check_transcript, fixed_start};
use batna_models::{BaselineConfig, GeneratorConfig, Outcome};

fn identity() -> SessionIdentity {
    SessionIdentity::Fixed {
        started_at: fixed_start(),
        namespace: 2024,
    }
}

async fn baseline_run(seed: u64, count: usize, parallelism: usize) -> batna_batch::BatchRun {
    let scenarios = ScenarioGenerator::new(GeneratorConfig::default(), Some(seed))
        .unwrap()
        .generate(count);
    BatchRunner::new(Arc::new(BaselineEstimator::new(BaselineConfig::default())))
        .with_parallelism(parallelism)
        .with_identity(identity())
        .run(&scenarios)
        .await
        .unwrap()
}

/// Same seed and identity: byte-identical CSV and bundles regardless of parallelism.
#[tokio::test]
async fn seeded_batch_is_reproducible() {
    let a = baseline_run(42, 60, 8).await;
    let b = baseline_run(42, 60, 1).await;
    assert_eq!(run_to_csv(&a), run_to_csv(&b));
    assert_eq!(bundles(&a).unwrap(), bundles(&b).unwrap());
}

#[tokio::test]
async fn csv_has_one_row_per_session() {
    let run = baseline_run(5, 40, 4).await;
    let csv = run_to_csv(&run);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 41);

    let width = 16 + 5 * run.max_rounds();
    assert!(lines.iter().all(|l| l.split(',').count() == width));
}

#[tokio::test]
async fn every_session_respects_invariants() {
    let run = baseline_run(99, 200, 8).await;
    assert_eq!(run.results.len(), 200);
    for result in &run.results {
        if let Err(violation) = check_transcript(&result.completed) {
            panic!("scenario {}: {violation}", result.scenario.index);
        }
        // Generator month noise above 12 is clamped on the way in.
        assert_eq!(
            result.completed.meta.initial_month_to_key,
            result.scenario.month_to_key.min(12)
        );
    }
}

#[tokio::test]
async fn summary_rates_add_up() {
    let run = baseline_run(7, 100, 8).await;
    let summary = BatchSummary::from_run(&run);
    let total = summary.deal_rate
        + summary.walkaway_rate
        + summary.no_deal_rate
        + summary.batna_violation_rate;
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(summary.termination_reasons.values().sum::<usize>(), 100);

    let deals = run
        .sessions()
        .filter(|s| s.meta.outcome == Outcome::Deal)
        .count();
    assert_eq!(summary.outcomes.get("deal").copied().unwrap_or(0), deals);
}

#[tokio::test]
async fn bundles_use_distinct_folders() {
    let run = baseline_run(3, 25, 8).await;
    let files = bundles(&run).unwrap();
    assert_eq!(files.len(), 25);
    let folders: std::collections::HashSet<&str> = files.iter().map(|f| f.folder.as_str()).collect();
    assert_eq!(folders.len(), 25);
    assert!(files
        .iter()
        .all(|f| f.folder.starts_with("negotiations/2024-03-01T09-30-00_")));
}
