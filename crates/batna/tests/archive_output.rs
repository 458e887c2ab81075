//! Integration tests for archiving batch and comparison results to disk.
//!
//! Run with:
//! ```bash
//! cargo test -p batna --test archive_output
//! ```

use std::fs;
use std::sync::Arc;

use batna::archive::{Archiver, COMPARISON_FILE_NAME, CSV_FILE_NAME, SUMMARY_FILE_NAME};
use batna::batch::{BatchSummary, BatnaEstimator, PrecomputedEstimator, StrategyComparison};
use batna::models::SimConfig;

fn config(count: usize, seed: u64) -> SimConfig {
    let mut config = SimConfig::default();
    config.batch.count = count;
    config.batch.seed = Some(seed);
    config.batch.parallelism = 4;
    config
}

/// A batch writes the CSV, the summary and one folder per session.
#[tokio::test]
async fn batch_archive_layout() {
    let dir = tempfile::tempdir().unwrap();
    let (run, summary) = batna::run_batch(&config(10, 21)).await.unwrap();

    let report = Archiver::new(dir.path(), true)
        .write_run(&run, &summary)
        .unwrap();
    assert_eq!(report.bundles_written, 10);

    let csv = fs::read_to_string(dir.path().join(CSV_FILE_NAME)).unwrap();
    assert_eq!(csv.lines().count(), 11);

    let written: BatchSummary =
        serde_json::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE_NAME)).unwrap())
            .unwrap();
    assert_eq!(written.sessions, summary.sessions);
    assert_eq!(written.termination_reasons, summary.termination_reasons);

    let bundle_dirs = fs::read_dir(dir.path().join("negotiations")).unwrap().count();
    assert_eq!(bundle_dirs, 10);
}

#[tokio::test]
async fn bundles_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let (run, summary) = batna::run_batch(&config(5, 3)).await.unwrap();

    let report = Archiver::new(dir.path(), false)
        .write_run(&run, &summary)
        .unwrap();
    assert_eq!(report.bundles_written, 0);
    assert!(report.csv_path.exists());
    assert!(!dir.path().join("negotiations").exists());
}

/// Precomputed estimates join baseline and oracle, each archived in its own directory.
#[tokio::test]
async fn comparison_archive_layout() {
    let dir = tempfile::tempdir().unwrap();
    let estimates: Vec<_> = (0..8)
        .map(|i| {
            serde_json::json!({
                "index": i,
                "estimated_buyer_batna": 600.0,
                "estimated_seller_batna": 400.0,
            })
        })
        .collect();
    let estimates_path = dir.path().join("estimates.json");
    fs::write(&estimates_path, serde_json::to_string(&estimates).unwrap()).unwrap();

    let model = PrecomputedEstimator::from_path("model", &estimates_path).unwrap();
    let extra: Vec<Arc<dyn BatnaEstimator>> = vec![Arc::new(model)];
    let (comparison, runs) = batna::run_comparison(&config(8, 99), extra)
        .await
        .unwrap();

    let out = dir.path().join("out");
    let reports = Archiver::new(&out, false)
        .write_comparison(&comparison, &runs)
        .unwrap();
    assert_eq!(reports.len(), 3);

    let written: StrategyComparison =
        serde_json::from_str(&fs::read_to_string(out.join(COMPARISON_FILE_NAME)).unwrap())
            .unwrap();
    assert_eq!(written.seed, Some(99));
    assert_eq!(written.scenarios, 8);
    for strategy in ["baseline", "oracle", "model"] {
        assert!(out.join(strategy).join(CSV_FILE_NAME).exists(), "{strategy}");
    }
}
