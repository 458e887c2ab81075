//! BATNA negotiation simulator.
//!
//! Seeded buyer/seller negotiations driven by personality profiles and
//! BATNA estimates, plus a batch runner for comparing estimation strategies.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use batna::models::{NegotiationParameters, Profile, SimConfig};
//! use batna::engine::{run_negotiation, NegotiationSession, SessionOptions};
//! use batna::batch::{BatchRunner, BaselineEstimator, ScenarioGenerator};
//! ```

pub mod archive;

pub use batna_batch as batch;
pub use batna_engine as engine;
pub use batna_models as models;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use batna_batch::{
    compare_strategies, BaselineEstimator, BatchError, BatchRun, BatchRunner, BatchSummary,
    BatnaEstimator, OracleEstimator, ScenarioGenerator, SessionIdentity, StrategyComparison,
};
use batna_models::SimConfig;

/// Read a TOML config. A missing file falls back to defaults only when
/// `allow_missing` is set (the default path); explicit paths must exist.
pub fn load_config(path: &Path, allow_missing: bool) -> anyhow::Result<SimConfig> {
    if allow_missing && !path.exists() {
        info!(path = %path.display(), "Config not found, using defaults");
        return Ok(SimConfig::default());
    }
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&config_str).with_context(|| "Failed to parse config")
}

/// Seeded batches get ids derived from the seed, so reruns produce the same
/// ids. Start times still follow the wall clock, so timestamps and bundle
/// folder names differ between reruns.
pub fn session_identity(config: &SimConfig) -> SessionIdentity {
    match config.batch.seed {
        Some(seed) => SessionIdentity::Fixed {
            started_at: Utc::now(),
            namespace: seed,
        },
        None => SessionIdentity::Random,
    }
}

pub fn build_generator(config: &SimConfig) -> Result<ScenarioGenerator, BatchError> {
    ScenarioGenerator::new(config.generator.clone(), config.batch.seed)
}

pub fn build_baseline_runner(config: &SimConfig) -> BatchRunner {
    BatchRunner::new(Arc::new(BaselineEstimator::new(config.baseline.clone())))
        .with_parallelism(config.batch.parallelism)
        .with_identity(session_identity(config))
}

/// Generate `config.batch.count` scenarios and negotiate them with the baseline estimator.
pub async fn run_batch(config: &SimConfig) -> Result<(BatchRun, BatchSummary), BatchError> {
    let scenarios = build_generator(config)?.generate(config.batch.count);
    let run = build_baseline_runner(config).run(&scenarios).await?;
    let summary = BatchSummary::from_run(&run);
    Ok((run, summary))
}

/// Baseline vs oracle (plus any extra estimators) on one scenario set.
///
/// Comparisons need a fixed scenario set; without a configured seed one is
/// drawn here and reported in the result.
pub async fn run_comparison(
    config: &SimConfig,
    extra: Vec<Arc<dyn BatnaEstimator>>,
) -> Result<(StrategyComparison, Vec<BatchRun>), BatchError> {
    let mut config = config.clone();
    let seed = *config.batch.seed.get_or_insert_with(rand::random::<u64>);

    let scenarios = build_generator(&config)?.generate(config.batch.count);

    let mut estimators: Vec<Arc<dyn BatnaEstimator>> = vec![
        Arc::new(BaselineEstimator::new(config.baseline.clone())),
        Arc::new(OracleEstimator),
    ];
    estimators.extend(extra);

    compare_strategies(
        &scenarios,
        estimators,
        config.batch.parallelism,
        session_identity(&config),
        Some(seed),
    )
    .await
}
