pub mod compare;
pub mod error;
pub mod estimator;
pub mod export;
pub mod generator;
pub mod runner;
pub mod stats;

pub use compare::compare_strategies;
pub use error::{BatchError, EstimatorError};
pub use estimator::{
    BaselineEstimator, BatnaEstimate, BatnaEstimator, OracleEstimator, PrecomputedEstimator,
};
pub use export::{bundles, run_to_csv, to_csv};
pub use generator::{Scenario, ScenarioGenerator};
pub use runner::{BatchRun, BatchRunner, SessionIdentity, SessionResult, SkippedScenario};
pub use stats::{BatchSummary, StrategyComparison};
