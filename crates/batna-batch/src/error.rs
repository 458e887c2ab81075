use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("No estimate for scenario {0}")]
    Missing(usize),

    #[error("Invalid estimate for scenario {index}: {field} = {value}")]
    Invalid {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("Estimator unavailable: {0}")]
    Unavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Invalid batch configuration: {0}")]
    InvalidConfig(String),

    #[error("Engine error in scenario {index}: {source}")]
    Engine {
        index: usize,
        #[source]
        source: batna_engine::EngineError,
    },

    #[error("Bundle rendering failed: {0}")]
    Bundle(#[from] batna_engine::EngineError),

    #[error("Session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
