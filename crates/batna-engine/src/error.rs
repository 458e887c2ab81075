use thiserror::Error;

/// Caller contract violations. Negotiation outcomes are never reported here.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid uniform range: lower {lower} exceeds upper {upper}")]
    InvalidRange { lower: f64, upper: f64 },

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Session has not finished")]
    SessionInProgress,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
