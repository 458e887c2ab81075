pub mod analysis;
pub mod bid_range;
pub mod bundle;
pub mod error;
pub mod personality;
pub mod rng;
pub mod session;
pub mod timeline;
pub mod verbiage;

pub mod test_support;

pub use analysis::{surplus_analysis, value_analysis};
pub use bundle::session_files;
pub use error::EngineError;
pub use personality::PersonalityPolicy;
pub use rng::RandomSource;
pub use session::{
    run_negotiation, CompletedNegotiation, NegotiationSession, SessionOptions, SessionState,
    MAX_ROUNDS, STALEMATE_LIMIT,
};
