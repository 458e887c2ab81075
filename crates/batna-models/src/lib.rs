pub mod analysis;
pub mod bid;
pub mod config;
pub mod meta;
pub mod params;
pub mod profile;
pub mod session_files;

pub use analysis::{EstimationAccuracy, SurplusBreakdown, ValueAnalysisReport};
pub use bid::{BidRecord, CalculationRange, PressureLevel, PressureReading};
pub use config::{BaselineConfig, BatchConfig, GeneratorConfig, OutputConfig, SimConfig};
pub use meta::{NegotiationMeta, Outcome, SurplusAnalysis, TerminationReason};
pub use params::NegotiationParameters;
pub use profile::{Agent, Profile};
pub use session_files::SessionFiles;
