use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::Agent;

/// The interval a bid was drawn from. Always present, even when degenerate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CalculationRange {
    pub lower: f64,
    pub upper: f64,
}

impl CalculationRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// A single-point range (e.g. the opening ask).
    pub fn point(value: f64) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.upper <= self.lower
    }

    pub fn is_feasible(&self) -> bool {
        self.upper >= self.lower
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Sentence pool selected by a pressure condition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PressureLevel {
    Soft,
    Harsh,
}

impl PressureLevel {
    pub fn from_signal(signal: bool) -> Self {
        if signal {
            PressureLevel::Harsh
        } else {
            PressureLevel::Soft
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PressureLevel::Soft => "soft",
            PressureLevel::Harsh => "harsh",
        }
    }
}

impl fmt::Display for PressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pressure classification behind a bid's verbiage.
///
/// `first` is absent for the opening ask, which has no counterparty bid.
/// The indices point into the sentence pool the level selected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PressureReading {
    pub first: Option<PressureLevel>,
    pub first_sentence: Option<usize>,
    pub second: PressureLevel,
    pub second_sentence: usize,
}

impl PressureReading {
    /// Category id for the pressure-1 condition, e.g. `harsh_2`.
    pub fn first_id(&self) -> Option<String> {
        match (self.first, self.first_sentence) {
            (Some(level), Some(index)) => Some(format!("{level}_{index}")),
            _ => None,
        }
    }

    /// Category id for the pressure-2 condition, e.g. `soft_0`.
    pub fn second_id(&self) -> String {
        format!("{}_{}", self.second, self.second_sentence)
    }
}

/// One turn of the transcript. Created once by the session, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BidRecord {
    /// Starts at 1 and increases by one per emitted bid.
    pub round: u32,
    pub agent: Agent,
    /// $K, on the 0.5 grid (except an opening ask taken verbatim).
    pub bid: f64,
    /// Timeline coordinate at the time of the bid.
    pub month: u32,
    pub calculation_range: CalculationRange,
    pub verbiage: String,
    pub pressure: PressureReading,
    pub timestamp: DateTime<Utc>,
}
