use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Negotiating personality assigned to one side of a negotiation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Anchors hard and walks away early.
    Bulldozer,
    /// Concedes in measured steps toward the middle of the range.
    #[default]
    Diplomat,
    /// Draws from the full range and fires thresholds on a coin flip.
    Chameleon,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Bulldozer, Profile::Diplomat, Profile::Chameleon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Bulldozer => "bulldozer",
            Profile::Diplomat => "diplomat",
            Profile::Chameleon => "chameleon",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulldozer" => Ok(Profile::Bulldozer),
            "diplomat" => Ok(Profile::Diplomat),
            "chameleon" => Ok(Profile::Chameleon),
            other => Err(format!("unknown profile: {other}")),
        }
    }
}

/// The two parties at the table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    Seller,
    Buyer,
}

impl Agent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Agent::Seller => "seller",
            Agent::Buyer => "buyer",
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
