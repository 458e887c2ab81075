use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::{Agent, Profile};

/// Terminal result of a negotiation. Exactly one per completed session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Deal,
    Walkaway,
    NoDeal,
    NoDealBatnaViolation,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Deal => "deal",
            Outcome::Walkaway => "walkaway",
            Outcome::NoDeal => "no_deal",
            Outcome::NoDealBatnaViolation => "no_deal_batna_violation",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session stopped. Every adverse condition is one of these, never an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    BuyerAccepted,
    SellerAccepted,
    BuyerAcceptedCrossedBid,
    SellerAcceptedCrossedBid,
    BuyerWalkawayBidDifference,
    SellerWalkawayBidDifference,
    BuyerBatnaViolation,
    SellerBatnaViolation,
    NoDeal,
    NoProgressStalemate,
    MaxRoundsExceeded,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::BuyerAccepted => "buyer_accepted",
            TerminationReason::SellerAccepted => "seller_accepted",
            TerminationReason::BuyerAcceptedCrossedBid => "buyer_accepted_crossed_bid",
            TerminationReason::SellerAcceptedCrossedBid => "seller_accepted_crossed_bid",
            TerminationReason::BuyerWalkawayBidDifference => "buyer_walkaway_bid_difference",
            TerminationReason::SellerWalkawayBidDifference => "seller_walkaway_bid_difference",
            TerminationReason::BuyerBatnaViolation => "buyer_batna_violation",
            TerminationReason::SellerBatnaViolation => "seller_batna_violation",
            TerminationReason::NoDeal => "no_deal",
            TerminationReason::NoProgressStalemate => "no_progress_stalemate",
            TerminationReason::MaxRoundsExceeded => "max_rounds_exceeded",
        }
    }

    /// The outcome this reason implies.
    pub fn outcome(&self) -> Outcome {
        match self {
            TerminationReason::BuyerAccepted
            | TerminationReason::SellerAccepted
            | TerminationReason::BuyerAcceptedCrossedBid
            | TerminationReason::SellerAcceptedCrossedBid => Outcome::Deal,
            TerminationReason::BuyerWalkawayBidDifference
            | TerminationReason::SellerWalkawayBidDifference => Outcome::Walkaway,
            TerminationReason::BuyerBatnaViolation | TerminationReason::SellerBatnaViolation => {
                Outcome::NoDealBatnaViolation
            }
            TerminationReason::NoDeal
            | TerminationReason::NoProgressStalemate
            | TerminationReason::MaxRoundsExceeded => Outcome::NoDeal,
        }
    }

    pub fn walkaway(agent: Agent) -> Self {
        match agent {
            Agent::Seller => TerminationReason::SellerWalkawayBidDifference,
            Agent::Buyer => TerminationReason::BuyerWalkawayBidDifference,
        }
    }

    pub fn accepted(agent: Agent) -> Self {
        match agent {
            Agent::Seller => TerminationReason::SellerAccepted,
            Agent::Buyer => TerminationReason::BuyerAccepted,
        }
    }

    pub fn accepted_crossed(agent: Agent) -> Self {
        match agent {
            Agent::Seller => TerminationReason::SellerAcceptedCrossedBid,
            Agent::Buyer => TerminationReason::BuyerAcceptedCrossedBid,
        }
    }

    pub fn batna_violation(agent: Agent) -> Self {
        match agent {
            Agent::Seller => TerminationReason::SellerBatnaViolation,
            Agent::Buyer => TerminationReason::BuyerBatnaViolation,
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Surplus figures computed once the session ends. All absent without a deal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SurplusAnalysis {
    pub seller_surplus: Option<f64>,
    pub buyer_surplus: Option<f64>,
    pub total_surplus: Option<f64>,
    /// `seller:buyer` percentage split, present only when total surplus is positive.
    pub surplus_split: Option<String>,
}

/// Final snapshot of a negotiation, created once at completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NegotiationMeta {
    pub negotiation_id: Uuid,
    pub random_seed: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub starting_price: f64,
    pub buyer_batna: f64,
    pub seller_batna: f64,
    /// Estimates as supplied by the estimation strategy.
    pub initial_estimated_buyer_batna: f64,
    pub initial_estimated_seller_batna: f64,
    /// Estimates as of session end, after learning from revealed bids.
    pub estimated_buyer_batna: f64,
    pub estimated_seller_batna: f64,
    pub buyer_profile: Profile,
    pub seller_profile: Profile,
    pub outcome: Outcome,
    pub final_price: Option<f64>,
    pub total_rounds: u32,
    pub initial_month_to_key: u32,
    pub month_to_key: u32,
    pub termination_reason: TerminationReason,
    pub post_negotiation_analysis: SurplusAnalysis,
}

impl NegotiationMeta {
    /// First 8 characters of the negotiation id, used in folder names.
    pub fn short_id(&self) -> String {
        self.negotiation_id.simple().to_string()[..8].to_string()
    }
}
