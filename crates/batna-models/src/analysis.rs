use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::meta::Outcome;

/// How well one side's BATNA was estimated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimationAccuracy {
    pub true_batna: f64,
    /// The value the estimation strategy supplied.
    pub supplied_estimate: f64,
    /// The working estimate at session end.
    pub final_estimate: f64,
    /// `supplied_estimate - true_batna`.
    pub signed_error: f64,
    pub absolute_error: f64,
    /// Absolute error as a percentage of the true BATNA. None when the BATNA is zero.
    pub percent_error: Option<f64>,
}

/// How the deal's surplus was split between the sides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SurplusBreakdown {
    pub seller_surplus: Option<f64>,
    pub buyer_surplus: Option<f64>,
    pub total_surplus: Option<f64>,
    pub seller_share_pct: Option<f64>,
    pub buyer_share_pct: Option<f64>,
    pub split_ratio: Option<String>,
    /// 0.0 = deal at the seller's BATNA, 1.0 = at the buyer's BATNA.
    pub deal_position_in_zopa: Option<f64>,
}

/// Read-only view over a finished negotiation combining estimation error
/// and surplus split. Always derived from a `NegotiationMeta`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueAnalysisReport {
    pub negotiation_id: Uuid,
    pub outcome: Outcome,
    pub final_price: Option<f64>,
    pub zopa_width: f64,
    pub buyer_estimation: EstimationAccuracy,
    pub seller_estimation: EstimationAccuracy,
    pub surplus: SurplusBreakdown,
}
