use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// Upper bound of the month-to-key timeline coordinate.
pub const MAX_MONTH_TO_KEY: u32 = 12;

/// Inputs for a single negotiation. All prices are in $K.
///
/// The `estimated_*` fields are the values supplied by a BATNA-estimation
/// strategy. A session copies them into its own belief state and never
/// writes back to this struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NegotiationParameters {
    pub starting_price: f64,
    /// Buyer's true reservation value (the most it will pay).
    pub buyer_batna: f64,
    /// Seller's true reservation value (the least it will take).
    pub seller_batna: f64,
    pub estimated_buyer_batna: f64,
    pub estimated_seller_batna: f64,
    #[serde(default)]
    pub buyer_profile: Profile,
    #[serde(default)]
    pub seller_profile: Profile,
    /// None = draw one seed from entropy when the session is built.
    #[serde(default)]
    pub random_seed: Option<u32>,
    /// Initial timeline position. Values above 12 are clamped by the session.
    #[serde(default)]
    pub month_to_key: u32,
}

impl NegotiationParameters {
    /// Whether the true reservation values leave room for a deal.
    pub fn has_zopa(&self) -> bool {
        self.seller_batna <= self.buyer_batna
    }

    /// Width of the true ZOPA; negative when the sides cannot overlap.
    pub fn zopa_width(&self) -> f64 {
        self.buyer_batna - self.seller_batna
    }
}
