use batna_models::params::MAX_MONTH_TO_KEY;

use crate::rng::RandomSource;

const FIRST_COUNTER_THRESHOLD: f64 = 20.0;
const SELLER_THRESHOLD: f64 = 25.0;
const BUYER_THRESHOLD: f64 = 20.0;

/// The month-to-key coordinate, nudged by a coin flip after every counter bid.
///
/// Descriptive only; nothing in the negotiation reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthToKey {
    month: u32,
}

impl MonthToKey {
    /// Out-of-range starting values are clamped to 12.
    pub fn new(initial: u32) -> Self {
        Self {
            month: initial.min(MAX_MONTH_TO_KEY),
        }
    }

    pub fn current(&self) -> u32 {
        self.month
    }

    /// After a seller counter. `reference_bid` is the starting price for the
    /// seller's first counter and the buyer's current bid afterwards.
    pub fn after_seller_bid(
        &mut self,
        new_seller_bid: f64,
        reference_bid: f64,
        first_counter: bool,
        rng: &mut RandomSource,
    ) {
        let threshold = if first_counter {
            FIRST_COUNTER_THRESHOLD
        } else {
            SELLER_THRESHOLD
        };
        self.perturb(new_seller_bid - reference_bid, threshold, rng);
    }

    pub fn after_buyer_bid(
        &mut self,
        current_seller_bid: f64,
        new_buyer_bid: f64,
        rng: &mut RandomSource,
    ) {
        self.perturb(current_seller_bid - new_buyer_bid, BUYER_THRESHOLD, rng);
    }

    /// One coin per bid: a narrow gap pulls the key closer, a wide one pushes it out.
    fn perturb(&mut self, gap: f64, threshold: f64, rng: &mut RandomSource) {
        if !rng.coin() {
            return;
        }
        if gap < threshold {
            self.month = self.month.saturating_sub(1);
        } else {
            self.month = (self.month + 1).min(MAX_MONTH_TO_KEY);
        }
    }
}
