//! Legal bid intervals derived from the current ZOPA estimate.

use batna_models::{CalculationRange, NegotiationParameters};

use crate::error::EngineError;
use crate::personality::SelectionRange;
use crate::rng::RandomSource;

/// Bids are quoted on a 0.5 ($K) grid.
pub const BID_INCREMENT: f64 = 0.5;

/// Round to the nearest multiple of `BID_INCREMENT`.
pub fn round_to_increment(value: f64) -> f64 {
    (value / BID_INCREMENT).round() * BID_INCREMENT
}

/// Largest grid price strictly below `ask`.
pub fn grid_price_below(ask: f64) -> f64 {
    ((ask / BID_INCREMENT).ceil() - 1.0) * BID_INCREMENT
}

/// Each side's working estimate of the other's reservation value.
///
/// Copied from the parameters when a session starts; tightened as bids are revealed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beliefs {
    pub estimated_seller_batna: f64,
    pub estimated_buyer_batna: f64,
}

impl Beliefs {
    pub fn from_parameters(params: &NegotiationParameters) -> Self {
        Self {
            estimated_seller_batna: params.estimated_seller_batna,
            estimated_buyer_batna: params.estimated_buyer_batna,
        }
    }

    /// A seller never takes less than it asks for; a buyer pays at least what it offers.
    pub fn observe(&mut self, seller_bid: f64, buyer_bid: f64) {
        self.estimated_seller_batna = self.estimated_seller_batna.min(seller_bid);
        self.estimated_buyer_batna = self.estimated_buyer_batna.max(buyer_bid);
    }
}

/// Seller's next counter-offer interval.
///
/// `y` is the seller profile's headroom above the estimated buyer BATNA.
pub fn seller_range(
    params: &NegotiationParameters,
    beliefs: &Beliefs,
    y: f64,
    current_seller_bid: f64,
    current_buyer_bid: f64,
) -> CalculationRange {
    let lower = current_buyer_bid.max(params.seller_batna);
    let upper = (beliefs.estimated_buyer_batna * (1.0 + y))
        .min(current_seller_bid)
        .min(params.starting_price);
    CalculationRange::new(lower, upper)
}

/// Buyer's next counter-offer interval.
///
/// `x` is the buyer profile's drift below the estimated seller BATNA.
pub fn buyer_range(
    params: &NegotiationParameters,
    beliefs: &Beliefs,
    x: f64,
    current_seller_bid: f64,
    current_buyer_bid: Option<f64>,
) -> CalculationRange {
    let lower = current_buyer_bid
        .unwrap_or(0.0)
        .max(beliefs.estimated_seller_batna * (1.0 - x));
    let upper = params
        .buyer_batna
        .min(current_seller_bid)
        .min(params.starting_price);
    CalculationRange::new(lower, upper)
}

/// The buyer's first offer: inside the ZOPA estimate, strictly below the ask.
///
/// When the estimate sits entirely above the ask the lower bound collapses
/// onto the upper bound, so the range is never inverted.
pub fn buyer_opening_range(
    estimated_seller_batna: f64,
    buyer_batna: f64,
    seller_ask: f64,
) -> CalculationRange {
    let upper = estimated_seller_batna
        .max(buyer_batna)
        .min(seller_ask - BID_INCREMENT);
    let lower = estimated_seller_batna.min(buyer_batna).min(upper);
    CalculationRange::new(lower, upper)
}

/// Pick a point in `range` using the profile's selection fraction, rounded to the grid.
///
/// A degenerate range yields its bound without consuming a draw.
pub fn draw_bid(
    range: CalculationRange,
    selection: SelectionRange,
    rng: &mut RandomSource,
) -> Result<f64, EngineError> {
    if !range.is_feasible() {
        return Err(EngineError::InvalidRange {
            lower: range.lower,
            upper: range.upper,
        });
    }
    if range.is_degenerate() {
        return Ok(round_to_increment(range.lower));
    }
    let u = rng.uniform(selection.low, selection.high)?;
    Ok(round_to_increment(range.lower + range.width() * u))
}

/// Buyer's opening draw: plain uniform over the range, then pushed below the ask.
pub fn draw_opening_bid(
    range: CalculationRange,
    seller_ask: f64,
    rng: &mut RandomSource,
) -> Result<f64, EngineError> {
    let bid = draw_bid(range, SelectionRange::new(0.0, 1.0), rng)?;
    if bid >= seller_ask {
        return Ok(grid_price_below(seller_ask));
    }
    Ok(bid)
}
