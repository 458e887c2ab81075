use batna_models::{Agent, Profile};

use crate::rng::RandomSource;

/// Fractional sub-interval of a bid range that a profile draws from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRange {
    pub low: f64,
    pub high: f64,
}

impl SelectionRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Decision thresholds and bid-selection behavior for one profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityPolicy {
    pub profile: Profile,
    /// Accept when the gap between bids is at most this many $K.
    pub accept_threshold: f64,
    /// Walk away when the gap is at least this many $K.
    pub walk_threshold: f64,
    pub buyer_selection: SelectionRange,
    pub seller_selection: SelectionRange,
    /// x: how far below the estimated seller BATNA a buyer is willing to bid.
    pub buyer_drift: f64,
    /// y: how far above the estimated buyer BATNA a seller is willing to ask.
    pub seller_headroom: f64,
    /// Thresholds fire on a coin flip instead of deterministically.
    pub probabilistic: bool,
}

impl PersonalityPolicy {
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Bulldozer => Self {
                profile,
                accept_threshold: 5.0,
                walk_threshold: 75.0,
                buyer_selection: SelectionRange::new(0.0, 0.2),
                seller_selection: SelectionRange::new(0.8, 1.0),
                buyer_drift: 0.10,
                seller_headroom: 0.10,
                probabilistic: false,
            },
            Profile::Diplomat => Self {
                profile,
                accept_threshold: 10.0,
                walk_threshold: 100.0,
                buyer_selection: SelectionRange::new(0.4, 0.6),
                seller_selection: SelectionRange::new(0.4, 0.6),
                buyer_drift: 0.02,
                seller_headroom: 0.02,
                probabilistic: false,
            },
            Profile::Chameleon => Self {
                profile,
                accept_threshold: 10.0,
                walk_threshold: 100.0,
                buyer_selection: SelectionRange::new(0.0, 1.0),
                seller_selection: SelectionRange::new(0.0, 1.0),
                buyer_drift: 0.05,
                seller_headroom: 0.05,
                probabilistic: true,
            },
        }
    }

    pub fn selection_range(&self, agent: Agent) -> SelectionRange {
        match agent {
            Agent::Buyer => self.buyer_selection,
            Agent::Seller => self.seller_selection,
        }
    }

    /// x for a buyer, y for a seller.
    pub fn batna_adjustment(&self, agent: Agent) -> f64 {
        match agent {
            Agent::Buyer => self.buyer_drift,
            Agent::Seller => self.seller_headroom,
        }
    }

    /// Walk-away check. Chameleons consume a coin flip only once the gap
    /// actually reaches the threshold.
    pub fn should_walk(&self, gap: f64, rng: &mut RandomSource) -> bool {
        gap >= self.walk_threshold && self.fires(rng)
    }

    /// Acceptance check on the gap alone; BATNA constraints are the caller's job.
    pub fn should_accept(&self, gap: f64, rng: &mut RandomSource) -> bool {
        gap <= self.accept_threshold && self.fires(rng)
    }

    fn fires(&self, rng: &mut RandomSource) -> bool {
        !self.probabilistic || rng.coin()
    }
}
