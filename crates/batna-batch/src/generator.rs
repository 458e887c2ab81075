//! Seeded scenario generation.
//!
//! A scenario holds everything about a negotiation except the BATNA
//! estimates, which are left to whichever estimator a run is using. Two
//! generators built with the same seed and config yield the same scenarios,
//! so competing strategies can be compared on identical inputs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use batna_engine::bid_range::round_to_increment;
use batna_models::{GeneratorConfig, NegotiationParameters, Profile};

use crate::error::BatchError;
use crate::estimator::BatnaEstimate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Position in the batch; also the key precomputed estimates are matched on.
    pub index: usize,
    pub starting_price: f64,
    pub buyer_batna: f64,
    pub seller_batna: f64,
    pub buyer_profile: Profile,
    pub seller_profile: Profile,
    pub month_to_key: u32,
    pub random_seed: u32,
}

impl Scenario {
    /// Combine with a strategy's estimates into session inputs.
    pub fn parameters(&self, estimate: BatnaEstimate) -> NegotiationParameters {
        NegotiationParameters {
            starting_price: self.starting_price,
            buyer_batna: self.buyer_batna,
            seller_batna: self.seller_batna,
            estimated_buyer_batna: estimate.estimated_buyer_batna,
            estimated_seller_batna: estimate.estimated_seller_batna,
            buyer_profile: self.buyer_profile,
            seller_profile: self.seller_profile,
            random_seed: Some(self.random_seed),
            month_to_key: self.month_to_key,
        }
    }
}

pub struct ScenarioGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    next_index: usize,
}

impl ScenarioGenerator {
    /// `seed = None` draws from entropy; the resulting scenarios are then
    /// not reproducible across runs.
    pub fn new(config: GeneratorConfig, seed: Option<u64>) -> Result<Self, BatchError> {
        validate(&config)?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            next_index: 0,
        })
    }

    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn profile(&mut self) -> Profile {
        Profile::ALL[self.rng.gen_range(0..Profile::ALL.len())]
    }

    pub fn next_scenario(&mut self) -> Scenario {
        let cfg = &self.config;
        let (min_price, max_price) = (cfg.min_starting_price, cfg.max_starting_price);
        let (max_discount, max_premium) = (cfg.max_seller_discount, cfg.max_buyer_premium);
        let max_month = cfg.max_initial_month;

        let starting_price = round_to_increment(min_price + (max_price - min_price) * self.unit());
        let p = max_discount * self.unit();
        let q = max_premium * self.unit();
        let buyer_profile = self.profile();
        let seller_profile = self.profile();
        let month_to_key = self.rng.gen_range(0..=max_month);
        let random_seed = self.rng.gen::<u32>();

        let index = self.next_index;
        self.next_index += 1;

        Scenario {
            index,
            starting_price,
            buyer_batna: starting_price * (1.0 + q),
            seller_batna: starting_price * (1.0 - p),
            buyer_profile,
            seller_profile,
            month_to_key,
            random_seed,
        }
    }

    pub fn generate(&mut self, count: usize) -> Vec<Scenario> {
        (0..count).map(|_| self.next_scenario()).collect()
    }
}

fn validate(config: &GeneratorConfig) -> Result<(), BatchError> {
    let prices_ok = config.min_starting_price.is_finite()
        && config.max_starting_price.is_finite()
        && config.min_starting_price >= 0.0
        && config.min_starting_price <= config.max_starting_price;
    if !prices_ok {
        return Err(BatchError::InvalidConfig(format!(
            "starting price range [{}, {}]",
            config.min_starting_price, config.max_starting_price
        )));
    }
    if !(0.0..=1.0).contains(&config.max_seller_discount) {
        return Err(BatchError::InvalidConfig(format!(
            "max_seller_discount {} outside [0, 1]",
            config.max_seller_discount
        )));
    }
    if !(config.max_buyer_premium >= 0.0 && config.max_buyer_premium.is_finite()) {
        return Err(BatchError::InvalidConfig(format!(
            "max_buyer_premium {}",
            config.max_buyer_premium
        )));
    }
    Ok(())
}
