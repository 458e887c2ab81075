//! Pressure classification and sentence selection.
//!
//! Purely observational: the classification picks phrasing and is recorded
//! alongside each bid, but never feeds back into bid arithmetic.

use batna_models::{Agent, PressureLevel, PressureReading};

use crate::rng::RandomSource;

/// Which of the two pressure conditions a sentence pool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Is the counterparty's current bid already favorable?
    First,
    /// Is our own bid already close to our own BATNA?
    Second,
}

const SELLER_FIRST_SOFT: &[&str] = &[
    "I appreciate the offer, but we're still some distance apart.",
    "Thanks for moving; I think there's a better middle for both of us.",
    "I hear you, though that figure doesn't reflect what this is worth.",
    "That's a fair start, and I'd like to keep working on it.",
];

const SELLER_FIRST_HARSH: &[&str] = &[
    "Your own number says you see the value here, so let's not play games.",
    "You're already in the right neighbourhood; meet me properly.",
    "We both know that offer can move further.",
    "Frankly, you're close enough that holding back helps nobody.",
];

const SELLER_SECOND_SOFT: &[&str] = &[
    "I can come to {bid} for you.",
    "Let's say {bid} and keep this moving.",
    "My position is {bid}, and there's still room to talk.",
    "How about {bid}?",
];

const SELLER_SECOND_HARSH: &[&str] = &[
    "{bid} is as far as I go.",
    "At {bid} I'm at my limit. Take it or leave it.",
    "{bid}. I can't do better than that.",
    "This is final: {bid}.",
];

const BUYER_FIRST_SOFT: &[&str] = &[
    "That's more than we were hoping to spend.",
    "I understand where you're coming from, but the price is steep for us.",
    "We're interested, just not quite at that level.",
    "Thanks for the movement; we still need to close the gap.",
];

const BUYER_FIRST_HARSH: &[&str] = &[
    "You're close enough that dragging this out helps nobody.",
    "Your ask is nearly workable, so let's stop circling.",
    "We both know you can sharpen that number.",
    "We're practically there; don't lose this over a few dollars.",
];

const BUYER_SECOND_SOFT: &[&str] = &[
    "We could offer {bid}.",
    "How does {bid} sound?",
    "Let's work from {bid}.",
    "We can put {bid} on the table.",
];

const BUYER_SECOND_HARSH: &[&str] = &[
    "{bid} is our ceiling.",
    "We can't go past {bid}.",
    "{bid} is the final number from our side.",
    "It's {bid} or we look elsewhere.",
];

/// Sentence pool lookup keyed by (role, condition, pressure level).
pub fn sentence_pool(
    agent: Agent,
    condition: Condition,
    level: PressureLevel,
) -> &'static [&'static str] {
    match (agent, condition, level) {
        (Agent::Seller, Condition::First, PressureLevel::Soft) => SELLER_FIRST_SOFT,
        (Agent::Seller, Condition::First, PressureLevel::Harsh) => SELLER_FIRST_HARSH,
        (Agent::Seller, Condition::Second, PressureLevel::Soft) => SELLER_SECOND_SOFT,
        (Agent::Seller, Condition::Second, PressureLevel::Harsh) => SELLER_SECOND_HARSH,
        (Agent::Buyer, Condition::First, PressureLevel::Soft) => BUYER_FIRST_SOFT,
        (Agent::Buyer, Condition::First, PressureLevel::Harsh) => BUYER_FIRST_HARSH,
        (Agent::Buyer, Condition::Second, PressureLevel::Soft) => BUYER_SECOND_SOFT,
        (Agent::Buyer, Condition::Second, PressureLevel::Harsh) => BUYER_SECOND_HARSH,
    }
}

/// Format a $K price for display: `$512K`, `$512.5K`.
pub fn format_price(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("${value:.0}K")
    } else {
        format!("${value:.1}K")
    }
}

/// Both pressure signals for a bid. `counterparty_bid` is None for the opening ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressureSignals {
    pub first: Option<bool>,
    pub second: bool,
}

/// Guarded ratio: a zero or non-finite denominator means "no signal".
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return None;
    }
    Some(numerator / denominator)
}

fn usable(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite() && *v >= 0.0)
}

/// Classify the geometry of a bid from `agent`'s point of view.
///
/// Negative or non-finite inputs fall back to "no pressure" (soft).
pub fn classify(
    agent: Agent,
    own_bid: f64,
    own_batna: f64,
    counterparty_bid: Option<f64>,
) -> PressureSignals {
    let Some(counterparty) = counterparty_bid else {
        let second =
            usable(&[own_bid, own_batna]) && near_own_batna(agent, own_bid, own_batna, None);
        return PressureSignals {
            first: None,
            second,
        };
    };

    if !usable(&[own_bid, own_batna, counterparty]) {
        return PressureSignals {
            first: Some(false),
            second: false,
        };
    }

    PressureSignals {
        first: Some(counterparty_favorable(agent, own_bid, own_batna, counterparty)),
        second: near_own_batna(agent, own_bid, own_batna, Some(counterparty)),
    }
}

/// Pressure-1: the counterparty's bid already clears our BATNA comfortably.
fn counterparty_favorable(agent: Agent, own_bid: f64, own_batna: f64, counterparty: f64) -> bool {
    let (margin, gap) = match agent {
        Agent::Seller => (counterparty - own_batna, own_bid - counterparty),
        Agent::Buyer => (own_batna - counterparty, counterparty - own_bid),
    };
    margin >= 25.0 || ratio(margin, gap).is_some_and(|r| r >= 0.5)
}

/// Pressure-2: our own bid has little room left before our BATNA.
fn near_own_batna(agent: Agent, own_bid: f64, own_batna: f64, counterparty: Option<f64>) -> bool {
    let room = match agent {
        Agent::Seller => own_bid - own_batna,
        Agent::Buyer => own_batna - own_bid,
    };
    if room < 10.0 {
        return true;
    }
    let Some(counterparty) = counterparty else {
        return false;
    };
    let gap = match agent {
        Agent::Seller => own_bid - counterparty,
        Agent::Buyer => counterparty - own_bid,
    };
    ratio(room, gap).is_some_and(|r| r <= 0.1)
}

/// Pick the sentence(s) for a bid. Draws pressure-1 first (if present), then pressure-2.
pub fn compose(
    agent: Agent,
    signals: PressureSignals,
    bid: f64,
    rng: &mut RandomSource,
) -> (String, PressureReading) {
    let price = format_price(bid);
    let mut parts = Vec::with_capacity(2);

    let (first, first_sentence) = match signals.first {
        Some(signal) => {
            let level = PressureLevel::from_signal(signal);
            let pool = sentence_pool(agent, Condition::First, level);
            let index = rng.index(pool.len());
            parts.push(pool[index].replace("{bid}", &price));
            (Some(level), Some(index))
        }
        None => (None, None),
    };

    let second = PressureLevel::from_signal(signals.second);
    let pool = sentence_pool(agent, Condition::Second, second);
    let second_sentence = rng.index(pool.len());
    parts.push(pool[second_sentence].replace("{bid}", &price));

    (
        parts.join(" "),
        PressureReading {
            first,
            first_sentence,
            second,
            second_sentence,
        },
    )
}
