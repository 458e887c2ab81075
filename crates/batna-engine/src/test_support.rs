//! Fixtures and transcript checks shared by unit tests, integration tests
//! and downstream crates.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use batna_models::{Agent, NegotiationParameters, Outcome, Profile};

use crate::session::{CompletedNegotiation, SessionOptions};

/// The textbook case: ask 500, seller floor 450, buyer ceiling 550.
pub fn reference_parameters() -> NegotiationParameters {
    NegotiationParameters {
        starting_price: 500.0,
        buyer_batna: 550.0,
        seller_batna: 450.0,
        estimated_buyer_batna: 520.0,
        estimated_seller_batna: 480.0,
        buyer_profile: Profile::Diplomat,
        seller_profile: Profile::Diplomat,
        random_seed: Some(42),
        month_to_key: 6,
    }
}

/// Seller floor above buyer ceiling: no price can satisfy both.
pub fn no_zopa_parameters() -> NegotiationParameters {
    NegotiationParameters {
        starting_price: 600.0,
        buyer_batna: 480.0,
        seller_batna: 520.0,
        estimated_buyer_batna: 500.0,
        estimated_seller_batna: 500.0,
        buyer_profile: Profile::Diplomat,
        seller_profile: Profile::Diplomat,
        random_seed: Some(7),
        month_to_key: 6,
    }
}

pub fn fixed_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
        .single()
        .unwrap_or_default()
}

/// Options with a constant id and clock so repeated runs compare equal.
pub fn fixed_options() -> SessionOptions {
    SessionOptions::fixed(
        Uuid::from_u128(0x6ba7_b810_9dad_11d1_80b4_00c0_4fd4_30c8),
        fixed_start(),
    )
}

/// Check the structural invariants every completed transcript must satisfy.
/// Returns a description of the first violation.
pub fn check_transcript(completed: &CompletedNegotiation) -> Result<(), String> {
    let meta = &completed.meta;
    let rounds = &completed.rounds;

    if meta.total_rounds as usize != rounds.len() {
        return Err(format!(
            "total_rounds {} != transcript length {}",
            meta.total_rounds,
            rounds.len()
        ));
    }
    if meta.termination_reason.outcome() != meta.outcome {
        return Err(format!(
            "reason {} does not imply outcome {}",
            meta.termination_reason, meta.outcome
        ));
    }

    for (i, record) in rounds.iter().enumerate() {
        if record.round as usize != i + 1 {
            return Err(format!("round {} at position {i}", record.round));
        }
        let expected = if i % 2 == 0 { Agent::Seller } else { Agent::Buyer };
        if record.agent != expected {
            return Err(format!("round {} bid by {}", record.round, record.agent));
        }
        if record.month > 12 {
            return Err(format!("round {} month {}", record.round, record.month));
        }
        if record.bid < 0.0 {
            return Err(format!("round {} negative bid {}", record.round, record.bid));
        }
    }
    if meta.month_to_key > 12 {
        return Err(format!("final month {}", meta.month_to_key));
    }

    match (meta.outcome, meta.final_price) {
        (Outcome::Deal, Some(price)) => {
            if price < meta.seller_batna || price > meta.buyer_batna {
                return Err(format!(
                    "deal at {price} outside [{}, {}]",
                    meta.seller_batna, meta.buyer_batna
                ));
            }
        }
        (Outcome::Deal, None) => return Err("deal without a final price".into()),
        (_, Some(price)) => return Err(format!("{} with final price {price}", meta.outcome)),
        (_, None) => {}
    }

    if meta.buyer_batna < meta.seller_batna && meta.outcome == Outcome::Deal {
        return Err("deal reached without a ZOPA".into());
    }

    Ok(())
}
