//! The negotiation state machine.
//!
//! One set of transition rules, two drivers: `next_step` advances a single
//! turn for interactive front ends, `run` drives the same steps to completion.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use batna_models::{
    Agent, BidRecord, CalculationRange, NegotiationMeta, NegotiationParameters, PressureReading,
    TerminationReason,
};

use crate::analysis::surplus_analysis;
use crate::bid_range::{self, Beliefs};
use crate::error::EngineError;
use crate::personality::PersonalityPolicy;
use crate::rng::RandomSource;
use crate::timeline::MonthToKey;
use crate::verbiage;

/// Hard ceiling on emitted bids per session.
pub const MAX_ROUNDS: u32 = 100;

/// Consecutive unchanged buyer/seller round pairs before giving up.
pub const STALEMATE_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initialized,
    /// The opening ask is on the table; the buyer has not bid yet.
    SellerOpened,
    BuyerTurn,
    SellerTurn,
    Finished(TerminationReason),
}

/// Identity and clock for a session. Fixing both makes output byte-identical.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub negotiation_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Simulated time between consecutive bids, used for record timestamps.
    pub turn_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            negotiation_id: Uuid::new_v4(),
            started_at: Utc::now(),
            turn_interval: Duration::seconds(1),
        }
    }
}

impl SessionOptions {
    pub fn fixed(negotiation_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            negotiation_id,
            started_at,
            ..Self::default()
        }
    }
}

/// A finished negotiation: its meta snapshot plus the full transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedNegotiation {
    pub meta: NegotiationMeta,
    pub rounds: Vec<BidRecord>,
}

pub struct NegotiationSession {
    options: SessionOptions,
    params: NegotiationParameters,
    rng: RandomSource,
    buyer_policy: PersonalityPolicy,
    seller_policy: PersonalityPolicy,
    beliefs: Beliefs,
    timeline: MonthToKey,
    initial_month: u32,
    rounds: Vec<BidRecord>,
    seller_bid: Option<f64>,
    buyer_bid: Option<f64>,
    seller_counters: u32,
    last_pair: Option<(f64, f64)>,
    unchanged_pairs: u32,
    final_price: Option<f64>,
    state: SessionState,
}

fn check_price(name: &'static str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidParameter { name, value });
    }
    Ok(())
}

impl NegotiationSession {
    pub fn new(
        params: &NegotiationParameters,
        options: SessionOptions,
    ) -> Result<Self, EngineError> {
        check_price("starting_price", params.starting_price)?;
        check_price("buyer_batna", params.buyer_batna)?;
        check_price("seller_batna", params.seller_batna)?;
        check_price("estimated_buyer_batna", params.estimated_buyer_batna)?;
        check_price("estimated_seller_batna", params.estimated_seller_batna)?;

        let rng = RandomSource::from_optional(params.random_seed);
        let timeline = MonthToKey::new(params.month_to_key);
        debug!(
            seed = rng.seed(),
            has_zopa = params.has_zopa(),
            zopa_width = params.zopa_width(),
            "Session created"
        );

        Ok(Self {
            options,
            params: params.clone(),
            rng,
            buyer_policy: PersonalityPolicy::for_profile(params.buyer_profile),
            seller_policy: PersonalityPolicy::for_profile(params.seller_profile),
            beliefs: Beliefs::from_parameters(params),
            initial_month: timeline.current(),
            timeline,
            rounds: Vec::new(),
            seller_bid: None,
            buyer_bid: None,
            seller_counters: 0,
            last_pair: None,
            unchanged_pairs: 0,
            final_price: None,
            state: SessionState::Initialized,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished(_))
    }

    pub fn rounds(&self) -> &[BidRecord] {
        &self.rounds
    }

    pub fn seed(&self) -> u32 {
        self.rng.seed()
    }

    pub fn beliefs(&self) -> Beliefs {
        self.beliefs
    }

    pub fn month(&self) -> u32 {
        self.timeline.current()
    }

    /// Advance one turn. Returns the bid emitted by this turn, or None once
    /// the session has finished (including the turn that finished it).
    pub fn next_step(&mut self) -> Result<Option<BidRecord>, EngineError> {
        match self.state {
            SessionState::Finished(_) => Ok(None),
            SessionState::Initialized => self.open(),
            SessionState::SellerOpened => self.buyer_opening(),
            SessionState::BuyerTurn => self.buyer_turn(),
            SessionState::SellerTurn => self.seller_turn(),
        }
    }

    /// Drive the session to a terminal state.
    pub fn run(mut self) -> Result<CompletedNegotiation, EngineError> {
        while !self.is_finished() {
            self.next_step()?;
        }
        self.into_completed()
    }

    /// Snapshot of a finished session.
    pub fn into_completed(self) -> Result<CompletedNegotiation, EngineError> {
        let SessionState::Finished(reason) = self.state else {
            return Err(EngineError::SessionInProgress);
        };

        let total_rounds = self.rounds.len() as u32;
        let completed_at = self
            .rounds
            .last()
            .map(|r| r.timestamp)
            .unwrap_or(self.options.started_at);

        let meta = NegotiationMeta {
            negotiation_id: self.options.negotiation_id,
            random_seed: self.rng.seed(),
            started_at: self.options.started_at,
            completed_at,
            starting_price: self.params.starting_price,
            buyer_batna: self.params.buyer_batna,
            seller_batna: self.params.seller_batna,
            initial_estimated_buyer_batna: self.params.estimated_buyer_batna,
            initial_estimated_seller_batna: self.params.estimated_seller_batna,
            estimated_buyer_batna: self.beliefs.estimated_buyer_batna,
            estimated_seller_batna: self.beliefs.estimated_seller_batna,
            buyer_profile: self.params.buyer_profile,
            seller_profile: self.params.seller_profile,
            outcome: reason.outcome(),
            final_price: self.final_price,
            total_rounds,
            initial_month_to_key: self.initial_month,
            month_to_key: self.timeline.current(),
            termination_reason: reason,
            post_negotiation_analysis: surplus_analysis(
                self.final_price,
                self.params.seller_batna,
                self.params.buyer_batna,
            ),
        };

        Ok(CompletedNegotiation {
            meta,
            rounds: self.rounds,
        })
    }

    // --- turns -------------------------------------------------------------

    /// Round 1: the seller asks the starting price.
    fn open(&mut self) -> Result<Option<BidRecord>, EngineError> {
        let ask = self.params.starting_price;
        let signals = verbiage::classify(Agent::Seller, ask, self.params.seller_batna, None);
        let record = self.emit(Agent::Seller, ask, CalculationRange::point(ask), signals);
        self.seller_bid = Some(ask);
        self.state = SessionState::SellerOpened;
        Ok(Some(record))
    }

    /// The buyer's first offer never accepts: it always lands below the ask.
    fn buyer_opening(&mut self) -> Result<Option<BidRecord>, EngineError> {
        let ask = self
            .seller_bid
            .ok_or(EngineError::MissingParameter("seller_bid"))?;

        let range = bid_range::buyer_opening_range(
            self.beliefs.estimated_seller_batna,
            self.params.buyer_batna,
            ask,
        );
        if range.upper <= 0.0 {
            return Ok(self.finish(TerminationReason::NoDeal, None));
        }

        let bid = bid_range::draw_opening_bid(range, ask, &mut self.rng)?;

        let signals = verbiage::classify(Agent::Buyer, bid, self.params.buyer_batna, Some(ask));
        let record = self.emit(Agent::Buyer, bid, range, signals);
        self.timeline.after_buyer_bid(ask, bid, &mut self.rng);
        self.buyer_bid = Some(bid);
        self.state = SessionState::SellerTurn;
        Ok(Some(record))
    }

    fn buyer_turn(&mut self) -> Result<Option<BidRecord>, EngineError> {
        let (seller_bid, buyer_bid) = self.current_bids()?;
        let gap = (seller_bid - buyer_bid).abs();

        if self.buyer_policy.should_walk(gap, &mut self.rng) {
            return Ok(self.finish(TerminationReason::walkaway(Agent::Buyer), None));
        }
        if self.buyer_policy.should_accept(gap, &mut self.rng) && self.honors(seller_bid) {
            return Ok(self.finish(TerminationReason::accepted(Agent::Buyer), Some(seller_bid)));
        }
        if self.rounds.len() as u32 >= MAX_ROUNDS {
            return Ok(self.finish(TerminationReason::MaxRoundsExceeded, None));
        }

        self.beliefs.observe(seller_bid, buyer_bid);
        let range = bid_range::buyer_range(
            &self.params,
            &self.beliefs,
            self.buyer_policy.batna_adjustment(Agent::Buyer),
            seller_bid,
            Some(buyer_bid),
        );
        if !range.is_feasible() {
            return Ok(self.finish(TerminationReason::NoDeal, None));
        }

        let selection = self.buyer_policy.selection_range(Agent::Buyer);
        let bid = bid_range::draw_bid(range, selection, &mut self.rng)?;
        if bid >= seller_bid {
            return Ok(self.settle_crossed(Agent::Buyer, seller_bid));
        }

        let signals =
            verbiage::classify(Agent::Buyer, bid, self.params.buyer_batna, Some(seller_bid));
        let record = self.emit(Agent::Buyer, bid, range, signals);
        self.timeline.after_buyer_bid(seller_bid, bid, &mut self.rng);
        self.buyer_bid = Some(bid);
        self.state = SessionState::SellerTurn;
        Ok(Some(record))
    }

    fn seller_turn(&mut self) -> Result<Option<BidRecord>, EngineError> {
        let (seller_bid, buyer_bid) = self.current_bids()?;
        let gap = (seller_bid - buyer_bid).abs();

        if self.seller_policy.should_walk(gap, &mut self.rng) {
            return Ok(self.finish(TerminationReason::walkaway(Agent::Seller), None));
        }
        if self.seller_policy.should_accept(gap, &mut self.rng) && self.honors(buyer_bid) {
            return Ok(self.finish(TerminationReason::accepted(Agent::Seller), Some(buyer_bid)));
        }
        if self.rounds.len() as u32 >= MAX_ROUNDS {
            return Ok(self.finish(TerminationReason::MaxRoundsExceeded, None));
        }

        self.beliefs.observe(seller_bid, buyer_bid);
        let range = bid_range::seller_range(
            &self.params,
            &self.beliefs,
            self.seller_policy.batna_adjustment(Agent::Seller),
            seller_bid,
            buyer_bid,
        );
        if !range.is_feasible() {
            return Ok(self.finish(TerminationReason::NoDeal, None));
        }

        let selection = self.seller_policy.selection_range(Agent::Seller);
        let bid = bid_range::draw_bid(range, selection, &mut self.rng)?;
        if bid <= buyer_bid {
            return Ok(self.settle_crossed(Agent::Seller, buyer_bid));
        }

        let signals =
            verbiage::classify(Agent::Seller, bid, self.params.seller_batna, Some(buyer_bid));
        let record = self.emit(Agent::Seller, bid, range, signals);

        let first_counter = self.seller_counters == 0;
        let reference = if first_counter {
            self.params.starting_price
        } else {
            buyer_bid
        };
        self.timeline
            .after_seller_bid(bid, reference, first_counter, &mut self.rng);
        self.seller_counters += 1;
        self.seller_bid = Some(bid);

        // A buyer turn followed by this seller turn closes one round pair.
        let pair = (bid, buyer_bid);
        if self.last_pair == Some(pair) {
            self.unchanged_pairs += 1;
        } else {
            self.unchanged_pairs = 0;
        }
        self.last_pair = Some(pair);

        if self.unchanged_pairs >= STALEMATE_LIMIT {
            self.finish(TerminationReason::NoProgressStalemate, None);
        } else {
            self.state = SessionState::BuyerTurn;
        }
        Ok(Some(record))
    }

    // --- helpers -----------------------------------------------------------

    fn current_bids(&self) -> Result<(f64, f64), EngineError> {
        let seller = self
            .seller_bid
            .ok_or(EngineError::MissingParameter("seller_bid"))?;
        let buyer = self
            .buyer_bid
            .ok_or(EngineError::MissingParameter("buyer_bid"))?;
        Ok((seller, buyer))
    }

    /// A price both sides can actually honor: at or above the seller's BATNA
    /// and at or below the buyer's, whichever side accepts. Without a ZOPA no
    /// price passes, so such sessions can never close.
    fn honors(&self, price: f64) -> bool {
        self.params.seller_batna <= price && price <= self.params.buyer_batna
    }

    /// A computed bid crossed the counterpart's: accept at their price if allowed.
    fn settle_crossed(&mut self, agent: Agent, counterpart_bid: f64) -> Option<BidRecord> {
        if self.honors(counterpart_bid) {
            self.finish(
                TerminationReason::accepted_crossed(agent),
                Some(counterpart_bid),
            )
        } else {
            self.finish(TerminationReason::batna_violation(agent), None)
        }
    }

    fn finish(&mut self, reason: TerminationReason, final_price: Option<f64>) -> Option<BidRecord> {
        debug!(
            id = %self.options.negotiation_id,
            reason = %reason,
            final_price = ?final_price,
            rounds = self.rounds.len(),
            "Negotiation finished"
        );
        self.final_price = final_price;
        self.state = SessionState::Finished(reason);
        None
    }

    /// Pick verbiage, stamp and append a record. Month is read before the
    /// caller applies this bid's perturbation.
    fn emit(
        &mut self,
        agent: Agent,
        bid: f64,
        range: CalculationRange,
        signals: verbiage::PressureSignals,
    ) -> BidRecord {
        let (text, pressure): (String, PressureReading) =
            verbiage::compose(agent, signals, bid, &mut self.rng);
        let round = self.rounds.len() as u32 + 1;
        let record = BidRecord {
            round,
            agent,
            bid,
            month: self.timeline.current(),
            calculation_range: range,
            verbiage: text,
            pressure,
            timestamp: self.options.started_at + self.options.turn_interval * round as i32,
        };
        debug!(
            id = %self.options.negotiation_id,
            round,
            agent = %agent,
            bid,
            lower = range.lower,
            upper = range.upper,
            "Bid emitted"
        );
        self.rounds.push(record.clone());
        record
    }
}

/// Run one negotiation to completion.
pub fn run_negotiation(
    params: &NegotiationParameters,
    options: SessionOptions,
) -> Result<CompletedNegotiation, EngineError> {
    NegotiationSession::new(params, options)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixed_options, reference_parameters};
    use batna_models::{Outcome, Profile};

    #[test]
    fn opening_ask_is_starting_price() {
        let params = reference_parameters();
        let mut session = NegotiationSession::new(&params, fixed_options()).unwrap();
        assert_eq!(session.state(), SessionState::Initialized);

        let first = session.next_step().unwrap().unwrap();
        assert_eq!(first.round, 1);
        assert_eq!(first.agent, Agent::Seller);
        assert_eq!(first.bid, 500.0);
        assert_eq!(first.calculation_range, CalculationRange::point(500.0));
        assert!(first.pressure.first.is_none());
        assert_eq!(session.state(), SessionState::SellerOpened);
    }

    #[test]
    fn buyer_opens_strictly_below_ask() {
        for seed in 0..50 {
            let mut params = reference_parameters();
            params.random_seed = Some(seed);
            let mut session = NegotiationSession::new(&params, fixed_options()).unwrap();
            session.next_step().unwrap();
            let buyer = session.next_step().unwrap().unwrap();
            assert_eq!(buyer.agent, Agent::Buyer);
            assert_eq!(buyer.round, 2);
            assert!(buyer.bid < 500.0, "seed {seed}: {}", buyer.bid);
            assert!(buyer.bid >= buyer.calculation_range.lower - 0.25);
        }
    }

    #[test]
    fn step_driver_matches_run_driver() {
        for seed in 0..25 {
            let mut params = reference_parameters();
            params.random_seed = Some(seed);
            params.seller_profile = Profile::Chameleon;

            let run = run_negotiation(&params, fixed_options()).unwrap();

            let mut session = NegotiationSession::new(&params, fixed_options()).unwrap();
            let mut stepped = Vec::new();
            while let Some(record) = session.next_step().unwrap() {
                stepped.push(record);
            }
            // A finishing turn emits nothing; drain until the state says so.
            while !session.is_finished() {
                if let Some(record) = session.next_step().unwrap() {
                    stepped.push(record);
                }
            }
            let completed = session.into_completed().unwrap();

            assert_eq!(stepped, run.rounds);
            assert_eq!(completed, run);
        }
    }

    #[test]
    fn finished_session_stays_finished() {
        let params = reference_parameters();
        let mut session = NegotiationSession::new(&params, fixed_options()).unwrap();
        while !session.is_finished() {
            session.next_step().unwrap();
        }
        let rounds = session.rounds().len();
        assert!(session.next_step().unwrap().is_none());
        assert_eq!(session.rounds().len(), rounds);
    }

    #[test]
    fn into_completed_requires_terminal_state() {
        let params = reference_parameters();
        let session = NegotiationSession::new(&params, fixed_options()).unwrap();
        assert!(matches!(
            session.into_completed(),
            Err(EngineError::SessionInProgress)
        ));
    }

    #[test]
    fn rejects_negative_and_non_finite_prices() {
        let mut params = reference_parameters();
        params.buyer_batna = -1.0;
        assert!(matches!(
            NegotiationSession::new(&params, fixed_options()),
            Err(EngineError::InvalidParameter { name: "buyer_batna", .. })
        ));

        let mut params = reference_parameters();
        params.estimated_seller_batna = f64::NAN;
        assert!(NegotiationSession::new(&params, fixed_options()).is_err());
    }

    #[test]
    fn caller_parameters_are_not_mutated() {
        let params = reference_parameters();
        let before = params.clone();
        let _ = run_negotiation(&params, fixed_options()).unwrap();
        assert_eq!(params, before);
    }

    #[test]
    fn missing_seed_is_drawn_and_recorded() {
        let mut params = reference_parameters();
        params.random_seed = None;
        let first = run_negotiation(&params, fixed_options()).unwrap();

        params.random_seed = Some(first.meta.random_seed);
        let replay = run_negotiation(&params, fixed_options()).unwrap();
        assert_eq!(first, replay);
    }

    #[test]
    fn identical_bids_settle_as_deal() {
        // Degenerate ZOPA: both BATNAs at 400 and the ask is 400.
        let params = NegotiationParameters {
            starting_price: 400.0,
            buyer_batna: 400.0,
            seller_batna: 400.0,
            estimated_buyer_batna: 400.0,
            estimated_seller_batna: 400.0,
            buyer_profile: Profile::Diplomat,
            seller_profile: Profile::Diplomat,
            random_seed: Some(1),
            month_to_key: 0,
        };
        let completed = run_negotiation(&params, fixed_options()).unwrap();
        // The buyer opens at 399.5, below the seller floor; only 400 can clear.
        if completed.meta.outcome == Outcome::Deal {
            assert_eq!(completed.meta.final_price, Some(400.0));
        }
    }

    #[test]
    fn records_are_timestamped_by_turn() {
        let params = reference_parameters();
        let options = fixed_options();
        let started = options.started_at;
        let completed = run_negotiation(&params, options).unwrap();
        for record in &completed.rounds {
            assert_eq!(
                record.timestamp,
                started + Duration::seconds(i64::from(record.round))
            );
        }
        if let Some(last) = completed.rounds.last() {
            assert_eq!(completed.meta.completed_at, last.timestamp);
        }
    }
}
