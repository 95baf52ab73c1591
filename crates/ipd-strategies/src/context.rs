//! Match context consumed by strategies
//!
//! [`MatchContext`] is the read-only set of facts a strategy sees for one
//! decision. [`MatchLog`] is the engine-side record the contexts are built
//! from; strategies never receive it.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::history::History;
use crate::random::SeededRng;

/// Match-level settings reported by the engine
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchAttributes {
    /// Total rounds, or `None` when the engine draws the length at random
    pub length: Option<u32>,
    /// Probability that a recorded move was flipped from the intended one
    pub noise: f64,
}

impl Default for MatchAttributes {
    fn default() -> Self {
        Self { length: None, noise: 0.0 }
    }
}

impl MatchAttributes {
    pub fn with_length(length: u32) -> Self {
        Self { length: Some(length), ..Self::default() }
    }
}

/// Which side of the match a player sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    A,
    B,
}

impl Seat {
    pub fn index(self) -> usize {
        match self {
            Seat::A => 0,
            Seat::B => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Seat::A => Seat::B,
            Seat::B => Seat::A,
        }
    }
}

/// What a strategy may know about its opponent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpponentView<'a> {
    history: History<'a>,
    score: u32,
}

impl<'a> OpponentView<'a> {
    pub fn new(history: &'a [Action], score: u32) -> Self {
        Self { history: History::new(history), score }
    }

    pub fn history(&self) -> History<'a> {
        self.history
    }

    pub fn score(&self) -> u32 {
        self.score
    }
}

/// Facts available to one decision
#[derive(Clone, Debug)]
pub struct MatchContext<'a> {
    own: History<'a>,
    own_score: u32,
    opponent: OpponentView<'a>,
    attributes: MatchAttributes,
    rng: SeededRng,
}

impl<'a> MatchContext<'a> {
    /// Both histories must have the same length: the number of
    /// rounds already played.
    pub fn new(
        own_history: &'a [Action],
        own_score: u32,
        opponent: OpponentView<'a>,
        attributes: MatchAttributes,
        rng: SeededRng,
    ) -> Self {
        debug_assert_eq!(own_history.len(), opponent.history().len());
        Self {
            own: History::new(own_history),
            own_score,
            opponent,
            attributes,
            rng,
        }
    }

    /// Rounds completed so far (0 at the first decision)
    pub fn round_index(&self) -> u32 {
        self.own.len() as u32
    }

    pub fn is_first_round(&self) -> bool {
        self.own.is_empty()
    }

    pub fn own_history(&self) -> History<'a> {
        self.own
    }

    pub fn opponent_history(&self) -> History<'a> {
        self.opponent.history()
    }

    pub fn opponent(&self) -> OpponentView<'a> {
        self.opponent
    }

    pub fn own_score(&self) -> u32 {
        self.own_score
    }

    pub fn opponent_score(&self) -> u32 {
        self.opponent.score()
    }

    /// Own score minus the opponent's
    pub fn score_lead(&self) -> i64 {
        self.own_score as i64 - self.opponent.score() as i64
    }

    pub fn match_length(&self) -> Option<u32> {
        self.attributes.length
    }

    pub fn noise(&self) -> f64 {
        self.attributes.noise
    }

    pub fn attributes(&self) -> &MatchAttributes {
        &self.attributes
    }

    /// Rounds left including the current one, if the length is known
    pub fn remaining_rounds(&self) -> Option<u32> {
        self.attributes
            .length
            .map(|length| length.saturating_sub(self.round_index()))
    }

    /// True when the current round is one of the final `rounds` of a
    /// match of known length. Always false for unknown length.
    pub fn in_final_rounds(&self, rounds: u32) -> bool {
        match self.remaining_rounds() {
            Some(remaining) => remaining > 0 && remaining <= rounds,
            None => false,
        }
    }

    /// `Cooperate` with probability `p`, drawn from the match's seeded source
    pub fn random_choice(&mut self, p: f64) -> Action {
        self.rng.choose(p)
    }

    /// True with probability `percent`/100
    pub fn chance_percent(&mut self, percent: u8) -> bool {
        self.rng.next_percent() < percent
    }
}

/// One round as reported by the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Recorded moves, indexed by seat
    pub moves: [Action; 2],
    /// Payoffs awarded, indexed by seat
    pub payoffs: [u32; 2],
}

/// Append-only record of one match
///
/// Holds what the engine reports after each round and hands out
/// [`MatchContext`]s for either seat at any round already reached.
#[derive(Clone, Debug)]
pub struct MatchLog {
    attributes: MatchAttributes,
    rng: SeededRng,
    moves: [Vec<Action>; 2],
    payoffs: [Vec<u32>; 2],
}

impl MatchLog {
    pub fn new(attributes: MatchAttributes, seed: &[u8; 32], match_index: u32) -> Self {
        let capacity = attributes.length.unwrap_or(0) as usize;
        Self {
            attributes,
            rng: SeededRng::new(seed, match_index),
            moves: [Vec::with_capacity(capacity), Vec::with_capacity(capacity)],
            payoffs: [Vec::with_capacity(capacity), Vec::with_capacity(capacity)],
        }
    }

    /// Rebuild a log from previously reported rounds
    pub fn from_rounds(
        attributes: MatchAttributes,
        seed: &[u8; 32],
        match_index: u32,
        rounds: &[RoundRecord],
    ) -> Self {
        let mut log = Self::new(attributes, seed, match_index);
        for round in rounds {
            log.record(*round);
        }
        log
    }

    pub fn attributes(&self) -> &MatchAttributes {
        &self.attributes
    }

    /// Rounds recorded so far
    pub fn rounds(&self) -> u32 {
        self.moves[0].len() as u32
    }

    pub fn record(&mut self, round: RoundRecord) {
        for seat in [Seat::A, Seat::B] {
            let i = seat.index();
            self.moves[i].push(round.moves[i]);
            self.payoffs[i].push(round.payoffs[i]);
        }
    }

    pub fn history(&self, seat: Seat) -> &[Action] {
        &self.moves[seat.index()]
    }

    /// Cumulative payoff of `seat`
    pub fn score(&self, seat: Seat) -> u32 {
        total(&self.payoffs[seat.index()])
    }

    pub fn round(&self, index: u32) -> Option<RoundRecord> {
        let i = index as usize;
        Some(RoundRecord {
            moves: [*self.moves[0].get(i)?, *self.moves[1].get(i)?],
            payoffs: [*self.payoffs[0].get(i)?, *self.payoffs[1].get(i)?],
        })
    }

    /// Context for `seat` deciding the next unplayed round
    pub fn context(&self, seat: Seat) -> MatchContext<'_> {
        self.build_context(seat, self.moves[0].len())
    }

    /// Context for `seat` as it stood before round `round` was played
    pub fn context_at(&self, seat: Seat, round: u32) -> Option<MatchContext<'_>> {
        let round = round as usize;
        if round > self.moves[0].len() {
            return None;
        }
        Some(self.build_context(seat, round))
    }

    fn build_context(&self, seat: Seat, round: usize) -> MatchContext<'_> {
        let own = seat.index();
        let opp = seat.other().index();
        let own_score = total(&self.payoffs[own][..round]);
        let opp_score = total(&self.payoffs[opp][..round]);
        MatchContext::new(
            &self.moves[own][..round],
            own_score,
            OpponentView::new(&self.moves[opp][..round], opp_score),
            self.attributes,
            self.rng.for_turn(round as u32, seat.index() as u8),
        )
    }
}

/// Sum of payoffs, saturating at `u32::MAX`
fn total(payoffs: &[u32]) -> u32 {
    payoffs.iter().fold(0u32, |acc, p| acc.saturating_add(*p))
}
