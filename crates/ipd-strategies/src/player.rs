//! A strategy bound to one match

use crate::action::Action;
use crate::context::{MatchContext, MatchLog, Seat};
use crate::state::StrategyState;
use crate::strategy::{decide, Strategy};

/// One strategy instance playing one match.
///
/// Owns the strategy's scratch state for the lifetime of the match;
/// a new match needs a new `Player`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    strategy: Strategy,
    state: StrategyState,
}

impl Player {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            state: StrategyState::Normal,
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn state(&self) -> StrategyState {
        self.state
    }

    /// Choose this round's move. Call once per round, in order.
    pub fn decide(&mut self, ctx: &mut MatchContext<'_>) -> Action {
        let (action, next) = decide(&self.strategy, self.state, ctx);
        self.state = next;
        action
    }

    /// Rebuild the state `strategy` would hold in `seat` after every
    /// round recorded in `log`.
    ///
    /// Decisions are recomputed from the same seeded streams, so the
    /// result matches a player that took part live. Recorded moves may
    /// differ from the decided ones under noise; the state follows the
    /// decisions.
    pub fn replay(strategy: Strategy, log: &MatchLog, seat: Seat) -> Self {
        let mut player = Player::new(strategy);
        for round in 0..log.rounds() {
            if let Some(mut ctx) = log.context_at(seat, round) {
                player.decide(&mut ctx);
            }
        }
        player
    }
}
