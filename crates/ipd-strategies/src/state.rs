//! Per-match strategy state
//!
//! A strategy's scratch state is one tagged value. Countdowns are entered
//! only through [`StrategyState::punish`] / [`StrategyState::forgive`] and
//! advanced only through [`StrategyState::advance`], so every streak has
//! exactly one way in and one way out.

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Mode a strategy is in between two decisions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyState {
    /// Default reciprocal or probabilistic play
    #[default]
    Normal,
    /// Forced defections still owed
    Punishing { rounds_left: u32 },
    /// Forced cooperations still owed
    Forgiving { rounds_left: u32 },
    /// Defect for the rest of the match
    Locked,
}

/// Which kind of countdown just ran out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Streak {
    Punishment,
    Forgiveness,
}

/// Outcome of advancing the state by one round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The state dictates this round's move
    Forced { action: Action, next: StrategyState },
    /// A countdown finished; the strategy is back to normal this round
    Finished(Streak),
    /// No streak active
    Free,
}

impl StrategyState {
    /// Start a run of `rounds` forced defections, the first one this round.
    pub fn punish(rounds: u32) -> (Action, StrategyState) {
        (Action::Defect, StrategyState::Punishing { rounds_left: rounds.saturating_sub(1) })
    }

    /// Start a run of `rounds` forced cooperations, the first one this round.
    pub fn forgive(rounds: u32) -> (Action, StrategyState) {
        (Action::Cooperate, StrategyState::Forgiving { rounds_left: rounds.saturating_sub(1) })
    }

    /// Move the countdown one round forward.
    ///
    /// A countdown at zero yields `Finished` rather than another forced
    /// move, so the strategy plays normally on the very next call.
    pub fn advance(self) -> Advance {
        match self {
            StrategyState::Normal => Advance::Free,
            StrategyState::Locked => Advance::Forced {
                action: Action::Defect,
                next: StrategyState::Locked,
            },
            StrategyState::Punishing { rounds_left: 0 } => Advance::Finished(Streak::Punishment),
            StrategyState::Punishing { rounds_left } => Advance::Forced {
                action: Action::Defect,
                next: StrategyState::Punishing { rounds_left: rounds_left - 1 },
            },
            StrategyState::Forgiving { rounds_left: 0 } => Advance::Finished(Streak::Forgiveness),
            StrategyState::Forgiving { rounds_left } => Advance::Forced {
                action: Action::Cooperate,
                next: StrategyState::Forgiving { rounds_left: rounds_left - 1 },
            },
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, StrategyState::Locked)
    }

    /// Remaining forced rounds of an active countdown
    pub fn rounds_left(&self) -> Option<u32> {
        match self {
            StrategyState::Punishing { rounds_left } | StrategyState::Forgiving { rounds_left } => {
                Some(*rounds_left)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_normal() {
        assert_eq!(StrategyState::default(), StrategyState::Normal);
        assert_eq!(StrategyState::Normal.advance(), Advance::Free);
    }

    #[test]
    fn test_punish_counts_down_to_finished() {
        let (action, mut state) = StrategyState::punish(3);
        assert_eq!(action, Action::Defect);
        assert_eq!(state, StrategyState::Punishing { rounds_left: 2 });

        let mut forced = 1;
        loop {
            match state.advance() {
                Advance::Forced { action, next } => {
                    assert_eq!(action, Action::Defect);
                    assert_eq!(next.rounds_left(), Some(state.rounds_left().unwrap() - 1));
                    state = next;
                    forced += 1;
                }
                Advance::Finished(streak) => {
                    assert_eq!(streak, Streak::Punishment);
                    break;
                }
                Advance::Free => panic!("countdown vanished"),
            }
        }
        assert_eq!(forced, 3);
    }

    #[test]
    fn test_single_round_streak_finishes_next_call() {
        let (action, state) = StrategyState::forgive(1);
        assert_eq!(action, Action::Cooperate);
        assert_eq!(state.advance(), Advance::Finished(Streak::Forgiveness));
    }

    #[test]
    fn test_zero_round_streak_does_not_underflow() {
        let (_, state) = StrategyState::punish(0);
        assert_eq!(state, StrategyState::Punishing { rounds_left: 0 });
    }

    #[test]
    fn test_locked_is_terminal() {
        let state = StrategyState::Locked;
        assert_eq!(
            state.advance(),
            Advance::Forced { action: Action::Defect, next: StrategyState::Locked }
        );
        assert!(state.is_locked());
    }
}
