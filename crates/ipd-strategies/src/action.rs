//! Moves and static strategy labels

use serde::{Deserialize, Serialize};

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Cooperate,
    Defect,
}

impl Action {
    /// The opposite move
    pub fn flip(self) -> Self {
        match self {
            Action::Cooperate => Action::Defect,
            Action::Defect => Action::Cooperate,
        }
    }

    pub fn is_cooperate(self) -> bool {
        self == Action::Cooperate
    }

    pub fn is_defect(self) -> bool {
        self == Action::Defect
    }
}

/// Classification label carried by every strategy.
///
/// Used for reporting and ranking only; no decision reads it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attitude {
    Aggressive,
    Cooperative,
    Neutral,
}

impl Attitude {
    pub const ALL: [Attitude; 3] = [Attitude::Aggressive, Attitude::Cooperative, Attitude::Neutral];
}
