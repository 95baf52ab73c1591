//! Strategies for the Iterated Prisoner's Dilemma
//!
//! Each strategy maps the facts of a match so far to one move per round.
//! The tournament engine owns the match: it builds a [`MatchContext`] for
//! every decision, records the moves and payoffs afterwards, and keeps one
//! [`Player`] per strategy per match.
//!
//! This crate is compiled to:
//! - Native (for engines embedding the strategies)
//! - WASM (for the frontend strategy browser)

mod action;
mod context;
mod error;
mod history;
mod player;
mod random;
mod rankings;
mod state;
mod strategy;

#[cfg(feature = "wasm")]
mod wasm;

pub use action::{Action, Attitude};
pub use context::{MatchAttributes, MatchContext, MatchLog, OpponentView, RoundRecord, Seat};
pub use error::StrategyError;
pub use history::History;
pub use player::Player;
pub use random::SeededRng;
pub use rankings::Rankings;
pub use state::{Advance, StrategyState, Streak};
pub use strategy::{decide, describe_strategy, Strategy, StrategyKind, StrategyParams};
