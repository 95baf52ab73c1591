use thiserror::Error;

use crate::action::Attitude;

/// Configuration and metadata errors. Decisions themselves never fail.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Ranked strategy `{name}` is not in the catalog")]
    UnknownRankedStrategy { name: String },
    #[error("Strategy `{name}` is {actual:?} but ranked as {ranked:?}")]
    AttitudeMismatch {
        name: String,
        actual: Attitude,
        ranked: Attitude,
    },
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}
