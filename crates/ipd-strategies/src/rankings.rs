//! Per-attitude strategy orderings
//!
//! Precomputed reporting metadata. Nothing in the decision path reads it.

use serde::{Deserialize, Serialize};

use crate::action::Attitude;
use crate::error::StrategyError;
use crate::strategy::StrategyKind;

/// Ordered strategy ids, best first, grouped by attitude
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rankings {
    pub aggressive: Vec<String>,
    pub cooperative: Vec<String>,
    pub neutral: Vec<String>,
}

impl Rankings {
    /// Load rankings and check every entry against the catalog
    pub fn from_json(json: &str) -> Result<Self, StrategyError> {
        let rankings: Rankings = serde_json::from_str(json)?;
        rankings.validate()?;
        Ok(rankings)
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        for attitude in Attitude::ALL {
            for name in self.for_attitude(attitude) {
                let kind: StrategyKind = name
                    .parse()
                    .map_err(|_| StrategyError::UnknownRankedStrategy { name: name.clone() })?;
                if kind.attitude() != attitude {
                    return Err(StrategyError::AttitudeMismatch {
                        name: name.clone(),
                        actual: kind.attitude(),
                        ranked: attitude,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn for_attitude(&self, attitude: Attitude) -> &[String] {
        match attitude {
            Attitude::Aggressive => &self.aggressive,
            Attitude::Cooperative => &self.cooperative,
            Attitude::Neutral => &self.neutral,
        }
    }

    /// Attitude group and 0-based rank of a strategy id
    pub fn position(&self, id: &str) -> Option<(Attitude, usize)> {
        Attitude::ALL.into_iter().find_map(|attitude| {
            self.for_attitude(attitude)
                .iter()
                .position(|name| name == id)
                .map(|rank| (attitude, rank))
        })
    }
}
