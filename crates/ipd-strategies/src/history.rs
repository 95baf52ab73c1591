//! Bounded read access to one player's recorded moves
//!
//! Every accessor is total: asking for more rounds than were played
//! returns `None` or a truncated window, never a panic.

use crate::action::Action;

/// Read-only view over one player's moves, oldest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct History<'a> {
    moves: &'a [Action],
}

impl<'a> History<'a> {
    pub fn new(moves: &'a [Action]) -> Self {
        Self { moves }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn as_slice(&self) -> &'a [Action] {
        self.moves
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + 'a {
        self.moves.iter().copied()
    }

    /// Move played in the previous round
    pub fn last(&self) -> Option<Action> {
        self.moves.last().copied()
    }

    /// Move played `k` rounds ago; `ago(1)` is the previous round.
    pub fn ago(&self, k: usize) -> Option<Action> {
        if k == 0 || k > self.moves.len() {
            return None;
        }
        Some(self.moves[self.moves.len() - k])
    }

    /// Move played in round `index` (0-based)
    pub fn at(&self, index: usize) -> Option<Action> {
        self.moves.get(index).copied()
    }

    /// The last `k` rounds, or all of them if fewer were played
    pub fn recent(&self, k: usize) -> History<'a> {
        let moves = self.moves;
        let start = moves.len().saturating_sub(k);
        History::new(&moves[start..])
    }

    pub fn cooperations(&self) -> usize {
        self.moves.iter().filter(|m| m.is_cooperate()).count()
    }

    pub fn defections(&self) -> usize {
        self.moves.iter().filter(|m| m.is_defect()).count()
    }

    /// Fraction of rounds cooperated.
    ///
    /// An empty history counts as full cooperation (1.0).
    pub fn cooperation_rate(&self) -> f64 {
        if self.moves.is_empty() {
            return 1.0;
        }
        self.cooperations() as f64 / self.moves.len() as f64
    }

    /// Whether the cooperation rate reaches `percent` (closed boundary).
    ///
    /// Integer comparison, so an exact 60% meets a 60 threshold.
    /// An empty history always meets it.
    pub fn cooperation_at_least(&self, percent: u8) -> bool {
        if self.moves.is_empty() {
            return true;
        }
        self.cooperations() * 100 >= percent as usize * self.moves.len()
    }

    /// Length of the run of `action` ending at the previous round
    pub fn trailing(&self, action: Action) -> usize {
        self.moves.iter().rev().take_while(|m| **m == action).count()
    }
}

impl<'a> From<&'a [Action]> for History<'a> {
    fn from(moves: &'a [Action]) -> Self {
        History::new(moves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action::{Cooperate as C, Defect as D};

    #[test]
    fn test_ago_bounds() {
        let moves = [C, D, C];
        let h = History::new(&moves);
        assert_eq!(h.ago(0), None);
        assert_eq!(h.ago(1), Some(C));
        assert_eq!(h.ago(2), Some(D));
        assert_eq!(h.ago(3), Some(C));
        assert_eq!(h.ago(4), None);
    }

    #[test]
    fn test_recent_truncates() {
        let moves = [D, C];
        let h = History::new(&moves);
        assert_eq!(h.recent(50).len(), 2);
        assert_eq!(h.recent(1).as_slice(), &[C]);
        assert!(History::new(&[]).recent(10).is_empty());
    }

    #[test]
    fn test_empty_rate_is_one() {
        let h = History::new(&[]);
        assert_eq!(h.cooperation_rate(), 1.0);
        assert!(h.cooperation_at_least(100));
    }

    #[test]
    fn test_rate_boundary_is_closed() {
        let moves = [C, C, C, C, C, C, D, D, D, D];
        let h = History::new(&moves);
        assert!((h.cooperation_rate() - 0.6).abs() < 1e-12);
        assert!(h.cooperation_at_least(60));
        assert!(!h.cooperation_at_least(61));
    }

    #[test]
    fn test_trailing() {
        let moves = [D, C, D, D];
        let h = History::new(&moves);
        assert_eq!(h.trailing(D), 2);
        assert_eq!(h.trailing(C), 0);
        assert_eq!(History::new(&[]).trailing(D), 0);
    }
}
