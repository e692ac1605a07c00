//! Search contract implemented by every playable game.
//!
//! Tree-search and learning code drive a game only through this trait:
//! - ask who acts and which integer actions are legal
//! - apply an action in place, or clone and apply for a child node
//! - read payoffs once the game is over
//!
//! Implementations must be deterministic and `Clone` must produce a fully
//! independent copy, since callers explore clones in parallel.

use crate::core::{ActionId, PlayerId};

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Every player finished level.
    Draw,
    /// Several players share the best payoff.
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }

    /// Winners by payoff; everyone level is a draw.
    #[must_use]
    pub fn from_returns(returns: &[f64]) -> Self {
        let best = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let winners: Vec<PlayerId> = returns
            .iter()
            .enumerate()
            .filter(|(_, &r)| r == best)
            .map(|(i, _)| PlayerId::new(i as u8))
            .collect();

        match winners.len() {
            1 => GameResult::Winner(winners[0]),
            n if n == returns.len() => GameResult::Draw,
            _ => GameResult::Winners(winners),
        }
    }
}

/// Turn-based game driven by integer actions.
///
/// ## Implementation Notes
///
/// - `current_player`: `None` once the game is terminal
/// - `legal_actions`: ascending ids, never empty before the end
/// - `apply_action`: an id outside the legal set leaves the state untouched
/// - `returns`: all zeros until the game is terminal
pub trait SearchGame: Clone {
    fn num_players(&self) -> usize;

    /// Size of the integer action space.
    fn num_distinct_actions(&self) -> usize;

    fn current_player(&self) -> Option<PlayerId>;

    fn legal_actions(&self) -> Vec<ActionId>;

    fn apply_action(&mut self, action: ActionId);

    fn is_terminal(&self) -> bool;

    fn returns(&self) -> Vec<f64>;

    /// Description of `action` as taken by `player`.
    fn action_to_string(&self, player: PlayerId, action: ActionId) -> String;

    /// Every applied action, oldest first.
    fn history(&self) -> Vec<ActionId>;

    // === Convenience Methods ===

    /// One flag per action id.
    fn legal_actions_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.num_distinct_actions()];
        for action in self.legal_actions() {
            if let Some(slot) = mask.get_mut(action as usize) {
                *slot = true;
            }
        }
        mask
    }

    /// Copy of this state with `action` applied.
    #[must_use]
    fn child(&self, action: ActionId) -> Self {
        let mut child = self.clone();
        child.apply_action(action);
        child
    }

    /// Outcome once terminal.
    fn result(&self) -> Option<GameResult> {
        self.is_terminal().then(|| GameResult::from_returns(&self.returns()))
    }
}
