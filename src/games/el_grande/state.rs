//! Game state and the search contract.

use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::BoardState;
use crate::cards::{ActionCard, CardIndex, CardState};
use crate::core::{
    Action, ActionId, ActionRecord, ActionSpace, AreaId, GameConfig, Phase, PlayerId, PlayerMap, MAX_PLAYERS,
};
use crate::effects::{Branch, CardEffect, MovementTracking, ResponseQueue};
use crate::rules::SearchGame;
use crate::scoring;

/// Round, phase, scores and who still has to act.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub round: u8,
    /// Round whose scoring ends the game.
    pub final_round: u8,
    pub phase: Phase,
    pub scores: PlayerMap<i32>,
    /// Players still to act this phase; the front one is acting.
    pub queue: SmallVec<[PlayerId; MAX_PLAYERS]>,
    /// Players done this phase.
    pub done: SmallVec<[PlayerId; MAX_PLAYERS]>,
    /// Action order of the current round, derived from the power cards.
    pub order: SmallVec<[PlayerId; MAX_PLAYERS]>,
    pub active_card: Option<CardIndex>,
    /// Option picked on a two-option card.
    pub branch: Option<Branch>,
    /// Applied actions so far.
    pub step: u32,
}

/// Ephemeral sub-state of the card or placement being resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pending {
    Idle,
    Moving(MovementTracking),
    AwaitingResponse(ResponseQueue),
}

/// Full El Grande game state.
///
/// `Clone` yields an independent copy: the board grid, card arrays and
/// history are persistent structures and the sub-states are plain values,
/// so nothing mutable is shared between a state and its clone.
#[derive(Clone, Debug)]
pub struct GameState {
    pub(crate) config: Arc<GameConfig>,
    pub(crate) space: ActionSpace,
    pub(crate) names: Arc<Vec<String>>,
    pub(crate) board: BoardState,
    pub(crate) cards: CardState,
    pub(crate) turn: TurnState,
    pub(crate) pending: Pending,
    pub(crate) history: Vector<ActionRecord>,
}

impl GameState {
    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Shared handle to the configuration.
    #[must_use]
    pub fn config_arc(&self) -> Arc<GameConfig> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn action_space(&self) -> ActionSpace {
        self.space
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn player_names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn player_name(&self, player: PlayerId) -> &str {
        self.names.get(player.index()).map_or("?", String::as_str)
    }

    #[must_use]
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    #[must_use]
    pub fn cards(&self) -> &CardState {
        &self.cards
    }

    #[must_use]
    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    #[must_use]
    pub fn pending(&self) -> &Pending {
        &self.pending
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.turn.phase
    }

    #[must_use]
    pub fn round(&self) -> u8 {
        self.turn.round
    }

    #[must_use]
    pub fn scores(&self) -> &PlayerMap<i32> {
        &self.turn.scores
    }

    #[must_use]
    pub fn records(&self) -> &Vector<ActionRecord> {
        &self.history
    }

    /// Card being resolved this turn.
    #[must_use]
    pub fn active_card(&self) -> Option<&ActionCard> {
        self.turn.active_card.and_then(|c| self.config.cards.get(c))
    }

    /// Effect in force for the active card, with the picked option applied.
    #[must_use]
    pub fn active_effect(&self) -> Option<&CardEffect> {
        let card = self.active_card()?;
        Some(match self.turn.branch {
            Some(branch) => card.effect.branch(branch),
            None => &card.effect,
        })
    }

    /// The player who played the active card (or picks next in power/action).
    #[must_use]
    pub fn active_player(&self) -> Option<PlayerId> {
        match &self.pending {
            Pending::AwaitingResponse(queue) => Some(queue.active),
            _ => self.turn.queue.first().copied(),
        }
    }

    /// Caballeros a player has in the Castillo.
    #[must_use]
    pub fn castillo_count(&self, player: PlayerId) -> u8 {
        self.board.count(self.config.castillo(), player)
    }

    // === Search contract ===

    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        match (self.turn.phase, &self.pending) {
            (Phase::End, _) => None,
            (Phase::Response, Pending::AwaitingResponse(queue)) => queue.current().map(|s| s.player()),
            _ => self.turn.queue.first().copied(),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.turn.phase == Phase::End
    }

    /// Margins of the current totals against the midpoint of the two best.
    #[must_use]
    pub fn margins(&self) -> Vec<f64> {
        scoring::margins(self.turn.scores.as_slice())
    }

    /// Zero-sum payoffs once terminal; zeros before.
    #[must_use]
    pub fn returns(&self) -> Vec<f64> {
        if self.is_terminal() {
            scoring::returns(self.turn.scores.as_slice())
        } else {
            vec![0.0; self.player_count()]
        }
    }

    /// Legal actions as ascending integer ids.
    #[must_use]
    pub fn legal_actions(&self) -> Vec<ActionId> {
        let mut ids: Vec<ActionId> = self
            .legal_moves()
            .into_iter()
            .filter_map(|a| self.space.encode(a))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Description of an action id.
    #[must_use]
    pub fn describe(&self, action: ActionId) -> String {
        match self.space.decode(action) {
            Some(a) => self.space.describe(a, &self.config),
            None => format!("Invalid action {action}"),
        }
    }

    #[must_use]
    pub fn action_to_string(&self, player: PlayerId, action: ActionId) -> String {
        format!("{}: {}", self.player_name(player), self.describe(action))
    }

    /// Apply a typed action; ignored unless legal.
    pub fn apply(&mut self, action: Action) {
        if let Some(id) = self.space.encode(action) {
            self.apply_action(id);
        }
    }

    /// Area by name, for callers working with region names.
    #[must_use]
    pub fn area(&self, name: &str) -> Option<AreaId> {
        self.config.area_by_name(name)
    }
}

impl SearchGame for GameState {
    fn num_players(&self) -> usize {
        self.player_count()
    }

    fn num_distinct_actions(&self) -> usize {
        self.space.size() as usize
    }

    fn current_player(&self) -> Option<PlayerId> {
        GameState::current_player(self)
    }

    fn legal_actions(&self) -> Vec<ActionId> {
        GameState::legal_actions(self)
    }

    fn apply_action(&mut self, action: ActionId) {
        GameState::apply_action(self, action);
    }

    fn is_terminal(&self) -> bool {
        GameState::is_terminal(self)
    }

    fn returns(&self) -> Vec<f64> {
        GameState::returns(self)
    }

    fn action_to_string(&self, player: PlayerId, action: ActionId) -> String {
        GameState::action_to_string(self, player, action)
    }

    fn history(&self) -> Vec<ActionId> {
        self.history.iter().map(|r| r.action).collect()
    }
}
