//! Legal action generation per phase.

use crate::cards::CardStatus;
use crate::core::{Action, AreaId, Phase, PlayerId};
use crate::effects::{classify, CardEffect, EffectResolver, KingReach, Resolution, ResponseStep, ScoreSelection};

use super::state::{GameState, Pending};

impl GameState {
    /// Every legal typed action for the player to move.
    ///
    /// Outside `end` the result is never empty: phases that could dead-end
    /// fall back to `skip`.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Action> {
        if self.turn.phase == Phase::End {
            return Vec::new();
        }
        let Some(player) = self.current_player() else {
            return Vec::new();
        };

        let mut moves = self.phase_moves(player);
        if moves.is_empty() {
            moves.push(Action::Skip);
        }
        moves
    }

    /// Whether `action` is legal right now.
    ///
    /// Agrees with [`legal_moves`](Self::legal_moves) but tests the one
    /// action directly; the full list is only built for the `skip` fallback.
    #[must_use]
    pub fn is_legal(&self, action: Action) -> bool {
        if self.turn.phase == Phase::End {
            return false;
        }
        let Some(player) = self.current_player() else {
            return false;
        };
        self.allows(action, player) || (action == Action::Skip && self.phase_moves(player).is_empty())
    }

    fn phase_moves(&self, player: PlayerId) -> Vec<Action> {
        match self.turn.phase {
            Phase::Start => self.start_moves(),
            Phase::Power => self.power_moves(player),
            Phase::Action => self.cards.dealt().map(Action::SelectCard).collect(),
            Phase::ActionChoose => self.choose_moves(),
            Phase::ActionCab1 | Phase::ActionCab2 => self.placement_moves(),
            Phase::ActionCard1 | Phase::ActionCard2 => self.card_moves(player),
            Phase::Response => self.response_moves(),
            Phase::Scoring => self.castillo_moves(),
            Phase::End => Vec::new(),
        }
    }

    /// Membership in `phase_moves`, decided per action.
    fn allows(&self, action: Action, player: PlayerId) -> bool {
        let king = self.board.king();
        match (self.turn.phase, action) {
            (Phase::Start, Action::MoveGrande(r)) => {
                self.config.is_region(r) && r != king && self.board.markers(r) >> 1 == 0
            }
            (Phase::Power, Action::SelectPower(p)) => self.cards.can_play_power(player, p),
            (Phase::Action, Action::SelectCard(card)) => self.cards.status(card) == CardStatus::Dealt,
            (Phase::ActionChoose, Action::CabFirst | Action::CardFirst) => true,
            (Phase::ActionChoose, Action::AltCardFirst) => {
                matches!(self.active_card().map(|c| &c.effect), Some(CardEffect::Choose { .. }))
            }
            (Phase::ActionCab1 | Phase::ActionCab2, Action::Skip) => true,
            (Phase::ActionCab1 | Phase::ActionCab2, Action::MoveCaballero { from, to, player: owner }) => {
                self.tracked_accepts(from, to, owner)
            }
            (Phase::ActionCard1 | Phase::ActionCard2, _) => self.card_allows(action, player),
            (Phase::Response, _) => self.response_allows(action),
            (Phase::Scoring, Action::ChooseRegion(r)) => self.config.is_region(r) && r != king,
            _ => false,
        }
    }

    fn start_moves(&self) -> Vec<Action> {
        let king = self.board.king();
        self.config
            .region_ids()
            .filter(|&r| r != king && self.board.markers(r) >> 1 == 0)
            .map(Action::MoveGrande)
            .collect()
    }

    fn power_moves(&self, player: PlayerId) -> Vec<Action> {
        (0..self.cards.power_card_count() as u8)
            .filter(|&p| self.cards.can_play_power(player, p))
            .map(Action::SelectPower)
            .collect()
    }

    fn choose_moves(&self) -> Vec<Action> {
        let mut moves = vec![Action::CabFirst, Action::CardFirst];
        if matches!(self.active_card().map(|c| &c.effect), Some(CardEffect::Choose { .. })) {
            moves.push(Action::AltCardFirst);
        }
        moves
    }

    fn placement_moves(&self) -> Vec<Action> {
        let mut moves = self.tracked_moves();
        moves.push(Action::Skip);
        moves
    }

    fn tracked_moves(&self) -> Vec<Action> {
        match &self.pending {
            Pending::Moving(tracking) => tracking
                .legal_moves(&self.board)
                .into_iter()
                .map(|(from, to, player)| Action::MoveCaballero { from, to, player })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn tracked_accepts(&self, from: AreaId, to: AreaId, player: PlayerId) -> bool {
        match &self.pending {
            Pending::Moving(tracking) => {
                player.index() < self.player_count() && tracking.accepts(&self.board, from, to, player)
            }
            _ => false,
        }
    }

    fn card_moves(&self, player: PlayerId) -> Vec<Action> {
        let Some(card) = self.active_card() else {
            return Vec::new();
        };
        if self.turn.branch.is_none() && matches!(card.effect, CardEffect::Choose { .. }) {
            return vec![Action::CardFirst, Action::AltCardFirst];
        }
        let Some(effect) = self.active_effect() else {
            return Vec::new();
        };

        let mut moves = match classify(effect) {
            Resolution::Instant | Resolution::Response => vec![Action::Trigger],
            Resolution::RegionChoice => self.region_choice_moves(effect, player),
            Resolution::Direct => self.direct_moves(effect, player),
            Resolution::Stepwise => {
                let mut moves = self.tracked_moves();
                if let Pending::Moving(tracking) = &self.pending {
                    if tracking.minimums_met() {
                        moves.push(Action::Skip);
                    }
                }
                return moves;
            }
            Resolution::Branch => Vec::new(),
        };
        moves.push(Action::Skip);
        moves
    }

    fn region_choice_moves(&self, effect: &CardEffect, player: PlayerId) -> Vec<Action> {
        match effect {
            CardEffect::Score { selection: ScoreSelection::SelfChoose } => {
                self.config.scoring_areas().map(Action::ChooseRegion).collect()
            }
            CardEffect::Move(_) => self.eviction_sources(player).into_iter().map(Action::ChooseRegion).collect(),
            _ => Vec::new(),
        }
    }

    /// Regions an eviction may empty: not the king's, with an opponent present.
    pub(crate) fn eviction_sources(&self, player: PlayerId) -> Vec<AreaId> {
        let n = self.player_count();
        let king = self.board.king();
        self.config
            .region_ids()
            .filter(|&r| r != king && player.opponents(n).any(|o| self.board.count(r, o) > 0))
            .collect()
    }

    fn direct_moves(&self, effect: &CardEffect, player: PlayerId) -> Vec<Action> {
        let king = self.board.king();
        match effect {
            CardEffect::Power => {
                let bits = self.cards.retrievable(player);
                (0..self.cards.power_card_count() as u8)
                    .filter(|&p| bits & (1 << p) != 0)
                    .map(Action::RetrievePower)
                    .collect()
            }
            CardEffect::Grande => {
                let current = self.board.grande(player);
                self.config
                    .region_ids()
                    .filter(|&r| r != king && Some(r) != current)
                    .map(Action::MoveGrande)
                    .collect()
            }
            CardEffect::King { reach: KingReach::Neighbor } => self.config.neighbors(king).map(Action::MoveKing).collect(),
            CardEffect::King { reach: KingReach::Anywhere } => {
                self.config.region_ids().filter(|&r| r != king).map(Action::MoveKing).collect()
            }
            CardEffect::Scoreboard => {
                let free: Vec<AreaId> = self
                    .config
                    .scoring_areas()
                    .filter(|&a| self.board.scoreboard_on(a).is_none())
                    .collect();
                (0..self.config.scoreboards.len() as u8)
                    .flat_map(|board| free.iter().map(move |&region| Action::MoveScoreboard { board, region }))
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    fn card_allows(&self, action: Action, player: PlayerId) -> bool {
        let Some(card) = self.active_card() else {
            return false;
        };
        if self.turn.branch.is_none() && matches!(card.effect, CardEffect::Choose { .. }) {
            return matches!(action, Action::CardFirst | Action::AltCardFirst);
        }
        let Some(effect) = self.active_effect() else {
            return false;
        };

        match (classify(effect), action) {
            (Resolution::Instant | Resolution::Response, Action::Trigger | Action::Skip) => true,
            (Resolution::RegionChoice | Resolution::Direct, Action::Skip) => true,
            (Resolution::RegionChoice, Action::ChooseRegion(area)) => match effect {
                CardEffect::Score { selection: ScoreSelection::SelfChoose } => self.config.is_scoring_area(area),
                CardEffect::Move(_) => {
                    let n = self.player_count();
                    self.config.is_region(area)
                        && area != self.board.king()
                        && player.opponents(n).any(|o| self.board.count(area, o) > 0)
                }
                _ => false,
            },
            (Resolution::Direct, _) => self.direct_allows(effect, action, player),
            (Resolution::Stepwise, Action::MoveCaballero { from, to, player: owner }) => {
                self.tracked_accepts(from, to, owner)
            }
            (Resolution::Stepwise, Action::Skip) => {
                matches!(&self.pending, Pending::Moving(tracking) if tracking.minimums_met())
            }
            _ => false,
        }
    }

    fn direct_allows(&self, effect: &CardEffect, action: Action, player: PlayerId) -> bool {
        let king = self.board.king();
        match (effect, action) {
            (CardEffect::Power, Action::RetrievePower(p)) => {
                usize::from(p) < self.cards.power_card_count() && self.cards.retrievable(player) & (1 << p) != 0
            }
            (CardEffect::Grande, Action::MoveGrande(r)) => {
                self.config.is_region(r) && r != king && Some(r) != self.board.grande(player)
            }
            (CardEffect::King { reach: KingReach::Neighbor }, Action::MoveKing(r)) => {
                self.config.neighbors(king).any(|n| n == r)
            }
            (CardEffect::King { reach: KingReach::Anywhere }, Action::MoveKing(r)) => {
                self.config.is_region(r) && r != king
            }
            (CardEffect::Scoreboard, Action::MoveScoreboard { board, region }) => {
                usize::from(board) < self.config.scoreboards.len()
                    && self.config.is_scoring_area(region)
                    && self.board.scoreboard_on(region).is_none()
            }
            _ => false,
        }
    }

    fn response_allows(&self, action: Action) -> bool {
        let Pending::AwaitingResponse(queue) = &self.pending else {
            return false;
        };
        match (queue.current(), action) {
            (Some(&ResponseStep::ChooseRegion { player, rule }), Action::ChooseRegion(area)) => {
                EffectResolver::region_choices(&self.config, &self.board, rule, player).contains(&area)
            }
            (Some(&ResponseStep::Return { player, to, .. }), Action::MoveCaballero { from, to: dest, player: owner }) => {
                owner == player
                    && dest == to
                    && EffectResolver::return_sources(&self.config, &self.board, player).contains(&from)
            }
            _ => false,
        }
    }

    fn response_moves(&self) -> Vec<Action> {
        let Pending::AwaitingResponse(queue) = &self.pending else {
            return Vec::new();
        };
        match queue.current() {
            Some(&ResponseStep::ChooseRegion { player, rule }) => {
                EffectResolver::region_choices(&self.config, &self.board, rule, player)
                    .into_iter()
                    .map(Action::ChooseRegion)
                    .collect()
            }
            Some(&ResponseStep::Return { player, to, .. }) => {
                EffectResolver::return_sources(&self.config, &self.board, player)
                    .into_iter()
                    .map(|from| Action::MoveCaballero { from, to, player })
                    .collect()
            }
            None => Vec::new(),
        }
    }

    fn castillo_moves(&self) -> Vec<Action> {
        let king = self.board.king();
        self.config
            .region_ids()
            .filter(|&r| r != king)
            .map(Action::ChooseRegion)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{Action, Phase};
    use crate::games::el_grande::ElGrandeBuilder;

    #[test]
    fn test_power_phase_offers_every_card() {
        let state = ElGrandeBuilder::new().player_count(3).build(7).unwrap();
        assert_eq!(state.phase(), Phase::Power);

        let moves = state.legal_moves();
        assert_eq!(moves.len(), 13);
        assert!(moves.iter().all(|a| matches!(a, Action::SelectPower(_))));
    }

    #[test]
    fn test_power_card_taken_this_round_is_not_offered() {
        let mut state = ElGrandeBuilder::new().player_count(3).build(7).unwrap();
        state.apply(Action::SelectPower(4));

        let moves = state.legal_moves();
        assert_eq!(moves.len(), 12);
        assert!(!moves.contains(&Action::SelectPower(4)));
    }

    #[test]
    fn test_grande_selection_avoids_king_and_other_grandes() {
        let mut state = ElGrandeBuilder::new()
            .player_count(2)
            .grande_selection(true)
            .king(crate::core::AreaId(0))
            .build(1)
            .unwrap();
        assert_eq!(state.phase(), Phase::Start);
        assert_eq!(state.legal_moves().len(), 8);

        state.apply(Action::MoveGrande(crate::core::AreaId(3)));
        let moves = state.legal_moves();
        assert_eq!(moves.len(), 7);
        assert!(!moves.contains(&Action::MoveGrande(crate::core::AreaId(3))));
    }
}
