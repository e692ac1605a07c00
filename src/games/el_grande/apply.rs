//! Applying actions and advancing the turn state machine.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::{Action, ActionId, ActionRecord, AreaId, Phase, PlayerId, PlayerMap, MAX_PLAYERS};
use crate::effects::{classify, Branch, CardEffect, EffectResolver, Resolution, ResponseQueue, ResponseStep};
use crate::scoring::{score_one_region, ScoreMode};

use super::state::{GameState, Pending};

impl GameState {
    /// Apply an integer action. Ids outside the current legal set are ignored.
    pub fn apply_action(&mut self, id: ActionId) {
        let Some(action) = self.space.decode(id) else {
            debug!(action = id, "action id out of range, ignored");
            return;
        };
        if !self.is_legal(action) {
            debug!(action = id, phase = %self.turn.phase, "illegal action ignored");
            return;
        }
        let Some(player) = self.current_player() else {
            return;
        };

        trace!(%player, action = %self.describe(id), phase = %self.turn.phase, "apply");
        self.history.push_back(ActionRecord {
            player,
            action: id,
            round: self.turn.round,
            phase: self.turn.phase,
            step: self.turn.step,
        });
        self.turn.step += 1;

        match self.turn.phase {
            Phase::Start => self.apply_start(action, player),
            Phase::Power => self.apply_power(action, player),
            Phase::Action => self.apply_select(action),
            Phase::ActionChoose => self.apply_choose(action),
            Phase::ActionCab1 | Phase::ActionCab2 => self.apply_placement(action),
            Phase::ActionCard1 | Phase::ActionCard2 => self.apply_card(action, player),
            Phase::Response => self.apply_response(action, player),
            Phase::Scoring => self.apply_castillo(action, player),
            Phase::End => {}
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.turn.phase != phase {
            debug!(from = %self.turn.phase, to = %phase, round = self.turn.round, "phase change");
            self.turn.phase = phase;
        }
    }

    fn add_scores(&mut self, deltas: &PlayerMap<i32>) {
        for (player, points) in deltas.iter() {
            self.turn.scores[player] += *points;
        }
    }

    /// Front of the queue moves to the done list.
    fn pop_queue(&mut self) {
        if !self.turn.queue.is_empty() {
            let player = self.turn.queue.remove(0);
            self.turn.done.push(player);
        }
    }

    // === Setup and power ===

    fn apply_start(&mut self, action: Action, player: PlayerId) {
        if let Action::MoveGrande(region) = action {
            self.board.place_grande(&self.config, player, region);
        }
        self.pop_queue();
        if self.turn.queue.is_empty() {
            self.start_round(1, PlayerId(0));
        }
    }

    /// Deal the round's cards and open the power phase at `first`.
    pub(crate) fn start_round(&mut self, round: u8, first: PlayerId) {
        let n = self.player_count();
        self.turn.round = round;
        self.cards.deal(&self.config.cards, round);
        self.turn.queue = first.clockwise(n).collect();
        self.turn.done.clear();
        self.turn.order.clear();
        self.turn.active_card = None;
        self.turn.branch = None;
        self.pending = Pending::Idle;
        debug!(round, first = %first, "round start");
        self.set_phase(Phase::Power);
    }

    fn apply_power(&mut self, action: Action, player: PlayerId) {
        if let Action::SelectPower(power) = action {
            self.cards.play_power(player, power);
            let refill = self.config.power_refill.get(usize::from(power)).copied().unwrap_or(0);
            self.board
                .move_caballeros(self.config.province(), self.config.court(), player, refill);
        }
        self.pop_queue();
        if self.turn.queue.is_empty() {
            self.begin_actions();
        }
    }

    /// Lower power cards act first; players without one act last, in seat order.
    fn begin_actions(&mut self) {
        let mut order: SmallVec<[PlayerId; MAX_PLAYERS]> = self.turn.done.clone();
        order.sort_by_key(|&p| (self.cards.held_by(p).unwrap_or(u8::MAX), p));
        self.turn.order = order.clone();
        self.turn.queue = order;
        self.turn.done.clear();
        self.set_phase(Phase::Action);
    }

    // === Action turns ===

    fn apply_select(&mut self, action: Action) {
        match action {
            Action::SelectCard(card) if self.cards.choose(card) => {
                self.turn.active_card = Some(card);
                self.turn.branch = None;
                self.set_phase(Phase::ActionChoose);
            }
            _ => self.end_turn(),
        }
    }

    fn apply_choose(&mut self, action: Action) {
        match action {
            Action::CabFirst => {
                self.set_phase(Phase::ActionCab1);
                self.begin_placement();
            }
            Action::CardFirst | Action::AltCardFirst => {
                self.pick_branch(action);
                self.set_phase(Phase::ActionCard1);
                self.begin_card();
            }
            _ => {}
        }
    }

    fn pick_branch(&mut self, action: Action) {
        if matches!(self.active_card().map(|c| &c.effect), Some(CardEffect::Choose { .. })) {
            self.turn.branch = Some(if action == Action::AltCardFirst {
                Branch::Second
            } else {
                Branch::First
            });
        }
    }

    fn caballeros_to_place(&self) -> u8 {
        self.active_card().map_or(0, |c| c.caballeros)
    }

    fn begin_placement(&mut self) {
        let Some(active) = self.active_player() else {
            return;
        };
        let tracking = EffectResolver::placement(&self.config, &self.board, active, self.caballeros_to_place());
        if tracking.is_exhausted(&self.board) {
            self.pending = Pending::Idle;
            self.finish_placement();
        } else {
            self.pending = Pending::Moving(tracking);
        }
    }

    fn finish_placement(&mut self) {
        self.pending = Pending::Idle;
        if self.turn.phase == Phase::ActionCab1 {
            self.set_phase(Phase::ActionCard2);
            self.begin_card();
        } else {
            self.end_turn();
        }
    }

    fn apply_placement(&mut self, action: Action) {
        if let Action::MoveCaballero { from, to, player } = action {
            if self.step_move(from, to, player) {
                return;
            }
        }
        self.finish_placement();
    }

    /// Record and apply one tracked move. True while the tracker can continue.
    fn step_move(&mut self, from: AreaId, to: AreaId, player: PlayerId) -> bool {
        let Pending::Moving(tracking) = &mut self.pending else {
            return false;
        };
        if tracking.record(&self.board, from, to, player) {
            self.board.move_caballeros(from, to, player, 1);
        }
        !tracking.is_exhausted(&self.board)
    }

    /// Prepare the card half; choose cards wait for a branch.
    fn begin_card(&mut self) {
        self.pending = Pending::Idle;
        let Some(active) = self.active_player() else {
            return;
        };
        let Some(effect) = self.active_effect().cloned() else {
            self.finish_card();
            return;
        };
        if let (Resolution::Stepwise, CardEffect::Move(mv)) = (classify(&effect), &effect) {
            let tracking = EffectResolver::movement(&self.config, &self.board, mv, active);
            if tracking.is_exhausted(&self.board) {
                self.finish_card();
            } else {
                self.pending = Pending::Moving(tracking);
            }
        }
    }

    fn finish_card(&mut self) {
        self.pending = Pending::Idle;
        if let Some(card) = self.turn.active_card {
            self.cards.finish(card);
        }
        if self.turn.phase == Phase::ActionCard1 {
            self.set_phase(Phase::ActionCab2);
            self.begin_placement();
        } else {
            self.end_turn();
        }
    }

    fn apply_card(&mut self, action: Action, player: PlayerId) {
        if matches!(action, Action::CardFirst | Action::AltCardFirst) {
            self.pick_branch(action);
            self.begin_card();
            return;
        }
        if action == Action::Skip {
            self.finish_card();
            return;
        }
        let Some(effect) = self.active_effect().cloned() else {
            self.finish_card();
            return;
        };

        match (action, &effect) {
            (Action::Trigger, CardEffect::Move(mv)) if classify(&effect) == Resolution::Instant => {
                let moved = EffectResolver::apply_pool_move(&self.config, &mut self.board, mv, player);
                debug!(%player, moved, "pool move");
                self.finish_card();
            }
            (Action::Trigger, CardEffect::Score { selection }) => {
                let deltas = EffectResolver::score_selection(&self.config, &self.board, *selection, None);
                self.add_scores(&deltas);
                self.finish_card();
            }
            (Action::Trigger, _) => {
                let queue =
                    EffectResolver::response(&self.config, &self.board, &effect, player, self.turn.phase, None);
                self.enter_response(queue);
            }
            (Action::ChooseRegion(area), CardEffect::Score { selection }) => {
                let deltas = EffectResolver::score_selection(&self.config, &self.board, *selection, Some(area));
                self.add_scores(&deltas);
                self.finish_card();
            }
            (Action::ChooseRegion(area), CardEffect::Move(_)) => {
                let queue =
                    EffectResolver::response(&self.config, &self.board, &effect, player, self.turn.phase, Some(area));
                self.enter_response(queue);
            }
            (Action::MoveCaballero { from, to, player: owner }, _) => {
                if !self.step_move(from, to, owner) {
                    self.finish_card();
                }
            }
            (Action::RetrievePower(power), _) => {
                self.cards.retrieve_power(player, power);
                self.finish_card();
            }
            (Action::MoveGrande(region), _) => {
                self.board.set_grande(player, region);
                self.finish_card();
            }
            (Action::MoveKing(region), _) => {
                self.board.set_king(region);
                self.finish_card();
            }
            (Action::MoveScoreboard { board, region }, _) => {
                self.board.set_scoreboard(usize::from(board), region);
                self.finish_card();
            }
            _ => self.finish_card(),
        }
    }

    // === Responses ===

    fn enter_response(&mut self, queue: ResponseQueue) {
        let resume = queue.resume_phase;
        let finalize = queue.finalize;
        if queue.is_empty() {
            let deltas = EffectResolver::finalize(&self.config, &mut self.board, finalize);
            self.add_scores(&deltas);
            self.finish_card();
            return;
        }
        debug!(steps = queue.steps.len(), resume = %resume, "awaiting responses");
        self.pending = Pending::AwaitingResponse(queue);
        self.set_phase(Phase::Response);
    }

    fn apply_response(&mut self, action: Action, player: PlayerId) {
        let Pending::AwaitingResponse(queue) = &mut self.pending else {
            return;
        };
        match (action, queue.current_mut()) {
            (Action::ChooseRegion(area), Some(ResponseStep::ChooseRegion { .. })) => {
                self.board.set_secret(player, area);
                queue.advance();
            }
            (Action::MoveCaballero { from, to, player: owner }, Some(ResponseStep::Return { remaining, .. })) => {
                self.board.move_caballeros(from, to, owner, 1);
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 || EffectResolver::return_sources(&self.config, &self.board, owner).is_empty() {
                    queue.advance();
                }
            }
            _ => queue.advance(),
        }

        if queue.is_empty() {
            let finalize = queue.finalize;
            let resume = queue.resume_phase;
            let deltas = EffectResolver::finalize(&self.config, &mut self.board, finalize);
            self.add_scores(&deltas);
            self.set_phase(resume);
            self.finish_card();
        }
    }

    // === Turn, round and scoring ===

    fn end_turn(&mut self) {
        self.turn.active_card = None;
        self.turn.branch = None;
        self.pending = Pending::Idle;
        self.pop_queue();
        if !self.turn.queue.is_empty() {
            self.set_phase(Phase::Action);
            return;
        }

        let round = self.turn.round;
        if self.config.is_scoring_round(round) || round >= self.turn.final_round {
            self.begin_scoring();
        } else {
            self.end_round();
        }
    }

    /// Players with caballeros in the Castillo choose, in action order.
    fn begin_scoring(&mut self) {
        let castillo = self.config.castillo();
        self.turn.queue = self
            .turn
            .order
            .iter()
            .copied()
            .filter(|&p| self.board.count(castillo, p) > 0)
            .collect();
        self.turn.done.clear();
        self.set_phase(Phase::Scoring);
        if self.turn.queue.is_empty() {
            self.complete_scoring();
        }
    }

    fn apply_castillo(&mut self, action: Action, player: PlayerId) {
        if let Action::ChooseRegion(region) = action {
            self.board.set_secret(player, region);
        }
        self.pop_queue();
        if self.turn.queue.is_empty() {
            self.complete_scoring();
        }
    }

    fn complete_scoring(&mut self) {
        let castillo = self.config.castillo();
        let deltas = score_one_region(&self.config, &self.board, castillo, ScoreMode::Full);
        self.add_scores(&deltas);

        for player in PlayerId::all(self.player_count()) {
            if let Some(region) = self.board.secret(player) {
                let all = self.board.count(castillo, player);
                self.board.move_caballeros(castillo, region, player, all);
            }
        }
        self.board.clear_secrets();

        let regions: Vec<AreaId> = self.config.region_ids().collect();
        let deltas = EffectResolver::score_areas(&self.config, &self.board, &regions, ScoreMode::Full);
        self.add_scores(&deltas);
        debug!(round = self.turn.round, scores = ?self.turn.scores.as_slice(), "scoring complete");
        self.end_round();
    }

    fn end_round(&mut self) {
        let first = self.turn.order.first().copied().unwrap_or(PlayerId(0));
        self.cards.end_round(&self.config.cards);
        self.cards.clear_power_holders();

        if self.turn.round >= self.turn.final_round {
            self.turn.queue.clear();
            self.turn.done.clear();
            self.pending = Pending::Idle;
            self.set_phase(Phase::End);
            debug!(scores = ?self.turn.scores.as_slice(), "game over");
        } else {
            self.start_round(self.turn.round + 1, first);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::el_grande::ElGrandeBuilder;
    use crate::rules::SearchGame;

    fn game(players: usize) -> GameState {
        ElGrandeBuilder::new()
            .player_count(players)
            .king(AreaId(1))
            .build(11)
            .unwrap()
    }

    /// Game whose first round deals `name`, past the power phase.
    fn with_card(players: usize, name: &str) -> GameState {
        let config = crate::core::GameConfig::standard();
        let positions: Vec<u8> = config
            .cards
            .iter()
            .map(|(_, c)| if c.name == name { 1 } else { 2 })
            .collect();
        let mut state = ElGrandeBuilder::new()
            .player_count(players)
            .king(AreaId(1))
            .deck_positions(positions)
            .build(11)
            .unwrap();
        for power in 0..players as u8 {
            state.apply(Action::SelectPower(power));
        }
        let idx = state.config().cards.by_name(name).unwrap();
        state.apply(Action::SelectCard(idx));
        state
    }

    #[test]
    fn test_power_refills_court_and_orders_players() {
        let mut state = game(3);
        state.apply(Action::SelectPower(5));
        state.apply(Action::SelectPower(0));
        state.apply(Action::SelectPower(9));

        let court = state.config().court();
        assert_eq!(state.board().count(court, PlayerId(0)), 7 + 3);
        assert_eq!(state.board().count(court, PlayerId(1)), 7 + 6);
        assert_eq!(state.board().count(court, PlayerId(2)), 7 + 1);
        assert_eq!(state.phase(), Phase::Action);
        assert_eq!(state.turn().order.as_slice(), &[PlayerId(1), PlayerId(0), PlayerId(2)]);
        assert_eq!(state.current_player(), Some(PlayerId(1)));
    }

    #[test]
    fn test_players_without_power_card_act_last_in_seat_order() {
        let mut state = game(4);
        state.cards.play_power(PlayerId(2), 3);
        state.cards.play_power(PlayerId(0), 7);
        state.turn.queue.clear();
        state.turn.done = [PlayerId(3), PlayerId(1), PlayerId(0), PlayerId(2)].into_iter().collect();

        state.begin_actions();
        assert_eq!(
            state.turn().order.as_slice(),
            &[PlayerId(2), PlayerId(0), PlayerId(1), PlayerId(3)]
        );
        assert_eq!(state.current_player(), Some(PlayerId(2)));
    }

    #[test]
    fn test_placement_goes_next_to_king() {
        let mut state = with_card(2, "Deck4_Grande_1");
        assert_eq!(state.phase(), Phase::ActionChoose);
        state.apply(Action::CabFirst);
        assert_eq!(state.phase(), Phase::ActionCab1);

        let moves = state.legal_moves();
        let king = state.board().king();
        let castillo = state.config().castillo();
        for action in &moves {
            if let Action::MoveCaballero { to, .. } = *action {
                assert!(to == castillo || state.config().neighbors(king).any(|r| r == to));
            }
        }
        assert!(moves.contains(&Action::Skip));
    }

    #[test]
    fn test_placement_stops_at_card_limit() {
        let mut state = with_card(2, "Deck4_Grande_1");
        let court = state.config().court();
        let castillo = state.config().castillo();
        state.apply(Action::CabFirst);
        for _ in 0..4 {
            state.apply(Action::MoveCaballero { from: court, to: castillo, player: PlayerId(0) });
        }
        assert_eq!(state.board().count(castillo, PlayerId(0)), 4);
        assert_eq!(state.phase(), Phase::ActionCard2);
    }

    #[test]
    fn test_instant_court_to_province() {
        let mut state = with_card(3, "Deck2_Decay");
        let active = state.current_player().unwrap();
        let court = state.config().court();
        let before: Vec<u8> = PlayerId::all(3).map(|p| state.board().count(court, p)).collect();

        state.apply(Action::CardFirst);
        assert_eq!(state.legal_moves(), vec![Action::Trigger, Action::Skip]);
        state.apply(Action::Trigger);

        for p in PlayerId::all(3) {
            let now = state.board().count(court, p);
            if p == active {
                assert_eq!(now, before[p.index()]);
            } else {
                assert_eq!(now, before[p.index()] - 3);
            }
        }
        assert_eq!(state.phase(), Phase::ActionCab2);
    }

    #[test]
    fn test_king_card_moves_king_anywhere() {
        let mut state = with_card(2, "Deck5_King");
        state.apply(Action::CardFirst);
        assert_eq!(state.legal_moves().len(), 8 + 1);
        state.apply(Action::MoveKing(AreaId(6)));
        assert_eq!(state.board().king(), AreaId(6));
        assert_eq!(state.phase(), Phase::ActionCab2);
    }

    #[test]
    fn test_choose_card_alternate_branch() {
        let mut state = with_card(2, "Deck1_Or");
        assert!(state.legal_moves().contains(&Action::AltCardFirst));
        state.apply(Action::AltCardFirst);
        assert_eq!(state.turn().branch, Some(Branch::Second));
        assert!(matches!(state.pending(), Pending::Moving(_)));
        let court = state.config().court();
        for action in state.legal_moves() {
            if let Action::MoveCaballero { from, .. } = action {
                assert_eq!(from, court);
            }
        }
    }

    #[test]
    fn test_choose_card_branch_after_placement() {
        let mut state = with_card(2, "Deck1_Or");
        state.apply(Action::CabFirst);
        state.apply(Action::Skip);
        assert_eq!(state.phase(), Phase::ActionCard2);
        assert_eq!(state.legal_moves(), vec![Action::CardFirst, Action::AltCardFirst]);
        state.apply(Action::CardFirst);
        assert_eq!(state.turn().branch, Some(Branch::First));
    }

    #[test]
    fn test_illegal_action_is_a_no_op() {
        let mut state = game(2);
        let before = state.history().len();
        state.apply(Action::MoveKing(AreaId(3)));
        state.apply_action(state.action_space().size() + 5);
        assert_eq!(state.history().len(), before);
        assert_eq!(state.phase(), Phase::Power);
    }
}
