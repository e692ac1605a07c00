//! Round flow: power order, scoring rounds and the end of the game.

use el_grande::core::{Action, AreaId, Phase, PlayerId};
use el_grande::games::el_grande::{ElGrandeBuilder, GameState};
use el_grande::rules::SearchGame;

/// Decline everything that can be declined; otherwise take the first option.
fn passive_step(state: &mut GameState) {
    let legal = state.legal_moves();
    let action = if legal.contains(&Action::Skip) { Action::Skip } else { legal[0] };
    state.apply(action);
}

fn play_until(state: &mut GameState, done: impl Fn(&GameState) -> bool) {
    let mut guard = 0;
    while !done(state) {
        passive_step(state);
        guard += 1;
        assert!(guard < 10_000);
    }
}

/// Points a lone grande region pays: first place plus the grande bonus.
fn lone_grande_points(state: &GameState, player: PlayerId) -> i32 {
    let grande = state.board().grande(player).unwrap();
    state.config().base_points(grande)[0] + 2
}

#[test]
fn test_scoring_round_returns_to_power() {
    let mut state = ElGrandeBuilder::new().player_count(3).king(AreaId(0)).build(17).unwrap();
    play_until(&mut state, |s| s.round() == 4);

    assert_eq!(state.phase(), Phase::Power);
    assert!(!state.is_terminal());
    for p in PlayerId::all(3) {
        assert_eq!(state.scores()[p], lone_grande_points(&state, p));
    }

    play_until(&mut state, |s| s.round() == 7);
    assert_eq!(state.phase(), Phase::Power);
    for p in PlayerId::all(3) {
        assert_eq!(state.scores()[p], 2 * lone_grande_points(&state, p));
    }
}

#[test]
fn test_round_nine_scoring_ends_the_game() {
    let mut state = ElGrandeBuilder::new().player_count(4).king(AreaId(2)).build(5).unwrap();
    play_until(&mut state, GameState::is_terminal);

    assert_eq!(state.round(), 9);
    assert_eq!(state.phase(), Phase::End);
    for p in PlayerId::all(4) {
        assert_eq!(state.scores()[p], 3 * lone_grande_points(&state, p));
    }
    let returns = state.returns();
    assert!(returns.iter().sum::<f64>().abs() < 1e-9);
}

#[test]
fn test_final_round_option_stops_early() {
    let mut state = ElGrandeBuilder::new().player_count(2).final_round(2).build(5).unwrap();
    play_until(&mut state, GameState::is_terminal);
    assert_eq!(state.round(), 2);
    // the last round scores even off the regular schedule
    for p in PlayerId::all(2) {
        assert_eq!(state.scores()[p], lone_grande_points(&state, p));
    }
}

#[test]
fn test_non_scoring_rounds_go_straight_to_power() {
    let mut state = ElGrandeBuilder::new().player_count(2).build(1).unwrap();
    play_until(&mut state, |s| s.round() == 2);
    assert_eq!(state.phase(), Phase::Power);
    assert!(state.scores().iter().all(|(_, &s)| s == 0));
}

#[test]
fn test_first_actor_starts_next_power_phase() {
    let mut state = ElGrandeBuilder::new().player_count(3).build(9).unwrap();
    // player 0 takes 12, player 1 takes 0, player 2 takes 5
    state.apply(Action::SelectPower(12));
    state.apply(Action::SelectPower(0));
    state.apply(Action::SelectPower(5));
    assert_eq!(state.turn().order.as_slice(), &[PlayerId(1), PlayerId(2), PlayerId(0)]);

    play_until(&mut state, |s| s.round() == 2);
    assert_eq!(state.current_player(), Some(PlayerId(1)));
    // used cards stay unavailable to their owner
    assert!(!state.legal_moves().contains(&Action::SelectPower(0)));
}

#[test]
fn test_castillo_choices_in_action_order() {
    let mut state = ElGrandeBuilder::new()
        .player_count(2)
        .king(AreaId(0))
        .final_round(1)
        .build(4)
        .unwrap();
    state.apply(Action::SelectPower(3));
    state.apply(Action::SelectPower(1));
    // player 1 acts first this round

    let castillo = state.config().castillo();
    let court = state.config().court();
    for _ in 0..2 {
        let player = state.current_player().unwrap();
        let card = state.cards().dealt().next().unwrap();
        state.apply(Action::SelectCard(card));
        state.apply(Action::CabFirst);
        state.apply(Action::MoveCaballero { from: court, to: castillo, player });
        while state.current_player() == Some(player) && state.phase() != Phase::Scoring {
            passive_step(&mut state);
        }
    }

    assert_eq!(state.phase(), Phase::Scoring);
    assert_eq!(state.current_player(), Some(PlayerId(1)));
    let choices = state.legal_moves();
    assert_eq!(choices.len(), 8);
    assert!(!choices.contains(&Action::ChooseRegion(AreaId(0))));

    state.apply(Action::ChooseRegion(AreaId(5)));
    assert_eq!(state.current_player(), Some(PlayerId(0)));
    state.apply(Action::ChooseRegion(AreaId(7)));

    assert!(state.is_terminal());
    assert_eq!(state.board().count(castillo, PlayerId(0)), 0);
    let at_grande = if state.board().grande(PlayerId(1)) == Some(AreaId(5)) { 2 } else { 0 };
    assert_eq!(state.board().count(AreaId(5), PlayerId(1)), 1 + at_grande);
    assert!(state.board().secrets().iter().all(|(_, s)| s.is_none()));
}
