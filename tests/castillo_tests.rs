//! The Castillo subgame fed from live positions.

use el_grande::core::{GameRng, Phase, PlayerId};
use el_grande::games::castillo::{movers, CastilloSnapshot, CastilloState};
use el_grande::games::el_grande::{ElGrandeBuilder, GameState};
use el_grande::rules::SearchGame;
use proptest::prelude::*;

/// Random play until the first Castillo scoring decision, if the game reaches one.
fn play_to_scoring(seed: u64, players: usize) -> Option<GameState> {
    let mut state = ElGrandeBuilder::new().player_count(players).build(seed).ok()?;
    let mut rng = GameRng::new(seed);
    while !state.is_terminal() {
        if state.phase() == Phase::Scoring {
            return Some(state);
        }
        let legal = state.legal_actions();
        state.apply_action(*rng.choose(&legal)?);
    }
    None
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn subgame_from_scoring_position(seed in any::<u64>(), players in 2usize..=5) {
        let state = play_to_scoring(seed, players);
        prop_assume!(state.is_some());
        let state = state.unwrap();
        let me = state.current_player().unwrap();

        let snap = state.castillo_snapshot(me);
        prop_assert_eq!(snap.players, players);
        prop_assert_eq!(snap.board.len(), (state.config().region_count() + 1) * players);

        let mut sub = CastilloState::from_snapshot(&snap).unwrap();
        let holders = PlayerId::all(players)
            .filter(|&p| state.castillo_count(p) > 0)
            .count();
        prop_assert_eq!(movers(&sub).len(), holders);
        // the forecasting player is seat 0 and holds Castillo caballeros
        prop_assert_eq!(sub.castillo_count(PlayerId(0)), state.castillo_count(me));

        // subgame movers, mapped back to players, choose in the engine's order
        let seats = state.castillo_seats(me);
        let sequence: Vec<PlayerId> = movers(&sub).iter().map(|s| seats[s.index()]).collect();
        prop_assert_eq!(sequence, state.turn().queue.to_vec());

        let mut rng = GameRng::new(seed ^ 1);
        let mut moves = 0;
        while !sub.is_terminal() {
            let legal = sub.legal_actions();
            prop_assert!(!legal.contains(&u32::from(state.board().king().0)));
            sub.apply_action(*rng.choose(&legal).unwrap());
            moves += 1;
        }
        prop_assert_eq!(moves, holders);
        prop_assert!(PlayerId::all(players).all(|p| sub.castillo_count(p) == 0));

        let returns = sub.returns();
        prop_assert!(returns.iter().sum::<f64>().abs() < 1e-9);
        prop_assert!(returns.iter().all(|r| (-1.0..=1.0).contains(r)));
    }
}

#[test]
fn test_snapshot_json_shape() {
    let state = ElGrandeBuilder::new().player_count(2).build(11).unwrap();
    let snap = state.castillo_snapshot(PlayerId(1));
    let json = serde_json::to_value(&snap).unwrap();

    assert_eq!(json["players"], 2);
    assert_eq!(json["rewards"].as_array().unwrap().len(), 9);
    assert_eq!(json["grandes"].as_array().unwrap().len(), 2);

    let back: CastilloSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn test_fresh_game_has_nobody_to_move() {
    let state = ElGrandeBuilder::new().player_count(3).build(5).unwrap();
    let sub = CastilloState::from_snapshot(&state.castillo_snapshot(PlayerId(0))).unwrap();
    assert!(sub.is_terminal());
    assert!(sub.legal_actions().is_empty());
    // each grande region is held alone and the totals reflect that
    let totals = sub.totals();
    assert!(totals.iter().all(|(_, &t)| t > 0));
}

#[test]
fn test_rejects_bad_board_string() {
    let state = ElGrandeBuilder::new().player_count(2).build(3).unwrap();
    let mut snap = state.castillo_snapshot(PlayerId(0));
    snap.board.pop();
    assert!(CastilloState::from_snapshot(&snap).is_err());

    let mut snap = state.castillo_snapshot(PlayerId(0));
    snap.king = 0;
    assert!(CastilloState::from_snapshot(&snap).is_err());
}
