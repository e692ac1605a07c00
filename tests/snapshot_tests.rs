//! Persistence at arbitrary points of a game.

use std::sync::Arc;

use el_grande::core::{GameConfig, GameRng, SnapshotError};
use el_grande::games::el_grande::{ElGrandeBuilder, GameSnapshot, GameState};
use el_grande::rules::SearchGame;
use proptest::prelude::*;

fn advance(state: &mut GameState, rng: &mut GameRng, steps: usize) {
    for _ in 0..steps {
        if state.is_terminal() {
            break;
        }
        let legal = state.legal_actions();
        state.apply_action(*rng.choose(&legal).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn json_resume_matches_live_game(seed in any::<u64>(), players in 2usize..=5, depth in 0usize..400) {
        let mut live = ElGrandeBuilder::new().player_count(players).build(seed).unwrap();
        let mut rng = GameRng::new(seed);
        advance(&mut live, &mut rng, depth);

        let json = live.to_json().unwrap();
        let mut resumed = GameState::from_json(live.config_arc(), &json).unwrap();
        prop_assert_eq!(resumed.to_json().unwrap(), json);
        prop_assert_eq!(resumed.legal_actions(), live.legal_actions());
        prop_assert_eq!(resumed.current_player(), live.current_player());

        // both continue identically under the same policy
        let mut a = GameRng::new(seed ^ 7);
        let mut b = GameRng::new(seed ^ 7);
        advance(&mut live, &mut a, 200);
        advance(&mut resumed, &mut b, 200);
        prop_assert_eq!(resumed.to_json().unwrap(), live.to_json().unwrap());
        prop_assert_eq!(resumed.scores(), live.scores());
    }

    #[test]
    fn binary_image_keeps_history(seed in any::<u64>(), depth in 0usize..400) {
        let mut live = ElGrandeBuilder::new().player_count(4).build(seed).unwrap();
        let mut rng = GameRng::new(seed);
        advance(&mut live, &mut rng, depth);

        let bytes = live.to_bytes().unwrap();
        let resumed = GameState::from_bytes(live.config_arc(), &bytes).unwrap();
        prop_assert_eq!(resumed.history(), live.history());
        prop_assert_eq!(resumed.to_json().unwrap(), live.to_json().unwrap());
    }
}

#[test]
fn test_snapshot_uses_names() {
    let state = ElGrandeBuilder::new().player_names(["Ana", "Bea", "Cai"]).build(1).unwrap();
    let snap = state.to_snapshot();

    assert_eq!(snap.players, vec!["Ana", "Bea", "Cai"]);
    assert_eq!(snap.config, "standard");
    assert!(snap.pieces.contains_key("Bea"));
    assert!(state.area(&snap.king).is_some());
    assert_eq!(snap.turninfo.playersleft.first().map(String::as_str), Some("Ana"));
    assert_eq!(snap.cardinfo.len(), state.config().cards.len());

    let parsed = GameSnapshot::from_json(&snap.to_json().unwrap()).unwrap();
    assert_eq!(parsed, snap);
}

#[test]
fn test_rejects_snapshot_of_another_config() {
    let mut short = GameConfig::standard();
    short.name = "short".into();
    short.rounds = 6;
    short.scoring_rounds = vec![3, 6];
    let short = Arc::new(short);

    let state = ElGrandeBuilder::new().config(short.clone()).build(2).unwrap();
    let json = state.to_json().unwrap();
    assert!(GameState::from_json(short, &json).is_ok());

    let standard = Arc::new(GameConfig::standard());
    assert!(matches!(GameState::from_json(standard.clone(), &json), Err(SnapshotError::Inconsistent(_))));
    let bytes = state.to_bytes().unwrap();
    assert!(GameState::from_bytes(standard, &bytes).is_err());
}

#[test]
fn test_short_config_plays_out() {
    let mut short = GameConfig::standard();
    short.name = "short".into();
    short.rounds = 6;
    short.scoring_rounds = vec![3, 6];

    let mut state = ElGrandeBuilder::new().config(Arc::new(short)).player_count(3).build(9).unwrap();
    let mut rng = GameRng::new(9);
    advance(&mut state, &mut rng, 50_000);
    assert!(state.is_terminal());
    assert_eq!(state.round(), 6);
}

#[test]
fn test_rejects_truncated_image() {
    let state = ElGrandeBuilder::new().build(4).unwrap();
    let bytes = state.to_bytes().unwrap();
    let cut = &bytes[..bytes.len() / 2];
    assert!(matches!(GameState::from_bytes(state.config_arc(), cut), Err(SnapshotError::Binary(_))));
}

#[test]
fn test_rejects_edited_json() {
    let state = ElGrandeBuilder::new().player_count(2).build(6).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&state.to_json().unwrap()).unwrap();
    value["turninfo"]["scores"] = serde_json::json!([0, 0, 0]);
    let edited = value.to_string();
    assert!(GameState::from_json(state.config_arc(), &edited).is_err());
}
