//! The flat action encoding across table sizes.

use el_grande::core::{Action, ActionSpace, AreaId, GameConfig, PlayerId};
use el_grande::games::el_grande::ElGrandeBuilder;
use el_grande::rules::SearchGame;

#[test]
fn test_every_id_decodes_and_encodes_back() {
    let config = GameConfig::standard();
    for players in 2..=5 {
        let space = ActionSpace::new(&config, players);
        for id in 0..space.size() {
            let action = space.decode(id).unwrap_or_else(|| panic!("id {id} has no action"));
            assert_eq!(space.encode(action), Some(id), "{action:?} with {players} players");
        }
        assert_eq!(space.decode(space.size()), None);
    }
}

#[test]
fn test_standard_layout() {
    let config = GameConfig::standard();
    let space = ActionSpace::new(&config, 4);

    assert_eq!(space.encode(Action::SelectPower(0)), Some(43));
    assert_eq!(space.encode(Action::RetrievePower(0)), Some(56));
    assert_eq!(space.encode(Action::CabFirst), Some(69));
    assert_eq!(space.encode(Action::AltCardFirst), Some(71));
    assert_eq!(space.encode(Action::ChooseRegion(AreaId(0))), Some(72));
    assert_eq!(space.encode(Action::MoveGrande(AreaId(0))), Some(82));
    assert_eq!(space.encode(Action::MoveKing(AreaId(0))), Some(91));
    assert_eq!(space.encode(Action::MoveScoreboard { board: 0, region: AreaId(0) }), Some(100));
    let first_move = Action::MoveCaballero { from: AreaId(0), to: AreaId(0), player: PlayerId(0) };
    assert_eq!(space.encode(first_move), Some(120));
    assert_eq!(space.skip_id(), 696);
    assert_eq!(space.trigger_id(), 697);
    assert_eq!(space.size(), 698);
}

#[test]
fn test_move_ids_follow_the_formula() {
    let config = GameConfig::standard();
    let space = ActionSpace::new(&config, 3);
    let base = space.encode(Action::MoveCaballero { from: AreaId(0), to: AreaId(0), player: PlayerId(0) }).unwrap();
    let areas = config.area_count() as u32;

    let mv = Action::MoveCaballero { from: AreaId(10), to: AreaId(6), player: PlayerId(2) };
    assert_eq!(space.encode(mv), Some(base + 2 + 3 * (6 + areas * 10)));
}

#[test]
fn test_out_of_layout_actions_do_not_encode() {
    let config = GameConfig::standard();
    let space = ActionSpace::new(&config, 2);

    assert_eq!(space.encode(Action::SelectPower(13)), None);
    assert_eq!(space.encode(Action::MoveKing(AreaId(9))), None);
    assert_eq!(space.encode(Action::ChooseRegion(AreaId(10))), None);
    assert_eq!(space.encode(Action::MoveScoreboard { board: 2, region: AreaId(0) }), None);
    let ghost = Action::MoveCaballero { from: AreaId(0), to: AreaId(1), player: PlayerId(2) };
    assert_eq!(space.encode(ghost), None);
}

#[test]
fn test_game_reports_the_same_space() {
    for players in 2..=5 {
        let state = ElGrandeBuilder::new().player_count(players).build(players as u64).unwrap();
        let space = ActionSpace::new(state.config(), players);
        assert_eq!(state.num_distinct_actions(), space.size() as usize);
        assert_eq!(state.legal_actions_mask().len(), space.size() as usize);
        assert!(state.legal_actions().iter().all(|&id| id < space.size()));
    }
}
