//! Effect resolution against the board.
//!
//! `EffectResolver` turns typed effects into board changes, score deltas,
//! movement trackers and response queues. It never touches turn order;
//! the game state decides when each piece runs.

use smallvec::SmallVec;

use crate::board::BoardState;
use crate::core::{AreaId, GameConfig, Phase, PlayerId, PlayerMap, MAX_PLAYERS};
use crate::scoring::{score_one_region, ScoreMode};

use super::effect::{CardEffect, Count, Destination, MoveEffect, PlayerFilter, ScoreSelection, Source};
use super::movement::{AreaSet, MovementTracking, QuotaPattern};
use super::response::{Finalize, RegionRule, ResponseQueue, ResponseStep};

/// Stateless resolver over a configuration and a board.
pub struct EffectResolver;

impl EffectResolver {
    // === Scoring ===

    /// Areas covered by an aggregate selection. `SelfChoose` covers nothing.
    #[must_use]
    pub fn selection_areas(config: &GameConfig, board: &BoardState, selection: ScoreSelection) -> Vec<AreaId> {
        let regions = config.region_ids();
        match selection {
            ScoreSelection::Fours => regions.filter(|&r| board.points(config, r)[0] == 4).collect(),
            ScoreSelection::Fives => regions.filter(|&r| board.points(config, r)[0] == 5).collect(),
            ScoreSelection::SixSevens => regions
                .filter(|&r| matches!(board.points(config, r)[0], 6 | 7))
                .collect(),
            ScoreSelection::Castillo => vec![config.castillo()],
            ScoreSelection::FirstsOnly => regions.collect(),
            ScoreSelection::Least | ScoreSelection::Most => {
                let occupied: Vec<(AreaId, u32)> = regions
                    .map(|r| (r, board.area_total(r)))
                    .filter(|&(_, total)| total > 0)
                    .collect();
                let target = if selection == ScoreSelection::Least {
                    occupied.iter().map(|&(_, t)| t).min()
                } else {
                    occupied.iter().map(|&(_, t)| t).max()
                };
                occupied
                    .into_iter()
                    .filter(|&(_, t)| Some(t) == target)
                    .map(|(r, _)| r)
                    .collect()
            }
            ScoreSelection::SelfChoose => Vec::new(),
        }
    }

    /// Sum of region scores over `areas`.
    #[must_use]
    pub fn score_areas(config: &GameConfig, board: &BoardState, areas: &[AreaId], mode: ScoreMode) -> PlayerMap<i32> {
        let mut total = PlayerMap::with_value(board.player_count(), 0);
        for &area in areas {
            for (player, points) in score_one_region(config, board, area, mode).iter() {
                total[player] += *points;
            }
        }
        total
    }

    /// Score a selection; `chosen` is the region picked for `SelfChoose`.
    #[must_use]
    pub fn score_selection(
        config: &GameConfig,
        board: &BoardState,
        selection: ScoreSelection,
        chosen: Option<AreaId>,
    ) -> PlayerMap<i32> {
        let mode = if selection == ScoreSelection::FirstsOnly {
            ScoreMode::FirstOnly
        } else {
            ScoreMode::Full
        };
        let areas = match (selection, chosen) {
            (ScoreSelection::SelfChoose, Some(area)) => vec![area],
            _ => Self::selection_areas(config, board, selection),
        };
        Self::score_areas(config, board, &areas, mode)
    }

    // === Player filters ===

    /// One player bitset per quota pattern the filter produces.
    #[must_use]
    pub fn filter_masks(filter: PlayerFilter, active: PlayerId, player_count: usize) -> SmallVec<[u8; MAX_PLAYERS]> {
        let everyone: u8 = ((1u16 << player_count) - 1) as u8;
        let own: u8 = 1 << active.index();
        match filter {
            PlayerFilter::Own => smallvec::smallvec![own],
            PlayerFilter::Foreign => smallvec::smallvec![everyone & !own],
            PlayerFilter::Any => smallvec::smallvec![everyone],
            PlayerFilter::EachOpponent => active.opponents(player_count).map(|p| 1u8 << p.index()).collect(),
        }
    }

    /// Players a filter affects, in response order: clockwise after the
    /// active player, the active player last when included.
    #[must_use]
    pub fn affected_players(filter: PlayerFilter, active: PlayerId, player_count: usize) -> SmallVec<[PlayerId; MAX_PLAYERS]> {
        match filter {
            PlayerFilter::Own => smallvec::smallvec![active],
            PlayerFilter::Foreign | PlayerFilter::EachOpponent => active.opponents(player_count).collect(),
            PlayerFilter::Any => active.next(player_count).clockwise(player_count).collect(),
        }
    }

    // === Moves ===

    fn pool_area(config: &GameConfig, source: Source) -> Option<AreaId> {
        match source {
            Source::Court => Some(config.court()),
            Source::Province => Some(config.province()),
            _ => None,
        }
    }

    fn fixed_destination(config: &GameConfig, to: Destination) -> Option<AreaId> {
        match to {
            Destination::Court => Some(config.court()),
            Destination::Province => Some(config.province()),
            Destination::Castillo => Some(config.castillo()),
            Destination::Region | Destination::OwnerRegion => None,
        }
    }

    /// Regions and the Castillo, minus the king's region.
    #[must_use]
    pub fn open_areas(config: &GameConfig, board: &BoardState) -> AreaSet {
        let mut set: AreaSet = config.scoring_areas().collect();
        set.remove(board.king());
        set
    }

    /// Move between two fixed pools at once. Returns caballeros moved.
    pub fn apply_pool_move(config: &GameConfig, board: &mut BoardState, mv: &MoveEffect, active: PlayerId) -> u32 {
        let (Some(from), Some(to)) = (Self::pool_area(config, mv.from), Self::fixed_destination(config, mv.to)) else {
            return 0;
        };
        let n = board.player_count();
        let mut moved = 0;
        for quota in &mv.quotas {
            for mask in Self::filter_masks(quota.who, active, n) {
                let mut budget = match quota.count {
                    Count::N(k) => u32::from(k),
                    Count::All => u32::MAX,
                };
                for player in PlayerId::all(n).filter(|p| mask & (1 << p.index()) != 0) {
                    if budget == 0 {
                        break;
                    }
                    let take = budget.min(u32::from(board.count(from, player))) as u8;
                    let done = board.move_caballeros(from, to, player, take);
                    budget -= u32::from(done);
                    moved += u32::from(done);
                }
            }
        }
        moved
    }

    /// Tracker for a caballero-by-caballero move chosen by the active player.
    #[must_use]
    pub fn movement(config: &GameConfig, board: &BoardState, mv: &MoveEffect, active: PlayerId) -> MovementTracking {
        let open = Self::open_areas(config, board);
        let fixed = Self::fixed_destination(config, mv.to);
        let (sources, single) = match mv.from {
            Source::Region { single } => {
                let mut regions = open;
                // pools are refilled from regions, never from the Castillo
                if matches!(mv.to, Destination::Court | Destination::Province) {
                    regions.remove(config.castillo());
                }
                (regions, single)
            }
            other => (Self::pool_area(config, other).map_or(AreaSet::default(), AreaSet::single), false),
        };
        let destinations = fixed.map_or(open, AreaSet::single);

        let mut tracking = MovementTracking::new(sources, destinations);
        if single {
            tracking = tracking.with_source_lock();
        }

        let n = board.player_count();
        for quota in &mv.quotas {
            for mask in Self::filter_masks(quota.who, active, n) {
                let pattern = match quota.count {
                    Count::N(k) => QuotaPattern {
                        players: mask,
                        min: if quota.exact { k } else { 0 },
                        max: k,
                        moved: 0,
                        all: false,
                        exact: quota.exact,
                    },
                    Count::All if single => QuotaPattern {
                        players: mask,
                        min: 0,
                        max: u8::MAX,
                        moved: 0,
                        all: true,
                        exact: quota.exact,
                    },
                    Count::All => {
                        let available: u32 = sources
                            .iter()
                            .flat_map(|area| {
                                PlayerId::all(n)
                                    .filter(move |p| mask & (1 << p.index()) != 0)
                                    .map(move |p| (area, p))
                            })
                            .map(|(area, p)| u32::from(board.count(area, p)))
                            .sum();
                        let max = available.min(u32::from(u8::MAX - 1)) as u8;
                        QuotaPattern {
                            players: mask,
                            min: if quota.exact { max } else { 0 },
                            max,
                            moved: 0,
                            all: false,
                            exact: quota.exact,
                        }
                    }
                };
                tracking = tracking.with_pattern(pattern);
            }
        }
        tracking
    }

    /// Placement from court: regions next to the king, or the Castillo.
    #[must_use]
    pub fn placement(config: &GameConfig, board: &BoardState, active: PlayerId, caballeros: u8) -> MovementTracking {
        let mut destinations: AreaSet = config.neighbors(board.king()).collect();
        destinations.insert(config.castillo());
        MovementTracking::new(AreaSet::single(config.court()), destinations).with_pattern(QuotaPattern {
            players: 1 << active.index(),
            min: 0,
            max: caballeros,
            moved: 0,
            all: false,
            exact: false,
        })
    }

    // === Responses ===

    /// Regions a secret choice may name.
    #[must_use]
    pub fn region_choices(config: &GameConfig, board: &BoardState, rule: RegionRule, player: PlayerId) -> Vec<AreaId> {
        let king = board.king();
        match rule {
            RegionRule::Any => config.scoring_areas().collect(),
            RegionRule::Holding(n) => config
                .region_ids()
                .filter(|&r| r != king && board.count(r, player) >= n.max(1))
                .collect(),
            RegionRule::Except(excluded) => config
                .region_ids()
                .filter(|&r| r != king && r != excluded)
                .collect(),
        }
    }

    /// Where a returning player may take caballeros from: court or regions, never the king's.
    #[must_use]
    pub fn return_sources(config: &GameConfig, board: &BoardState, player: PlayerId) -> Vec<AreaId> {
        std::iter::once(config.court())
            .chain(config.region_ids().filter(|&r| r != board.king()))
            .filter(|&a| board.count(a, player) > 0)
            .collect()
    }

    fn returnable(config: &GameConfig, board: &BoardState, player: PlayerId) -> u32 {
        Self::return_sources(config, board, player)
            .into_iter()
            .map(|a| u32::from(board.count(a, player)))
            .sum()
    }

    /// Queue for an effect answered by other players.
    ///
    /// `source` is the region already named by the active player (eviction).
    /// Players with nothing to decide get no step.
    #[must_use]
    pub fn response(
        config: &GameConfig,
        board: &BoardState,
        effect: &CardEffect,
        active: PlayerId,
        resume_phase: Phase,
        source: Option<AreaId>,
    ) -> ResponseQueue {
        let n = board.player_count();
        match effect {
            CardEffect::UniqueScore => {
                let mut queue = ResponseQueue::new(active, resume_phase, Finalize::UniqueScore);
                for player in Self::affected_players(PlayerFilter::Any, active, n) {
                    queue.push(ResponseStep::ChooseRegion { player, rule: RegionRule::Any });
                }
                queue
            }
            CardEffect::Move(mv) => Self::move_response(config, board, mv, active, resume_phase, source),
            _ => ResponseQueue::new(active, resume_phase, Finalize::Nothing),
        }
    }

    fn move_response(
        config: &GameConfig,
        board: &BoardState,
        mv: &MoveEffect,
        active: PlayerId,
        resume_phase: Phase,
        source: Option<AreaId>,
    ) -> ResponseQueue {
        let n = board.player_count();
        let to = Self::fixed_destination(config, mv.to).unwrap_or_else(|| config.province());
        let Some(quota) = mv.quotas.first() else {
            return ResponseQueue::new(active, resume_phase, Finalize::Nothing);
        };
        let players = Self::affected_players(quota.who, active, n);

        match (mv.from, mv.to, source) {
            (_, Destination::OwnerRegion, Some(from)) => {
                let mut queue = ResponseQueue::new(active, resume_phase, Finalize::Evict { from });
                for player in players.into_iter().filter(|&p| board.count(from, p) > 0) {
                    queue.push(ResponseStep::ChooseRegion { player, rule: RegionRule::Except(from) });
                }
                queue
            }
            (Source::OwnerRegion { at_least }, _, _) => {
                let count = match quota.count {
                    Count::N(k) => Some(k),
                    Count::All => None,
                };
                let mut queue = ResponseQueue::new(active, resume_phase, Finalize::ReturnFromChosen { count, to });
                let rule = RegionRule::Holding(at_least);
                for player in players {
                    if !Self::region_choices(config, board, rule, player).is_empty() {
                        queue.push(ResponseStep::ChooseRegion { player, rule });
                    }
                }
                queue
            }
            (Source::OwnerCourtOrRegion, _, _) => {
                let mut queue = ResponseQueue::new(active, resume_phase, Finalize::Nothing);
                for player in players {
                    let available = Self::returnable(config, board, player);
                    let wanted = match quota.count {
                        Count::N(k) => u32::from(k),
                        Count::All => available,
                    };
                    let remaining = wanted.min(available).min(u32::from(u8::MAX)) as u8;
                    if remaining > 0 {
                        queue.push(ResponseStep::Return { player, remaining, to });
                    }
                }
                queue
            }
            _ => ResponseQueue::new(active, resume_phase, Finalize::Nothing),
        }
    }

    /// Run a finalize routine on the recorded secret choices, then clear them.
    /// Returns score deltas.
    pub fn finalize(config: &GameConfig, board: &mut BoardState, finalize: Finalize) -> PlayerMap<i32> {
        let n = board.player_count();
        let mut deltas = PlayerMap::with_value(n, 0);
        let choices: SmallVec<[(PlayerId, AreaId); MAX_PLAYERS]> = board
            .secrets()
            .iter()
            .filter_map(|(p, c)| c.map(|area| (p, area)))
            .collect();

        match finalize {
            Finalize::Nothing => {}
            Finalize::Evict { from } => {
                for &(player, to) in &choices {
                    let all = board.count(from, player);
                    board.move_caballeros(from, to, player, all);
                }
            }
            Finalize::ReturnFromChosen { count, to } => {
                for &(player, from) in &choices {
                    let take = count.unwrap_or_else(|| board.count(from, player));
                    board.move_caballeros(from, to, player, take);
                }
            }
            Finalize::UniqueScore => {
                for &(player, area) in &choices {
                    let named = choices.iter().filter(|&&(_, other)| other == area).count();
                    if named == 1 {
                        deltas[player] += score_one_region(config, board, area, ScoreMode::Full)[player];
                    }
                }
            }
        }

        board.clear_secrets();
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Quota;

    fn setup(players: usize) -> (GameConfig, BoardState) {
        let config = GameConfig::standard();
        let board = BoardState::new(&config, players, AreaId(1));
        (config, board)
    }

    #[test]
    fn test_selection_areas_by_points() {
        let (config, board) = setup(3);
        let fours = EffectResolver::selection_areas(&config, &board, ScoreSelection::Fours);
        assert_eq!(fours, vec![AreaId(3), AreaId(4), AreaId(7)]);

        let big = EffectResolver::selection_areas(&config, &board, ScoreSelection::SixSevens);
        assert_eq!(big, vec![AreaId(1), AreaId(2), AreaId(5)]);
    }

    #[test]
    fn test_scoreboard_changes_selection() {
        let (config, mut board) = setup(3);
        // 4/0/0 board on Valencia makes it a four
        board.set_scoreboard(0, AreaId(8));
        let fours = EffectResolver::selection_areas(&config, &board, ScoreSelection::Fours);
        assert!(fours.contains(&AreaId(8)));
        let fives = EffectResolver::selection_areas(&config, &board, ScoreSelection::Fives);
        assert!(!fives.contains(&AreaId(8)));
    }

    #[test]
    fn test_least_and_most_ignore_empty_regions() {
        let (config, mut board) = setup(2);
        board.move_caballeros(config.court(), AreaId(0), PlayerId(0), 3);
        board.move_caballeros(config.court(), AreaId(3), PlayerId(1), 1);
        board.move_caballeros(config.court(), AreaId(6), PlayerId(1), 1);

        let least = EffectResolver::selection_areas(&config, &board, ScoreSelection::Least);
        assert_eq!(least, vec![AreaId(3), AreaId(6)]);
        let most = EffectResolver::selection_areas(&config, &board, ScoreSelection::Most);
        assert_eq!(most, vec![AreaId(0)]);
    }

    #[test]
    fn test_pool_move_each_opponent() {
        let (config, mut board) = setup(3);
        let decay = MoveEffect {
            from: Source::Court,
            to: Destination::Province,
            quotas: vec![Quota::exactly(PlayerFilter::EachOpponent, 3)],
        };

        let moved = EffectResolver::apply_pool_move(&config, &mut board, &decay, PlayerId(0));
        assert_eq!(moved, 6);
        assert_eq!(board.count(config.court(), PlayerId(0)), 7);
        assert_eq!(board.count(config.court(), PlayerId(1)), 4);
        assert_eq!(board.count(config.court(), PlayerId(2)), 4);
    }

    #[test]
    fn test_region_to_province_skips_castillo() {
        let (config, mut board) = setup(3);
        board.move_caballeros(config.court(), config.castillo(), PlayerId(1), 2);
        board.move_caballeros(config.court(), AreaId(4), PlayerId(1), 1);
        board.move_caballeros(config.court(), AreaId(6), PlayerId(2), 1);
        let banish = MoveEffect {
            from: Source::Region { single: false },
            to: Destination::Province,
            quotas: vec![Quota::up_to(PlayerFilter::EachOpponent, 1)],
        };

        let tracking = EffectResolver::movement(&config, &board, &banish, PlayerId(0));
        assert!(!tracking.sources.contains(config.castillo()));
        let moves = tracking.legal_moves(&board);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|&(from, to, _)| from != config.castillo() && to == config.province()));
        assert!(moves.contains(&(AreaId(4), config.province(), PlayerId(1))));
        assert!(moves.contains(&(AreaId(6), config.province(), PlayerId(2))));
    }

    #[test]
    fn test_placement_targets() {
        let (config, board) = setup(2);
        let tracking = EffectResolver::placement(&config, &board, PlayerId(0), 3);
        let moves = tracking.legal_moves(&board);

        // king in Castilla la Nueva: five neighbors plus the Castillo
        assert_eq!(moves.len(), 6);
        assert!(moves.iter().all(|&(from, _, p)| from == config.court() && p == PlayerId(0)));
        assert!(moves.iter().all(|&(_, to, _)| to != AreaId(1)));
    }

    #[test]
    fn test_stepwise_excludes_king_region() {
        let (config, mut board) = setup(2);
        board.move_caballeros(config.court(), AreaId(1), PlayerId(0), 2);
        board.move_caballeros(config.court(), AreaId(0), PlayerId(0), 2);
        let mv = MoveEffect {
            from: Source::Region { single: false },
            to: Destination::Region,
            quotas: vec![Quota::up_to(PlayerFilter::Own, 4)],
        };

        let tracking = EffectResolver::movement(&config, &board, &mv, PlayerId(0));
        let moves = tracking.legal_moves(&board);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|&(from, to, _)| from != AreaId(1) && to != AreaId(1)));
    }

    #[test]
    fn test_angry_king_queue() {
        let (config, mut board) = setup(3);
        // player 2 has nothing to return
        board.move_caballeros(config.court(), config.province(), PlayerId(2), 7);
        let angry = CardEffect::moving(
            Source::OwnerCourtOrRegion,
            Destination::Province,
            vec![Quota::exactly(PlayerFilter::EachOpponent, 3)],
        );

        let queue = EffectResolver::response(&config, &board, &angry, PlayerId(0), Phase::ActionCard1, None);
        assert_eq!(queue.steps.len(), 1);
        assert_eq!(
            queue.steps[0],
            ResponseStep::Return { player: PlayerId(1), remaining: 3, to: config.province() }
        );
    }

    #[test]
    fn test_unique_score_finalize() {
        let (config, mut board) = setup(3);
        board.move_caballeros(config.court(), AreaId(0), PlayerId(0), 2);
        board.move_caballeros(config.court(), AreaId(3), PlayerId(1), 1);
        board.move_caballeros(config.court(), AreaId(3), PlayerId(2), 2);
        board.set_secret(PlayerId(0), AreaId(0));
        board.set_secret(PlayerId(1), AreaId(3));
        board.set_secret(PlayerId(2), AreaId(3));

        let deltas = EffectResolver::finalize(&config, &mut board, Finalize::UniqueScore);
        assert_eq!(deltas.as_slice(), &[5, 0, 0]);
        assert_eq!(board.secret(PlayerId(0)), None);
    }

    #[test]
    fn test_evict_finalize() {
        let (config, mut board) = setup(3);
        board.move_caballeros(config.court(), AreaId(5), PlayerId(1), 3);
        board.set_secret(PlayerId(1), AreaId(7));

        EffectResolver::finalize(&config, &mut board, Finalize::Evict { from: AreaId(5) });
        assert_eq!(board.count(AreaId(5), PlayerId(1)), 0);
        assert_eq!(board.count(AreaId(7), PlayerId(1)), 3);
    }
}
