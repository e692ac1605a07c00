use smallvec::SmallVec;

use crate::board::{BoardState, KING_MARKER};
use crate::core::{AreaId, GameConfig, PlayerMap, PointTable, MAX_PLAYERS};

/// Bonus for holding first place where one's grande or the king stands.
pub const FIRST_PLACE_BONUS: i32 = 2;

/// Which ranks pay out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreMode {
    /// Ranks 1 to 3.
    Full,
    /// Rank 1 only.
    FirstOnly,
}

/// Rank of every player in one area; `None` for players with no caballeros.
///
/// ```
/// use el_grande::scoring::rank_players;
///
/// assert_eq!(rank_players(&[3, 3, 1]).as_slice(), &[Some(2), Some(2), Some(3)]);
/// assert_eq!(rank_players(&[0, 4, 2]).as_slice(), &[None, Some(1), Some(2)]);
/// ```
#[must_use]
pub fn rank_players(counts: &[u8]) -> SmallVec<[Option<u8>; MAX_PLAYERS]> {
    counts
        .iter()
        .map(|&mine| {
            (mine > 0).then(|| counts.iter().filter(|&&other| other >= mine).count() as u8)
        })
        .collect()
}

/// Points per player for one area.
///
/// `markers` holds the king bit and one grande bit per player
/// (see [`BoardState::markers`]).
#[must_use]
pub fn score_counts(
    counts: &[u8],
    points: PointTable,
    markers: u8,
    mode: ScoreMode,
) -> SmallVec<[i32; MAX_PLAYERS]> {
    rank_players(counts)
        .iter()
        .enumerate()
        .map(|(p, rank)| match (rank, mode) {
            (Some(1), _) => {
                let mut score = points[0];
                if markers & (1 << (p + 1)) != 0 {
                    score += FIRST_PLACE_BONUS;
                }
                if markers & KING_MARKER != 0 {
                    score += FIRST_PLACE_BONUS;
                }
                score
            }
            (Some(r @ 2..=3), ScoreMode::Full) => points[usize::from(*r) - 1],
            _ => 0,
        })
        .collect()
}

/// Score one region (or the Castillo) with its current point table.
#[must_use]
pub fn score_one_region(
    config: &GameConfig,
    board: &BoardState,
    area: AreaId,
    mode: ScoreMode,
) -> PlayerMap<i32> {
    let scores = score_counts(board.row(area), board.points(config, area), board.markers(area), mode);
    PlayerMap::new(board.player_count(), |p| scores[p.index()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;

    #[test]
    fn test_low_man_tie_rule() {
        assert_eq!(rank_players(&[3, 3, 1]).as_slice(), &[Some(2), Some(2), Some(3)]);
        assert_eq!(rank_players(&[2, 2, 2]).as_slice(), &[Some(3), Some(3), Some(3)]);
        assert_eq!(rank_players(&[5, 1, 1, 0]).as_slice(), &[Some(1), Some(3), Some(3), None]);
    }

    #[test]
    fn test_tied_leaders_get_no_bonus() {
        // grande of player 0 and the king are both here
        let markers = KING_MARKER | 0b10;
        let scores = score_counts(&[3, 3, 1], [5, 3, 1], markers, ScoreMode::Full);
        assert_eq!(scores.as_slice(), &[3, 3, 1]);
    }

    #[test]
    fn test_outright_leader_collects_bonuses() {
        let markers = KING_MARKER | 0b10;
        let scores = score_counts(&[4, 2, 1], [5, 3, 1], markers, ScoreMode::Full);
        assert_eq!(scores.as_slice(), &[9, 3, 1]);
    }

    #[test]
    fn test_fourth_place_scores_nothing() {
        let scores = score_counts(&[4, 3, 2, 1], [6, 4, 2], 0, ScoreMode::Full);
        assert_eq!(scores.as_slice(), &[6, 4, 2, 0]);
    }

    #[test]
    fn test_first_only() {
        let scores = score_counts(&[4, 3, 2], [6, 4, 2], 0, ScoreMode::FirstOnly);
        assert_eq!(scores.as_slice(), &[6, 0, 0]);

        let tied = score_counts(&[3, 3, 2], [6, 4, 2], 0, ScoreMode::FirstOnly);
        assert_eq!(tied.as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn test_two_players_tied_take_second_place() {
        let config = GameConfig::standard();
        let mut board = BoardState::new(&config, 2, AreaId(4));
        // Pais Vasco pays 5/3/1
        let region = AreaId(6);
        board.move_caballeros(config.court(), region, PlayerId(0), 2);
        board.move_caballeros(config.court(), region, PlayerId(1), 2);

        let scores = score_one_region(&config, &board, region, ScoreMode::Full);
        assert_eq!(scores.as_slice(), &[3, 3]);
    }
}
