//! Compact hand-off from the main game to the Castillo subgame.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, PointTable, SnapshotError, MAX_PLAYERS};
use crate::games::el_grande::GameState;

/// Castillo distribution position, seats rotated so the forecasting player is seat 0.
///
/// `board` holds one character per (area, seat): the Castillo first, then
/// every region in order, each `'A' + count`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastilloSnapshot {
    pub players: usize,
    /// Current point table of every region.
    pub rewards: Vec<PointTable>,
    /// King's region, 1-based.
    pub king: u8,
    pub board: String,
    /// Grande region per seat, 1-based; 0 for none.
    pub grandes: Vec<u8>,
    pub scores: Vec<i32>,
}

impl CastilloSnapshot {
    /// Count in `area_row` (0 = Castillo, `r + 1` = region `r`) for `seat`.
    pub(crate) fn cell(&self, area_row: usize, seat: usize) -> Result<u8, SnapshotError> {
        let byte = self
            .board
            .as_bytes()
            .get(area_row * self.players + seat)
            .copied()
            .ok_or_else(|| SnapshotError::Inconsistent("castillo board string too short".into()))?;
        byte.checked_sub(b'A')
            .ok_or_else(|| SnapshotError::OutOfRange(format!("board character {}", byte as char)))
    }

    /// Shape checks before construction.
    pub(crate) fn validate(&self) -> Result<(), SnapshotError> {
        let n = self.players;
        if !(2..=MAX_PLAYERS).contains(&n) {
            return Err(SnapshotError::OutOfRange(format!("{n} players")));
        }
        let regions = self.rewards.len();
        if regions == 0 || self.king == 0 || usize::from(self.king) > regions {
            return Err(SnapshotError::OutOfRange(format!("king region {}", self.king)));
        }
        if !self.board.is_ascii() || self.board.len() != (regions + 1) * n {
            return Err(SnapshotError::Inconsistent(format!(
                "board string of length {} for {} areas and {n} players",
                self.board.len(),
                regions + 1
            )));
        }
        if self.grandes.len() != n || self.scores.len() != n {
            return Err(SnapshotError::Inconsistent("grandes or scores do not match the player count".into()));
        }
        if let Some(&g) = self.grandes.iter().find(|&&g| usize::from(g) > regions) {
            return Err(SnapshotError::OutOfRange(format!("grande region {g}")));
        }
        Ok(())
    }
}

impl GameState {
    /// Castillo choice order rotated to start at `player`.
    ///
    /// Follows this round's action order, the order scoring-round choices
    /// are made in. Before the order is known it falls back to table order.
    #[must_use]
    pub fn castillo_seats(&self, player: PlayerId) -> Vec<PlayerId> {
        let order = &self.turn.order;
        match order.iter().position(|&p| p == player) {
            Some(start) if order.len() == self.player_count() => {
                order[start..].iter().chain(&order[..start]).copied().collect()
            }
            _ => player.clockwise(self.player_count()).collect(),
        }
    }

    /// Castillo position as seen by `player`, who becomes seat 0.
    ///
    /// Seats follow [`castillo_seats`](Self::castillo_seats).
    #[must_use]
    pub fn castillo_snapshot(&self, player: PlayerId) -> CastilloSnapshot {
        let config = self.config();
        let board = self.board();
        let n = self.player_count();
        let seats = self.castillo_seats(player);

        let mut cells = String::with_capacity((config.region_count() + 1) * n);
        for area in std::iter::once(config.castillo()).chain(config.region_ids()) {
            for &p in &seats {
                cells.push(char::from(b'A' + board.count(area, p)));
            }
        }

        CastilloSnapshot {
            players: n,
            rewards: config.region_ids().map(|r| board.points(config, r)).collect(),
            king: board.king().0 + 1,
            board: cells,
            grandes: seats.iter().map(|&p| board.grande(p).map_or(0, |g| g.0 + 1)).collect(),
            scores: seats.iter().map(|&p| self.scores()[p]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, AreaId};
    use crate::games::el_grande::ElGrandeBuilder;

    #[test]
    fn test_snapshot_rotates_seats() {
        let mut state = ElGrandeBuilder::new().player_count(3).king(AreaId(0)).build(4).unwrap();
        let castillo = state.config().castillo();
        let court = state.config().court();
        state.board.move_caballeros(court, castillo, PlayerId(2), 3);
        state.board.move_caballeros(court, castillo, PlayerId(0), 1);

        let snap = state.castillo_snapshot(PlayerId(2));
        assert_eq!(snap.players, 3);
        assert_eq!(snap.king, 1);
        assert_eq!(snap.rewards.len(), 9);
        // Castillo row: seat 0 is player 2, then players 0 and 1
        assert_eq!(&snap.board[..3], "DBA");
        assert_eq!(snap.board.len(), 30);
        assert_eq!(snap.grandes[0], state.board().grande(PlayerId(2)).unwrap().0 + 1);
        snap.validate().unwrap();
    }

    #[test]
    fn test_seats_follow_action_order() {
        let mut state = ElGrandeBuilder::new().player_count(3).king(AreaId(0)).build(4).unwrap();
        // power cards 6, 1 and 10: player 1 acts first, then 0, then 2
        state.apply(Action::SelectPower(5));
        state.apply(Action::SelectPower(0));
        state.apply(Action::SelectPower(9));
        assert_eq!(state.turn().order.as_slice(), &[PlayerId(1), PlayerId(0), PlayerId(2)]);

        let castillo = state.config().castillo();
        let court = state.config().court();
        state.board.move_caballeros(court, castillo, PlayerId(0), 1);
        state.board.move_caballeros(court, castillo, PlayerId(2), 3);

        assert_eq!(state.castillo_seats(PlayerId(1)), vec![PlayerId(1), PlayerId(0), PlayerId(2)]);
        assert_eq!(state.castillo_seats(PlayerId(2)), vec![PlayerId(2), PlayerId(1), PlayerId(0)]);

        let snap = state.castillo_snapshot(PlayerId(1));
        assert_eq!(&snap.board[..3], "ABD");
        let snap = state.castillo_snapshot(PlayerId(2));
        assert_eq!(&snap.board[..3], "DAB");
        assert_eq!(snap.scores.len(), 3);
    }

    #[test]
    fn test_validate_rejects_short_board() {
        let snap = CastilloSnapshot {
            players: 2,
            rewards: vec![[5, 4, 1]; 9],
            king: 3,
            board: "AB".into(),
            grandes: vec![0, 0],
            scores: vec![0, 0],
        };
        assert!(matches!(snap.validate(), Err(SnapshotError::Inconsistent(_))));
    }
}
