//! The Castillo distribution subgame.
//!
//! At a scoring round every player with caballeros in the Castillo names a
//! region and moves all of them there. Played in seat order from seat 0,
//! the subgame forecasts where that leaves everyone once the regions are
//! scored.

use smallvec::SmallVec;

use crate::board::KING_MARKER;
use crate::core::{ActionId, PlayerId, PlayerMap, PointTable, SnapshotError, MAX_PLAYERS};
use crate::rules::SearchGame;
use crate::scoring::{returns, score_counts, ScoreMode};

use super::snapshot::CastilloSnapshot;

/// Subgame state. Action `r` places the mover's Castillo caballeros in region `r`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastilloState {
    players: usize,
    rewards: Vec<PointTable>,
    /// 0-based king region.
    king: usize,
    /// Region rows, one count per seat.
    regions: Vec<[u8; MAX_PLAYERS]>,
    castillo: PlayerMap<u8>,
    grandes: PlayerMap<Option<usize>>,
    scores: PlayerMap<i32>,
    current: Option<PlayerId>,
    history: Vec<ActionId>,
}

impl CastilloState {
    pub fn from_snapshot(snap: &CastilloSnapshot) -> Result<Self, SnapshotError> {
        snap.validate()?;
        let n = snap.players;
        let region_count = snap.rewards.len();

        let mut castillo = PlayerMap::with_value(n, 0);
        for seat in PlayerId::all(n) {
            castillo[seat] = snap.cell(0, seat.index())?;
        }
        let mut regions = vec![[0u8; MAX_PLAYERS]; region_count];
        for (r, row) in regions.iter_mut().enumerate() {
            for seat in 0..n {
                row[seat] = snap.cell(r + 1, seat)?;
            }
        }

        let mut state = Self {
            players: n,
            rewards: snap.rewards.clone(),
            king: usize::from(snap.king) - 1,
            regions,
            castillo,
            grandes: PlayerMap::new(n, |p| snap.grandes[p.index()].checked_sub(1).map(usize::from)),
            scores: PlayerMap::new(n, |p| snap.scores[p.index()]),
            current: None,
            history: Vec::new(),
        };
        state.current = state.next_mover(PlayerId(0));
        Ok(state)
    }

    /// First seat from `from` onwards with caballeros left in the Castillo.
    fn next_mover(&self, from: PlayerId) -> Option<PlayerId> {
        from.clockwise(self.players).find(|&p| self.castillo[p] > 0)
    }

    #[must_use]
    pub fn castillo_count(&self, seat: PlayerId) -> u8 {
        self.castillo[seat]
    }

    #[must_use]
    pub fn region_count(&self, region: usize, seat: PlayerId) -> u8 {
        self.regions.get(region).map_or(0, |row| row[seat.index()])
    }

    fn markers(&self, region: usize) -> u8 {
        let mut bits = if region == self.king { KING_MARKER } else { 0 };
        for (p, grande) in self.grandes.iter() {
            if *grande == Some(region) {
                bits |= 1 << (p.index() + 1);
            }
        }
        bits
    }

    /// Running scores plus every region scored as the board stands.
    #[must_use]
    pub fn totals(&self) -> PlayerMap<i32> {
        let mut totals = self.scores.clone();
        for (r, row) in self.regions.iter().enumerate() {
            let points = score_counts(&row[..self.players], self.rewards[r], self.markers(r), ScoreMode::Full);
            for p in PlayerId::all(self.players) {
                totals[p] += points[p.index()];
            }
        }
        totals
    }
}

impl SearchGame for CastilloState {
    fn num_players(&self) -> usize {
        self.players
    }

    fn num_distinct_actions(&self) -> usize {
        self.rewards.len()
    }

    fn current_player(&self) -> Option<PlayerId> {
        self.current
    }

    fn legal_actions(&self) -> Vec<ActionId> {
        if self.current.is_none() {
            return Vec::new();
        }
        (0..self.rewards.len())
            .filter(|&r| r != self.king)
            .map(|r| r as ActionId)
            .collect()
    }

    fn apply_action(&mut self, action: ActionId) {
        let Some(player) = self.current else {
            return;
        };
        let region = action as usize;
        if region >= self.regions.len() || region == self.king {
            return;
        }
        let moving = std::mem::take(&mut self.castillo[player]);
        self.regions[region][player.index()] += moving;
        self.history.push(action);
        self.current = self.next_mover(player.next(self.players));
    }

    fn is_terminal(&self) -> bool {
        self.current.is_none()
    }

    fn returns(&self) -> Vec<f64> {
        if self.is_terminal() {
            returns(self.totals().as_slice())
        } else {
            vec![0.0; self.players]
        }
    }

    fn action_to_string(&self, player: PlayerId, action: ActionId) -> String {
        format!("{player}: Castillo to region {}", action + 1)
    }

    fn history(&self) -> Vec<ActionId> {
        self.history.clone()
    }
}

/// Seats in order of their Castillo moves.
#[must_use]
pub fn movers(state: &CastilloState) -> SmallVec<[PlayerId; MAX_PLAYERS]> {
    PlayerId::all(state.players).filter(|&p| state.castillo[p] > 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(board: &str) -> CastilloSnapshot {
        CastilloSnapshot {
            players: 2,
            rewards: vec![[5, 4, 1], [7, 4, 2], [6, 4, 2], [4, 2, 1], [4, 2, 0], [6, 3, 1], [5, 3, 1], [4, 3, 1], [5, 3, 2]],
            king: 1,
            board: board.into(),
            grandes: vec![2, 3],
            scores: vec![10, 12],
        }
    }

    #[test]
    fn test_king_region_excluded() {
        let state = CastilloState::from_snapshot(&snap("DCAAAAAAAAAAAAAAAAAA")).unwrap();
        assert_eq!(state.current_player(), Some(PlayerId(0)));
        let actions = state.legal_actions();
        assert_eq!(actions.len(), 8);
        assert!(!actions.contains(&0));
    }

    #[test]
    fn test_players_without_castillo_are_skipped() {
        let state = CastilloState::from_snapshot(&snap("ACAAAAAAAAAAAAAAAAAA")).unwrap();
        assert_eq!(state.current_player(), Some(PlayerId(1)));
        assert_eq!(movers(&state).as_slice(), &[PlayerId(1)]);

        let empty = CastilloState::from_snapshot(&snap("AAAAAAAAAAAAAAAAAAAA")).unwrap();
        assert!(empty.is_terminal());
    }

    #[test]
    fn test_play_to_terminal() {
        let mut state = CastilloState::from_snapshot(&snap("DCAAAAAAAAAAAAAAAAAA")).unwrap();
        state.apply_action(1);
        assert_eq!(state.castillo_count(PlayerId(0)), 0);
        assert_eq!(state.region_count(1, PlayerId(0)), 3);
        assert_eq!(state.current_player(), Some(PlayerId(1)));
        assert_eq!(state.returns(), vec![0.0, 0.0]);

        state.apply_action(4);
        assert!(state.is_terminal());

        // seat 0: 7 (first in region 2) + 2 grande bonus + 10; seat 1: 4 + 12
        assert_eq!(state.totals().as_slice(), &[19, 16]);
        let r = state.returns();
        assert!((r[0] + r[1]).abs() < 1e-9);
        assert!(r[0] > 0.0);
    }

    #[test]
    fn test_illegal_action_ignored() {
        let mut state = CastilloState::from_snapshot(&snap("DCAAAAAAAAAAAAAAAAAA")).unwrap();
        let before = state.clone();
        state.apply_action(0);
        state.apply_action(42);
        assert_eq!(state, before);
    }
}
