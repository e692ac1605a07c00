use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{AreaId, GameConfig, PlayerId, PlayerMap, PointTable, MAX_PLAYERS};

/// Bit for the king in [`BoardState::markers`]; grande of player `p` is bit `p + 1`.
pub const KING_MARKER: u8 = 1;

/// Caballero counts and markers.
///
/// ## Example
///
/// ```
/// use el_grande::board::BoardState;
/// use el_grande::core::{AreaId, GameConfig, PlayerId};
///
/// let config = GameConfig::standard();
/// let mut board = BoardState::new(&config, 3, AreaId(1));
///
/// board.place_grande(&config, PlayerId(0), AreaId(4));
/// assert_eq!(board.count(AreaId(4), PlayerId(0)), 2);
/// assert_eq!(board.count(config.court(), PlayerId(0)), 7);
/// assert_eq!(board.player_total(PlayerId(0)), 30);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    player_count: u8,
    counts: Vector<[u8; MAX_PLAYERS]>,
    grandes: PlayerMap<Option<AreaId>>,
    king: AreaId,
    scoreboards: SmallVec<[Option<AreaId>; 4]>,
    secret: PlayerMap<Option<AreaId>>,
}

impl BoardState {
    /// Empty board with every caballero in court or province and no grandes.
    #[must_use]
    pub fn new(config: &GameConfig, player_count: usize, king: AreaId) -> Self {
        let mut counts: Vector<[u8; MAX_PLAYERS]> = (0..config.area_count()).map(|_| [0; MAX_PLAYERS]).collect();
        let mut court = [0; MAX_PLAYERS];
        let mut province = [0; MAX_PLAYERS];
        for p in 0..player_count {
            court[p] = config.pieces.court;
            province[p] = config.pieces.total - config.pieces.court;
        }
        counts.set(config.court().index(), court);
        counts.set(config.province().index(), province);

        Self {
            player_count: player_count as u8,
            counts,
            grandes: PlayerMap::with_value(player_count, None),
            king,
            scoreboards: (0..config.scoreboards.len()).map(|_| None).collect(),
            secret: PlayerMap::with_value(player_count, None),
        }
    }

    /// Board from explicit rows, one per area.
    #[must_use]
    pub fn from_parts(
        rows: Vec<[u8; MAX_PLAYERS]>,
        grandes: PlayerMap<Option<AreaId>>,
        king: AreaId,
        scoreboards: SmallVec<[Option<AreaId>; 4]>,
    ) -> Self {
        let player_count = grandes.player_count();
        Self {
            player_count: player_count as u8,
            counts: rows.into_iter().collect(),
            grandes,
            king,
            scoreboards,
            secret: PlayerMap::with_value(player_count, None),
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count as usize
    }

    /// Grande and secret-disc maps cover every seat.
    #[must_use]
    pub fn seats_consistent(&self) -> bool {
        self.grandes.player_count() == self.player_count() && self.secret.player_count() == self.player_count()
    }

    #[must_use]
    pub fn count(&self, area: AreaId, player: PlayerId) -> u8 {
        self.counts.get(area.index()).map_or(0, |row| row[player.index()])
    }

    /// Counts of every player in one area.
    #[must_use]
    pub fn row(&self, area: AreaId) -> &[u8] {
        self.counts
            .get(area.index())
            .map_or(&[][..], |row| &row[..self.player_count()])
    }

    /// Caballeros of all players in one area.
    #[must_use]
    pub fn area_total(&self, area: AreaId) -> u32 {
        self.row(area).iter().map(|&c| u32::from(c)).sum()
    }

    /// Caballeros of one player across every area and pool.
    #[must_use]
    pub fn player_total(&self, player: PlayerId) -> u32 {
        self.counts.iter().map(|row| u32::from(row[player.index()])).sum()
    }

    /// Move up to `n` caballeros; returns how many actually moved.
    pub fn move_caballeros(&mut self, from: AreaId, to: AreaId, player: PlayerId, n: u8) -> u8 {
        let p = player.index();
        let available = self.count(from, player);
        let moved = n.min(available);
        if moved == 0 || from == to || to.index() >= self.counts.len() {
            return 0;
        }
        if let Some(row) = self.counts.get_mut(from.index()) {
            row[p] -= moved;
        }
        if let Some(row) = self.counts.get_mut(to.index()) {
            row[p] += moved;
        }
        moved
    }

    /// Put `player`'s grande on `region` with the starting caballeros from province.
    pub fn place_grande(&mut self, config: &GameConfig, player: PlayerId, region: AreaId) {
        self.grandes[player] = Some(region);
        self.move_caballeros(config.province(), region, player, config.pieces.grande);
    }

    #[must_use]
    pub fn grande(&self, player: PlayerId) -> Option<AreaId> {
        self.grandes[player]
    }

    pub fn set_grande(&mut self, player: PlayerId, region: AreaId) {
        self.grandes[player] = Some(region);
    }

    #[must_use]
    pub fn king(&self) -> AreaId {
        self.king
    }

    pub fn set_king(&mut self, region: AreaId) {
        self.king = region;
    }

    /// King and grande bits for one area.
    #[must_use]
    pub fn markers(&self, area: AreaId) -> u8 {
        let mut bits = if self.king == area { KING_MARKER } else { 0 };
        for (player, grande) in self.grandes.iter() {
            if *grande == Some(area) {
                bits |= 1 << (player.index() + 1);
            }
        }
        bits
    }

    #[must_use]
    pub fn scoreboard(&self, board: usize) -> Option<AreaId> {
        self.scoreboards.get(board).copied().flatten()
    }

    pub fn scoreboards(&self) -> &[Option<AreaId>] {
        &self.scoreboards
    }

    pub fn set_scoreboard(&mut self, board: usize, area: AreaId) {
        if let Some(slot) = self.scoreboards.get_mut(board) {
            *slot = Some(area);
        }
    }

    /// Scoreboard lying on `area`, if any.
    #[must_use]
    pub fn scoreboard_on(&self, area: AreaId) -> Option<usize> {
        self.scoreboards.iter().position(|&s| s == Some(area))
    }

    /// Current point table of a region or the Castillo.
    #[must_use]
    pub fn points(&self, config: &GameConfig, area: AreaId) -> PointTable {
        match self.scoreboard_on(area).and_then(|b| config.scoreboards.get(b)) {
            Some(&points) => points,
            None => config.base_points(area),
        }
    }

    #[must_use]
    pub fn secret(&self, player: PlayerId) -> Option<AreaId> {
        self.secret[player]
    }

    pub fn set_secret(&mut self, player: PlayerId, area: AreaId) {
        self.secret[player] = Some(area);
    }

    pub fn clear_secrets(&mut self) {
        for (_, choice) in self.secret.iter_mut() {
            *choice = None;
        }
    }

    /// All secret-disc choices in seat order.
    pub fn secrets(&self) -> &PlayerMap<Option<AreaId>> {
        &self.secret
    }
}
