//! In-progress multi-step caballero moves.
//!
//! A `MovementTracking` is created when a stepwise effect (or the
//! placement half of a turn) starts and is dropped when it completes.
//! Every `move-one-caballero` action is credited to the first quota
//! pattern that covers its owner and still has room.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::BoardState;
use crate::core::{AreaId, PlayerId};

/// Small set of areas as a bitset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaSet(pub u32);

impl AreaSet {
    #[must_use]
    pub fn single(area: AreaId) -> Self {
        Self(1 << area.0)
    }

    #[must_use]
    pub fn contains(self, area: AreaId) -> bool {
        area.0 < 32 && self.0 & (1 << area.0) != 0
    }

    pub fn insert(&mut self, area: AreaId) {
        if area.0 < 32 {
            self.0 |= 1 << area.0;
        }
    }

    pub fn remove(&mut self, area: AreaId) {
        if area.0 < 32 {
            self.0 &= !(1 << area.0);
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in ascending order.
    pub fn iter(self) -> impl Iterator<Item = AreaId> {
        (0..32u8).filter(move |&i| self.0 & (1 << i) != 0).map(AreaId)
    }
}

impl FromIterator<AreaId> for AreaSet {
    fn from_iter<I: IntoIterator<Item = AreaId>>(iter: I) -> Self {
        let mut set = Self::default();
        for area in iter {
            set.insert(area);
        }
        set
    }
}

/// One quota: whose caballeros, and how many.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPattern {
    /// Bitset of covered players.
    pub players: u8,
    pub min: u8,
    pub max: u8,
    pub moved: u8,
    /// `max` is the covered players' count in the source, fixed when the source locks.
    pub all: bool,
    pub exact: bool,
}

impl QuotaPattern {
    #[must_use]
    pub fn covers(&self, player: PlayerId) -> bool {
        self.players & (1 << player.index()) != 0
    }

    #[must_use]
    pub fn has_room(&self) -> bool {
        self.moved < self.max
    }
}

/// Sub-state of a multi-step move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementTracking {
    pub sources: AreaSet,
    pub destinations: AreaSet,
    /// Every caballero must leave the first source used.
    pub lock_source: bool,
    /// Every caballero must go to the first destination used.
    pub lock_destination: bool,
    pub locked_source: Option<AreaId>,
    pub locked_destination: Option<AreaId>,
    pub patterns: SmallVec<[QuotaPattern; 4]>,
}

impl MovementTracking {
    #[must_use]
    pub fn new(sources: AreaSet, destinations: AreaSet) -> Self {
        Self {
            sources,
            destinations,
            lock_source: false,
            lock_destination: false,
            locked_source: None,
            locked_destination: None,
            patterns: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_source_lock(mut self) -> Self {
        self.lock_source = true;
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: QuotaPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    fn candidate_sources(&self) -> AreaSet {
        self.locked_source.map_or(self.sources, AreaSet::single)
    }

    fn candidate_destinations(&self) -> AreaSet {
        self.locked_destination.map_or(self.destinations, AreaSet::single)
    }

    /// First pattern able to take one more of `player`'s caballeros.
    #[must_use]
    pub fn pattern_for(&self, player: PlayerId) -> Option<usize> {
        self.patterns.iter().position(|p| p.covers(player) && p.has_room())
    }

    /// Whether one move is allowed right now.
    #[must_use]
    pub fn accepts(&self, board: &BoardState, from: AreaId, to: AreaId, player: PlayerId) -> bool {
        from != to
            && self.candidate_sources().contains(from)
            && self.candidate_destinations().contains(to)
            && board.count(from, player) > 0
            && self.pattern_for(player).is_some()
    }

    /// Every allowed single move as (from, to, player).
    #[must_use]
    pub fn legal_moves(&self, board: &BoardState) -> Vec<(AreaId, AreaId, PlayerId)> {
        let mut moves = Vec::new();
        for player in PlayerId::all(board.player_count()) {
            if self.pattern_for(player).is_none() {
                continue;
            }
            for from in self.candidate_sources().iter() {
                if board.count(from, player) == 0 {
                    continue;
                }
                for to in self.candidate_destinations().iter() {
                    if to != from {
                        moves.push((from, to, player));
                    }
                }
            }
        }
        moves
    }

    /// Credit a move (call before the board changes); false if not allowed.
    pub fn record(&mut self, board: &BoardState, from: AreaId, to: AreaId, player: PlayerId) -> bool {
        if !self.accepts(board, from, to, player) {
            return false;
        }
        if self.lock_source && self.locked_source.is_none() {
            self.locked_source = Some(from);
            for pattern in self.patterns.iter_mut().filter(|p| p.all) {
                let available: u32 = PlayerId::all(board.player_count())
                    .filter(|&p| pattern.covers(p))
                    .map(|p| u32::from(board.count(from, p)))
                    .sum();
                pattern.max = available.min(u32::from(u8::MAX - 1)) as u8;
                if pattern.exact {
                    pattern.min = pattern.max;
                }
            }
        }
        if self.lock_destination && self.locked_destination.is_none() {
            self.locked_destination = Some(to);
        }
        match self.pattern_for(player) {
            Some(i) => {
                self.patterns[i].moved += 1;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn minimums_met(&self) -> bool {
        self.patterns.iter().all(|p| p.moved >= p.min)
    }

    /// Every pattern at its maximum.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.patterns.iter().all(|p| !p.has_room())
    }

    /// Nothing more can happen.
    #[must_use]
    pub fn is_exhausted(&self, board: &BoardState) -> bool {
        self.is_full() || self.legal_moves(board).is_empty()
    }

    #[must_use]
    pub fn moved(&self) -> u32 {
        self.patterns.iter().map(|p| u32::from(p.moved)).sum()
    }
}
