//! Persistence: a JSON snapshot keyed by names, and a bincode state image.
//!
//! The JSON form is what external tools read and write. Loading validates
//! everything up front and either yields a complete state or an error;
//! nothing is partially applied.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::BoardState;
use crate::cards::{CardState, CardStatus};
use crate::core::{
    ActionRecord, ActionSpace, AreaId, GameConfig, Phase, PlayerId, PlayerMap, PointTable, SnapshotError,
    MAX_PLAYERS,
};
use crate::effects::{Branch, MovementTracking, ResponseQueue};

use super::state::{GameState, Pending, TurnState};

/// Where one player's caballeros are.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceInfo {
    #[serde(default)]
    pub grande: Option<String>,
    /// Area name to caballero count.
    #[serde(flatten)]
    pub counts: BTreeMap<String, u8>,
}

/// Lifecycle entry of one action card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub status: CardStatus,
    /// Round the card was dealt in; 0 if never.
    #[serde(default)]
    pub round: u8,
}

/// Round, phase and in-flight sub-states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInfo {
    pub round: u8,
    #[serde(default)]
    pub final_round: Option<u8>,
    pub phase: Phase,
    pub scores: Vec<i32>,
    pub playersleft: Vec<String>,
    #[serde(default)]
    pub playersdone: Vec<String>,
    #[serde(default)]
    pub order: Vec<String>,
    /// Secret region per player, in seat order.
    #[serde(default)]
    pub secret: Vec<Option<String>>,
    #[serde(default)]
    pub step: u32,
    #[serde(default)]
    pub activecard: Option<String>,
    #[serde(default)]
    pub branch: Option<Branch>,
    #[serde(default)]
    pub movement: Option<MovementTracking>,
    #[serde(default)]
    pub response: Option<ResponseQueue>,
}

/// Name-keyed snapshot of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: Vec<String>,
    pub king: String,
    pub pieces: BTreeMap<String, PieceInfo>,
    /// Card name to the round its deck deals it.
    pub cardinfo: BTreeMap<String, u8>,
    /// Power card (1-based) each player holds this round.
    #[serde(default)]
    pub cards: BTreeMap<String, Option<u8>>,
    /// Power cards (1-based) each player has used and not retrieved.
    #[serde(default)]
    pub pastcards: BTreeMap<String, Vec<u8>>,
    #[serde(default)]
    pub deckpositions: BTreeMap<String, DeckEntry>,
    pub turninfo: TurnInfo,
    /// Current point table of every region and the Castillo.
    #[serde(default)]
    pub pointinfo: BTreeMap<String, PointTable>,
    /// Area each scoreboard lies on; inferred from `pointinfo` when absent.
    #[serde(default)]
    pub scoreboards: Option<Vec<Option<String>>>,
    /// Name of the configuration the snapshot belongs to.
    pub config: String,
}

impl GameSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Everything needed to resume a live state, for the binary image.
#[derive(Serialize, Deserialize)]
struct StateImage {
    config: String,
    names: Vec<String>,
    board: BoardState,
    cards: CardState,
    turn: TurnState,
    pending: Pending,
    history: Vec<ActionRecord>,
}

fn bits_to_cards(bits: u16) -> Vec<u8> {
    (0..16u8).filter(|&k| bits & (1 << k) != 0).map(|k| k + 1).collect()
}

impl GameState {
    // === Export ===

    #[must_use]
    pub fn to_snapshot(&self) -> GameSnapshot {
        let config = &self.config;
        let n = self.player_count();
        let name = |p: PlayerId| self.player_name(p).to_string();
        let area = |a: AreaId| config.area_name(a).to_string();

        let pieces = PlayerId::all(n)
            .map(|p| {
                let info = PieceInfo {
                    grande: self.board.grande(p).map(area),
                    counts: config.area_ids().map(|a| (area(a), self.board.count(a, p))).collect(),
                };
                (name(p), info)
            })
            .collect();

        let cardinfo = config
            .cards
            .iter()
            .map(|(idx, card)| (card.name.clone(), self.cards.position(idx)))
            .collect();
        let deckpositions = config
            .cards
            .iter()
            .map(|(idx, card)| {
                let entry = DeckEntry {
                    status: self.cards.status(idx),
                    round: self.cards.dealt_round(idx),
                };
                (card.name.clone(), entry)
            })
            .collect();

        let names_of = |players: &[PlayerId]| players.iter().map(|&p| name(p)).collect::<Vec<_>>();
        let (movement, response) = match &self.pending {
            Pending::Idle => (None, None),
            Pending::Moving(tracking) => (Some(tracking.clone()), None),
            Pending::AwaitingResponse(queue) => (None, Some(queue.clone())),
        };
        let turninfo = TurnInfo {
            round: self.turn.round,
            final_round: Some(self.turn.final_round),
            phase: self.turn.phase,
            scores: self.turn.scores.as_slice().to_vec(),
            playersleft: names_of(&self.turn.queue),
            playersdone: names_of(&self.turn.done),
            order: names_of(&self.turn.order),
            secret: PlayerId::all(n).map(|p| self.board.secret(p).map(area)).collect(),
            step: self.turn.step,
            activecard: self.active_card().map(|c| c.name.clone()),
            branch: self.turn.branch,
            movement,
            response,
        };

        GameSnapshot {
            players: self.names.to_vec(),
            king: area(self.board.king()),
            pieces,
            cardinfo,
            cards: PlayerId::all(n).map(|p| (name(p), self.cards.held_by(p).map(|k| k + 1))).collect(),
            pastcards: PlayerId::all(n)
                .map(|p| (name(p), bits_to_cards(self.cards.power_used(p))))
                .collect(),
            deckpositions,
            turninfo,
            pointinfo: config
                .scoring_areas()
                .map(|a| (area(a), self.board.points(config, a)))
                .collect(),
            scoreboards: Some(self.board.scoreboards().iter().map(|s| s.map(area)).collect()),
            config: config.name.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        self.to_snapshot().to_json()
    }

    /// Binary image of the full state, history included.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let image = StateImage {
            config: self.config.name.clone(),
            names: self.names.to_vec(),
            board: self.board.clone(),
            cards: self.cards.clone(),
            turn: self.turn.clone(),
            pending: self.pending.clone(),
            history: self.history.iter().cloned().collect(),
        };
        Ok(bincode::serialize(&image)?)
    }

    // === Import ===

    pub fn from_json(config: Arc<GameConfig>, json: &str) -> Result<Self, SnapshotError> {
        Self::from_snapshot(config, &GameSnapshot::from_json(json)?)
    }

    pub fn from_bytes(config: Arc<GameConfig>, bytes: &[u8]) -> Result<Self, SnapshotError> {
        config.validate()?;
        let image: StateImage = bincode::deserialize(bytes)?;
        if image.config != config.name {
            return Err(SnapshotError::Inconsistent(format!(
                "state belongs to config {}, not {}",
                image.config, config.name
            )));
        }
        let state = Self {
            space: ActionSpace::new(&config, image.names.len()),
            names: Arc::new(image.names),
            board: image.board,
            cards: image.cards,
            turn: image.turn,
            pending: image.pending,
            history: image.history.into_iter().collect(),
            config,
        };
        state.check()?;
        Ok(state)
    }

    /// Build a state from a snapshot, validating every field.
    pub fn from_snapshot(config: Arc<GameConfig>, snap: &GameSnapshot) -> Result<Self, SnapshotError> {
        config.validate()?;
        if snap.config != config.name {
            return Err(SnapshotError::Inconsistent(format!(
                "snapshot belongs to config {}, not {}",
                snap.config, config.name
            )));
        }
        let loader = Loader { config: &config, players: &snap.players };
        let n = loader.player_count()?;

        // board
        let king = loader.region(&snap.king)?;
        let mut rows = vec![[0u8; MAX_PLAYERS]; config.area_count()];
        let mut grandes = PlayerMap::with_value(n, None);
        for key in snap.pieces.keys() {
            loader.player(key)?;
        }
        for player in PlayerId::all(n) {
            let name = &snap.players[player.index()];
            let info = snap.pieces.get(name).ok_or_else(|| SnapshotError::MissingPieces(name.clone()))?;
            let mut total = 0u32;
            for (area_name, &count) in &info.counts {
                let area = loader.area(area_name)?;
                rows[area.index()][player.index()] = count;
                total += u32::from(count);
            }
            let expected = u32::from(config.pieces.total);
            if total != expected {
                return Err(SnapshotError::PieceTotal { player: name.clone(), expected, found: total });
            }
            if let Some(grande) = &info.grande {
                grandes[player] = Some(loader.region(grande)?);
            }
        }
        let scoreboards = loader.scoreboards(snap)?;
        let mut board = BoardState::from_parts(rows, grandes, king, scoreboards);
        for (area_name, table) in &snap.pointinfo {
            let area = loader.area(area_name)?;
            if !config.is_scoring_area(area) {
                return Err(SnapshotError::OutOfRange(format!("point table for {area_name}")));
            }
            if board.points(&config, area) != *table {
                return Err(SnapshotError::Inconsistent(format!("point table of {area_name}")));
            }
        }

        // cards
        let cards = loader.cards(snap, n)?;

        // turn
        let info = &snap.turninfo;
        if info.round == 0 || info.round > config.rounds {
            return Err(SnapshotError::OutOfRange(format!("round {}", info.round)));
        }
        let final_round = info.final_round.unwrap_or(config.rounds);
        if final_round < info.round || final_round > config.rounds {
            return Err(SnapshotError::OutOfRange(format!("final round {final_round}")));
        }
        let scores = PlayerMap::from_vec(info.scores.clone())
            .filter(|s| s.player_count() == n)
            .ok_or_else(|| SnapshotError::Inconsistent(format!("{} scores for {n} players", info.scores.len())))?;
        if !info.secret.is_empty() && info.secret.len() != n {
            return Err(SnapshotError::Inconsistent(format!("{} secret choices for {n} players", info.secret.len())));
        }
        for (i, choice) in info.secret.iter().enumerate() {
            if let Some(name) = choice {
                board.set_secret(PlayerId(i as u8), loader.scoring_area(name)?);
            }
        }
        let active_card = match &info.activecard {
            Some(name) => Some(config.cards.by_name(name).ok_or_else(|| SnapshotError::UnknownCard(name.clone()))?),
            None => None,
        };
        let pending = match (&info.movement, &info.response) {
            (None, None) => Pending::Idle,
            (Some(tracking), None) => Pending::Moving(tracking.clone()),
            (None, Some(queue)) => Pending::AwaitingResponse(queue.clone()),
            (Some(_), Some(_)) => {
                return Err(SnapshotError::Inconsistent("both movement and response in flight".into()));
            }
        };

        let state = Self {
            space: ActionSpace::new(&config, n),
            names: Arc::new(snap.players.clone()),
            board,
            cards,
            turn: TurnState {
                round: info.round,
                final_round,
                phase: info.phase,
                scores,
                queue: loader.players(&info.playersleft)?,
                done: loader.players(&info.playersdone)?,
                order: loader.players(&info.order)?,
                active_card,
                branch: info.branch,
                step: info.step,
            },
            pending,
            history: Vector::new(),
            config: Arc::clone(&config),
        };
        state.check()?;
        Ok(state)
    }

    /// Structural checks shared by both loaders.
    fn check(&self) -> Result<(), SnapshotError> {
        let config = &self.config;
        let n = self.names.len();
        if !(2..=MAX_PLAYERS).contains(&n) {
            return Err(SnapshotError::OutOfRange(format!("{n} players")));
        }
        if self.board.player_count() != n
            || !self.board.seats_consistent()
            || self.cards.player_count() != n
            || self.turn.scores.player_count() != n
        {
            return Err(SnapshotError::Inconsistent("player count differs between parts".into()));
        }
        if self.cards.power_card_count() != config.power_card_count() {
            return Err(SnapshotError::Inconsistent(format!(
                "{} power card entries for {} cards",
                self.cards.power_card_count(),
                config.power_card_count()
            )));
        }
        let seats = (1u8 << n) - 1;
        for power in 0..config.power_card_count() as u8 {
            if self.cards.power_holders(power) & !seats != 0 {
                return Err(SnapshotError::OutOfRange(format!("holder of power card {}", power + 1)));
            }
        }
        let listed = self.turn.queue.iter().chain(&self.turn.done).chain(&self.turn.order);
        if let Some(player) = listed.copied().find(|p| p.index() >= n) {
            return Err(SnapshotError::OutOfRange(format!("seat {} in turn order", player.index())));
        }
        if self.cards.card_count() != config.cards.len() {
            return Err(SnapshotError::Inconsistent(format!(
                "{} card entries for {} cards",
                self.cards.card_count(),
                config.cards.len()
            )));
        }
        if self.board.row(config.province()).is_empty() {
            return Err(SnapshotError::Inconsistent("board rows do not cover every area".into()));
        }
        if !config.is_region(self.board.king()) {
            return Err(SnapshotError::OutOfRange(format!("king on {}", self.board.king())));
        }
        for player in PlayerId::all(n) {
            let found = self.board.player_total(player);
            let expected = u32::from(config.pieces.total);
            if found != expected {
                return Err(SnapshotError::PieceTotal { player: self.player_name(player).to_string(), expected, found });
            }
            if let Some(grande) = self.board.grande(player) {
                if !config.is_region(grande) {
                    return Err(SnapshotError::OutOfRange(format!("grande on {grande}")));
                }
            }
            if let Some(choice) = self.board.secret(player) {
                if !config.is_scoring_area(choice) {
                    return Err(SnapshotError::OutOfRange(format!("secret choice {choice}")));
                }
            }
        }

        let phase = self.turn.phase;
        if phase != Phase::End && self.turn.queue.is_empty() {
            return Err(SnapshotError::Inconsistent(format!("no player left to act in {phase}")));
        }
        let needs_card = phase.is_card() || phase.is_placement() || matches!(phase, Phase::ActionChoose | Phase::Response);
        if needs_card && self.turn.active_card.is_none() {
            return Err(SnapshotError::Inconsistent(format!("no active card in {phase}")));
        }
        if let Some(card) = self.turn.active_card {
            if config.cards.get(card).is_none() {
                return Err(SnapshotError::UnknownCard(card.to_string()));
            }
        }
        match (&self.pending, phase) {
            (Pending::AwaitingResponse(queue), Phase::Response) => {
                let seated = |p: PlayerId| p.index() < n;
                if queue.is_empty() || !seated(queue.active) || !queue.steps.iter().all(|s| seated(s.player())) {
                    return Err(SnapshotError::Inconsistent("response queue".into()));
                }
            }
            (Pending::AwaitingResponse(_), _) | (_, Phase::Response) => {
                return Err(SnapshotError::Inconsistent("response queue outside the response phase".into()));
            }
            (Pending::Moving(_), p) if !(p.is_card() || p.is_placement()) => {
                return Err(SnapshotError::Inconsistent(format!("movement in flight in {p}")));
            }
            _ => {}
        }
        Ok(())
    }
}

/// Name resolution for snapshot loading.
struct Loader<'a> {
    config: &'a GameConfig,
    players: &'a [String],
}

impl Loader<'_> {
    fn player_count(&self) -> Result<usize, SnapshotError> {
        let n = self.players.len();
        if !(2..=MAX_PLAYERS).contains(&n) {
            return Err(SnapshotError::OutOfRange(format!("{n} players")));
        }
        let unique: BTreeSet<&String> = self.players.iter().collect();
        if unique.len() != n {
            return Err(SnapshotError::Inconsistent("duplicate player names".into()));
        }
        Ok(n)
    }

    fn player(&self, name: &str) -> Result<PlayerId, SnapshotError> {
        self.players
            .iter()
            .position(|p| p == name)
            .map(|i| PlayerId(i as u8))
            .ok_or_else(|| SnapshotError::UnknownPlayer(name.to_string()))
    }

    fn players(&self, names: &[String]) -> Result<SmallVec<[PlayerId; MAX_PLAYERS]>, SnapshotError> {
        names.iter().map(|n| self.player(n)).collect()
    }

    fn area(&self, name: &str) -> Result<AreaId, SnapshotError> {
        self.config
            .area_by_name(name)
            .ok_or_else(|| SnapshotError::UnknownRegion(name.to_string()))
    }

    fn region(&self, name: &str) -> Result<AreaId, SnapshotError> {
        let area = self.area(name)?;
        if self.config.is_region(area) {
            Ok(area)
        } else {
            Err(SnapshotError::OutOfRange(format!("{name} is not a region")))
        }
    }

    fn scoring_area(&self, name: &str) -> Result<AreaId, SnapshotError> {
        let area = self.area(name)?;
        if self.config.is_scoring_area(area) {
            Ok(area)
        } else {
            Err(SnapshotError::OutOfRange(format!("{name} is neither a region nor the Castillo")))
        }
    }

    /// Explicit scoreboard positions, or positions inferred from changed point tables.
    fn scoreboards(&self, snap: &GameSnapshot) -> Result<SmallVec<[Option<AreaId>; 4]>, SnapshotError> {
        let boards = &self.config.scoreboards;
        if let Some(listed) = &snap.scoreboards {
            if listed.len() != boards.len() {
                return Err(SnapshotError::Inconsistent(format!(
                    "{} scoreboards listed, {} configured",
                    listed.len(),
                    boards.len()
                )));
            }
            return listed
                .iter()
                .map(|slot| slot.as_deref().map(|name| self.scoring_area(name)).transpose())
                .collect();
        }

        let mut placed: SmallVec<[Option<AreaId>; 4]> = boards.iter().map(|_| None).collect();
        for (name, table) in &snap.pointinfo {
            let area = self.scoring_area(name)?;
            if *table == self.config.base_points(area) {
                continue;
            }
            let free = boards
                .iter()
                .enumerate()
                .position(|(b, points)| points == table && placed[b].is_none());
            if let Some(b) = free {
                placed[b] = Some(area);
            }
        }
        Ok(placed)
    }

    fn cards(&self, snap: &GameSnapshot, n: usize) -> Result<CardState, SnapshotError> {
        let registry = &self.config.cards;
        for name in snap.cardinfo.keys().chain(snap.deckpositions.keys()) {
            if registry.by_name(name).is_none() {
                return Err(SnapshotError::UnknownCard(name.clone()));
            }
        }

        let mut status = Vec::with_capacity(registry.len());
        let mut dealt_round = Vec::with_capacity(registry.len());
        let mut positions = Vec::with_capacity(registry.len());
        for (_, card) in registry.iter() {
            let position = *snap
                .cardinfo
                .get(&card.name)
                .ok_or_else(|| SnapshotError::Inconsistent(format!("no deck position for {}", card.name)))?;
            if position == 0 {
                return Err(SnapshotError::OutOfRange(format!("deck position 0 for {}", card.name)));
            }
            let entry = snap
                .deckpositions
                .get(&card.name)
                .copied()
                .unwrap_or(DeckEntry { status: CardStatus::Unplayed, round: 0 });
            if entry.round > self.config.rounds {
                return Err(SnapshotError::OutOfRange(format!("{} dealt in round {}", card.name, entry.round)));
            }
            positions.push(position);
            status.push(entry.status);
            dealt_round.push(entry.round);
        }

        let powers = self.config.power_card_count();
        let power_index = |k: u8| -> Result<u8, SnapshotError> {
            if k == 0 || usize::from(k) > powers {
                Err(SnapshotError::OutOfRange(format!("power card {k}")))
            } else {
                Ok(k - 1)
            }
        };
        let mut holders: SmallVec<[u8; 16]> = SmallVec::from_elem(0, powers);
        let mut used = PlayerMap::with_value(n, 0u16);
        for (name, held) in &snap.cards {
            let player = self.player(name)?;
            if let Some(k) = held {
                let idx = power_index(*k)?;
                holders[usize::from(idx)] |= 1 << player.index();
                used[player] |= 1 << idx;
            }
        }
        for (name, past) in &snap.pastcards {
            let player = self.player(name)?;
            for &k in past {
                used[player] |= 1 << power_index(k)?;
            }
        }
        if holders.iter().any(|bits| bits.count_ones() > 1) {
            return Err(SnapshotError::Inconsistent("a power card is held twice".into()));
        }

        Ok(CardState::from_parts(status, dealt_round, positions, holders, used))
    }
}
