//! Game setup.

use std::sync::Arc;

use im::Vector;
use smallvec::SmallVec;

use crate::board::BoardState;
use crate::cards::CardState;
use crate::core::{ActionSpace, AreaId, ConfigError, GameConfig, GameRng, Phase, PlayerId, PlayerMap, MAX_PLAYERS};

use super::state::{GameState, Pending, TurnState};

/// Seat colours used when no names are given.
pub const DEFAULT_PLAYER_NAMES: [&str; MAX_PLAYERS] = ["Red", "White", "Blue", "Green", "Yellow"];

/// Builder for an El Grande game.
///
/// ## Example
///
/// ```
/// use el_grande::games::el_grande::ElGrandeBuilder;
/// use el_grande::core::Phase;
///
/// let state = ElGrandeBuilder::new().player_count(3).build(42).unwrap();
/// assert_eq!(state.phase(), Phase::Power);
/// assert_eq!(state.round(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ElGrandeBuilder {
    config: Option<Arc<GameConfig>>,
    player_count: usize,
    player_names: Option<Vec<String>>,
    final_round: Option<u8>,
    grande_selection: bool,
    king: Option<AreaId>,
    deck_positions: Option<Vec<u8>>,
}

impl Default for ElGrandeBuilder {
    fn default() -> Self {
        Self {
            config: None,
            player_count: 4,
            player_names: None,
            final_round: None,
            grande_selection: false,
            king: None,
            deck_positions: None,
        }
    }
}

impl ElGrandeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom configuration instead of the standard game.
    #[must_use]
    pub fn config(mut self, config: Arc<GameConfig>) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn player_count(mut self, count: usize) -> Self {
        self.player_count = count;
        self
    }

    #[must_use]
    pub fn player_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.player_count = names.len();
        self.player_names = Some(names);
        self
    }

    /// Stop after scoring this round instead of the configured last round.
    #[must_use]
    pub fn final_round(mut self, round: u8) -> Self {
        self.final_round = Some(round);
        self
    }

    /// Let players place their grandes in a `start` phase.
    #[must_use]
    pub fn grande_selection(mut self, enabled: bool) -> Self {
        self.grande_selection = enabled;
        self
    }

    #[must_use]
    pub fn king(mut self, region: AreaId) -> Self {
        self.king = Some(region);
        self
    }

    /// Fixed deal round for every card, in catalog order.
    #[must_use]
    pub fn deck_positions(mut self, positions: Vec<u8>) -> Self {
        self.deck_positions = Some(positions);
        self
    }

    /// Set up a game; all randomness comes from `seed`.
    pub fn build(self, seed: u64) -> Result<GameState, ConfigError> {
        let config = self.config.unwrap_or_else(|| Arc::new(GameConfig::standard()));
        config.validate()?;

        let n = self.player_count;
        if !(2..=MAX_PLAYERS).contains(&n) {
            return Err(ConfigError::PlayerCount(n));
        }
        let names = match self.player_names {
            Some(names) if names.len() != n => {
                return Err(ConfigError::PlayerNames { expected: n, got: names.len() });
            }
            Some(names) => names,
            None => DEFAULT_PLAYER_NAMES[..n].iter().map(|s| (*s).to_string()).collect(),
        };
        let final_round = self.final_round.unwrap_or(config.rounds);
        if final_round == 0 || final_round > config.rounds {
            return Err(ConfigError::FinalRound(final_round));
        }

        let mut rng = GameRng::new(seed);
        let regions: Vec<AreaId> = config.region_ids().collect();
        let king = match self.king {
            Some(k) if config.is_region(k) => k,
            Some(k) => return Err(ConfigError::UnknownRegion(k.to_string())),
            None => regions[rng.gen_range_usize(0..regions.len())],
        };

        let positions = match self.deck_positions {
            Some(p) if p.len() != config.cards.len() => {
                return Err(ConfigError::DeckPositions { expected: config.cards.len(), got: p.len() });
            }
            Some(p) => p,
            None => shuffled_positions(&config, &mut rng),
        };

        let mut board = BoardState::new(&config, n, king);
        let mut queue: SmallVec<[PlayerId; MAX_PLAYERS]> = SmallVec::new();
        if self.grande_selection {
            queue.extend(PlayerId::all(n));
        } else {
            let mut open: Vec<AreaId> = regions.iter().copied().filter(|&r| r != king).collect();
            rng.shuffle(&mut open);
            for (player, &region) in PlayerId::all(n).zip(open.iter()) {
                board.place_grande(&config, player, region);
            }
        }

        let mut state = GameState {
            space: ActionSpace::new(&config, n),
            cards: CardState::new(n, &positions, config.power_card_count()),
            names: Arc::new(names),
            board,
            turn: TurnState {
                round: 1,
                final_round,
                phase: Phase::Start,
                scores: PlayerMap::with_value(n, 0),
                queue,
                done: SmallVec::new(),
                order: SmallVec::new(),
                active_card: None,
                branch: None,
                step: 0,
            },
            pending: Pending::Idle,
            history: Vector::new(),
            config,
        };
        if !self.grande_selection {
            state.start_round(1, PlayerId(0));
        }
        Ok(state)
    }
}

/// Each deck's cards get the rounds `1..=len` in random order.
fn shuffled_positions(config: &GameConfig, rng: &mut GameRng) -> Vec<u8> {
    let mut positions = vec![0u8; config.cards.len()];
    for deck in 1..=5u8 {
        let members: Vec<usize> = config.cards.deck(deck).map(|(idx, _)| idx.index()).collect();
        let mut rounds: Vec<u8> = (1..=members.len() as u8).collect();
        rng.shuffle(&mut rounds);
        for (&card, &round) in members.iter().zip(rounds.iter()) {
            positions[card] = round;
        }
    }
    positions
}
