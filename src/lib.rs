//! # el-grande
//!
//! A game-state engine for the board game El Grande, built for tree search.
//!
//! ## Design Principles
//!
//! 1. **Typed inside, integers at the edge**: the engine works on typed
//!    [`Action`]s and card effects; [`ActionSpace`] maps them to the flat
//!    integer ids search frameworks and stored games use.
//!
//! 2. **Illegal is a no-op**: `apply_action` ignores anything outside the
//!    legal set, so callers may try any action id.
//!
//! 3. **Cheap independent clones**: board rows, card arrays and history are
//!    persistent vectors (`im`), per-player data is inline (`smallvec`).
//!    A clone shares no mutable state with its source.
//!
//! ## Modules
//!
//! - `core`: ids, player maps, configuration, actions, phases, RNG, errors
//! - `cards`: card definitions, the standard catalog, card lifecycle
//! - `board`: caballero counts and markers
//! - `scoring`: ranking, region scores, terminal payoffs
//! - `effects`: effect classification and resolution
//! - `rules`: the `SearchGame` contract
//! - `games`: El Grande and the Castillo subgame

pub mod board;
pub mod cards;
pub mod core;
pub mod effects;
pub mod games;
pub mod rules;
pub mod scoring;

#[cfg(feature = "python")]
mod python;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionId, ActionRecord, ActionSpace, AreaId, ConfigError, GameConfig, GameRng, Phase, PlayerId,
    PlayerMap, SnapshotError,
};

pub use crate::board::BoardState;

pub use crate::cards::{ActionCard, CardIndex, CardRegistry, CardState, CardStatus};

pub use crate::effects::{classify, CardEffect, EffectResolver, MovementTracking, Resolution, ResponseQueue};

pub use crate::rules::{GameResult, SearchGame};

pub use crate::games::castillo::{CastilloSnapshot, CastilloState};
pub use crate::games::el_grande::{ElGrandeBuilder, GameSnapshot, GameState};
