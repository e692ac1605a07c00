//! Core engine types: players, configuration, actions, phases, RNG, errors.
//!
//! Everything here is independent of turn flow. The game state in
//! `games::el_grande` composes these pieces.

pub mod action;
pub mod config;
pub mod error;
pub mod phase;
pub mod player;
pub mod rng;

pub use action::{Action, ActionId, ActionRecord, ActionSpace};
pub use config::{AreaId, GameConfig, PieceSetup, PointTable, RegionConfig, MAX_REGIONS};
pub use error::{ConfigError, SnapshotError};
pub use phase::Phase;
pub use player::{PlayerId, PlayerMap, MAX_PLAYERS};
pub use rng::GameRng;
