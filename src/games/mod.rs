//! Playable games built on the engine.
//!
//! - `el_grande`: the full game
//! - `castillo`: the reduced Castillo distribution game used for forecasting

pub mod castillo;
pub mod el_grande;
