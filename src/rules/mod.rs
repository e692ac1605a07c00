//! Search contract for game implementations.
//!
//! Games implement `SearchGame` to expose:
//! - Whose turn it is and the legal integer actions
//! - How an action advances the state
//! - Payoffs once the game is over
//!
//! Search code only ever sees this trait and never interprets
//! game-specific concepts directly.

pub mod engine;

pub use engine::{GameResult, SearchGame};
