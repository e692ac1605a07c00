//! Board state: caballero counts, markers and secret choices.
//!
//! ## Key Types
//!
//! - `BoardState`: the (area, player) count grid, the king, every grande,
//!   the mobile scoreboards and the secret-disc choices
//!
//! Counts live in a persistent vector, one row per area, so cloning a board
//! for a search rollout copies a pointer rather than the grid.

mod grid;

pub use grid::{BoardState, KING_MARKER};
