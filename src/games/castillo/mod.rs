//! Castillo distribution subgame, used to forecast scoring rounds.

mod game;
mod snapshot;

pub use game::{movers, CastilloState};
pub use snapshot::CastilloSnapshot;
