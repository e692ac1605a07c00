//! Load-time errors.
//!
//! Play itself never fails: an action outside the legal set is ignored.
//! Only constructing a game from external data can go wrong.

use thiserror::Error;

/// Invalid static configuration or builder settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config has no regions")]
    NoRegions,

    #[error("{0} regions exceed the supported maximum")]
    TooManyRegions(usize),

    #[error("region {region} lists neighbor {neighbor}, which does not exist")]
    NeighborOutOfRange { region: String, neighbor: u8 },

    #[error("region {0} lists itself as a neighbor")]
    SelfNeighbor(String),

    #[error("{a} neighbors {b} but not the other way round")]
    AsymmetricNeighbors { a: String, b: String },

    #[error("power card table has {0} entries; expected 1..=16")]
    PowerTable(usize),

    #[error("card {card} has deck {deck}; expected 1..=5")]
    InvalidDeck { card: String, deck: u8 },

    #[error("two cards share the name {0}")]
    DuplicateCard(String),

    #[error("{0} scoreboards exceed the supported maximum")]
    TooManyScoreboards(usize),

    #[error("piece setup needs {needed} caballeros but each player only has {total}")]
    PieceSetup { needed: u8, total: u8 },

    #[error("player count {0} outside 2..=5")]
    PlayerCount(usize),

    #[error("{got} player names for {expected} players")]
    PlayerNames { expected: usize, got: usize },

    #[error("unknown region {0}")]
    UnknownRegion(String),

    #[error("{got} deck positions for {expected} cards")]
    DeckPositions { expected: usize, got: usize },

    #[error("final round {0} outside the configured game length")]
    FinalRound(u8),
}

/// Malformed or inconsistent snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed binary state: {0}")]
    Binary(#[from] bincode::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown region {0}")]
    UnknownRegion(String),

    #[error("unknown player {0}")]
    UnknownPlayer(String),

    #[error("unknown card {0}")]
    UnknownCard(String),

    #[error("no pieces listed for player {0}")]
    MissingPieces(String),

    #[error("player {player} has {found} caballeros; expected {expected}")]
    PieceTotal { player: String, expected: u32, found: u32 },

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("inconsistent snapshot: {0}")]
    Inconsistent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ConfigError::PlayerCount(7);
        assert_eq!(err.to_string(), "player count 7 outside 2..=5");

        let err = SnapshotError::PieceTotal { player: "Red".into(), expected: 30, found: 29 };
        assert_eq!(err.to_string(), "player Red has 29 caballeros; expected 30");
    }

    #[test]
    fn test_config_error_converts() {
        let err: SnapshotError = ConfigError::NoRegions.into();
        assert_eq!(err.to_string(), "config has no regions");
    }
}
