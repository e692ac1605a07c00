//! El Grande.
//!
//! A round is: every player picks a power card (lower acts first and
//! refills more caballeros to court), then in that order each player takes
//! one dealt action card and resolves its two halves in the order they
//! choose: placing caballeros next to the king, and the card's effect.
//! After rounds 3, 6 and 9 the Castillo is emptied into secretly named
//! regions and every region scores.
//!
//! Supports 2-5 players.
//!
//! ## Example
//!
//! ```
//! use el_grande::games::el_grande::ElGrandeBuilder;
//! use el_grande::rules::SearchGame;
//!
//! let mut state = ElGrandeBuilder::new().player_count(2).build(1).unwrap();
//! while !state.is_terminal() {
//!     let action = state.legal_actions()[0];
//!     state.apply_action(action);
//! }
//! let returns = state.returns();
//! assert!(returns.iter().sum::<f64>().abs() < 1e-9);
//! ```

mod apply;
mod builder;
mod legal;
mod snapshot;
mod state;

pub use builder::{ElGrandeBuilder, DEFAULT_PLAYER_NAMES};
pub use snapshot::{DeckEntry, GameSnapshot, PieceInfo, TurnInfo};
pub use state::{GameState, Pending, TurnState};
