//! Action cards: definitions, the standard catalog, and per-game lifecycle.
//!
//! ## Key Types
//!
//! - `CardIndex`: position of a card in the catalog
//! - `ActionCard`: static card data with its typed effect
//! - `CardRegistry`: catalog lookup by index or name
//! - `CardState`: which cards are dealt, chosen or done, and who holds
//!   which power card

pub mod catalog;
pub mod definition;
pub mod registry;
pub mod status;

pub use catalog::{standard_cards, STANDARD_DECK_POSITIONS};
pub use definition::{ActionCard, CardIndex, KING_DECK};
pub use registry::CardRegistry;
pub use status::{CardState, CardStatus};
