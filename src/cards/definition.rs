//! Action card definitions - static card data.
//!
//! `ActionCard` holds the immutable properties of one card of the game:
//! its deck, how many caballeros it lets the player place, and its typed
//! effect. Per-game lifecycle data (dealt, chosen, done) lives separately
//! in [`CardState`](super::CardState).

use serde::{Deserialize, Serialize};

use crate::effects::CardEffect;

/// Position of a card in the configured catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardIndex(pub u16);

impl CardIndex {
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CardIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Deck holding the card that is available every round.
pub const KING_DECK: u8 = 5;

/// Static action card definition.
///
/// ## Example
///
/// ```
/// use el_grande::cards::ActionCard;
/// use el_grande::effects::{CardEffect, KingReach};
///
/// let king = ActionCard::new("Deck5_King", 5, CardEffect::King { reach: KingReach::Anywhere })
///     .with_text("Move the king to any region.");
///
/// assert_eq!(king.caballeros, 5);
/// assert!(king.is_every_round());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCard {
    /// Stable card name; used in snapshots and action descriptions.
    pub name: String,

    /// Deck number, 1..=5.
    pub deck: u8,

    /// Caballeros the player may place from court when playing this card.
    pub caballeros: u8,

    pub effect: CardEffect,

    /// Rules text shown to players.
    #[serde(default)]
    pub text: String,
}

impl ActionCard {
    /// A card placing as many caballeros as its deck number.
    #[must_use]
    pub fn new(name: impl Into<String>, deck: u8, effect: CardEffect) -> Self {
        Self {
            name: name.into(),
            deck,
            caballeros: deck,
            effect,
            text: String::new(),
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Dealt at the start of every round regardless of deck position.
    #[must_use]
    pub fn is_every_round(&self) -> bool {
        self.deck == KING_DECK
    }
}
