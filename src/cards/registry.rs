//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores the action cards of a configuration in catalog
//! order and provides lookup by `CardIndex` and by card name.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::{ActionCard, CardIndex};

/// Registry of action cards.
///
/// Serializes as a plain list of cards; the name index is rebuilt on load.
///
/// ## Example
///
/// ```
/// use el_grande::cards::{standard_cards, CardIndex, CardRegistry};
///
/// let registry = CardRegistry::from(standard_cards());
///
/// let king = registry.by_name("Deck5_King").unwrap();
/// assert_eq!(king, CardIndex::new(42));
/// assert_eq!(registry.get(king).unwrap().deck, 5);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ActionCard>", into = "Vec<ActionCard>")]
pub struct CardRegistry {
    cards: Vec<ActionCard>,
    by_name: FxHashMap<String, CardIndex>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a card and return its index.
    pub fn register(&mut self, card: ActionCard) -> CardIndex {
        let index = CardIndex::new(self.cards.len() as u16);
        self.by_name.entry(card.name.clone()).or_insert(index);
        self.cards.push(card);
        index
    }

    #[must_use]
    pub fn get(&self, index: CardIndex) -> Option<&ActionCard> {
        self.cards.get(index.index())
    }

    /// Look up a card by its name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<CardIndex> {
        self.by_name.get(name).copied()
    }

    /// Two cards share a name.
    #[must_use]
    pub fn has_duplicate_names(&self) -> bool {
        self.by_name.len() != self.cards.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over (index, card) pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (CardIndex, &ActionCard)> {
        self.cards
            .iter()
            .enumerate()
            .map(|(i, c)| (CardIndex::new(i as u16), c))
    }

    /// Cards of one deck, in catalog order.
    pub fn deck(&self, deck: u8) -> impl Iterator<Item = (CardIndex, &ActionCard)> {
        self.iter().filter(move |(_, c)| c.deck == deck)
    }
}

impl From<Vec<ActionCard>> for CardRegistry {
    fn from(cards: Vec<ActionCard>) -> Self {
        let mut registry = Self::new();
        for card in cards {
            registry.register(card);
        }
        registry
    }
}

impl From<CardRegistry> for Vec<ActionCard> {
    fn from(registry: CardRegistry) -> Self {
        registry.cards
    }
}
