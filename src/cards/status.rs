//! Per-game card lifecycle.
//!
//! Action cards move `unplayed → dealt → chosen → done`. Each card also
//! remembers the round it was dealt in and the round its deck deals it
//! (its deck position).
//!
//! Power cards are tracked as bitsets: who holds each card this round,
//! and which cards each player has already used.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{PlayerId, PlayerMap};

use super::definition::CardIndex;
use super::registry::CardRegistry;

/// Lifecycle status of an action card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Unplayed,
    Dealt,
    Chosen,
    Done,
}

/// Action and power card state for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardState {
    status: Vector<CardStatus>,
    dealt_round: Vector<u8>,
    positions: Vector<u8>,
    power_holders: SmallVec<[u8; 16]>,
    power_used: PlayerMap<u16>,
}

impl CardState {
    /// Fresh state; `positions[i]` is the round card `i` is dealt in.
    #[must_use]
    pub fn new(player_count: usize, positions: &[u8], power_cards: usize) -> Self {
        Self {
            status: positions.iter().map(|_| CardStatus::Unplayed).collect(),
            dealt_round: positions.iter().map(|_| 0).collect(),
            positions: positions.iter().copied().collect(),
            power_holders: SmallVec::from_elem(0, power_cards),
            power_used: PlayerMap::with_value(player_count, 0),
        }
    }

    /// Restore from explicit parts.
    #[must_use]
    pub fn from_parts(
        status: Vec<CardStatus>,
        dealt_round: Vec<u8>,
        positions: Vec<u8>,
        power_holders: SmallVec<[u8; 16]>,
        power_used: PlayerMap<u16>,
    ) -> Self {
        Self {
            status: status.into_iter().collect(),
            dealt_round: dealt_round.into_iter().collect(),
            positions: positions.into_iter().collect(),
            power_holders,
            power_used,
        }
    }

    /// Seats covered by the power card record.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.power_used.player_count()
    }

    #[must_use]
    pub fn card_count(&self) -> usize {
        self.status.len()
    }

    #[must_use]
    pub fn status(&self, card: CardIndex) -> CardStatus {
        self.status.get(card.index()).copied().unwrap_or(CardStatus::Done)
    }

    /// Round the card was last dealt in; 0 if never.
    #[must_use]
    pub fn dealt_round(&self, card: CardIndex) -> u8 {
        self.dealt_round.get(card.index()).copied().unwrap_or(0)
    }

    /// Round the card's deck deals it in.
    #[must_use]
    pub fn position(&self, card: CardIndex) -> u8 {
        self.positions.get(card.index()).copied().unwrap_or(0)
    }

    pub fn positions(&self) -> impl Iterator<Item = u8> + '_ {
        self.positions.iter().copied()
    }

    fn set_status(&mut self, card: CardIndex, status: CardStatus) {
        if card.index() < self.status.len() {
            self.status.set(card.index(), status);
        }
    }

    /// Deal every card due this round plus the every-round cards.
    pub fn deal(&mut self, registry: &CardRegistry, round: u8) {
        for (card, def) in registry.iter() {
            let due = def.is_every_round() || self.position(card) == round;
            if due && self.status(card) == CardStatus::Unplayed {
                self.set_status(card, CardStatus::Dealt);
                if card.index() < self.dealt_round.len() {
                    self.dealt_round.set(card.index(), round);
                }
            }
        }
    }

    /// Cards available for selection, in catalog order.
    pub fn dealt(&self) -> impl Iterator<Item = CardIndex> + '_ {
        self.status
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == CardStatus::Dealt)
            .map(|(i, _)| CardIndex::new(i as u16))
    }

    /// Take a dealt card; false if it was not available.
    pub fn choose(&mut self, card: CardIndex) -> bool {
        if self.status(card) != CardStatus::Dealt {
            return false;
        }
        self.set_status(card, CardStatus::Chosen);
        true
    }

    pub fn finish(&mut self, card: CardIndex) {
        self.set_status(card, CardStatus::Done);
    }

    /// Discard what nobody took and return the every-round cards to the deck.
    pub fn end_round(&mut self, registry: &CardRegistry) {
        for (card, def) in registry.iter() {
            if def.is_every_round() {
                self.set_status(card, CardStatus::Unplayed);
            } else if self.status(card) == CardStatus::Dealt {
                self.set_status(card, CardStatus::Done);
            }
        }
    }

    // === Power cards ===

    #[must_use]
    pub fn power_card_count(&self) -> usize {
        self.power_holders.len()
    }

    /// Bitset of players holding `power` this round.
    #[must_use]
    pub fn power_holders(&self, power: u8) -> u8 {
        self.power_holders.get(usize::from(power)).copied().unwrap_or(0)
    }

    /// Power card `player` holds this round.
    #[must_use]
    pub fn held_by(&self, player: PlayerId) -> Option<u8> {
        self.power_holders
            .iter()
            .position(|&bits| bits & (1 << player.index()) != 0)
            .map(|p| p as u8)
    }

    /// Bitset of power cards `player` has used and not retrieved.
    #[must_use]
    pub fn power_used(&self, player: PlayerId) -> u16 {
        self.power_used[player]
    }

    /// Free this round and not used before by `player`.
    #[must_use]
    pub fn can_play_power(&self, player: PlayerId, power: u8) -> bool {
        usize::from(power) < self.power_holders.len()
            && self.power_holders(power) == 0
            && self.power_used[player] & (1 << power) == 0
    }

    pub fn play_power(&mut self, player: PlayerId, power: u8) {
        if let Some(bits) = self.power_holders.get_mut(usize::from(power)) {
            *bits |= 1 << player.index();
            self.power_used[player] |= 1 << power;
        }
    }

    /// Used cards `player` may take back: everything used except the card in play.
    #[must_use]
    pub fn retrievable(&self, player: PlayerId) -> u16 {
        let in_play = self.held_by(player).map_or(0, |p| 1u16 << p);
        self.power_used[player] & !in_play
    }

    pub fn retrieve_power(&mut self, player: PlayerId, power: u8) {
        if power < 16 {
            self.power_used[player] &= !(1u16 << power);
        }
    }

    /// Everyone's power card leaves play at round end.
    pub fn clear_power_holders(&mut self) {
        for bits in &mut self.power_holders {
            *bits = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{standard_cards, STANDARD_DECK_POSITIONS};

    fn setup() -> (CardRegistry, CardState) {
        let registry = CardRegistry::from(standard_cards());
        let state = CardState::new(3, &STANDARD_DECK_POSITIONS, 13);
        (registry, state)
    }

    #[test]
    fn test_deal_round_one() {
        let (registry, mut cards) = setup();
        cards.deal(&registry, 1);

        let dealt: Vec<_> = cards.dealt().map(|c| registry.get(c).unwrap().name.clone()).collect();
        assert_eq!(
            dealt,
            vec!["Deck1_2And2_1", "Deck2_Choose_3", "Deck3_Castillo_1", "Deck4_Power_1", "Deck5_King"]
        );
        assert_eq!(cards.dealt_round(CardIndex::new(3)), 1);
    }

    #[test]
    fn test_lifecycle() {
        let (registry, mut cards) = setup();
        cards.deal(&registry, 1);
        let king = registry.by_name("Deck5_King").unwrap();
        let intrigue = registry.by_name("Deck1_2And2_1").unwrap();

        assert!(cards.choose(king));
        assert!(!cards.choose(king));
        cards.finish(king);
        assert_eq!(cards.status(king), CardStatus::Done);

        cards.end_round(&registry);
        assert_eq!(cards.status(intrigue), CardStatus::Done);
        assert_eq!(cards.status(king), CardStatus::Unplayed);

        cards.deal(&registry, 2);
        assert_eq!(cards.status(king), CardStatus::Dealt);
        assert_eq!(cards.dealt().count(), 5);
    }

    #[test]
    fn test_power_cards() {
        let (_, mut cards) = setup();
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);

        cards.play_power(p0, 4);
        assert_eq!(cards.held_by(p0), Some(4));
        assert!(!cards.can_play_power(p1, 4));
        assert_eq!(cards.power_holders(4), 0b01);

        cards.clear_power_holders();
        assert!(cards.can_play_power(p1, 4));
        assert!(!cards.can_play_power(p0, 4));
        assert!(!cards.can_play_power(p0, 13));
    }

    #[test]
    fn test_retrieve_excludes_card_in_play() {
        let (_, mut cards) = setup();
        let p0 = PlayerId::new(0);

        cards.play_power(p0, 2);
        cards.clear_power_holders();
        cards.play_power(p0, 7);

        assert_eq!(cards.retrievable(p0), 1 << 2);
        cards.retrieve_power(p0, 2);
        assert!(cards.can_play_power(p0, 2));
    }
}
