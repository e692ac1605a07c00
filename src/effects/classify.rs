//! How many decisions an effect needs.
//!
//! The effect type alone does not decide this: a move between two fixed
//! pools resolves at once, while a move out of a region the player picks
//! needs one decision per caballero.

use super::effect::{CardEffect, Destination, ScoreSelection};

/// Decision pattern of a card effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// No sub-decision: `trigger` applies the effect, `skip` declines it.
    Instant,
    /// The active player names one region (self-chosen scoring, eviction source).
    RegionChoice,
    /// One targeted action (power card, grande, king, scoreboard).
    Direct,
    /// Caballero-by-caballero moves by the active player.
    Stepwise,
    /// Other players answer in turn before the effect finalizes.
    Response,
    /// The player first picks one option of a two-option card.
    Branch,
}

/// Classify an effect.
///
/// ```
/// use el_grande::effects::{classify, CardEffect, Resolution, ScoreSelection};
///
/// assert_eq!(classify(&CardEffect::score(ScoreSelection::Most)), Resolution::Instant);
/// assert_eq!(classify(&CardEffect::score(ScoreSelection::SelfChoose)), Resolution::RegionChoice);
/// assert_eq!(classify(&CardEffect::UniqueScore), Resolution::Response);
/// ```
#[must_use]
pub fn classify(effect: &CardEffect) -> Resolution {
    match effect {
        CardEffect::Move(mv) => {
            if mv.to == Destination::OwnerRegion {
                if mv.from.owner_chooses() {
                    Resolution::Response
                } else {
                    Resolution::RegionChoice
                }
            } else if mv.from.owner_chooses() {
                Resolution::Response
            } else if mv.from.is_pool() && mv.to.is_fixed() {
                Resolution::Instant
            } else {
                Resolution::Stepwise
            }
        }
        CardEffect::Score { selection: ScoreSelection::SelfChoose } => Resolution::RegionChoice,
        CardEffect::Score { .. } => Resolution::Instant,
        CardEffect::Power | CardEffect::Grande | CardEffect::King { .. } | CardEffect::Scoreboard => {
            Resolution::Direct
        }
        CardEffect::UniqueScore => Resolution::Response,
        CardEffect::Choose { .. } => Resolution::Branch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::standard_cards;

    fn class_of(name: &str) -> Resolution {
        let cards = standard_cards();
        let card = cards.iter().find(|c| c.name == name).unwrap();
        classify(&card.effect)
    }

    #[test]
    fn test_standard_classes() {
        assert_eq!(class_of("Deck2_Decay"), Resolution::Instant);
        assert_eq!(class_of("Deck4_Court"), Resolution::Instant);
        assert_eq!(class_of("Deck1_Add"), Resolution::Stepwise);
        assert_eq!(class_of("Deck1_5Any_1"), Resolution::Stepwise);
        assert_eq!(class_of("Deck2_Provinceone"), Resolution::Stepwise);
        assert_eq!(class_of("Deck2_Angry"), Resolution::Response);
        assert_eq!(class_of("Deck2_Province"), Resolution::Response);
        assert_eq!(class_of("Deck4_Eviction"), Resolution::RegionChoice);
        assert_eq!(class_of("Deck3_Choose"), Resolution::RegionChoice);
        assert_eq!(class_of("Deck3_Firsts"), Resolution::Instant);
        assert_eq!(class_of("Deck4_Advisor"), Resolution::Direct);
        assert_eq!(class_of("Deck4_Special"), Resolution::Response);
        assert_eq!(class_of("Deck1_Or"), Resolution::Branch);
    }
}
