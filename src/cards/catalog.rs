//! The published El Grande action cards.
//!
//! Cards are listed in catalog order; action ids for card selection follow
//! this order, so it must not change.

use crate::effects::{
    CardEffect, Count, Destination, KingReach, PlayerFilter, Quota, ScoreSelection, Source,
};

use super::definition::ActionCard;

/// Deal round of every standard card, in catalog order, as used by the
/// reference game record.
pub const STANDARD_DECK_POSITIONS: [u8; 43] = [
    7, 2, 4, 1, 8, 11, 3, 9, 6, 10, 5, // deck 1
    2, 6, 4, 8, 5, 3, 1, 7, 9, // deck 2
    11, 6, 9, 4, 2, 3, 10, 8, 7, 5, 1, // deck 3
    2, 4, 10, 8, 7, 9, 5, 6, 3, 11, 1, // deck 4
    1, // king
];

fn intrigue(single_source: bool, quotas: Vec<Quota>) -> CardEffect {
    CardEffect::moving(Source::Region { single: single_source }, Destination::Region, quotas)
}

fn card(name: &str, deck: u8, effect: CardEffect, text: &str) -> ActionCard {
    ActionCard::new(name, deck, effect).with_text(text)
}

/// All 43 standard cards.
#[must_use]
pub fn standard_cards() -> Vec<ActionCard> {
    use PlayerFilter::{Any, EachOpponent, Foreign, Own};

    const CHOOSE_TEXT: &str = "Special Scoring: Choose a region to be scored immediately.";
    const SCOREBOARD_TEXT: &str = "Mobile Scoreboard: You may place a new mobile scoreboard OR move an existing one.";
    const POWER_TEXT: &str = "Power of the Cards: You may return 1 of your used Power cards to your hand.";
    const GRANDE_TEXT: &str = "Grande: You may move your Grande.";
    const TWO_AND_TWO_TEXT: &str = "Intrigue: You may move 2 of your Caballeros and 2 foreign Caballeros.";
    const FIVE_ANY_TEXT: &str = "Intrigue: Choose a region. You may move 5 Caballeros from this region to other regions.";

    let own_all = Quota { who: Own, count: Count::All, exact: false };

    vec![
        card("Deck1_5Any_2", 1, intrigue(true, vec![Quota::up_to(Any, 5)]), FIVE_ANY_TEXT),
        card("Deck1_4Any", 1, intrigue(false, vec![Quota::up_to(Any, 4)]), "Intrigue: You may move 4 Caballeros."),
        card("Deck1_4Self", 1, intrigue(false, vec![Quota::up_to(Own, 4)]), "Intrigue: You may move 4 of your Caballeros."),
        card(
            "Deck1_2And2_1",
            1,
            intrigue(false, vec![Quota::up_to(Own, 2), Quota::up_to(Foreign, 2)]),
            TWO_AND_TWO_TEXT,
        ),
        card("Deck1_3Foreign", 1, intrigue(false, vec![Quota::up_to(Foreign, 3)]), "Intrigue: You may move 3 foreign Caballeros."),
        card("Deck1_3Any", 1, intrigue(false, vec![Quota::up_to(Any, 3)]), "Intrigue: You may move 3 Caballeros."),
        card(
            "Deck1_Add",
            1,
            CardEffect::moving(Source::Court, Destination::Region, vec![Quota::up_to(Own, 2)]),
            "Intrigue: You may place 2 additional Caballeros from your Court into the region(s) of your choice.",
        ),
        card(
            "Deck1_2And2_2",
            1,
            intrigue(false, vec![Quota::up_to(Own, 2), Quota::up_to(Foreign, 2)]),
            TWO_AND_TWO_TEXT,
        ),
        card(
            "Deck1_Or",
            1,
            CardEffect::Choose {
                first: Box::new(intrigue(true, vec![own_all])),
                second: Box::new(CardEffect::moving(Source::Court, Destination::Region, vec![Quota::up_to(Own, 2)])),
            },
            "Intrigue: You may move all your Caballeros away from one region OR You may place 2 Caballeros from your Court into the region(s) of your choice.",
        ),
        card("Deck1_5Any_1", 1, intrigue(true, vec![Quota::up_to(Any, 5)]), FIVE_ANY_TEXT),
        card("Deck1_Allself", 1, intrigue(true, vec![own_all]), "Intrigue: You may move all your Caballeros away from one region."),
        card(
            "Deck2_Provinceone",
            2,
            CardEffect::moving(Source::Region { single: false }, Destination::Province, vec![Quota::up_to(EachOpponent, 1)]),
            "You may return 1 Caballero of each opponent to the Province. These Caballeros must come from regions.",
        ),
        card(
            "Deck2_Decay",
            2,
            CardEffect::moving(Source::Court, Destination::Province, vec![Quota::exactly(EachOpponent, 3)]),
            "Decay of Authority: Each of your opponents must return 3 Caballeros in their Court to the Province.",
        ),
        card(
            "Deck2_Angry",
            2,
            CardEffect::moving(Source::OwnerCourtOrRegion, Destination::Province, vec![Quota::exactly(EachOpponent, 3)]),
            "Angry King!: In clockwise order, each of your opponents must return 3 of their Caballeros to the Province. These Caballeros may come from their Court and/or a region on the board.",
        ),
        card(
            "Deck2_Decayall",
            2,
            CardEffect::moving(Source::Court, Destination::Province, vec![Quota::all(EachOpponent)]),
            "Decay of Authority: Each of your opponents must return all Caballeros in their Court to the Province.",
        ),
        card("Deck2_Choose_2", 2, CardEffect::score(ScoreSelection::SelfChoose), CHOOSE_TEXT),
        card(
            "Deck2_Province",
            2,
            CardEffect::moving(Source::OwnerRegion { at_least: 2 }, Destination::Province, vec![Quota::exactly(Any, 2)]),
            "Each player chooses a region (where they have at least 2 Caballeros) with their secret disc. Each player must return 2 of their Caballeros from their chosen region to the Province.",
        ),
        card("Deck2_Choose_3", 2, CardEffect::score(ScoreSelection::SelfChoose), CHOOSE_TEXT),
        card(
            "Deck2_Provinceall",
            2,
            CardEffect::moving(Source::OwnerRegion { at_least: 1 }, Destination::Province, vec![Quota::all(Any)]),
            "Each player chooses a region (where they have at least one Caballero) with their secret disc. Each player must return all their Caballeros from their chosen region to the Province.",
        ),
        card("Deck2_Choose_1", 2, CardEffect::score(ScoreSelection::SelfChoose), CHOOSE_TEXT),
        card("Deck3_Fives_2", 3, CardEffect::score(ScoreSelection::Fives), "Special Scoring: All 5-point regions are scored immediately."),
        card("Deck3_Fours_2", 3, CardEffect::score(ScoreSelection::Fours), "Special Scoring: All 4-point regions are scored immediately."),
        card("Deck3_Choose", 3, CardEffect::score(ScoreSelection::SelfChoose), CHOOSE_TEXT),
        card("Deck3_Fours_1", 3, CardEffect::score(ScoreSelection::Fours), "Special Scoring: All 4-point regions are scored immediately."),
        card("Deck3_Fives_1", 3, CardEffect::score(ScoreSelection::Fives), "Special Scoring: All 5-point regions are scored immediately."),
        card("Deck3_Castillo_2", 3, CardEffect::score(ScoreSelection::Castillo), "Special Scoring: The Castillo is scored immediately."),
        card(
            "Deck3_Firsts",
            3,
            CardEffect::score(ScoreSelection::FirstsOnly),
            "Special Scoring: All regions are scored immediately. Only first place scores points. In case of a tie, no points are scored.",
        ),
        card(
            "Deck3_Least",
            3,
            CardEffect::score(ScoreSelection::Least),
            "Special Scoring: All regions with the least Caballeros are scored immediately. Regions containing no Caballeros do not count.",
        ),
        card("Deck3_SixSevens", 3, CardEffect::score(ScoreSelection::SixSevens), "Special Scoring: All 6- and 7-point regions are scored immediately."),
        card("Deck3_Most", 3, CardEffect::score(ScoreSelection::Most), "Special Scoring: All regions with the most Caballeros are scored immediately."),
        card("Deck3_Castillo_1", 3, CardEffect::score(ScoreSelection::Castillo), "Special Scoring: The Castillo is scored immediately."),
        card("Deck4_Scoreboard_2", 4, CardEffect::Scoreboard, SCOREBOARD_TEXT),
        card("Deck4_Power_2", 4, CardEffect::Power, POWER_TEXT),
        card(
            "Deck4_Eviction",
            4,
            CardEffect::moving(Source::Region { single: true }, Destination::OwnerRegion, vec![Quota::all(Foreign)]),
            "Eviction: Choose a region. Each of your opponents chooses a region on their secret disc. Each of your opponents moves all their Caballeros from this region to their chosen region.",
        ),
        card("Deck4_Scoreboard_3", 4, CardEffect::Scoreboard, SCOREBOARD_TEXT),
        card(
            "Deck4_Court",
            4,
            CardEffect::moving(Source::Province, Destination::Court, vec![Quota::up_to(Own, 2)]),
            "The Court: You may take 2 Caballeros from the Province into your Court.",
        ),
        card("Deck4_Grande_2", 4, CardEffect::Grande, GRANDE_TEXT),
        card("Deck4_Scoreboard_1", 4, CardEffect::Scoreboard, SCOREBOARD_TEXT),
        card(
            "Deck4_Special",
            4,
            CardEffect::UniqueScore,
            "Special Scoring: Each player chooses a region with their secret disc. Each region chosen exactly once is immediately scored. Regions not chosen or chosen more than once are not scored.",
        ),
        card(
            "Deck4_Advisor",
            4,
            CardEffect::King { reach: KingReach::Neighbor },
            "Royal Advisor: You may move the King to an adjacent region.",
        ),
        card("Deck4_Grande_1", 4, CardEffect::Grande, GRANDE_TEXT),
        card("Deck4_Power_1", 4, CardEffect::Power, POWER_TEXT),
        card(
            "Deck5_King",
            5,
            CardEffect::King { reach: KingReach::Anywhere },
            "King's Card: You may move the King to any region.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_deck_sizes() {
        let cards = standard_cards();
        assert_eq!(cards.len(), 43);

        let sizes: Vec<usize> = (1..=5).map(|d| cards.iter().filter(|c| c.deck == d).count()).collect();
        assert_eq!(sizes, vec![11, 9, 11, 11, 1]);
    }

    #[test]
    fn test_decks_are_contiguous() {
        let cards = standard_cards();
        assert!(cards.windows(2).all(|w| w[0].deck <= w[1].deck));
    }

    #[test]
    fn test_positions_are_permutations_per_deck() {
        let cards = standard_cards();
        for deck in 1..=4u8 {
            let mut positions: Vec<u8> = cards
                .iter()
                .zip(STANDARD_DECK_POSITIONS.iter())
                .filter(|(c, _)| c.deck == deck)
                .map(|(_, &p)| p)
                .collect();
            positions.sort_unstable();
            let expected: Vec<u8> = (1..=positions.len() as u8).collect();
            assert_eq!(positions, expected, "deck {deck}");
        }
    }

    #[test]
    fn test_names_unique() {
        let cards = standard_cards();
        let mut names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 43);
    }
}
