//! Actions and their flat integer encoding.
//!
//! In the engine every decision is a typed [`Action`]. Search frameworks
//! and persisted game records speak flat integers instead; [`ActionSpace`]
//! converts between the two. The integer ranges are laid out back to back
//! in a fixed order:
//!
//! | range | size |
//! |---|---|
//! | select action card | cards |
//! | select power card | power cards |
//! | retrieve power card | power cards |
//! | caballeros first, card first, alternate card first | 1 each |
//! | choose secret region | regions + 1 (Castillo) |
//! | move grande | regions |
//! | move king | regions |
//! | move scoreboard | scoreboards × (regions + 1) |
//! | move one caballero | players × areas × areas |
//! | skip, trigger | 1 each |
//!
//! A caballero move encodes as
//! `BASE + player + players * (to + areas * from)`.

use serde::{Deserialize, Serialize};

use crate::cards::CardIndex;

use super::config::{AreaId, GameConfig};
use super::phase::Phase;
use super::player::PlayerId;

/// Flat integer action.
pub type ActionId = u32;

/// A typed game decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Play a dealt action card.
    SelectCard(CardIndex),
    /// Play power card `index` (0-based; power card 1 is index 0).
    SelectPower(u8),
    /// Take a played power card back into hand.
    RetrievePower(u8),
    /// Place caballeros before resolving the card.
    CabFirst,
    /// Resolve the card (or its first option) before placing.
    CardFirst,
    /// Resolve the second option of a two-option card first.
    AltCardFirst,
    /// Secretly name a region or the Castillo.
    ChooseRegion(AreaId),
    MoveGrande(AreaId),
    MoveKing(AreaId),
    /// Put scoreboard `board` on a region or the Castillo.
    MoveScoreboard { board: u8, region: AreaId },
    /// Move one of `player`'s caballeros.
    MoveCaballero { from: AreaId, to: AreaId, player: PlayerId },
    Skip,
    Trigger,
}

/// Range layout for one configuration and table size.
///
/// ## Example
///
/// ```
/// use el_grande::core::{Action, ActionSpace, AreaId, GameConfig, PlayerId};
///
/// let space = ActionSpace::new(&GameConfig::standard(), 4);
/// let mv = Action::MoveCaballero { from: AreaId(10), to: AreaId(3), player: PlayerId(2) };
///
/// let id = space.encode(mv).unwrap();
/// assert_eq!(space.decode(id), Some(mv));
/// assert_eq!(space.decode(space.size()), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpace {
    players: u32,
    regions: u32,
    areas: u32,
    cards: u32,
    powers: u32,
    scoreboards: u32,
    power_base: u32,
    retrieve_base: u32,
    cab_first: u32,
    secret_base: u32,
    grande_base: u32,
    king_base: u32,
    scoreboard_base: u32,
    move_base: u32,
    skip: u32,
}

impl ActionSpace {
    #[must_use]
    pub fn new(config: &GameConfig, player_count: usize) -> Self {
        let players = player_count as u32;
        let regions = config.region_count() as u32;
        let areas = config.area_count() as u32;
        let cards = config.cards.len() as u32;
        let powers = config.power_card_count() as u32;
        let scoreboards = config.scoreboards.len() as u32;

        let power_base = cards;
        let retrieve_base = power_base + powers;
        let cab_first = retrieve_base + powers;
        let secret_base = cab_first + 3;
        let grande_base = secret_base + regions + 1;
        let king_base = grande_base + regions;
        let scoreboard_base = king_base + regions;
        let move_base = scoreboard_base + scoreboards * (regions + 1);
        let skip = move_base + players * areas * areas;

        Self {
            players,
            regions,
            areas,
            cards,
            powers,
            scoreboards,
            power_base,
            retrieve_base,
            cab_first,
            secret_base,
            grande_base,
            king_base,
            scoreboard_base,
            move_base,
            skip,
        }
    }

    /// Number of distinct action ids.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.skip + 2
    }

    #[must_use]
    pub fn skip_id(&self) -> ActionId {
        self.skip
    }

    #[must_use]
    pub fn trigger_id(&self) -> ActionId {
        self.skip + 1
    }

    /// Integer id of `action`, or `None` if it does not fit this layout.
    #[must_use]
    pub fn encode(&self, action: Action) -> Option<ActionId> {
        let id = match action {
            Action::SelectCard(card) => {
                let c = u32::from(card.0);
                (c < self.cards).then_some(c)?
            }
            Action::SelectPower(p) => (u32::from(p) < self.powers).then_some(self.power_base + u32::from(p))?,
            Action::RetrievePower(p) => {
                (u32::from(p) < self.powers).then_some(self.retrieve_base + u32::from(p))?
            }
            Action::CabFirst => self.cab_first,
            Action::CardFirst => self.cab_first + 1,
            Action::AltCardFirst => self.cab_first + 2,
            Action::ChooseRegion(a) => {
                (u32::from(a.0) <= self.regions).then_some(self.secret_base + u32::from(a.0))?
            }
            Action::MoveGrande(a) => (u32::from(a.0) < self.regions).then_some(self.grande_base + u32::from(a.0))?,
            Action::MoveKing(a) => (u32::from(a.0) < self.regions).then_some(self.king_base + u32::from(a.0))?,
            Action::MoveScoreboard { board, region } => {
                let (b, r) = (u32::from(board), u32::from(region.0));
                (b < self.scoreboards && r <= self.regions)
                    .then_some(self.scoreboard_base + b * (self.regions + 1) + r)?
            }
            Action::MoveCaballero { from, to, player } => {
                let (f, t, p) = (u32::from(from.0), u32::from(to.0), u32::from(player.0));
                (f < self.areas && t < self.areas && p < self.players)
                    .then_some(self.move_base + p + self.players * (t + self.areas * f))?
            }
            Action::Skip => self.skip,
            Action::Trigger => self.skip + 1,
        };
        debug_assert!(id < self.size());
        Some(id)
    }

    /// Typed action for an integer id; ranges are checked in layout order.
    #[must_use]
    pub fn decode(&self, id: ActionId) -> Option<Action> {
        let action = if id < self.power_base {
            Action::SelectCard(CardIndex::new(id as u16))
        } else if id < self.retrieve_base {
            Action::SelectPower((id - self.power_base) as u8)
        } else if id < self.cab_first {
            Action::RetrievePower((id - self.retrieve_base) as u8)
        } else if id == self.cab_first {
            Action::CabFirst
        } else if id == self.cab_first + 1 {
            Action::CardFirst
        } else if id == self.cab_first + 2 {
            Action::AltCardFirst
        } else if id < self.grande_base {
            Action::ChooseRegion(AreaId((id - self.secret_base) as u8))
        } else if id < self.king_base {
            Action::MoveGrande(AreaId((id - self.grande_base) as u8))
        } else if id < self.scoreboard_base {
            Action::MoveKing(AreaId((id - self.king_base) as u8))
        } else if id < self.move_base {
            let offset = id - self.scoreboard_base;
            Action::MoveScoreboard {
                board: (offset / (self.regions + 1)) as u8,
                region: AreaId((offset % (self.regions + 1)) as u8),
            }
        } else if id < self.skip {
            let offset = id - self.move_base;
            let player = offset % self.players;
            let rest = offset / self.players;
            Action::MoveCaballero {
                from: AreaId((rest / self.areas) as u8),
                to: AreaId((rest % self.areas) as u8),
                player: PlayerId(player as u8),
            }
        } else if id == self.skip {
            Action::Skip
        } else if id == self.skip + 1 {
            Action::Trigger
        } else {
            return None;
        };
        debug_assert_eq!(self.encode(action), Some(id));
        Some(action)
    }

    /// Human-readable description for logs and interfaces.
    #[must_use]
    pub fn describe(&self, action: Action, config: &GameConfig) -> String {
        match action {
            Action::SelectCard(card) => config
                .cards
                .get(card)
                .map_or_else(|| card.to_string(), |c| c.name.clone()),
            Action::SelectPower(p) => format!("Power {}", u32::from(p) + 1),
            Action::RetrievePower(p) => format!("Retrieve Power {}", u32::from(p) + 1),
            Action::CabFirst => "Caballeros first".to_string(),
            Action::CardFirst => "Card first".to_string(),
            Action::AltCardFirst => "Alternate card first".to_string(),
            Action::ChooseRegion(a) => format!("Choose {}", config.area_name(a)),
            Action::MoveGrande(a) => format!("Grande to {}", config.area_name(a)),
            Action::MoveKing(a) => format!("King to {}", config.area_name(a)),
            Action::MoveScoreboard { board, region } => {
                format!("Scoreboard {} to {}", u32::from(board) + 1, config.area_name(region))
            }
            Action::MoveCaballero { from, to, player } => format!(
                "Caballero of {} from {} to {}",
                player,
                config.area_name(from),
                config.area_name(to)
            ),
            Action::Skip => "Skip".to_string(),
            Action::Trigger => "Trigger".to_string(),
        }
    }
}

/// A recorded action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    pub action: ActionId,

    pub round: u8,

    /// Phase in which the action was taken.
    pub phase: Phase,

    /// Engine step counter at the time of the action.
    pub step: u32,
}
