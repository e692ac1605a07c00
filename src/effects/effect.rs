//! Typed card effect descriptors.
//!
//! Every action card carries exactly one [`CardEffect`]. Descriptors are
//! plain data decoded once when the configuration is loaded; the engine
//! never inspects card names or texts during play.
//!
//! ## Variants
//!
//! - `Move`: relocate caballeros between pools and regions
//! - `Score`: score a selection of regions immediately
//! - `Power`: take back a previously played power card
//! - `Grande` / `King`: relocate a marker
//! - `Scoreboard`: relocate a point-value board
//! - `UniqueScore`: every player secretly names a region
//! - `Choose`: the active player picks one of two sub-effects

use serde::{Deserialize, Serialize};

/// An action card's effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CardEffect {
    Move(MoveEffect),
    Score { selection: ScoreSelection },
    Power,
    Grande,
    King { reach: KingReach },
    Scoreboard,
    #[serde(rename = "uniquescore")]
    UniqueScore,
    Choose {
        first: Box<CardEffect>,
        second: Box<CardEffect>,
    },
}

impl CardEffect {
    /// Short lowercase label of the effect type.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::Score { .. } => "score",
            Self::Power => "power",
            Self::Grande => "grande",
            Self::King { .. } => "king",
            Self::Scoreboard => "scoreboard",
            Self::UniqueScore => "uniquescore",
            Self::Choose { .. } => "choose",
        }
    }

    /// Sub-effect for a branch of a `Choose` card; `self` for anything else.
    #[must_use]
    pub fn branch(&self, branch: Branch) -> &CardEffect {
        match (self, branch) {
            (Self::Choose { first, .. }, Branch::First) => first,
            (Self::Choose { second, .. }, Branch::Second) => second,
            _ => self,
        }
    }

    /// Move effect helper for catalogs.
    #[must_use]
    pub fn moving(from: Source, to: Destination, quotas: Vec<Quota>) -> Self {
        Self::Move(MoveEffect { from, to, quotas })
    }

    #[must_use]
    pub fn score(selection: ScoreSelection) -> Self {
        Self::Score { selection }
    }
}

/// Which half of a `Choose` card is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    First,
    Second,
}

/// Caballero movement: where from, where to, and how many of whose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEffect {
    pub from: Source,
    pub to: Destination,
    /// Quota patterns; every pattern's minimum must be met before the move is complete.
    pub quotas: Vec<Quota>,
}

/// Where moved caballeros come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Source {
    Court,
    Province,
    /// The active player picks regions. With `single`, every caballero
    /// moved by this card leaves the same region.
    Region { single: bool },
    /// Each affected player secretly names one of their regions holding
    /// at least `at_least` of their caballeros.
    #[serde(rename = "ownerregion")]
    OwnerRegion { at_least: u8 },
    /// Each affected player returns caballeros from their court or any region.
    #[serde(rename = "ownercourtorregion")]
    OwnerCourtOrRegion,
}

impl Source {
    /// Fixed pools need no decision to locate.
    #[must_use]
    pub fn is_pool(self) -> bool {
        matches!(self, Self::Court | Self::Province)
    }

    /// The affected players make the decision rather than the active player.
    #[must_use]
    pub fn owner_chooses(self) -> bool {
        matches!(self, Self::OwnerRegion { .. } | Self::OwnerCourtOrRegion)
    }
}

/// Where moved caballeros go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Destination {
    Court,
    Province,
    Castillo,
    Region,
    /// Each affected player secretly names the destination region.
    #[serde(rename = "ownerregion")]
    OwnerRegion,
}

impl Destination {
    #[must_use]
    pub fn is_fixed(self) -> bool {
        matches!(self, Self::Court | Self::Province | Self::Castillo)
    }
}

/// One quota pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub who: PlayerFilter,
    pub count: Count,
    /// Exactly `count` when possible, rather than at most.
    #[serde(default)]
    pub exact: bool,
}

impl Quota {
    #[must_use]
    pub const fn up_to(who: PlayerFilter, n: u8) -> Self {
        Self { who, count: Count::N(n), exact: false }
    }

    #[must_use]
    pub const fn exactly(who: PlayerFilter, n: u8) -> Self {
        Self { who, count: Count::N(n), exact: true }
    }

    #[must_use]
    pub const fn all(who: PlayerFilter) -> Self {
        Self { who, count: Count::All, exact: true }
    }
}

/// Whose caballeros a quota pattern counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerFilter {
    /// The active player's.
    Own,
    /// Any opponents', pooled into one quota.
    Foreign,
    /// Anyone's, pooled.
    Any,
    /// A separate quota for every opponent.
    #[serde(rename = "eachopponent")]
    EachOpponent,
}

/// Quota size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Count {
    N(u8),
    /// The full current count in the source.
    All,
}

/// Aggregate region selections for scoring cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSelection {
    /// Regions whose first-place value is 4.
    Fours,
    Fives,
    /// Regions worth 6 or 7.
    #[serde(rename = "sixsevens")]
    SixSevens,
    Castillo,
    /// Region(s) with the fewest caballeros on board, ignoring empty ones.
    Least,
    Most,
    /// One region picked by the active player.
    #[serde(rename = "selfchoose")]
    SelfChoose,
    /// Every region, first place only.
    #[serde(rename = "firsts")]
    FirstsOnly,
}

/// How far the king may travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KingReach {
    Neighbor,
    Anywhere,
}
