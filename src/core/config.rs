//! Static game configuration.
//!
//! A `GameConfig` describes the board and the card catalog:
//! - `RegionConfig`: name, adjacency and base point triple of each region
//! - scoreboards, the power-card refill table and the piece setup
//! - the action card catalog (`CardRegistry`)
//!
//! Configurations are immutable once built and are shared between game
//! states behind an `Arc`.
//!
//! ## Areas
//!
//! Caballeros live in *areas*. With `n` regions, area `0..n` are the
//! regions, `n` is the Castillo, `n + 1` the court and `n + 2` the province.

use serde::{Deserialize, Serialize};

use crate::cards::{standard_cards, CardRegistry};

use super::error::ConfigError;

/// Regions plus Castillo, court and province must fit in a 32-bit set.
pub const MAX_REGIONS: usize = 29;

/// Location of caballeros: a region, the Castillo, the court or the province.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AreaId(pub u8);

impl AreaId {
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for AreaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Area({})", self.0)
    }
}

/// Points for first, second and third place.
pub type PointTable = [i32; 3];

/// One region of the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,

    /// Indices of adjacent regions.
    pub neighbors: Vec<u8>,

    /// Base points for ranks 1..=3.
    pub points: PointTable,
}

impl RegionConfig {
    pub fn new(name: impl Into<String>, neighbors: &[u8], points: PointTable) -> Self {
        Self {
            name: name.into(),
            neighbors: neighbors.to_vec(),
            points,
        }
    }
}

/// Where each player's caballeros start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSetup {
    /// Caballeros per player.
    pub total: u8,
    /// Starting in the court.
    pub court: u8,
    /// Placed beside the player's grande.
    pub grande: u8,
}

impl PieceSetup {
    /// Starting in the province.
    #[must_use]
    pub fn province(&self) -> u8 {
        self.total.saturating_sub(self.court + self.grande)
    }
}

fn default_config_name() -> String {
    "standard".to_string()
}

/// Complete static configuration.
///
/// ## Example
///
/// ```
/// use el_grande::core::GameConfig;
///
/// let config = GameConfig::standard();
/// assert_eq!(config.region_count(), 9);
/// assert_eq!(config.area_name(config.castillo()), "Castillo");
/// assert_eq!(config.power_refill[0], 6);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Label recorded in snapshots to tie them to this configuration.
    #[serde(default = "default_config_name")]
    pub name: String,

    pub regions: Vec<RegionConfig>,

    /// Base point triple of the Castillo.
    pub castillo_points: PointTable,

    /// Point triples of the mobile scoreboards.
    pub scoreboards: Vec<PointTable>,

    /// Caballeros moved from province to court for each power card, lowest card first.
    pub power_refill: Vec<u8>,

    pub pieces: PieceSetup,

    /// Number of rounds in a full game.
    pub rounds: u8,

    /// Rounds after which a full scoring takes place.
    pub scoring_rounds: Vec<u8>,

    pub cards: CardRegistry,
}

impl GameConfig {
    /// The published board and cards.
    #[must_use]
    pub fn standard() -> Self {
        let regions = vec![
            RegionConfig::new("Aragon", &[1, 2, 3, 6, 8], [5, 4, 1]),
            RegionConfig::new("Castilla la Nueva", &[0, 2, 5, 7, 8], [7, 4, 2]),
            RegionConfig::new("Castilla la Vieja", &[0, 1, 4, 6], [6, 4, 2]),
            RegionConfig::new("Cataluna", &[0, 8], [4, 2, 1]),
            RegionConfig::new("Galicia", &[2, 6], [4, 2, 0]),
            RegionConfig::new("Granada", &[1, 7, 8], [6, 3, 1]),
            RegionConfig::new("Pais Vasco", &[0, 2, 4], [5, 3, 1]),
            RegionConfig::new("Sevilla", &[1, 5], [4, 3, 1]),
            RegionConfig::new("Valencia", &[0, 1, 3, 5], [5, 3, 2]),
        ];

        Self {
            name: default_config_name(),
            regions,
            castillo_points: [5, 3, 1],
            scoreboards: vec![[4, 0, 0], [8, 4, 0]],
            power_refill: vec![6, 5, 5, 4, 4, 3, 3, 2, 2, 1, 1, 0, 0],
            pieces: PieceSetup { total: 30, court: 7, grande: 2 },
            rounds: 9,
            scoring_rounds: vec![3, 6, 9],
            cards: CardRegistry::from(standard_cards()),
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check structural consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.regions.len();
        if n == 0 {
            return Err(ConfigError::NoRegions);
        }
        if n > MAX_REGIONS {
            return Err(ConfigError::TooManyRegions(n));
        }

        for (i, region) in self.regions.iter().enumerate() {
            for &nb in &region.neighbors {
                let Some(other) = self.regions.get(nb as usize) else {
                    return Err(ConfigError::NeighborOutOfRange {
                        region: region.name.clone(),
                        neighbor: nb,
                    });
                };
                if nb as usize == i {
                    return Err(ConfigError::SelfNeighbor(region.name.clone()));
                }
                if !other.neighbors.contains(&(i as u8)) {
                    return Err(ConfigError::AsymmetricNeighbors {
                        a: region.name.clone(),
                        b: other.name.clone(),
                    });
                }
            }
        }

        if self.power_refill.is_empty() || self.power_refill.len() > 16 {
            return Err(ConfigError::PowerTable(self.power_refill.len()));
        }
        if self.scoreboards.len() > 4 {
            return Err(ConfigError::TooManyScoreboards(self.scoreboards.len()));
        }

        let needed = self.pieces.court.saturating_add(self.pieces.grande);
        if needed > self.pieces.total {
            return Err(ConfigError::PieceSetup { needed, total: self.pieces.total });
        }

        for (_, card) in self.cards.iter() {
            if !(1..=5).contains(&card.deck) {
                return Err(ConfigError::InvalidDeck { card: card.name.clone(), deck: card.deck });
            }
        }
        if self.cards.has_duplicate_names() {
            let mut seen = std::collections::BTreeSet::new();
            for (_, card) in self.cards.iter() {
                if !seen.insert(card.name.as_str()) {
                    return Err(ConfigError::DuplicateCard(card.name.clone()));
                }
            }
        }

        Ok(())
    }

    /// Number of board regions (Castillo excluded).
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Regions plus Castillo, court and province.
    #[must_use]
    pub fn area_count(&self) -> usize {
        self.regions.len() + 3
    }

    #[must_use]
    pub fn castillo(&self) -> AreaId {
        AreaId(self.regions.len() as u8)
    }

    #[must_use]
    pub fn court(&self) -> AreaId {
        AreaId(self.regions.len() as u8 + 1)
    }

    #[must_use]
    pub fn province(&self) -> AreaId {
        AreaId(self.regions.len() as u8 + 2)
    }

    /// A board region (not the Castillo or a pool).
    #[must_use]
    pub fn is_region(&self, area: AreaId) -> bool {
        area.index() < self.regions.len()
    }

    /// A region or the Castillo.
    #[must_use]
    pub fn is_scoring_area(&self, area: AreaId) -> bool {
        area.index() <= self.regions.len()
    }

    /// Board regions in order.
    pub fn region_ids(&self) -> impl Iterator<Item = AreaId> {
        (0..self.regions.len() as u8).map(AreaId)
    }

    /// Board regions followed by the Castillo.
    pub fn scoring_areas(&self) -> impl Iterator<Item = AreaId> {
        (0..=self.regions.len() as u8).map(AreaId)
    }

    pub fn area_ids(&self) -> impl Iterator<Item = AreaId> {
        (0..self.area_count() as u8).map(AreaId)
    }

    #[must_use]
    pub fn area_name(&self, area: AreaId) -> &str {
        let n = self.regions.len();
        match area.index() {
            i if i < n => &self.regions[i].name,
            i if i == n => "Castillo",
            i if i == n + 1 => "court",
            i if i == n + 2 => "province",
            _ => "unknown",
        }
    }

    /// Inverse of `area_name`.
    #[must_use]
    pub fn area_by_name(&self, name: &str) -> Option<AreaId> {
        self.area_ids().find(|&a| self.area_name(a) == name)
    }

    /// Base points of a region or the Castillo.
    #[must_use]
    pub fn base_points(&self, area: AreaId) -> PointTable {
        match self.regions.get(area.index()) {
            Some(region) => region.points,
            None if area == self.castillo() => self.castillo_points,
            None => [0, 0, 0],
        }
    }

    /// Regions adjacent to `region`.
    pub fn neighbors(&self, region: AreaId) -> impl Iterator<Item = AreaId> + '_ {
        self.regions
            .get(region.index())
            .map(|r| r.neighbors.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&n| AreaId(n))
    }

    #[must_use]
    pub fn power_card_count(&self) -> usize {
        self.power_refill.len()
    }

    /// Full scoring happens after `round`.
    #[must_use]
    pub fn is_scoring_round(&self, round: u8) -> bool {
        self.scoring_rounds.contains(&round)
    }
}
