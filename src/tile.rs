use serde::{Deserialize, Serialize};

use crate::allocation::{AllocationTable, TileInputs};
use crate::market::LinkId;
use crate::polity::PolityId;
use crate::product::ProductMap;
use crate::technology::TechState;
use crate::terrain::TerrainFractions;

/// Row-major index into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl TileId {
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub row: u32,
    pub col: u32,
}

fn one() -> f64 {
    1.0
}

/// Cultural traits of a tile's inhabitants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Culture {
    #[serde(default = "one")]
    pub raid_intensity: f64,
    #[serde(default = "one")]
    pub mobility: f64,
    /// Scales how many victims a successful raid carries off.
    #[serde(default = "one")]
    pub capture: f64,
    #[serde(default = "one")]
    pub productivity: f64,
}

impl Default for Culture {
    fn default() -> Self {
        Self {
            raid_intensity: 1.0,
            mobility: 1.0,
            capture: 1.0,
            productivity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Religion {
    #[serde(default)]
    pub peace: bool,
    #[serde(default)]
    pub war: bool,
    #[serde(default = "one")]
    pub productivity: f64,
}

impl Default for Religion {
    fn default() -> Self {
        Self {
            peace: false,
            war: false,
            productivity: 1.0,
        }
    }
}

impl Religion {
    pub fn pacifist(&self) -> bool {
        self.peace && !self.war
    }
}

/// Population moved by raids touching this tile during the current turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidLedger {
    pub gained: u64,
    pub lost: u64,
}

impl RaidLedger {
    pub fn net(&self) -> i64 {
        self.gained as i64 - self.lost as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub turn: u64,
    pub population: u64,
    pub production_capacity: f64,
    pub available_capacity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileHistory {
    pub points: Vec<HistoryPoint>,
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub id: TileId,
    pub pos: TilePos,
    pub terrain: TerrainFractions,
    pub area_acres: f64,
    pub river: bool,
    pub population: u64,
    pub construction: u64,
    pub controller: PolityId,
    pub allocations: AllocationTable,
    pub production: ProductMap,
    /// Goods on hand after trade and raids.
    pub available: ProductMap,
    pub links: Vec<LinkId>,
    pub technology: TechState,
    pub culture: Culture,
    pub religion: Religion,
    pub raid: RaidLedger,
    pub expected_death_rate: f64,
    pub history: TileHistory,
}

impl Tile {
    /// Combined production multiplier from culture, religion and buildings.
    pub fn production_modifier(&self, construction_boost: f64) -> f64 {
        let built = if self.population == 0 {
            0.0
        } else {
            (self.construction as f64 / self.population as f64).min(1.0)
        };
        self.culture.productivity * self.religion.productivity * (1.0 + construction_boost * built)
    }

    pub fn inputs(&self, construction_boost: f64) -> TileInputs {
        TileInputs {
            terrain: self.terrain,
            area_acres: self.area_acres,
            workers: self.population,
            modifier: self.production_modifier(construction_boost),
        }
    }
}
