//! Production processes and the per-tile land/labor allocation table.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::numeric::{ces_output, labor_only_output};
use crate::product::{Product, ProductMap};
use crate::terrain::{Terrain, TerrainFractions};
use crate::tile::TileId;

const POOL_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    AlluviumGrain,
    AlluviumHerds,
    FarmlandGrain,
    FarmlandHerds,
    GrasslandGrain,
    GrasslandHerds,
    Building,
}

#[derive(Debug, Clone, Copy)]
pub struct Process {
    pub kind: ProcessKind,
    /// `None` for labor-only processes.
    pub terrain: Option<Terrain>,
    pub product: Product,
    pub base_output: f64,
    /// Acres per land unit.
    pub unit_land: f64,
    /// Workers per labor unit.
    pub unit_labor: f64,
}

const CATALOGUE: &[Process] = &[
    Process {
        kind: ProcessKind::AlluviumGrain,
        terrain: Some(Terrain::Alluvium),
        product: Product::Grain,
        base_output: 8.0,
        unit_land: 10.0,
        unit_labor: 1.0,
    },
    Process {
        kind: ProcessKind::AlluviumHerds,
        terrain: Some(Terrain::Alluvium),
        product: Product::Herds,
        base_output: 3.0,
        unit_land: 20.0,
        unit_labor: 0.5,
    },
    Process {
        kind: ProcessKind::FarmlandGrain,
        terrain: Some(Terrain::Farmland),
        product: Product::Grain,
        base_output: 5.0,
        unit_land: 10.0,
        unit_labor: 1.0,
    },
    Process {
        kind: ProcessKind::FarmlandHerds,
        terrain: Some(Terrain::Farmland),
        product: Product::Herds,
        base_output: 2.5,
        unit_land: 20.0,
        unit_labor: 0.5,
    },
    Process {
        kind: ProcessKind::GrasslandGrain,
        terrain: Some(Terrain::Grassland),
        product: Product::Grain,
        base_output: 2.0,
        unit_land: 15.0,
        unit_labor: 1.0,
    },
    Process {
        kind: ProcessKind::GrasslandHerds,
        terrain: Some(Terrain::Grassland),
        product: Product::Herds,
        base_output: 4.0,
        unit_land: 25.0,
        unit_labor: 0.25,
    },
    Process {
        kind: ProcessKind::Building,
        terrain: None,
        product: Product::Construction,
        base_output: 0.5,
        unit_land: 0.0,
        unit_labor: 1.0,
    },
];

impl ProcessKind {
    pub const ALL: [ProcessKind; 7] = [
        ProcessKind::AlluviumGrain,
        ProcessKind::AlluviumHerds,
        ProcessKind::FarmlandGrain,
        ProcessKind::FarmlandHerds,
        ProcessKind::GrasslandGrain,
        ProcessKind::GrasslandHerds,
        ProcessKind::Building,
    ];

    pub fn spec(self) -> &'static Process {
        &CATALOGUE[self as usize]
    }

    pub fn label(self) -> &'static str {
        match self {
            ProcessKind::AlluviumGrain => "alluvium_grain",
            ProcessKind::AlluviumHerds => "alluvium_herds",
            ProcessKind::FarmlandGrain => "farmland_grain",
            ProcessKind::FarmlandHerds => "farmland_herds",
            ProcessKind::GrasslandGrain => "grassland_grain",
            ProcessKind::GrasslandHerds => "grassland_herds",
            ProcessKind::Building => "building",
        }
    }
}

pub fn catalogue() -> &'static [Process] {
    CATALOGUE
}

impl Process {
    /// Raw output before modifiers. `acres` is ignored for labor-only processes.
    pub fn output(&self, acres: f64, workers: f64, boost: f64) -> f64 {
        let labor_units = workers * boost / self.unit_labor;
        match self.terrain {
            Some(_) => {
                let land_units = acres * boost / self.unit_land;
                ces_output(self.base_output, land_units, labor_units)
            }
            None => labor_only_output(self.base_output, labor_units),
        }
    }
}

/// A resource pool shared by competing processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    Labor,
    Land(Terrain),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub process: ProcessKind,
    /// Share of the process's terrain pool.
    pub land_fraction: f64,
    /// Share of the tile's workers.
    pub labor_fraction: f64,
    pub tech_boost: f64,
}

impl Allocation {
    fn share_of(&self, pool: Pool) -> f64 {
        match pool {
            Pool::Labor => self.labor_fraction,
            Pool::Land(_) => self.land_fraction,
        }
    }

    fn share_of_mut(&mut self, pool: Pool) -> &mut f64 {
        match pool {
            Pool::Labor => &mut self.labor_fraction,
            Pool::Land(_) => &mut self.land_fraction,
        }
    }

    pub fn draws_on(&self, pool: Pool) -> bool {
        match pool {
            Pool::Labor => true,
            Pool::Land(terrain) => self.process.spec().terrain == Some(terrain),
        }
    }
}

/// Everything production needs to know about a tile.
#[derive(Debug, Clone, Copy)]
pub struct TileInputs {
    pub terrain: TerrainFractions,
    pub area_acres: f64,
    pub workers: u64,
    /// Product of culture, religion and construction modifiers.
    pub modifier: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationTable {
    entries: Vec<Allocation>,
}

impl AllocationTable {
    /// Processes available on the given terrain, with labor spread evenly
    /// across all of them and each terrain's land spread evenly across the
    /// processes using it. Absent terrains contribute no processes.
    pub fn even_split(terrain: &TerrainFractions, boosts: &ProductMap) -> Self {
        let kinds: Vec<ProcessKind> = ProcessKind::ALL
            .into_iter()
            .filter(|kind| match kind.spec().terrain {
                Some(t) => terrain.get(t) > 0.0,
                None => true,
            })
            .collect();
        let labor_share = 1.0 / kinds.len() as f64;
        let entries = kinds
            .iter()
            .map(|kind| {
                let spec = kind.spec();
                let land_fraction = match spec.terrain {
                    Some(t) => {
                        let siblings = kinds
                            .iter()
                            .filter(|other| other.spec().terrain == Some(t))
                            .count();
                        1.0 / siblings as f64
                    }
                    None => 0.0,
                };
                Allocation {
                    process: *kind,
                    land_fraction,
                    labor_fraction: labor_share,
                    tech_boost: boosts[spec.product],
                }
            })
            .collect();
        Self { entries }
    }

    /// Brings every entry's technology boost up to the tile's current levels
    /// without touching the shares.
    pub fn refresh_boosts(&mut self, boosts: &ProductMap) {
        for entry in &mut self.entries {
            entry.tech_boost = boosts[entry.process.spec().product];
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Allocation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, process: ProcessKind) -> Option<&Allocation> {
        self.entries.iter().find(|a| a.process == process)
    }

    pub fn find(&self, tile: TileId, process: ProcessKind) -> Result<&Allocation> {
        self.get(process)
            .ok_or_else(|| SimError::AllocationNotFound {
                tile,
                process: process.label().to_string(),
            })
    }

    /// Replaces the allocation for `allocation.process`; the process must
    /// already be present.
    pub fn replace(&mut self, tile: TileId, allocation: Allocation) -> Result<()> {
        let slot = self
            .entries
            .iter_mut()
            .find(|a| a.process == allocation.process)
            .ok_or_else(|| SimError::AllocationNotFound {
                tile,
                process: allocation.process.label().to_string(),
            })?;
        *slot = allocation;
        Ok(())
    }

    /// Pools with at least two competing processes, labor first.
    pub fn contested_pools(&self) -> Vec<Pool> {
        let mut pools = Vec::new();
        if self.entries.len() >= 2 {
            pools.push(Pool::Labor);
        }
        for terrain in Terrain::ALL {
            let pool = Pool::Land(terrain);
            if self.members(pool).count() >= 2 {
                pools.push(pool);
            }
        }
        pools
    }

    pub fn members(&self, pool: Pool) -> impl Iterator<Item = &Allocation> {
        self.entries.iter().filter(move |a| a.draws_on(pool))
    }

    pub fn pool_total(&self, pool: Pool) -> f64 {
        self.members(pool).map(|a| a.share_of(pool)).sum()
    }

    /// Moves up to `amount` of `pool` from one process to another and returns
    /// how much actually moved.
    pub fn shift(
        &mut self,
        tile: TileId,
        pool: Pool,
        from: ProcessKind,
        to: ProcessKind,
        amount: f64,
    ) -> Result<f64> {
        let available = self.find(tile, from)?.share_of(pool);
        self.find(tile, to)?;
        let moved = amount.min(available).max(0.0);
        if moved <= 0.0 {
            return Ok(0.0);
        }
        for entry in &mut self.entries {
            if entry.process == from {
                let share = entry.share_of_mut(pool);
                *share = (*share - moved).max(0.0);
            } else if entry.process == to {
                *entry.share_of_mut(pool) += moved;
            }
        }
        Ok(moved)
    }

    pub fn validate(&self, tile: TileId) -> Result<()> {
        let mut pools = vec![Pool::Labor];
        pools.extend(Terrain::ALL.into_iter().map(Pool::Land));
        for pool in pools {
            let total = self.pool_total(pool);
            if total > 1.0 + POOL_TOLERANCE {
                return Err(SimError::invariant(format!(
                    "tile {tile:?} over-allocates {pool:?}: {total}"
                )));
            }
        }
        for entry in &self.entries {
            if entry.land_fraction < 0.0 || entry.labor_fraction < 0.0 {
                return Err(SimError::invariant(format!(
                    "tile {tile:?} has a negative share for {}",
                    entry.process.label()
                )));
            }
        }
        Ok(())
    }

    /// Output per product, after the tile's modifiers.
    pub fn produce(&self, inputs: &TileInputs) -> ProductMap {
        let mut out = ProductMap::zero();
        let workers = inputs.workers as f64;
        for entry in &self.entries {
            let spec = entry.process.spec();
            let acres = spec
                .terrain
                .map(|t| inputs.area_acres * inputs.terrain.get(t) * entry.land_fraction)
                .unwrap_or(0.0);
            let raw = spec.output(acres, workers * entry.labor_fraction, entry.tech_boost);
            out[spec.product] += raw * inputs.modifier;
        }
        out
    }
}
