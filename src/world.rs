use std::collections::BTreeMap;

use crate::allocation::AllocationTable;
use crate::brain::Brain;
use crate::config::SimulationConfig;
use crate::error::{Result, SimError};
use crate::market::{LinkId, TradeLink};
use crate::polity::{Polity, PolityId};
use crate::product::ProductMap;
use crate::raid::RaidOutcome;
use crate::technology::TechState;
use crate::terrain::TerrainFractions;
use crate::tile::{Culture, RaidLedger, Religion, Tile, TileHistory, TileId, TilePos};
use crate::war::Battle;

/// Initial state of a tile.
#[derive(Debug, Clone)]
pub struct TileSeed {
    pub terrain: TerrainFractions,
    pub area_acres: f64,
    pub river: bool,
    pub population: u64,
    pub construction: u64,
    pub culture: Culture,
    pub religion: Religion,
    pub controller: PolityId,
}

/// Arena of tiles, polities and trade links, addressed by id.
#[derive(Debug)]
pub struct World {
    scenario: String,
    turn: u64,
    year: i64,
    width: u32,
    height: u32,
    pub(crate) config: SimulationConfig,
    pub(crate) tiles: Vec<Tile>,
    pub(crate) polities: BTreeMap<PolityId, Polity>,
    pub(crate) links: Vec<TradeLink>,
    pub(crate) raids: Vec<RaidOutcome>,
    pub(crate) battles: Vec<Battle>,
}

impl World {
    pub fn new(
        scenario: impl Into<String>,
        width: u32,
        height: u32,
        config: SimulationConfig,
    ) -> Self {
        let year = config.turn.start_year as i64;
        Self {
            scenario: scenario.into(),
            turn: 0,
            year,
            width,
            height,
            config,
            tiles: Vec::new(),
            polities: BTreeMap::new(),
            links: Vec::new(),
            raids: Vec::new(),
            battles: Vec::new(),
        }
    }

    pub fn add_polity(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
        brain: Brain,
    ) -> PolityId {
        let id = PolityId(self.polities.len() as u32);
        self.polities.insert(id, Polity::new(id, name, color, brain));
        id
    }

    /// Tiles are placed in row-major order.
    pub fn add_tile(&mut self, seed: TileSeed) -> Result<TileId> {
        let index = self.tiles.len() as u32;
        if self.width == 0 || index >= self.width * self.height {
            return Err(SimError::invariant(format!(
                "grid {}x{} is already full",
                self.width, self.height
            )));
        }
        seed.terrain.validate()?;
        if !self.polities.contains_key(&seed.controller) {
            return Err(SimError::UnknownPolity(seed.controller));
        }
        let id = TileId(index);
        let cap = self.config.construction.cap_per_capita.saturating_mul(seed.population);
        self.tiles.push(Tile {
            id,
            pos: TilePos {
                row: index / self.width,
                col: index % self.width,
            },
            terrain: seed.terrain,
            area_acres: seed.area_acres.max(0.0),
            river: seed.river,
            population: seed.population,
            construction: seed.construction.min(cap),
            controller: seed.controller,
            allocations: AllocationTable::default(),
            production: ProductMap::zero(),
            available: ProductMap::zero(),
            links: Vec::new(),
            technology: TechState::default(),
            culture: seed.culture,
            religion: seed.religion,
            raid: RaidLedger::default(),
            expected_death_rate: self.config.population.base_death_rate,
            history: TileHistory::default(),
        });
        Ok(id)
    }

    /// Creates one link per pair of 4-adjacent tiles, ordered by endpoint ids.
    pub fn connect_links(&mut self) {
        self.links.clear();
        for tile in &mut self.tiles {
            tile.links.clear();
        }
        let mut pairs = Vec::new();
        for tile in &self.tiles {
            for neighbor in self.neighbors(tile.id) {
                if neighbor > tile.id {
                    pairs.push((tile.id, neighbor));
                }
            }
        }
        for (a, b) in pairs {
            let id = LinkId(self.links.len() as u32);
            let river = self.tiles[a.index()].river && self.tiles[b.index()].river;
            self.links
                .push(TradeLink::new(id, a, b, river, &self.config.market));
            self.tiles[a.index()].links.push(id);
            self.tiles[b.index()].links.push(id);
        }
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn advance_time(&mut self) {
        self.turn += 1;
        self.year += self.config.turn.years_per_turn as i64;
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_ids(&self) -> Vec<TileId> {
        self.tiles.iter().map(|t| t.id).collect()
    }

    pub fn tile(&self, id: TileId) -> Result<&Tile> {
        self.tiles.get(id.index()).ok_or(SimError::UnknownTile(id))
    }

    pub fn tile_mut(&mut self, id: TileId) -> Result<&mut Tile> {
        self.tiles.get_mut(id.index()).ok_or(SimError::UnknownTile(id))
    }

    pub fn tile_at(&self, row: u32, col: u32) -> Option<TileId> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let id = TileId(row * self.width + col);
        self.tiles.get(id.index()).map(|t| t.id)
    }

    /// Cardinal neighbors in ascending id order.
    pub fn neighbors(&self, id: TileId) -> Vec<TileId> {
        let Some(tile) = self.tiles.get(id.index()) else {
            return Vec::new();
        };
        let TilePos { row, col } = tile.pos;
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.extend(self.tile_at(row - 1, col));
        }
        if col > 0 {
            out.extend(self.tile_at(row, col - 1));
        }
        out.extend(self.tile_at(row, col + 1));
        out.extend(self.tile_at(row + 1, col));
        out
    }

    pub fn links(&self) -> &[TradeLink] {
        &self.links
    }

    pub fn link(&self, id: LinkId) -> Option<&TradeLink> {
        self.links.get(id.0 as usize)
    }

    pub fn polities(&self) -> impl Iterator<Item = &Polity> {
        self.polities.values()
    }

    pub fn polity_ids(&self) -> Vec<PolityId> {
        self.polities.keys().copied().collect()
    }

    pub fn polity(&self, id: PolityId) -> Result<&Polity> {
        self.polities.get(&id).ok_or(SimError::UnknownPolity(id))
    }

    pub fn polity_mut(&mut self, id: PolityId) -> Result<&mut Polity> {
        self.polities.get_mut(&id).ok_or(SimError::UnknownPolity(id))
    }

    pub fn tiles_of(&self, polity: PolityId) -> Vec<TileId> {
        self.tiles
            .iter()
            .filter(|t| t.controller == polity)
            .map(|t| t.id)
            .collect()
    }

    /// Lowest-id tile the polity controls directly.
    pub fn home_tile(&self, polity: PolityId) -> Result<TileId> {
        self.polity(polity)?;
        self.tiles
            .iter()
            .find(|t| t.controller == polity)
            .map(|t| t.id)
            .ok_or(SimError::NoHomeTile(polity))
    }

    pub fn polity_population(&self, polity: PolityId) -> u64 {
        self.tiles
            .iter()
            .filter(|t| t.controller == polity)
            .map(|t| t.population)
            .sum()
    }

    pub fn polity_construction(&self, polity: PolityId) -> u64 {
        self.tiles
            .iter()
            .filter(|t| t.controller == polity)
            .map(|t| t.construction)
            .sum()
    }

    pub fn total_population(&self) -> u64 {
        self.tiles.iter().map(|t| t.population).sum()
    }

    pub fn raids(&self) -> &[RaidOutcome] {
        &self.raids
    }

    pub fn battles(&self) -> &[Battle] {
        &self.battles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(controller: PolityId) -> TileSeed {
        TileSeed {
            terrain: TerrainFractions::new(0.0, 0.5, 0.5).unwrap(),
            area_acres: 1000.0,
            river: true,
            population: 100,
            construction: 1000,
            culture: Culture::default(),
            religion: Religion::default(),
            controller,
        }
    }

    fn grid(width: u32, height: u32) -> World {
        let mut world = World::new("grid", width, height, SimulationConfig::default());
        let owner = world.add_polity("Owner", "#000000", Brain::Passive);
        for _ in 0..width * height {
            world.add_tile(seed(owner)).unwrap();
        }
        world.connect_links();
        world
    }

    #[test]
    fn neighbors_are_cardinal_and_sorted() {
        let world = grid(3, 3);
        assert_eq!(
            world.neighbors(TileId(4)),
            vec![TileId(1), TileId(3), TileId(5), TileId(7)]
        );
        assert_eq!(world.neighbors(TileId(0)), vec![TileId(1), TileId(3)]);
    }

    #[test]
    fn links_cover_every_adjacent_pair_once() {
        let world = grid(3, 2);
        assert_eq!(world.links().len(), 7);
        for link in world.links() {
            assert!(link.a < link.b);
            assert!(link.river);
        }
        assert_eq!(world.tile(TileId(4)).unwrap().links.len(), 3);
    }

    #[test]
    fn construction_is_capped_at_creation() {
        let world = grid(1, 1);
        assert_eq!(world.tile(TileId(0)).unwrap().construction, 200);
    }

    #[test]
    fn lookups_fail_loudly() {
        let mut world = grid(1, 1);
        assert_eq!(world.tile(TileId(9)).unwrap_err(), SimError::UnknownTile(TileId(9)));
        assert!(world.add_tile(seed(PolityId(0))).is_err());
        let empty = world.add_polity("Landless", "#ffffff", Brain::Passive);
        assert_eq!(world.home_tile(empty).unwrap_err(), SimError::NoHomeTile(empty));
    }
}
