//! Read-only, serializable view of the world for presentation code.

use serde::Serialize;

use crate::allocation::Allocation;
use crate::diet::capacity;
use crate::market::{Exchange, LinkId};
use crate::polity::{Actor, PolityId, RankRecord};
use crate::product::{Product, ProductMap};
use crate::raid::RaidOutcome;
use crate::terrain::TerrainFractions;
use crate::tile::{HistoryPoint, TileId, TilePos};
use crate::war::Battle;
use crate::world::World;

#[derive(Debug, Clone, Serialize)]
pub struct TileSnapshot {
    pub id: TileId,
    pub pos: TilePos,
    pub terrain: TerrainFractions,
    pub river: bool,
    pub population: u64,
    pub construction: u64,
    pub controller: PolityId,
    pub allocations: Vec<Allocation>,
    pub production: ProductMap,
    pub available: ProductMap,
    pub capacity: f64,
    pub links: Vec<LinkId>,
    pub tech_levels: Vec<(Product, usize)>,
    pub history: Vec<HistoryPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolitySnapshot {
    pub id: PolityId,
    pub name: String,
    pub color: String,
    pub suzerain: Option<PolityId>,
    pub vassals: Vec<PolityId>,
    pub capital: Option<TileId>,
    pub tiles: usize,
    pub population: u64,
    pub actors: Vec<Actor>,
    pub complexity: u32,
    pub ranks: Vec<RankRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkSnapshot {
    pub id: LinkId,
    pub a: TileId,
    pub b: TileId,
    pub river: bool,
    pub costs: ProductMap,
    pub exchanges: Vec<Exchange>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub version: u64,
    pub turn: u64,
    pub year: i64,
    pub width: u32,
    pub height: u32,
    pub total_population: u64,
    pub tiles: Vec<TileSnapshot>,
    pub polities: Vec<PolitySnapshot>,
    pub links: Vec<LinkSnapshot>,
    pub raids: Vec<RaidOutcome>,
    pub battles: Vec<Battle>,
}

impl WorldSnapshot {
    pub fn capture(world: &World, version: u64) -> Self {
        let tiles = world
            .tiles()
            .iter()
            .map(|tile| TileSnapshot {
                id: tile.id,
                pos: tile.pos,
                terrain: tile.terrain,
                river: tile.river,
                population: tile.population,
                construction: tile.construction,
                controller: tile.controller,
                allocations: tile.allocations.iter().copied().collect(),
                production: tile.production,
                available: tile.available,
                capacity: capacity(&tile.available),
                links: tile.links.clone(),
                tech_levels: Product::ALL
                    .iter()
                    .map(|p| (*p, tile.technology.level(*p)))
                    .collect(),
                history: tile.history.points.clone(),
            })
            .collect();

        let polities = world
            .polities()
            .map(|polity| PolitySnapshot {
                id: polity.id,
                name: polity.name.clone(),
                color: polity.color.clone(),
                suzerain: polity.suzerain,
                vassals: polity.vassals.iter().copied().collect(),
                capital: world.home_tile(polity.id).ok(),
                tiles: world.tiles_of(polity.id).len(),
                population: world.polity_population(polity.id),
                actors: polity.actors.clone(),
                complexity: polity.complexity(),
                ranks: polity.ranks.clone(),
            })
            .collect();

        let links = world
            .links()
            .iter()
            .map(|link| LinkSnapshot {
                id: link.id,
                a: link.a,
                b: link.b,
                river: link.river,
                costs: link.costs,
                exchanges: link.exchanges.clone(),
                notes: link.notes.clone(),
            })
            .collect();

        Self {
            scenario: world.scenario().to_string(),
            version,
            turn: world.turn(),
            year: world.year(),
            width: world.width(),
            height: world.height(),
            total_population: world.total_population(),
            tiles,
            polities,
            links,
            raids: world.raids().to_vec(),
            battles: world.battles().to_vec(),
        }
    }
}
