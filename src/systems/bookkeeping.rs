use crate::{
    diet::capacity,
    engine::{System, SystemContext},
    error::{Result, SimError},
    hierarchy,
    rng::SystemRng,
    tile::HistoryPoint,
    world::World,
};

pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Fails on the first broken structural invariant.
pub fn audit(world: &World) -> Result<()> {
    let cap_per_capita = world.config().construction.cap_per_capita;
    for tile in world.tiles() {
        tile.terrain.validate()?;
        tile.allocations.validate(tile.id)?;
        world.polity(tile.controller)?;
        if tile.available.has_negative() {
            return Err(SimError::invariant(format!(
                "tile {:?} holds negative goods: {:?}",
                tile.id, tile.available
            )));
        }
        if tile.construction > cap_per_capita.saturating_mul(tile.population) {
            return Err(SimError::invariant(format!(
                "tile {:?} has {} construction for {} people",
                tile.id, tile.construction, tile.population
            )));
        }
    }
    hierarchy::audit(world)
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for tile in &mut world.tiles {
            tile.history.points.push(HistoryPoint {
                turn: ctx.turn,
                population: tile.population,
                production_capacity: capacity(&tile.production),
                available_capacity: capacity(&tile.available),
            });
        }
        audit(world)
    }
}
