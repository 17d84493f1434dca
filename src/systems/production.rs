use tracing::debug;

use crate::{
    allocator::{Optimized, ProductionAllocator},
    engine::{System, SystemContext},
    error::Result,
    rng::SystemRng,
    tile::TileId,
    world::World,
};

pub struct ProductionSystem;

impl ProductionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProductionSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuilds a tile's allocation from an even split and resets its available
/// goods to the fresh production.
pub fn optimize_tile(world: &mut World, id: TileId) -> Result<Optimized> {
    let config = world.config().allocator.clone();
    let boost = world.config().construction.production_boost;
    let tile = world.tile_mut(id)?;
    let inputs = tile.inputs(boost);
    let boosts = tile.technology.boosts()?;
    let result = ProductionAllocator::new(&config).optimize(id, &inputs, &boosts)?;
    tile.allocations = result.table.clone();
    tile.production = result.production;
    tile.available = result.production;
    Ok(result)
}

impl System for ProductionSystem {
    fn name(&self) -> &str {
        "production"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let mut capped = 0;
        let max_iterations = world.config().allocator.max_iterations;
        for id in world.tile_ids() {
            let result = optimize_tile(world, id)?;
            if result.iterations >= max_iterations {
                capped += 1;
            }
        }
        if capped > 0 {
            debug!(turn = ctx.turn, tiles = capped, "allocator stopped at iteration cap");
        }
        Ok(())
    }
}
