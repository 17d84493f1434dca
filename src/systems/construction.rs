use crate::{
    engine::{System, SystemContext},
    error::Result,
    numeric::floor_count,
    product::Product,
    rng::SystemRng,
    world::World,
};

pub struct ConstructionSystem;

impl ConstructionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConstructionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ConstructionSystem {
    fn name(&self) -> &str {
        "construction"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let config = world.config().construction.clone();
        for tile in &mut world.tiles {
            let kept = tile.construction as f64 * (1.0 - config.decay);
            let built = floor_count(kept + tile.available[Product::Construction].max(0.0));
            let cap = config.cap_per_capita.saturating_mul(tile.population);
            tile.construction = built.min(cap);
        }
        Ok(())
    }
}
