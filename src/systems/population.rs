use tracing::debug;

use crate::{
    demography::PopulationModel,
    diet::capacity,
    engine::{System, SystemContext},
    error::Result,
    rng::SystemRng,
    world::World,
};

pub struct PopulationSystem;

impl PopulationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PopulationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PopulationSystem {
    fn name(&self) -> &str {
        "population"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let config = world.config().population.clone();
        let cap_per_capita = world.config().construction.cap_per_capita;
        let model = PopulationModel::new(&config);
        let mut famines = 0;
        for tile in &mut world.tiles {
            let update = model.update(
                tile.population,
                capacity(&tile.available),
                tile.expected_death_rate,
                &tile.raid,
                rng,
            );
            if update.famine {
                famines += 1;
            }
            tile.population = update.population;
            tile.expected_death_rate = update.expected_death_rate;
            // Buildings beyond what the survivors can maintain fall to ruin.
            tile.construction = tile
                .construction
                .min(cap_per_capita.saturating_mul(tile.population));
        }
        debug!(
            turn = ctx.turn,
            famines,
            population = world.total_population(),
            "population updated"
        );
        Ok(())
    }
}
