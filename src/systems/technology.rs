use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    error::Result,
    numeric::chance,
    product::Product,
    rng::SystemRng,
    world::World,
};

pub struct TechnologySystem;

impl TechnologySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TechnologySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TechnologySystem {
    fn name(&self) -> &str {
        "technology"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let config = world.config().technology.clone();
        // Diffusion reads levels as they stood before this phase.
        let known: Vec<[usize; Product::COUNT]> = world
            .tiles
            .iter()
            .map(|t| Product::ALL.map(|p| t.technology.level(p)))
            .collect();

        for tile in &mut world.tiles {
            for product in Product::ALL {
                let progress = config.research_rate * tile.production[product].max(0.0);
                let gained = tile.technology.research(product, progress);
                if gained > 0 {
                    debug!(
                        turn = ctx.turn,
                        tile = tile.id.raw(),
                        product = product.label(),
                        level = tile.technology.level(product),
                        "technology advanced"
                    );
                }
            }
        }

        for index in 0..world.tiles.len() {
            let id = world.tiles[index].id;
            let link_ids = world.tiles[index].links.clone();
            for link_id in link_ids {
                let Some(neighbor) = world.link(link_id).and_then(|l| l.other(id)) else {
                    continue;
                };
                for product in Product::ALL {
                    let theirs = known[neighbor.index()][product.index()];
                    if theirs <= world.tiles[index].technology.level(product) {
                        continue;
                    }
                    if chance(rng, config.diffusion_probability) {
                        world.tiles[index].technology.set_level(product, theirs)?;
                        debug!(
                            turn = ctx.turn,
                            tile = id.raw(),
                            from = neighbor.raw(),
                            product = product.label(),
                            level = theirs,
                            "technology adopted"
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
