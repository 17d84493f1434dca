use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    error::Result,
    hierarchy::relationship,
    numeric::uniform,
    product::Product,
    raid::{RaidParty, RaidResolver},
    rng::SystemRng,
    tile::{RaidLedger, TileId},
    world::World,
};

pub struct RaidingSystem;

impl RaidingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RaidingSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn party(world: &World, id: TileId) -> Result<RaidParty> {
    let tile = world.tile(id)?;
    Ok(RaidParty {
        tile: id,
        population: tile.population,
        culture: tile.culture,
        religion: tile.religion,
    })
}

impl System for RaidingSystem {
    fn name(&self) -> &str {
        "raiding"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let config = world.config().raid.clone();
        let resolver = RaidResolver::new(&config);
        world.raids.clear();
        for tile in &mut world.tiles {
            tile.raid = RaidLedger::default();
        }

        // Parties are read from the population committed before raiding.
        let mut outcomes = Vec::new();
        for raider in world.tile_ids() {
            let mut victims = vec![raider];
            victims.extend(world.neighbors(raider));
            for victim in victims {
                let relation = relationship(world, raider, victim)?;
                let multiplier = uniform(rng, config.multiplier_min, config.multiplier_max);
                let outcome = resolver.resolve(
                    &party(world, raider)?,
                    &party(world, victim)?,
                    relation,
                    multiplier,
                );
                outcomes.extend(outcome);
            }
        }

        // Losses are settled against what each tile still has, so a tile hit
        // from several sides never loses more people than it holds.
        let mut remaining: Vec<u64> = world.tiles.iter().map(|t| t.population).collect();
        let mut settled = Vec::with_capacity(outcomes.len());
        let mut looted = 0.0;
        for outcome in &outcomes {
            let raider_culture = world.tile(outcome.raider)?.culture;
            let outcome = resolver.settle(
                outcome,
                &raider_culture,
                remaining[outcome.victim.index()],
                remaining[outcome.raider.index()],
            );
            remaining[outcome.victim.index()] -= outcome.victim_pop_loss().unsigned_abs();
            remaining[outcome.raider.index()] -= outcome.raider_pop_loss().unsigned_abs();

            let fraction = outcome.loot_fraction();
            if fraction > 0.0 {
                let victim = world.tile_mut(outcome.victim)?;
                let mut taken = victim.available.scaled(fraction);
                for product in Product::ALL {
                    taken[product] = taken[product].min(victim.available[product]).max(0.0);
                    victim.available[product] -= taken[product];
                }
                looted += taken.total();
                let delivered = taken.scaled(1.0 - config.loot_spoilage);
                let raider = world.tile_mut(outcome.raider)?;
                for (product, amount) in delivered.iter() {
                    raider.available[product] += amount;
                }
            }

            let victim = world.tile_mut(outcome.victim)?;
            victim.raid.lost += outcome.victim_pop_loss().unsigned_abs();
            let raider = world.tile_mut(outcome.raider)?;
            raider.raid.gained += outcome.raider_pop_gain().unsigned_abs();
            raider.raid.lost += outcome.raider_pop_loss().unsigned_abs();
            settled.push(outcome);
        }

        debug!(turn = ctx.turn, raids = settled.len(), looted, "raids resolved");
        world.raids = settled;
        Ok(())
    }
}
