use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    error::Result,
    market::TradeMarket,
    rng::SystemRng,
    world::World,
};

pub struct TradeSystem;

impl TradeSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TradeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TradeSystem {
    fn name(&self) -> &str {
        "trade"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let config = world.config().market.clone();
        let market = TradeMarket::new(&config);
        let mut exchanges = 0;
        for index in 0..world.links.len() {
            world.links[index].reset();
            let (a, b) = (world.links[index].a, world.links[index].b);
            let mut basket_a = world.tile(a)?.available;
            let mut basket_b = world.tile(b)?.available;
            let report = market.clear(&world.links[index], &mut basket_a, &mut basket_b);
            world.tile_mut(a)?.available = basket_a;
            world.tile_mut(b)?.available = basket_b;
            exchanges += report.exchanges.len();
            let link = &mut world.links[index];
            link.exchanges = report.exchanges;
            link.notes = report.notes;
        }
        debug!(turn = ctx.turn, exchanges, "trade cleared");
        Ok(())
    }
}
