mod handle;

pub use handle::{ChangeNotice, Selection, WorldEngine};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::rng::{RngManager, SystemRng};
use crate::systems::{
    BookkeepingSystem, ConstructionSystem, PoliticsSystem, PopulationSystem, ProductionSystem,
    RaidingSystem, TechnologySystem, TradeSystem,
};
use crate::world::World;

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    /// The eight phases of a turn, in their fixed order.
    pub fn with_standard_phases(self) -> Self {
        self.with_system(ProductionSystem::new())
            .with_system(TradeSystem::new())
            .with_system(RaidingSystem::new())
            .with_system(ConstructionSystem::new())
            .with_system(TechnologySystem::new())
            .with_system(PopulationSystem::new())
            .with_system(PoliticsSystem::new())
            .with_system(BookkeepingSystem::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            settings: self.settings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnSummary {
    pub turn: u64,
    pub year: i64,
    pub population: u64,
    pub sovereign_polities: usize,
    pub raids: usize,
    pub battles: usize,
    pub conquests: usize,
    pub exchanges: usize,
}

impl TurnSummary {
    fn of(world: &World, turn: u64) -> Self {
        Self {
            turn,
            year: world.year(),
            population: world.total_population(),
            sovereign_polities: world.polities().filter(|p| p.is_sovereign()).count(),
            raids: world.raids().len(),
            battles: world.battles().len(),
            conquests: world.battles().iter().filter(|b| b.attacker_won).count(),
            exchanges: world.links().iter().map(|l| l.exchanges.len()).sum(),
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    settings: EngineSettings,
}

impl Engine {
    pub fn phase_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Runs every phase once. The first failing phase aborts the turn.
    pub fn run_turn(&mut self, world: &mut World) -> Result<TurnSummary> {
        let turn = world.turn();
        for system in &mut self.systems {
            let mut rng = self.rng.stream(system.name());
            let ctx = SystemContext {
                turn,
                year: world.year(),
                scenario_name: &self.settings.scenario_name,
            };
            system.run(&ctx, world, &mut rng)?;
            debug!(turn, phase = system.name(), "phase complete");
        }
        let summary = TurnSummary::of(world, turn);
        world.advance_time();
        Ok(summary)
    }

    pub fn run(&mut self, world: &mut World, turns: u64) -> Result<Vec<TurnSummary>> {
        let mut out = Vec::with_capacity(turns as usize);
        for _ in 0..turns {
            out.push(self.run_turn(world)?);
        }
        Ok(out)
    }
}

pub struct SystemContext<'a> {
    pub turn: u64,
    pub year: i64,
    pub scenario_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
