use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use super::{Engine, TurnSummary};
use crate::allocation::AllocationTable;
use crate::allocator::{ProductionAllocator, StepOutcome};
use crate::error::Result;
use crate::polity::PolityId;
use crate::snapshot::WorldSnapshot;
use crate::systems::optimize_tile;
use crate::tile::TileId;
use crate::world::World;

/// Published after every mutating call. Observers re-read the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeNotice {
    pub version: u64,
    pub turn: u64,
}

/// Presentation-side selection. Not part of the simulation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub tile: Option<TileId>,
    pub polity: Option<PolityId>,
}

/// A world plus the scheduler that advances it, owned by the caller.
pub struct WorldEngine {
    world: World,
    engine: Engine,
    selection: Selection,
    version: u64,
    feed: watch::Sender<ChangeNotice>,
}

impl WorldEngine {
    pub fn new(world: World, engine: Engine) -> Self {
        let (feed, _) = watch::channel(ChangeNotice {
            version: 0,
            turn: world.turn(),
        });
        Self {
            world,
            engine,
            selection: Selection::default(),
            version: 0,
            feed,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.world, self.version)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Each call hands out an independent receiver; dropping it unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<ChangeNotice> {
        self.feed.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.receiver_count()
    }

    fn publish(&mut self) {
        self.version += 1;
        self.feed.send_replace(ChangeNotice {
            version: self.version,
            turn: self.world.turn(),
        });
    }

    /// Runs all phases of one turn. Observers are notified even when a phase
    /// fails, since earlier phases may already have committed.
    pub fn advance_turn(&mut self) -> Result<TurnSummary> {
        let result = self.engine.run_turn(&mut self.world);
        self.publish();
        let summary = result?;
        info!(
            turn = summary.turn,
            year = summary.year,
            population = summary.population,
            sovereigns = summary.sovereign_polities,
            raids = summary.raids,
            battles = summary.battles,
            conquests = summary.conquests,
            exchanges = summary.exchanges,
            "turn complete"
        );
        Ok(summary)
    }

    pub fn run(&mut self, turns: u64) -> Result<Vec<TurnSummary>> {
        let mut out = Vec::with_capacity(turns as usize);
        for _ in 0..turns {
            out.push(self.advance_turn()?);
        }
        Ok(out)
    }

    pub fn select_tile(&mut self, tile: Option<TileId>) -> Result<()> {
        if let Some(id) = tile {
            self.world.tile(id)?;
        }
        self.selection.tile = tile;
        self.publish();
        Ok(())
    }

    /// Selecting a polity also moves the tile selection to its home tile
    /// when it has one.
    pub fn select_polity(&mut self, polity: Option<PolityId>) -> Result<()> {
        if let Some(id) = polity {
            self.world.polity(id)?;
            if let Ok(home) = self.world.home_tile(id) {
                self.selection.tile = Some(home);
            }
        }
        self.selection.polity = polity;
        self.publish();
        Ok(())
    }

    /// Re-optimizes a tile's allocation from scratch. Trade results on the
    /// tile are discarded. Returns the new capacity.
    pub fn reallocate_land(&mut self, tile: TileId) -> Result<f64> {
        let result = optimize_tile(&mut self.world, tile);
        self.publish();
        Ok(result?.utility)
    }

    /// Applies one local-search step to the tile's current allocation.
    pub fn reallocate_one_step(&mut self, tile: TileId) -> Result<Option<StepOutcome>> {
        let result = self.step_tile(tile);
        self.publish();
        result
    }

    fn step_tile(&mut self, id: TileId) -> Result<Option<StepOutcome>> {
        let config = self.world.config().allocator.clone();
        let boost = self.world.config().construction.production_boost;
        let tile = self.world.tile_mut(id)?;
        let inputs = tile.inputs(boost);
        let boosts = tile.technology.boosts()?;
        if tile.allocations.is_empty() {
            tile.allocations = AllocationTable::even_split(&tile.terrain, &boosts);
        } else {
            // Technology may have advanced since production built the table.
            tile.allocations.refresh_boosts(&boosts);
        }
        let step =
            ProductionAllocator::new(&config).improve_once(id, &mut tile.allocations, &inputs)?;
        if step.is_some() {
            tile.production = tile.allocations.produce(&inputs);
            tile.available = tile.production;
        }
        Ok(step)
    }
}
