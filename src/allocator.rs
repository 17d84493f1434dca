//! Greedy coordinate ascent over a tile's allocation table.
//!
//! Each step moves a fixed slice of one pool between two processes drawing
//! on it, choosing the move with the largest capacity gain. The search stops
//! at a local optimum or when the iteration cap is hit; either way the best
//! table found so far is returned.

use crate::allocation::{AllocationTable, Pool, ProcessKind, TileInputs};
use crate::config::AllocatorConfig;
use crate::diet::capacity;
use crate::error::Result;
use crate::product::ProductMap;
use crate::tile::TileId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub pool: Pool,
    pub from: ProcessKind,
    pub to: ProcessKind,
    pub moved: f64,
    pub utility_before: f64,
    pub utility_after: f64,
}

#[derive(Debug, Clone)]
pub struct Optimized {
    pub table: AllocationTable,
    pub production: ProductMap,
    pub utility: f64,
    pub iterations: usize,
}

pub struct ProductionAllocator<'a> {
    config: &'a AllocatorConfig,
}

impl<'a> ProductionAllocator<'a> {
    pub fn new(config: &'a AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn utility(table: &AllocationTable, inputs: &TileInputs) -> f64 {
        capacity(&table.produce(inputs))
    }

    /// Runs the search from an even split of every pool.
    pub fn optimize(
        &self,
        tile: TileId,
        inputs: &TileInputs,
        boosts: &ProductMap,
    ) -> Result<Optimized> {
        let mut table = AllocationTable::even_split(&inputs.terrain, boosts);
        let mut iterations = 0;
        while iterations < self.config.max_iterations {
            match self.improve_once(tile, &mut table, inputs)? {
                Some(_) => iterations += 1,
                None => break,
            }
        }
        let production = table.produce(inputs);
        let utility = capacity(&production);
        Ok(Optimized {
            table,
            production,
            utility,
            iterations,
        })
    }

    /// Applies the single best improving move, if any improves utility by
    /// more than `min_improvement`. Never lowers utility.
    pub fn improve_once(
        &self,
        tile: TileId,
        table: &mut AllocationTable,
        inputs: &TileInputs,
    ) -> Result<Option<StepOutcome>> {
        let current = Self::utility(table, inputs);
        let mut best: Option<(StepOutcome, AllocationTable)> = None;

        for pool in table.contested_pools() {
            let members: Vec<ProcessKind> = table.members(pool).map(|a| a.process).collect();
            for &from in &members {
                for &to in &members {
                    if from == to {
                        continue;
                    }
                    let mut candidate = table.clone();
                    let moved =
                        candidate.shift(tile, pool, from, to, self.config.step_fraction)?;
                    if moved <= 0.0 {
                        continue;
                    }
                    let utility = Self::utility(&candidate, inputs);
                    let better = match &best {
                        Some((outcome, _)) => utility > outcome.utility_after,
                        None => true,
                    };
                    if better {
                        let outcome = StepOutcome {
                            pool,
                            from,
                            to,
                            moved,
                            utility_before: current,
                            utility_after: utility,
                        };
                        best = Some((outcome, candidate));
                    }
                }
            }
        }

        match best {
            Some((outcome, candidate))
                if outcome.utility_after - current > self.config.min_improvement =>
            {
                *table = candidate;
                Ok(Some(outcome))
            }
            _ => Ok(None),
        }
    }
}
