//! Per-turn population update.

use rand::Rng;

use crate::config::PopulationConfig;
use crate::numeric::uniform;
use crate::tile::RaidLedger;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationUpdate {
    pub population: u64,
    pub expected_death_rate: f64,
    pub famine: bool,
}

pub struct PopulationModel<'a> {
    config: &'a PopulationConfig,
}

impl<'a> PopulationModel<'a> {
    pub fn new(config: &'a PopulationConfig) -> Self {
        Self { config }
    }

    pub fn capacity_ratio(&self, capacity: f64, population: u64) -> f64 {
        let raw = if population == 0 {
            0.0
        } else {
            capacity.max(0.0) / population as f64
        };
        raw.max(self.config.min_capacity_ratio)
    }

    /// Population after one turn given this turn's capacity and raid ledger.
    pub fn update(
        &self,
        population: u64,
        capacity: f64,
        expected_death_rate: f64,
        raids: &RaidLedger,
        rng: &mut impl Rng,
    ) -> PopulationUpdate {
        if population == 0 {
            return PopulationUpdate {
                population: 0,
                expected_death_rate,
                famine: false,
            };
        }
        let ratio = self.capacity_ratio(capacity, population);
        let pop = population as f64;
        // The smoother moves toward this turn's realized deaths in every branch.
        let realized_death = self.config.base_death_rate + raids.lost as f64 / pop;
        let expected = (expected_death_rate + realized_death) / 2.0;

        if ratio < self.config.famine_threshold {
            let target = uniform(rng, self.config.famine_target_min, self.config.famine_target_max);
            let settled = (ratio * population as f64 / target).floor().max(0.0) as u64;
            let next = settled
                .saturating_sub(raids.lost / 2)
                .min(population.saturating_sub(1));
            return PopulationUpdate {
                population: next,
                expected_death_rate: expected,
                famine: true,
            };
        }

        let growth_target =
            self.config.growth_scale * (ratio.min(self.config.max_growth_ratio) - 1.0);
        let birth_rate = expected + growth_target;
        let natural = (pop * (birth_rate - self.config.base_death_rate)).floor() as i64;
        let next = (population as i64 + natural + raids.net()).max(0) as u64;

        PopulationUpdate {
            population: next,
            expected_death_rate: expected,
            famine: false,
        }
    }
}
