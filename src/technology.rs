use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::product::{Product, ProductMap};

#[derive(Debug, Clone, Copy)]
pub struct TechLevel {
    pub product: Product,
    pub level: usize,
    pub display: &'static str,
    /// Multiplier on both land and labor units of processes making `product`.
    pub input_boost: f64,
    /// Progress needed to reach this level from the one below.
    pub difficulty: f64,
}

const TECH_LADDER: &[TechLevel] = &[
    TechLevel {
        product: Product::Grain,
        level: 0,
        display: "Digging Stick",
        input_boost: 1.0,
        difficulty: 0.0,
    },
    TechLevel {
        product: Product::Grain,
        level: 1,
        display: "Stone Hoe",
        input_boost: 1.1,
        difficulty: 150.0,
    },
    TechLevel {
        product: Product::Grain,
        level: 2,
        display: "Ard Plough",
        input_boost: 1.25,
        difficulty: 600.0,
    },
    TechLevel {
        product: Product::Grain,
        level: 3,
        display: "Canal Irrigation",
        input_boost: 1.4,
        difficulty: 2_000.0,
    },
    TechLevel {
        product: Product::Herds,
        level: 0,
        display: "Herding",
        input_boost: 1.0,
        difficulty: 0.0,
    },
    TechLevel {
        product: Product::Herds,
        level: 1,
        display: "Selective Breeding",
        input_boost: 1.1,
        difficulty: 120.0,
    },
    TechLevel {
        product: Product::Herds,
        level: 2,
        display: "Dairying",
        input_boost: 1.2,
        difficulty: 500.0,
    },
    TechLevel {
        product: Product::Herds,
        level: 3,
        display: "Horse Riding",
        input_boost: 1.3,
        difficulty: 1_800.0,
    },
    TechLevel {
        product: Product::Construction,
        level: 0,
        display: "Mudbrick",
        input_boost: 1.0,
        difficulty: 0.0,
    },
    TechLevel {
        product: Product::Construction,
        level: 1,
        display: "Fired Brick",
        input_boost: 1.15,
        difficulty: 40.0,
    },
    TechLevel {
        product: Product::Construction,
        level: 2,
        display: "Stone Masonry",
        input_boost: 1.3,
        difficulty: 160.0,
    },
];

pub fn definition(product: Product, level: usize) -> Result<&'static TechLevel> {
    TECH_LADDER
        .iter()
        .find(|def| def.product == product && def.level == level)
        .ok_or(SimError::UnknownTechnology { product, level })
}

pub fn next_level(product: Product, level: usize) -> Option<&'static TechLevel> {
    TECH_LADDER
        .iter()
        .find(|def| def.product == product && def.level == level + 1)
}

/// Technology known on one tile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechState {
    levels: [usize; Product::COUNT],
    pub progress: ProductMap,
}

impl TechState {
    pub fn level(&self, product: Product) -> usize {
        self.levels[product.index()]
    }

    pub fn set_level(&mut self, product: Product, level: usize) -> Result<()> {
        definition(product, level)?;
        self.levels[product.index()] = level;
        Ok(())
    }

    pub fn boosts(&self) -> Result<ProductMap> {
        let mut boosts = ProductMap::zero();
        for product in Product::ALL {
            boosts[product] = definition(product, self.level(product))?.input_boost;
        }
        Ok(boosts)
    }

    /// Adds progress and climbs as many levels as it pays for. Returns the
    /// levels gained.
    pub fn research(&mut self, product: Product, progress: f64) -> usize {
        self.progress[product] += progress.max(0.0);
        let mut gained = 0;
        while let Some(next) = next_level(product, self.level(product)) {
            if self.progress[product] < next.difficulty {
                break;
            }
            self.progress[product] -= next.difficulty;
            self.levels[product.index()] = next.level;
            gained += 1;
        }
        if next_level(product, self.level(product)).is_none() {
            self.progress[product] = 0.0;
        }
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_product_starts_at_a_known_level() {
        let state = TechState::default();
        let boosts = state.boosts().unwrap();
        for product in Product::ALL {
            assert_eq!(boosts[product], 1.0);
        }
    }

    #[test]
    fn unknown_level_is_reported() {
        assert_eq!(
            definition(Product::Construction, 9).unwrap_err(),
            SimError::UnknownTechnology {
                product: Product::Construction,
                level: 9
            }
        );
        let mut state = TechState::default();
        assert!(state.set_level(Product::Grain, 42).is_err());
        assert_eq!(state.level(Product::Grain), 0);
    }

    #[test]
    fn research_climbs_multiple_levels() {
        let mut state = TechState::default();
        let gained = state.research(Product::Grain, 800.0);
        assert_eq!(gained, 2);
        assert_eq!(state.level(Product::Grain), 2);
        assert!((state.progress[Product::Grain] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn progress_stops_at_the_top_of_the_ladder() {
        let mut state = TechState::default();
        state.research(Product::Construction, 1e6);
        assert_eq!(state.level(Product::Construction), 2);
        assert_eq!(state.progress[Product::Construction], 0.0);
    }
}
