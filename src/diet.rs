//! Capacity: how many people a product basket can sustain.
//!
//! Several diets are valued independently and the best one wins, so a tile
//! short on one food can still live off another. The construction good adds
//! a bounded shelter bonus on top of the food valuation.

use crate::numeric::weighted_geometric_mean;
use crate::product::{Product, ProductMap};

#[derive(Debug, Clone, Copy)]
pub struct Diet {
    pub name: &'static str,
    /// Per-person requirement for grain and herds.
    pub grain_need: f64,
    pub herds_need: f64,
    /// Exponents of the weighted geometric mean.
    pub grain_weight: f64,
    pub herds_weight: f64,
}

pub const DIETS: &[Diet] = &[
    Diet {
        name: "balanced",
        grain_need: 0.6,
        herds_need: 0.4,
        grain_weight: 0.5,
        herds_weight: 0.5,
    },
    Diet {
        name: "staple",
        grain_need: 1.2,
        herds_need: 0.0,
        grain_weight: 1.0,
        herds_weight: 0.0,
    },
    Diet {
        name: "pastoral",
        grain_need: 0.0,
        herds_need: 1.5,
        grain_weight: 0.0,
        herds_weight: 1.0,
    },
];

/// Construction per person at which the shelter bonus is half-saturated.
const SHELTER_NEED: f64 = 0.05;
const SHELTER_BONUS: f64 = 0.25;

impl Diet {
    fn coverage(need: f64, quantity: f64) -> f64 {
        if need <= 0.0 {
            0.0
        } else {
            quantity / need
        }
    }

    /// People fed under this diet.
    pub fn value(&self, basket: &ProductMap) -> f64 {
        let grain = Self::coverage(self.grain_need, basket[Product::Grain]);
        let herds = Self::coverage(self.herds_need, basket[Product::Herds]);
        weighted_geometric_mean(&[(grain, self.grain_weight), (herds, self.herds_weight)])
    }
}

pub fn food_capacity(basket: &ProductMap) -> f64 {
    DIETS
        .iter()
        .map(|diet| diet.value(basket))
        .fold(0.0, f64::max)
}

/// Shelter multiplier for a basket already known to feed `fed` people.
pub fn shelter_factor(construction: f64, fed: f64) -> f64 {
    if fed <= 0.0 || construction <= 0.0 {
        return 1.0;
    }
    let per_head = construction / (SHELTER_NEED * fed);
    1.0 + SHELTER_BONUS * per_head / (per_head + 1.0)
}

/// Capacity of a basket. Negative entries are treated as zero.
pub fn capacity(basket: &ProductMap) -> f64 {
    let basket = basket.clamped();
    let fed = food_capacity(&basket);
    fed * shelter_factor(basket[Product::Construction], fed)
}

/// Marginal capacity of one product by forward difference.
pub fn marginal_capacity(basket: &ProductMap, product: Product, delta: f64) -> f64 {
    let base = capacity(basket);
    let mut bumped = *basket;
    bumped[product] = bumped[product].max(0.0) + delta;
    (capacity(&bumped) - base) / delta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basket(grain: f64, herds: f64, construction: f64) -> ProductMap {
        ProductMap::from_fn(|p| match p {
            Product::Grain => grain,
            Product::Herds => herds,
            Product::Construction => construction,
        })
    }

    #[test]
    fn missing_herds_falls_back_to_staple_diet() {
        let only_grain = basket(1200.0, 0.0, 0.0);
        assert!((capacity(&only_grain) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn negative_quantities_do_not_poison_capacity() {
        let odd = basket(-5.0, 300.0, -1.0);
        let value = capacity(&odd);
        assert!(value.is_finite());
        assert!((value - 200.0).abs() < 1e-9);
    }

    #[test]
    fn shelter_bonus_is_bounded() {
        let fed = basket(600.0, 400.0, 0.0);
        let sheltered = basket(600.0, 400.0, 1e9);
        let ratio = capacity(&sheltered) / capacity(&fed);
        assert!(ratio > 1.0);
        assert!(ratio <= 1.0 + SHELTER_BONUS + 1e-9);
    }

    #[test]
    fn marginal_capacity_favours_scarce_food() {
        let grain_rich = basket(600.0, 300.0, 0.0);
        let herds = marginal_capacity(&grain_rich, Product::Herds, 1e-3);
        let grain = marginal_capacity(&grain_rich, Product::Grain, 1e-3);
        assert!(herds > grain);
    }
}
