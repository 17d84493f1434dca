//! Goods produced, traded and raided.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Grain,
    Herds,
    Construction,
}

impl Product {
    pub const COUNT: usize = 3;
    pub const ALL: [Product; Product::COUNT] =
        [Product::Grain, Product::Herds, Product::Construction];
    pub const FOODS: [Product; 2] = [Product::Grain, Product::Herds];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_food(self) -> bool {
        !matches!(self, Product::Construction)
    }

    pub fn label(self) -> &'static str {
        match self {
            Product::Grain => "grain",
            Product::Herds => "herds",
            Product::Construction => "construction",
        }
    }
}

/// Quantity per product. Every product always has an entry, so a missing
/// key in serialized form reads as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Product, f64>", into = "BTreeMap<Product, f64>")]
pub struct ProductMap([f64; Product::COUNT]);

impl ProductMap {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_fn(mut f: impl FnMut(Product) -> f64) -> Self {
        let mut values = [0.0; Product::COUNT];
        for product in Product::ALL {
            values[product.index()] = f(product);
        }
        Self(values)
    }

    pub fn get(&self, product: Product) -> f64 {
        self.0[product.index()]
    }

    pub fn add(&mut self, product: Product, amount: f64) {
        self.0[product.index()] += amount;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Product, f64)> + '_ {
        Product::ALL.into_iter().map(move |p| (p, self.0[p.index()]))
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn food_total(&self) -> f64 {
        Product::FOODS.iter().map(|p| self.get(*p)).sum()
    }

    /// Copy with every negative entry replaced by zero.
    pub fn clamped(&self) -> Self {
        Self::from_fn(|p| self.get(p).max(0.0))
    }

    pub fn has_negative(&self) -> bool {
        self.0.iter().any(|v| *v < 0.0)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::from_fn(|p| self.get(p) * factor)
    }
}

impl Index<Product> for ProductMap {
    type Output = f64;

    fn index(&self, product: Product) -> &f64 {
        &self.0[product.index()]
    }
}

impl IndexMut<Product> for ProductMap {
    fn index_mut(&mut self, product: Product) -> &mut f64 {
        &mut self.0[product.index()]
    }
}

impl From<BTreeMap<Product, f64>> for ProductMap {
    fn from(map: BTreeMap<Product, f64>) -> Self {
        Self::from_fn(|p| map.get(&p).copied().unwrap_or(0.0))
    }
}

impl From<ProductMap> for BTreeMap<Product, f64> {
    fn from(map: ProductMap) -> Self {
        map.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_deserialize_as_zero() {
        let map: ProductMap = serde_yaml::from_str("grain: 12.5\n").unwrap();
        assert_eq!(map[Product::Grain], 12.5);
        assert_eq!(map[Product::Herds], 0.0);
        assert_eq!(map[Product::Construction], 0.0);
    }

    #[test]
    fn clamping_removes_negative_quantities() {
        let mut map = ProductMap::zero();
        map[Product::Herds] = -3.0;
        map[Product::Grain] = 2.0;
        assert!(map.has_negative());
        let clamped = map.clamped();
        assert!(!clamped.has_negative());
        assert_eq!(clamped[Product::Grain], 2.0);
    }
}
