//! Land classes and per-tile terrain composition.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// River flood plain.
    Alluvium,
    /// Rain-fed arable land.
    Farmland,
    Grassland,
}

impl Terrain {
    pub const COUNT: usize = 3;
    pub const ALL: [Terrain; Terrain::COUNT] =
        [Terrain::Alluvium, Terrain::Farmland, Terrain::Grassland];

    pub fn index(self) -> usize {
        self as usize
    }
}

const FRACTION_TOLERANCE: f64 = 1e-9;

/// Fraction of a tile classified as each terrain. Whatever is left over is
/// residual wasteland that no process can use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainFractions {
    #[serde(default)]
    pub alluvium: f64,
    #[serde(default)]
    pub farmland: f64,
    #[serde(default)]
    pub grassland: f64,
}

impl TerrainFractions {
    pub fn new(alluvium: f64, farmland: f64, grassland: f64) -> Result<Self> {
        let fractions = Self {
            alluvium,
            farmland,
            grassland,
        };
        fractions.validate()?;
        Ok(fractions)
    }

    pub fn get(&self, terrain: Terrain) -> f64 {
        match terrain {
            Terrain::Alluvium => self.alluvium,
            Terrain::Farmland => self.farmland,
            Terrain::Grassland => self.grassland,
        }
    }

    pub fn total(&self) -> f64 {
        self.alluvium + self.farmland + self.grassland
    }

    pub fn residual(&self) -> f64 {
        (1.0 - self.total()).max(0.0)
    }

    /// Terrains with a strictly positive share, in declaration order.
    pub fn present(&self) -> impl Iterator<Item = Terrain> + '_ {
        Terrain::ALL.into_iter().filter(move |t| self.get(*t) > 0.0)
    }

    pub fn validate(&self) -> Result<()> {
        for terrain in Terrain::ALL {
            let value = self.get(terrain);
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::invariant(format!(
                    "terrain fraction for {terrain:?} is {value}"
                )));
            }
        }
        if self.total() > 1.0 + FRACTION_TOLERANCE {
            return Err(SimError::invariant(format!(
                "terrain fractions sum to {} (> 1)",
                self.total()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_is_what_is_left() {
        let fractions = TerrainFractions::new(0.2, 0.3, 0.1).unwrap();
        assert!((fractions.residual() - 0.4).abs() < 1e-12);
        assert_eq!(
            fractions.present().collect::<Vec<_>>(),
            vec![Terrain::Alluvium, Terrain::Farmland, Terrain::Grassland]
        );
    }

    #[test]
    fn overfull_tile_is_rejected() {
        assert!(matches!(
            TerrainFractions::new(0.6, 0.5, 0.0),
            Err(SimError::InvariantViolation(_))
        ));
        assert!(TerrainFractions::new(-0.1, 0.5, 0.0).is_err());
    }

    #[test]
    fn zero_fraction_terrain_is_absent() {
        let fractions = TerrainFractions::new(0.0, 0.7, 0.0).unwrap();
        assert_eq!(fractions.present().collect::<Vec<_>>(), vec![Terrain::Farmland]);
    }
}
