use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::{
    brain::Brain,
    config::{LoggingConfig, SimulationConfig},
    engine::{EngineBuilder, EngineSettings, WorldEngine},
    numeric::{chance, uniform},
    polity::PolityId,
    rng::{RngManager, GENESIS_STREAM},
    terrain::TerrainFractions,
    tile::{Culture, Religion},
    world::{TileSeed, World},
};

fn default_area_acres() -> f64 {
    10_000.0
}

fn default_population() -> u64 {
    800
}

fn default_terrain() -> TerrainFractions {
    TerrainFractions {
        alluvium: 0.1,
        farmland: 0.4,
        grassland: 0.3,
    }
}

fn default_river_chance() -> f64 {
    0.25
}

fn default_color() -> String {
    "#888888".to_string()
}

fn default_turns() -> u64 {
    50
}

const PALETTE: &[&str] = &[
    "#b03a2e", "#2e86c1", "#239b56", "#b7950b", "#7d3c98", "#ca6f1e", "#17a589", "#5d6d7e",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub turns: Option<u64>,
    pub grid: GridSpec,
    #[serde(default)]
    pub tile_defaults: TileDefaults,
    #[serde(default)]
    pub tiles: Vec<ScenarioTile>,
    #[serde(default)]
    pub polities: Vec<ScenarioPolity>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridSpec {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileDefaults {
    #[serde(default = "default_area_acres")]
    pub area_acres: f64,
    #[serde(default = "default_population")]
    pub population: u64,
    #[serde(default)]
    pub construction: u64,
    #[serde(default = "default_terrain")]
    pub terrain: TerrainFractions,
    #[serde(default)]
    pub river: bool,
    /// Chance a generated tile lies on a river.
    #[serde(default = "default_river_chance")]
    pub river_chance: f64,
    #[serde(default)]
    pub culture: Culture,
    #[serde(default)]
    pub religion: Religion,
    /// Brain for polities created implicitly, one per unowned tile.
    #[serde(default)]
    pub brain: Brain,
}

impl Default for TileDefaults {
    fn default() -> Self {
        Self {
            area_acres: default_area_acres(),
            population: default_population(),
            construction: 0,
            terrain: default_terrain(),
            river: false,
            river_chance: default_river_chance(),
            culture: Culture::default(),
            religion: Religion::default(),
            brain: Brain::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioTile {
    pub row: u32,
    pub col: u32,
    #[serde(default)]
    pub terrain: Option<TerrainFractions>,
    #[serde(default)]
    pub area_acres: Option<f64>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub construction: Option<u64>,
    #[serde(default)]
    pub river: Option<bool>,
    #[serde(default)]
    pub culture: Option<Culture>,
    #[serde(default)]
    pub religion: Option<Religion>,
    /// Name of the controlling polity.
    #[serde(default)]
    pub polity: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPolity {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub brain: Brain,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn turns(&self, override_turns: Option<u64>) -> u64 {
        override_turns.or(self.turns).unwrap_or_else(default_turns)
    }

    fn generated_seed(&self, rng: &mut impl rand::Rng) -> TileSeed {
        let defaults = &self.tile_defaults;
        let river = chance(rng, defaults.river_chance);
        let alluvium = if river { uniform(rng, 0.1, 0.4) } else { 0.0 };
        let farmland = uniform(rng, 0.05, 0.5 - alluvium / 2.0);
        let grassland = uniform(rng, 0.05, (1.0 - alluvium - farmland).max(0.05));
        let scale = uniform(rng, 0.5, 1.5);
        TileSeed {
            terrain: TerrainFractions {
                alluvium,
                farmland,
                grassland: grassland.min(1.0 - alluvium - farmland),
            },
            area_acres: defaults.area_acres,
            river,
            population: (defaults.population as f64 * scale).round() as u64,
            construction: defaults.construction,
            culture: defaults.culture,
            religion: defaults.religion,
            controller: PolityId(0),
        }
    }

    fn listed_seed(&self, tile: Option<&ScenarioTile>) -> TileSeed {
        let d = &self.tile_defaults;
        TileSeed {
            terrain: tile.and_then(|t| t.terrain).unwrap_or(d.terrain),
            area_acres: tile.and_then(|t| t.area_acres).unwrap_or(d.area_acres),
            river: tile.and_then(|t| t.river).unwrap_or(d.river),
            population: tile.and_then(|t| t.population).unwrap_or(d.population),
            construction: tile.and_then(|t| t.construction).unwrap_or(d.construction),
            culture: tile.and_then(|t| t.culture).unwrap_or(d.culture),
            religion: tile.and_then(|t| t.religion).unwrap_or(d.religion),
            controller: PolityId(0),
        }
    }

    /// Lays out the grid. Without listed tiles every tile is generated from
    /// the `genesis` stream; tiles without a named polity found their own.
    pub fn build_world(&self) -> Result<World> {
        let GridSpec { width, height } = self.grid;
        if width == 0 || height == 0 {
            bail!("scenario '{}' has an empty {}x{} grid", self.name, width, height);
        }

        let mut listed: HashMap<(u32, u32), &ScenarioTile> = HashMap::new();
        for tile in &self.tiles {
            if tile.row >= height || tile.col >= width {
                bail!(
                    "tile ({}, {}) lies outside the {}x{} grid",
                    tile.row,
                    tile.col,
                    width,
                    height
                );
            }
            if listed.insert((tile.row, tile.col), tile).is_some() {
                bail!("tile ({}, {}) is listed twice", tile.row, tile.col);
            }
        }

        let mut world = World::new(self.name.clone(), width, height, self.simulation.clone());
        let mut by_name: HashMap<&str, PolityId> = HashMap::new();
        for polity in &self.polities {
            let id = world.add_polity(polity.name.clone(), polity.color.clone(), polity.brain);
            if by_name.insert(polity.name.as_str(), id).is_some() {
                bail!("polity '{}' is declared twice", polity.name);
            }
        }

        let mut rng = RngManager::new(self.seed);
        let mut genesis = rng.stream(GENESIS_STREAM);
        for row in 0..height {
            for col in 0..width {
                let entry = listed.get(&(row, col)).copied();
                let mut seed = if self.tiles.is_empty() {
                    self.generated_seed(&mut genesis)
                } else {
                    self.listed_seed(entry)
                };
                seed.controller = match entry.and_then(|t| t.polity.as_deref()) {
                    Some(name) => *by_name.get(name).ok_or_else(|| {
                        anyhow!("tile ({row}, {col}) names unknown polity '{name}'")
                    })?,
                    None => {
                        let n = world.polities().count();
                        world.add_polity(
                            format!("Tile {row},{col}"),
                            PALETTE[n % PALETTE.len()],
                            self.tile_defaults.brain,
                        )
                    }
                };
                world
                    .add_tile(seed)
                    .with_context(|| format!("invalid tile ({row}, {col})"))?;
            }
        }
        world.connect_links();
        Ok(world)
    }

    pub fn build_engine(&self, seed_override: Option<u64>) -> Result<WorldEngine> {
        let world = self.build_world()?;
        let engine = EngineBuilder::new(EngineSettings {
            scenario_name: self.name.clone(),
            seed: seed_override.unwrap_or(self.seed),
        })
        .with_standard_phases()
        .build();
        Ok(WorldEngine::new(world, engine))
    }
}
