pub mod allocation;
pub mod allocator;
pub mod brain;
pub mod config;
pub mod demography;
pub mod diet;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod market;
pub mod numeric;
pub mod polity;
pub mod product;
pub mod raid;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod systems;
pub mod technology;
pub mod terrain;
pub mod tile;
pub mod war;
pub mod world;

pub use engine::{EngineBuilder, EngineSettings, TurnSummary, WorldEngine};
pub use error::{Result, SimError};
pub use scenario::{Scenario, ScenarioLoader};
