mod bookkeeping;
mod construction;
mod politics;
mod population;
mod production;
mod raiding;
mod technology;
mod trade;

pub use bookkeeping::{audit, BookkeepingSystem};
pub use construction::ConstructionSystem;
pub use politics::PoliticsSystem;
pub use population::PopulationSystem;
pub use production::{optimize_tile, ProductionSystem};
pub use raiding::RaidingSystem;
pub use technology::TechnologySystem;
pub use trade::TradeSystem;
