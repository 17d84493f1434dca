//! Tunable constants for every subsystem.
//!
//! Scenarios may override any field under their `simulation:` block; every
//! field falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::product::{Product, ProductMap};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub turn: TurnConfig,
    #[serde(default)]
    pub allocator: AllocatorConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub raid: RaidConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub war: WarConfig,
    #[serde(default)]
    pub construction: ConstructionConfig,
    #[serde(default)]
    pub technology: TechnologyConfig,
}

fn default_years_per_turn() -> u32 {
    20
}

fn default_start_year() -> i32 {
    -3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnConfig {
    #[serde(default = "default_years_per_turn")]
    pub years_per_turn: u32,
    #[serde(default = "default_start_year")]
    pub start_year: i32,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            years_per_turn: default_years_per_turn(),
            start_year: default_start_year(),
        }
    }
}

fn default_step_fraction() -> f64 {
    0.01
}

fn default_allocator_iterations() -> usize {
    1000
}

fn default_min_improvement() -> f64 {
    1e-9
}

/// Local-search parameters. The step size and iteration cap have no
/// convergence proof; the search accepts whatever local optimum it reaches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatorConfig {
    #[serde(default = "default_step_fraction")]
    pub step_fraction: f64,
    #[serde(default = "default_allocator_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_min_improvement")]
    pub min_improvement: f64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            step_fraction: default_step_fraction(),
            max_iterations: default_allocator_iterations(),
            min_improvement: default_min_improvement(),
        }
    }
}

fn default_lot_size() -> f64 {
    4.0
}

fn default_market_iterations() -> usize {
    1000
}

fn default_marginal_delta() -> f64 {
    1e-3
}

fn default_river_cost_factor() -> f64 {
    0.5
}

fn default_transaction_costs() -> ProductMap {
    ProductMap::from_fn(|product| match product {
        Product::Grain => 0.2,
        Product::Herds => 0.1,
        Product::Construction => 0.4,
    })
}

fn default_note_limit() -> usize {
    16
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_lot_size")]
    pub lot_size: f64,
    #[serde(default = "default_market_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_marginal_delta")]
    pub marginal_delta: f64,
    /// Multiplier applied to every transaction cost on river links.
    #[serde(default = "default_river_cost_factor")]
    pub river_cost_factor: f64,
    #[serde(default = "default_transaction_costs")]
    pub transaction_costs: ProductMap,
    /// Diagnostic notes kept per link per turn.
    #[serde(default = "default_note_limit")]
    pub note_limit: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            lot_size: default_lot_size(),
            max_iterations: default_market_iterations(),
            marginal_delta: default_marginal_delta(),
            river_cost_factor: default_river_cost_factor(),
            transaction_costs: default_transaction_costs(),
            note_limit: default_note_limit(),
        }
    }
}

fn default_raider_divisor() -> u64 {
    5
}

fn default_k_raiders() -> f64 {
    1.0
}

fn default_k_targets() -> f64 {
    4.0
}

fn default_multiplier_min() -> f64 {
    0.75
}

fn default_multiplier_max() -> f64 {
    1.25
}

fn default_mobility_advantage() -> f64 {
    1.5
}

fn default_mobility_disadvantage() -> f64 {
    0.25
}

fn default_capture_rate() -> f64 {
    0.2
}

fn default_casualty_rate() -> f64 {
    0.1
}

fn default_loot_rate() -> f64 {
    0.5
}

fn default_max_loot_fraction() -> f64 {
    0.5
}

fn default_loot_spoilage() -> f64 {
    0.5
}

fn default_same_polity_factor() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaidConfig {
    #[serde(default = "default_raider_divisor")]
    pub raider_divisor: u64,
    #[serde(default = "default_k_raiders")]
    pub k_raiders: f64,
    #[serde(default = "default_k_targets")]
    pub k_targets: f64,
    #[serde(default = "default_multiplier_min")]
    pub multiplier_min: f64,
    #[serde(default = "default_multiplier_max")]
    pub multiplier_max: f64,
    #[serde(default = "default_mobility_advantage")]
    pub mobility_advantage: f64,
    #[serde(default = "default_mobility_disadvantage")]
    pub mobility_disadvantage: f64,
    #[serde(default = "default_capture_rate")]
    pub capture_rate: f64,
    #[serde(default = "default_casualty_rate")]
    pub casualty_rate: f64,
    #[serde(default = "default_loot_rate")]
    pub loot_rate: f64,
    #[serde(default = "default_max_loot_fraction")]
    pub max_loot_fraction: f64,
    #[serde(default = "default_loot_spoilage")]
    pub loot_spoilage: f64,
    #[serde(default = "default_same_polity_factor")]
    pub same_polity_factor: f64,
}

impl Default for RaidConfig {
    fn default() -> Self {
        Self {
            raider_divisor: default_raider_divisor(),
            k_raiders: default_k_raiders(),
            k_targets: default_k_targets(),
            multiplier_min: default_multiplier_min(),
            multiplier_max: default_multiplier_max(),
            mobility_advantage: default_mobility_advantage(),
            mobility_disadvantage: default_mobility_disadvantage(),
            capture_rate: default_capture_rate(),
            casualty_rate: default_casualty_rate(),
            loot_rate: default_loot_rate(),
            max_loot_fraction: default_max_loot_fraction(),
            loot_spoilage: default_loot_spoilage(),
            same_polity_factor: default_same_polity_factor(),
        }
    }
}

fn default_famine_threshold() -> f64 {
    0.5
}

fn default_famine_target_min() -> f64 {
    0.6
}

fn default_famine_target_max() -> f64 {
    0.8
}

fn default_max_growth_ratio() -> f64 {
    2.0
}

fn default_growth_scale() -> f64 {
    0.25
}

fn default_base_death_rate() -> f64 {
    0.5
}

fn default_min_capacity_ratio() -> f64 {
    0.05
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    #[serde(default = "default_famine_threshold")]
    pub famine_threshold: f64,
    #[serde(default = "default_famine_target_min")]
    pub famine_target_min: f64,
    #[serde(default = "default_famine_target_max")]
    pub famine_target_max: f64,
    #[serde(default = "default_max_growth_ratio")]
    pub max_growth_ratio: f64,
    /// Per-turn growth at the capped capacity ratio.
    #[serde(default = "default_growth_scale")]
    pub growth_scale: f64,
    /// Fraction of the population dying per turn absent raids.
    #[serde(default = "default_base_death_rate")]
    pub base_death_rate: f64,
    #[serde(default = "default_min_capacity_ratio")]
    pub min_capacity_ratio: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            famine_threshold: default_famine_threshold(),
            famine_target_min: default_famine_target_min(),
            famine_target_max: default_famine_target_max(),
            max_growth_ratio: default_max_growth_ratio(),
            growth_scale: default_growth_scale(),
            base_death_rate: default_base_death_rate(),
            min_capacity_ratio: default_min_capacity_ratio(),
        }
    }
}

fn default_allied_attack_share() -> f64 {
    0.25
}

fn default_defense_fatigue() -> f64 {
    0.8
}

fn default_attack_fatigue() -> f64 {
    0.7
}

fn default_participation() -> f64 {
    0.2
}

fn default_fortification() -> f64 {
    0.05
}

fn default_victory_influence() -> f64 {
    0.05
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarConfig {
    #[serde(default = "default_allied_attack_share")]
    pub allied_attack_share: f64,
    /// Multiplier per battle already defended this turn.
    #[serde(default = "default_defense_fatigue")]
    pub defense_fatigue: f64,
    /// Multiplier per battle already fought as attacker this turn.
    #[serde(default = "default_attack_fatigue")]
    pub attack_fatigue: f64,
    #[serde(default = "default_participation")]
    pub participation: f64,
    #[serde(default = "default_fortification")]
    pub fortification: f64,
    #[serde(default = "default_victory_influence")]
    pub victory_influence: f64,
}

impl Default for WarConfig {
    fn default() -> Self {
        Self {
            allied_attack_share: default_allied_attack_share(),
            defense_fatigue: default_defense_fatigue(),
            attack_fatigue: default_attack_fatigue(),
            participation: default_participation(),
            fortification: default_fortification(),
            victory_influence: default_victory_influence(),
        }
    }
}

fn default_construction_decay() -> f64 {
    0.1
}

fn default_cap_per_capita() -> u64 {
    2
}

fn default_construction_boost() -> f64 {
    0.2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionConfig {
    #[serde(default = "default_construction_decay")]
    pub decay: f64,
    #[serde(default = "default_cap_per_capita")]
    pub cap_per_capita: u64,
    #[serde(default = "default_construction_boost")]
    pub production_boost: f64,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            decay: default_construction_decay(),
            cap_per_capita: default_cap_per_capita(),
            production_boost: default_construction_boost(),
        }
    }
}

fn default_research_rate() -> f64 {
    0.05
}

fn default_diffusion_probability() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnologyConfig {
    /// Progress earned per unit of the product produced.
    #[serde(default = "default_research_rate")]
    pub research_rate: f64,
    #[serde(default = "default_diffusion_probability")]
    pub diffusion_probability: f64,
}

impl Default for TechnologyConfig {
    fn default() -> Self {
        Self {
            research_rate: default_research_rate(),
            diffusion_probability: default_diffusion_probability(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
