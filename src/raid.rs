//! Raid resolution between a raiding tile and a victim tile.

use serde::{Deserialize, Serialize};

use crate::config::RaidConfig;
use crate::numeric::floor_count;
use crate::tile::{Culture, Religion, TileId};

/// How the two tiles' polities relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// Suzerain and vassal; raids between them are suppressed.
    Overlord,
    /// Different tiles of one polity.
    SamePolity,
    /// The tile raiding itself, or unrelated polities.
    Foreign,
}

/// Integer, sign-constrained consequences of one raid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaidOutcome {
    pub raider: TileId,
    pub victim: TileId,
    victim_pop_loss: i64,
    raider_pop_gain: i64,
    raider_pop_loss: i64,
    loot_fraction: f64,
}

impl RaidOutcome {
    /// Clamps every field into its allowed range.
    pub fn new(
        raider: TileId,
        victim: TileId,
        victim_pop_loss: i64,
        raider_pop_gain: i64,
        raider_pop_loss: i64,
        loot_fraction: f64,
        max_loot_fraction: f64,
    ) -> Self {
        let loot_fraction = if loot_fraction.is_finite() {
            loot_fraction.clamp(0.0, max_loot_fraction.max(0.0))
        } else {
            0.0
        };
        Self {
            raider,
            victim,
            victim_pop_loss: victim_pop_loss.min(0),
            raider_pop_gain: raider_pop_gain.max(0),
            raider_pop_loss: raider_pop_loss.min(0),
            loot_fraction,
        }
    }

    pub fn victim_pop_loss(&self) -> i64 {
        self.victim_pop_loss
    }

    pub fn raider_pop_gain(&self) -> i64 {
        self.raider_pop_gain
    }

    pub fn raider_pop_loss(&self) -> i64 {
        self.raider_pop_loss
    }

    pub fn loot_fraction(&self) -> f64 {
        self.loot_fraction
    }
}

/// One side of a raid.
#[derive(Debug, Clone, Copy)]
pub struct RaidParty {
    pub tile: TileId,
    pub population: u64,
    pub culture: Culture,
    pub religion: Religion,
}

pub struct RaidResolver<'a> {
    config: &'a RaidConfig,
}

impl<'a> RaidResolver<'a> {
    pub fn new(config: &'a RaidConfig) -> Self {
        Self { config }
    }

    pub fn raiders(&self, population: u64) -> u64 {
        if self.config.raider_divisor == 0 {
            return 0;
        }
        population / self.config.raider_divisor
    }

    /// `1 / (k_raiders/raiders + k_targets/targets)`; zero when either side is empty.
    pub fn base_effect(&self, raiders: u64, targets: u64) -> f64 {
        if raiders == 0 || targets == 0 {
            return 0.0;
        }
        let denom =
            self.config.k_raiders / raiders as f64 + self.config.k_targets / targets as f64;
        if denom <= 0.0 {
            return 0.0;
        }
        1.0 / denom
    }

    pub fn relationship_factor(&self, relationship: Relationship) -> f64 {
        match relationship {
            Relationship::Overlord => 0.0,
            Relationship::SamePolity => self.config.same_polity_factor,
            Relationship::Foreign => 1.0,
        }
    }

    pub fn religion_factor(raider: &Religion, victim: &Religion) -> f64 {
        if raider.peace && victim.peace {
            if raider.war || victim.war {
                0.5
            } else {
                0.25
            }
        } else {
            let mut factor = 1.0;
            if raider.pacifist() {
                factor *= 0.5;
            }
            if victim.pacifist() {
                factor *= 0.5;
            }
            factor
        }
    }

    pub fn mobility_factor(&self, raider: &Culture, victim: &Culture) -> f64 {
        if raider.mobility > victim.mobility {
            self.config.mobility_advantage
        } else if raider.mobility < victim.mobility {
            self.config.mobility_disadvantage
        } else {
            1.0
        }
    }

    /// People carried off out of `victim_loss`; never more than were lost.
    pub fn captives(&self, victim_loss: u64, raider: &Culture) -> u64 {
        floor_count(victim_loss as f64 * self.config.capture_rate * raider.capture.max(0.0))
            .min(victim_loss)
    }

    /// Caps an outcome against the people each side still has after the
    /// raids already applied this turn, recomputing captives from the loss
    /// that actually happened.
    pub fn settle(
        &self,
        outcome: &RaidOutcome,
        raider: &Culture,
        victim_remaining: u64,
        raider_remaining: u64,
    ) -> RaidOutcome {
        let victim_loss = outcome.victim_pop_loss().unsigned_abs().min(victim_remaining);
        // A self-raid draws casualties from what the victim side left behind.
        let raider_left = if outcome.raider == outcome.victim {
            raider_remaining.saturating_sub(victim_loss)
        } else {
            raider_remaining
        };
        let casualties = outcome.raider_pop_loss().unsigned_abs().min(raider_left);
        RaidOutcome::new(
            outcome.raider,
            outcome.victim,
            -(victim_loss as i64),
            self.captives(victim_loss, raider) as i64,
            -(casualties as i64),
            outcome.loot_fraction(),
            self.config.max_loot_fraction,
        )
    }

    /// Resolves one raid given an already drawn random multiplier. Returns
    /// `None` when nobody can raid or nobody is there to be raided.
    pub fn resolve(
        &self,
        raider: &RaidParty,
        victim: &RaidParty,
        relationship: Relationship,
        multiplier: f64,
    ) -> Option<RaidOutcome> {
        let raiders = self.raiders(raider.population);
        let targets = victim.population;
        if raiders == 0 || targets == 0 {
            return None;
        }
        let base = self.base_effect(raiders, targets);
        let effect = base
            * multiplier
            * raider.culture.raid_intensity
            * self.relationship_factor(relationship)
            * Self::religion_factor(&raider.religion, &victim.religion)
            * self.mobility_factor(&raider.culture, &victim.culture);
        let effect = effect.max(0.0);

        let victim_loss = floor_count(effect).min(victim.population);
        let captured = self.captives(victim_loss, &raider.culture);
        let casualties = floor_count(base * self.config.casualty_rate);
        let loot = effect / targets as f64 * self.config.loot_rate;

        Some(RaidOutcome::new(
            raider.tile,
            victim.tile,
            -(victim_loss as i64),
            captured as i64,
            -(casualties as i64),
            loot,
            self.config.max_loot_fraction,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(tile: u32, population: u64) -> RaidParty {
        RaidParty {
            tile: TileId(tile),
            population,
            culture: Culture::default(),
            religion: Religion::default(),
        }
    }

    #[test]
    fn self_raid_on_five_hundred() {
        let config = RaidConfig::default();
        let resolver = RaidResolver::new(&config);
        assert_eq!(resolver.raiders(500), 100);
        let base = resolver.base_effect(100, 500);
        assert!((base - 1.0 / 0.018).abs() < 1e-9);

        let tile = party(0, 500);
        let outcome = resolver
            .resolve(&tile, &tile, Relationship::Foreign, 1.0)
            .unwrap();
        assert_eq!(outcome.victim_pop_loss(), -55);
        assert_eq!(outcome.raider_pop_gain(), 11);
        assert_eq!(outcome.raider_pop_loss(), -5);
        assert_eq!(
            outcome,
            resolver.resolve(&tile, &tile, Relationship::Foreign, 1.0).unwrap()
        );
    }

    #[test]
    fn vassal_raids_do_nothing() {
        let config = RaidConfig::default();
        let resolver = RaidResolver::new(&config);
        let outcome = resolver
            .resolve(&party(0, 900), &party(1, 900), Relationship::Overlord, 1.25)
            .unwrap();
        assert_eq!(outcome.victim_pop_loss(), 0);
        assert_eq!(outcome.raider_pop_gain(), 0);
        assert_eq!(outcome.loot_fraction(), 0.0);
    }

    #[test]
    fn tiny_tiles_cannot_raid() {
        let config = RaidConfig::default();
        let resolver = RaidResolver::new(&config);
        let foreign = Relationship::Foreign;
        assert!(resolver.resolve(&party(0, 4), &party(1, 100), foreign, 1.0).is_none());
        assert!(resolver.resolve(&party(0, 400), &party(1, 0), foreign, 1.0).is_none());
    }

    #[test]
    fn religion_table() {
        let peaceful = Religion {
            peace: true,
            war: false,
            productivity: 1.0,
        };
        let zealous = Religion {
            peace: true,
            war: true,
            productivity: 1.0,
        };
        let plain = Religion::default();
        assert_eq!(RaidResolver::religion_factor(&peaceful, &peaceful), 0.25);
        assert_eq!(RaidResolver::religion_factor(&peaceful, &zealous), 0.5);
        assert_eq!(RaidResolver::religion_factor(&plain, &peaceful), 0.5);
        assert_eq!(RaidResolver::religion_factor(&peaceful, &plain), 0.5);
        assert_eq!(RaidResolver::religion_factor(&plain, &plain), 1.0);
    }

    #[test]
    fn mobility_favors_the_faster_side() {
        let config = RaidConfig::default();
        let resolver = RaidResolver::new(&config);
        let riders = Culture {
            mobility: 2.0,
            ..Culture::default()
        };
        let farmers = Culture::default();
        assert_eq!(resolver.mobility_factor(&riders, &farmers), 1.5);
        assert_eq!(resolver.mobility_factor(&farmers, &riders), 0.25);
        assert_eq!(resolver.mobility_factor(&farmers, &farmers), 1.0);
    }

    #[test]
    fn settling_caps_losses_and_captives_at_what_remains() {
        let config = RaidConfig::default();
        let resolver = RaidResolver::new(&config);
        let culture = Culture::default();
        let outcome = RaidOutcome::new(TileId(0), TileId(1), -300, 60, -40, 0.1, 0.5);
        let settled = resolver.settle(&outcome, &culture, 50, 10);
        assert_eq!(settled.victim_pop_loss(), -50);
        assert_eq!(settled.raider_pop_gain(), resolver.captives(50, &culture) as i64);
        assert_eq!(settled.raider_pop_loss(), -10);
        assert_eq!(settled.loot_fraction(), 0.1);

        let untouched = resolver.settle(&outcome, &culture, 1_000, 1_000);
        assert_eq!(untouched, outcome);
    }

    #[test]
    fn captives_never_exceed_losses() {
        let config = RaidConfig {
            capture_rate: 0.9,
            ..RaidConfig::default()
        };
        let resolver = RaidResolver::new(&config);
        let slavers = Culture {
            capture: 3.0,
            ..Culture::default()
        };
        assert_eq!(resolver.captives(40, &slavers), 40);
    }

    #[test]
    fn constructor_enforces_signs() {
        let outcome = RaidOutcome::new(TileId(0), TileId(1), 7, -3, 2, 3.0, 0.5);
        assert_eq!(outcome.victim_pop_loss(), 0);
        assert_eq!(outcome.raider_pop_gain(), 0);
        assert_eq!(outcome.raider_pop_loss(), 0);
        assert_eq!(outcome.loot_fraction(), 0.5);
    }
}
