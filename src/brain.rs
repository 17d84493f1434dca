//! Decision strategies for polities.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hierarchy::attack_targets;
use crate::numeric::chance;
use crate::polity::PolityId;
use crate::war::{coalition_attack, coalition_defense, win_probability};
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Recover,
    Attack(PolityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Brain {
    /// Never attacks.
    Passive,
    /// Attacks a uniformly chosen valid target with the given probability.
    Random { attack_probability: f64 },
    /// Considers attacking with the given probability, then picks the target
    /// with the best odds if those odds reach `min_odds`.
    Opportunist { attack_probability: f64, min_odds: f64 },
}

impl Default for Brain {
    fn default() -> Self {
        Brain::Random {
            attack_probability: 0.2,
        }
    }
}

impl Brain {
    pub fn decide(&self, world: &World, me: PolityId, rng: &mut impl Rng) -> Result<Action> {
        match *self {
            Brain::Passive => Ok(Action::Recover),
            Brain::Random { attack_probability } => {
                if !chance(rng, attack_probability) {
                    return Ok(Action::Recover);
                }
                let targets = attack_targets(world, me)?;
                Ok(targets
                    .choose(rng)
                    .map(|t| Action::Attack(*t))
                    .unwrap_or(Action::Recover))
            }
            Brain::Opportunist {
                attack_probability,
                min_odds,
            } => {
                if !chance(rng, attack_probability) {
                    return Ok(Action::Recover);
                }
                let config = &world.config().war;
                let mut best: Option<(PolityId, f64)> = None;
                for target in attack_targets(world, me)? {
                    let ap = coalition_attack(world, me, target, config)?;
                    let dp = coalition_defense(world, target, me, config)?;
                    let odds = win_probability(ap, dp);
                    if best.map_or(true, |(_, b)| odds > b) {
                        best = Some((target, odds));
                    }
                }
                Ok(match best {
                    Some((target, odds)) if odds >= min_odds => Action::Attack(target),
                    _ => Action::Recover,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::terrain::TerrainFractions;
    use crate::tile::{Culture, Religion};
    use crate::world::TileSeed;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pair(populations: [u64; 2]) -> World {
        let mut world = World::new("pair", 2, 1, SimulationConfig::default());
        for (i, population) in populations.into_iter().enumerate() {
            let id = world.add_polity(format!("P{i}"), "#101010", Brain::Passive);
            world
                .add_tile(TileSeed {
                    terrain: TerrainFractions::new(0.0, 0.5, 0.0).unwrap(),
                    area_acres: 1000.0,
                    river: false,
                    population,
                    construction: 0,
                    culture: Culture::default(),
                    religion: Religion::default(),
                    controller: id,
                })
                .unwrap();
        }
        world
    }

    #[test]
    fn passive_never_attacks() {
        let world = pair([100, 100]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            Brain::Passive.decide(&world, PolityId(0), &mut rng).unwrap(),
            Action::Recover
        );
    }

    #[test]
    fn certain_random_brain_attacks_its_only_neighbor() {
        let world = pair([100, 100]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let brain = Brain::Random {
            attack_probability: 1.0,
        };
        assert_eq!(
            brain.decide(&world, PolityId(0), &mut rng).unwrap(),
            Action::Attack(PolityId(1))
        );
    }

    #[test]
    fn opportunist_waits_for_good_odds() {
        let world = pair([100, 10_000]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let brain = Brain::Opportunist {
            attack_probability: 1.0,
            min_odds: 0.6,
        };
        assert_eq!(brain.decide(&world, PolityId(0), &mut rng).unwrap(), Action::Recover);
        assert_eq!(
            brain.decide(&world, PolityId(1), &mut rng).unwrap(),
            Action::Attack(PolityId(0))
        );
    }

    #[test]
    fn brains_parse_from_yaml() {
        let yaml = "kind: opportunist\nattack_probability: 0.4\nmin_odds: 0.7\n";
        let brain: Brain = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            brain,
            Brain::Opportunist {
                attack_probability: 0.4,
                min_odds: 0.7
            }
        );
    }
}
