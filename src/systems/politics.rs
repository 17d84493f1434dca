use std::collections::HashMap;

use rand::Rng;
use tracing::debug;

use crate::{
    brain::Action,
    engine::{System, SystemContext},
    error::Result,
    hierarchy::{can_attack, realm_population},
    polity::{PolityId, RankRecord},
    rng::SystemRng,
    war::{coalition_attack, coalition_defense, conquer, win_probability, Battle, BattleFatigue},
    world::World,
};

pub struct PoliticsSystem;

impl PoliticsSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PoliticsSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl PoliticsSystem {
    fn record_ranks(world: &mut World, turn: u64) -> Result<()> {
        let mut sovereigns = Vec::new();
        for polity in world.polities() {
            if polity.is_sovereign() {
                sovereigns.push((polity.id, realm_population(world, polity.id)?));
            }
        }
        sovereigns.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let ranks: HashMap<PolityId, usize> = sovereigns
            .iter()
            .enumerate()
            .map(|(rank, (id, _))| (*id, rank + 1))
            .collect();

        for id in world.polity_ids() {
            let realm_population = realm_population(world, id)?;
            world.polity_mut(id)?.ranks.push(RankRecord {
                turn,
                rank: ranks.get(&id).copied(),
                realm_population,
            });
        }
        Ok(())
    }
}

impl System for PoliticsSystem {
    fn name(&self) -> &str {
        "politics"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let config = world.config().war.clone();
        world.battles.clear();

        // Every brain sees the same pre-war world.
        let mut decisions = Vec::new();
        for id in world.polity_ids() {
            let brain = world.polity(id)?.brain;
            decisions.push((id, brain.decide(world, id, rng)?));
        }

        let mut fatigue = BattleFatigue::new();
        for (attacker, action) in decisions {
            let Action::Attack(target) = action else {
                continue;
            };
            if !can_attack(world, attacker, target)? {
                debug!(
                    turn = ctx.turn,
                    attacker = attacker.raw(),
                    target = target.raw(),
                    "attack no longer possible"
                );
                continue;
            }
            let ap = coalition_attack(world, attacker, target, &config)?
                * fatigue.factor(attacker, &config);
            let dp = coalition_defense(world, target, attacker, &config)?
                * fatigue.factor(target, &config);
            fatigue.record(attacker, target);

            let odds = win_probability(ap, dp);
            let attacker_won = rng.gen_bool(odds.clamp(0.0, 1.0));
            debug!(
                turn = ctx.turn,
                attacker = attacker.raw(),
                defender = target.raw(),
                attack = ap,
                defense = dp,
                odds,
                attacker_won,
                "battle"
            );
            if attacker_won {
                conquer(world, attacker, target, &config)?;
            }
            world.battles.push(Battle {
                turn: ctx.turn,
                attacker,
                defender: target,
                attack_power: ap,
                defense_power: dp,
                win_probability: odds,
                attacker_won,
            });
        }

        Self::record_ranks(world, ctx.turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::Brain;
    use crate::config::SimulationConfig;
    use crate::rng::RngManager;
    use crate::terrain::TerrainFractions;
    use crate::tile::{Culture, Religion};
    use crate::world::TileSeed;

    const EAGER: Brain = Brain::Random {
        attack_probability: 1.0,
    };

    /// One tile per polity, side by side.
    fn pair(config: SimulationConfig, sides: [(u64, Brain); 2]) -> World {
        let mut world = World::new("pair", 2, 1, config);
        for (i, (population, brain)) in sides.into_iter().enumerate() {
            let id = world.add_polity(format!("P{i}"), "#205080", brain);
            world
                .add_tile(TileSeed {
                    terrain: TerrainFractions::new(0.0, 0.5, 0.3).unwrap(),
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

    fn run(world: &mut World, seed: u64) {
        let mut rng = RngManager::new(seed);
        let ctx = SystemContext {
            turn: 4,
            year: 80,
            scenario_name: "pair",
        };
        PoliticsSystem::new()
            .run(&ctx, world, &mut rng.stream("politics"))
            .unwrap();
    }

    #[test]
    fn defending_first_wears_down_the_later_attack() {
        let mut config = SimulationConfig::default();
        config.war.defense_fatigue = 0.0;
        config.war.attack_fatigue = 1.0;
        let mut world = pair(config, [(1_000, EAGER), (1_000, EAGER)]);
        run(&mut world, 2);

        let battles = world.battles();
        assert_eq!(battles.len(), 2);
        assert_eq!(battles[0].attacker, PolityId(0));
        assert!(battles[0].attack_power > 0.0);
        assert!(battles[0].defense_power > 0.0);
        // P1 already defended, so its own attack is fully spent.
        assert_eq!(battles[1].attacker, PolityId(1));
        assert_eq!(battles[1].attack_power, 0.0);
        assert!(battles[1].defense_power > 0.0);
    }

    #[test]
    fn attacking_first_wears_down_the_later_defense() {
        let mut config = SimulationConfig::default();
        config.war.defense_fatigue = 1.0;
        config.war.attack_fatigue = 0.0;
        let mut world = pair(config, [(1_000, EAGER), (1_000, EAGER)]);
        run(&mut world, 2);

        let battles = world.battles();
        assert_eq!(battles.len(), 2);
        assert!(battles[1].attack_power > 0.0);
        assert_eq!(battles[1].defense_power, 0.0);
        assert_eq!(battles[1].win_probability, 1.0);
    }

    #[test]
    fn overwhelming_attack_conquers_and_ranks_are_recorded() {
        let mut world = pair(
            SimulationConfig::default(),
            [(100_000, EAGER), (100, Brain::Passive)],
        );
        run(&mut world, 9);

        assert_eq!(world.battles().len(), 1);
        assert!(world.battles()[0].attacker_won);
        assert_eq!(world.battles()[0].turn, 4);
        let victor = world.polity(PolityId(0)).unwrap();
        let vassal = world.polity(PolityId(1)).unwrap();
        assert_eq!(vassal.suzerain, Some(PolityId(0)));
        assert!(victor.vassals.contains(&PolityId(1)));

        let top = victor.ranks.last().unwrap();
        assert_eq!((top.turn, top.rank, top.realm_population), (4, Some(1), 100_100));
        let under = vassal.ranks.last().unwrap();
        assert_eq!((under.turn, under.rank, under.realm_population), (4, None, 100));
    }

    #[test]
    fn passive_world_only_records_ranks() {
        let mut world = pair(
            SimulationConfig::default(),
            [(300, Brain::Passive), (700, Brain::Passive)],
        );
        run(&mut world, 1);
        assert!(world.battles().is_empty());
        assert_eq!(world.polity(PolityId(1)).unwrap().ranks[0].rank, Some(1));
        assert_eq!(world.polity(PolityId(0)).unwrap().ranks[0].rank, Some(2));
    }
}
