//! Coalition strength, battle odds and conquest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::WarConfig;
use crate::error::Result;
use crate::hierarchy::{make_vassal, release, release_disconnected};
use crate::polity::{ActorKind, PolityId};
use crate::world::World;

/// Contest success function `ap² / (ap² + dp²)`, with 0/0 read as even odds.
pub fn win_probability(attack: f64, defense: f64) -> f64 {
    let ap = attack.max(0.0);
    let dp = defense.max(0.0);
    let a2 = ap * ap;
    let d2 = dp * dp;
    if a2 + d2 <= 0.0 {
        return 0.5;
    }
    a2 / (a2 + d2)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Power {
    pub attack: f64,
    pub defense: f64,
}

/// Strength of a single polity from the tiles it controls directly.
pub fn polity_power(world: &World, id: PolityId, config: &WarConfig) -> Result<Power> {
    let polity = world.polity(id)?;
    let mut manpower = 0.0;
    let mut mobile = 0.0;
    let mut construction = 0.0;
    for tile in world.tiles().iter().filter(|t| t.controller == id) {
        manpower += tile.population as f64;
        mobile += tile.population as f64 * tile.culture.mobility;
        construction += tile.construction as f64;
    }
    let cohesion = 0.5 + 0.5 * polity.cohesion();
    Ok(Power {
        attack: config.participation * mobile * cohesion,
        defense: (config.participation * manpower + config.fortification * construction)
            * cohesion,
    })
}

/// Attack strength of `leader` and its direct vassals against `target`.
/// A vassal turning on its own suzerain fights with its defensive figure.
pub fn coalition_attack(
    world: &World,
    leader: PolityId,
    target: PolityId,
    config: &WarConfig,
) -> Result<f64> {
    let polity = world.polity(leader)?;
    let own = polity_power(world, leader, config)?;
    let mut total = if polity.suzerain == Some(target) {
        own.defense
    } else {
        own.attack
    };
    for ally in &polity.vassals {
        if *ally == target {
            continue;
        }
        total += config.allied_attack_share * polity_power(world, *ally, config)?.attack;
    }
    Ok(total)
}

/// Defense strength of `defender` and its direct vassals against `attacker`.
pub fn coalition_defense(
    world: &World,
    defender: PolityId,
    attacker: PolityId,
    config: &WarConfig,
) -> Result<f64> {
    let polity = world.polity(defender)?;
    let mut total = polity_power(world, defender, config)?.defense;
    for ally in &polity.vassals {
        if *ally == attacker {
            continue;
        }
        total += polity_power(world, *ally, config)?.defense;
    }
    Ok(total)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battle {
    pub turn: u64,
    pub attacker: PolityId,
    pub defender: PolityId,
    pub attack_power: f64,
    pub defense_power: f64,
    pub win_probability: f64,
    pub attacker_won: bool,
}

/// Battles each polity has already fought this turn, by role.
#[derive(Debug, Clone, Default)]
pub struct BattleFatigue {
    fought: HashMap<PolityId, (i32, i32)>,
}

impl BattleFatigue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attacks(&self, id: PolityId) -> i32 {
        self.fought.get(&id).map_or(0, |(attacks, _)| *attacks)
    }

    pub fn defenses(&self, id: PolityId) -> i32 {
        self.fought.get(&id).map_or(0, |(_, defenses)| *defenses)
    }

    /// Power multiplier for a polity entering another battle, whichever side
    /// it takes: every earlier battle wears it down at its role's rate.
    pub fn factor(&self, id: PolityId, config: &WarConfig) -> f64 {
        config.attack_fatigue.powi(self.attacks(id))
            * config.defense_fatigue.powi(self.defenses(id))
    }

    pub fn record(&mut self, attacker: PolityId, defender: PolityId) {
        self.fought.entry(attacker).or_default().0 += 1;
        self.fought.entry(defender).or_default().1 += 1;
    }
}

/// Hands `target` to `attacker` as a direct vassal. Returns every polity
/// released along the way.
pub fn conquer(
    world: &mut World,
    attacker: PolityId,
    target: PolityId,
    config: &WarConfig,
) -> Result<Vec<PolityId>> {
    let mut released = Vec::new();

    let own_vassals: Vec<PolityId> = world.polity(target)?.vassals.iter().copied().collect();
    for vassal in own_vassals {
        release(world, vassal)?;
        released.push(vassal);
    }

    if let Some(former) = release(world, target)? {
        released.extend(release_disconnected(world, former)?);
    }

    make_vassal(world, target, attacker)?;
    world
        .polity_mut(attacker)?
        .strengthen(ActorKind::Warriors, config.victory_influence);
    debug!(
        attacker = attacker.raw(),
        target = target.raw(),
        released = released.len(),
        "conquest"
    );
    Ok(released)
}
