//! Suzerainty forest: vassalage, release, reachability and attack rules.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::debug;

use crate::error::{Result, SimError};
use crate::polity::PolityId;
use crate::raid::Relationship;
use crate::tile::TileId;
use crate::world::World;

/// Suzerains above `id`, nearest first.
pub fn suzerain_chain(world: &World, id: PolityId) -> Result<Vec<PolityId>> {
    let mut chain = Vec::new();
    let mut seen = HashSet::from([id]);
    let mut current = world.polity(id)?.suzerain;
    while let Some(next) = current {
        if !seen.insert(next) {
            return Err(SimError::SuzeraintyCycle(id));
        }
        chain.push(next);
        current = world.polity(next)?.suzerain;
    }
    Ok(chain)
}

pub fn ultimate_suzerain(world: &World, id: PolityId) -> Result<PolityId> {
    Ok(suzerain_chain(world, id)?.last().copied().unwrap_or(id))
}

/// `id` plus every polity below it in the hierarchy.
pub fn realm(world: &World, id: PolityId) -> Result<Vec<PolityId>> {
    let mut out = Vec::new();
    let mut queue = VecDeque::from([id]);
    let mut seen = HashSet::new();
    while let Some(next) = queue.pop_front() {
        if !seen.insert(next) {
            return Err(SimError::SuzeraintyCycle(id));
        }
        out.push(next);
        queue.extend(world.polity(next)?.vassals.iter().copied());
    }
    Ok(out)
}

pub fn realm_population(world: &World, id: PolityId) -> Result<u64> {
    Ok(realm(world, id)?
        .into_iter()
        .map(|p| world.polity_population(p))
        .sum())
}

/// Places `vassal` directly under `suzerain`, detaching it from any prior
/// suzerain first. Rejects anything that would close a cycle.
pub fn make_vassal(world: &mut World, vassal: PolityId, suzerain: PolityId) -> Result<()> {
    world.polity(vassal)?;
    world.polity(suzerain)?;
    if vassal == suzerain || suzerain_chain(world, suzerain)?.contains(&vassal) {
        return Err(SimError::SuzeraintyCycle(vassal));
    }
    release(world, vassal)?;
    world.polity_mut(vassal)?.suzerain = Some(suzerain);
    let lord = world.polity_mut(suzerain)?;
    lord.vassals.insert(vassal);
    lord.add_vassal_actor(vassal);
    debug!(vassal = vassal.raw(), suzerain = suzerain.raw(), "vassalized");
    Ok(())
}

/// Makes `vassal` sovereign. Returns its former suzerain, if any.
pub fn release(world: &mut World, vassal: PolityId) -> Result<Option<PolityId>> {
    let Some(former) = world.polity_mut(vassal)?.suzerain.take() else {
        return Ok(None);
    };
    let lord = world.polity_mut(former)?;
    lord.vassals.remove(&vassal);
    lord.remove_vassal_actor(vassal);
    debug!(vassal = vassal.raw(), suzerain = former.raw(), "released");
    Ok(Some(former))
}

/// Releases every direct vassal of `suzerain` whose tiles can no longer be
/// reached from the suzerain's own tiles through tiles held by the suzerain
/// or its remaining direct vassals.
pub fn release_disconnected(world: &mut World, suzerain: PolityId) -> Result<Vec<PolityId>> {
    let vassals: Vec<PolityId> = world.polity(suzerain)?.vassals.iter().copied().collect();
    if vassals.is_empty() {
        return Ok(Vec::new());
    }
    let mut held: HashSet<PolityId> = vassals.iter().copied().collect();
    held.insert(suzerain);

    let mut reached: HashSet<TileId> = HashSet::new();
    let mut queue: VecDeque<TileId> = world.tiles_of(suzerain).into_iter().collect();
    reached.extend(queue.iter().copied());
    while let Some(tile) = queue.pop_front() {
        for next in world.neighbors(tile) {
            if reached.contains(&next) {
                continue;
            }
            if held.contains(&world.tile(next)?.controller) {
                reached.insert(next);
                queue.push_back(next);
            }
        }
    }

    let mut released = Vec::new();
    for vassal in vassals {
        let connected = world
            .tiles_of(vassal)
            .iter()
            .any(|t| reached.contains(t));
        if !connected {
            release(world, vassal)?;
            released.push(vassal);
        }
    }
    Ok(released)
}

/// Polities owning a tile adjacent to one held by `id` or its direct vassals.
pub fn neighbors(world: &World, id: PolityId) -> Result<BTreeSet<PolityId>> {
    let polity = world.polity(id)?;
    let mut bloc: HashSet<PolityId> = polity.vassals.iter().copied().collect();
    bloc.insert(id);
    let mut out = BTreeSet::new();
    for tile in world.tiles() {
        if !bloc.contains(&tile.controller) {
            continue;
        }
        for next in world.neighbors(tile.id) {
            let owner = world.tile(next)?.controller;
            if owner != id {
                out.insert(owner);
            }
        }
    }
    Ok(out)
}

pub fn can_attack(world: &World, attacker: PolityId, target: PolityId) -> Result<bool> {
    if attacker == target {
        return Ok(false);
    }
    let polity = world.polity(attacker)?;
    world.polity(target)?;
    if let Some(lord) = polity.suzerain {
        return Ok(lord == target);
    }
    if polity.vassals.contains(&target) {
        return Ok(false);
    }
    Ok(neighbors(world, attacker)?.contains(&target))
}

/// Every target `attacker` may currently attack, in id order.
pub fn attack_targets(world: &World, attacker: PolityId) -> Result<Vec<PolityId>> {
    let mut out = Vec::new();
    for candidate in world.polity_ids() {
        if can_attack(world, attacker, candidate)? {
            out.push(candidate);
        }
    }
    Ok(out)
}

/// Relationship of the polities controlling two tiles, for raiding.
pub fn relationship(world: &World, raider: TileId, victim: TileId) -> Result<Relationship> {
    if raider == victim {
        return Ok(Relationship::Foreign);
    }
    let a = world.tile(raider)?.controller;
    let b = world.tile(victim)?.controller;
    if a == b {
        return Ok(Relationship::SamePolity);
    }
    let pa = world.polity(a)?;
    let pb = world.polity(b)?;
    if pa.suzerain == Some(b) || pb.suzerain == Some(a) {
        return Ok(Relationship::Overlord);
    }
    Ok(Relationship::Foreign)
}

/// Checks that the hierarchy is a forest with consistent back-references.
pub fn audit(world: &World) -> Result<()> {
    for polity in world.polities() {
        suzerain_chain(world, polity.id)?;
        if let Some(lord) = polity.suzerain {
            if !world.polity(lord)?.vassals.contains(&polity.id) {
                return Err(SimError::invariant(format!(
                    "{:?} names {:?} as suzerain but is not in its vassal set",
                    polity.id, lord
                )));
            }
        }
        for vassal in &polity.vassals {
            if world.polity(*vassal)?.suzerain != Some(polity.id) {
                return Err(SimError::invariant(format!(
                    "{:?} lists {:?} as vassal without a matching suzerain",
                    polity.id, vassal
                )));
            }
        }
    }
    Ok(())
}
