use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::brain::Brain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PolityId(pub u32);

impl PolityId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Ruler,
    Elders,
    Warriors,
    /// A subordinate polity's elite.
    Vassal(PolityId),
}

/// An internal power faction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub kind: ActorKind,
    pub influence: f64,
    pub complexity: u32,
}

const VASSAL_INFLUENCE: f64 = 0.1;
const VASSAL_COMPLEXITY: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankRecord {
    pub turn: u64,
    /// Position among sovereign realms by population; `None` while a vassal.
    pub rank: Option<usize>,
    pub realm_population: u64,
}

#[derive(Debug, Clone)]
pub struct Polity {
    pub id: PolityId,
    pub name: String,
    pub color: String,
    pub actors: Vec<Actor>,
    pub suzerain: Option<PolityId>,
    pub vassals: BTreeSet<PolityId>,
    pub brain: Brain,
    pub ranks: Vec<RankRecord>,
}

impl Polity {
    pub fn new(
        id: PolityId,
        name: impl Into<String>,
        color: impl Into<String>,
        brain: Brain,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            actors: vec![
                Actor {
                    kind: ActorKind::Ruler,
                    influence: 0.5,
                    complexity: 1,
                },
                Actor {
                    kind: ActorKind::Elders,
                    influence: 0.3,
                    complexity: 1,
                },
                Actor {
                    kind: ActorKind::Warriors,
                    influence: 0.2,
                    complexity: 1,
                },
            ],
            suzerain: None,
            vassals: BTreeSet::new(),
            brain,
            ranks: Vec::new(),
        }
    }

    pub fn is_sovereign(&self) -> bool {
        self.suzerain.is_none()
    }

    /// Herfindahl index of actor influence; 1 for a single dominant faction.
    pub fn cohesion(&self) -> f64 {
        self.actors.iter().map(|a| a.influence * a.influence).sum()
    }

    pub fn complexity(&self) -> u32 {
        self.actors.iter().map(|a| a.complexity).sum()
    }

    pub fn add_vassal_actor(&mut self, vassal: PolityId) {
        if self
            .actors
            .iter()
            .any(|a| a.kind == ActorKind::Vassal(vassal))
        {
            return;
        }
        self.actors.push(Actor {
            kind: ActorKind::Vassal(vassal),
            influence: VASSAL_INFLUENCE,
            complexity: VASSAL_COMPLEXITY,
        });
        self.normalize_influence();
    }

    pub fn remove_vassal_actor(&mut self, vassal: PolityId) {
        self.actors.retain(|a| a.kind != ActorKind::Vassal(vassal));
        self.normalize_influence();
    }

    pub fn strengthen(&mut self, kind: ActorKind, amount: f64) {
        if let Some(actor) = self.actors.iter_mut().find(|a| a.kind == kind) {
            actor.influence += amount.max(0.0);
        }
        self.normalize_influence();
    }

    fn normalize_influence(&mut self) {
        let total: f64 = self.actors.iter().map(|a| a.influence.max(0.0)).sum();
        if total <= 0.0 {
            return;
        }
        for actor in &mut self.actors {
            actor.influence = actor.influence.max(0.0) / total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polity() -> Polity {
        Polity::new(PolityId(1), "Ur", "#aa2211", Brain::Passive)
    }

    #[test]
    fn influence_stays_normalized() {
        let mut p = polity();
        p.add_vassal_actor(PolityId(4));
        p.add_vassal_actor(PolityId(4));
        p.strengthen(ActorKind::Warriors, 0.05);
        let total: f64 = p.actors.iter().map(|a| a.influence).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(p.actors.len(), 4);
        assert_eq!(p.complexity(), 5);

        p.remove_vassal_actor(PolityId(4));
        let total: f64 = p.actors.iter().map(|a| a.influence).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(p.actors.len(), 3);
    }

    #[test]
    fn cohesion_of_initial_factions() {
        let p = polity();
        assert!((p.cohesion() - 0.38).abs() < 1e-12);
    }
}
