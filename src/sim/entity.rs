//! Entity store
//!
//! Owns every simulated object of one session. Entities live in a single
//! `BTreeMap` keyed by id so iteration is always in ascending id order, which
//! keeps collision "first match wins" stable across runs.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::WorldBounds;
use crate::consts::DEFAULT_GROUP_CAP;

/// Session-unique entity id (monotonic, never reused)
pub type EntityId = u32;

/// Entity groups that collision rules are written against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityGroup {
    Player,
    Bullet,
    Enemy,
    Pickup,
    Hazard,
}

impl EntityGroup {
    pub const ALL: [EntityGroup; 5] = [
        EntityGroup::Player,
        EntityGroup::Bullet,
        EntityGroup::Enemy,
        EntityGroup::Pickup,
        EntityGroup::Hazard,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Initial kinematic state handed to [`EntityStore::spawn`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    #[serde(default)]
    pub ttl: Option<u32>,
    /// Game-specific variant (asteroid size, enemy kind, house type...)
    #[serde(default)]
    pub tag: u32,
    #[serde(default)]
    pub heading: f32,
}

impl EntitySpec {
    pub fn at(x: f32, y: f32, radius: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            radius,
            ttl: None,
            tag: 0,
            heading: 0.0,
        }
    }

    pub fn with_vel(mut self, vx: f32, vy: f32) -> Self {
        self.vel = Vec2::new(vx, vy);
        self
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_tag(mut self, tag: u32) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }
}

/// A simulated object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub group: EntityGroup,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Collision radius
    pub radius: f32,
    /// Ticks remaining; removed when it reaches zero
    pub ttl: Option<u32>,
    pub alive: bool,
    pub tag: u32,
    /// Facing angle in radians (thrust control)
    pub heading: f32,
    /// Fire cooldown ticks
    pub cooldown: u32,
}

/// Id-keyed entity storage with per-group live caps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    bounds: WorldBounds,
    entities: BTreeMap<EntityId, Entity>,
    caps: [usize; 5],
    counts: [usize; 5],
    next_id: EntityId,
}

impl EntityStore {
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            entities: BTreeMap::new(),
            caps: [DEFAULT_GROUP_CAP; 5],
            counts: [0; 5],
            next_id: 1,
        }
    }

    pub fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    pub fn set_cap(&mut self, group: EntityGroup, cap: usize) {
        self.caps[group.index()] = cap;
    }

    pub fn cap(&self, group: EntityGroup) -> usize {
        self.caps[group.index()]
    }

    /// Spawn an entity, clamping its position into the world
    ///
    /// Returns `None` (and creates nothing) if the group is at its cap.
    pub fn spawn(&mut self, group: EntityGroup, spec: EntitySpec) -> Option<EntityId> {
        let slot = group.index();
        if self.counts[slot] >= self.caps[slot] {
            log::trace!("{:?} at cap ({}), spawn dropped", group, self.caps[slot]);
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                group,
                pos: self.bounds.clamp(spec.pos),
                vel: spec.vel,
                radius: spec.radius.max(0.0),
                ttl: spec.ttl,
                alive: true,
                tag: spec.tag,
                heading: spec.heading,
                cooldown: 0,
            },
        );
        self.counts[slot] += 1;
        Some(id)
    }

    /// Remove an entity outright
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        if entity.alive {
            self.counts[entity.group.index()] -= 1;
        }
        Some(entity)
    }

    /// Mark an entity dead; it stops counting toward caps and is skipped by
    /// iteration until [`purge_dead`](Self::purge_dead) drops it.
    pub fn kill(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(&id) {
            if entity.alive {
                entity.alive = false;
                self.counts[entity.group.index()] -= 1;
            }
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.get(&id).is_some_and(|e| e.alive)
    }

    /// Visit each live member of `group` in id order
    pub fn for_each(&self, group: EntityGroup, mut f: impl FnMut(&Entity)) {
        for entity in self.iter_group(group) {
            f(entity);
        }
    }

    /// Mutably visit each live member of `group` in id order
    pub fn for_each_mut(&mut self, group: EntityGroup, mut f: impl FnMut(&mut Entity)) {
        for entity in self.entities.values_mut() {
            if entity.alive && entity.group == group {
                f(entity);
            }
        }
    }

    pub fn iter_group(&self, group: EntityGroup) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(move |e| e.alive && e.group == group)
    }

    /// Ids of live members of `group`, in id order
    pub fn ids(&self, group: EntityGroup) -> Vec<EntityId> {
        self.iter_group(group).map(|e| e.id).collect()
    }

    /// All live entities in id order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|e| e.alive)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut().filter(|e| e.alive)
    }

    /// Number of live members of `group`
    pub fn count(&self, group: EntityGroup) -> usize {
        self.counts[group.index()]
    }

    pub fn len(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entities killed this tick
    pub fn purge_dead(&mut self) {
        self.entities.retain(|_, e| e.alive);
    }

    /// Release every entity; ids keep counting up
    pub fn clear(&mut self) {
        self.entities.clear();
        self.counts = [0; 5];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::EdgePolicy;

    fn store() -> EntityStore {
        EntityStore::new(WorldBounds::new(400.0, 300.0, EdgePolicy::Clip))
    }

    #[test]
    fn test_ids_monotonic_never_reused() {
        let mut store = store();
        let a = store.spawn(EntityGroup::Enemy, EntitySpec::at(10.0, 10.0, 5.0)).unwrap();
        let b = store.spawn(EntityGroup::Enemy, EntitySpec::at(20.0, 10.0, 5.0)).unwrap();
        assert!(b > a);
        store.remove(b);
        let c = store.spawn(EntityGroup::Enemy, EntitySpec::at(30.0, 10.0, 5.0)).unwrap();
        assert!(c > b);
        store.clear();
        let d = store.spawn(EntityGroup::Enemy, EntitySpec::at(30.0, 10.0, 5.0)).unwrap();
        assert!(d > c);
    }

    #[test]
    fn test_spawn_clamps_into_world() {
        let mut store = store();
        let id = store
            .spawn(EntityGroup::Pickup, EntitySpec::at(-20.0, 900.0, 4.0))
            .unwrap();
        assert_eq!(store.get(id).unwrap().pos, Vec2::new(0.0, 300.0));
    }

    #[test]
    fn test_spawn_past_cap_is_dropped() {
        let mut store = store();
        store.set_cap(EntityGroup::Bullet, 500);
        for i in 0..999 {
            store.spawn(EntityGroup::Bullet, EntitySpec::at(i as f32 % 400.0, 0.0, 1.0));
        }
        assert_eq!(store.count(EntityGroup::Bullet), 500);
        assert!(store.spawn(EntityGroup::Bullet, EntitySpec::at(1.0, 1.0, 1.0)).is_none());
        assert_eq!(store.count(EntityGroup::Bullet), 500);
        // Other groups are unaffected
        assert!(store.spawn(EntityGroup::Enemy, EntitySpec::at(1.0, 1.0, 1.0)).is_some());
    }

    #[test]
    fn test_kill_frees_cap_slot() {
        let mut store = store();
        store.set_cap(EntityGroup::Bullet, 1);
        let id = store.spawn(EntityGroup::Bullet, EntitySpec::at(1.0, 1.0, 1.0)).unwrap();
        assert!(store.spawn(EntityGroup::Bullet, EntitySpec::at(1.0, 1.0, 1.0)).is_none());
        store.kill(id);
        assert!(!store.is_alive(id));
        assert!(store.spawn(EntityGroup::Bullet, EntitySpec::at(1.0, 1.0, 1.0)).is_some());
        store.purge_dead();
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_for_each_group_in_id_order() {
        let mut store = store();
        store.spawn(EntityGroup::Enemy, EntitySpec::at(1.0, 0.0, 1.0));
        store.spawn(EntityGroup::Bullet, EntitySpec::at(2.0, 0.0, 1.0));
        store.spawn(EntityGroup::Enemy, EntitySpec::at(3.0, 0.0, 1.0));

        let mut seen = Vec::new();
        store.for_each(EntityGroup::Enemy, |e| seen.push(e.pos.x));
        assert_eq!(seen, vec![1.0, 3.0]);
        assert!(store.get(999).is_none());
    }
}
