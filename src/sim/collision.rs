//! Pairwise proximity collision between entity groups
//!
//! Every game in the cabinet uses the same simplified circle model: two
//! entities touch when their centers are closer than the sum of their radii
//! (or a fixed per-pair distance). Testing is first-match-wins in id order.

use glam::Vec2;

use super::entity::{Entity, EntityGroup, EntityId, EntityStore};
use super::rules::{CollisionRule, Threshold};

/// One colliding pair found this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    /// Index into `GameRules::collisions`
    pub rule: usize,
    pub first: EntityId,
    pub second: EntityId,
    pub first_group: EntityGroup,
    pub second_group: EntityGroup,
    pub first_pos: Vec2,
    pub second_pos: Vec2,
    /// Tag of the struck entity (point table / split key)
    pub second_tag: u32,
}

/// Strict disc overlap: distance < threshold
#[inline]
pub fn discs_overlap(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance_squared(b) < threshold * threshold
}

/// Contact distance for a pair under `threshold`
#[inline]
pub fn contact_distance(a: &Entity, b: &Entity, threshold: Threshold) -> f32 {
    match threshold {
        Threshold::RadiusSum => a.radius + b.radius,
        Threshold::Fixed(d) => d,
    }
}

/// Run every collision rule against the store
///
/// Each live member of a rule's first group hits at most one member of the
/// second group per tick. Consumed entities are killed immediately, so a
/// bullet that already hit cannot hit again and a destroyed enemy cannot be
/// struck by a later bullet in the same pass.
pub fn resolve(store: &mut EntityStore, rules: &[CollisionRule]) -> Vec<HitEvent> {
    let mut hits = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        for first_id in store.ids(rule.first) {
            // May have been consumed by an earlier rule or hit this pass
            let Some(first) = store.get(first_id).filter(|e| e.alive) else {
                continue;
            };

            // Same-group rules test each pair once, from its lower id
            let same_group = rule.first == rule.second;
            let found = store.iter_group(rule.second).find(|second| {
                let reach = contact_distance(first, second, rule.threshold);
                (!same_group || second.id > first.id)
                    && discs_overlap(first.pos, second.pos, reach)
            });

            let Some(second) = found else {
                continue;
            };

            let hit = HitEvent {
                rule: index,
                first: first.id,
                second: second.id,
                first_group: first.group,
                second_group: second.group,
                first_pos: first.pos,
                second_pos: second.pos,
                second_tag: second.tag,
            };
            log::trace!(
                "hit: {:?}#{} x {:?}#{}",
                hit.first_group,
                hit.first,
                hit.second_group,
                hit.second
            );

            if rule.consume_first {
                store.kill(hit.first);
            }
            if rule.consume_second {
                store.kill(hit.second);
            }
            hits.push(hit);
        }
    }

    hits
}
