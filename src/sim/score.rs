//! Score and lifecycle controller
//!
//! The only code that mutates `SessionState`. Turns hit events into score
//! deltas and life losses, drives the phase machine, and queues a
//! `GameEvent` for every observable change.

use glam::Vec2;
use rand::Rng;

use super::collision::HitEvent;
use super::entity::{EntityGroup, EntityId, EntitySpec};
use super::rules::{GoalRule, HitEffect};
use super::state::{GameEvent, GameState, Phase};

fn set_phase(state: &mut GameState, phase: Phase) {
    if state.session.phase != phase {
        log::info!("{}: {:?} -> {:?}", state.rules.name, state.session.phase, phase);
        state.session.phase = phase;
        state.events.push(GameEvent::PhaseChanged(phase));
    }
}

/// Loading -> Playing (boot delay elapsed)
pub fn begin(state: &mut GameState) -> bool {
    if state.session.phase == Phase::Loading {
        set_phase(state, Phase::Playing);
        true
    } else {
        false
    }
}

/// Playing -> Paused
pub fn pause(state: &mut GameState) -> bool {
    if state.session.phase == Phase::Playing {
        set_phase(state, Phase::Paused);
        true
    } else {
        false
    }
}

/// Paused -> Playing
pub fn resume(state: &mut GameState) -> bool {
    if state.session.phase == Phase::Paused {
        set_phase(state, Phase::Playing);
        true
    } else {
        false
    }
}

/// Apply a signed score delta, clamping at zero
///
/// Penalties clamp per call, so two penalties in one tick each see the
/// already-clamped score.
pub fn award(state: &mut GameState, delta: i64) {
    let before = state.session.score;
    let after = if delta >= 0 {
        before.saturating_add(delta as u64)
    } else {
        before.saturating_sub(delta.unsigned_abs())
    };
    if after != before {
        state.session.score = after;
        state.events.push(GameEvent::ScoreChanged(after));
    }
}

/// A goal met this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalEvent {
    /// Index into `GameRules::goals`
    pub goal: usize,
    /// The entity that reached it; `None` for survival awards
    pub entity: Option<EntityId>,
}

/// Take a life; at zero the session ends
///
/// `respawn` sends the player back to its spawn point. Losses the player
/// didn't cause directly (a city falling, an invader landing) leave it where
/// it is.
pub fn lose_life(state: &mut GameState, respawn: bool) {
    if state.session.phase == Phase::GameOver {
        return;
    }
    state.session.lives = state.session.lives.saturating_sub(1);
    let remaining = state.session.lives;
    state.events.push(GameEvent::LifeLost { remaining });

    if remaining == 0 {
        set_phase(state, Phase::GameOver);
        let score = state.session.score;
        log::info!("{}: game over, final score {}", state.rules.name, score);
        state.events.push(GameEvent::GameOver { score });
    } else if respawn {
        respawn_player(state);
    }
}

/// Put the player back at its layout position, or spawn a new one if it died
pub fn respawn_player(state: &mut GameState) {
    let Some(mut spawn) = state.rules.player_spawn() else {
        return;
    };
    let policy = state.rules.edge_policy(EntityGroup::Player);
    spawn.pos = state.rules.world.settle(policy, spawn.pos);
    match state.player_id() {
        Some(id) => {
            if let Some(player) = state.store.get_mut(id) {
                player.pos = spawn.pos;
                player.vel = spawn.vel;
                player.heading = spawn.heading;
                player.cooldown = 0;
            }
        }
        None => {
            state.store.spawn(EntityGroup::Player, spawn);
        }
    }
}

/// Apply this tick's hit events in emission order
pub fn apply_hits(state: &mut GameState, hits: &[HitEvent]) {
    for hit in hits {
        // Frozen world: nothing after the game-over hit counts
        if state.session.phase == Phase::GameOver {
            break;
        }
        let Some(rule) = state.rules.collisions.get(hit.rule) else {
            continue;
        };

        match rule.effect.clone() {
            HitEffect::Score(table) => award(state, table.points_for(hit.second_tag)),
            HitEffect::LoseLife => {
                let player_hit = hit.first_group == EntityGroup::Player
                    || hit.second_group == EntityGroup::Player;
                lose_life(state, player_hit);
            }
            HitEffect::Stomp { points } => {
                // Screen space: smaller y is higher
                if hit.first_pos.y < hit.second_pos.y {
                    state.store.kill(hit.second);
                    award(state, points);
                } else {
                    lose_life(state, true);
                }
            }
            HitEffect::Split {
                points_per_step,
                max_tag,
                children,
                speed,
                radius_per_tag,
            } => {
                let steps = (max_tag + 1).saturating_sub(hit.second_tag) as i64;
                award(state, points_per_step * steps);
                if hit.second_tag > 1 {
                    let tag = hit.second_tag - 1;
                    for _ in 0..children {
                        let vel = Vec2::new(
                            state.rng.random_range(-0.5f32..0.5) * speed,
                            state.rng.random_range(-0.5f32..0.5) * speed,
                        );
                        let spec = EntitySpec {
                            pos: hit.second_pos,
                            vel,
                            radius: radius_per_tag * tag as f32,
                            ttl: None,
                            tag,
                            heading: 0.0,
                        };
                        state.store.spawn(hit.second_group, spec);
                    }
                }
            }
        }
    }
}

/// Apply this tick's goal events in emission order
pub fn apply_goals(state: &mut GameState, goals: &[GoalEvent]) {
    for event in goals {
        if state.session.phase == Phase::GameOver {
            break;
        }
        let Some(goal) = state.rules.goals.get(event.goal).copied() else {
            continue;
        };
        match goal {
            GoalRule::Reach { group, points, .. } => {
                award(state, points);
                if group == EntityGroup::Player {
                    respawn_player(state);
                } else if let Some(id) = event.entity {
                    state.store.kill(id);
                }
            }
            GoalRule::Survive { points, .. } => award(state, points),
        }
    }
}
