//! Fixed timestep simulation tick
//!
//! Advances one session by exactly one tick. Order is fixed: controls, fire,
//! seeking, passive forces, integration, edge policy, ttl expiry, spawners,
//! collision and scoring, then goals. Nothing runs unless the phase is
//! `Playing`.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::collision::{self, HitEvent};
use super::entity::{EntityGroup, EntityId, EntitySpec};
use super::input::{Intent, IntentSet};
use super::rules::{ControlScheme, Edge, FireDirection, GoalRule, SpawnEdge};
use super::score::{self, GoalEvent};
use super::state::{GameState, Phase};
use super::world::EdgeOutcome;
use crate::heading_to_dir;

/// Distance from the floor that still counts as standing on it
const FLOOR_SLACK: f32 = 0.5;

/// Advance the game state by one fixed tick, returning the hits it produced
pub fn tick(state: &mut GameState, input: &IntentSet) -> Vec<HitEvent> {
    // Loading, paused and game over are all frozen
    if state.session.phase != Phase::Playing {
        return Vec::new();
    }

    apply_controls(state, input);
    fire(state, input);
    steer_seekers(state);

    // --- FORCES, INTEGRATION, EDGES, TTL ---
    let mut player_lost = false;
    let mut escapes = 0u32;
    let mut dead: Vec<EntityId> = Vec::new();
    {
        let rules = &state.rules;
        let world = rules.world;
        for entity in state.store.iter_mut() {
            let group_rules = rules.group(entity.group);

            entity.vel.y += group_rules.gravity;
            entity.vel *= group_rules.friction;
            entity.pos += entity.vel;

            let policy = rules.edge_policy(entity.group);
            if world.apply(policy, &mut entity.pos, &mut entity.vel) == EdgeOutcome::Crossed {
                dead.push(entity.id);
                if entity.group == EntityGroup::Player {
                    player_lost = true;
                } else if group_rules.escape_costs_life {
                    escapes += 1;
                }
                continue;
            }

            if let Some(ttl) = entity.ttl.as_mut() {
                *ttl = ttl.saturating_sub(1);
                if *ttl == 0 {
                    dead.push(entity.id);
                }
            }
        }
    }
    for id in dead {
        state.store.kill(id);
    }
    state.store.purge_dead();

    if player_lost {
        score::lose_life(state, true);
    }
    for _ in 0..escapes {
        score::lose_life(state, false);
    }

    run_spawners(state);

    // --- COLLISIONS ---
    let hits = if state.session.phase == Phase::Playing {
        let hits = collision::resolve(&mut state.store, &state.rules.collisions);
        score::apply_hits(state, &hits);
        state.store.purge_dead();
        hits
    } else {
        Vec::new()
    };

    // --- GOALS ---
    if state.session.phase == Phase::Playing {
        let goals = detect_goals(state);
        score::apply_goals(state, &goals);
        state.store.purge_dead();
    }

    refill_cleared_groups(state);
    state.session.time_ticks += 1;
    hits
}

/// Map held intents onto the player entities per the control scheme
fn apply_controls(state: &mut GameState, input: &IntentSet) {
    let control = state.rules.control;
    let floor = state.rules.world.height - FLOOR_SLACK;
    state.store.for_each_mut(EntityGroup::Player, |player| match control {
        ControlScheme::Strafe { speed, vertical } => {
            player.vel.x = input.axis_x() * speed;
            player.vel.y = if vertical { input.axis_y() * speed } else { 0.0 };
        }
        ControlScheme::Thrust { turn_rate, thrust } => {
            player.heading = crate::normalize_angle(player.heading + input.axis_x() * turn_rate);
            if input.held(Intent::MoveUp) {
                player.vel += heading_to_dir(player.heading) * thrust;
            }
        }
        ControlScheme::Flap { speed, impulse } => {
            player.vel.x = input.axis_x() * speed;
            if input.pressed(Intent::PrimaryAction) {
                player.vel.y = -impulse;
            }
        }
        ControlScheme::Jump { speed, impulse } => {
            player.vel.x = input.axis_x() * speed;
            if input.pressed(Intent::PrimaryAction) && player.pos.y >= floor {
                player.vel.y = -impulse;
            }
        }
    });
}

/// Spawn bullets for players whose fire intent triggered
fn fire(state: &mut GameState, input: &IntentSet) {
    let Some(rule) = state.rules.fire else {
        return;
    };
    let intent = state.rules.control.fire_intent();
    let triggered = if rule.auto_fire {
        input.held(intent)
    } else {
        input.pressed(intent)
    };

    let mut shots: Vec<EntitySpec> = Vec::new();
    state.store.for_each_mut(EntityGroup::Player, |player| {
        if player.cooldown > 0 {
            player.cooldown -= 1;
        }
        if !triggered || player.cooldown > 0 {
            return;
        }
        let origin = player.pos + Vec2::new(rule.offset.0, rule.offset.1);
        let shot = |vel: Vec2, heading: f32| EntitySpec {
            pos: origin,
            vel,
            radius: rule.radius,
            ttl: rule.ttl,
            tag: 0,
            heading,
        };
        match rule.direction {
            FireDirection::Fixed { vx, vy } => {
                shots.push(shot(Vec2::new(vx, vy), player.heading));
            }
            FireDirection::Heading { speed } => {
                shots.push(shot(heading_to_dir(player.heading) * speed, player.heading));
            }
            FireDirection::Spread { speed, count } => {
                for i in 0..count {
                    let heading = TAU * i as f32 / count as f32;
                    shots.push(shot(heading_to_dir(heading) * speed, heading));
                }
            }
        }
        player.cooldown = rule.cooldown;
    });

    for shot in shots {
        // Capped groups drop the shot silently
        state.store.spawn(EntityGroup::Bullet, shot);
    }
}

/// Point seeking groups at the nearest live member of their target group
fn steer_seekers(state: &mut GameState) {
    for group in EntityGroup::ALL {
        let Some(seek) = state.rules.group(group).seek else {
            continue;
        };
        let targets: Vec<Vec2> = state.store.iter_group(seek.target).map(|e| e.pos).collect();
        if targets.is_empty() {
            continue;
        }
        state.store.for_each_mut(group, |entity| {
            let from = entity.pos;
            let nearest = targets
                .iter()
                .copied()
                .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)));
            let Some(target) = nearest else {
                return;
            };
            let delta = target - from;
            let dist = delta.length();
            if dist <= f32::EPSILON {
                return;
            }
            // Never overshoot the target
            entity.vel = if dist <= seek.speed {
                delta
            } else {
                delta / dist * seek.speed
            };
        });
    }
}

/// Periodic spawners (falling warheads, rolling barrels)
fn run_spawners(state: &mut GameState) {
    let tick_no = state.session.time_ticks + 1;
    let world = state.rules.world;

    for i in 0..state.rules.spawners.len() {
        let spawner = state.rules.spawners[i];
        if spawner.period_ticks == 0 || tick_no % spawner.period_ticks as u64 != 0 {
            continue;
        }
        if state.rng.random::<f32>() >= spawner.chance {
            continue;
        }

        let mut spec = spawner.template;
        spec.pos = match spawner.edge {
            SpawnEdge::Side(Edge::Top) => {
                Vec2::new(state.rng.random_range(0.0..=world.width), 0.0)
            }
            SpawnEdge::Side(Edge::Bottom) => {
                Vec2::new(state.rng.random_range(0.0..=world.width), world.height)
            }
            SpawnEdge::Side(Edge::Left) => {
                Vec2::new(0.0, state.rng.random_range(0.0..=world.height))
            }
            SpawnEdge::Side(Edge::Right) => {
                Vec2::new(world.width, state.rng.random_range(0.0..=world.height))
            }
            SpawnEdge::Template => spec.pos,
        };
        state.store.spawn(spawner.group, spec);
    }
}

/// Goals met by the world as it stands after collisions
fn detect_goals(state: &GameState) -> Vec<GoalEvent> {
    let world = state.rules.world;
    let tick_no = state.session.time_ticks + 1;
    let mut events = Vec::new();

    for (goal, rule) in state.rules.goals.iter().enumerate() {
        match *rule {
            GoalRule::Reach {
                group, edge, depth, ..
            } => {
                for entity in state.store.iter_group(group) {
                    let reached = match edge {
                        Edge::Top => entity.pos.y <= depth,
                        Edge::Bottom => entity.pos.y >= world.height - depth,
                        Edge::Left => entity.pos.x <= depth,
                        Edge::Right => entity.pos.x >= world.width - depth,
                    };
                    if reached {
                        events.push(GoalEvent {
                            goal,
                            entity: Some(entity.id),
                        });
                    }
                }
            }
            GoalRule::Survive { period_ticks, .. } => {
                if period_ticks > 0 && tick_no % period_ticks as u64 == 0 {
                    events.push(GoalEvent { goal, entity: None });
                }
            }
        }
    }
    events
}

/// Respawn the initial layout of groups that were wiped out (next wave)
fn refill_cleared_groups(state: &mut GameState) {
    if state.session.phase != Phase::Playing {
        return;
    }
    for group in EntityGroup::ALL {
        if !state.rules.group(group).refill_when_cleared || state.store.count(group) > 0 {
            continue;
        }
        log::debug!("{}: {:?} cleared, refilling", state.rules.name, group);
        let specs: Vec<EntitySpec> = state.rules.layout_for(group).copied().collect();
        for spec in specs {
            state.store.spawn(group, spec);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rules::{
        CollisionRule, FireRule, GameRules, GroupRules, HitEffect, PointTable, Seek, SpawnerRule,
        Threshold,
    };
    use crate::sim::world::{EdgePolicy, WorldBounds};

    fn playing(rules: GameRules) -> GameState {
        let mut state = GameState::new(rules, 12345);
        score::begin(&mut state);
        state
    }

    fn pos_of(state: &GameState, id: EntityId) -> Vec2 {
        state.store.get(id).unwrap().pos
    }

    fn gun(direction: FireDirection, cooldown: u32, auto_fire: bool) -> FireRule {
        FireRule {
            direction,
            radius: 2.0,
            ttl: None,
            cooldown,
            auto_fire,
            offset: (0.0, 0.0),
        }
    }

    fn spawner(period_ticks: u32, chance: f32, edge: SpawnEdge) -> SpawnerRule {
        SpawnerRule {
            group: EntityGroup::Hazard,
            period_ticks,
            chance,
            edge,
            template: EntitySpec::at(350.0, 50.0, 4.0),
        }
    }

    fn run(state: &mut GameState, ticks: usize, input: &IntentSet) {
        for _ in 0..ticks {
            tick(state, input);
        }
    }

    #[test]
    fn test_tick_frozen_unless_playing() {
        let world = WorldBounds::new(400.0, 400.0, EdgePolicy::Wrap);
        let rules = GameRules::new("test", world, 16)
            .spawn(EntityGroup::Enemy, EntitySpec::at(10.0, 10.0, 5.0).with_vel(1.0, 0.0));
        let mut state = GameState::new(rules, 1);
        let id = state.store.ids(EntityGroup::Enemy)[0];

        tick(&mut state, &IntentSet::default());
        assert_eq!(pos_of(&state, id), Vec2::new(10.0, 10.0));
        assert_eq!(state.session.time_ticks, 0);

        score::begin(&mut state);
        tick(&mut state, &IntentSet::default());
        assert_eq!(pos_of(&state, id), Vec2::new(11.0, 10.0));

        score::pause(&mut state);
        tick(&mut state, &IntentSet::default());
        assert_eq!(pos_of(&state, id), Vec2::new(11.0, 10.0));
    }

    #[test]
    fn test_wrap_scenario() {
        let world = WorldBounds::new(400.0, 400.0, EdgePolicy::Wrap);
        let rules = GameRules::new("test", world, 16)
            .spawn(EntityGroup::Enemy, EntitySpec::at(398.0, 200.0, 5.0).with_vel(5.0, 0.0));
        let mut state = playing(rules);
        let id = state.store.ids(EntityGroup::Enemy)[0];
        tick(&mut state, &IntentSet::default());
        let pos = pos_of(&state, id);
        assert!((pos.x - 3.0).abs() < 1e-4);
        assert_eq!(pos.y, 200.0);
    }

    #[test]
    fn test_ttl_removed_exactly_on_zero() {
        let world = WorldBounds::new(400.0, 400.0, EdgePolicy::Wrap);
        let rules = GameRules::new("test", world, 16)
            .spawn(EntityGroup::Bullet, EntitySpec::at(10.0, 10.0, 1.0).with_ttl(3));
        let mut state = playing(rules);
        let id = state.store.ids(EntityGroup::Bullet)[0];

        tick(&mut state, &IntentSet::default());
        assert_eq!(state.store.get(id).unwrap().ttl, Some(2));
        tick(&mut state, &IntentSet::default());
        assert_eq!(state.store.get(id).unwrap().ttl, Some(1));
        tick(&mut state, &IntentSet::default());
        assert!(state.store.get(id).is_none());
    }

    #[test]
    fn test_expired_bullet_does_not_collide() {
        let world = WorldBounds::new(400.0, 400.0, EdgePolicy::Wrap);
        let rules = GameRules::new("test", world, 16)
            .with_collision(CollisionRule {
                first: EntityGroup::Bullet,
                second: EntityGroup::Enemy,
                threshold: Threshold::RadiusSum,
                consume_first: true,
                consume_second: true,
                effect: HitEffect::Score(PointTable::Flat(10)),
            })
            .spawn(EntityGroup::Bullet, EntitySpec::at(100.0, 100.0, 2.0).with_ttl(1))
            .spawn(EntityGroup::Enemy, EntitySpec::at(103.0, 100.0, 2.0));
        let mut state = playing(rules);
        let hits = tick(&mut state, &IntentSet::default());
        assert!(hits.is_empty());
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_lethal_edge_kills_bullet() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_group(
                EntityGroup::Bullet,
                GroupRules {
                    edge_policy: Some(EdgePolicy::Lethal),
                    ..Default::default()
                },
            )
            .spawn(EntityGroup::Bullet, EntitySpec::at(200.0, 3.0, 2.0).with_vel(0.0, -5.0));
        let mut state = playing(rules);
        tick(&mut state, &IntentSet::default());
        assert_eq!(state.store.count(EntityGroup::Bullet), 0);
        assert_eq!(state.lives(), crate::consts::DEFAULT_LIVES);
    }

    #[test]
    fn test_escape_costs_life() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Lethal);
        let rules = GameRules::new("test", world, 50)
            .with_lives(2)
            .with_group(
                EntityGroup::Hazard,
                GroupRules {
                    escape_costs_life: true,
                    ..Default::default()
                },
            )
            .spawn(EntityGroup::Hazard, EntitySpec::at(100.0, 299.0, 2.0).with_vel(0.0, 3.0));
        let mut state = playing(rules);
        tick(&mut state, &IntentSet::default());
        assert_eq!(state.lives(), 1);
        assert_eq!(state.phase(), Phase::Playing);
    }

    #[test]
    fn test_strafe_fire_and_score() {
        let world = WorldBounds::new(400.0, 400.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_fire(FireRule {
                direction: FireDirection::Fixed { vx: 0.0, vy: -8.0 },
                radius: 2.0,
                ttl: None,
                cooldown: 0,
                auto_fire: false,
                offset: (0.0, 0.0),
            })
            .with_group(
                EntityGroup::Bullet,
                GroupRules {
                    edge_policy: Some(EdgePolicy::Lethal),
                    ..Default::default()
                },
            )
            .with_collision(CollisionRule {
                first: EntityGroup::Bullet,
                second: EntityGroup::Enemy,
                threshold: Threshold::Fixed(20.0),
                consume_first: true,
                consume_second: true,
                effect: HitEffect::Score(PointTable::Flat(30)),
            })
            .spawn(EntityGroup::Player, EntitySpec::at(200.0, 340.0, 10.0))
            .spawn(EntityGroup::Enemy, EntitySpec::at(200.0, 300.0, 10.0));
        let mut state = playing(rules);
        let player = state.player_id().unwrap();

        tick(&mut state, &IntentSet::from_held(&[Intent::MoveLeft]));
        assert_eq!(pos_of(&state, player).x, 195.0);

        // Fire from x=195: bullet at y 332 after first tick, enemy at 300
        tick(&mut state, &IntentSet::from_pressed(&[Intent::PrimaryAction]));
        assert_eq!(state.store.count(EntityGroup::Bullet), 1);
        // Holding does not refire
        tick(&mut state, &IntentSet::from_held(&[Intent::PrimaryAction]));
        assert_eq!(state.store.count(EntityGroup::Bullet), 1);
        tick(&mut state, &IntentSet::default());
        tick(&mut state, &IntentSet::default());
        assert_eq!(state.score(), 30);
        assert_eq!(state.store.count(EntityGroup::Enemy), 0);
    }

    #[test]
    fn test_thrust_heading_up() {
        let world = WorldBounds::new(400.0, 400.0, EdgePolicy::Wrap);
        let rules = GameRules::new("test", world, 16)
            .with_control(ControlScheme::Thrust {
                turn_rate: 0.1,
                thrust: 0.3,
            })
            .spawn(EntityGroup::Player, EntitySpec::at(200.0, 200.0, 10.0));
        let mut state = playing(rules);
        let id = state.player_id().unwrap();
        tick(&mut state, &IntentSet::from_held(&[Intent::MoveUp]));
        let player = state.store.get(id).unwrap();
        assert!(player.vel.x.abs() < 1e-5);
        assert!((player.vel.y + 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_flap_and_gravity() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_control(ControlScheme::Flap {
                speed: 3.0,
                impulse: 8.0,
            })
            .with_group(
                EntityGroup::Player,
                GroupRules {
                    gravity: 0.5,
                    ..Default::default()
                },
            )
            .spawn(EntityGroup::Player, EntitySpec::at(100.0, 200.0, 10.0));
        let mut state = playing(rules);
        let id = state.player_id().unwrap();
        tick(&mut state, &IntentSet::from_pressed(&[Intent::PrimaryAction]));
        let player = state.store.get(id).unwrap();
        assert_eq!(player.vel.y, -7.5);
        assert_eq!(player.pos.y, 192.5);
    }

    #[test]
    fn test_game_over_freezes_world() {
        let world = WorldBounds::new(400.0, 400.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_lives(1)
            .with_collision(CollisionRule {
                first: EntityGroup::Player,
                second: EntityGroup::Hazard,
                threshold: Threshold::RadiusSum,
                consume_first: false,
                consume_second: false,
                effect: HitEffect::LoseLife,
            })
            .spawn(EntityGroup::Player, EntitySpec::at(100.0, 100.0, 10.0))
            .spawn(EntityGroup::Hazard, EntitySpec::at(105.0, 100.0, 10.0))
            .spawn(EntityGroup::Enemy, EntitySpec::at(50.0, 50.0, 5.0).with_vel(1.0, 0.0));
        let mut state = playing(rules);

        tick(&mut state, &IntentSet::default());
        assert_eq!(state.lives(), 0);
        assert_eq!(state.phase(), Phase::GameOver);

        let enemy = state.store.ids(EntityGroup::Enemy)[0];
        let frozen = pos_of(&state, enemy);
        let ticks = state.session.time_ticks;
        tick(&mut state, &IntentSet::default());
        assert_eq!(pos_of(&state, enemy), frozen);
        assert_eq!(state.session.time_ticks, ticks);
    }

    #[test]
    fn test_refill_when_cleared() {
        let world = WorldBounds::new(400.0, 400.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_group(
                EntityGroup::Enemy,
                GroupRules {
                    refill_when_cleared: true,
                    ..Default::default()
                },
            )
            .spawn(EntityGroup::Enemy, EntitySpec::at(50.0, 50.0, 5.0))
            .spawn(EntityGroup::Enemy, EntitySpec::at(80.0, 50.0, 5.0));
        let mut state = playing(rules);
        for id in state.store.ids(EntityGroup::Enemy) {
            state.store.kill(id);
        }
        tick(&mut state, &IntentSet::default());
        assert_eq!(state.store.count(EntityGroup::Enemy), 2);
    }

    #[test]
    fn test_determinism() {
        let rules = crate::catalog::GameId::Asteroids.rules();
        let mut state1 = playing(rules.clone());
        let mut state2 = playing(rules);

        let inputs = [
            IntentSet::from_held(&[Intent::MoveUp]),
            IntentSet::from_pressed(&[Intent::PrimaryAction]),
            IntentSet::from_held(&[Intent::MoveLeft]),
            IntentSet::default(),
        ];
        for _ in 0..50 {
            for input in &inputs {
                tick(&mut state1, input);
                tick(&mut state2, input);
            }
        }

        assert_eq!(state1.session, state2.session);
        let a: Vec<_> = state1.store.iter().cloned().collect();
        let b: Vec<_> = state2.store.iter().cloned().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_spawner_fires_on_period() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_spawner(spawner(3, 1.0, SpawnEdge::Side(Edge::Left)));
        let mut state = playing(rules);

        run(&mut state, 2, &IntentSet::default());
        assert_eq!(state.store.count(EntityGroup::Hazard), 0);
        tick(&mut state, &IntentSet::default());
        assert_eq!(state.store.count(EntityGroup::Hazard), 1);
        run(&mut state, 3, &IntentSet::default());
        assert_eq!(state.store.count(EntityGroup::Hazard), 2);

        for hazard in state.store.iter_group(EntityGroup::Hazard) {
            assert_eq!(hazard.pos.x, 0.0);
            assert!((0.0..=300.0).contains(&hazard.pos.y));
        }
    }

    #[test]
    fn test_spawner_zero_chance_never_spawns() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_spawner(spawner(1, 0.0, SpawnEdge::Side(Edge::Top)));
        let mut state = playing(rules);
        run(&mut state, 100, &IntentSet::default());
        assert_eq!(state.store.count(EntityGroup::Hazard), 0);
    }

    #[test]
    fn test_spawner_edges_and_template() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_spawner(spawner(1, 1.0, SpawnEdge::Side(Edge::Bottom)))
            .with_spawner(spawner(1, 1.0, SpawnEdge::Side(Edge::Right)))
            .with_spawner(spawner(1, 1.0, SpawnEdge::Template));
        let mut state = playing(rules);
        tick(&mut state, &IntentSet::default());

        let spawned: Vec<Vec2> = state
            .store
            .iter_group(EntityGroup::Hazard)
            .map(|e| e.pos)
            .collect();
        assert_eq!(spawned.len(), 3);
        assert_eq!(spawned[0].y, 300.0);
        assert!((0.0..=400.0).contains(&spawned[0].x));
        assert_eq!(spawned[1].x, 400.0);
        assert!((0.0..=300.0).contains(&spawned[1].y));
        assert_eq!(spawned[2], Vec2::new(350.0, 50.0));
    }

    #[test]
    fn test_fire_cooldown_blocks_presses() {
        let world = WorldBounds::new(400.0, 400.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_fire(gun(FireDirection::Fixed { vx: 0.0, vy: -1.0 }, 3, false))
            .spawn(EntityGroup::Player, EntitySpec::at(200.0, 300.0, 10.0));
        let mut state = playing(rules);
        let press = IntentSet::from_pressed(&[Intent::PrimaryAction]);

        tick(&mut state, &press);
        assert_eq!(state.store.count(EntityGroup::Bullet), 1);
        run(&mut state, 2, &press);
        assert_eq!(state.store.count(EntityGroup::Bullet), 1);
        tick(&mut state, &press);
        assert_eq!(state.store.count(EntityGroup::Bullet), 2);
    }

    #[test]
    fn test_auto_fire_repeats_while_held() {
        let world = WorldBounds::new(400.0, 400.0, EdgePolicy::Clip);
        let fixed = FireDirection::Fixed { vx: 0.0, vy: -1.0 };
        let held = IntentSet::from_held(&[Intent::PrimaryAction]);

        let rules = GameRules::new("test", world, 50)
            .with_fire(gun(fixed, 2, true))
            .spawn(EntityGroup::Player, EntitySpec::at(200.0, 300.0, 10.0));
        let mut state = playing(rules);
        run(&mut state, 6, &held);
        assert_eq!(state.store.count(EntityGroup::Bullet), 3);

        // Without auto fire a held key never shoots
        let rules = GameRules::new("test", world, 50)
            .with_fire(gun(fixed, 2, false))
            .spawn(EntityGroup::Player, EntitySpec::at(200.0, 300.0, 10.0));
        let mut state = playing(rules);
        run(&mut state, 6, &held);
        assert_eq!(state.store.count(EntityGroup::Bullet), 0);
    }

    #[test]
    fn test_spread_fires_ring() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_fire(gun(FireDirection::Spread { speed: 5.0, count: 8 }, 0, false))
            .spawn(EntityGroup::Player, EntitySpec::at(200.0, 150.0, 10.0));
        let mut state = playing(rules);
        tick(&mut state, &IntentSet::from_pressed(&[Intent::PrimaryAction]));

        let vels: Vec<Vec2> = state
            .store
            .iter_group(EntityGroup::Bullet)
            .map(|e| e.vel)
            .collect();
        assert_eq!(vels.len(), 8);
        assert!(vels[0].abs_diff_eq(Vec2::new(0.0, -5.0), 1e-4));
        assert!(vels[2].abs_diff_eq(Vec2::new(5.0, 0.0), 1e-4));
        assert!(vels.iter().all(|v| (v.length() - 5.0).abs() < 1e-4));
        let sum: Vec2 = vels.iter().copied().sum();
        assert!(sum.length() < 1e-3);
    }

    #[test]
    fn test_seekers_head_for_nearest_target() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_group(
                EntityGroup::Hazard,
                GroupRules {
                    seek: Some(Seek {
                        target: EntityGroup::Pickup,
                        speed: 2.0,
                    }),
                    ..Default::default()
                },
            )
            .spawn(EntityGroup::Pickup, EntitySpec::at(100.0, 100.0, 5.0))
            .spawn(EntityGroup::Pickup, EntitySpec::at(300.0, 200.0, 5.0))
            .spawn(EntityGroup::Hazard, EntitySpec::at(100.0, 200.0, 2.0))
            .spawn(EntityGroup::Hazard, EntitySpec::at(100.0, 101.5, 2.0));
        let mut state = playing(rules);
        let hazards = state.store.ids(EntityGroup::Hazard);
        tick(&mut state, &IntentSet::default());

        assert!(pos_of(&state, hazards[0]).abs_diff_eq(Vec2::new(100.0, 198.0), 1e-4));
        // Close enough to arrive this tick: lands on the target, no overshoot
        assert!(pos_of(&state, hazards[1]).abs_diff_eq(Vec2::new(100.0, 100.0), 1e-4));
    }

    #[test]
    fn test_seekers_coast_without_targets() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_group(
                EntityGroup::Enemy,
                GroupRules {
                    seek: Some(Seek {
                        target: EntityGroup::Player,
                        speed: 0.8,
                    }),
                    ..Default::default()
                },
            )
            .spawn(EntityGroup::Enemy, EntitySpec::at(50.0, 50.0, 5.0).with_vel(1.0, 0.0));
        let mut state = playing(rules);
        let id = state.store.ids(EntityGroup::Enemy)[0];
        tick(&mut state, &IntentSet::default());
        assert_eq!(pos_of(&state, id), Vec2::new(51.0, 50.0));
    }

    #[test]
    fn test_player_crossing_lethal_edge_respawns() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Lethal);
        let rules = GameRules::new("test", world, 50)
            .with_lives(3)
            .with_control(ControlScheme::Strafe {
                speed: 10.0,
                vertical: true,
            })
            .spawn(EntityGroup::Player, EntitySpec::at(200.0, 295.0, 5.0));
        let mut state = playing(rules);
        let first = state.player_id().unwrap();

        tick(&mut state, &IntentSet::from_held(&[Intent::MoveDown]));

        assert_eq!(state.lives(), 2);
        assert_eq!(state.phase(), Phase::Playing);
        assert!(state.store.get(first).is_none());
        assert_eq!(state.store.count(EntityGroup::Player), 1);
        let respawned = state.player_id().unwrap();
        assert_ne!(respawned, first);
        assert_eq!(pos_of(&state, respawned), Vec2::new(200.0, 295.0));
    }

    #[test]
    fn test_jump_only_from_floor() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_control(ControlScheme::Jump {
                speed: 3.0,
                impulse: 12.0,
            })
            .with_group(
                EntityGroup::Player,
                GroupRules {
                    gravity: 1.0,
                    ..Default::default()
                },
            )
            .spawn(EntityGroup::Player, EntitySpec::at(100.0, 300.0, 10.0));
        let mut state = playing(rules);
        let id = state.player_id().unwrap();
        let jump = IntentSet::from_pressed(&[Intent::PrimaryAction]);

        tick(&mut state, &jump);
        assert_eq!(pos_of(&state, id).y, 289.0);
        // Airborne: a second press does nothing
        tick(&mut state, &jump);
        let player = state.store.get(id).unwrap();
        assert_eq!(player.vel.y, -10.0);
        assert_eq!(player.pos.y, 279.0);
    }

    #[test]
    fn test_survive_goal_pays_each_period() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50).with_goal(GoalRule::Survive {
            period_ticks: 2,
            points: 1,
        });
        let mut state = playing(rules);
        run(&mut state, 5, &IntentSet::default());
        assert_eq!(state.score(), 2);
    }

    #[test]
    fn test_reach_goals() {
        let world = WorldBounds::new(400.0, 300.0, EdgePolicy::Clip);
        let rules = GameRules::new("test", world, 50)
            .with_control(ControlScheme::Strafe {
                speed: 15.0,
                vertical: true,
            })
            .with_goal(GoalRule::Reach {
                group: EntityGroup::Player,
                edge: Edge::Top,
                depth: 50.0,
                points: 100,
            })
            .with_goal(GoalRule::Reach {
                group: EntityGroup::Enemy,
                edge: Edge::Bottom,
                depth: 20.0,
                points: 5,
            })
            .spawn(EntityGroup::Player, EntitySpec::at(200.0, 60.0, 10.0))
            .spawn(EntityGroup::Enemy, EntitySpec::at(100.0, 275.0, 5.0).with_vel(0.0, 5.0));
        let mut state = playing(rules);
        let player = state.player_id().unwrap();

        tick(&mut state, &IntentSet::from_held(&[Intent::MoveUp]));

        assert_eq!(state.score(), 105);
        assert_eq!(pos_of(&state, player), Vec2::new(200.0, 60.0));
        assert_eq!(state.store.count(EntityGroup::Enemy), 0);
        assert_eq!(state.lives(), crate::consts::DEFAULT_LIVES);
    }
}
