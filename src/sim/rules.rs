//! Data-driven game rules
//!
//! Every game variant is one `GameRules` value fed to the same tick engine.
//! Rules are plain serde data so presets can be dumped, diffed and tweaked
//! as JSON without touching engine code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entity::{EntityGroup, EntitySpec};
use super::world::{EdgePolicy, WorldBounds};
use crate::consts::{DEFAULT_GROUP_CAP, DEFAULT_LIVES};

/// How held intents drive the player entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ControlScheme {
    /// Held directions set velocity directly (units per tick)
    Strafe {
        speed: f32,
        /// Allow vertical movement
        vertical: bool,
    },
    /// Left/right rotate, up accelerates along heading (Asteroids)
    Thrust {
        /// Radians per tick
        turn_rate: f32,
        /// Acceleration per tick while thrusting
        thrust: f32,
    },
    /// Left/right strafe, primary sets vertical velocity to `-impulse` (Joust)
    Flap { speed: f32, impulse: f32 },
    /// Like `Flap`, but only from the floor of the world (Donkey Kong, Pitfall)
    Jump { speed: f32, impulse: f32 },
}

impl ControlScheme {
    /// The intent that fires bullets under this scheme
    pub fn fire_intent(&self) -> super::input::Intent {
        match self {
            ControlScheme::Flap { .. } | ControlScheme::Jump { .. } => {
                super::input::Intent::SecondaryAction
            }
            _ => super::input::Intent::PrimaryAction,
        }
    }
}

/// Direction a fired bullet travels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FireDirection {
    /// Fixed velocity vector, units per tick
    Fixed { vx: f32, vy: f32 },
    /// Along the shooter's heading at `speed`
    Heading { speed: f32 },
    /// `count` bullets evenly spaced around the shooter, the first straight up
    Spread { speed: f32, count: u32 },
}

/// Bullet spawn rule for the player's fire intent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireRule {
    pub direction: FireDirection,
    pub radius: f32,
    pub ttl: Option<u32>,
    /// Ticks between shots
    pub cooldown: u32,
    /// Fire while held instead of once per press
    #[serde(default)]
    pub auto_fire: bool,
    /// Spawn offset from the shooter
    #[serde(default)]
    pub offset: (f32, f32),
}

/// Steer every tick toward the nearest live member of `target`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seek {
    pub target: EntityGroup,
    /// Units per tick
    pub speed: f32,
}

/// Per-group movement and lifetime rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupRules {
    /// Overrides the world edge policy when set
    pub edge_policy: Option<EdgePolicy>,
    /// Added to vy every tick
    pub gravity: f32,
    /// Velocity multiplier per tick (1.0 = none)
    pub friction: f32,
    /// Maximum live members
    pub cap: usize,
    /// Leaving through a lethal edge costs the player a life
    pub escape_costs_life: bool,
    /// Respawn the initial layout for this group once it is cleared
    pub refill_when_cleared: bool,
    /// Homing; replaces velocity before forces are applied
    #[serde(default)]
    pub seek: Option<Seek>,
}

impl Default for GroupRules {
    fn default() -> Self {
        Self {
            edge_policy: None,
            gravity: 0.0,
            friction: 1.0,
            cap: DEFAULT_GROUP_CAP,
            escape_costs_life: false,
            refill_when_cleared: false,
            seek: None,
        }
    }
}

/// Collision distance test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Threshold {
    /// Hit when distance < r1 + r2
    RadiusSum,
    /// Hit when distance < d
    Fixed(f32),
}

/// Score delta lookup keyed by the struck entity's tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointTable {
    Flat(i64),
    ByTag { entries: Vec<(u32, i64)>, default: i64 },
}

impl PointTable {
    pub fn points_for(&self, tag: u32) -> i64 {
        match self {
            PointTable::Flat(points) => *points,
            PointTable::ByTag { entries, default } => entries
                .iter()
                .find(|(t, _)| *t == tag)
                .map(|(_, p)| *p)
                .unwrap_or(*default),
        }
    }
}

/// What a hit does to the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HitEffect {
    /// Award (or deduct, if negative) points by the second entity's tag
    Score(PointTable),
    /// The player loses a life and respawns
    LoseLife,
    /// Higher entity wins: first above second scores, otherwise a life is lost
    Stomp { points: i64 },
    /// Award `points_per_step * (max_tag + 1 - tag)` and break the second
    /// entity into `children` pieces of `tag - 1` while `tag > 1`
    Split {
        points_per_step: i64,
        max_tag: u32,
        children: u32,
        speed: f32,
        radius_per_tag: f32,
    },
}

/// One (first × second) collision pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionRule {
    pub first: EntityGroup,
    pub second: EntityGroup,
    pub threshold: Threshold,
    /// Remove the first entity on hit (bullets)
    pub consume_first: bool,
    /// Remove the second entity on hit (enemies, pickups)
    pub consume_second: bool,
    pub effect: HitEffect,
}

/// A side of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Where a spawner places new entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnEdge {
    /// Random point along one side
    Side(Edge),
    /// The template's own position
    Template,
}

/// Non-collision scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GoalRule {
    /// A member of `group` within `depth` of `edge` scores `points`. Players
    /// are sent back to their spawn point, anything else is removed.
    Reach {
        group: EntityGroup,
        edge: Edge,
        depth: f32,
        points: i64,
    },
    /// `points` every `period_ticks` ticks survived
    Survive { period_ticks: u32, points: i64 },
}

/// Rule table problems caught before a session starts
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("invalid rules JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("world must have a positive finite size, got {width}x{height}")]
    InvalidWorld { width: f32, height: f32 },
    #[error("tick period must be at least 1 ms")]
    ZeroTickPeriod,
    #[error("a game needs at least one life")]
    ZeroLives,
    #[error("{group:?} has a non-finite force or seek speed")]
    NonFiniteMotion { group: EntityGroup },
    #[error("spawner {index} has chance {chance}, expected 0..=1")]
    InvalidChance { index: usize, chance: f32 },
    #[error("goal {index} has an invalid depth or period")]
    InvalidGoal { index: usize },
    #[error("layout entry {index} has a non-finite position or velocity")]
    InvalidLayout { index: usize },
}

/// Periodic spawner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnerRule {
    pub group: EntityGroup,
    pub period_ticks: u32,
    /// Probability of a spawn on each period (0..=1)
    pub chance: f32,
    pub edge: SpawnEdge,
    pub template: EntitySpec,
}

/// Complete rule table for one game variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    pub name: String,
    pub world: WorldBounds,
    /// Fixed tick period in milliseconds
    pub tick_ms: u32,
    pub lives: u32,
    pub control: ControlScheme,
    pub fire: Option<FireRule>,
    /// Indexed by `EntityGroup::index()`
    pub groups: [GroupRules; 5],
    pub collisions: Vec<CollisionRule>,
    pub spawners: Vec<SpawnerRule>,
    /// Initial layout (also used for refills and player respawn)
    pub layout: Vec<(EntityGroup, EntitySpec)>,
    #[serde(default)]
    pub goals: Vec<GoalRule>,
}

impl GameRules {
    pub fn new(name: impl Into<String>, world: WorldBounds, tick_ms: u32) -> Self {
        Self {
            name: name.into(),
            world,
            tick_ms,
            lives: DEFAULT_LIVES,
            control: ControlScheme::Strafe {
                speed: 5.0,
                vertical: false,
            },
            fire: None,
            groups: [GroupRules::default(); 5],
            collisions: Vec::new(),
            spawners: Vec::new(),
            layout: Vec::new(),
            goals: Vec::new(),
        }
    }

    /// Parse and validate a rule table
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Reject tables the engine can't run: degenerate worlds, non-finite
    /// motion, impossible spawn chances
    pub fn validate(&self) -> Result<(), RulesError> {
        if !self.world.is_valid() {
            return Err(RulesError::InvalidWorld {
                width: self.world.width,
                height: self.world.height,
            });
        }
        if self.tick_ms == 0 {
            return Err(RulesError::ZeroTickPeriod);
        }
        if self.lives == 0 {
            return Err(RulesError::ZeroLives);
        }
        for group in EntityGroup::ALL {
            let rules = self.group(group);
            let seek_ok = rules.seek.is_none_or(|s| s.speed.is_finite() && s.speed >= 0.0);
            if !rules.gravity.is_finite() || !rules.friction.is_finite() || !seek_ok {
                return Err(RulesError::NonFiniteMotion { group });
            }
        }
        for (index, spawner) in self.spawners.iter().enumerate() {
            if !(0.0..=1.0).contains(&spawner.chance) {
                return Err(RulesError::InvalidChance {
                    index,
                    chance: spawner.chance,
                });
            }
        }
        for (index, goal) in self.goals.iter().enumerate() {
            let ok = match *goal {
                GoalRule::Reach { depth, .. } => depth.is_finite() && depth >= 0.0,
                GoalRule::Survive { period_ticks, .. } => period_ticks > 0,
            };
            if !ok {
                return Err(RulesError::InvalidGoal { index });
            }
        }
        for (index, (_, spec)) in self.layout.iter().enumerate() {
            if !spec.pos.is_finite() || !spec.vel.is_finite() {
                return Err(RulesError::InvalidLayout { index });
            }
        }
        Ok(())
    }

    pub fn group(&self, group: EntityGroup) -> &GroupRules {
        &self.groups[group.index()]
    }

    pub fn group_mut(&mut self, group: EntityGroup) -> &mut GroupRules {
        &mut self.groups[group.index()]
    }

    /// Effective edge policy for a group
    pub fn edge_policy(&self, group: EntityGroup) -> EdgePolicy {
        self.group(group)
            .edge_policy
            .unwrap_or(self.world.edge_policy)
    }

    /// Where the player (re)spawns
    pub fn player_spawn(&self) -> Option<EntitySpec> {
        self.layout
            .iter()
            .find(|(g, _)| *g == EntityGroup::Player)
            .map(|(_, spec)| *spec)
    }

    /// Initial layout entries for one group
    pub fn layout_for(&self, group: EntityGroup) -> impl Iterator<Item = &EntitySpec> {
        self.layout
            .iter()
            .filter(move |(g, _)| *g == group)
            .map(|(_, spec)| spec)
    }

    // Builder helpers used by the presets

    pub fn with_lives(mut self, lives: u32) -> Self {
        self.lives = lives;
        self
    }

    pub fn with_control(mut self, control: ControlScheme) -> Self {
        self.control = control;
        self
    }

    pub fn with_fire(mut self, fire: FireRule) -> Self {
        self.fire = Some(fire);
        self
    }

    pub fn with_group(mut self, group: EntityGroup, rules: GroupRules) -> Self {
        self.groups[group.index()] = rules;
        self
    }

    pub fn with_collision(mut self, rule: CollisionRule) -> Self {
        self.collisions.push(rule);
        self
    }

    pub fn with_spawner(mut self, spawner: SpawnerRule) -> Self {
        self.spawners.push(spawner);
        self
    }

    pub fn spawn(mut self, group: EntityGroup, spec: EntitySpec) -> Self {
        self.layout.push((group, spec));
        self
    }

    pub fn with_goal(mut self, goal: GoalRule) -> Self {
        self.goals.push(goal);
        self
    }
}
