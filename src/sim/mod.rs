//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, timers or platform dependencies

pub mod collision;
pub mod entity;
pub mod input;
pub mod rules;
pub mod score;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{HitEvent, discs_overlap, resolve};
pub use entity::{Entity, EntityGroup, EntityId, EntitySpec, EntityStore};
pub use input::{InputMapper, Intent, IntentFlags, IntentSet, KeyBindings};
pub use rules::{
    CollisionRule, ControlScheme, Edge, FireDirection, FireRule, GameRules, GoalRule, GroupRules,
    HitEffect, PointTable, RulesError, Seek, SpawnEdge, SpawnerRule, Threshold,
};
pub use state::{GameEvent, GameState, Phase, SessionState};
pub use tick::tick;
pub use world::{EdgeOutcome, EdgePolicy, WorldBounds};
