//! Arcade Sim - fixed-tick 2D arcade simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, input, tick, collisions, scoring)
//! - `catalog`: Playable games and their rule presets
//! - `session`: Shell-facing session handle and cooperative scheduler
//! - `config`: Session configuration loaded from JSON

pub mod catalog;
pub mod config;
pub mod session;
pub mod sim;

pub use catalog::GameId;
pub use config::{ConfigError, SessionConfig};
pub use session::{
    SessionCallbacks, SessionHandle, start_session, start_session_with, start_session_with_rules,
};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Cabinet boot screen duration before a session starts playing
    pub const BOOT_DELAY_MS: u32 = 2000;
    /// Maximum ticks run per `advance` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Fallback tick period
    pub const DEFAULT_TICK_MS: u32 = 50;

    /// Live entity cap per group (runaway fire protection)
    pub const DEFAULT_GROUP_CAP: usize = 500;
    /// Starting lives
    pub const DEFAULT_LIVES: u32 = 3;

    /// Standard cabinet screen sizes
    pub const SCREEN_WIDTH: f32 = 400.0;
    pub const SCREEN_HEIGHT: f32 = 300.0;
    pub const SQUARE_SCREEN: f32 = 400.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for a screen-space heading (0 = up, clockwise positive)
#[inline]
pub fn heading_to_dir(heading: f32) -> Vec2 {
    Vec2::new(heading.sin(), -heading.cos())
}
