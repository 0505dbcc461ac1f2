//! Session configuration
//!
//! Optional overrides layered on top of a game's rule preset. Stored as
//! JSON; a missing or broken file falls back to defaults with a warning.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{BOOT_DELAY_MS, MAX_SUBSTEPS};
use crate::sim::{EntityGroup, GameRules, Intent, KeyBindings, RulesError};

/// Configuration load/validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tick period must be at least 1 ms")]
    ZeroTickPeriod,
    #[error("max_substeps must be at least 1")]
    ZeroSubsteps,
    #[error("group cap must be at least 1")]
    ZeroGroupCap,
    #[error("a session needs at least one life")]
    ZeroLives,
    #[error("unknown intent {intent:?} bound to key {key:?}")]
    UnknownIntent { key: String, intent: String },
    #[error("invalid game rules: {0}")]
    Rules(#[from] RulesError),
}

/// Base key layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BindingPreset {
    #[default]
    ArrowsAndSpace,
    Wasd,
    ArrowsAndWasd,
}

impl BindingPreset {
    pub fn bindings(&self) -> KeyBindings {
        match self {
            BindingPreset::ArrowsAndSpace => KeyBindings::arrows_and_space(),
            BindingPreset::Wasd => KeyBindings::wasd(),
            BindingPreset::ArrowsAndWasd => KeyBindings::arrows_and_wasd(),
        }
    }
}

/// Per-session overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// RNG seed; `None` picks one from the clock
    pub seed: Option<u64>,
    /// Overrides the game's tick period
    pub tick_ms: Option<u32>,
    /// Loading screen duration
    pub boot_delay_ms: u32,
    /// Most ticks one `advance` call may run
    pub max_substeps: u32,
    /// Overrides every group's live cap
    pub group_cap: Option<usize>,
    /// Overrides the game's starting lives
    pub lives: Option<u32>,
    pub bindings: BindingPreset,
    /// Extra key -> intent name bindings (`"j": "left"`)
    pub key_overrides: BTreeMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_ms: None,
            boot_delay_ms: BOOT_DELAY_MS,
            max_substeps: MAX_SUBSTEPS,
            group_cap: None,
            lives: None,
            bindings: BindingPreset::default(),
            key_overrides: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a config file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded session config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("Using default session config ({})", err);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == Some(0) {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::ZeroSubsteps);
        }
        if self.group_cap == Some(0) {
            return Err(ConfigError::ZeroGroupCap);
        }
        if self.lives == Some(0) {
            return Err(ConfigError::ZeroLives);
        }
        self.key_bindings().map(|_| ())
    }

    /// Base preset plus overrides
    pub fn key_bindings(&self) -> Result<KeyBindings, ConfigError> {
        let mut bindings = self.bindings.bindings();
        for (key, name) in &self.key_overrides {
            let intent = Intent::from_name(name).ok_or_else(|| ConfigError::UnknownIntent {
                key: key.clone(),
                intent: name.clone(),
            })?;
            bindings.bind(key.as_str(), intent);
        }
        Ok(bindings)
    }

    /// Apply rule-level overrides to a preset
    pub fn apply_to_rules(&self, rules: &mut GameRules) {
        if let Some(tick_ms) = self.tick_ms {
            rules.tick_ms = tick_ms;
        }
        if let Some(lives) = self.lives {
            rules.lives = lives;
        }
        if let Some(cap) = self.group_cap {
            for group in EntityGroup::ALL {
                rules.group_mut(group).cap = cap;
            }
        }
    }
}
