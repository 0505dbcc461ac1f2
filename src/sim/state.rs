//! Session state and the per-session game state container
//!
//! Everything one running game owns lives in `GameState`: its rule table,
//! entity store, score/lives/phase, seeded RNG and the outbox of lifecycle
//! events the session forwards to the shell.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{EntityGroup, EntityId, EntityStore};
use super::rules::GameRules;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Cabinet boot screen, world not ticking yet
    Loading,
    /// Active gameplay
    Playing,
    /// Frozen until resumed
    Paused,
    /// Terminal for this session
    GameOver,
}

/// Score, lives and phase. Mutated only by the score controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    pub lives: u32,
    pub phase: Phase,
    /// Simulation ticks run while playing
    pub time_ticks: u64,
}

/// Lifecycle notifications queued during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged(u64),
    LifeLost { remaining: u32 },
    PhaseChanged(Phase),
    GameOver { score: u64 },
}

/// Complete state of one game session
#[derive(Debug, Clone)]
pub struct GameState {
    pub rules: GameRules,
    pub store: EntityStore,
    pub session: SessionState,
    /// Seed this session was started with
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Build a fresh session in the `Loading` phase with the initial layout spawned
    pub fn new(rules: GameRules, seed: u64) -> Self {
        let mut store = EntityStore::new(rules.world);
        for group in EntityGroup::ALL {
            store.set_cap(group, rules.group(group).cap);
        }
        for (group, spec) in &rules.layout {
            store.spawn(*group, *spec);
        }

        let lives = rules.lives;
        Self {
            rules,
            store,
            session: SessionState {
                score: 0,
                lives,
                phase: Phase::Loading,
                time_ticks: 0,
            },
            seed,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.session.score
    }

    #[inline]
    pub fn lives(&self) -> u32 {
        self.session.lives
    }

    /// First live player entity
    pub fn player_id(&self) -> Option<EntityId> {
        self.store.iter_group(EntityGroup::Player).next().map(|e| e.id)
    }

    /// Take queued lifecycle events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
