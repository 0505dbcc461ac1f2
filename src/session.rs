//! Shell-facing session handle
//!
//! The shell starts one session per game, forwards key events to it, and
//! drives it by reporting elapsed wall time to `advance`. The handle owns the
//! fixed-step scheduler, so stopping (or dropping) it is the only thing needed
//! to cancel ticking; there is no timer living anywhere else.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::catalog::GameId;
use crate::config::{ConfigError, SessionConfig};
use crate::sim::{
    Entity, GameEvent, GameRules, GameState, HitEvent, InputMapper, KeyBindings, Phase, score,
    tick,
};

type ScoreCallback = Box<dyn FnMut(u64)>;
type PhaseCallback = Box<dyn FnMut(Phase)>;

/// Callbacks the shell registers for a session
#[derive(Default)]
pub struct SessionCallbacks {
    on_score_change: Option<ScoreCallback>,
    on_game_over: Option<ScoreCallback>,
    on_phase_change: Option<PhaseCallback>,
}

impl SessionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the new score on every change
    pub fn on_score_change(mut self, f: impl FnMut(u64) + 'static) -> Self {
        self.on_score_change = Some(Box::new(f));
        self
    }

    /// Called once with the final score when lives run out
    pub fn on_game_over(mut self, f: impl FnMut(u64) + 'static) -> Self {
        self.on_game_over = Some(Box::new(f));
        self
    }

    pub fn on_phase_change(mut self, f: impl FnMut(Phase) + 'static) -> Self {
        self.on_phase_change = Some(Box::new(f));
        self
    }
}

/// Fixed-step accumulator plus the boot countdown
#[derive(Debug, Clone)]
struct Scheduler {
    tick_period: Duration,
    accumulator: Duration,
    boot_remaining: Duration,
    max_substeps: u32,
}

impl Scheduler {
    fn new(rules: &GameRules, config: &SessionConfig) -> Self {
        Self {
            tick_period: Duration::from_millis(rules.tick_ms.max(1) as u64),
            accumulator: Duration::ZERO,
            boot_remaining: Duration::from_millis(config.boot_delay_ms as u64),
            max_substeps: config.max_substeps.max(1),
        }
    }
}

/// Start a session with default configuration
pub fn start_session(game: GameId, on_score_change: impl FnMut(u64) + 'static) -> SessionHandle {
    SessionHandle::build(
        game.rules(),
        SessionConfig::default(),
        SessionCallbacks::new().on_score_change(on_score_change),
        KeyBindings::arrows_and_space(),
    )
}

/// Start a session with explicit configuration and callbacks
pub fn start_session_with(
    game: GameId,
    config: SessionConfig,
    callbacks: SessionCallbacks,
) -> Result<SessionHandle, ConfigError> {
    start_session_with_rules(game.rules(), config, callbacks)
}

/// Start a session for a custom rule table
///
/// Both the config and the rules after config overrides are validated.
pub fn start_session_with_rules(
    mut rules: GameRules,
    config: SessionConfig,
    callbacks: SessionCallbacks,
) -> Result<SessionHandle, ConfigError> {
    config.validate()?;
    let bindings = config.key_bindings()?;
    config.apply_to_rules(&mut rules);
    rules.validate()?;
    Ok(SessionHandle::build(rules, config, callbacks, bindings))
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// One running game
pub struct SessionHandle {
    rules: GameRules,
    config: SessionConfig,
    state: GameState,
    input: InputMapper,
    callbacks: SessionCallbacks,
    scheduler: Scheduler,
    stopped: bool,
}

impl SessionHandle {
    fn build(
        rules: GameRules,
        config: SessionConfig,
        callbacks: SessionCallbacks,
        bindings: KeyBindings,
    ) -> Self {
        let seed = config.seed.unwrap_or_else(clock_seed);
        log::info!(
            "Starting {} (seed {}, {} ms ticks)",
            rules.name,
            seed,
            rules.tick_ms
        );

        let state = GameState::new(rules.clone(), seed);
        let scheduler = Scheduler::new(&rules, &config);
        Self {
            rules,
            config,
            state,
            input: InputMapper::new(bindings),
            callbacks,
            scheduler,
            stopped: false,
        }
    }

    /// Name of the rule table being played
    pub fn name(&self) -> &str {
        &self.rules.name
    }

    pub fn score(&self) -> u64 {
        self.state.score()
    }

    pub fn lives(&self) -> u32 {
        self.state.lives()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn seed(&self) -> u64 {
        self.state.seed
    }

    pub fn tick_period(&self) -> Duration {
        self.scheduler.tick_period
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Read-only view of the world for a renderer
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.state.store.iter()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn key_down(&mut self, key: &str) {
        if !self.stopped {
            self.input.key_down(key);
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if !self.stopped {
            self.input.key_up(key);
        }
    }

    /// Feed elapsed wall time; runs as many whole ticks as it covers
    ///
    /// Returns the number of ticks run.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.stopped {
            return 0;
        }

        let mut elapsed = elapsed;
        if self.state.phase() == Phase::Loading {
            if elapsed < self.scheduler.boot_remaining {
                self.scheduler.boot_remaining -= elapsed;
                return 0;
            }
            elapsed -= self.scheduler.boot_remaining;
            self.scheduler.boot_remaining = Duration::ZERO;
            self.begin();
        }

        if self.state.phase() != Phase::Playing {
            self.scheduler.accumulator = Duration::ZERO;
            return 0;
        }

        self.scheduler.accumulator += elapsed;
        let mut ticks = 0;
        while self.scheduler.accumulator >= self.scheduler.tick_period
            && ticks < self.scheduler.max_substeps
        {
            self.scheduler.accumulator -= self.scheduler.tick_period;
            self.step();
            ticks += 1;
            if self.stopped || self.state.phase() != Phase::Playing {
                self.scheduler.accumulator = Duration::ZERO;
                break;
            }
        }

        // Too far behind: drop the backlog instead of spiraling
        if self.scheduler.accumulator >= self.scheduler.tick_period {
            log::debug!(
                "{}: dropping {:?} of backlog",
                self.rules.name,
                self.scheduler.accumulator
            );
            self.scheduler.accumulator = Duration::ZERO;
        }
        ticks
    }

    /// Run exactly one tick now, regardless of elapsed time
    pub fn tick_once(&mut self) -> Vec<HitEvent> {
        if self.stopped || self.state.phase() != Phase::Playing {
            return Vec::new();
        }
        self.step()
    }

    fn step(&mut self) -> Vec<HitEvent> {
        let intents = self.input.sample();
        let hits = tick(&mut self.state, &intents);
        self.dispatch();
        hits
    }

    /// Skip the rest of the boot screen
    pub fn begin(&mut self) {
        if !self.stopped && score::begin(&mut self.state) {
            // Presses made during the boot screen don't fire on tick one
            self.input.sample();
            self.dispatch();
        }
    }

    pub fn pause(&mut self) {
        if !self.stopped && score::pause(&mut self.state) {
            self.input.release_all();
            self.scheduler.accumulator = Duration::ZERO;
            self.dispatch();
        }
    }

    pub fn resume(&mut self) {
        if !self.stopped && score::resume(&mut self.state) {
            self.input.sample();
            self.dispatch();
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state.phase() {
            Phase::Playing => self.pause(),
            Phase::Paused => self.resume(),
            _ => {}
        }
    }

    /// Throw the session away and start over from the boot screen
    pub fn restart(&mut self) {
        if self.stopped {
            return;
        }
        let seed = self.config.seed.unwrap_or_else(clock_seed);
        log::info!("Restarting {} (seed {})", self.rules.name, seed);

        self.state = GameState::new(self.rules.clone(), seed);
        self.scheduler = Scheduler::new(&self.rules, &self.config);
        self.input.release_all();

        if let Some(cb) = self.callbacks.on_score_change.as_mut() {
            cb(0);
        }
        if let Some(cb) = self.callbacks.on_phase_change.as_mut() {
            cb(Phase::Loading);
        }
    }

    /// Cancel ticking and release everything the session holds
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        log::info!(
            "Stopping {} (score {}, {} ticks)",
            self.rules.name,
            self.state.score(),
            self.state.session.time_ticks
        );
        self.stopped = true;
        self.state.store.clear();
        self.state.drain_events();
        self.input.release_all();
        self.scheduler.accumulator = Duration::ZERO;
        self.callbacks = SessionCallbacks::default();
    }

    fn dispatch(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::ScoreChanged(score) => {
                    if let Some(cb) = self.callbacks.on_score_change.as_mut() {
                        cb(score);
                    }
                }
                GameEvent::PhaseChanged(phase) => {
                    if let Some(cb) = self.callbacks.on_phase_change.as_mut() {
                        cb(phase);
                    }
                }
                GameEvent::GameOver { score } => {
                    if let Some(cb) = self.callbacks.on_game_over.as_mut() {
                        cb(score);
                    }
                }
                GameEvent::LifeLost { remaining } => {
                    log::debug!("{}: life lost, {} left", self.rules.name, remaining);
                }
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("name", &self.rules.name)
            .field("phase", &self.state.phase())
            .field("score", &self.state.score())
            .field("lives", &self.state.lives())
            .field("stopped", &self.stopped)
            .finish()
    }
}
