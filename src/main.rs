//! Arcade Sim demo driver
//!
//! Runs one game headless against a scripted player and logs what happens.
//!
//! Usage: `arcade-sim [game] [config.json]`

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use arcade_sim::sim::Phase;
use arcade_sim::{GameId, SessionCallbacks, SessionConfig, start_session_with};

/// Simulated display refresh
const FRAME: Duration = Duration::from_millis(16);
/// Simulated play time before giving up
const DEMO_SECONDS: u64 = 60;

/// Key script for one frame: (key, pressed) pairs
fn script(game: GameId, frame: u64) -> Vec<(&'static str, bool)> {
    let sweep = if (frame / 90) % 2 == 0 {
        "ArrowLeft"
    } else {
        "ArrowRight"
    };
    let other = if sweep == "ArrowLeft" {
        "ArrowRight"
    } else {
        "ArrowLeft"
    };

    let mut keys = Vec::new();
    if frame % 90 == 0 {
        keys.push((other, false));
        keys.push((sweep, true));
    }
    if game == GameId::Asteroids {
        if frame % 60 == 0 {
            keys.push(("ArrowUp", true));
        } else if frame % 60 == 10 {
            keys.push(("ArrowUp", false));
        }
    }
    // Tap fire (flap in Joust)
    if frame % 8 == 0 {
        keys.push((" ", true));
    } else if frame % 8 == 1 {
        keys.push((" ", false));
    }
    keys
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let game = match args.next() {
        Some(name) => match GameId::from_title(&name) {
            Some(game) => game,
            None => {
                let known: Vec<&str> = GameId::ALL.iter().map(|g| g.title()).collect();
                log::error!("Unknown game {:?}; try one of: {}", name, known.join(", "));
                std::process::exit(2);
            }
        },
        None => GameId::Asteroids,
    };
    let config = match args.next() {
        Some(path) => SessionConfig::load_or_default(path),
        None => SessionConfig {
            seed: Some(1),
            ..Default::default()
        },
    };

    let finished = Rc::new(Cell::new(false));
    let done = finished.clone();
    let callbacks = SessionCallbacks::new()
        .on_score_change(|score| log::info!("Score: {}", score))
        .on_phase_change(|phase| log::debug!("Phase: {:?}", phase))
        .on_game_over(move |score| {
            log::info!("Game over - final score {}", score);
            done.set(true);
        });

    let mut session = match start_session_with(game, config, callbacks) {
        Ok(session) => session,
        Err(err) => {
            log::error!("Failed to start {}: {}", game.title(), err);
            std::process::exit(1);
        }
    };

    let frames = DEMO_SECONDS * 1000 / FRAME.as_millis() as u64;
    let mut ticks = 0u64;
    for frame in 0..frames {
        if session.phase() == Phase::Playing {
            for (key, pressed) in script(game, frame) {
                if pressed {
                    session.key_down(key);
                } else {
                    session.key_up(key);
                }
            }
        }
        ticks += session.advance(FRAME) as u64;
        if finished.get() {
            break;
        }
    }

    log::info!(
        "{}: {} ticks, score {}, lives {}, {} entities on screen",
        game.title(),
        ticks,
        session.score(),
        session.lives(),
        session.entities().count()
    );
    session.stop();
}
