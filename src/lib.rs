//! Arcade Cabinet - a handful of small deterministic arcade games
//!
//! Core modules:
//! - `sim`: Shared simulation toolkit (AABBs, tile grids, collision, particles)
//! - `games`: The games themselves, one module each, behind the `Arcade` trait
//! - `settings`: Player preferences and difficulty tuning
//! - `highscores`: Per-game leaderboards
//! - `persistence`: JSON key/value storage (LocalStorage or a data directory)

pub mod error;
pub mod games;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use games::{Arcade, GameKind};
pub use highscores::HighScores;
pub use settings::{Difficulty, Settings, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per animation frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the accumulator will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;
}

/// Move `current` toward `target` by at most `step`
#[inline]
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

/// Fixed-timestep accumulator for driving `Arcade::tick` from a variable frame clock
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a frame delta (seconds) and return how many fixed ticks to run
    ///
    /// Leftover time is carried to the next frame. When the frame is so long
    /// that more than `MAX_SUBSTEPS` would be needed the backlog is dropped.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, consts::MAX_FRAME_DT);

        let mut steps = 0;
        while self.accumulator >= consts::SIM_DT && steps < consts::MAX_SUBSTEPS {
            self.accumulator -= consts::SIM_DT;
            steps += 1;
        }
        if steps == consts::MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        steps
    }

    /// Fraction of a tick left in the accumulator (for render interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / consts::SIM_DT
    }
}
