//! The games
//!
//! Each game owns its state and a fixed-step `tick`. Front ends talk to them
//! through the `Arcade` trait so one loop can host any of them.

pub mod basketball;
pub mod maze;
pub mod pinball;
pub mod platformer;
pub mod walkers;
pub mod whack;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, Particles, RunStats, TickInput, toggle_pause};

pub use basketball::Basketball;
pub use maze::Maze;
pub use pinball::Pinball;
pub use platformer::Platformer;
pub use walkers::Walkers;
pub use whack::Whack;

/// A playable game
pub trait Arcade {
    fn kind(&self) -> GameKind;

    /// Advance by one fixed timestep
    fn tick(&mut self, input: &TickInput, dt: f32);

    fn phase(&self) -> GamePhase;

    fn stats(&self) -> RunStats;

    /// Take the events produced since the last drain
    fn drain_events(&mut self) -> Vec<GameEvent>;

    /// Input the built-in demo AI would give this tick
    fn autoplay_input(&self) -> TickInput;

    /// Cosmetic particles to draw
    fn particles(&self) -> &Particles;
}

/// Game selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameKind {
    Platformer,
    Basketball,
    Pinball,
    Maze,
    Walkers,
    Whack,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::Platformer,
        GameKind::Basketball,
        GameKind::Pinball,
        GameKind::Maze,
        GameKind::Walkers,
        GameKind::Whack,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GameKind::Platformer => "platformer",
            GameKind::Basketball => "basketball",
            GameKind::Pinball => "pinball",
            GameKind::Maze => "maze",
            GameKind::Walkers => "walkers",
            GameKind::Whack => "whack",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Start a new run of this game
    pub fn create(self, seed: u64, settings: &Settings) -> Result<Box<dyn Arcade>> {
        let tuning = settings.tuning();
        log::info!(
            "Starting {} (seed {}, {})",
            self.name(),
            seed,
            settings.difficulty.as_str()
        );
        Ok(match self {
            GameKind::Platformer => Box::new(Platformer::new(seed, tuning)?),
            GameKind::Basketball => Box::new(Basketball::new(seed, tuning)),
            GameKind::Pinball => Box::new(Pinball::new(seed, tuning)),
            GameKind::Maze => Box::new(Maze::new(seed, tuning)?),
            GameKind::Walkers => Box::new(Walkers::new(seed, tuning)?),
            GameKind::Whack => Box::new(Whack::new(seed, tuning)),
        })
    }
}

/// Shared pause handling at the top of every game's tick
///
/// Applies a pause toggle (which consumes the tick) and reports whether the
/// game should advance this tick.
pub(crate) fn handle_pause(
    phase: &mut GamePhase,
    resume_phase: &mut GamePhase,
    input: &TickInput,
) -> bool {
    if input.pause {
        let (next, resume) = toggle_pause(*phase, *resume_phase);
        if next != *phase {
            log::debug!("{:?} -> {:?}", phase, next);
        }
        *phase = next;
        *resume_phase = resume;
        return false;
    }
    !phase.is_frozen()
}
