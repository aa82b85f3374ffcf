//! Phase, events and run statistics shared by every game

use serde::{Deserialize, Serialize};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first input (serve, plunger, "press to start")
    Ready,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Level beaten, waiting for input to continue
    LevelComplete,
    /// Run ended
    GameOver,
}

impl GamePhase {
    /// Phases in which the simulation does not advance
    pub fn is_frozen(self) -> bool {
        matches!(self, GamePhase::Paused | GamePhase::GameOver)
    }
}

/// Things that happened during a tick, for sound and HUD feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Scored { points: u32 },
    /// A collectible was picked up
    Collected,
    /// Something bounced off a surface
    Bounce,
    /// Player hit something (enemy stomped, mole whacked, bumper struck)
    Hit,
    LifeLost,
    LevelComplete,
    GameOver,
    /// A walker reached the exit
    Saved,
    /// A non-player entity died
    Died,
}

/// Events accumulated between drains
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events, oldest first
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Score keeping common to every game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub score: u64,
    pub lives: u8,
    /// Current level (1-based)
    pub level: u32,
    /// Simulation tick counter
    pub ticks: u64,
}

impl RunStats {
    pub fn new(lives: u8) -> Self {
        Self {
            score: 0,
            lives,
            level: 1,
            ticks: 0,
        }
    }

    /// Add points and report them
    pub fn award(&mut self, points: u32, events: &mut EventQueue) {
        self.score += u64::from(points);
        events.push(GameEvent::Scored { points });
    }

    /// Lose a life; returns true when none remain
    pub fn lose_life(&mut self, events: &mut EventQueue) -> bool {
        self.lives = self.lives.saturating_sub(1);
        events.push(GameEvent::LifeLost);
        self.lives == 0
    }
}

/// Apply a pause toggle
///
/// Playing and Ready pause; Paused resumes to `resume_to`. Other phases are
/// unaffected. Returns the phase to store (and the phase to resume to, for
/// the caller to remember while paused).
pub fn toggle_pause(phase: GamePhase, resume_to: GamePhase) -> (GamePhase, GamePhase) {
    match phase {
        GamePhase::Playing | GamePhase::Ready => (GamePhase::Paused, phase),
        GamePhase::Paused => (resume_to, resume_to),
        other => (other, resume_to),
    }
}
