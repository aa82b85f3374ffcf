//! Side-scrolling tile platformer
//!
//! Run and jump through a tile level collecting coins, dodging spikes,
//! timed laser beams and patrolling enemies, to reach the exit.

pub mod level;
mod tick;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

pub use level::{LEVELS, Laser, Level, PlatformTile};

use super::{Arcade, GameKind};
use crate::error::Result;
use crate::settings::Tuning;
use crate::sim::{Aabb, EventQueue, GameEvent, GamePhase, Particles, RunStats, TickInput};

/// Platformer tuning constants (pixels, seconds)
pub mod consts {
    use glam::Vec2;

    pub const TILE_SIZE: f32 = 16.0;
    pub const PLAYER_SIZE: Vec2 = Vec2::new(12.0, 14.0);
    pub const ENEMY_SIZE: Vec2 = Vec2::new(14.0, 12.0);

    pub const RUN_SPEED: f32 = 110.0;
    pub const RUN_ACCEL: f32 = 900.0;
    pub const FRICTION: f32 = 1100.0;
    pub const GRAVITY: f32 = 900.0;
    pub const MAX_FALL: f32 = 400.0;
    /// Reaches roughly three tiles
    pub const JUMP_SPEED: f32 = 300.0;
    pub const STOMP_BOUNCE: f32 = 220.0;
    pub const ENEMY_SPEED: f32 = 40.0;

    /// Ticks after leaving a ledge in which a jump still counts
    pub const COYOTE_TICKS: u32 = 6;
    /// Ticks a jump press is remembered before landing
    pub const JUMP_BUFFER_TICKS: u32 = 6;
    pub const INVULN_TICKS: u32 = 90;

    pub const LASER_ON_TICKS: u32 = 90;
    pub const LASER_OFF_TICKS: u32 = 90;
    pub const LASER_WIDTH: f32 = 4.0;

    pub const COIN_POINTS: u32 = 50;
    pub const STOMP_POINTS: u32 = 100;
    pub const EXIT_POINTS: u32 = 500;
}

use consts::*;

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub aabb: Aabb,
    pub vel: Vec2,
    pub on_ground: bool,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub coyote_ticks: u32,
    pub jump_buffer_ticks: u32,
    /// Hazards and enemies are ignored while non-zero
    pub invuln_ticks: u32,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            aabb: Aabb::from_pos_size(spawn, PLAYER_SIZE),
            vel: Vec2::ZERO,
            on_ground: false,
            facing: 1.0,
            coyote_ticks: 0,
            jump_buffer_ticks: 0,
            invuln_ticks: 0,
        }
    }
}

/// A patrolling enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub aabb: Aabb,
    pub vel: Vec2,
    /// +1 walking right, -1 walking left
    pub dir: f32,
    pub alive: bool,
}

impl Enemy {
    pub fn new(pos: Vec2) -> Self {
        Self {
            aabb: Aabb::from_pos_size(pos, ENEMY_SIZE),
            vel: Vec2::ZERO,
            dir: -1.0,
            alive: true,
        }
    }
}

/// Complete platformer state
pub struct Platformer {
    pub level: Level,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub phase: GamePhase,
    pub stats: RunStats,
    pub coins_collected: u32,
    /// Phase to restore when unpausing
    resume_phase: GamePhase,
    level_index: usize,
    /// Level text when playing a custom level instead of the built-ins
    custom_level: Option<String>,
    tuning: Tuning,
    rng: Pcg32,
    particles: Particles,
    events: EventQueue,
}

impl Platformer {
    /// New run on the first built-in level
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self> {
        Ok(Self::from_level(Level::builtin(0)?, None, seed, tuning))
    }

    /// New run on a custom level (replayed on completion)
    pub fn with_level(text: &str, seed: u64, tuning: Tuning) -> Result<Self> {
        let level = Level::parse(text)?;
        Ok(Self::from_level(level, Some(text.to_string()), seed, tuning))
    }

    fn from_level(level: Level, custom_level: Option<String>, seed: u64, tuning: Tuning) -> Self {
        let player = Player::new(level.spawn);
        let enemies = level.enemy_spawns.iter().copied().map(Enemy::new).collect();
        Self {
            level,
            player,
            enemies,
            phase: GamePhase::Ready,
            stats: RunStats::new(tuning.lives),
            coins_collected: 0,
            resume_phase: GamePhase::Ready,
            level_index: 0,
            custom_level,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            particles: Particles::with_cap(tuning.max_particles),
            events: EventQueue::default(),
        }
    }

    /// Load the next level, keeping score and lives
    fn advance_level(&mut self) -> Result<()> {
        self.level_index += 1;
        let level = match &self.custom_level {
            Some(text) => Level::parse(text)?,
            None => Level::builtin(self.level_index)?,
        };
        self.player = Player::new(level.spawn);
        self.enemies = level.enemy_spawns.iter().copied().map(Enemy::new).collect();
        self.level = level;
        self.coins_collected = 0;
        self.stats.level += 1;
        self.particles.clear();
        log::info!("Platformer level {} started", self.stats.level);
        Ok(())
    }

    /// Respawn after a death, or end the run
    fn kill_player(&mut self) {
        log::debug!("Player died at {:?}", self.player.aabb.min);
        let center = self.player.aabb.center();
        self.particles.burst(&mut self.rng, center, 24, 140.0, 0xff4040);
        if self.stats.lose_life(&mut self.events) {
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver);
            log::info!("Platformer game over with score {}", self.stats.score);
            return;
        }
        self.player = Player::new(self.level.spawn);
        self.player.invuln_ticks = INVULN_TICKS;
    }
}

impl Arcade for Platformer {
    fn kind(&self) -> GameKind {
        GameKind::Platformer
    }

    fn tick(&mut self, input: &TickInput, dt: f32) {
        tick::tick(self, input, dt);
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn stats(&self) -> RunStats {
        self.stats
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    fn autoplay_input(&self) -> TickInput {
        tick::autoplay_input(self)
    }

    fn particles(&self) -> &Particles {
        &self.particles
    }
}
