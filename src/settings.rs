//! Game settings and preferences
//!
//! Persisted separately from high scores under their own storage key.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 1024,
        }
    }
}

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Gameplay multipliers every game reads at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Scales gravity in physics games
    pub gravity: f32,
    /// Scales enemy / ghost / mole speeds
    pub enemy_speed: f32,
    /// Scales round timers (shot clock, whack round length)
    pub round_time: f32,
    pub lives: u8,
    /// Particle pool cap (0 disables particles)
    pub max_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Settings::default().tuning()
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Particle effects (explosions, sparks, etc.)
    pub particles: bool,
    /// Reduced motion (no particles, no shake)
    pub reduced_motion: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    /// Overrides the difficulty's starting lives
    pub starting_lives: Option<u8>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            quality: QualityPreset::Medium,
            particles: true,
            reduced_motion: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            starting_lives: None,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "settings";

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles || self.reduced_motion {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Effective sound effect volume
    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Gameplay multipliers for the current difficulty
    pub fn tuning(&self) -> Tuning {
        let (gravity, enemy_speed, round_time, lives) = match self.difficulty {
            Difficulty::Easy => (0.9, 0.8, 1.25, 5),
            Difficulty::Normal => (1.0, 1.0, 1.0, 3),
            Difficulty::Hard => (1.1, 1.25, 0.8, 2),
        };
        Tuning {
            gravity,
            enemy_speed,
            round_time,
            lives: self.starting_lives.unwrap_or(lives).max(1),
            max_particles: self.max_particles(),
        }
    }

    /// Load settings from storage, falling back to defaults
    pub fn load() -> Self {
        persistence::load_or_default(Self::STORAGE_KEY)
    }

    /// Save settings to storage
    pub fn save(&self) -> Result<()> {
        persistence::write_json(Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
