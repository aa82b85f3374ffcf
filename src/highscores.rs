//! High score leaderboards
//!
//! One top-10 board per game, persisted as a single JSON document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::games::GameKind;
use crate::persistence;

/// Maximum number of high scores to keep per game
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboards, keyed by game
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    boards: BTreeMap<GameKind, Vec<HighScoreEntry>>,
}

impl HighScores {
    /// Storage key
    const STORAGE_KEY: &'static str = "highscores";

    /// Create empty leaderboards
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for one game, best first
    pub fn board(&self, kind: GameKind) -> &[HighScoreEntry] {
        self.boards.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if a score qualifies for a game's leaderboard
    pub fn qualifies(&self, kind: GameKind, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        let entries = self.board(kind);
        if entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        entries.last().is_none_or(|e| score > e.score)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, kind: GameKind, score: u64) -> Option<usize> {
        if !self.qualifies(kind, score) {
            return None;
        }
        let entries = self.board(kind);
        let rank = entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(entries.len()) + 1)
    }

    /// Add a new score to a leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(
        &mut self,
        kind: GameKind,
        score: u64,
        level: u32,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(kind, score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            level,
            timestamp,
        };
        let entries = self.boards.entry(kind).or_default();

        // Sorted descending by score; equal scores keep the older entry first
        let rank = match entries.iter().position(|e| score > e.score) {
            Some(i) => {
                entries.insert(i, entry);
                i + 1
            }
            None => {
                entries.push(entry);
                entries.len()
            }
        };
        entries.truncate(MAX_HIGH_SCORES);

        log::info!("{} high score {} at rank {}", kind.name(), score, rank);
        Some(rank)
    }

    /// Check if every leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.boards.values().all(Vec::is_empty)
    }

    /// Get a game's top score (if any)
    pub fn top_score(&self, kind: GameKind) -> Option<u64> {
        self.board(kind).first().map(|e| e.score)
    }

    /// Load high scores from storage, falling back to empty boards
    pub fn load() -> Self {
        persistence::load_or_default(Self::STORAGE_KEY)
    }

    /// Save high scores to storage
    pub fn save(&self) -> Result<()> {
        persistence::write_json(Self::STORAGE_KEY, self)
    }
}

/// Current wall-clock time in ms since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
