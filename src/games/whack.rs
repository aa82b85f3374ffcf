//! Whack-a-mole
//!
//! Moles pop out of a 3×3 field of holes; click them before they duck back.
//! Consecutive hits build a combo, golden moles pay extra and bomb moles
//! cost a life. Moles come faster as the round clock runs down.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Arcade, GameKind, handle_pause};
use crate::settings::Tuning;
use crate::sim::{Aabb, EventQueue, GameEvent, GamePhase, Particles, RunStats, TickInput};

pub const GRID: usize = 3;
pub const HOLE_COUNT: usize = GRID * GRID;
pub const HOLE_SIZE: Vec2 = Vec2::new(80.0, 40.0);
/// Top-left of the first hole and spacing between holes
const FIELD_ORIGIN: Vec2 = Vec2::new(30.0, 70.0);
const HOLE_SPACING: Vec2 = Vec2::new(100.0, 90.0);
/// How far a raised mole sticks out above its hole
const MOLE_HEIGHT: f32 = 36.0;
const MOLE_INSET: f32 = 10.0;

pub const MAX_MOLES_UP: usize = 3;
/// Spawn interval at the start and end of a round (ticks)
pub const START_INTERVAL_TICKS: u32 = 60;
pub const END_INTERVAL_TICKS: u32 = 20;
const INTERVAL_JITTER: u32 = 10;
pub const MIN_UP_TICKS: u32 = 40;
pub const MAX_UP_TICKS: u32 = 90;
const ROUND_TICKS: u32 = 45 * 60;

pub const GOLDEN_CHANCE: f64 = 0.1;
pub const BOMB_CHANCE: f64 = 0.08;
pub const MOLE_POINTS: u32 = 10;
pub const GOLDEN_POINTS: u32 = 50;
/// Combo multiplier cap
pub const MAX_COMBO: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoleKind {
    Normal,
    Golden,
    /// Whacking it costs a life
    Bomb,
}

/// A raised mole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mole {
    pub hole: usize,
    pub kind: MoleKind,
    pub ticks_left: u32,
    /// Ticks since popping up
    pub age: u32,
}

/// Rectangle of hole `index` (row-major)
pub fn hole_rect(index: usize) -> Aabb {
    let (col, row) = (index % GRID, index / GRID);
    let pos = FIELD_ORIGIN + Vec2::new(col as f32, row as f32) * HOLE_SPACING;
    Aabb::from_pos_size(pos, HOLE_SIZE)
}

/// Clickable area of a mole raised from hole `index`
pub fn mole_hitbox(index: usize) -> Aabb {
    let hole = hole_rect(index);
    Aabb::new(
        Vec2::new(hole.min.x + MOLE_INSET, hole.min.y - MOLE_HEIGHT),
        Vec2::new(hole.max.x - MOLE_INSET, hole.max.y),
    )
}

/// Base spawn interval `progress` of the way (0..=1) through the round
pub fn spawn_interval(progress: f32) -> u32 {
    let t = progress.clamp(0.0, 1.0);
    let start = START_INTERVAL_TICKS as f32;
    let end = END_INTERVAL_TICKS as f32;
    (start + (end - start) * t).round() as u32
}

/// Complete whack-a-mole state
pub struct Whack {
    pub moles: Vec<Mole>,
    pub combo: u32,
    pub hits: u32,
    pub misses: u32,
    pub escapes: u32,
    pub spawn_timer: u32,
    pub round_ticks: u32,
    pub time_left_ticks: u32,
    pub phase: GamePhase,
    pub stats: RunStats,
    resume_phase: GamePhase,
    tuning: Tuning,
    rng: Pcg32,
    particles: Particles,
    events: EventQueue,
}

impl Whack {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let round_ticks = (ROUND_TICKS as f32 * tuning.round_time) as u32;
        Self {
            moles: Vec::new(),
            combo: 0,
            hits: 0,
            misses: 0,
            escapes: 0,
            spawn_timer: START_INTERVAL_TICKS / 2,
            round_ticks,
            time_left_ticks: round_ticks,
            phase: GamePhase::Ready,
            stats: RunStats::new(tuning.lives),
            resume_phase: GamePhase::Ready,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            particles: Particles::with_cap(tuning.max_particles),
            events: EventQueue::default(),
        }
    }

    fn progress(&self) -> f32 {
        if self.round_ticks == 0 {
            return 1.0;
        }
        1.0 - self.time_left_ticks as f32 / self.round_ticks as f32
    }

    fn free_holes(&self) -> Vec<usize> {
        (0..HOLE_COUNT)
            .filter(|h| !self.moles.iter().any(|m| m.hole == *h))
            .collect()
    }

    /// Put a mole in `hole` unless it is taken
    pub fn pop_up(&mut self, hole: usize, kind: MoleKind, up_ticks: u32) -> bool {
        if hole >= HOLE_COUNT || self.moles.iter().any(|m| m.hole == hole) {
            return false;
        }
        self.moles.push(Mole {
            hole,
            kind,
            ticks_left: up_ticks.max(1),
            age: 0,
        });
        true
    }

    fn spawn(&mut self) {
        self.spawn_timer = self.spawn_timer.saturating_sub(1);
        if self.spawn_timer > 0 {
            return;
        }
        let jitter = self.rng.random_range(0..=INTERVAL_JITTER);
        self.spawn_timer = spawn_interval(self.progress()) + jitter;

        if self.moles.len() >= MAX_MOLES_UP {
            return;
        }
        let free = self.free_holes();
        if free.is_empty() {
            return;
        }
        let hole = free[self.rng.random_range(0..free.len())];
        let roll: f64 = self.rng.random();
        let kind = if roll < BOMB_CHANCE {
            MoleKind::Bomb
        } else if roll < BOMB_CHANCE + GOLDEN_CHANCE {
            MoleKind::Golden
        } else {
            MoleKind::Normal
        };
        let up = self.rng.random_range(MIN_UP_TICKS..=MAX_UP_TICKS) as f32;
        let up_ticks = (up / self.tuning.enemy_speed.max(0.1)) as u32;
        self.pop_up(hole, kind, up_ticks);
    }

    fn whack(&mut self, pointer: Vec2) {
        let target = self
            .moles
            .iter()
            .position(|m| mole_hitbox(m.hole).contains_point(pointer));
        let Some(index) = target else {
            self.combo = 0;
            self.misses += 1;
            return;
        };

        let mole = self.moles.remove(index);
        let at = mole_hitbox(mole.hole).center();
        self.events.push(GameEvent::Hit);
        match mole.kind {
            MoleKind::Bomb => {
                self.combo = 0;
                self.particles.burst(&mut self.rng, at, 24, 150.0, 0xff5020);
                log::debug!("Bomb in hole {}", mole.hole);
                if self.stats.lose_life(&mut self.events) {
                    self.end_round();
                }
            }
            MoleKind::Normal | MoleKind::Golden => {
                self.combo += 1;
                self.hits += 1;
                let base = if mole.kind == MoleKind::Golden {
                    GOLDEN_POINTS
                } else {
                    MOLE_POINTS
                };
                self.stats
                    .award(base * self.combo.min(MAX_COMBO), &mut self.events);
                self.particles.burst(&mut self.rng, at, 10, 90.0, 0xc08040);
            }
        }
    }

    fn age_moles(&mut self) {
        for mole in &mut self.moles {
            mole.age += 1;
            mole.ticks_left = mole.ticks_left.saturating_sub(1);
        }
        let before = self.moles.len();
        let escaped = self
            .moles
            .iter()
            .filter(|m| m.ticks_left == 0 && m.kind != MoleKind::Bomb)
            .count();
        self.moles.retain(|m| m.ticks_left > 0);
        if self.moles.len() != before {
            self.escapes += escaped as u32;
        }
    }

    fn end_round(&mut self) {
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver);
        log::info!(
            "Whack over: {} points, {} hits, {} misses, {} escaped",
            self.stats.score,
            self.hits,
            self.misses,
            self.escapes
        );
    }
}

/// Advance whack-a-mole by one fixed timestep
fn tick(game: &mut Whack, input: &TickInput, dt: f32) {
    if !handle_pause(&mut game.phase, &mut game.resume_phase, input) {
        return;
    }
    let input = if input.autoplay {
        game.autoplay_input()
    } else {
        input.clone()
    };

    game.particles.update(dt, Vec2::new(0.0, 200.0));

    match game.phase {
        GamePhase::Ready => {
            if input.action {
                game.phase = GamePhase::Playing;
            }
            return;
        }
        GamePhase::Playing => {}
        _ => return,
    }

    game.stats.ticks += 1;
    if input.action {
        if let Some(pointer) = input.pointer {
            game.whack(pointer);
            if game.phase == GamePhase::GameOver {
                return;
            }
        }
    }

    game.age_moles();
    game.spawn();

    game.time_left_ticks = game.time_left_ticks.saturating_sub(1);
    if game.time_left_ticks == 0 {
        game.end_round();
    }
}

/// Demo AI: whack the oldest safe mole once it has been up a moment
fn autoplay(game: &Whack) -> TickInput {
    const REACTION_TICKS: u32 = 12;
    match game.phase {
        GamePhase::Ready => TickInput {
            action: true,
            ..Default::default()
        },
        GamePhase::Playing => {
            let target = game
                .moles
                .iter()
                .filter(|m| m.kind != MoleKind::Bomb && m.age >= REACTION_TICKS)
                .max_by_key(|m| m.age);
            match target {
                Some(m) => TickInput {
                    action: true,
                    pointer: Some(mole_hitbox(m.hole).center()),
                    ..Default::default()
                },
                None => TickInput::default(),
            }
        }
        _ => TickInput::default(),
    }
}

impl Arcade for Whack {
    fn kind(&self) -> GameKind {
        GameKind::Whack
    }

    fn tick(&mut self, input: &TickInput, dt: f32) {
        tick(self, input, dt);
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
        autoplay(self)
    }

    fn particles(&self) -> &Particles {
        &self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    /// Playing, with random spawns held off
    fn quiet() -> Whack {
        let mut game = Whack::new(5, Tuning::default());
        game.phase = GamePhase::Playing;
        game.spawn_timer = u32::MAX;
        game
    }

    fn click(hole: usize) -> TickInput {
        TickInput {
            action: true,
            pointer: Some(mole_hitbox(hole).center()),
            ..Default::default()
        }
    }

    #[test]
    fn test_holes_do_not_overlap() {
        for a in 0..HOLE_COUNT {
            for b in (a + 1)..HOLE_COUNT {
                assert!(!mole_hitbox(a).overlaps(&mole_hitbox(b)), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_ready_until_action() {
        let mut game = Whack::new(5, Tuning::default());
        for _ in 0..100 {
            game.tick(&TickInput::default(), SIM_DT);
        }
        assert_eq!(game.phase, GamePhase::Ready);
        assert!(game.moles.is_empty());
        game.tick(&click(0), SIM_DT);
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.misses, 0);
    }

    #[test]
    fn test_spawn_limits_hold() {
        let mut game = Whack::new(9, Tuning::default());
        game.phase = GamePhase::Playing;
        let mut seen = 0;
        for _ in 0..2000 {
            game.tick(&TickInput::default(), SIM_DT);
            assert!(game.moles.len() <= MAX_MOLES_UP);
            let mut holes: Vec<usize> = game.moles.iter().map(|m| m.hole).collect();
            holes.sort_unstable();
            holes.dedup();
            assert_eq!(holes.len(), game.moles.len());
            seen = seen.max(game.moles.len());
        }
        assert!(seen > 0);
        assert!(game.escapes > 0);
    }

    #[test]
    fn test_spawn_interval_shrinks() {
        assert_eq!(spawn_interval(0.0), START_INTERVAL_TICKS);
        assert_eq!(spawn_interval(1.0), END_INTERVAL_TICKS);
        assert!(spawn_interval(0.5) < START_INTERVAL_TICKS);
        assert_eq!(spawn_interval(7.0), END_INTERVAL_TICKS);
    }

    #[test]
    fn test_one_mole_per_hole() {
        let mut game = quiet();
        assert!(game.pop_up(4, MoleKind::Normal, 60));
        assert!(!game.pop_up(4, MoleKind::Golden, 60));
        assert!(!game.pop_up(HOLE_COUNT, MoleKind::Normal, 60));
    }

    #[test]
    fn test_whack_builds_combo() {
        let mut game = quiet();
        game.pop_up(4, MoleKind::Normal, 60);
        game.pop_up(0, MoleKind::Normal, 60);
        game.tick(&click(4), SIM_DT);
        assert_eq!(game.stats.score, u64::from(MOLE_POINTS));
        game.tick(&click(0), SIM_DT);
        assert_eq!(game.stats.score, u64::from(MOLE_POINTS * 3));
        assert_eq!(game.combo, 2);
        assert!(game.moles.is_empty());
    }

    #[test]
    fn test_miss_resets_combo() {
        let mut game = quiet();
        game.pop_up(4, MoleKind::Normal, 60);
        game.tick(&click(4), SIM_DT);
        assert_eq!(game.combo, 1);
        game.tick(&click(2), SIM_DT);
        assert_eq!(game.combo, 0);
        assert_eq!(game.misses, 1);
    }

    #[test]
    fn test_golden_mole() {
        let mut game = quiet();
        game.pop_up(8, MoleKind::Golden, 60);
        game.tick(&click(8), SIM_DT);
        assert_eq!(game.stats.score, u64::from(GOLDEN_POINTS));
    }

    #[test]
    fn test_bomb_costs_life() {
        let mut game = quiet();
        let lives = game.stats.lives;
        game.pop_up(3, MoleKind::Bomb, 60);
        game.tick(&click(3), SIM_DT);
        assert_eq!(game.stats.lives, lives - 1);
        assert_eq!(game.stats.score, 0);
        assert!(game.drain_events().contains(&GameEvent::LifeLost));
    }

    #[test]
    fn test_last_life_ends_round() {
        let mut game = quiet();
        game.stats.lives = 1;
        game.pop_up(3, MoleKind::Bomb, 60);
        game.tick(&click(3), SIM_DT);
        assert_eq!(game.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_unwhacked_mole_escapes() {
        let mut game = quiet();
        game.pop_up(1, MoleKind::Normal, 5);
        game.pop_up(2, MoleKind::Bomb, 5);
        for _ in 0..5 {
            game.tick(&TickInput::default(), SIM_DT);
        }
        assert!(game.moles.is_empty());
        assert_eq!(game.escapes, 1);
    }

    #[test]
    fn test_clock_ends_round() {
        let mut game = quiet();
        game.time_left_ticks = 2;
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase, GamePhase::Playing);
        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_autoplay_skips_bombs() {
        let mut game = quiet();
        game.pop_up(2, MoleKind::Bomb, 200);
        game.pop_up(6, MoleKind::Normal, 200);
        for mole in &mut game.moles {
            mole.age = 30;
        }
        let input = game.autoplay_input();
        assert_eq!(input.pointer, Some(mole_hitbox(6).center()));
    }
}
