//! Walkers: guide a stream of mindless walkers to the exit
//!
//! Walkers drop from the entrance, walk until they hit a wall, and fall off
//! ledges. Hand out skills with the pointer to turn the crowd (Blocker) or
//! tunnel down (Digger). Save enough of them to clear the level.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Arcade, GameKind, handle_pause};
use crate::error::{Error, Result};
use crate::settings::Tuning;
use crate::sim::{
    Aabb, EventQueue, GameEvent, GamePhase, Particles, RunStats, TickInput, Tile, TileGrid,
    ground_probe, move_and_collide,
};

pub const TILE_SIZE: f32 = 8.0;
pub const WALKER_SIZE: Vec2 = Vec2::new(6.0, 10.0);
pub const WALK_SPEED: f32 = 20.0;
pub const GRAVITY: f32 = 300.0;
pub const MAX_FALL: f32 = 150.0;
/// Tallest ledge a walker climbs without turning
pub const MAX_STEP_UP: f32 = 8.0;
/// Longer drops are fatal
pub const MAX_SAFE_FALL: f32 = 40.0;
pub const DIG_TICKS: u32 = 30;
pub const SPAWN_INTERVAL_TICKS: u32 = 60;

pub const SAVE_POINTS: u32 = 100;
/// Level bonus per unused skill charge
pub const CHARGE_BONUS: u32 = 25;

/// Walker level tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WalkerTile {
    #[default]
    Empty,
    /// Diggable
    Dirt,
    Steel,
    Entrance,
    Exit,
    Hazard,
}

impl Tile for WalkerTile {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '.' | ' ' => Self::Empty,
            '#' => Self::Dirt,
            '@' => Self::Steel,
            'S' => Self::Entrance,
            'X' => Self::Exit,
            '^' => Self::Hazard,
            _ => return None,
        })
    }

    fn to_char(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Dirt => '#',
            Self::Steel => '@',
            Self::Entrance => 'S',
            Self::Exit => 'X',
            Self::Hazard => '^',
        }
    }

    fn is_solid(self) -> bool {
        matches!(self, Self::Dirt | Self::Steel)
    }
}

fn no_one_way(_: WalkerTile) -> bool {
    false
}

/// A level and its rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub map: String,
    /// Walkers released in total
    pub walkers: u32,
    /// Walkers that must be saved
    pub quota: u32,
    pub blockers: u32,
    pub diggers: u32,
}

impl LevelDef {
    /// Built-in level by index (wraps around)
    pub fn builtin(index: usize) -> Self {
        let (map, walkers, quota, blockers, diggers) = LEVELS[index % LEVELS.len()];
        Self {
            map: map.to_string(),
            walkers,
            quota,
            blockers,
            diggers,
        }
    }
}

/// Built-in levels: map, walkers, quota, blockers, diggers
const LEVELS: [(&str, u32, u32, u32, u32); 2] = [
    (
        "
@@@@@@@@@@@@@@@@@@@@@@@@
@......................@
@.S....................@
@......................@
@##########............@
@......................@
@......................@
@...........X..........@
@@@@@@@@@@@@@@@@@@@@@@@@
",
        5,
        4,
        1,
        1,
    ),
    (
        "
@@@@@@@@@@@@@@@@@@@@@@@@
@......................@
@.S....................@
@......................@
@@@@@@######@@@@@@.....@
@......................@
@.............X.......^@
@@@@@@@@@@@@@@@@@@@@@@@@
",
        5,
        3,
        1,
        2,
    ),
];

/// Skills the player hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Skill {
    Blocker,
    Digger,
}

impl Skill {
    pub const ALL: [Skill; 2] = [Skill::Blocker, Skill::Digger];

    fn index(self) -> usize {
        match self {
            Skill::Blocker => 0,
            Skill::Digger => 1,
        }
    }

    fn cycled(self, forward: bool) -> Skill {
        let n = Self::ALL.len();
        let i = if forward {
            (self.index() + 1) % n
        } else {
            (self.index() + n - 1) % n
        };
        Self::ALL[i]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WalkerState {
    Falling { fall_start_y: f32 },
    Walking,
    /// Stands still; others turn around at its box
    Blocking,
    Digging { progress: u32 },
    Saved,
    Dead,
}

/// One walker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Walker {
    pub aabb: Aabb,
    /// +1 walking right, -1 walking left
    pub dir: f32,
    pub vel_y: f32,
    pub state: WalkerState,
}

impl Walker {
    pub fn new(pos: Vec2) -> Self {
        Self {
            aabb: Aabb::from_pos_size(pos, WALKER_SIZE),
            dir: 1.0,
            vel_y: 0.0,
            state: WalkerState::Falling {
                fall_start_y: pos.y,
            },
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(
            self.state,
            WalkerState::Saved | WalkerState::Dead | WalkerState::Blocking
        )
    }

    fn start_falling(&mut self) {
        self.state = WalkerState::Falling {
            fall_start_y: self.aabb.min.y,
        };
        self.vel_y = 0.0;
    }
}

fn blocked(grid: &TileGrid<WalkerTile>, aabb: &Aabb) -> bool {
    grid.cells_overlapping(aabb).any(|(cx, cy)| grid.is_solid_cell(cx, cy))
}

/// Cells directly under the box
fn cells_below(grid: &TileGrid<WalkerTile>, aabb: &Aabb) -> Vec<(i32, i32)> {
    let strip = Aabb::new(
        Vec2::new(aabb.min.x, aabb.max.y),
        Vec2::new(aabb.max.x, aabb.max.y + 1.0),
    );
    grid.cells_overlapping(&strip).collect()
}

fn walk(grid: &TileGrid<WalkerTile>, w: &mut Walker, blockers: &[Aabb], dt: f32) {
    if !ground_probe(grid, &w.aabb, no_one_way) {
        w.start_falling();
        return;
    }

    let moved = w.aabb.translated(Vec2::new(w.dir * WALK_SPEED * dt, 0.0));
    let center_x = w.aabb.center().x;
    let at_blocker = blockers
        .iter()
        .any(|b| moved.overlaps(b) && (b.center().x - center_x) * w.dir > 0.0);
    if at_blocker {
        w.dir = -w.dir;
        return;
    }

    if !blocked(grid, &moved) {
        w.aabb = moved;
        return;
    }
    for lift in 1..=MAX_STEP_UP as i32 {
        let climbed = moved.translated(Vec2::new(0.0, -(lift as f32)));
        if !blocked(grid, &climbed) {
            w.aabb = climbed;
            return;
        }
    }
    w.dir = -w.dir;
}

/// Returns true when the walker died on landing
fn fall(grid: &TileGrid<WalkerTile>, w: &mut Walker, gravity: f32, dt: f32) -> bool {
    let WalkerState::Falling { fall_start_y } = w.state else {
        return false;
    };
    w.vel_y = (w.vel_y + gravity * dt).min(MAX_FALL);
    let result = move_and_collide(grid, w.aabb, Vec2::new(0.0, w.vel_y * dt), no_one_way);
    w.aabb = result.aabb;
    if !result.on_ground {
        return false;
    }
    w.vel_y = 0.0;
    if w.aabb.min.y - fall_start_y > MAX_SAFE_FALL {
        log::debug!("Walker fell {:.0}px", w.aabb.min.y - fall_start_y);
        w.state = WalkerState::Dead;
        return true;
    }
    w.state = WalkerState::Walking;
    false
}

/// One tick of digging: clear the row below every `DIG_TICKS`, then sink
fn dig(grid: &mut TileGrid<WalkerTile>, w: &mut Walker) {
    let WalkerState::Digging { progress } = w.state else {
        return;
    };
    if progress + 1 < DIG_TICKS {
        w.state = WalkerState::Digging {
            progress: progress + 1,
        };
        return;
    }

    let mut dug = 0;
    for (cx, cy) in cells_below(grid, &w.aabb) {
        if grid.get(cx, cy) == Some(WalkerTile::Dirt) {
            grid.set(cx, cy, WalkerTile::Empty);
            dug += 1;
        }
    }
    if dug == 0 {
        // Steel or nothing left to dig
        w.state = WalkerState::Walking;
        return;
    }

    let sunk = move_and_collide(grid, w.aabb, Vec2::new(0.0, TILE_SIZE), no_one_way);
    w.aabb = sunk.aabb;
    if ground_probe(grid, &w.aabb, no_one_way) {
        w.state = WalkerState::Digging { progress: 0 };
    } else {
        w.start_falling();
    }
}

/// Complete walkers state
pub struct Walkers {
    pub def: LevelDef,
    pub grid: TileGrid<WalkerTile>,
    pub walkers: Vec<Walker>,
    /// Top-left of a freshly spawned walker
    pub entrance: Vec2,
    pub exit_center: Vec2,
    pub spawned: u32,
    pub spawn_timer: u32,
    pub saved: u32,
    pub selected: Skill,
    /// Remaining charges, indexed like `Skill::ALL`
    pub charges: [u32; 2],
    pub phase: GamePhase,
    pub stats: RunStats,
    resume_phase: GamePhase,
    level_index: usize,
    custom: bool,
    prev_up: bool,
    prev_down: bool,
    tuning: Tuning,
    rng: Pcg32,
    particles: Particles,
    events: EventQueue,
}

impl Walkers {
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self> {
        Self::build(LevelDef::builtin(0), false, seed, tuning)
    }

    /// New run on a custom level (replayed on completion)
    pub fn with_level(def: LevelDef, seed: u64, tuning: Tuning) -> Result<Self> {
        Self::build(def, true, seed, tuning)
    }

    fn build(def: LevelDef, custom: bool, seed: u64, tuning: Tuning) -> Result<Self> {
        let (grid, entrance, exit_center) = Self::load(&def)?;
        Ok(Self {
            charges: [def.blockers, def.diggers],
            def,
            grid,
            walkers: Vec::new(),
            entrance,
            exit_center,
            spawned: 0,
            spawn_timer: 0,
            saved: 0,
            selected: Skill::Blocker,
            phase: GamePhase::Ready,
            stats: RunStats::new(1),
            resume_phase: GamePhase::Ready,
            level_index: 0,
            custom,
            prev_up: false,
            prev_down: false,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            particles: Particles::with_cap(tuning.max_particles),
            events: EventQueue::default(),
        })
    }

    fn load(def: &LevelDef) -> Result<(TileGrid<WalkerTile>, Vec2, Vec2)> {
        let grid: TileGrid<WalkerTile> = TileGrid::parse(&def.map, TILE_SIZE)?;
        let (sx, sy) = grid
            .find_first(WalkerTile::Entrance)
            .ok_or(Error::MissingMarker { marker: 'S' })?;
        let (ex, ey) = grid
            .find_first(WalkerTile::Exit)
            .ok_or(Error::MissingMarker { marker: 'X' })?;
        let cell = grid.cell_rect(sx, sy);
        let entrance = Vec2::new(
            cell.center().x - WALKER_SIZE.x * 0.5,
            cell.max.y - WALKER_SIZE.y,
        );
        Ok((grid, entrance, grid_center(ex, ey)))
    }

    pub fn charges(&self, skill: Skill) -> u32 {
        self.charges[skill.index()]
    }

    fn next_level(&mut self) -> Result<()> {
        if !self.custom {
            self.level_index += 1;
            self.def = LevelDef::builtin(self.level_index);
        }
        let (grid, entrance, exit_center) = Self::load(&self.def)?;
        self.grid = grid;
        self.entrance = entrance;
        self.exit_center = exit_center;
        self.walkers.clear();
        self.spawned = 0;
        self.spawn_timer = 0;
        self.saved = 0;
        self.charges = [self.def.blockers, self.def.diggers];
        self.stats.level += 1;
        self.particles.clear();
        log::info!("Walkers level {} started", self.stats.level);
        Ok(())
    }

    fn handle_skills(&mut self, input: &TickInput) {
        if input.down && !self.prev_down {
            self.selected = self.selected.cycled(true);
        }
        if input.up && !self.prev_up {
            self.selected = self.selected.cycled(false);
        }
        self.prev_down = input.down;
        self.prev_up = input.up;

        let Some(pointer) = input.pointer else {
            return;
        };
        if !input.action || self.charges(self.selected) == 0 {
            return;
        }
        let target = self.walkers.iter_mut().find(|w| {
            w.state == WalkerState::Walking && w.aabb.expanded(2.0).contains_point(pointer)
        });
        let Some(walker) = target else {
            return;
        };
        walker.state = match self.selected {
            Skill::Blocker => WalkerState::Blocking,
            Skill::Digger => WalkerState::Digging { progress: 0 },
        };
        self.charges[self.selected.index()] -= 1;
        log::debug!("Assigned {:?}", self.selected);
    }

    fn spawn(&mut self) {
        if self.spawned >= self.def.walkers {
            return;
        }
        self.spawn_timer = self.spawn_timer.saturating_sub(1);
        if self.spawn_timer > 0 {
            return;
        }
        self.walkers.push(Walker::new(self.entrance));
        self.spawned += 1;
        self.spawn_timer = SPAWN_INTERVAL_TICKS;
    }

    fn update_walkers(&mut self, dt: f32) {
        let gravity = GRAVITY * self.tuning.gravity;
        let blockers: Vec<Aabb> = self
            .walkers
            .iter()
            .filter(|w| w.state == WalkerState::Blocking)
            .map(|w| w.aabb)
            .collect();
        let floor_y = self.grid.pixel_size().y;

        for w in &mut self.walkers {
            match w.state {
                WalkerState::Walking => walk(&self.grid, w, &blockers, dt),
                WalkerState::Falling { .. } => {
                    if fall(&self.grid, w, gravity, dt) {
                        self.events.push(GameEvent::Died);
                    }
                }
                WalkerState::Digging { .. } => dig(&mut self.grid, w),
                WalkerState::Blocking | WalkerState::Saved | WalkerState::Dead => continue,
            }
            if w.state == WalkerState::Dead {
                continue;
            }

            if w.aabb.max.y >= floor_y - 1e-3 {
                // Dropped through a gap in the bottom row
                w.state = WalkerState::Dead;
                self.events.push(GameEvent::Died);
            } else if self
                .grid
                .any_overlapping(&w.aabb, |t| t == WalkerTile::Hazard)
                .is_some()
            {
                w.state = WalkerState::Dead;
                self.events.push(GameEvent::Died);
                let at = w.aabb.center();
                self.particles.burst(&mut self.rng, at, 10, 60.0, 0xff3030);
            } else if self
                .grid
                .any_overlapping(&w.aabb, |t| t == WalkerTile::Exit)
                .is_some()
            {
                w.state = WalkerState::Saved;
                self.saved += 1;
                self.events.push(GameEvent::Saved);
                self.stats.award(SAVE_POINTS, &mut self.events);
            }
        }
    }

    fn resolve(&mut self) {
        if self.spawned < self.def.walkers || self.walkers.iter().any(Walker::is_active) {
            return;
        }
        if self.saved >= self.def.quota {
            let bonus = self.charges.iter().sum::<u32>() * CHARGE_BONUS;
            if bonus > 0 {
                self.stats.award(bonus, &mut self.events);
            }
            self.phase = GamePhase::LevelComplete;
            self.events.push(GameEvent::LevelComplete);
            log::info!(
                "Walkers level {} cleared: {}/{} saved",
                self.stats.level,
                self.saved,
                self.def.walkers
            );
        } else {
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver);
            log::info!(
                "Walkers failed: {} saved of {} needed",
                self.saved,
                self.def.quota
            );
        }
    }
}

fn grid_center(cx: i32, cy: i32) -> Vec2 {
    Vec2::new(cx as f32 + 0.5, cy as f32 + 0.5) * TILE_SIZE
}

/// Advance the walkers game by one fixed timestep
fn tick(game: &mut Walkers, input: &TickInput, dt: f32) {
    if !handle_pause(&mut game.phase, &mut game.resume_phase, input) {
        return;
    }
    let input = if input.autoplay {
        game.autoplay_input()
    } else {
        input.clone()
    };

    game.particles.update(dt, Vec2::new(0.0, GRAVITY));

    match game.phase {
        GamePhase::Ready => {
            if !input.action {
                return;
            }
            game.phase = GamePhase::Playing;
        }
        GamePhase::LevelComplete => {
            if input.action {
                match game.next_level() {
                    Ok(()) => game.phase = GamePhase::Playing,
                    Err(e) => {
                        log::warn!("Could not load next level: {e}");
                        game.phase = GamePhase::GameOver;
                    }
                }
            }
            return;
        }
        GamePhase::Playing => {}
        GamePhase::Paused | GamePhase::GameOver => return,
    }

    game.stats.ticks += 1;
    game.handle_skills(&input);
    game.spawn();
    game.update_walkers(dt);
    game.resolve();
}

/// Demo AI: dig down with the first walker standing on dirt above the exit
fn autoplay(game: &Walkers) -> TickInput {
    match game.phase {
        GamePhase::Ready | GamePhase::LevelComplete => {
            return TickInput {
                action: true,
                ..Default::default()
            };
        }
        GamePhase::Playing => {}
        _ => return TickInput::default(),
    }

    let digging = game
        .walkers
        .iter()
        .any(|w| matches!(w.state, WalkerState::Digging { .. }));
    if digging || game.charges(Skill::Digger) == 0 {
        return TickInput::default();
    }

    let exit = game.exit_center;
    let candidate = game.walkers.iter().find(|w| {
        let below = cells_below(&game.grid, &w.aabb);
        w.state == WalkerState::Walking
            && exit.y > w.aabb.max.y
            && (exit.x - w.aabb.center().x) * w.dir > 0.0
            && !below.is_empty()
            && below
                .iter()
                .all(|&(cx, cy)| game.grid.get(cx, cy) == Some(WalkerTile::Dirt))
    });
    let Some(walker) = candidate else {
        return TickInput::default();
    };

    if game.selected != Skill::Digger {
        return TickInput {
            down: !game.prev_down,
            ..Default::default()
        };
    }
    TickInput {
        action: true,
        pointer: Some(walker.aabb.center()),
        ..Default::default()
    }
}

impl Arcade for Walkers {
    fn kind(&self) -> GameKind {
        GameKind::Walkers
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

    fn def(map: &str, walkers: u32, quota: u32) -> LevelDef {
        LevelDef {
            map: map.to_string(),
            walkers,
            quota,
            blockers: 1,
            diggers: 1,
        }
    }

    fn playing(map: &str, walkers: u32, quota: u32) -> Walkers {
        let mut game = Walkers::with_level(def(map, walkers, quota), 1, Tuning::default()).unwrap();
        game.phase = GamePhase::Playing;
        game
    }

    fn run(game: &mut Walkers, ticks: usize) {
        for _ in 0..ticks {
            game.tick(&TickInput::default(), SIM_DT);
        }
    }

    /// Walker standing on the floor whose top is at `floor_y`
    fn standing(x: f32, floor_y: f32) -> Walker {
        let mut w = Walker::new(Vec2::new(x, floor_y - WALKER_SIZE.y));
        w.state = WalkerState::Walking;
        w
    }

    const CORRIDOR: &str = "
@@@@@@@@@@
@........@
@S......X@
@@@@@@@@@@
";

    #[test]
    fn test_builtin_levels_load() {
        for i in 0..LEVELS.len() {
            let def = LevelDef::builtin(i);
            let (grid, _, _) = Walkers::load(&def).unwrap();
            assert_eq!(grid.count(WalkerTile::Exit), 1);
            assert!(def.quota <= def.walkers);
        }
        assert_eq!(LevelDef::builtin(LEVELS.len()), LevelDef::builtin(0));
    }

    #[test]
    fn test_missing_markers() {
        let no_exit = def("@@@@\n@S.@\n@@@@\n", 1, 1);
        assert!(matches!(
            Walkers::with_level(no_exit, 1, Tuning::default()),
            Err(Error::MissingMarker { marker: 'X' })
        ));
        let no_entrance = def("@@@@\n@.X@\n@@@@\n", 1, 1);
        assert!(matches!(
            Walkers::with_level(no_entrance, 1, Tuning::default()),
            Err(Error::MissingMarker { marker: 'S' })
        ));
    }

    #[test]
    fn test_spawn_schedule() {
        let mut game = Walkers::with_level(def(CORRIDOR, 3, 1), 1, Tuning::default()).unwrap();
        run(&mut game, 10);
        assert_eq!(game.phase, GamePhase::Ready);
        assert!(game.walkers.is_empty());

        let start = TickInput {
            action: true,
            ..Default::default()
        };
        game.tick(&start, SIM_DT);
        assert_eq!(game.spawned, 1);
        run(&mut game, SPAWN_INTERVAL_TICKS as usize);
        assert_eq!(game.spawned, 2);
        run(&mut game, 3 * SPAWN_INTERVAL_TICKS as usize);
        assert_eq!(game.spawned, 3);
    }

    #[test]
    fn test_walk_to_exit_clears_level() {
        let mut game = playing(CORRIDOR, 1, 1);
        run(&mut game, 200);
        assert_eq!(game.walkers[0].state, WalkerState::Saved);
        assert_eq!(game.saved, 1);
        assert_eq!(game.phase, GamePhase::LevelComplete);
        // Save plus two unused charges
        assert_eq!(game.stats.score, u64::from(SAVE_POINTS + 2 * CHARGE_BONUS));
    }

    #[test]
    fn test_hazard_kills() {
        let mut game = playing(&CORRIDOR.replace("@S......X@", "@S....^.X@"), 1, 1);
        run(&mut game, 200);
        assert_eq!(game.walkers[0].state, WalkerState::Dead);
        assert_eq!(game.phase, GamePhase::GameOver);
        assert!(game.drain_events().contains(&GameEvent::Died));
    }

    #[test]
    fn test_steps_up_single_tile() {
        let map = "
@@@@@@@@@@@@
@.........X@
@..........@
@.S........@
@.....#....@
@@@@@@@@@@@@
";
        let mut game = playing(map, 1, 1);
        run(&mut game, 160);
        let w = &game.walkers[0];
        assert!(w.aabb.min.x > 56.0, "walker at {:?}", w.aabb);
        assert_ne!(w.state, WalkerState::Dead);
        assert_eq!(w.dir, 1.0);
    }

    #[test]
    fn test_turns_at_tall_wall() {
        let map = "
@@@@@@@@@@@@
@.........X@
@..........@
@.S...#....@
@.....#....@
@@@@@@@@@@@@
";
        let mut game = playing(map, 1, 1);
        run(&mut game, 160);
        let w = &game.walkers[0];
        assert_eq!(w.dir, -1.0);
        assert!(w.aabb.max.x <= 48.0);
    }

    #[test]
    fn test_long_fall_is_fatal() {
        let map = "
@@@@@@@@@@
@........@
@.S.....X@
@###.....@
@........@
@........@
@........@
@........@
@........@
@........@
@@@@@@@@@@
";
        let mut game = playing(map, 1, 1);
        run(&mut game, 150);
        assert_eq!(game.walkers[0].state, WalkerState::Dead);
        assert_eq!(game.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_short_fall_is_safe() {
        let map = "
@@@@@@@@@@
@........@
@.S.....X@
@###.....@
@........@
@........@
@@@@@@@@@@
";
        let mut game = playing(map, 1, 1);
        run(&mut game, 150);
        let w = &game.walkers[0];
        assert_eq!(w.state, WalkerState::Walking);
        assert_eq!(w.aabb.max.y, 48.0);
    }

    #[test]
    fn test_gap_in_bottom_row_is_fatal() {
        let map = "
@@@@@@@@
@......@
@S....X@
@......@
@@@.@@@@
";
        let mut game = playing(map, 1, 1);
        run(&mut game, 120);
        assert_eq!(game.walkers[0].state, WalkerState::Dead);
    }

    #[test]
    fn test_blocker_turns_walkers() {
        let mut game = playing(CORRIDOR, 2, 1);
        game.spawned = 2;
        let mut blocker = standing(40.0, 24.0);
        blocker.state = WalkerState::Blocking;
        game.walkers = vec![blocker, standing(20.0, 24.0)];
        run(&mut game, 90);
        let w = &game.walkers[1];
        assert_eq!(w.dir, -1.0);
        assert!(w.aabb.max.x <= 40.0);
        assert_eq!(game.walkers[0].aabb.min.x, 40.0);
    }

    #[test]
    fn test_assign_skills() {
        let mut game = playing(CORRIDOR, 2, 1);
        game.spawned = 2;
        game.walkers = vec![standing(20.0, 24.0), standing(50.0, 24.0)];

        let at = |w: &Walker| TickInput {
            action: true,
            pointer: Some(w.aabb.center()),
            ..Default::default()
        };
        let input = at(&game.walkers[0]);
        game.tick(&input, SIM_DT);
        assert_eq!(game.walkers[0].state, WalkerState::Blocking);
        assert_eq!(game.charges(Skill::Blocker), 0);

        // Out of blockers: nothing happens
        let input = at(&game.walkers[1]);
        game.tick(&input, SIM_DT);
        assert_eq!(game.walkers[1].state, WalkerState::Walking);
    }

    #[test]
    fn test_skill_cycling_is_edge_triggered() {
        let mut game = playing(CORRIDOR, 1, 1);
        let down = TickInput {
            down: true,
            ..Default::default()
        };
        game.tick(&down, SIM_DT);
        game.tick(&down, SIM_DT);
        assert_eq!(game.selected, Skill::Digger);
        game.tick(&TickInput::default(), SIM_DT);
        game.tick(&down, SIM_DT);
        assert_eq!(game.selected, Skill::Blocker);
        let up = TickInput {
            up: true,
            ..Default::default()
        };
        game.tick(&up, SIM_DT);
        assert_eq!(game.selected, Skill::Digger);
    }

    const DIG_MAP: &str = "
@@@@@@@@@@
@.......X@
@S.......@
@@@###@@@@
@###.....@
@@@@@@@@@@
";

    #[test]
    fn test_digger_tunnels_through_dirt() {
        let mut game = playing(DIG_MAP, 1, 1);
        game.spawned = 1;
        game.walkers = vec![standing(33.0, 24.0)];
        game.selected = Skill::Digger;
        let input = TickInput {
            action: true,
            pointer: Some(game.walkers[0].aabb.center()),
            ..Default::default()
        };
        game.tick(&input, SIM_DT);
        assert!(matches!(game.walkers[0].state, WalkerState::Digging { .. }));
        assert_eq!(game.charges(Skill::Digger), 0);

        run(&mut game, 60);
        assert_eq!(game.grid.get(4, 3), Some(WalkerTile::Empty));
        let w = &game.walkers[0];
        assert_eq!(w.aabb.max.y, 40.0);
        assert_ne!(w.state, WalkerState::Dead);
    }

    #[test]
    fn test_digger_stops_at_steel() {
        let mut game = playing(DIG_MAP, 1, 1);
        game.spawned = 1;
        game.walkers = vec![standing(57.0, 24.0)];
        game.walkers[0].state = WalkerState::Digging { progress: 0 };
        let before = game.grid.clone();
        run(&mut game, DIG_TICKS as usize);
        assert_eq!(game.walkers[0].state, WalkerState::Walking);
        assert_eq!(game.grid, before);
    }

    #[test]
    fn test_autoplay_starts_and_selects_digger() {
        let mut game = Walkers::new(1, Tuning::default()).unwrap();
        assert!(game.autoplay_input().action);
        game.phase = GamePhase::Playing;
        game.spawned = 1;
        game.walkers = vec![standing(20.0, 32.0)];
        let input = game.autoplay_input();
        assert!(input.down);
    }
}
