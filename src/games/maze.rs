//! Maze chase
//!
//! Eat every pellet while ghosts hunt you down the corridors. Power pellets
//! turn the tables for a few seconds. Everything moves cell center to cell
//! center; decisions are only made at centers.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Arcade, GameKind, handle_pause};
use crate::error::{Error, Result};
use crate::settings::Tuning;
use crate::sim::{
    Aabb, Dir, EventQueue, GameEvent, GamePhase, Particles, RunStats, TickInput, Tile, TileGrid,
};

pub const TILE_SIZE: f32 = 16.0;
/// Pixels per second
pub const PLAYER_SPEED: f32 = 64.0;
pub const GHOST_SPEED: f32 = 60.0;
const FRIGHT_SPEED_SCALE: f32 = 0.5;
/// Ghost speed gain per level, capped at `MAX_LEVEL_SPEEDUP`
const LEVEL_SPEEDUP: f32 = 0.1;
const MAX_LEVEL_SPEEDUP: f32 = 1.5;

pub const FRIGHT_TICKS: u32 = 360;
/// Ticks a ghost waits at its spawn before moving (staggered per ghost)
pub const GHOST_RELEASE_TICKS: u32 = 60;
/// Half size of player and ghost hit boxes
const ENTITY_HALF: f32 = 6.0;

pub const PELLET_POINTS: u32 = 10;
pub const POWER_POINTS: u32 = 50;
/// Doubles for each ghost eaten during one fright
pub const GHOST_POINTS: u32 = 200;

/// Maze tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MazeTile {
    #[default]
    Empty,
    Wall,
    Pellet,
    Power,
    /// Ghost house door: ghosts pass, the player does not
    Door,
    PlayerSpawn,
    GhostSpawn,
}

impl Tile for MazeTile {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            ' ' => Self::Empty,
            '#' => Self::Wall,
            '.' => Self::Pellet,
            'o' => Self::Power,
            '-' => Self::Door,
            'P' => Self::PlayerSpawn,
            'G' => Self::GhostSpawn,
            _ => return None,
        })
    }

    fn to_char(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Wall => '#',
            Self::Pellet => '.',
            Self::Power => 'o',
            Self::Door => '-',
            Self::PlayerSpawn => 'P',
            Self::GhostSpawn => 'G',
        }
    }

    /// Solid for the player
    fn is_solid(self) -> bool {
        matches!(self, Self::Wall | Self::Door)
    }
}

pub const MAZE: &str = "
###############
#o.....#.....o#
#.###.#.#.###.#
#.............#
#.##.##-##.##.#
#....#GGG#....#
#.##.#####.##.#
#......P......#
#.###.###.###.#
#o...........o#
###############
";

fn step(cell: (i32, i32), dir: Dir) -> (i32, i32) {
    let (dx, dy) = dir.delta();
    (cell.0 + dx, cell.1 + dy)
}

fn ghost_passable(grid: &TileGrid<MazeTile>, cell: (i32, i32)) -> bool {
    grid.get(cell.0, cell.1).is_some_and(|t| t != MazeTile::Wall)
}

fn player_passable(grid: &TileGrid<MazeTile>, cell: (i32, i32)) -> bool {
    !grid.is_solid_cell(cell.0, cell.1)
}

fn dist_sq(a: (i32, i32), b: (i32, i32)) -> i32 {
    let (dx, dy) = (a.0 - b.0, a.1 - b.1);
    dx * dx + dy * dy
}

/// Something that travels between cell centers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mover {
    /// Cell last left (or currently centered on)
    pub cell: (i32, i32),
    pub dir: Option<Dir>,
    /// Pixels traveled from `cell`'s center toward the next cell
    pub progress: f32,
}

impl Mover {
    pub fn at(cell: (i32, i32)) -> Self {
        Self {
            cell,
            dir: None,
            progress: 0.0,
        }
    }

    pub fn pos(&self, grid: &TileGrid<MazeTile>) -> Vec2 {
        let center = grid.cell_center(self.cell.0, self.cell.1);
        match self.dir {
            Some(d) => center + d.to_vec2() * self.progress,
            None => center,
        }
    }

    /// Cell being moved toward (or the current cell when centered)
    pub fn heading_cell(&self) -> (i32, i32) {
        match self.dir {
            Some(d) if self.progress > 0.0 => step(self.cell, d),
            _ => self.cell,
        }
    }

    /// Turn around mid-corridor without snapping
    fn reverse(&mut self) {
        if let Some(d) = self.dir {
            if self.progress > 0.0 {
                self.cell = step(self.cell, d);
                self.progress = TILE_SIZE - self.progress;
            }
            self.dir = Some(d.opposite());
        }
    }

    /// Travel `dist` pixels, asking `choose` for a direction at every cell
    /// center. Returns the cells arrived at, in order.
    fn advance(
        &mut self,
        mut dist: f32,
        mut choose: impl FnMut(&Mover) -> Option<Dir>,
    ) -> Vec<(i32, i32)> {
        let mut arrived = Vec::new();
        loop {
            if self.progress <= 0.0 {
                self.progress = 0.0;
                self.dir = choose(self);
            }
            let Some(dir) = self.dir else {
                break;
            };
            let remaining = TILE_SIZE - self.progress;
            if dist < remaining {
                self.progress += dist;
                break;
            }
            dist -= remaining;
            self.cell = step(self.cell, dir);
            self.progress = 0.0;
            arrived.push(self.cell);
        }
        arrived
    }

    fn hitbox(&self, grid: &TileGrid<MazeTile>) -> Aabb {
        Aabb::from_center(self.pos(grid), Vec2::splat(ENTITY_HALF))
    }
}

/// Direction a ghost takes at a cell center
///
/// Never reverses unless that is the only way out. Chasing follows the
/// breadth-first shortest path to `target`; frightened ghosts flee to the
/// neighbor farthest from it. Ties go to the first in `Dir::ORDER`.
pub fn ghost_dir(
    grid: &TileGrid<MazeTile>,
    mover: &Mover,
    target: (i32, i32),
    frightened: bool,
) -> Option<Dir> {
    let cell = mover.cell;
    let open: Vec<Dir> = Dir::ORDER
        .into_iter()
        .filter(|&d| ghost_passable(grid, step(cell, d)))
        .collect();
    let reverse = mover.dir.map(Dir::opposite);
    let forward: Vec<Dir> = open.iter().copied().filter(|&d| Some(d) != reverse).collect();
    let options = if forward.is_empty() { open } else { forward };

    if frightened {
        let mut best: Option<(Dir, i32)> = None;
        for &d in &options {
            let dist = dist_sq(step(cell, d), target);
            if best.is_none_or(|(_, b)| dist > b) {
                best = Some((d, dist));
            }
        }
        return best.map(|(d, _)| d);
    }

    let chase = grid
        .bfs_first_step(cell, target, |x, y| ghost_passable(grid, (x, y)))
        .filter(|d| options.contains(d));
    if chase.is_some() {
        return chase;
    }
    let mut best: Option<(Dir, i32)> = None;
    for &d in &options {
        let dist = dist_sq(step(cell, d), target);
        if best.is_none_or(|(_, b)| dist < b) {
            best = Some((d, dist));
        }
    }
    best.map(|(d, _)| d)
}

/// A ghost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ghost {
    pub mover: Mover,
    pub spawn: (i32, i32),
    pub frightened: bool,
    /// Sent home after being eaten; harmless until released
    pub eaten: bool,
    /// Ticks left waiting at the spawn
    pub release_ticks: u32,
}

impl Ghost {
    fn new(spawn: (i32, i32), index: usize) -> Self {
        Self {
            mover: Mover::at(spawn),
            spawn,
            frightened: false,
            eaten: false,
            release_ticks: GHOST_RELEASE_TICKS * (index as u32 + 1),
        }
    }
}

/// A parsed maze
struct MazeLevel {
    grid: TileGrid<MazeTile>,
    player_spawn: (i32, i32),
    ghost_spawns: Vec<(i32, i32)>,
}

impl MazeLevel {
    fn parse(text: &str) -> Result<Self> {
        let mut grid: TileGrid<MazeTile> = TileGrid::parse(text, TILE_SIZE)?;
        let player_spawn = grid
            .find_first(MazeTile::PlayerSpawn)
            .ok_or(Error::MissingMarker { marker: 'P' })?;
        grid.take_all(MazeTile::PlayerSpawn, MazeTile::Empty);
        let ghost_spawns = grid.take_all(MazeTile::GhostSpawn, MazeTile::Empty);
        if ghost_spawns.is_empty() {
            return Err(Error::MissingMarker { marker: 'G' });
        }
        Ok(Self {
            grid,
            player_spawn,
            ghost_spawns,
        })
    }
}

/// Complete maze state
pub struct Maze {
    pub grid: TileGrid<MazeTile>,
    pub player: Mover,
    /// Direction the player turns into at the next open center
    pub queued: Option<Dir>,
    pub ghosts: Vec<Ghost>,
    pub player_spawn: (i32, i32),
    pub pellets_left: u32,
    pub fright_ticks: u32,
    /// Ghosts eaten during the current fright
    pub ghosts_eaten: u32,
    pub phase: GamePhase,
    pub stats: RunStats,
    resume_phase: GamePhase,
    level_text: String,
    tuning: Tuning,
    rng: Pcg32,
    particles: Particles,
    events: EventQueue,
}

impl Maze {
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self> {
        Self::with_level(MAZE, seed, tuning)
    }

    /// New run on a custom maze (replayed every level)
    pub fn with_level(text: &str, seed: u64, tuning: Tuning) -> Result<Self> {
        let level = MazeLevel::parse(text)?;
        let mut maze = Self {
            grid: level.grid,
            player: Mover::at(level.player_spawn),
            queued: None,
            ghosts: Vec::new(),
            player_spawn: level.player_spawn,
            pellets_left: 0,
            fright_ticks: 0,
            ghosts_eaten: 0,
            phase: GamePhase::Ready,
            stats: RunStats::new(tuning.lives),
            resume_phase: GamePhase::Ready,
            level_text: text.to_string(),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            particles: Particles::with_cap(tuning.max_particles),
            events: EventQueue::default(),
        };
        maze.ghosts = level
            .ghost_spawns
            .iter()
            .enumerate()
            .map(|(i, &cell)| Ghost::new(cell, i))
            .collect();
        maze.pellets_left = maze.count_pellets();
        Ok(maze)
    }

    fn count_pellets(&self) -> u32 {
        (self.grid.count(MazeTile::Pellet) + self.grid.count(MazeTile::Power)) as u32
    }

    pub fn ghost_speed(&self) -> f32 {
        let levels = self.stats.level.saturating_sub(1) as f32;
        GHOST_SPEED * self.tuning.enemy_speed * (1.0 + LEVEL_SPEEDUP * levels).min(MAX_LEVEL_SPEEDUP)
    }

    /// Player and ghosts back to their spawns
    fn reset_positions(&mut self) {
        self.player = Mover::at(self.player_spawn);
        self.queued = None;
        self.fright_ticks = 0;
        for (i, ghost) in self.ghosts.iter_mut().enumerate() {
            *ghost = Ghost::new(ghost.spawn, i);
        }
    }

    fn next_level(&mut self) -> Result<()> {
        let level = MazeLevel::parse(&self.level_text)?;
        self.grid = level.grid;
        self.pellets_left = self.count_pellets();
        self.stats.level += 1;
        self.reset_positions();
        self.particles.clear();
        log::info!(
            "Maze level {} (ghost speed {:.0})",
            self.stats.level,
            self.ghost_speed()
        );
        Ok(())
    }

    fn eat(&mut self, cell: (i32, i32)) {
        let points = match self.grid.get(cell.0, cell.1) {
            Some(MazeTile::Pellet) => PELLET_POINTS,
            Some(MazeTile::Power) => {
                self.fright_ticks = FRIGHT_TICKS;
                self.ghosts_eaten = 0;
                for ghost in self.ghosts.iter_mut().filter(|g| !g.eaten) {
                    ghost.frightened = true;
                }
                log::debug!("Power pellet at {:?}", cell);
                POWER_POINTS
            }
            _ => return,
        };
        self.grid.set(cell.0, cell.1, MazeTile::Empty);
        self.pellets_left = self.pellets_left.saturating_sub(1);
        self.stats.award(points, &mut self.events);
        self.events.push(GameEvent::Collected);
    }

    fn move_player(&mut self, dt: f32) {
        if self.queued.is_some() && self.queued == self.player.dir.map(Dir::opposite) {
            self.player.reverse();
        }
        let grid = &self.grid;
        let queued = self.queued;
        let arrived = self.player.advance(PLAYER_SPEED * dt, |m| {
            let open = |d: &Dir| player_passable(grid, step(m.cell, *d));
            queued.filter(open).or(m.dir.filter(open))
        });
        for cell in arrived {
            self.eat(cell);
        }
    }

    fn move_ghosts(&mut self, dt: f32) {
        let speed = self.ghost_speed();
        let grid = &self.grid;
        let target = self.player.heading_cell();
        for ghost in &mut self.ghosts {
            if ghost.release_ticks > 0 {
                ghost.release_ticks -= 1;
                if ghost.release_ticks == 0 {
                    ghost.eaten = false;
                }
                continue;
            }
            let frightened = ghost.frightened;
            let scale = if frightened { FRIGHT_SPEED_SCALE } else { 1.0 };
            ghost
                .mover
                .advance(speed * scale * dt, |m| ghost_dir(grid, m, target, frightened));
        }
    }

    /// Returns true when the player was caught
    fn resolve_contacts(&mut self) -> bool {
        let player_box = self.player.hitbox(&self.grid);
        for i in 0..self.ghosts.len() {
            let ghost = &self.ghosts[i];
            if ghost.eaten || !ghost.mover.hitbox(&self.grid).overlaps(&player_box) {
                continue;
            }
            if !ghost.frightened {
                return true;
            }
            let points = GHOST_POINTS << self.ghosts_eaten.min(8);
            self.ghosts_eaten += 1;
            self.stats.award(points, &mut self.events);
            self.events.push(GameEvent::Hit);
            let at = ghost.mover.pos(&self.grid);
            self.particles.burst(&mut self.rng, at, 12, 80.0, 0x4060ff);

            let ghost = &mut self.ghosts[i];
            *ghost = Ghost::new(ghost.spawn, 0);
            ghost.eaten = true;
        }
        false
    }

    fn player_caught(&mut self) {
        let at = self.player.pos(&self.grid);
        self.particles.burst(&mut self.rng, at, 20, 100.0, 0xffff00);
        if self.stats.lose_life(&mut self.events) {
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver);
            log::info!("Maze game over with score {}", self.stats.score);
            return;
        }
        self.reset_positions();
        self.phase = GamePhase::Ready;
    }
}

fn input_dir(input: &TickInput) -> Option<Dir> {
    Dir::ORDER.into_iter().find(|d| match d {
        Dir::Up => input.up,
        Dir::Left => input.left,
        Dir::Down => input.down,
        Dir::Right => input.right,
    })
}

fn dir_input(dir: Dir) -> TickInput {
    TickInput {
        up: dir == Dir::Up,
        left: dir == Dir::Left,
        down: dir == Dir::Down,
        right: dir == Dir::Right,
        ..Default::default()
    }
}

/// Advance the maze by one fixed timestep
fn tick(game: &mut Maze, input: &TickInput, dt: f32) {
    if !handle_pause(&mut game.phase, &mut game.resume_phase, input) {
        return;
    }
    let input = if input.autoplay {
        game.autoplay_input()
    } else {
        input.clone()
    };

    game.particles.update(dt, Vec2::ZERO);

    let wanted = input_dir(&input);
    match game.phase {
        GamePhase::Ready => {
            if wanted.is_none() && !input.action {
                return;
            }
            game.phase = GamePhase::Playing;
        }
        GamePhase::LevelComplete => {
            if input.action {
                match game.next_level() {
                    Ok(()) => game.phase = GamePhase::Ready,
                    Err(e) => {
                        log::warn!("Could not reload maze: {e}");
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
    if wanted.is_some() {
        game.queued = wanted;
    }

    game.move_player(dt);
    if game.pellets_left == 0 {
        game.phase = GamePhase::LevelComplete;
        game.events.push(GameEvent::LevelComplete);
        log::info!("Maze level {} cleared", game.stats.level);
        return;
    }

    if game.fright_ticks > 0 {
        game.fright_ticks -= 1;
        if game.fright_ticks == 0 {
            for ghost in &mut game.ghosts {
                ghost.frightened = false;
            }
        }
    }

    // Contacts are checked between the moves so fast crossings still meet
    if game.resolve_contacts() {
        game.player_caught();
        return;
    }
    game.move_ghosts(dt);
    if game.resolve_contacts() {
        game.player_caught();
    }
}

/// Demo AI: flee nearby hunters, otherwise head for the nearest pellet
fn autoplay(game: &Maze) -> TickInput {
    match game.phase {
        GamePhase::LevelComplete => {
            return TickInput {
                action: true,
                ..Default::default()
            };
        }
        GamePhase::Ready | GamePhase::Playing => {}
        _ => return TickInput::default(),
    }

    let grid = &game.grid;
    let from = game.player.heading_cell();
    let hunters: Vec<(i32, i32)> = game
        .ghosts
        .iter()
        .filter(|g| !g.eaten && !g.frightened && g.release_ticks == 0)
        .map(|g| g.mover.heading_cell())
        .collect();

    let manhattan = |h: (i32, i32)| (h.0 - from.0).abs() + (h.1 - from.1).abs();
    let nearest = hunters.iter().copied().min_by_key(|&h| manhattan(h));
    if let Some(h) = nearest.filter(|&h| manhattan(h) <= 3) {
        let mut best: Option<(Dir, i32)> = None;
        for d in Dir::ORDER {
            let next = step(from, d);
            if !player_passable(grid, next) {
                continue;
            }
            let dist = dist_sq(next, h);
            if best.is_none_or(|(_, b)| dist > b) {
                best = Some((d, dist));
            }
        }
        if let Some((d, _)) = best {
            return dir_input(d);
        }
    }

    let is_food = |x, y| matches!(grid.get(x, y), Some(MazeTile::Pellet | MazeTile::Power));
    let safe = |x, y| player_passable(grid, (x, y)) && !hunters.contains(&(x, y));
    match grid.bfs_first_step_where(from, is_food, safe) {
        Some(d) => dir_input(d),
        None => TickInput::default(),
    }
}

impl Arcade for Maze {
    fn kind(&self) -> GameKind {
        GameKind::Maze
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

    /// Maze with every ghost parked at its spawn
    fn calm(level: &str) -> Maze {
        let mut maze = Maze::with_level(level, 1, Tuning::default()).unwrap();
        for ghost in &mut maze.ghosts {
            ghost.release_ticks = u32::MAX;
        }
        maze
    }

    fn run(maze: &mut Maze, input: &TickInput, ticks: usize) {
        for _ in 0..ticks {
            maze.tick(input, SIM_DT);
        }
    }

    fn dir(d: Dir) -> TickInput {
        dir_input(d)
    }

    const OPEN: &str = "
#####
#P..#
#.G.#
#...#
#####
";

    #[test]
    fn test_builtin_maze() {
        let maze = Maze::new(1, Tuning::default()).unwrap();
        assert_eq!(maze.ghosts.len(), 3);
        assert_eq!(maze.player_spawn, (7, 7));
        assert_eq!(maze.grid.get(7, 4), Some(MazeTile::Door));
        assert_eq!(maze.pellets_left, maze.count_pellets());
        assert_eq!(maze.grid.count(MazeTile::Power), 4);
    }

    #[test]
    fn test_missing_markers() {
        assert!(matches!(
            Maze::with_level("####\n#.G#\n####\n", 1, Tuning::default()),
            Err(Error::MissingMarker { marker: 'P' })
        ));
        assert!(matches!(
            Maze::with_level("####\n#.P#\n####\n", 1, Tuning::default()),
            Err(Error::MissingMarker { marker: 'G' })
        ));
    }

    #[test]
    fn test_move_and_eat() {
        let mut maze = calm("#######\n#..P.G#\n#######\n");
        run(&mut maze, &dir(Dir::Left), 16);
        assert_eq!(maze.phase, GamePhase::Playing);
        assert_eq!(maze.player.cell, (2, 1));
        assert_eq!(maze.stats.score, u64::from(PELLET_POINTS));
        assert_eq!(maze.grid.get(2, 1), Some(MazeTile::Empty));
    }

    #[test]
    fn test_queued_turn() {
        let level = "
#######
#.....#
#.###G#
#..P..#
#######
";
        let mut maze = calm(level);
        maze.tick(&dir(Dir::Left), SIM_DT);
        // Up is queued but blocked until the corridor opens at column 1
        run(&mut maze, &dir(Dir::Up), 39);
        assert_eq!(maze.player.cell, (1, 3));
        assert_eq!(maze.player.dir, Some(Dir::Up));
        assert_eq!(maze.stats.score, 2 * u64::from(PELLET_POINTS));
    }

    #[test]
    fn test_reverse_mid_corridor() {
        let mut maze = calm("#######\n#..P.G#\n#######\n");
        run(&mut maze, &dir(Dir::Left), 8);
        let before = maze.player.pos(&maze.grid);
        maze.tick(&dir(Dir::Right), SIM_DT);
        let after = maze.player.pos(&maze.grid);
        assert_eq!(maze.player.dir, Some(Dir::Right));
        assert!(after.x > before.x);
        assert_eq!(maze.stats.score, 0);
    }

    #[test]
    fn test_walls_and_door_stop_player() {
        let level = "
#####
#.G.#
##-##
#.P.#
#####
";
        let mut maze = calm(level);
        let start = maze.player.pos(&maze.grid);
        run(&mut maze, &dir(Dir::Up), 20);
        assert_eq!(maze.player.pos(&maze.grid), start);
        assert_eq!(maze.player.dir, None);

        // The door is open to ghosts
        let ghost = &maze.ghosts[0];
        assert_eq!(ghost_dir(&maze.grid, &ghost.mover, (2, 3), false), Some(Dir::Down));
    }

    #[test]
    fn test_ghost_chase_and_flee() {
        let maze = calm(OPEN);
        let mover = Mover::at((2, 2));
        assert_eq!(ghost_dir(&maze.grid, &mover, (1, 1), false), Some(Dir::Up));
        assert_eq!(ghost_dir(&maze.grid, &mover, (1, 1), true), Some(Dir::Down));
    }

    #[test]
    fn test_ghost_never_reverses() {
        let maze = calm(OPEN);
        let mut mover = Mover::at((2, 2));
        mover.dir = Some(Dir::Down);
        // Up is the shortest path but would reverse
        assert_eq!(ghost_dir(&maze.grid, &mover, (1, 1), false), Some(Dir::Left));

        let corridor = calm("#####\n#G.P#\n#####\n");
        let mut stuck = Mover::at((1, 1));
        stuck.dir = Some(Dir::Left);
        assert_eq!(ghost_dir(&corridor.grid, &stuck, (3, 1), true), Some(Dir::Right));
    }

    #[test]
    fn test_power_pellet_and_ghost_chain() {
        let mut maze = calm("##########\n#PoGG....#\n##########\n");
        run(&mut maze, &dir(Dir::Right), 50);
        assert_eq!(maze.ghosts_eaten, 2);
        assert_eq!(
            maze.stats.score,
            u64::from(POWER_POINTS + GHOST_POINTS + GHOST_POINTS * 2)
        );
        assert_eq!(maze.stats.lives, 3);
        assert!(maze.ghosts.iter().all(|g| g.eaten && !g.frightened));
    }

    #[test]
    fn test_fright_wears_off() {
        let mut maze = calm("##########\n#Po.....G#\n##########\n");
        run(&mut maze, &dir(Dir::Right), 20);
        assert!(maze.ghosts[0].frightened);
        maze.fright_ticks = 1;
        run(&mut maze, &TickInput::default(), 1);
        assert!(!maze.ghosts[0].frightened);
    }

    #[test]
    fn test_caught_by_ghost() {
        let mut maze = calm("#######\n#P...G#\n#######\n");
        maze.ghosts[0].release_ticks = 0;
        maze.phase = GamePhase::Playing;
        run(&mut maze, &TickInput::default(), 60);
        assert_eq!(maze.stats.lives, 2);
        assert_eq!(maze.phase, GamePhase::Ready);
        assert_eq!(maze.player.cell, (1, 1));
        assert_eq!(maze.ghosts[0].mover.cell, (5, 1));
        assert!(maze.drain_events().contains(&GameEvent::LifeLost));
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut maze = calm("#######\n#P...G#\n#######\n");
        maze.ghosts[0].release_ticks = 0;
        maze.stats.lives = 1;
        maze.phase = GamePhase::Playing;
        run(&mut maze, &TickInput::default(), 60);
        assert_eq!(maze.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_level_complete_and_next() {
        let mut maze = calm("#####\n#P.G#\n#####\n");
        let level_one_speed = maze.ghost_speed();
        run(&mut maze, &dir(Dir::Right), 20);
        assert_eq!(maze.phase, GamePhase::LevelComplete);
        assert_eq!(maze.stats.score, u64::from(PELLET_POINTS));

        let go = TickInput {
            action: true,
            ..Default::default()
        };
        maze.tick(&go, SIM_DT);
        assert_eq!(maze.phase, GamePhase::Ready);
        assert_eq!(maze.stats.level, 2);
        assert_eq!(maze.pellets_left, 1);
        assert_eq!(maze.player.cell, (1, 1));
        assert!(maze.ghost_speed() > level_one_speed);
    }

    #[test]
    fn test_autoplay_heads_for_food() {
        let maze = calm("#######\n#..P G#\n#######\n");
        let input = maze.autoplay_input();
        assert!(input.left);
    }
}
