//! Platformer tile legend and level loading

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::consts::*;
use crate::error::{Error, Result};
use crate::sim::{Aabb, Tile, TileGrid};

/// Platformer tiles
///
/// Spawn markers are cleared to `Empty` once the level is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformTile {
    #[default]
    Empty,
    Wall,
    /// Solid only from above
    OneWay,
    Spawn,
    Coin,
    Spike,
    /// Solid block that fires a beam downward
    Laser,
    Exit,
    EnemySpawn,
}

impl Tile for PlatformTile {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '.' | ' ' => Self::Empty,
            '#' => Self::Wall,
            '=' => Self::OneWay,
            'P' => Self::Spawn,
            'C' => Self::Coin,
            '^' => Self::Spike,
            'L' => Self::Laser,
            'E' => Self::Exit,
            'M' => Self::EnemySpawn,
            _ => return None,
        })
    }

    fn to_char(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Wall => '#',
            Self::OneWay => '=',
            Self::Spawn => 'P',
            Self::Coin => 'C',
            Self::Spike => '^',
            Self::Laser => 'L',
            Self::Exit => 'E',
            Self::EnemySpawn => 'M',
        }
    }

    fn is_solid(self) -> bool {
        matches!(self, Self::Wall | Self::Laser)
    }
}

/// A laser emitter and the beam it projects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub cell: (i32, i32),
    /// Beam rectangle from under the emitter to the first solid tile
    pub beam: Aabb,
    /// Tick offset into the on/off cycle
    pub phase_offset: u32,
}

impl Laser {
    pub fn is_on(&self, ticks: u64) -> bool {
        let period = u64::from(LASER_ON_TICKS + LASER_OFF_TICKS);
        (ticks + u64::from(self.phase_offset)) % period < u64::from(LASER_ON_TICKS)
    }
}

/// A parsed level ready to play
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub grid: TileGrid<PlatformTile>,
    /// Player top-left at spawn
    pub spawn: Vec2,
    /// Enemy top-left positions
    pub enemy_spawns: Vec<Vec2>,
    pub lasers: Vec<Laser>,
    pub coins_total: u32,
}

impl Level {
    pub fn parse(text: &str) -> Result<Self> {
        let mut grid: TileGrid<PlatformTile> = TileGrid::parse(text, TILE_SIZE)?;

        if grid.count(PlatformTile::Spawn) != 1 {
            return Err(Error::MissingMarker { marker: 'P' });
        }
        let spawn_cell = grid
            .find_first(PlatformTile::Spawn)
            .ok_or(Error::MissingMarker { marker: 'P' })?;
        grid.take_all(PlatformTile::Spawn, PlatformTile::Empty);
        let spawn = standing_pos(&grid, spawn_cell, PLAYER_SIZE);

        let enemy_spawns = grid
            .take_all(PlatformTile::EnemySpawn, PlatformTile::Empty)
            .into_iter()
            .map(|cell| standing_pos(&grid, cell, ENEMY_SIZE))
            .collect();

        let lasers = grid
            .find_all(PlatformTile::Laser)
            .into_iter()
            .map(|cell| build_laser(&grid, cell))
            .collect();

        let coins_total = grid.count(PlatformTile::Coin) as u32;

        Ok(Self {
            grid,
            spawn,
            enemy_spawns,
            lasers,
            coins_total,
        })
    }

    /// Built-in level by index (wraps around)
    pub fn builtin(index: usize) -> Result<Self> {
        Self::parse(LEVELS[index % LEVELS.len()])
    }

    /// Damaging part of a spike tile: its lower half
    pub fn spike_hitbox(&self, cx: i32, cy: i32) -> Aabb {
        let cell = self.grid.cell_rect(cx, cy);
        Aabb::new(Vec2::new(cell.min.x, cell.center().y), cell.max)
    }
}

/// Top-left position that puts a box of `size` on the floor of `cell`, centered
fn standing_pos(grid: &TileGrid<PlatformTile>, cell: (i32, i32), size: Vec2) -> Vec2 {
    let rect = grid.cell_rect(cell.0, cell.1);
    Vec2::new(rect.center().x - size.x * 0.5, rect.max.y - size.y)
}

fn build_laser(grid: &TileGrid<PlatformTile>, cell: (i32, i32)) -> Laser {
    let (cx, cy) = cell;
    let mut end = cy + 1;
    while !grid.is_solid_cell(cx, end) {
        end += 1;
    }
    let top = grid.cell_rect(cx, cy).max.y;
    let bottom = grid.cell_rect(cx, end).min.y;
    let center_x = grid.cell_center(cx, cy).x;
    Laser {
        cell,
        beam: Aabb::new(
            Vec2::new(center_x - LASER_WIDTH * 0.5, top),
            Vec2::new(center_x + LASER_WIDTH * 0.5, bottom),
        ),
        phase_offset: (cx as u32 * 37) % (LASER_ON_TICKS + LASER_OFF_TICKS),
    }
}

/// Built-in levels
pub const LEVELS: [&str; 2] = [
    "
##############################
#............................#
#............................#
#..................C.C.C.....#
#.................=======....#
#.........L..................#
#.....C...........C......C..E#
#...####......M......#####.###
#P.........^^.........C......#
##############################
",
    "
##########################
#........................#
#.C.C..........C.C.C....E#
#=====.......L..======.###
#........................#
#.......C....M..C........#
#....=====.#######.......#
#P..................^^...#
##########################
",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_load() {
        for i in 0..LEVELS.len() {
            let level = Level::builtin(i).unwrap();
            assert!(level.coins_total > 0);
            assert_eq!(level.grid.count(PlatformTile::Spawn), 0);
            assert_eq!(level.grid.count(PlatformTile::EnemySpawn), 0);
            assert_eq!(level.grid.count(PlatformTile::Exit), 1);
            assert_eq!(level.lasers.len(), 1);
        }
    }

    #[test]
    fn test_missing_spawn() {
        assert!(matches!(
            Level::parse("###\n#.#\n###\n"),
            Err(Error::MissingMarker { marker: 'P' })
        ));
    }

    #[test]
    fn test_two_spawns_rejected() {
        assert!(matches!(
            Level::parse("######\n#P..P#\n######\n"),
            Err(Error::MissingMarker { marker: 'P' })
        ));
    }

    #[test]
    fn test_spawn_stands_on_floor() {
        let level = Level::parse("#####\n#.P.#\n#####\n").unwrap();
        assert_eq!(level.spawn.y + PLAYER_SIZE.y, 2.0 * TILE_SIZE);
        assert_eq!(level.spawn.x + PLAYER_SIZE.x * 0.5, 2.5 * TILE_SIZE);
    }

    #[test]
    fn test_laser_beam_reaches_floor() {
        let level = Level::parse("#####\n#.L.#\n#...#\n#P..#\n#####\n").unwrap();
        let laser = &level.lasers[0];
        assert_eq!(laser.beam.min.y, 2.0 * TILE_SIZE);
        assert_eq!(laser.beam.max.y, 4.0 * TILE_SIZE);
        assert!((laser.beam.width() - LASER_WIDTH).abs() < 1e-5);
    }

    #[test]
    fn test_spike_hitbox_is_lower_half() {
        let level = Level::parse("#####\n#P^.#\n#####\n").unwrap();
        let hit = level.spike_hitbox(2, 1);
        assert_eq!(hit.min, Vec2::new(2.0 * TILE_SIZE, 1.5 * TILE_SIZE));
        assert_eq!(hit.max, Vec2::new(3.0 * TILE_SIZE, 2.0 * TILE_SIZE));
    }

    #[test]
    fn test_laser_cycle() {
        let laser = Laser {
            cell: (0, 0),
            beam: Aabb::new(Vec2::ZERO, Vec2::ONE),
            phase_offset: 0,
        };
        assert!(laser.is_on(0));
        assert!(laser.is_on(u64::from(LASER_ON_TICKS) - 1));
        assert!(!laser.is_on(u64::from(LASER_ON_TICKS)));
        assert!(laser.is_on(u64::from(LASER_ON_TICKS + LASER_OFF_TICKS)));
    }
}
