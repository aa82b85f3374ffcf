//! ASCII tile grids
//!
//! Every tile-based game describes its level as rows of characters. Each game
//! supplies its own legend through the `Tile` trait; the grid handles parsing,
//! cell/world conversion and the overlap queries collision code needs.

use std::collections::VecDeque;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::error::{Error, Result};

/// A game's tile legend
pub trait Tile: Copy + PartialEq + Default + fmt::Debug {
    fn from_char(c: char) -> Option<Self>;
    fn to_char(self) -> char;
    /// Solid tiles block movement
    fn is_solid(self) -> bool;
}

/// Cardinal direction on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Left,
    Down,
    Right,
}

impl Dir {
    /// Fixed neighbor order used by every search, so ties always break the same way
    pub const ORDER: [Dir; 4] = [Dir::Up, Dir::Left, Dir::Down, Dir::Right];

    /// Cell offset
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Left => (-1, 0),
            Dir::Down => (0, 1),
            Dir::Right => (1, 0),
        }
    }

    pub fn to_vec2(self) -> Vec2 {
        let (dx, dy) = self.delta();
        Vec2::new(dx as f32, dy as f32)
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Left => Dir::Right,
            Dir::Down => Dir::Up,
            Dir::Right => Dir::Left,
        }
    }
}

/// A rectangular grid of tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid<T> {
    pub width: usize,
    pub height: usize,
    /// Size of one square tile in world pixels
    pub tile_size: f32,
    tiles: Vec<T>,
}

impl<T: Tile> TileGrid<T> {
    /// A grid filled with one tile
    pub fn new(width: usize, height: usize, tile_size: f32, fill: T) -> Self {
        Self {
            width,
            height,
            tile_size,
            tiles: vec![fill; width * height],
        }
    }

    /// Parse level text
    ///
    /// Blank lines before the first and after the last row are ignored, so
    /// levels can be written as indented raw string literals' content.
    /// All rows must have the same width.
    pub fn parse(text: &str, tile_size: f32) -> Result<Self> {
        // A lone trailing '\r' survives `lines()` when the text has no final newline
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        let first = lines.iter().position(|l| !l.trim().is_empty());
        let last = lines.iter().rposition(|l| !l.trim().is_empty());
        let (first, last) = match (first, last) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(Error::EmptyLevel),
        };
        let rows = &lines[first..=last];

        let width = rows[0].chars().count();
        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(Error::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let tile = T::from_char(ch).ok_or(Error::UnknownTile { row, col, ch })?;
                tiles.push(tile);
            }
        }

        log::debug!("Parsed {}x{} level", width, rows.len());
        Ok(Self {
            width,
            height: rows.len(),
            tile_size,
            tiles,
        })
    }

    #[inline]
    fn index(&self, cx: i32, cy: i32) -> Option<usize> {
        if cx < 0 || cy < 0 || cx as usize >= self.width || cy as usize >= self.height {
            return None;
        }
        Some(cy as usize * self.width + cx as usize)
    }

    #[inline]
    pub fn in_bounds(&self, cx: i32, cy: i32) -> bool {
        self.index(cx, cy).is_some()
    }

    pub fn get(&self, cx: i32, cy: i32) -> Option<T> {
        self.index(cx, cy).map(|i| self.tiles[i])
    }

    /// Replace a tile; returns false when out of bounds
    pub fn set(&mut self, cx: i32, cy: i32, tile: T) -> bool {
        match self.index(cx, cy) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Out-of-bounds cells count as solid so levels are always enclosed
    pub fn is_solid_cell(&self, cx: i32, cy: i32) -> bool {
        self.get(cx, cy).is_none_or(|t| t.is_solid())
    }

    /// Cell containing a world point
    pub fn cell_at(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x / self.tile_size).floor() as i32,
            (p.y / self.tile_size).floor() as i32,
        )
    }

    pub fn cell_rect(&self, cx: i32, cy: i32) -> Aabb {
        let ts = self.tile_size;
        Aabb::from_pos_size(
            Vec2::new(cx as f32 * ts, cy as f32 * ts),
            Vec2::splat(ts),
        )
    }

    pub fn cell_center(&self, cx: i32, cy: i32) -> Vec2 {
        self.cell_rect(cx, cy).center()
    }

    /// World-space size of the whole grid
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * self.tile_size
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(Vec2::ZERO, self.pixel_size())
    }

    /// Cells whose rectangles strictly overlap `aabb` (may be out of bounds)
    pub fn cells_overlapping(&self, aabb: &Aabb) -> impl Iterator<Item = (i32, i32)> + use<T> {
        let ts = self.tile_size;
        let x0 = (aabb.min.x / ts).floor() as i32;
        let x1 = (aabb.max.x / ts).ceil() as i32 - 1;
        let y0 = (aabb.min.y / ts).floor() as i32;
        let y1 = (aabb.max.y / ts).ceil() as i32 - 1;
        (y0..=y1).flat_map(move |cy| (x0..=x1).map(move |cx| (cx, cy)))
    }

    /// Rectangles of every solid cell overlapping `aabb`, row-major
    pub fn solid_rects_overlapping(&self, aabb: &Aabb) -> Vec<Aabb> {
        self.cells_overlapping(aabb)
            .filter(|&(cx, cy)| self.is_solid_cell(cx, cy))
            .map(|(cx, cy)| self.cell_rect(cx, cy))
            .collect()
    }

    /// First in-bounds cell overlapping `aabb` whose tile matches `pred`
    pub fn any_overlapping(&self, aabb: &Aabb, pred: impl Fn(T) -> bool) -> Option<(i32, i32)> {
        self.cells_overlapping(aabb)
            .find(|&(cx, cy)| self.get(cx, cy).is_some_and(&pred))
    }

    /// Every cell holding `tile`, row-major
    pub fn find_all(&self, tile: T) -> Vec<(i32, i32)> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == tile)
            .map(|(i, _)| ((i % self.width) as i32, (i / self.width) as i32))
            .collect()
    }

    pub fn find_first(&self, tile: T) -> Option<(i32, i32)> {
        self.tiles
            .iter()
            .position(|t| *t == tile)
            .map(|i| ((i % self.width) as i32, (i / self.width) as i32))
    }

    pub fn count(&self, tile: T) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    /// Replace every `from` tile with `to`, returning the cells touched
    pub fn take_all(&mut self, from: T, to: T) -> Vec<(i32, i32)> {
        let cells = self.find_all(from);
        for &(cx, cy) in &cells {
            self.set(cx, cy, to);
        }
        cells
    }

    /// Render back to level text
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        if self.width == 0 {
            return out;
        }
        for row in self.tiles.chunks(self.width) {
            out.extend(row.iter().map(|t| t.to_char()));
            out.push('\n');
        }
        out
    }

    /// In-bounds neighbors in `Dir::ORDER`
    pub fn neighbors4(&self, cx: i32, cy: i32) -> impl Iterator<Item = (Dir, i32, i32)> + '_ {
        Dir::ORDER.into_iter().filter_map(move |d| {
            let (dx, dy) = d.delta();
            let (nx, ny) = (cx + dx, cy + dy);
            self.in_bounds(nx, ny).then_some((d, nx, ny))
        })
    }

    /// First step of a shortest path from `from` to `to`
    ///
    /// Breadth-first over cells where `passable` holds. `None` when already
    /// there or when `to` is unreachable.
    pub fn bfs_first_step(
        &self,
        from: (i32, i32),
        to: (i32, i32),
        passable: impl Fn(i32, i32) -> bool,
    ) -> Option<Dir> {
        if from == to {
            return None;
        }
        self.bfs_first_step_where(from, |x, y| (x, y) == to, passable)
    }

    /// First step toward the nearest cell satisfying `is_goal`
    ///
    /// The start cell itself is never a goal.
    pub fn bfs_first_step_where(
        &self,
        from: (i32, i32),
        is_goal: impl Fn(i32, i32) -> bool,
        passable: impl Fn(i32, i32) -> bool,
    ) -> Option<Dir> {
        let start = self.index(from.0, from.1)?;
        let mut visited = vec![false; self.width * self.height];
        visited[start] = true;

        let mut queue: VecDeque<(i32, i32, Dir)> = VecDeque::new();
        for (d, nx, ny) in self.neighbors4(from.0, from.1) {
            if passable(nx, ny) {
                if let Some(i) = self.index(nx, ny) {
                    visited[i] = true;
                }
                queue.push_back((nx, ny, d));
            }
        }

        while let Some((cx, cy, first)) = queue.pop_front() {
            if is_goal(cx, cy) {
                return Some(first);
            }
            for (_, nx, ny) in self.neighbors4(cx, cy) {
                let Some(i) = self.index(nx, ny) else {
                    continue;
                };
                if !visited[i] && passable(nx, ny) {
                    visited[i] = true;
                    queue.push_back((nx, ny, first));
                }
            }
        }
        None
    }
}
