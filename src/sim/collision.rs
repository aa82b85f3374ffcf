//! Collision detection and response
//!
//! Box/box, circle/box, circle/circle and circle/segment contacts, plus the
//! tile-grid mover shared by the platformer and the walkers game.

use glam::Vec2;

use super::aabb::Aabb;
use super::grid::{Tile, TileGrid};

/// Contact between a moving body and an obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Contact point (approximate for box/box)
    pub point: Vec2,
    /// Unit normal pointing from the obstacle toward the body
    pub normal: Vec2,
    /// Penetration depth along `normal` (for position correction)
    pub penetration: f32,
}

impl Contact {
    /// Translation that separates the body from the obstacle
    #[inline]
    pub fn push_out(&self) -> Vec2 {
        self.normal * self.penetration
    }
}

/// Minimum translation vector between two boxes
///
/// The push on each axis runs from the body's edge to the obstacle's far
/// edge on the side picked by comparing centers, so it separates even when
/// one box spans the other. The smaller push wins; equal pushes resolve
/// vertically. With coincident centers the body is pushed up (or left).
pub fn aabb_mtv(body: &Aabb, obstacle: &Aabb) -> Option<Contact> {
    let overlap = body.intersection(obstacle)?;
    let dc = body.center() - obstacle.center();

    let (sx, px) = if dc.x > 0.0 {
        (1.0, obstacle.max.x - body.min.x)
    } else {
        (-1.0, body.max.x - obstacle.min.x)
    };
    let (sy, py) = if dc.y > 0.0 {
        (1.0, obstacle.max.y - body.min.y)
    } else {
        (-1.0, body.max.y - obstacle.min.y)
    };

    let (normal, penetration) = if py <= px {
        (Vec2::new(0.0, sy), py)
    } else {
        (Vec2::new(sx, 0.0), px)
    };

    Some(Contact {
        point: overlap.center(),
        normal,
        penetration,
    })
}

/// Circle against box
pub fn circle_aabb(center: Vec2, radius: f32, rect: &Aabb) -> Option<Contact> {
    let closest = rect.clamp_point(center);
    let d = center - closest;
    let dist_sq = d.length_squared();

    if dist_sq == 0.0 {
        // Center inside the box: leave through the nearest face
        let faces = [
            (center.x - rect.min.x, Vec2::NEG_X),
            (rect.max.x - center.x, Vec2::X),
            (center.y - rect.min.y, Vec2::NEG_Y),
            (rect.max.y - center.y, Vec2::Y),
        ];
        let (depth, normal) = faces
            .into_iter()
            .fold((f32::INFINITY, Vec2::NEG_Y), |best, f| if f.0 < best.0 { f } else { best });
        return Some(Contact {
            point: center - normal * depth,
            normal,
            penetration: depth + radius,
        });
    }

    if dist_sq >= radius * radius {
        return None;
    }
    let dist = dist_sq.sqrt();
    Some(Contact {
        point: closest,
        normal: d / dist,
        penetration: radius - dist,
    })
}

/// Circle `a` against circle `b`; the normal points from `b` toward `a`
pub fn circle_circle(a: Vec2, ra: f32, b: Vec2, rb: f32) -> Option<Contact> {
    let d = a - b;
    let sum = ra + rb;
    let dist_sq = d.length_squared();
    if dist_sq >= sum * sum {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-5 { d / dist } else { Vec2::NEG_Y };
    Some(Contact {
        point: b + normal * rb,
        normal,
        penetration: sum - dist,
    })
}

/// Closest point on segment `a..b` to `p`, with its parameter in `0..=1`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> (Vec2, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-4 {
        return (a, 0.0); // Degenerate segment
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Circle against a zero-thickness segment
pub fn circle_segment(center: Vec2, radius: f32, a: Vec2, b: Vec2) -> Option<Contact> {
    let (closest, _) = closest_point_on_segment(center, a, b);
    let d = center - closest;
    let dist_sq = d.length_squared();
    if dist_sq >= radius * radius {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-5 {
        d / dist
    } else {
        // Center on the line: use the perpendicular
        (b - a).perp().normalize_or(Vec2::NEG_Y)
    };
    Some(Contact {
        point: closest,
        normal,
        penetration: radius - dist,
    })
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce with energy loss; velocity already leaving the surface is untouched
#[inline]
pub fn bounce(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }
    velocity - (1.0 + restitution) * vn * normal
}

/// Slack when comparing a box edge against a tile edge
const EDGE_EPS: f32 = 1e-3;

/// Outcome of moving a box through a tile grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub aabb: Aabb,
    /// Blocked while moving down
    pub on_ground: bool,
    /// Blocked while moving up
    pub hit_ceiling: bool,
    pub hit_left: bool,
    pub hit_right: bool,
}

/// Move a box by `delta` through `grid`, stopping at solid tiles
///
/// X moves first, then Y, in substeps no longer than half a tile so a fast
/// body cannot skip a whole tile. Tiles matching `one_way` block only
/// downward movement, and only when the box started the substep at or above
/// the tile's top edge. Tiles the box already overlaps before a substep do
/// not block it.
pub fn move_and_collide<T: Tile>(
    grid: &TileGrid<T>,
    aabb: Aabb,
    delta: Vec2,
    one_way: impl Fn(T) -> bool,
) -> MoveResult {
    let max_step = grid.tile_size * 0.5;
    let steps = (delta.abs().max_element() / max_step).ceil().max(1.0) as u32;
    let mut step = delta / steps as f32;

    let mut result = MoveResult {
        aabb,
        on_ground: false,
        hit_ceiling: false,
        hit_left: false,
        hit_right: false,
    };

    for _ in 0..steps {
        if step.x != 0.0 {
            let prev = result.aabb;
            let moved = prev.translated(Vec2::new(step.x, 0.0));
            let blockers: Vec<Aabb> = grid
                .solid_rects_overlapping(&moved)
                .into_iter()
                .filter(|r| {
                    if step.x > 0.0 {
                        r.min.x >= prev.max.x - EDGE_EPS
                    } else {
                        r.max.x <= prev.min.x + EDGE_EPS
                    }
                })
                .collect();
            if blockers.is_empty() {
                result.aabb = moved;
            } else if step.x > 0.0 {
                let wall = blockers.iter().map(|r| r.min.x).fold(f32::INFINITY, f32::min);
                result.aabb = with_max_x(&moved, wall);
                result.hit_right = true;
                step.x = 0.0;
            } else {
                let wall = blockers.iter().map(|r| r.max.x).fold(f32::NEG_INFINITY, f32::max);
                result.aabb = with_min_x(&moved, wall);
                result.hit_left = true;
                step.x = 0.0;
            }
        }

        if step.y != 0.0 {
            let prev = result.aabb;
            let moved = prev.translated(Vec2::new(0.0, step.y));
            let mut blockers = grid.solid_rects_overlapping(&moved);
            if step.y > 0.0 {
                blockers.extend(
                    grid.cells_overlapping(&moved)
                        .filter(|&(cx, cy)| grid.get(cx, cy).is_some_and(&one_way))
                        .map(|(cx, cy)| grid.cell_rect(cx, cy)),
                );
            }
            // Only tiles ahead of the leading edge block; ones already
            // overlapped are left behind
            blockers.retain(|r| {
                if step.y > 0.0 {
                    r.min.y >= prev.max.y - EDGE_EPS
                } else {
                    r.max.y <= prev.min.y + EDGE_EPS
                }
            });

            if blockers.is_empty() {
                result.aabb = moved;
            } else if step.y > 0.0 {
                let floor = blockers.iter().map(|r| r.min.y).fold(f32::INFINITY, f32::min);
                result.aabb = with_max_y(&moved, floor);
                result.on_ground = true;
                step.y = 0.0;
            } else {
                let ceiling = blockers.iter().map(|r| r.max.y).fold(f32::NEG_INFINITY, f32::max);
                result.aabb = with_min_y(&moved, ceiling);
                result.hit_ceiling = true;
                step.y = 0.0;
            }
        }
    }

    result
}

/// True when solid ground (or a one-way tile) lies within 1 px below the box
pub fn ground_probe<T: Tile>(grid: &TileGrid<T>, aabb: &Aabb, one_way: impl Fn(T) -> bool) -> bool {
    let probe = Aabb::new(
        Vec2::new(aabb.min.x, aabb.max.y),
        Vec2::new(aabb.max.x, aabb.max.y + 1.0),
    );
    grid.cells_overlapping(&probe).any(|(cx, cy)| {
        if grid.is_solid_cell(cx, cy) {
            return true;
        }
        grid.get(cx, cy).is_some_and(&one_way) && aabb.max.y <= grid.cell_rect(cx, cy).min.y + 1e-3
    })
}

fn with_max_x(b: &Aabb, max_x: f32) -> Aabb {
    let w = b.width();
    Aabb {
        min: Vec2::new(max_x - w, b.min.y),
        max: Vec2::new(max_x, b.max.y),
    }
}

fn with_min_x(b: &Aabb, min_x: f32) -> Aabb {
    let w = b.width();
    Aabb {
        min: Vec2::new(min_x, b.min.y),
        max: Vec2::new(min_x + w, b.max.y),
    }
}

fn with_max_y(b: &Aabb, max_y: f32) -> Aabb {
    let h = b.height();
    Aabb {
        min: Vec2::new(b.min.x, max_y - h),
        max: Vec2::new(b.max.x, max_y),
    }
}

fn with_min_y(b: &Aabb, min_y: f32) -> Aabb {
    let h = b.height();
    Aabb {
        min: Vec2::new(b.min.x, min_y),
        max: Vec2::new(b.max.x, min_y + h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    enum T {
        #[default]
        Empty,
        Wall,
        Ledge,
    }

    impl Tile for T {
        fn from_char(c: char) -> Option<Self> {
            match c {
                '.' => Some(T::Empty),
                '#' => Some(T::Wall),
                '=' => Some(T::Ledge),
                _ => None,
            }
        }
        fn to_char(self) -> char {
            match self {
                T::Empty => '.',
                T::Wall => '#',
                T::Ledge => '=',
            }
        }
        fn is_solid(self) -> bool {
            self == T::Wall
        }
    }

    // 16 px tiles, 8 wide, 6 tall
    const ROOM: &str = "
########
#......#
#......#
#..==..#
#......#
########
";

    fn room() -> TileGrid<T> {
        TileGrid::parse(ROOM, 16.0).unwrap()
    }

    fn is_ledge(t: T) -> bool {
        t == T::Ledge
    }

    fn body(x: f32, y: f32) -> Aabb {
        Aabb::from_pos_size(Vec2::new(x, y), Vec2::new(12.0, 14.0))
    }

    #[test]
    fn test_aabb_mtv_least_axis() {
        let wall = Aabb::from_pos_size(Vec2::new(0.0, 0.0), Vec2::new(16.0, 16.0));
        // Overlaps 2 px horizontally and 10 px vertically: push along X
        let b = Aabb::from_pos_size(Vec2::new(14.0, 2.0), Vec2::new(10.0, 10.0));
        let c = aabb_mtv(&b, &wall).unwrap();
        assert_eq!(c.normal, Vec2::X);
        assert!((c.penetration - 2.0).abs() < 1e-5);
        assert!(aabb_mtv(&b.translated(c.push_out()), &wall).is_none());
    }

    #[test]
    fn test_aabb_mtv_tie_prefers_vertical() {
        let floor = Aabb::from_pos_size(Vec2::new(0.0, 10.0), Vec2::new(10.0, 10.0));
        let b = Aabb::from_pos_size(Vec2::new(-8.0, 2.0), Vec2::new(10.0, 10.0));
        let c = aabb_mtv(&b, &floor).unwrap();
        assert_eq!(c.normal, Vec2::NEG_Y);
    }

    #[test]
    fn test_aabb_mtv_body_inside_obstacle() {
        let obstacle = Aabb::from_pos_size(Vec2::ZERO, Vec2::new(16.0, 16.0));
        let b = Aabb::from_pos_size(Vec2::new(2.0, 3.0), Vec2::new(12.0, 12.0));
        let c = aabb_mtv(&b, &obstacle).unwrap();
        // Down is 13 px, right is 14 px, up is 15 px
        assert_eq!(c.normal, Vec2::Y);
        assert!((c.penetration - 13.0).abs() < 1e-5);
        assert!(!b.translated(c.push_out()).overlaps(&obstacle));
    }

    #[test]
    fn test_circle_aabb() {
        let rect = Aabb::from_pos_size(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let c = circle_aabb(Vec2::new(5.0, -3.0), 4.0, &rect).unwrap();
        assert_eq!(c.normal, Vec2::NEG_Y);
        assert!((c.penetration - 1.0).abs() < 1e-5);
        assert!(circle_aabb(Vec2::new(5.0, -5.0), 4.0, &rect).is_none());

        // Center inside, nearest face is the right one
        let c = circle_aabb(Vec2::new(9.0, 5.0), 2.0, &rect).unwrap();
        assert_eq!(c.normal, Vec2::X);
        assert!((c.penetration - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_segment() {
        let c = circle_segment(Vec2::new(5.0, -2.0), 3.0, Vec2::ZERO, Vec2::new(10.0, 0.0)).unwrap();
        assert!((c.normal - Vec2::NEG_Y).length() < 1e-5);
        assert!((c.penetration - 1.0).abs() < 1e-5);
        assert!(circle_segment(Vec2::new(15.0, 0.0), 3.0, Vec2::ZERO, Vec2::new(10.0, 0.0)).is_none());
    }

    #[test]
    fn test_bounce() {
        let v = bounce(Vec2::new(3.0, 10.0), Vec2::NEG_Y, 0.5);
        assert!((v - Vec2::new(3.0, -5.0)).length() < 1e-5);
        // Leaving the surface: unchanged
        assert_eq!(bounce(Vec2::new(0.0, -4.0), Vec2::NEG_Y, 0.5), Vec2::new(0.0, -4.0));
        assert_eq!(reflect_velocity(Vec2::new(100.0, 0.0), Vec2::NEG_X), Vec2::new(-100.0, 0.0));
    }

    #[test]
    fn test_land_on_floor() {
        let grid = room();
        // Falling fast from row 1 toward the floor at y = 80
        let r = move_and_collide(&grid, body(18.0, 20.0), Vec2::new(0.0, 100.0), |_| false);
        assert!(r.on_ground);
        assert_eq!(r.aabb.max.y, 80.0);
        assert!(ground_probe(&grid, &r.aabb, |_| false));
    }

    #[test]
    fn test_wall_stops_horizontal() {
        let grid = room();
        let r = move_and_collide(&grid, body(90.0, 50.0), Vec2::new(40.0, 0.0), |_| false);
        assert!(r.hit_right);
        assert_eq!(r.aabb.max.x, 112.0);

        let r = move_and_collide(&grid, body(20.0, 50.0), Vec2::new(-40.0, 0.0), |_| false);
        assert!(r.hit_left);
        assert_eq!(r.aabb.min.x, 16.0);
    }

    #[test]
    fn test_ceiling() {
        let grid = room();
        let r = move_and_collide(&grid, body(20.0, 20.0), Vec2::new(0.0, -30.0), |_| false);
        assert!(r.hit_ceiling);
        assert_eq!(r.aabb.min.y, 16.0);
    }

    #[test]
    fn test_overlapped_tiles_do_not_block() {
        let grid = room();
        // Starts 2 px into the ceiling row and moves away from it
        let r = move_and_collide(&grid, body(20.0, 14.0), Vec2::new(0.0, 1.0), |_| false);
        assert!(!r.on_ground);
        assert!(!r.hit_ceiling);
        assert_eq!(r.aabb.min.y, 15.0);

        // Same sideways, out of the left wall
        let r = move_and_collide(&grid, body(14.0, 40.0), Vec2::new(1.0, 0.0), |_| false);
        assert!(!r.hit_left);
        assert!(!r.hit_right);
        assert_eq!(r.aabb.min.x, 15.0);

        // A wall ahead still stops a box that overlaps one behind it
        let r = move_and_collide(&grid, body(14.0, 40.0), Vec2::new(200.0, 0.0), |_| false);
        assert!(r.hit_right);
        assert_eq!(r.aabb.max.x, 112.0);
    }

    #[test]
    fn test_one_way_ledge() {
        let grid = room();
        // Ledge tiles at row 3 (y 48..64), columns 3-4 (x 48..80)
        let above = body(52.0, 30.0);
        let r = move_and_collide(&grid, above, Vec2::new(0.0, 10.0), is_ledge);
        assert!(r.on_ground);
        assert_eq!(r.aabb.max.y, 48.0);
        assert!(ground_probe(&grid, &r.aabb, is_ledge));

        // Jumping up through it from below is not blocked
        let below = body(52.0, 65.0);
        let r = move_and_collide(&grid, below, Vec2::new(0.0, -20.0), is_ledge);
        assert!(!r.hit_ceiling);
        assert!((r.aabb.min.y - 45.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn mover_never_ends_inside_a_wall(
            x in 17.0f32..100.0, y in 17.0f32..60.0,
            dx in -200.0f32..200.0, dy in -200.0f32..200.0,
        ) {
            let grid = room();
            let start = body(x, y);
            prop_assume!(grid.solid_rects_overlapping(&start).is_empty());
            let r = move_and_collide(&grid, start, Vec2::new(dx, dy), |_| false);
            prop_assert!(grid.solid_rects_overlapping(&r.aabb).is_empty());
        }

        #[test]
        fn mtv_separates(
            ax in -20.0f32..20.0, ay in -20.0f32..20.0,
        ) {
            let obstacle = Aabb::from_pos_size(Vec2::ZERO, Vec2::new(16.0, 16.0));
            let b = Aabb::from_pos_size(Vec2::new(ax, ay), Vec2::new(12.0, 12.0));
            if let Some(c) = aabb_mtv(&b, &obstacle) {
                let moved = b.translated(c.push_out() * 1.0001 + c.normal * 1e-3);
                prop_assert!(!moved.overlaps(&obstacle));
            }
        }
    }
}
