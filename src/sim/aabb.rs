//! Axis-aligned bounding boxes
//!
//! Screen coordinates throughout: +x right, +y down. A box spans
//! `min..max` on each axis.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build from two corners (order-insensitive)
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Build from a top-left position and a size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos, pos + size)
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Bottom edge y (feet of an entity)
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Strict overlap test. Boxes that only share an edge do not overlap,
    /// so an entity standing on a tile is not "inside" it.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Point test, inclusive of `min` and exclusive of `max`
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Overlapping region, if any
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Aabb {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        })
    }

    pub fn translated(&self, delta: Vec2) -> Aabb {
        Aabb {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Grow (or shrink, for negative margins) on every side
    pub fn expanded(&self, margin: f32) -> Aabb {
        let m = Vec2::splat(margin);
        let min = self.min - m;
        let max = self.max + m;
        // A shrink past zero collapses to the center
        if min.x > max.x || min.y > max.y {
            let c = self.center();
            return Aabb { min: c, max: c };
        }
        Aabb { min, max }
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::from_pos_size(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_edge_contact_is_not_overlap() {
        let floor = rect(0.0, 16.0, 16.0, 16.0);
        let standing = rect(2.0, 2.0, 12.0, 14.0);
        assert!(!standing.overlaps(&floor));
        assert!(standing.translated(Vec2::new(0.0, 0.5)).overlaps(&floor));
    }

    #[test]
    fn test_intersection() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 8.0, 10.0, 10.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.min, Vec2::new(5.0, 8.0));
        assert_eq!(i.max, Vec2::new(10.0, 10.0));
        assert!(a.intersection(&rect(20.0, 0.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn test_contains_point_half_open() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(a.contains_point(Vec2::ZERO));
        assert!(!a.contains_point(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn test_expanded_collapses() {
        let a = rect(0.0, 0.0, 4.0, 4.0);
        let shrunk = a.expanded(-5.0);
        assert_eq!(shrunk.size(), Vec2::ZERO);
        assert_eq!(shrunk.center(), a.center());
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0, aw in 0.1f32..50.0, ah in 0.1f32..50.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0, bw in 0.1f32..50.0, bh in 0.1f32..50.0,
        ) {
            let a = rect(ax, ay, aw, ah);
            let b = rect(bx, by, bw, bh);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
            prop_assert_eq!(a.intersection(&b).is_some(), a.overlaps(&b));
        }
    }
}
