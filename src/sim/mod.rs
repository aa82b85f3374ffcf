//! Shared simulation toolkit
//!
//! Everything here is pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order
//! - No rendering or platform dependencies

pub mod aabb;
pub mod collision;
pub mod effects;
pub mod grid;
pub mod input;
pub mod state;

pub use aabb::Aabb;
pub use collision::{
    Contact, MoveResult, aabb_mtv, bounce, circle_aabb, circle_circle, circle_segment,
    ground_probe, move_and_collide, reflect_velocity,
};
pub use effects::{Particle, Particles};
pub use grid::{Dir, Tile, TileGrid};
pub use input::TickInput;
pub use state::{EventQueue, GameEvent, GamePhase, RunStats, toggle_pause};
