//! Per-tick input snapshot
//!
//! Front ends translate keyboard/mouse/touch events into one of these per tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Held directions
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Jump (edge-triggered: true for one tick per press)
    pub jump: bool,
    /// Primary action: shoot, whack, launch, continue (edge-triggered)
    pub action: bool,
    /// Pause toggle (edge-triggered)
    pub pause: bool,
    /// Pointer position in world coordinates, if the pointer is over the game
    pub pointer: Option<Vec2>,
    /// Idle/demo mode - the game's built-in AI plays
    pub autoplay: bool,
}

impl TickInput {
    /// Horizontal axis in -1..=1
    pub fn axis_x(&self) -> f32 {
        (self.right as i8 - self.left as i8) as f32
    }

    /// Vertical axis in -1..=1 (+1 is down)
    pub fn axis_y(&self) -> f32 {
        (self.down as i8 - self.up as i8) as f32
    }

    /// Clear edge-triggered fields after they have been consumed
    pub fn clear_one_shots(&mut self) {
        self.jump = false;
        self.action = false;
        self.pause = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes() {
        let input = TickInput {
            left: true,
            down: true,
            ..Default::default()
        };
        assert_eq!(input.axis_x(), -1.0);
        assert_eq!(input.axis_y(), 1.0);

        let both = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.axis_x(), 0.0);
    }

    #[test]
    fn test_clear_one_shots_keeps_held_keys() {
        let mut input = TickInput {
            right: true,
            jump: true,
            action: true,
            pause: true,
            ..Default::default()
        };
        input.clear_one_shots();
        assert!(input.right);
        assert!(!input.jump && !input.action && !input.pause);
    }
}
