//! Movement resolution against the tile grid
//!
//! Displacements are applied one axis at a time so a diagonal push into a
//! wall slides along it instead of stopping dead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use std::f32::consts::FRAC_PI_2;

/// Movement flags produced by the input layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub run: bool,
}

impl MoveIntent {
    /// Unit direction in world space for a heading, or zero when the
    /// flags cancel out (or none are held).
    pub fn direction(&self, heading: f32) -> Vec2 {
        let forward = Vec2::new(heading.cos(), heading.sin());
        let strafe = Vec2::new((heading - FRAC_PI_2).cos(), (heading - FRAC_PI_2).sin());

        let mut dir = Vec2::ZERO;
        if self.forward {
            dir += forward;
        }
        if self.back {
            dir -= forward;
        }
        if self.left {
            dir += strafe;
        }
        if self.right {
            dir -= strafe;
        }
        dir.normalize_or_zero()
    }
}

/// Result of resolving one frame of movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub pos: Vec2,
    /// The player tried to move this frame (some direction was held)
    pub attempted: bool,
}

/// Apply `delta` to `pos`, X first then Y, rejecting whichever axis lands
/// in a solid tile.
pub fn slide_move(grid: &Grid, pos: Vec2, delta: Vec2, exit_open: bool) -> Vec2 {
    let mut out = pos;
    let next_x = Vec2::new(pos.x + delta.x, out.y);
    if !grid.is_solid(next_x, exit_open) {
        out.x = next_x.x;
    }
    let next_y = Vec2::new(out.x, pos.y + delta.y);
    if !grid.is_solid(next_y, exit_open) {
        out.y = next_y.y;
    }
    out
}

/// Turn held intents into a collision-resolved position for this frame
pub fn resolve_intent(
    grid: &Grid,
    pos: Vec2,
    heading: f32,
    intent: &MoveIntent,
    speed: f32,
    dt: f32,
    exit_open: bool,
) -> MoveResult {
    let dir = intent.direction(heading);
    if dir == Vec2::ZERO {
        return MoveResult {
            pos,
            attempted: false,
        };
    }
    MoveResult {
        pos: slide_move(grid, pos, dir * speed * dt, exit_open),
        attempted: true,
    }
}
