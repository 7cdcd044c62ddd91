//! Billboard sprite compositor
//!
//! Sprites are camera-facing rectangles, drawn far to near and clipped per
//! column against the wall depth buffer.

use glam::Vec2;

use super::framebuffer::{Framebuffer, Rgb};
use super::raycast::{Camera, DepthBuffer};
use crate::consts::{SPRITE_CULL_MARGIN, SPRITE_MIN_DISTANCE};
use crate::normalize_angle;

/// How wide a billboard is on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Width {
    /// Multiple of the projected height
    Aspect(f32),
    /// Fixed pixel width starting at the center column
    Fixed(f32),
}

/// Where the billboard sits vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Bottom edge on the horizon
    Horizon,
    /// Centered on the horizon
    Centered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Billboard {
    pub pos: Vec2,
    pub color: Rgb,
    pub alpha: f32,
    /// World height in wall units
    pub scale: f32,
    pub width: Width,
    pub anchor: Anchor,
}

impl Billboard {
    /// Horizon-anchored sprite with the default 0.7 aspect
    pub fn new(pos: Vec2, color: Rgb, alpha: f32, scale: f32) -> Self {
        Self {
            pos,
            color,
            alpha,
            scale,
            width: Width::Aspect(0.7),
            anchor: Anchor::Horizon,
        }
    }
}

/// Screen footprint of a billboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// First column (inclusive)
    pub start_x: i32,
    /// Last column (exclusive)
    pub end_x: i32,
    pub top: f32,
    pub height: f32,
    /// Distance along the view direction
    pub forward: f32,
}

/// Project a billboard, or None when it is behind, beside or on top of the eye
pub fn project(camera: &Camera, eye: Vec2, heading: f32, sprite: &Billboard) -> Option<Projected> {
    let delta = sprite.pos - eye;
    let distance = delta.length();
    let offset = normalize_angle(delta.y.atan2(delta.x) - heading);
    if offset.abs() > camera.fov / 2.0 + SPRITE_CULL_MARGIN || distance <= SPRITE_MIN_DISTANCE {
        return None;
    }
    let forward = offset.cos() * distance;
    if forward <= 0.0 {
        return None;
    }

    let height = camera.projected_height(sprite.scale, forward);
    let center = camera.column_for_offset(offset);
    let (start_x, end_x) = match sprite.width {
        Width::Aspect(aspect) => {
            let half = height * aspect / 2.0;
            ((center - half).floor() as i32, (center + half).floor() as i32)
        }
        Width::Fixed(px) => {
            let start = center.floor() as i32;
            (start, start + px.round() as i32)
        }
    };
    let horizon = camera.height as f32 / 2.0;
    let top = match sprite.anchor {
        Anchor::Horizon => (horizon - height).floor(),
        Anchor::Centered => horizon - height / 2.0,
    };

    Some(Projected {
        start_x,
        end_x,
        top,
        height,
        forward,
    })
}

/// Draw sprites back to front, only in columns where the wall is farther
pub fn composite(
    frame: &mut Framebuffer,
    depth: &DepthBuffer,
    camera: &Camera,
    eye: Vec2,
    heading: f32,
    sprites: &mut [Billboard],
) {
    sprites.sort_by(|a, b| eye.distance(b.pos).total_cmp(&eye.distance(a.pos)));

    for sprite in sprites.iter() {
        let Some(p) = project(camera, eye, heading, sprite) else {
            continue;
        };
        let first = p.start_x.max(0);
        let last = p.end_x.min(camera.width as i32);
        for x in first..last {
            if depth.get(x) > p.forward {
                frame.blend_column(x, p.top, p.height, sprite.color, sprite.alpha);
            }
        }
    }
}
