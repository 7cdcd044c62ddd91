//! Per-frame scene assembly
//!
//! Walls first, then every billboard (clues, ghost, exit beacon, particles)
//! in one back-to-front pass, then lamp glow and the minimap overlay.

use thiserror::Error;

use super::framebuffer::{Framebuffer, Rgb};
use super::minimap;
use super::raycast::{self, Camera, DepthBuffer};
use super::sprites::{self, Anchor, Billboard, Width};
use crate::consts::FOV;
use crate::normalize_angle;
use crate::settings::Settings;
use crate::sim::state::{Session, SessionStatus};

const CLUE_COLOR: Rgb = Rgb::new(255, 215, 0);
const GHOST_COLOR: Rgb = Rgb::new(255, 100, 100);
const EXIT_COLOR: Rgb = Rgb::new(0, 255, 100);
const GLOW_COLOR: Rgb = Rgb::new(255, 200, 100);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("viewport {width}x{height} has no pixels")]
    ZeroViewport { width: u32, height: u32 },
    #[error("framebuffer is {found:?}, renderer expects {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
}

/// Optional layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub minimap: bool,
    pub light_glow: bool,
    pub particles: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            minimap: true,
            light_glow: true,
            particles: true,
        }
    }
}

impl RenderOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            minimap: settings.show_minimap,
            light_glow: settings.quality.light_glow(),
            particles: settings.particles,
        }
    }
}

/// Software renderer for one viewport size
#[derive(Debug, Clone)]
pub struct Renderer {
    camera: Camera,
    depth: DepthBuffer,
    pub options: RenderOptions,
    sprites: Vec<Billboard>,
}

impl Renderer {
    pub fn new(width: u32, height: u32, options: RenderOptions) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::ZeroViewport { width, height });
        }
        Ok(Self {
            camera: Camera::new(width, height, FOV),
            depth: DepthBuffer::new(width),
            options,
            sprites: Vec::new(),
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::ZeroViewport { width, height });
        }
        self.camera = Camera::new(width, height, FOV);
        self.depth.resize(width);
        log::debug!("Renderer resized to {width}x{height}");
        Ok(())
    }

    /// Draw the session from the player's eye
    pub fn render(&mut self, session: &Session, frame: &mut Framebuffer) -> Result<(), RenderError> {
        let expected = (self.camera.width, self.camera.height);
        let found = (frame.width(), frame.height());
        if expected != found {
            return Err(RenderError::SizeMismatch { expected, found });
        }

        let eye = session.player.pos;
        let heading = session.player.heading;
        raycast::render_walls(
            frame,
            &mut self.depth,
            &self.camera,
            &session.grid,
            eye,
            heading,
            session.exit_open(),
            session.fear.level(),
        );

        self.sprites.clear();
        collect_sprites(session, self.options.particles, &mut self.sprites);
        sprites::composite(frame, &self.depth, &self.camera, eye, heading, &mut self.sprites);

        if self.options.light_glow {
            light_glow(frame, session);
        }
        if self.options.minimap {
            minimap::draw(frame, session);
        }
        Ok(())
    }
}

/// Billboards for everything in the world that is not a wall
pub fn collect_sprites(session: &Session, particles: bool, out: &mut Vec<Billboard>) {
    let clock = session.clock;

    for (i, clue) in session.objective.clues().iter().enumerate() {
        if clue.found {
            continue;
        }
        let pulse = 0.85 + 0.15 * (clock * 3.0 + i as f32).sin();
        let alpha = (0.8 + 0.2 * (pulse * 3.0).sin()) * 0.9;
        let scale = 0.5 + 0.1 * (pulse * 2.0).sin();
        out.push(Billboard::new(clue.pos, CLUE_COLOR, alpha, scale));
    }

    let ghost = &session.ghost;
    let phase = ghost.anim_phase;
    let distance = ghost.pos.distance(session.player.pos);
    let fade = (1.0 - distance / 15.0).max(0.3);
    out.push(Billboard::new(
        ghost.pos,
        GHOST_COLOR,
        (0.6 + 0.3 * (phase * 2.0).sin()) * 0.8 * fade,
        1.2 + 0.2 * (phase * 1.5).sin(),
    ));

    if session.objective.is_complete() && session.status != SessionStatus::Concluded {
        out.push(Billboard::new(
            session.grid.exit(),
            EXIT_COLOR,
            0.8 * 0.9,
            0.6 + 0.1 * (clock * 5.0).sin(),
        ));
    }

    if particles {
        out.extend(session.particles.iter().map(|p| Billboard {
            pos: p.pos,
            color: Rgb::from_array(p.color),
            alpha: p.life * 0.7,
            scale: 0.2,
            width: Width::Fixed(2.0),
            anchor: Anchor::Centered,
        }));
    }
}

/// Warm radial wash for each nearby lamp the player is facing
pub fn light_glow(frame: &mut Framebuffer, session: &Session) {
    let eye = session.player.pos;
    let heading = session.player.heading;
    let intensity: f32 = session
        .lights
        .iter()
        .filter_map(|light| {
            let delta = light.pos - eye;
            let distance = delta.length();
            if distance >= light.radius {
                return None;
            }
            let facing = normalize_angle(delta.y.atan2(delta.x) - heading);
            (facing.abs() < FOV).then(|| (light.radius - distance) / light.radius)
        })
        .sum();
    if intensity <= 0.0 {
        return;
    }

    // Stacked gradients share a center, so their alphas add
    let w = frame.width() as i32;
    let h = frame.height() as i32;
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;
    let reach = w as f32 * 0.7;
    for y in 0..h {
        for x in 0..w {
            let r = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
            let falloff = 1.0 - r / reach;
            if falloff > 0.0 {
                frame.blend_pixel(x, y, GLOW_COLOR, intensity * 0.1 * falloff);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::tests::{idle_session, running_session};
    use glam::Vec2;

    #[test]
    fn test_zero_viewport_rejected() {
        assert_eq!(
            Renderer::new(0, 240, RenderOptions::default()).unwrap_err(),
            RenderError::ZeroViewport {
                width: 0,
                height: 240
            }
        );
        let mut r = Renderer::new(320, 240, RenderOptions::default()).unwrap();
        assert!(r.resize(320, 0).is_err());
    }

    #[test]
    fn test_size_mismatch() {
        let session = idle_session();
        let mut r = Renderer::new(320, 240, RenderOptions::default()).unwrap();
        let mut frame = Framebuffer::new(640, 400);
        assert!(matches!(
            r.render(&session, &mut frame),
            Err(RenderError::SizeMismatch { .. })
        ));
        r.resize(640, 400).unwrap();
        assert!(r.render(&session, &mut frame).is_ok());
    }

    #[test]
    fn test_render_fills_depth() {
        let session = idle_session();
        let mut r = Renderer::new(320, 240, RenderOptions::default()).unwrap();
        let mut frame = Framebuffer::new(320, 240);
        r.render(&session, &mut frame).unwrap();
        assert!(r.depth().as_slice().iter().all(|d| d.is_finite() && *d > 0.0));
    }

    #[test]
    fn test_sprites_follow_state() {
        let mut session = running_session();
        let mut out = Vec::new();
        collect_sprites(&session, true, &mut out);
        // Every clue plus the ghost, no beacon yet
        assert_eq!(out.len(), session.objective.total() + 1);

        for i in 0..session.objective.total() {
            session.objective.discover(i);
        }
        let rng = &mut session.rng;
        session.particles.emit(rng, Vec2::new(3.5, 3.5), 4, [1, 2, 3]);
        out.clear();
        collect_sprites(&session, true, &mut out);
        // Ghost, exit beacon, four particles
        assert_eq!(out.len(), 6);
        assert!(out.iter().any(|b| b.color == EXIT_COLOR));

        out.clear();
        collect_sprites(&session, false, &mut out);
        assert_eq!(out.len(), 2);

        session.conclude();
        out.clear();
        collect_sprites(&session, false, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_glow_only_near_lamps() {
        let mut session = idle_session();
        let lamp = session.lights[0].pos;

        session.player.pos = Vec2::new(1.5, 1.5);
        session.lights.retain(|l| l.pos == lamp);
        let mut frame = Framebuffer::new(64, 48);
        light_glow(&mut frame, &session);
        assert_eq!(frame.pixel(32, 24), Some(Rgb::BLACK));

        session.player.pos = lamp - Vec2::new(0.5, 0.0);
        session.player.heading = 0.0;
        light_glow(&mut frame, &session);
        let center = frame.pixel(32, 24).unwrap();
        let corner = frame.pixel(0, 0).unwrap();
        assert!(center.r > 0);
        assert!(center.r > corner.r);
    }
}
