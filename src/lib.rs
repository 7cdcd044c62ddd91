//! Ashen Harbor - a first-person raycast horror investigation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, collision, ghost AI, fear, objectives, tick)
//! - `frame`: Frame driver that simulates, renders and schedules the next frame
//! - `renderer`: Software raycaster and sprite compositor, plus WebGPU presentation
//! - `audio`: Sound cue vocabulary and sinks
//! - `platform`: Key/pointer input mapped to frame intents
//! - `content`: Static map, clue and narrative data
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `ui`: HUD snapshot derived from the session

pub mod audio;
pub mod content;
pub mod frame;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use content::Content;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Engine constants that are not balance knobs
pub mod consts {
    /// Horizontal field of view (radians)
    pub const FOV: f32 = std::f32::consts::PI / 3.0;
    /// Extra angular margin beyond FOV/2 before a sprite is culled
    pub const SPRITE_CULL_MARGIN: f32 = 0.2;
    /// Sprites closer than this are skipped
    pub const SPRITE_MIN_DISTANCE: f32 = 0.05;

    /// Largest simulated step per frame (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Delay before retrying after a faulted frame (milliseconds)
    pub const FAULT_RETRY_MS: u32 = 100;

    /// Samples per grid unit for line-of-sight checks
    pub const LOS_SAMPLES_PER_UNIT: f32 = 10.0;

    /// Default viewport
    pub const DEFAULT_VIEW_WIDTH: u32 = 640;
    pub const DEFAULT_VIEW_HEIGHT: u32 = 400;
    /// Smallest viewport the renderer accepts
    pub const MIN_VIEW_WIDTH: u32 = 320;
    pub const MIN_VIEW_HEIGHT: u32 = 240;

    /// Seed used when the caller does not pick one
    pub const DEFAULT_SEED: u64 = 0x00A5_4E4A;
}

/// Normalized angle to [-π, π]
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    angle.sin().atan2(angle.cos())
}

/// Unit vector for a heading angle
#[inline]
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
