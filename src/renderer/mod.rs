//! Rendering
//!
//! The scene is raycast into a CPU framebuffer; `present` hands the finished
//! frame to WebGPU.

pub mod framebuffer;
pub mod minimap;
pub mod present;
pub mod raycast;
pub mod scene;
pub mod sprites;

pub use framebuffer::{Framebuffer, Rgb};
pub use present::{PresentError, Presenter};
pub use scene::{RenderError, RenderOptions, Renderer};
