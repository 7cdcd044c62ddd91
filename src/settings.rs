//! Player settings and preferences
//!
//! Persisted in LocalStorage on the web; defaults everywhere else.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Software framebuffer size as a fraction of the canvas
    pub fn render_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 0.75,
            QualityPreset::High => 1.0,
        }
    }

    /// Whether lamp glow is composited over the view
    pub fn light_glow(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === HUD ===
    /// Overhead map in the corner of the view
    pub show_minimap: bool,
    /// Clue sparks and ghost mist
    pub particles: bool,

    // === Input ===
    /// Radians of turn per pixel of pointer motion
    pub mouse_sensitivity: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no threat flash)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            show_minimap: true,
            particles: true,

            mouse_sensitivity: 0.0022,

            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset trades the cosmetic layers for frame rate
        if preset == QualityPreset::Low {
            self.particles = false;
        }
    }

    /// Effective threat flash (respects reduced_motion)
    pub fn effective_threat_flash(&self, intensity: f32) -> f32 {
        if self.reduced_motion {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        }
    }

    /// Framebuffer size for a canvas, never below the renderer minimum
    pub fn framebuffer_size(&self, canvas_width: u32, canvas_height: u32) -> (u32, u32) {
        use crate::consts::{MIN_VIEW_HEIGHT, MIN_VIEW_WIDTH};
        let scale = self.quality.render_scale();
        let w = (canvas_width as f32 * scale).round() as u32;
        let h = (canvas_height as f32 * scale).round() as u32;
        (w.max(MIN_VIEW_WIDTH), h.max(MIN_VIEW_HEIGHT))
    }

    /// Pointer motion in pixels to a heading delta
    pub fn turn_for(&self, movement_x: f32) -> f32 {
        movement_x * self.mouse_sensitivity
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "ashen_harbor_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native: read `ASHEN_HARBOR_SETTINGS` as a JSON file path if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("ASHEN_HARBOR_SETTINGS") else {
            return Self::default();
        };
        match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()))
        {
            Ok(settings) => {
                log::info!("Loaded settings from {path}");
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {path}: {e}");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
