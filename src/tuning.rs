//! Data-driven game balance
//!
//! Every gameplay constant lives here so a JSON file can override any subset
//! of them. Rates are per second; distances are in grid units.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning load/validation failures
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value `{field}` is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_walk_speed: f32,
    pub player_run_speed: f32,
    /// Seconds between footsteps while walking / running
    pub stride_walk: f32,
    pub stride_run: f32,
    pub footstep_walk_intensity: f32,
    pub footstep_run_intensity: f32,

    // === Ghost ===
    pub ghost_patrol_speed: f32,
    /// Patrol speed multiplier per unit of fear
    pub ghost_patrol_fear_scale: f32,
    pub ghost_chase_speed: f32,
    /// Chase speed added per unit of fear
    pub ghost_chase_fear_bonus: f32,
    pub ghost_detection_range: f32,
    pub ghost_contact_range: f32,
    pub ghost_proximity_range: f32,
    pub ghost_whisper_range: f32,
    pub ghost_chase_duration: f32,
    /// How far ahead of the player (along heading) the chase aims
    pub ghost_lead_distance: f32,
    pub ghost_waypoint_radius: f32,
    /// Per-frame chance to pass through a wall while chasing
    pub ghost_phase_chance: f64,
    /// Per-frame chance of a whisper while inside whisper range
    pub ghost_whisper_chance: f64,
    /// Fear per second at point-blank range (linear falloff to zero at proximity range)
    pub ghost_proximity_fear_rate: f32,
    pub ghost_anim_speed: f32,

    // === Fear ===
    pub fear_start: f32,
    pub fear_drift_rate: f32,
    pub fear_light_relief_rate: f32,
    pub fear_breath_relief: f32,
    pub fear_warning_threshold: f32,
    pub fear_warning_interval: f32,
    pub breath_cooldown: f32,

    // === Objectives ===
    pub clue_pickup_radius: f32,
    pub exit_prompt_radius: f32,
    pub exit_inner_radius: f32,
    pub light_radius: f32,

    // === Narration ===
    pub idle_narration_threshold: f32,
    pub idle_narration_cooldown: f32,
    pub area_narration_chance: f64,
    pub narration_default_duration: f32,
    pub threat_flash_duration: f32,

    // === Particles ===
    pub particle_gravity: f32,
    pub particle_fade_rate: f32,
    pub max_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_walk_speed: 2.7,
            player_run_speed: 3.9,
            stride_walk: 0.45,
            stride_run: 0.3,
            footstep_walk_intensity: 0.15,
            footstep_run_intensity: 0.25,

            ghost_patrol_speed: 1.2,
            ghost_patrol_fear_scale: 0.3,
            ghost_chase_speed: 2.2,
            ghost_chase_fear_bonus: 1.2,
            ghost_detection_range: 8.5,
            ghost_contact_range: 1.05,
            ghost_proximity_range: 6.0,
            ghost_whisper_range: 4.0,
            ghost_chase_duration: 8.0,
            ghost_lead_distance: 0.5,
            ghost_waypoint_radius: 0.2,
            ghost_phase_chance: 0.1,
            ghost_whisper_chance: 0.02,
            ghost_proximity_fear_rate: 2.1,
            ghost_anim_speed: 4.0,

            fear_start: 0.2,
            fear_drift_rate: 0.054,
            fear_light_relief_rate: 0.144,
            fear_breath_relief: 0.25,
            fear_warning_threshold: 0.88,
            fear_warning_interval: 3.0,
            breath_cooldown: 3.5,

            clue_pickup_radius: 1.0,
            exit_prompt_radius: 4.0,
            exit_inner_radius: 1.1,
            light_radius: 6.5,

            idle_narration_threshold: 15.0,
            idle_narration_cooldown: 5.0,
            area_narration_chance: 0.3,
            narration_default_duration: 6.0,
            threat_flash_duration: 0.16,

            particle_gravity: 1.5,
            particle_fade_rate: 0.8,
            max_particles: 256,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check value ranges and the ordering of the ghost ranges
    pub fn validate(&self) -> Result<(), TuningError> {
        let positives: [(&'static str, f32); 14] = [
            ("player_walk_speed", self.player_walk_speed),
            ("player_run_speed", self.player_run_speed),
            ("stride_walk", self.stride_walk),
            ("stride_run", self.stride_run),
            ("ghost_patrol_speed", self.ghost_patrol_speed),
            ("ghost_chase_speed", self.ghost_chase_speed),
            ("ghost_detection_range", self.ghost_detection_range),
            ("ghost_contact_range", self.ghost_contact_range),
            ("ghost_proximity_range", self.ghost_proximity_range),
            ("ghost_chase_duration", self.ghost_chase_duration),
            ("ghost_waypoint_radius", self.ghost_waypoint_radius),
            ("breath_cooldown", self.breath_cooldown),
            ("clue_pickup_radius", self.clue_pickup_radius),
            ("exit_inner_radius", self.exit_inner_radius),
        ];
        for (field, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }

        for (field, p) in [
            ("ghost_phase_chance", self.ghost_phase_chance),
            ("ghost_whisper_chance", self.ghost_whisper_chance),
            ("area_narration_chance", self.area_narration_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("probability must be within [0, 1], got {p}"),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.fear_start) {
            return Err(TuningError::Invalid {
                field: "fear_start",
                reason: format!("must be within [0, 1], got {}", self.fear_start),
            });
        }
        if self.ghost_contact_range >= self.ghost_proximity_range {
            return Err(TuningError::Invalid {
                field: "ghost_contact_range",
                reason: "must be smaller than ghost_proximity_range".into(),
            });
        }
        if self.ghost_proximity_range > self.ghost_detection_range {
            return Err(TuningError::Invalid {
                field: "ghost_proximity_range",
                reason: "must not exceed ghost_detection_range".into(),
            });
        }
        if self.exit_inner_radius > self.exit_prompt_radius {
            return Err(TuningError::Invalid {
                field: "exit_inner_radius",
                reason: "must not exceed exit_prompt_radius".into(),
            });
        }
        Ok(())
    }

    /// Ghost speed while patrolling at the given fear
    pub fn patrol_speed(&self, fear: f32) -> f32 {
        self.ghost_patrol_speed * (1.0 + fear * self.ghost_patrol_fear_scale)
    }

    /// Ghost speed while chasing at the given fear
    pub fn chase_speed(&self, fear: f32) -> f32 {
        self.ghost_chase_speed + fear * self.ghost_chase_fear_bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "ghost_chase_duration": 12.0 }"#).unwrap();
        assert_eq!(tuning.ghost_chase_duration, 12.0);
        assert_eq!(tuning.player_walk_speed, Tuning::default().player_walk_speed);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = Tuning::from_json(r#"{ "ghost_phase_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "ghost_phase_chance", .. }));
    }

    #[test]
    fn test_rejects_contact_beyond_proximity() {
        let err = Tuning::from_json(r#"{ "ghost_contact_range": 7.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "ghost_contact_range", .. }));
    }

    #[test]
    fn test_rejects_proximity_beyond_detection() {
        let err = Tuning::from_json(r#"{ "ghost_proximity_range": 20.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "ghost_proximity_range", .. }));
        // Equal ranges are allowed
        assert!(Tuning::from_json(r#"{ "ghost_proximity_range": 8.5 }"#).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(TuningError::Parse(_))));
    }

    #[test]
    fn test_speed_scales_with_fear() {
        let t = Tuning::default();
        assert!(t.patrol_speed(1.0) > t.patrol_speed(0.0));
        assert!(t.chase_speed(1.0) > t.chase_speed(0.0));
        assert!(t.chase_speed(0.0) > t.patrol_speed(1.0));
    }
}
