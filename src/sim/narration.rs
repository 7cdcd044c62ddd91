//! Narrative text channel
//!
//! One line of text is on screen at a time. Temporary lines fall back to the
//! baseline through the session's effect queue.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Session, SessionStatus};
use crate::content::StoryArea;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    text: String,
    baseline: String,
}

impl Narration {
    pub fn new(baseline: String) -> Self {
        Self {
            text: baseline.clone(),
            baseline,
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    pub fn is_baseline(&self) -> bool {
        self.text == self.baseline
    }

    pub fn show(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn restore_baseline(&mut self) {
        self.text.clone_from(&self.baseline);
    }
}

/// Index of the first story area containing `p`
pub fn area_at(areas: &[StoryArea], p: Vec2) -> Option<usize> {
    areas.iter().position(|a| a.contains(p))
}

/// Maybe describe the area the player just walked into
pub fn area_transition(session: &mut Session, from: Vec2, to: Vec2) {
    let Some(entered) = area_at(&session.content.areas, to) else {
        return;
    };
    if area_at(&session.content.areas, from) == Some(entered) {
        return;
    }
    if session.rng.random_bool(session.tuning.area_narration_chance) {
        let line = session.content.areas[entered].description.clone();
        log::debug!("entered {}", session.content.areas[entered].name);
        session.narrate(line, 5.0);
    }
}

/// Idle narration: after enough quiet, the hotel speaks up
pub fn handle_idle(session: &mut Session, dt: f32) {
    if session.status != SessionStatus::Running {
        return;
    }
    session.idle_timer += dt;
    if session.idle_timer <= session.tuning.idle_narration_threshold {
        return;
    }
    let pool = &session.content.lines.idle;
    if pool.is_empty() {
        session.idle_timer = 0.0;
        return;
    }
    let line = pool[session.rng.random_range(0..pool.len())].clone();
    session.narrate(line, 5.0);
    // Next idle line comes sooner than the first
    session.idle_timer = session.tuning.idle_narration_cooldown;
}
