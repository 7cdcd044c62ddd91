//! Fear meter
//!
//! A single clamped scalar. It creeps upward while the investigation runs,
//! eases off inside lamp light, and can be knocked down by a steady breath on
//! a cooldown. Hitting the ceiling ends the run.

use serde::{Deserialize, Serialize};

use super::grid::Light;
use super::state::{GameEvent, Session, SessionStatus};
use crate::audio::SoundCue;
use glam::Vec2;

/// Fear level in [0, 1], clamped on every write
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fear(f32);

impl Fear {
    pub const MAX: f32 = 1.0;

    pub fn new(level: f32) -> Self {
        let mut fear = Fear(0.0);
        fear.set(level);
        fear
    }

    #[inline]
    pub fn level(self) -> f32 {
        self.0
    }

    /// Set the level, clamping into [0, 1]. Non-finite input reads as zero.
    /// Returns true when the meter is now full.
    pub fn set(&mut self, level: f32) -> bool {
        self.0 = if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, Self::MAX)
        };
        self.is_full()
    }

    /// Add `delta` (may be negative). Returns true when the meter is now full.
    pub fn adjust(&mut self, delta: f32) -> bool {
        self.set(self.0 + delta)
    }

    #[inline]
    pub fn is_full(self) -> bool {
        self.0 >= Self::MAX
    }

    /// Display value on a 0-100 scale
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

/// Whether any light covers the point
pub fn in_light(lights: &[Light], point: Vec2) -> bool {
    lights.iter().any(|l| l.covers(point))
}

/// Net fear change per second at a point
pub fn drift_rate(session: &Session, point: Vec2) -> f32 {
    let mut rate = session.tuning.fear_drift_rate;
    if in_light(&session.lights, point) {
        rate -= session.tuning.fear_light_relief_rate;
    }
    rate
}

/// Per-frame fear regulation: drift, lamp relief and the high-fear warning
pub fn regulate(session: &mut Session, dt: f32) {
    if session.status != SessionStatus::Running {
        return;
    }

    let rate = drift_rate(session, session.player.pos);
    session.adjust_fear(rate * dt);
    if session.status != SessionStatus::Running {
        return;
    }

    session.fear_warning_timer = (session.fear_warning_timer - dt).max(0.0);
    if session.fear.level() > session.tuning.fear_warning_threshold
        && session.fear_warning_timer <= 0.0
    {
        session.fear_warning_timer = session.tuning.fear_warning_interval;
        let line = session.content.lines.fear_warning.clone();
        session.narrate(line, 3.0);
    }
}

/// Steady-breath action. Returns true when it took effect.
pub fn steady_breath(session: &mut Session) -> bool {
    if session.status != SessionStatus::Running || session.breath_cooldown > 0.0 {
        return false;
    }
    session.breath_cooldown = session.tuning.breath_cooldown;
    session.adjust_fear(-session.tuning.fear_breath_relief);
    let fear = session.fear.level();
    session.push_event(GameEvent::Sound(SoundCue::Breath { fear }));
    let line = session.content.lines.breath.clone();
    session.narrate(line, 4.0);
    log::debug!("steady breath, fear now {:.2}", fear);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::tests::running_session;
    use proptest::prelude::*;

    #[test]
    fn test_clamps() {
        let mut f = Fear::new(0.5);
        assert!(!f.adjust(-3.0));
        assert_eq!(f.level(), 0.0);
        assert!(f.adjust(7.0));
        assert_eq!(f.level(), 1.0);
        f.set(f32::NAN);
        assert_eq!(f.level(), 0.0);
        f.set(f32::INFINITY);
        assert_eq!(f.level(), 1.0);
        f.set(f32::NEG_INFINITY);
        assert_eq!(f.level(), 0.0);
    }

    #[test]
    fn test_percent() {
        assert_eq!(Fear::new(0.2).percent(), 20);
        assert_eq!(Fear::new(1.0).percent(), 100);
    }

    #[test]
    fn test_drift_up_in_dark() {
        let mut s = running_session();
        // West end of the top corridor, well away from every lamp
        s.player.pos = Vec2::new(38.5, 1.5);
        let before = s.fear.level();
        regulate(&mut s, 1.0);
        assert!(s.fear.level() > before);
    }

    #[test]
    fn test_light_relief_wins() {
        let mut s = running_session();
        s.player.pos = Vec2::new(11.5, 39.5);
        assert!(in_light(&s.lights, s.player.pos));
        assert!(drift_rate(&s, s.player.pos) < 0.0);
        let before = s.fear.level();
        regulate(&mut s, 1.0);
        assert!(s.fear.level() < before);
    }

    #[test]
    fn test_no_drift_when_idle() {
        let mut s = running_session();
        s.status = SessionStatus::Idle;
        let before = s.fear.level();
        regulate(&mut s, 1.0);
        assert_eq!(s.fear.level(), before);
    }

    #[test]
    fn test_full_fear_fails() {
        let mut s = running_session();
        s.fear.set(0.999);
        s.player.pos = Vec2::new(38.5, 1.5);
        regulate(&mut s, 1.0);
        assert_eq!(s.status, SessionStatus::Failed);
    }

    #[test]
    fn test_warning_recurs_on_interval() {
        let mut s = running_session();
        s.player.pos = Vec2::new(38.5, 1.5);
        s.fear.set(0.9);
        regulate(&mut s, 0.01);
        assert_eq!(s.narration.text(), s.content.lines.fear_warning);
        let timer = s.fear_warning_timer;
        assert!(timer > 0.0);
        s.narrate("something else", 0.0);
        regulate(&mut s, 0.01);
        assert_eq!(s.narration.text(), "something else");
    }

    #[test]
    fn test_breath_cooldown() {
        let mut s = running_session();
        s.fear.set(0.6);
        assert!(steady_breath(&mut s));
        assert!((s.fear.level() - 0.35).abs() < 1e-5);
        assert!(!steady_breath(&mut s));
        assert!((s.fear.level() - 0.35).abs() < 1e-5);
        s.breath_cooldown = 0.0;
        assert!(steady_breath(&mut s));
    }

    #[test]
    fn test_breath_noop_when_not_running() {
        let mut s = running_session();
        s.status = SessionStatus::Concluded;
        s.fear.set(0.6);
        assert!(!steady_breath(&mut s));
        assert_eq!(s.fear.level(), 0.6);
    }

    proptest! {
        #[test]
        fn prop_fear_stays_in_range(start in -10.0f32..10.0, deltas in proptest::collection::vec(any::<f32>(), 0..20)) {
            let mut f = Fear::new(start);
            prop_assert!((0.0..=1.0).contains(&f.level()));
            for d in deltas {
                f.adjust(d);
                prop_assert!((0.0..=1.0).contains(&f.level()));
            }
        }
    }
}
