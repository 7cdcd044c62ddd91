//! Session state and core simulation types
//!
//! Everything the frame phases read or write lives in one `Session` value
//! that the orchestrator threads through each phase in a fixed order.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::MoveIntent;
use super::effects::{EffectKind, EffectQueue};
use super::fear::Fear;
use super::ghost::Ghost;
use super::grid::{Grid, Light};
use super::narration::Narration;
use super::objective::Objective;
use super::particles::Particles;
use crate::audio::SoundCue;
use crate::content::{Content, ContentError};
use crate::tuning::Tuning;

/// Lifecycle of an investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Loaded, waiting for the player to begin
    Idle,
    /// Frames are being simulated
    Running,
    /// Caught by the ghost or overwhelmed by fear
    Failed,
    /// Case closed through the exit
    Concluded,
}

impl SessionStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Failed | SessionStatus::Concluded)
    }
}

/// Things the outside world reacts to, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    ClueDiscovered { index: usize },
    StatusChanged {
        from: SessionStatus,
        to: SessionStatus,
    },
}

/// The investigator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Heading (radians, normalized to [-π, π])
    pub heading: f32,
    /// Movement flags held this frame
    pub intent: MoveIntent,
}

impl Player {
    pub fn new(pos: Vec2, heading: f32) -> Self {
        Self {
            pos,
            heading,
            intent: MoveIntent::default(),
        }
    }
}

/// Complete simulation context for one investigation
#[derive(Debug, Clone)]
pub struct Session {
    pub seed: u64,
    pub tuning: Tuning,
    pub content: Content,
    pub grid: Grid,
    pub lights: Vec<Light>,
    pub player: Player,
    pub ghost: Ghost,
    pub fear: Fear,
    pub objective: Objective,
    pub narration: Narration,
    /// Threat flash intensity (0-1), cleared by a scheduled effect
    pub threat_flash: f32,
    pub effects: EffectQueue,
    pub particles: Particles,
    pub status: SessionStatus,
    pub rng: Pcg32,
    /// Simulated seconds since the session was created or reset
    pub clock: f32,
    /// Seconds since the player last moved or heard narration
    pub idle_timer: f32,
    pub breath_cooldown: f32,
    pub fear_warning_timer: f32,
    pub footstep_timer: f32,
    events: Vec<GameEvent>,
}

impl Session {
    /// Build a session from content and tuning
    pub fn new(content: Content, tuning: Tuning, seed: u64) -> Result<Self, ContentError> {
        let grid = content.build_grid()?;
        let lights = grid.lights(tuning.light_radius);
        log::info!(
            "Loaded {}x{} map: {} lights, {} clues, exit at ({:.1}, {:.1})",
            grid.width(),
            grid.height(),
            lights.len(),
            content.clues.len(),
            grid.exit().x,
            grid.exit().y
        );

        let mut session = Self {
            seed,
            player: Player::new(content.player_start, content.player_heading),
            ghost: Ghost::new(
                content.ghost_spawn,
                content.patrol_route.clone(),
                content.patrol_start_index,
            ),
            fear: Fear::new(tuning.fear_start),
            objective: Objective::from_defs(&content.clues),
            narration: Narration::new(content.lines.baseline.clone()),
            threat_flash: 0.0,
            effects: EffectQueue::new(),
            particles: Particles::new(tuning.max_particles),
            status: SessionStatus::Idle,
            rng: Pcg32::seed_from_u64(seed),
            clock: 0.0,
            idle_timer: 0.0,
            breath_cooldown: 0.0,
            fear_warning_timer: 0.0,
            footstep_timer: 0.0,
            events: Vec::new(),
            grid,
            lights,
            tuning,
            content,
        };
        let baseline = session.content.lines.baseline.clone();
        session.narrate(baseline, 0.0);
        Ok(session)
    }

    /// Whether the exit door has unlocked
    #[inline]
    pub fn exit_open(&self) -> bool {
        self.objective.is_complete()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Idle → Running. Returns false when the session was not idle.
    pub fn engage(&mut self) -> bool {
        if self.status != SessionStatus::Idle {
            return false;
        }
        self.set_status(SessionStatus::Running);
        let line = self.content.lines.engage.clone();
        self.narrate(line, 4.0);
        true
    }

    /// Start button: reopen a finished case, then engage
    pub fn start(&mut self) -> bool {
        if self.is_terminal() {
            self.reset();
        }
        self.engage()
    }

    /// Restore every mutable entity to its initial value and return to Idle
    pub fn reset(&mut self) {
        let from = self.status;
        self.player = Player::new(self.content.player_start, self.content.player_heading);
        self.ghost.reset(self.content.ghost_spawn, self.content.patrol_start_index);
        self.fear = Fear::new(self.tuning.fear_start);
        self.objective.reset();
        self.threat_flash = 0.0;
        self.effects.cancel_all();
        self.particles.clear();
        self.clock = 0.0;
        self.idle_timer = 0.0;
        self.breath_cooldown = 0.0;
        self.fear_warning_timer = 0.0;
        self.footstep_timer = 0.0;
        self.status = SessionStatus::Idle;
        if from != SessionStatus::Idle {
            self.push_event(GameEvent::StatusChanged {
                from,
                to: SessionStatus::Idle,
            });
        }
        log::info!("Session reset");
        let line = self.content.lines.reset.clone();
        self.narrate(line, 5.0);
    }

    /// Enter Failed. No-op once the session has ended.
    pub fn fail(&mut self, reason: &str) -> bool {
        if self.is_terminal() {
            return false;
        }
        log::info!("Investigation failed: {reason}");
        self.end(SessionStatus::Failed, SoundCue::Fail, reason);
        true
    }

    /// Enter Concluded. No-op once the session has ended.
    pub fn conclude(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        log::info!("Case closed after {:.1}s", self.clock);
        let line = self.content.lines.concluded.clone();
        self.end(SessionStatus::Concluded, SoundCue::Win, &line);
        true
    }

    fn end(&mut self, status: SessionStatus, cue: SoundCue, reason: &str) {
        self.effects.cancel_all();
        self.threat_flash = 0.0;
        self.set_status(status);
        self.push_event(GameEvent::Sound(cue));
        self.narrate(reason, 0.0);
    }

    fn set_status(&mut self, to: SessionStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        self.push_event(GameEvent::StatusChanged { from, to });
    }

    /// Add to fear; filling the meter fails the session
    pub fn adjust_fear(&mut self, delta: f32) {
        if self.fear.adjust(delta) {
            let reason = self.content.lines.fail_panic.clone();
            self.fail(&reason);
        }
    }

    /// Show a line. `duration` 0 keeps it until replaced; otherwise the
    /// baseline returns after `duration` seconds. Always supersedes a
    /// pending auto-clear.
    pub fn narrate(&mut self, text: impl Into<String>, duration: f32) {
        self.narration.show(text);
        self.idle_timer = 0.0;
        if duration > 0.0 {
            self.effects.schedule(EffectKind::RestoreNarration, duration);
        } else {
            self.effects.cancel(EffectKind::RestoreNarration);
        }
    }

    /// Raise the threat flash; it decays back to zero shortly after
    pub fn flash_threat(&mut self, amount: f32) {
        self.threat_flash = amount.clamp(0.0, 1.0);
        self.effects
            .schedule(EffectKind::ClearThreatFlash, self.tuning.threat_flash_duration);
    }

    /// Advance the effect queue and apply whatever came due
    pub fn run_due_effects(&mut self, dt: f32) {
        for kind in self.effects.advance(dt) {
            match kind {
                EffectKind::RestoreNarration => self.narration.restore_baseline(),
                EffectKind::ClearThreatFlash => self.threat_flash = 0.0,
            }
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events produced since the last drain
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn idle_session() -> Session {
        Session::new(Content::hotel(), Tuning::default(), 7).unwrap()
    }

    pub(crate) fn running_session() -> Session {
        let mut s = idle_session();
        assert!(s.engage());
        s.drain_events();
        s
    }

    #[test]
    fn test_new_session_defaults() {
        let s = idle_session();
        assert_eq!(s.status, SessionStatus::Idle);
        assert_eq!(s.fear.level(), 0.2);
        assert_eq!(s.objective.found_count(), 0);
        assert_eq!(s.narration.text(), s.content.lines.baseline);
        assert!(!s.exit_open());
        assert_eq!(s.lights.len(), 12);
    }

    #[test]
    fn test_engage_once() {
        let mut s = idle_session();
        assert!(s.engage());
        assert!(!s.engage());
        assert_eq!(s.status, SessionStatus::Running);
        assert!(s.drain_events().contains(&GameEvent::StatusChanged {
            from: SessionStatus::Idle,
            to: SessionStatus::Running
        }));
    }

    #[test]
    fn test_terminal_is_idempotent() {
        let mut s = running_session();
        assert!(s.fail("caught"));
        assert!(!s.fail("again"));
        assert!(!s.conclude());
        assert_eq!(s.status, SessionStatus::Failed);
        let fails = s
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::Sound(SoundCue::Fail))
            .count();
        assert_eq!(fails, 1);
        assert_eq!(s.narration.text(), "caught");
    }

    #[test]
    fn test_end_cancels_pending_effects() {
        let mut s = running_session();
        s.flash_threat(0.5);
        s.narrate("temporary", 2.0);
        assert!(!s.effects.is_empty());
        s.conclude();
        assert!(s.effects.is_empty());
        assert_eq!(s.threat_flash, 0.0);
        s.run_due_effects(10.0);
        assert_eq!(s.narration.text(), s.content.lines.concluded);
    }

    #[test]
    fn test_narration_auto_clears() {
        let mut s = running_session();
        s.narrate("short", 1.0);
        s.run_due_effects(0.5);
        assert_eq!(s.narration.text(), "short");
        s.run_due_effects(0.6);
        assert_eq!(s.narration.text(), s.content.lines.baseline);
    }

    #[test]
    fn test_persistent_narration_cancels_pending_clear() {
        let mut s = running_session();
        s.narrate("short", 1.0);
        s.narrate("forever", 0.0);
        s.run_due_effects(5.0);
        assert_eq!(s.narration.text(), "forever");
    }

    #[test]
    fn test_flash_decays() {
        let mut s = running_session();
        s.flash_threat(3.0);
        assert_eq!(s.threat_flash, 1.0);
        s.run_due_effects(0.2);
        assert_eq!(s.threat_flash, 0.0);
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut s = running_session();
        s.player.pos = Vec2::new(5.5, 5.5);
        s.fear.set(0.9);
        s.objective.discover(0);
        s.ghost.pos = Vec2::new(30.5, 30.5);
        s.fail("caught");
        assert!(s.start());
        assert_eq!(s.status, SessionStatus::Running);
        assert_eq!(s.player.pos, s.content.player_start);
        assert_eq!(s.ghost.pos, s.content.ghost_spawn);
        assert_eq!(s.fear.level(), 0.2);
        assert_eq!(s.objective.found_count(), 0);
    }

    #[test]
    fn test_full_fear_fails_once() {
        let mut s = running_session();
        s.adjust_fear(5.0);
        assert_eq!(s.status, SessionStatus::Failed);
        assert_eq!(s.narration.text(), s.content.lines.fail_panic);
        s.adjust_fear(5.0);
        assert_eq!(s.status, SessionStatus::Failed);
    }
}
