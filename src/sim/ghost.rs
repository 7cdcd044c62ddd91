//! Ghost behaviour: patrol a waypoint loop, chase on sight
//!
//! The state machine is a plain enum with a pure transition function; the
//! per-frame update threads the result through movement, proximity effects
//! and the contact check.

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::state::{GameEvent, Session, SessionStatus};
use crate::audio::SoundCue;
use crate::heading_vector;

const MIST: [u8; 3] = [255, 100, 100];
const MIST_COUNT: usize = 8;

/// Ghost behaviour state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GhostState {
    /// Walking the route toward `waypoint`
    Patrol { waypoint: usize },
    /// Hunting the player; `resume` is the waypoint to return to
    Chase { remaining: f32, resume: usize },
}

/// Transitions that carry narration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostTransition {
    Detected,
    LostInterest,
}

impl GhostState {
    #[inline]
    pub fn is_chasing(&self) -> bool {
        matches!(self, GhostState::Chase { .. })
    }

    /// Advance the state by `dt`. `detected` is only consulted while
    /// patrolling: a chase runs its full timer regardless of sight.
    pub fn next(
        self,
        dt: f32,
        detected: bool,
        chase_duration: f32,
    ) -> (GhostState, Option<GhostTransition>) {
        match self {
            GhostState::Chase { remaining, resume } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    (
                        GhostState::Patrol { waypoint: resume },
                        Some(GhostTransition::LostInterest),
                    )
                } else {
                    (GhostState::Chase { remaining, resume }, None)
                }
            }
            GhostState::Patrol { waypoint } if detected => (
                GhostState::Chase {
                    remaining: chase_duration,
                    resume: waypoint,
                },
                Some(GhostTransition::Detected),
            ),
            patrol => (patrol, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ghost {
    pub pos: Vec2,
    pub state: GhostState,
    pub route: Vec<Vec2>,
    /// Animation phase (radians, wraps at 2π)
    pub anim_phase: f32,
    heartbeat_timer: f32,
    /// Last open cell the ghost stood in; phasing stays next to it
    last_open: IVec2,
}

impl Ghost {
    pub fn new(spawn: Vec2, route: Vec<Vec2>, start_index: usize) -> Self {
        let waypoint = if route.is_empty() {
            0
        } else {
            start_index % route.len()
        };
        Self {
            pos: spawn,
            state: GhostState::Patrol { waypoint },
            route,
            anim_phase: 0.0,
            heartbeat_timer: 0.0,
            last_open: cell_of(spawn),
        }
    }

    pub fn reset(&mut self, spawn: Vec2, start_index: usize) {
        let route = std::mem::take(&mut self.route);
        *self = Ghost::new(spawn, route, start_index);
    }

    /// Where the ghost is heading this frame
    pub fn target(&self, player_pos: Vec2, player_heading: f32, lead: f32) -> Vec2 {
        match self.state {
            GhostState::Chase { .. } => player_pos + heading_vector(player_heading) * lead,
            GhostState::Patrol { waypoint } => self.route.get(waypoint).copied().unwrap_or(self.pos),
        }
    }

    /// Move on to the next waypoint once close enough to the current one
    fn advance_waypoint(&mut self, radius: f32) {
        if let GhostState::Patrol { waypoint } = self.state {
            let arrived = self
                .route
                .get(waypoint)
                .is_some_and(|wp| self.pos.distance(*wp) < radius);
            if arrived {
                self.state = GhostState::Patrol {
                    waypoint: (waypoint + 1) % self.route.len(),
                };
            }
        }
    }
}

/// Per-frame ghost update
pub fn update(session: &mut Session, dt: f32) {
    if session.status != SessionStatus::Running {
        return;
    }

    let player = session.player.pos;
    let distance = session.ghost.pos.distance(player);

    let detected = !session.ghost.state.is_chasing()
        && distance < session.tuning.ghost_detection_range
        && session.grid.line_of_sight(session.ghost.pos, player);
    let (state, transition) =
        session
            .ghost
            .state
            .next(dt, detected, session.tuning.ghost_chase_duration);
    session.ghost.state = state;
    match transition {
        Some(GhostTransition::Detected) => {
            log::debug!("ghost detected player at {distance:.2}");
            session.push_event(GameEvent::Sound(SoundCue::Whisper));
            let line = session.content.lines.detected.clone();
            session.narrate(line, 4.0);
            session.flash_threat(0.4);
        }
        Some(GhostTransition::LostInterest) => {
            log::debug!("ghost lost interest");
            let line = session.content.lines.lost_interest.clone();
            session.narrate(line, 3.0);
        }
        None => {}
    }

    session
        .ghost
        .advance_waypoint(session.tuning.ghost_waypoint_radius);
    step(session, dt);

    session.ghost.anim_phase = (session.ghost.anim_phase + dt * session.tuning.ghost_anim_speed) % TAU;

    proximity(session, distance, dt);
    if session.status != SessionStatus::Running {
        return;
    }

    if distance < session.tuning.ghost_contact_range {
        let reason = session.content.lines.fail_contact.clone();
        session.fail(&reason);
    }
}

fn cell_of(pos: Vec2) -> IVec2 {
    pos.floor().as_ivec2()
}

/// Move toward the target. Solid tiles stop the ghost unless it phases while
/// chasing, and a phase never reaches past the cells around the last open
/// cell. It never leaves the map.
fn step(session: &mut Session, dt: f32) {
    let fear = session.fear.level();
    let chasing = session.ghost.state.is_chasing();
    let speed = if chasing {
        session.tuning.chase_speed(fear)
    } else {
        session.tuning.patrol_speed(fear)
    };
    let target = session.ghost.target(
        session.player.pos,
        session.player.heading,
        session.tuning.ghost_lead_distance,
    );
    let from = session.ghost.pos;
    let dest = from + (target - from).normalize_or_zero() * speed * dt;
    if dest == from {
        return;
    }

    let exit_open = session.exit_open();
    if !session.grid.is_solid(dest, exit_open) {
        session.ghost.pos = dest;
        session.ghost.last_open = cell_of(dest);
        return;
    }
    let reach = (cell_of(dest) - session.ghost.last_open).abs().max_element();
    if !chasing || reach > 1 || !session.grid.contains(dest) {
        return;
    }
    if session.rng.random_bool(session.tuning.ghost_phase_chance) {
        session.ghost.pos = dest;
        log::debug!("ghost phased at ({:.1}, {:.1})", dest.x, dest.y);
        session
            .particles
            .emit(&mut session.rng, dest, MIST_COUNT, MIST);
        let line = session.content.lines.phased.clone();
        session.narrate(line, 3.0);
    }
}

/// Fear, flash, heartbeat and whispers while the ghost is near
fn proximity(session: &mut Session, distance: f32, dt: f32) {
    let range = session.tuning.ghost_proximity_range;
    if session.objective.is_complete() || distance >= range {
        session.ghost.heartbeat_timer = 0.0;
        return;
    }

    let factor = (range - distance) / range;
    session.adjust_fear(factor * session.tuning.ghost_proximity_fear_rate * dt);
    if session.status != SessionStatus::Running {
        return;
    }
    session.flash_threat(0.2 + factor * 0.15);

    session.ghost.heartbeat_timer -= dt;
    if session.ghost.heartbeat_timer <= 0.0 {
        let fear = session.fear.level();
        session.push_event(GameEvent::Sound(SoundCue::Heartbeat { fear }));
        session.ghost.heartbeat_timer = 60.0 / (60.0 + 120.0 * fear);
    }

    if distance < session.tuning.ghost_whisper_range
        && session.rng.random_bool(session.tuning.ghost_whisper_chance)
    {
        session.push_event(GameEvent::Sound(SoundCue::Whisper));
        let pool = &session.content.lines.whispers;
        if !pool.is_empty() {
            let line = pool[session.rng.random_range(0..pool.len())].clone();
            session.narrate(line, 4.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::tests::running_session;

    /// Player and ghost in the central hall with a clear view
    fn face_off(gap: f32) -> Session {
        let mut s = running_session();
        s.player.pos = Vec2::new(20.5, 14.5);
        s.ghost.pos = Vec2::new(20.5 + gap, 14.5);
        s
    }

    #[test]
    fn test_patrol_to_chase_on_detection() {
        let (next, t) = GhostState::Patrol { waypoint: 3 }.next(0.016, true, 8.0);
        assert_eq!(
            next,
            GhostState::Chase {
                remaining: 8.0,
                resume: 3
            }
        );
        assert_eq!(t, Some(GhostTransition::Detected));
    }

    #[test]
    fn test_patrol_stays_without_detection() {
        let (next, t) = GhostState::Patrol { waypoint: 3 }.next(0.016, false, 8.0);
        assert_eq!(next, GhostState::Patrol { waypoint: 3 });
        assert_eq!(t, None);
    }

    #[test]
    fn test_chase_expires_to_patrol() {
        let chase = GhostState::Chase {
            remaining: 8.0,
            resume: 2,
        };
        let (mid, t) = chase.next(4.0, true, 8.0);
        assert!(mid.is_chasing());
        assert_eq!(t, None);
        let (end, t) = mid.next(4.0, true, 8.0);
        assert_eq!(end, GhostState::Patrol { waypoint: 2 });
        assert_eq!(t, Some(GhostTransition::LostInterest));
    }

    #[test]
    fn test_detection_starts_chase() {
        let mut s = face_off(5.0);
        update(&mut s, 0.016);
        assert!(s.ghost.state.is_chasing());
        assert!(s.threat_flash > 0.0);
        assert!(s.pending_events().contains(&GameEvent::Sound(SoundCue::Whisper)));
        assert_eq!(s.status, SessionStatus::Running);
    }

    #[test]
    fn test_wall_blocks_detection() {
        let mut s = running_session();
        // Row 12 is a solid wall between the two corridors
        s.player.pos = Vec2::new(20.5, 11.5);
        s.ghost.pos = Vec2::new(20.5, 13.5);
        update(&mut s, 0.016);
        assert!(!s.ghost.state.is_chasing());
    }

    #[test]
    fn test_out_of_range_no_detection() {
        let mut s = face_off(9.0);
        update(&mut s, 0.016);
        assert!(!s.ghost.state.is_chasing());
    }

    #[test]
    fn test_chase_closes_distance() {
        let mut s = face_off(5.0);
        s.ghost.state = GhostState::Chase {
            remaining: 8.0,
            resume: 0,
        };
        let before = s.ghost.pos.distance(s.player.pos);
        update(&mut s, 0.05);
        assert!(s.ghost.pos.distance(s.player.pos) < before);
    }

    #[test]
    fn test_contact_fails() {
        let mut s = face_off(0.5);
        update(&mut s, 0.016);
        assert_eq!(s.status, SessionStatus::Failed);
        assert_eq!(s.narration.text(), s.content.lines.fail_contact);
        assert!(s.pending_events().contains(&GameEvent::Sound(SoundCue::Fail)));
    }

    #[test]
    fn test_proximity_raises_fear_and_beats() {
        let mut s = face_off(3.0);
        let before = s.fear.level();
        update(&mut s, 0.05);
        assert!(s.fear.level() > before);
        assert!(
            s.pending_events()
                .iter()
                .any(|e| matches!(e, GameEvent::Sound(SoundCue::Heartbeat { .. })))
        );
    }

    #[test]
    fn test_no_proximity_fear_after_objective() {
        let mut s = face_off(3.0);
        for i in 0..s.objective.total() {
            s.objective.discover(i);
        }
        let before = s.fear.level();
        update(&mut s, 0.05);
        assert_eq!(s.fear.level(), before);
    }

    fn ghost_below_wall() -> Session {
        let mut s = running_session();
        s.player.pos = Vec2::new(20.5, 11.5);
        s.ghost.pos = Vec2::new(20.5, 13.05);
        s.ghost.last_open = cell_of(s.ghost.pos);
        s.ghost.state = GhostState::Chase {
            remaining: 8.0,
            resume: 0,
        };
        s.player.heading = -std::f32::consts::FRAC_PI_2;
        s.tuning.ghost_whisper_chance = 0.0;
        s
    }

    #[test]
    fn test_chasing_ghost_phases_through_wall() {
        let mut s = ghost_below_wall();
        s.tuning.ghost_phase_chance = 1.0;
        update(&mut s, 0.05);
        assert!(s.grid.is_solid(s.ghost.pos, false));
        assert_eq!(s.narration.text(), s.content.lines.phased);

        // Every step through solid needs its own roll
        s.tuning.ghost_phase_chance = 0.0;
        let inside = s.ghost.pos;
        update(&mut s, 0.05);
        assert_eq!(s.ghost.pos, inside);
    }

    #[test]
    fn test_patrolling_ghost_stuck_in_wall_stays_put() {
        let mut s = running_session();
        s.tuning.ghost_phase_chance = 0.0;
        s.ghost.pos = Vec2::new(30.5, 12.5);
        s.ghost.route = vec![Vec2::new(22.5, 12.5)];
        s.ghost.state = GhostState::Patrol { waypoint: 0 };
        s.player.pos = Vec2::new(5.5, 25.5);
        for _ in 0..40 {
            update(&mut s, 0.05);
        }
        assert_eq!(s.ghost.pos, Vec2::new(30.5, 12.5));
        assert_eq!(s.ghost.state, GhostState::Patrol { waypoint: 0 });
    }

    #[test]
    fn test_phasing_stays_next_to_open_cell() {
        let mut s = running_session();
        s.tuning.ghost_phase_chance = 1.0;
        s.tuning.ghost_whisper_chance = 0.0;
        // Chase along the row 12 wall, angled into it
        s.ghost.pos = Vec2::new(20.5, 13.5);
        s.ghost.last_open = cell_of(s.ghost.pos);
        s.player.pos = Vec2::new(38.5, 12.2);
        s.player.heading = 0.0;
        s.ghost.state = GhostState::Chase {
            remaining: 100.0,
            resume: 0,
        };
        for _ in 0..200 {
            update(&mut s, 0.05);
            if s.status != SessionStatus::Running {
                break;
            }
            let reach = (cell_of(s.ghost.pos) - s.ghost.last_open).abs().max_element();
            assert!(reach <= 1, "ghost drifted to {:?}", s.ghost.pos);
        }
    }

    #[test]
    fn test_wall_stops_ghost_without_phase() {
        let mut s = ghost_below_wall();
        s.tuning.ghost_phase_chance = 0.0;
        let start = s.ghost.pos;
        update(&mut s, 0.05);
        assert_eq!(s.ghost.pos, start);
    }

    #[test]
    fn test_ghost_never_leaves_map() {
        let mut s = running_session();
        s.tuning.ghost_phase_chance = 1.0;
        s.ghost.pos = Vec2::new(0.5, 0.5);
        s.ghost.route = vec![Vec2::new(-5.0, -5.0)];
        s.ghost.state = GhostState::Patrol { waypoint: 0 };
        for _ in 0..100 {
            update(&mut s, 0.05);
            assert!(s.grid.contains(s.ghost.pos));
        }
    }

    #[test]
    fn test_patrol_advances_waypoint() {
        let mut s = running_session();
        s.ghost.pos = s.ghost.route[1] + Vec2::new(0.1, 0.0);
        s.ghost.state = GhostState::Patrol { waypoint: 1 };
        update(&mut s, 0.016);
        assert_eq!(s.ghost.state, GhostState::Patrol { waypoint: 2 });
    }

    #[test]
    fn test_anim_phase_wraps() {
        let mut s = running_session();
        s.ghost.anim_phase = TAU - 0.01;
        update(&mut s, 0.05);
        assert!(s.ghost.anim_phase < TAU && s.ghost.anim_phase >= 0.0);
    }
}
