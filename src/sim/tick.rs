//! Frame orchestration
//!
//! One call advances the session by one frame. Phases run in a fixed order:
//! later phases read the positions earlier ones wrote.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::MoveIntent;
use super::state::{Session, SessionStatus};
use super::{fear, ghost, narration, objective, player};
use crate::consts::MAX_FRAME_DT;

/// Input captured since the previous frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    pub movement: MoveIntent,
    /// Accumulated pointer turn (radians)
    pub heading_delta: f32,
    /// Pointer is captured; heading input applies only while set
    pub look_locked: bool,
    /// Steady-breath key was pressed
    pub steady_breath: bool,
}

/// What the loop should do after this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Keep scheduling frames
    Continue,
    /// Session is not running (idle or ended); stop scheduling
    Stop(SessionStatus),
}

/// A frame that could not be simulated. Faults in the elapsed time, the
/// input or the incoming state leave the session untouched. A fault found
/// after the phases ran restores the player and the ghost; the clock, fear,
/// objective, effects, events and status keep that frame's changes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickFault {
    #[error("elapsed time is not finite: {0}")]
    NonFiniteElapsed(f32),
    #[error("input heading delta is not finite: {0}")]
    NonFiniteInput(f32),
    #[error("{0} is not finite")]
    CorruptState(&'static str),
}

/// Advance the session by one frame of `elapsed` seconds (clamped)
pub fn tick(
    session: &mut Session,
    input: &FrameInput,
    elapsed: f32,
) -> Result<FrameOutcome, TickFault> {
    if !elapsed.is_finite() {
        return Err(TickFault::NonFiniteElapsed(elapsed));
    }
    if !input.heading_delta.is_finite() {
        return Err(TickFault::NonFiniteInput(input.heading_delta));
    }
    if session.status != SessionStatus::Running {
        return Ok(FrameOutcome::Stop(session.status));
    }
    check_finite(session)?;

    let dt = elapsed.clamp(0.0, MAX_FRAME_DT);
    let player_before = session.player.clone();
    let ghost_before = session.ghost.clone();

    session.clock += dt;
    session.breath_cooldown = (session.breath_cooldown - dt).max(0.0);
    session.run_due_effects(dt);

    if input.steady_breath {
        fear::steady_breath(session);
    }
    player::update(
        session,
        input.movement,
        input.heading_delta,
        input.look_locked,
        dt,
    );
    ghost::update(session, dt);
    objective::update(session);
    fear::regulate(session, dt);
    narration::handle_idle(session, dt);
    session.particles.update(
        dt,
        session.tuning.particle_gravity,
        session.tuning.particle_fade_rate,
    );

    if let Err(fault) = check_finite(session) {
        session.player = player_before;
        session.ghost = ghost_before;
        return Err(fault);
    }

    Ok(match session.status {
        SessionStatus::Running => FrameOutcome::Continue,
        other => FrameOutcome::Stop(other),
    })
}

fn check_finite(session: &Session) -> Result<(), TickFault> {
    if !session.player.pos.is_finite() {
        return Err(TickFault::CorruptState("player position"));
    }
    if !session.player.heading.is_finite() {
        return Err(TickFault::CorruptState("player heading"));
    }
    if !session.ghost.pos.is_finite() {
        return Err(TickFault::CorruptState("ghost position"));
    }
    Ok(())
}
