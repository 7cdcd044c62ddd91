//! Player movement phase

use super::collision::{MoveIntent, resolve_intent};
use super::narration::area_transition;
use super::state::{GameEvent, Session, SessionStatus};
use crate::audio::SoundCue;
use crate::normalize_angle;

/// Apply look and movement input for one frame
pub fn update(
    session: &mut Session,
    intent: MoveIntent,
    heading_delta: f32,
    look_locked: bool,
    dt: f32,
) {
    if session.status != SessionStatus::Running {
        return;
    }

    if look_locked && heading_delta != 0.0 {
        session.player.heading = normalize_angle(session.player.heading + heading_delta);
    }
    session.player.intent = intent;

    let speed = if intent.run {
        session.tuning.player_run_speed
    } else {
        session.tuning.player_walk_speed
    };
    let exit_open = session.exit_open();
    let from = session.player.pos;
    let moved = resolve_intent(
        &session.grid,
        from,
        session.player.heading,
        &intent,
        speed,
        dt,
        exit_open,
    );

    if !moved.attempted {
        session.footstep_timer = 0.0;
        return;
    }

    session.player.pos = moved.pos;
    session.idle_timer = 0.0;
    area_transition(session, from, moved.pos);

    session.footstep_timer -= dt;
    if session.footstep_timer <= 0.0 {
        let (stride, intensity) = if intent.run {
            (session.tuning.stride_run, session.tuning.footstep_run_intensity)
        } else {
            (session.tuning.stride_walk, session.tuning.footstep_walk_intensity)
        };
        session.footstep_timer = stride;
        session.push_event(GameEvent::Sound(SoundCue::Footstep { intensity }));
    }
}
