//! Frame driver
//!
//! Owns the session and the software renderer and turns animation-frame
//! timestamps into simulate-then-render steps. Each frame ends in a
//! [`Schedule`] telling the host loop what to do next.

use thiserror::Error;

use crate::audio::AudioSink;
use crate::consts::FAULT_RETRY_MS;
use crate::renderer::{Framebuffer, RenderError, RenderOptions, Renderer};
use crate::sim::state::{GameEvent, Session};
use crate::sim::tick::{FrameInput, FrameOutcome, TickFault, tick};

/// A frame that failed; the host retries after a short delay
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameFault {
    #[error("simulation: {0}")]
    Tick(#[from] TickFault),
    #[error("render: {0}")]
    Render(#[from] RenderError),
}

/// What the host loop should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Request the next animation frame
    NextFrame,
    /// Wait this many milliseconds, then request a frame
    RetryAfter(u32),
    /// Stop until the session is started again
    Stop,
}

pub struct FrameDriver {
    pub session: Session,
    pub renderer: Renderer,
    pub frame: Framebuffer,
    last_timestamp: Option<f64>,
    faults: u32,
}

impl FrameDriver {
    pub fn new(
        session: Session,
        width: u32,
        height: u32,
        options: RenderOptions,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            session,
            renderer: Renderer::new(width, height, options)?,
            frame: Framebuffer::new(width, height),
            last_timestamp: None,
            faults: 0,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.renderer.resize(width, height)?;
        self.frame.resize(width, height);
        Ok(())
    }

    /// Begin (or reopen) the investigation. Returns true if frames should run.
    pub fn start(&mut self) -> bool {
        self.last_timestamp = None;
        self.faults = 0;
        self.session.start()
    }

    /// Forget the previous timestamp so a pause does not become one huge step
    pub fn resume(&mut self) {
        self.last_timestamp = None;
    }

    /// Consecutive faulted frames
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Simulate and render one frame
    pub fn step(&mut self, timestamp_ms: f64, input: &FrameInput) -> Result<FrameOutcome, FrameFault> {
        if !timestamp_ms.is_finite() {
            return Err(TickFault::NonFiniteElapsed(timestamp_ms as f32).into());
        }
        let elapsed = self
            .last_timestamp
            .map(|last| ((timestamp_ms - last) / 1000.0) as f32)
            .unwrap_or(0.0);
        self.last_timestamp = Some(timestamp_ms);

        let outcome = tick(&mut self.session, input, elapsed)?;
        self.renderer.render(&self.session, &mut self.frame)?;
        Ok(outcome)
    }

    /// One animation-frame callback: step, log any fault, pick the next schedule
    pub fn frame(&mut self, timestamp_ms: f64, input: &FrameInput) -> Schedule {
        match self.step(timestamp_ms, input) {
            Ok(FrameOutcome::Continue) => {
                self.faults = 0;
                Schedule::NextFrame
            }
            Ok(FrameOutcome::Stop(status)) => {
                self.faults = 0;
                log::info!("Frame loop stopped: {status:?}");
                Schedule::Stop
            }
            Err(fault) => {
                self.faults += 1;
                log::error!("Frame fault ({} in a row): {fault}", self.faults);
                if self.session.is_terminal() {
                    Schedule::Stop
                } else {
                    Schedule::RetryAfter(FAULT_RETRY_MS)
                }
            }
        }
    }

    /// Play pending sound cues; other events are returned in order
    pub fn dispatch_events(&mut self, sink: &mut impl AudioSink) -> Vec<GameEvent> {
        let mut rest = Vec::new();
        for event in self.session.drain_events() {
            match event {
                GameEvent::Sound(cue) => sink.play(cue),
                other => rest.push(other),
            }
        }
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundCue;
    use crate::sim::state::SessionStatus;
    use crate::sim::state::tests::idle_session;
    use glam::Vec2;

    fn driver() -> FrameDriver {
        FrameDriver::new(idle_session(), 320, 240, RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_idle_session_does_not_schedule() {
        let mut d = driver();
        assert_eq!(d.frame(0.0, &FrameInput::default()), Schedule::Stop);
        assert_eq!(d.session.clock, 0.0);
    }

    #[test]
    fn test_running_frames_continue() {
        let mut d = driver();
        assert!(d.start());
        assert_eq!(d.frame(1000.0, &FrameInput::default()), Schedule::NextFrame);
        assert_eq!(d.frame(1016.0, &FrameInput::default()), Schedule::NextFrame);
        assert!((d.session.clock - 0.016).abs() < 1e-5);
    }

    #[test]
    fn test_long_gap_is_clamped() {
        let mut d = driver();
        d.start();
        d.frame(0.0, &FrameInput::default());
        d.frame(5000.0, &FrameInput::default());
        assert!((d.session.clock - crate::consts::MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_fault_retries_then_recovers() {
        let mut d = driver();
        d.start();
        d.frame(0.0, &FrameInput::default());
        assert_eq!(
            d.frame(f64::NAN, &FrameInput::default()),
            Schedule::RetryAfter(FAULT_RETRY_MS)
        );
        assert_eq!(d.faults(), 1);

        // A bad frame buffer is a render fault, also retried
        d.frame = Framebuffer::new(10, 10);
        assert_eq!(
            d.frame(16.0, &FrameInput::default()),
            Schedule::RetryAfter(FAULT_RETRY_MS)
        );
        assert_eq!(d.faults(), 2);

        d.resize(320, 240).unwrap();
        assert_eq!(d.frame(32.0, &FrameInput::default()), Schedule::NextFrame);
        assert_eq!(d.faults(), 0);
    }

    #[test]
    fn test_contact_stops_and_plays_fail() {
        let mut d = driver();
        d.start();
        d.session.ghost.pos = d.session.player.pos + Vec2::new(0.1, 0.0);
        d.frame(0.0, &FrameInput::default());
        assert_eq!(d.session.status, SessionStatus::Failed);

        let mut played: Vec<SoundCue> = Vec::new();
        let rest = d.dispatch_events(&mut played);
        assert!(played.contains(&SoundCue::Fail));
        assert!(rest.iter().all(|e| !matches!(e, GameEvent::Sound(_))));

        // Restart reopens the case
        assert!(d.start());
        assert_eq!(d.session.status, SessionStatus::Running);
    }
}
