//! Audio cues
//!
//! The simulation only names sounds; a sink turns them into noise. Sinks are
//! fire-and-forget: playback failures stay inside the sink.

use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

/// Sound triggers emitted by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SoundCue {
    /// One footfall (intensity 0-1)
    Footstep { intensity: f32 },
    /// Steady-breath exhale, pitched by fear
    Breath { fear: f32 },
    /// Double thump while the ghost is near
    Heartbeat { fear: f32 },
    Whisper,
    /// Clue logged
    Pickup,
    /// Elevator chime: exit unlocked or nearby
    ExitReady,
    Win,
    Fail,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Footstep { .. } => "footstep",
            SoundCue::Breath { .. } => "breath",
            SoundCue::Heartbeat { .. } => "heartbeat",
            SoundCue::Whisper => "whisper",
            SoundCue::Pickup => "pickup",
            SoundCue::ExitReady => "exit-ready",
            SoundCue::Win => "win",
            SoundCue::Fail => "fail",
        }
    }

    /// Cues that end a session
    pub fn is_terminal(&self) -> bool {
        matches!(self, SoundCue::Win | SoundCue::Fail)
    }
}

/// Something that can play cues
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);

    /// Stop ambience and anything still ringing
    fn silence(&mut self) {}
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Logs cues instead of playing them (headless runs)
#[derive(Debug, Default, Clone)]
pub struct LogAudio {
    played: usize,
}

impl LogAudio {
    pub fn played(&self) -> usize {
        self.played
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        self.played += 1;
        log::trace!("sound: {}", cue.as_str());
    }

    fn silence(&mut self) {
        log::trace!("sound: silence");
    }
}

/// Collects cues in order
impl AudioSink for Vec<SoundCue> {
    fn play(&mut self, cue: SoundCue) {
        self.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let cues = [
            SoundCue::Footstep { intensity: 0.2 },
            SoundCue::Breath { fear: 0.1 },
            SoundCue::Heartbeat { fear: 0.1 },
            SoundCue::Whisper,
            SoundCue::Pickup,
            SoundCue::ExitReady,
            SoundCue::Win,
            SoundCue::Fail,
        ];
        let mut names: Vec<_> = cues.iter().map(|c| c.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), cues.len());
    }

    #[test]
    fn test_sinks_accept_cues() {
        let mut recorded: Vec<SoundCue> = Vec::new();
        recorded.play(SoundCue::Pickup);
        recorded.play(SoundCue::Win);
        assert_eq!(recorded, vec![SoundCue::Pickup, SoundCue::Win]);
        assert!(recorded[1].is_terminal());

        let mut log = LogAudio::default();
        log.play(SoundCue::Whisper);
        log.silence();
        assert_eq!(log.played(), 1);
        NullAudio.play(SoundCue::Fail);
    }
}
