//! Audio sink using the Web Audio API
//!
//! Procedurally generated cues - no external files needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use super::{AudioSink, SoundCue};

/// Web Audio sink with a low ambient drone
pub struct WebAudio {
    ctx: Option<AudioContext>,
    master: Option<GainNode>,
    ambient: Vec<OscillatorNode>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for WebAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl WebAudio {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        let master = ctx.as_ref().and_then(|ctx| {
            let gain = ctx.create_gain().ok()?;
            gain.gain().set_value(0.3);
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some(gain)
        });
        if master.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master,
            ambient: Vec::new(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume the context (required after a user gesture) and start the drone
    pub fn resume(&mut self) {
        let Some(ctx) = &self.ctx else { return };
        let _ = ctx.resume();
        if self.ambient.is_empty() {
            self.start_ambient();
        }
    }

    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Deep sine drone plus a mid tone wobbled by a slow LFO
    fn start_ambient(&mut self) {
        let (Some(ctx), Some(master)) = (&self.ctx, &self.master) else {
            return;
        };
        let vol = self.effective_volume();

        for (freq, level) in [(55.0, 0.08), (120.0, 0.06)] {
            let Ok(osc) = ctx.create_oscillator() else { continue };
            let Ok(gain) = ctx.create_gain() else { continue };
            osc.frequency().set_value(freq);
            gain.gain().set_value(level * vol);
            if osc.connect_with_audio_node(&gain).is_err()
                || gain.connect_with_audio_node(master).is_err()
            {
                continue;
            }
            osc.start().ok();
            self.ambient.push(osc);
        }

        if let (Some(mid), Ok(lfo), Ok(depth)) =
            (self.ambient.get(1), ctx.create_oscillator(), ctx.create_gain())
        {
            lfo.frequency().set_value(0.3);
            depth.gain().set_value(30.0);
            if lfo.connect_with_audio_node(&depth).is_ok()
                && depth.connect_with_audio_param(&mid.frequency()).is_ok()
            {
                lfo.start().ok();
                self.ambient.push(lfo);
            }
        }
    }

    /// Create an oscillator with gain envelope routed through the master gain
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let master = self.master.as_ref()?;
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(master).ok()?;

        Some((osc, gain))
    }

    /// Low thud with a random pitch
    fn play_footstep(&self, ctx: &AudioContext, vol: f32, intensity: f32) {
        let freq = 150.0 + js_sys::Math::random() as f32 * 100.0;
        let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * intensity, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.15)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(50.0, t + 0.1)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Slow swell, louder and higher with fear
    fn play_breath(&self, ctx: &AudioContext, vol: f32, fear: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 80.0 + fear * 60.0, OscillatorType::Sine)
        else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * (0.1 + fear * 0.2), t + 0.3)
            .ok();
        gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.8).ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + 0.8).ok();
    }

    /// Lub-dub, the gap shrinking as fear climbs
    fn play_heartbeat(&self, ctx: &AudioContext, vol: f32, fear: f32) {
        let beat = 60.0 / (60.0 + fear as f64 * 120.0);
        let level = vol * (0.2 + fear * 0.3);
        for i in 0..2 {
            let Some((osc, gain)) = self.create_osc(ctx, 80.0, OscillatorType::Sine) else {
                continue;
            };
            let t = ctx.current_time() + i as f64 * beat * 0.5;
            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(80.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.05)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.12).ok();
        }
    }

    /// Overlapping breathy tones
    fn play_whisper(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [200.0, 250.0, 180.0, 220.0].iter().enumerate() {
            let delay = i as f64 * 0.1;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.08, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }

    /// Rising arpeggio with a configurable note length
    fn play_arpeggio(&self, ctx: &AudioContext, vol: f32, notes: &[f32], gap: f64, length: f64) {
        for (i, freq) in notes.iter().enumerate() {
            let delay = i as f64 * gap;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.1, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + length)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + length).ok();
            }
        }
    }

    /// Elevator ding
    fn play_exit_ready(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 523.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + 0.5).ok();
    }

    /// Three falling groans
    fn play_fail(&self, ctx: &AudioContext, vol: f32) {
        for i in 0..3 {
            let freq = 200.0 - i as f32 * 50.0;
            if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) {
                let t = ctx.current_time() + i as f64 * 0.1;
                gain.gain().set_value_at_time(vol * 0.12, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.frequency().set_value_at_time(freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(80.0, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }
}

impl AudioSink for WebAudio {
    fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::Footstep { intensity } => self.play_footstep(ctx, vol, intensity),
            SoundCue::Breath { fear } => self.play_breath(ctx, vol, fear),
            SoundCue::Heartbeat { fear } => self.play_heartbeat(ctx, vol, fear),
            SoundCue::Whisper => self.play_whisper(ctx, vol),
            SoundCue::Pickup => self.play_arpeggio(ctx, vol, &[262.0, 330.0, 392.0, 523.0], 0.08, 0.15),
            SoundCue::ExitReady => self.play_exit_ready(ctx, vol),
            SoundCue::Win => {
                self.play_arpeggio(ctx, vol, &[262.0, 330.0, 392.0, 523.0, 659.0], 0.12, 0.3)
            }
            SoundCue::Fail => self.play_fail(ctx, vol),
        }
    }

    fn silence(&mut self) {
        for osc in self.ambient.drain(..) {
            osc.stop().ok();
        }
    }
}
