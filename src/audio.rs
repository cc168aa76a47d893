//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects and music - no external files needed!

use crate::engine::AudioSink;
use crate::sim::{GameMode, SoundCue};

/// Oscillator shape for a soundtrack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Sawtooth,
}

/// Looping note pattern played during a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Soundtrack {
    pub notes: &'static [f32],
    /// Milliseconds per note (also the note length)
    pub tempo_ms: u32,
    pub wave: Wave,
    pub volume: f32,
}

impl Soundtrack {
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            // Chromatic run, fast and harsh
            GameMode::Hardcore => Self {
                notes: &[220.0, 233.0, 247.0, 262.0, 277.0, 294.0, 311.0, 330.0],
                tempo_ms: 60,
                wave: Wave::Sawtooth,
                volume: 0.1,
            },
            // C major pentatonic
            GameMode::Zen => Self {
                notes: &[261.63, 293.66, 329.63, 392.0, 440.0],
                tempo_ms: 200,
                wave: Wave::Sine,
                volume: 0.05,
            },
            // C minor arpeggio
            GameMode::Normal => Self {
                notes: &[261.63, 311.13, 392.0, 523.25],
                tempo_ms: 100,
                wave: Wave::Square,
                volume: 0.1,
            },
        }
    }

    /// Note duration in seconds
    pub fn note_secs(&self) -> f64 {
        self.tempo_ms as f64 / 1000.0
    }
}

/// Sink that only logs cues, for headless runs
#[derive(Debug, Default)]
pub struct SilentAudio {
    pub cues: usize,
}

impl AudioSink for SilentAudio {
    fn play_sound(&mut self, cue: SoundCue) {
        self.cues += 1;
        log::trace!("sound {:?}", cue);
    }

    fn play_music(&mut self, mode: GameMode) {
        log::debug!("music {} (silent)", mode.as_str());
    }

    fn stop_music(&mut self) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        AudioContext, AudioContextState, AudioNode, BiquadFilterType, GainNode, OscillatorNode,
        OscillatorType,
    };

    use super::{Soundtrack, Wave};
    use crate::engine::AudioSink;
    use crate::settings::Settings;
    use crate::sim::{GameMode, SoundCue};

    /// Overall output level before the per-bus volumes
    const MASTER_GAIN: f32 = 0.3;

    impl Wave {
        fn oscillator_type(self) -> OscillatorType {
            match self {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Sawtooth => OscillatorType::Sawtooth,
            }
        }
    }

    /// Running soundtrack loop
    struct MusicLoop {
        handle: i32,
        // Kept alive for as long as the interval references it
        _tick: Closure<dyn FnMut()>,
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        /// Output stage; effects and music feed separate buses into it
        master: Option<GainNode>,
        sfx_bus: Option<GainNode>,
        music_bus: Option<GainNode>,
        unlocked: bool,
        ambience: Option<OscillatorNode>,
        music: Option<MusicLoop>,
        noise_rng: Pcg32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings, seed: u64) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }

            let bus = |ctx: &AudioContext, dest: &AudioNode, level: f32| -> Option<GainNode> {
                let gain = ctx.create_gain().ok()?;
                gain.gain().set_value(level);
                gain.connect_with_audio_node(dest).ok()?;
                Some(gain)
            };
            let master = ctx
                .as_ref()
                .and_then(|c| bus(c, &c.destination(), MASTER_GAIN));
            let (sfx_bus, music_bus) = match (&ctx, &master) {
                (Some(c), Some(m)) => (
                    bus(c, m, settings.sfx_gain()),
                    bus(c, m, settings.music_gain()),
                ),
                _ => (None, None),
            };

            Self {
                ctx,
                master,
                sfx_bus,
                music_bus,
                unlocked: false,
                ambience: None,
                music: None,
                noise_rng: Pcg32::seed_from_u64(seed),
            }
        }

        /// Resume the context after a user gesture and start the drone.
        /// Later calls are no-ops.
        pub fn unlock(&mut self) {
            if self.unlocked {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == AudioContextState::Suspended {
                if let Ok(promise) = ctx.resume() {
                    wasm_bindgen_futures::spawn_local(async move {
                        if wasm_bindgen_futures::JsFuture::from(promise).await.is_err() {
                            log::warn!("AudioContext resume was rejected");
                        }
                    });
                }
            }
            self.unlocked = true;
            self.start_ambience();
            log::info!("Audio unlocked");
        }

        /// Push new volume settings onto the buses
        pub fn apply_settings(&self, settings: &Settings) {
            if let Some(bus) = &self.sfx_bus {
                bus.gain().set_value(settings.sfx_gain());
            }
            if let Some(bus) = &self.music_bus {
                bus.gain().set_value(settings.music_gain());
            }
        }

        fn ready(&self) -> Option<(&AudioContext, &GainNode)> {
            if !self.unlocked {
                return None;
            }
            Some((self.ctx.as_ref()?, self.sfx_bus.as_ref()?))
        }

        /// Low sawtooth drone through a low-pass filter
        fn start_ambience(&mut self) {
            let (Some(ctx), Some(bus)) = (&self.ctx, &self.music_bus) else {
                return;
            };
            let build = || -> Option<OscillatorNode> {
                let osc = ctx.create_oscillator().ok()?;
                osc.set_type(OscillatorType::Sawtooth);
                osc.frequency().set_value(50.0);

                let filter = ctx.create_biquad_filter().ok()?;
                filter.set_type(BiquadFilterType::Lowpass);
                filter.frequency().set_value(200.0);

                let gain = ctx.create_gain().ok()?;
                gain.gain().set_value(0.1);

                osc.connect_with_audio_node(&filter).ok()?;
                filter.connect_with_audio_node(&gain).ok()?;
                gain.connect_with_audio_node(bus).ok()?;
                osc.start().ok()?;
                Some(osc)
            };
            self.ambience = build();
            if self.ambience.is_none() {
                log::warn!("Ambience could not start");
            }
        }

        // === Sound generators ===

        /// Oscillator with a gain envelope feeding `out`
        fn create_osc(
            ctx: &AudioContext,
            out: &GainNode,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(out).ok()?;

            Some((osc, gain))
        }

        /// Single decaying tone starting at `at`
        fn tone(
            ctx: &AudioContext,
            out: &GainNode,
            freq: f32,
            wave: OscillatorType,
            at: f64,
            secs: f64,
            vol: f32,
        ) {
            let Some((osc, gain)) = Self::create_osc(ctx, out, freq, wave) else {
                return;
            };
            gain.gain().set_value_at_time(vol, at).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, at + secs)
                .ok();
            osc.start_with_when(at).ok();
            osc.stop_with_when(at + secs).ok();
        }

        /// Coin pickup - two quick sine pips an octave apart
        fn play_collect(&self, ctx: &AudioContext, out: &GainNode) {
            let t = ctx.current_time();
            Self::tone(ctx, out, 880.0, OscillatorType::Sine, t, 0.1, 0.5);
            Self::tone(ctx, out, 1760.0, OscillatorType::Sine, t + 0.05, 0.1, 0.3);
        }

        /// Power-up - rising charge
        fn play_powerup(&self, ctx: &AudioContext, out: &GainNode) {
            let Some((osc, gain)) = Self::create_osc(ctx, out, 220.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(880.0, t + 0.5)
                .ok();
            gain.gain().set_value_at_time(0.5, t).ok();
            gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.5).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();
        }

        /// Explosion - half a second of decaying white noise
        fn play_explosion(&mut self, ctx: &AudioContext, out: &GainNode) {
            let rate = ctx.sample_rate();
            let len = (rate * 0.5) as usize;
            let mut samples: Vec<f32> = (0..len)
                .map(|_| self.noise_rng.random_range(-1.0..1.0))
                .collect();

            let mut play = || -> Option<()> {
                let buffer = ctx.create_buffer(1, len as u32, rate).ok()?;
                buffer.copy_to_channel(&mut samples, 0).ok()?;
                let noise = ctx.create_buffer_source().ok()?;
                noise.set_buffer(Some(&buffer));

                let gain = ctx.create_gain().ok()?;
                let t = ctx.current_time();
                gain.gain().set_value_at_time(1.0, t).ok()?;
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                    .ok()?;

                noise.connect_with_audio_node(&gain).ok()?;
                gain.connect_with_audio_node(out).ok()?;
                noise.start().ok()
            };
            if play().is_none() {
                log::warn!("Explosion sound failed");
            }
        }
    }

    impl AudioSink for AudioManager {
        fn play_sound(&mut self, cue: SoundCue) {
            let Some((ctx, out)) = self.ready() else { return };
            let (ctx, out) = (ctx.clone(), out.clone());
            match cue {
                SoundCue::Collect => self.play_collect(&ctx, &out),
                SoundCue::PowerUp => self.play_powerup(&ctx, &out),
                SoundCue::Explosion => self.play_explosion(&ctx, &out),
            }
        }

        fn play_music(&mut self, mode: GameMode) {
            if self.music.is_some() {
                return;
            }
            let (Some(ctx), Some(bus)) = (self.ctx.clone(), self.music_bus.clone()) else {
                return;
            };
            let Some(window) = web_sys::window() else { return };

            let track = Soundtrack::for_mode(mode);
            let wave = track.wave.oscillator_type();
            let mut index = 0;
            let tick = Closure::<dyn FnMut()>::new(move || {
                let t = ctx.current_time();
                let freq = track.notes[index];
                AudioManager::tone(&ctx, &bus, freq, wave, t, track.note_secs(), track.volume);
                index = (index + 1) % track.notes.len();
            });

            match window.set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                track.tempo_ms as i32,
            ) {
                Ok(handle) => {
                    self.music = Some(MusicLoop {
                        handle,
                        _tick: tick,
                    });
                    log::debug!("Music started for {}", mode.as_str());
                }
                Err(e) => log::warn!("Music loop failed: {:?}", e),
            }
        }

        fn stop_music(&mut self) {
            if let Some(music) = self.music.take() {
                if let Some(window) = web_sys::window() {
                    window.clear_interval_with_handle(music.handle);
                }
                log::debug!("Music stopped");
            }
        }
    }

    impl Drop for AudioManager {
        fn drop(&mut self) {
            self.stop_music();
            if let Some(osc) = self.ambience.take() {
                osc.stop().ok();
            }
            if let Some(master) = &self.master {
                master.disconnect().ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soundtracks_per_mode() {
        let normal = Soundtrack::for_mode(GameMode::Normal);
        assert_eq!(normal.notes.len(), 4);
        assert_eq!(normal.wave, Wave::Square);
        assert!((normal.note_secs() - 0.1).abs() < 1e-9);

        let hardcore = Soundtrack::for_mode(GameMode::Hardcore);
        assert_eq!(hardcore.tempo_ms, 60);
        assert_eq!(hardcore.notes.len(), 8);

        let zen = Soundtrack::for_mode(GameMode::Zen);
        assert_eq!(zen.wave, Wave::Sine);
        assert!(zen.volume < normal.volume);
    }

    #[test]
    fn test_silent_audio_counts_cues() {
        let mut audio = SilentAudio::default();
        audio.play_music(GameMode::Zen);
        audio.play_sound(SoundCue::Collect);
        audio.play_sound(SoundCue::Explosion);
        audio.stop_music();
        assert_eq!(audio.cues, 2);
    }
}
