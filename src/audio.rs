//! Run audio
//!
//! The runner only says when a run starts and stops. In the browser that
//! drives the looping background track and a short synthesized sting when
//! the run ends.

/// Audio collaborator: start/stop notifications only
pub trait AudioSink {
    fn run_started(&mut self);

    fn run_stopped(&mut self);
}

/// Silent sink (headless runs)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn run_started(&mut self) {}

    fn run_stopped(&mut self) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::MusicPlayer;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

    use super::AudioSink;

    /// Element id of the page's background track
    const MUSIC_ELEMENT_ID: &str = "background-music";

    /// Background music plus a game-over sting
    pub struct MusicPlayer {
        music: Option<HtmlAudioElement>,
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl MusicPlayer {
        /// `volume` is already mute-adjusted (see `Settings::effective_music_volume`)
        pub fn new(volume: f32) -> Self {
            let music = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(MUSIC_ELEMENT_ID))
                .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok());
            if music.is_none() {
                log::warn!("No #{} audio element - music disabled", MUSIC_ELEMENT_ID);
            }

            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - sting disabled");
            }

            if let Some(music) = &music {
                music.set_loop(true);
                music.set_volume(volume.clamp(0.0, 1.0) as f64);
            }

            Self { music, ctx, volume }
        }

        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Descending tones
        fn play_sting(&self) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                let delay = i as f64 * 0.2;
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.4).ok();
                }
            }
        }
    }

    impl AudioSink for MusicPlayer {
        fn run_started(&mut self) {
            let Some(music) = &self.music else { return };
            if self.volume <= 0.0 {
                return;
            }
            // Only synchronous failures surface here; the returned promise is dropped
            if let Err(e) = music.play() {
                log::warn!("Background music failed to start: {:?}", e);
            }
        }

        fn run_stopped(&mut self) {
            if let Some(music) = &self.music {
                let _ = music.pause();
                music.set_current_time(0.0);
            }
            self.play_sting();
        }
    }
}
