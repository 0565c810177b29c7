pub mod audio;
pub mod kokoro;
pub mod voice;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::AppError;
use crate::languages::{Language, TTS_LANGUAGES};

pub use kokoro::KokoroEngine;

/// Raw synthesis backend: mono `f32` samples in [-1.0, 1.0] at
/// [`audio::SAMPLE_RATE`].
pub trait SpeechEngine: Send + Sync {
    fn generate(&self, text: &str, voice: &str, locale: &str, speed: f32) -> Result<Vec<f32>, AppError>;
}

pub const SPEED_MIN: f32 = 0.5;
pub const SPEED_MAX: f32 = 2.0;
pub const VOLUME_MIN: f32 = 0.0;
pub const VOLUME_MAX: f32 = 2.0;

/// Speed and volume after the boundary policy has been applied.
///
/// Out-of-range values are clamped into range, never rejected: a speed of
/// 10 synthesizes at 2.0 and a volume of -1 yields silence. NaN falls back
/// to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    pub speed: f32,
    pub volume: f32,
}

impl SynthesisParams {
    pub fn clamped(speed: f32, volume: f32) -> Self {
        Self {
            speed: clamp_or_neutral(speed, SPEED_MIN, SPEED_MAX),
            volume: clamp_or_neutral(volume, VOLUME_MIN, VOLUME_MAX),
        }
    }
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            speed: 1.0,
            volume: 1.0,
        }
    }
}

fn clamp_or_neutral(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        1.0
    } else {
        value.clamp(min, max)
    }
}

pub struct SpeechService {
    engine: Arc<dyn SpeechEngine>,
    ready: AtomicBool,
}

impl SpeechService {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            ready: AtomicBool::new(false),
        }
    }

    pub fn synthesize(
        &self,
        text: &str,
        lang: &str,
        speed: f32,
        volume: f32,
        voice: Option<&str>,
    ) -> Result<Vec<u8>, AppError> {
        // 1. Resolve voice and locale
        let selected_voice = voice::resolve_voice(voice, lang);
        let locale = voice::synthesis_locale(lang);

        // 2. Apply the boundary policy
        let params = SynthesisParams::clamped(speed, volume);

        let preview: String = text.chars().take(50).collect();
        tracing::info!(
            "Generating TTS: text='{}...', voice={}, lang={}, speed={}",
            preview,
            selected_voice,
            locale,
            params.speed
        );

        // 3. Synthesize
        let mut samples = self
            .engine
            .generate(text, selected_voice, locale, params.speed)
            .map_err(|e| match e {
                AppError::SynthesisFailure(_) => e,
                other => AppError::SynthesisFailure(other.to_string()),
            })?;

        // 4. Volume
        audio::apply_volume(&mut samples, params.volume);

        // 5. Encode WAV
        audio::samples_to_wav(&samples, audio::SAMPLE_RATE)
    }

    /// Run a short synthesis to check the engine works. The outcome is the
    /// readiness flag.
    pub fn warm_up(&self) -> bool {
        let ready = match self.synthesize("Test", "en", 1.0, 1.0, None) {
            Ok(_) => {
                tracing::info!("TTS engine initialized successfully");
                true
            }
            Err(e) => {
                tracing::error!("Failed to initialize TTS engine: {}", e);
                tracing::warn!("TTS service may not work correctly");
                false
            }
        };
        self.ready.store(ready, Ordering::Relaxed);
        ready
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    pub fn supported_languages(&self) -> &'static [Language] {
        TTS_LANGUAGES
    }
}
