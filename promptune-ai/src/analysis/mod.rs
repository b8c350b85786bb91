//! Feature extraction
//!
//! Turns decoded mono samples into a [`FeatureResult`]:
//! - **tempo** - onset-interval BPM estimate
//! - **key** - chroma histogram from a single spectrum, triad-based major/minor
//! - **rhythm** - coarse kick-energy heuristic (placeholder, partly random)
//! - **mood** - energy / zero-crossing quadrants
//! - **mock** - deterministic stand-in used when no audio can be analysed
//!
//! All functions are pure over their input buffer. The only non-determinism
//! is the rhythm draw, which takes its random source from the caller.

pub mod key;
pub mod mock;
pub mod mood;
pub mod rhythm;
pub mod tempo;

use promptune_common::FeatureResult;
use rand::Rng;
use tracing::debug;

pub use key::estimate_key;
pub use mock::mock_features;
pub use mood::classify_mood;
pub use rhythm::classify_rhythm;
pub use tempo::estimate_bpm;

/// Tempo and key estimation look at no more than this much audio
pub const MAX_ANALYSIS_SECONDS: usize = 30;

/// Mono PCM buffer with its sample rate
///
/// Immutable once built; owned by the extraction call that analyses it.
#[derive(Debug, Clone)]
pub struct AudioSamples {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioSamples {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Leading slice of at most [`MAX_ANALYSIS_SECONDS`]
    pub fn analysis_window(&self) -> &[f32] {
        let limit = (self.sample_rate as usize).saturating_mul(MAX_ANALYSIS_SECONDS);
        &self.samples[..self.samples.len().min(limit)]
    }
}

/// Run every estimator over `audio`
pub fn extract_features<R: Rng + ?Sized>(audio: &AudioSamples, rng: &mut R) -> FeatureResult {
    debug!(
        sample_count = audio.len(),
        sample_rate = audio.sample_rate(),
        duration_seconds = format!("{:.2}", audio.duration_seconds()),
        "Extracting features"
    );

    let bpm = estimate_bpm(audio);
    let (key, scale) = estimate_key(audio);
    let rhythm = classify_rhythm(audio, rng);
    let mood = classify_mood(audio);

    let result = FeatureResult {
        key,
        scale,
        bpm,
        rhythm,
        mood,
    };

    debug!(
        key = %result.key,
        scale = %result.scale,
        bpm = result.bpm,
        rhythm = %result.rhythm,
        mood = %result.mood,
        "Feature extraction complete"
    );

    result
}
