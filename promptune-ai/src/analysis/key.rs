//! Key and scale estimation from a chroma histogram
//!
//! One real FFT over the analysis window (no framing, no window function).
//! Every bin between 60 Hz and 5 kHz adds its magnitude to the pitch class
//! `round(12·log2(f/440) + 69) mod 12`. The strongest class is the key;
//! major vs minor compares the two triads built on it.

use promptune_common::{PitchClass, Scale};
use realfft::RealFftPlanner;
use tracing::{debug, warn};

use super::AudioSamples;

/// Lowest frequency folded into the chroma histogram (Hz)
pub const MIN_FREQ_HZ: f64 = 60.0;

/// Highest frequency folded into the chroma histogram (Hz)
pub const MAX_FREQ_HZ: f64 = 5000.0;

const A4_HZ: f64 = 440.0;
const A4_MIDI: f64 = 69.0;

/// 12-bin pitch-class magnitude accumulator, index 0 = C
pub type Chroma = [f64; 12];

/// Estimate key and scale (`Major` or `Minor` only)
pub fn estimate_key(audio: &AudioSamples) -> (PitchClass, Scale) {
    let chroma = chroma_histogram(audio.analysis_window(), audio.sample_rate());
    let (key, scale) = key_from_chroma(&chroma);

    debug!(key = %key, scale = %scale, "Key estimated");

    (key, scale)
}

/// Fold the magnitude spectrum of `samples` into 12 pitch classes
pub fn chroma_histogram(samples: &[f32], sample_rate: u32) -> Chroma {
    let mut chroma = [0.0f64; 12];

    let n = samples.len();
    if n < 2 || sample_rate == 0 {
        return chroma;
    }

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut input = samples.to_vec();
    let mut spectrum = fft.make_output_vec();

    if let Err(e) = fft.process(&mut input, &mut spectrum) {
        warn!("Spectrum computation failed: {:?}", e);
        return chroma;
    }

    let bin_hz = sample_rate as f64 / n as f64;
    for (bin, value) in spectrum.iter().enumerate() {
        let freq = bin as f64 * bin_hz;
        if !(MIN_FREQ_HZ..=MAX_FREQ_HZ).contains(&freq) {
            continue;
        }
        chroma[pitch_class_index(freq)] += value.norm() as f64;
    }

    chroma
}

/// Equal-tempered pitch class (0 = C) of a positive frequency
pub fn pitch_class_index(freq: f64) -> usize {
    let midi = (12.0 * (freq / A4_HZ).log2() + A4_MIDI).round() as i64;
    midi.rem_euclid(12) as usize
}

/// Pick the strongest pitch class and decide major vs minor
///
/// The first maximum wins, so an all-zero histogram gives C. Minor is chosen
/// only when its triad is strictly stronger; ties are Major.
pub fn key_from_chroma(chroma: &Chroma) -> (PitchClass, Scale) {
    let mut root = 0;
    let mut max_energy = 0.0;
    for (i, &energy) in chroma.iter().enumerate() {
        if energy > max_energy {
            max_energy = energy;
            root = i;
        }
    }

    let major = chroma[root] + chroma[(root + 4) % 12] + chroma[(root + 7) % 12];
    let minor = chroma[root] + chroma[(root + 3) % 12] + chroma[(root + 7) % 12];

    let scale = if minor > major { Scale::Minor } else { Scale::Major };

    (PitchClass::from_index(root), scale)
}
