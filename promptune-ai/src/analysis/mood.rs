//! Mood classification from energy and zero-crossing rate
//!
//! | energy > 0.1 | zcr > 0.1 | mood       |
//! |--------------|-----------|------------|
//! | yes          | yes       | Energetic  |
//! | yes          | no        | Aggressive |
//! | no           | yes       | Upbeat     |
//! | no           | no        | Chill      |
//!
//! Only these four of the ten moods are reachable.

use promptune_common::Mood;
use tracing::debug;

use super::AudioSamples;

pub const ENERGY_THRESHOLD: f64 = 0.1;
pub const ZCR_THRESHOLD: f64 = 0.1;

pub fn classify_mood(audio: &AudioSamples) -> Mood {
    let samples = audio.samples();
    let energy = mean_abs_energy(samples);
    let zcr = zero_crossing_rate(samples);
    let mood = mood_for(energy, zcr);

    debug!(
        energy = format!("{:.4}", energy),
        zero_crossing_rate = format!("{:.4}", zcr),
        mood = %mood,
        "Mood classified"
    );

    mood
}

/// Quadrant lookup; both comparisons are strict
pub fn mood_for(energy: f64, zero_crossing_rate: f64) -> Mood {
    match (energy > ENERGY_THRESHOLD, zero_crossing_rate > ZCR_THRESHOLD) {
        (true, true) => Mood::Energetic,
        (true, false) => Mood::Aggressive,
        (false, true) => Mood::Upbeat,
        (false, false) => Mood::Chill,
    }
}

/// Mean absolute amplitude; 0.0 for an empty buffer
pub fn mean_abs_energy(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.abs() as f64).sum::<f64>() / samples.len() as f64
}

/// Sign changes between adjacent samples divided by the buffer length
///
/// Zero counts as positive.
pub fn zero_crossing_rate(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();
    crossings as f64 / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Square wave of `amplitude` flipping sign every `half_period` samples
    fn square(amplitude: f32, half_period: usize, len: usize) -> AudioSamples {
        let samples = (0..len)
            .map(|i| if (i / half_period) % 2 == 0 { amplitude } else { -amplitude })
            .collect();
        AudioSamples::new(samples, 44100)
    }

    #[test]
    fn test_quadrants() {
        assert_eq!(mood_for(0.5, 0.5), Mood::Energetic);
        assert_eq!(mood_for(0.5, 0.01), Mood::Aggressive);
        assert_eq!(mood_for(0.01, 0.5), Mood::Upbeat);
        assert_eq!(mood_for(0.01, 0.01), Mood::Chill);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(mood_for(0.1, 0.1), Mood::Chill);
        assert_eq!(mood_for(0.1001, 0.1), Mood::Aggressive);
        assert_eq!(mood_for(0.1, 0.1001), Mood::Upbeat);
        assert_eq!(mood_for(0.0999, 0.0999), Mood::Chill);
    }

    #[test]
    fn test_signal_just_above_both_thresholds() {
        // Sign flips every 9 samples: zcr ~0.111; amplitude 0.11
        let audio = square(0.11, 9, 9000);
        assert!(zero_crossing_rate(audio.samples()) > 0.1);
        assert!(mean_abs_energy(audio.samples()) > 0.1);
        assert_eq!(classify_mood(&audio), Mood::Energetic);
    }

    #[test]
    fn test_energy_just_above_zcr_just_below() {
        // Sign flips every 11 samples: zcr ~0.091
        let audio = square(0.11, 11, 11_000);
        assert!(zero_crossing_rate(audio.samples()) < 0.1);
        assert_eq!(classify_mood(&audio), Mood::Aggressive);
    }

    #[test]
    fn test_energy_just_below_zcr_just_above() {
        let audio = square(0.09, 9, 9000);
        assert!(mean_abs_energy(audio.samples()) < 0.1);
        assert_eq!(classify_mood(&audio), Mood::Upbeat);
    }

    #[test]
    fn test_energy_just_below_zcr_just_below() {
        let audio = square(0.09, 11, 11_000);
        assert_eq!(classify_mood(&audio), Mood::Chill);
    }

    #[test]
    fn test_zero_crossing_rate_counts_sign_changes() {
        assert_eq!(zero_crossing_rate(&[1.0, -1.0, 1.0, -1.0]), 0.75);
        assert_eq!(zero_crossing_rate(&[0.0, 0.5, 0.0]), 0.0);
        assert_eq!(zero_crossing_rate(&[-0.1, 0.0]), 0.5);
        assert_eq!(zero_crossing_rate(&[]), 0.0);
    }

    #[test]
    fn test_empty_buffer_is_chill() {
        assert_eq!(classify_mood(&AudioSamples::new(Vec::new(), 44100)), Mood::Chill);
    }
}
