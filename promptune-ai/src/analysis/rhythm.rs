//! Rhythm style classification
//!
//! Placeholder heuristic, not a rhythm-pattern detector. A sparse sum of
//! absolute amplitude stands in for kick energy; anything above the
//! threshold is "Four on the floor". Quieter material gets "Syncopated" or a
//! uniform pick from the styles after it, chosen by the caller's RNG.

use promptune_common::Rhythm;
use rand::Rng;
use tracing::debug;

use super::AudioSamples;

/// Only every Nth sample contributes to the kick-energy proxy
pub const KICK_SAMPLE_STRIDE: usize = 1000;

/// Kick-energy proxy above which the rhythm is "Four on the floor"
pub const KICK_ENERGY_THRESHOLD: f64 = 0.1;

/// Styles the random branch may draw from (everything after "Syncopated")
const RANDOM_STYLES_START: usize = 2;

pub fn classify_rhythm<R: Rng + ?Sized>(audio: &AudioSamples, rng: &mut R) -> Rhythm {
    let kick_energy = kick_energy(audio.samples());

    let rhythm = if kick_energy > KICK_ENERGY_THRESHOLD {
        Rhythm::FourOnTheFloor
    } else if rng.gen::<f64>() > 0.5 {
        Rhythm::Syncopated
    } else {
        Rhythm::ALL[rng.gen_range(RANDOM_STYLES_START..Rhythm::ALL.len())]
    };

    debug!(kick_energy = kick_energy, rhythm = %rhythm, "Rhythm classified");

    rhythm
}

/// Sum of |s| over every [`KICK_SAMPLE_STRIDE`]th sample
pub fn kick_energy(samples: &[f32]) -> f64 {
    samples
        .iter()
        .step_by(KICK_SAMPLE_STRIDE)
        .map(|s| s.abs() as f64)
        .sum()
}
