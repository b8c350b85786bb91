//! Tempo estimation from frame-energy onsets
//!
//! 1. Split the analysis window into 1024-sample frames, energy = mean |s|
//! 2. A frame is an onset when it rises 20% over the previous frame, exceeds
//!    the next frame and clears an absolute noise floor
//! 3. Keep inter-onset intervals inside (0.1 s, 1.0 s)
//! 4. BPM = 60 / mean interval, folded into [60, 180] by octaves
//!
//! Degrades to [`FALLBACK_BPM`] when no usable interval exists; never fails.

use tracing::debug;

use super::AudioSamples;

/// Samples per energy frame
pub const FRAME_SIZE: usize = 1024;

/// Required rise over the previous frame for an onset
pub const ONSET_RISE_RATIO: f32 = 1.2;

/// Absolute frame energy below which nothing counts as an onset
pub const ENERGY_FLOOR: f32 = 0.01;

/// Shortest accepted inter-onset interval (600 BPM)
pub const MIN_INTERVAL_SECS: f64 = 0.1;

/// Longest accepted inter-onset interval (60 BPM)
pub const MAX_INTERVAL_SECS: f64 = 1.0;

pub const MIN_BPM: u32 = 60;
pub const MAX_BPM: u32 = 180;

/// Returned when no onset intervals could be measured
pub const FALLBACK_BPM: u32 = 120;

/// Estimate tempo in beats per minute, always within [`MIN_BPM`, `MAX_BPM`]
pub fn estimate_bpm(audio: &AudioSamples) -> u32 {
    let energies = frame_energies(audio.analysis_window());
    let onsets = detect_onsets(&energies);

    let sample_rate = audio.sample_rate() as f64;
    let onset_times: Vec<f64> = onsets
        .iter()
        .map(|&frame| (frame * FRAME_SIZE) as f64 / sample_rate)
        .collect();

    let intervals: Vec<f64> = onset_times
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|&interval| interval > MIN_INTERVAL_SECS && interval < MAX_INTERVAL_SECS)
        .collect();

    if intervals.is_empty() {
        debug!(
            frames = energies.len(),
            onsets = onsets.len(),
            "No usable onset intervals, using fallback tempo"
        );
        return FALLBACK_BPM;
    }

    let mean_interval = intervals.iter().sum::<f64>() / intervals.len() as f64;
    let raw_bpm = (60.0 / mean_interval).round() as u32;
    let bpm = fold_bpm(raw_bpm);

    debug!(
        onsets = onsets.len(),
        intervals = intervals.len(),
        mean_interval = format!("{:.4}", mean_interval),
        raw_bpm = raw_bpm,
        bpm = bpm,
        "Tempo estimated"
    );

    bpm
}

/// Mean absolute amplitude of each full frame
///
/// Frames start at every multiple of [`FRAME_SIZE`] strictly below
/// `len - FRAME_SIZE`, so the tail is never analysed as a short frame.
pub fn frame_energies(samples: &[f32]) -> Vec<f32> {
    if samples.len() <= FRAME_SIZE {
        return Vec::new();
    }

    (0..samples.len() - FRAME_SIZE)
        .step_by(FRAME_SIZE)
        .map(|start| {
            let frame = &samples[start..start + FRAME_SIZE];
            frame.iter().map(|s| s.abs()).sum::<f32>() / FRAME_SIZE as f32
        })
        .collect()
}

/// Indices of frames that are local energy onsets
///
/// The first and last frames are never onsets (they lack a neighbour).
pub fn detect_onsets(energies: &[f32]) -> Vec<usize> {
    energies
        .windows(3)
        .enumerate()
        .filter(|(_, w)| {
            let (prev, cur, next) = (w[0], w[1], w[2]);
            cur > prev * ONSET_RISE_RATIO && cur > next && cur > ENERGY_FLOOR
        })
        .map(|(i, _)| i + 1)
        .collect()
}

/// Fold a tempo into [`MIN_BPM`, `MAX_BPM`] by doubling or halving
///
/// Halving rounds to the nearest integer. Zero has no octave and maps to
/// [`FALLBACK_BPM`].
pub fn fold_bpm(bpm: u32) -> u32 {
    if bpm == 0 {
        return FALLBACK_BPM;
    }

    let mut bpm = bpm;
    while bpm < MIN_BPM {
        bpm *= 2;
    }
    while bpm > MAX_BPM {
        bpm = (bpm as f64 / 2.0).round() as u32;
    }
    bpm
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;
    const CLICK_LEN: usize = 64;

    /// Silence with a short full-scale click every `period_secs`
    fn click_track(period_secs: f64, duration_secs: f64) -> AudioSamples {
        let total = (duration_secs * SAMPLE_RATE as f64) as usize;
        let period = (period_secs * SAMPLE_RATE as f64).round() as usize;
        let mut samples = vec![0.0f32; total];

        let mut start = period;
        while start + CLICK_LEN < total {
            for s in &mut samples[start..start + CLICK_LEN] {
                *s = 0.9;
            }
            start += period;
        }

        AudioSamples::new(samples, SAMPLE_RATE)
    }

    #[test]
    fn test_clicks_every_half_second_give_120() {
        let audio = click_track(0.5, 30.0);
        assert_eq!(estimate_bpm(&audio), 120);
    }

    #[test]
    fn test_fast_clicks_fold_down() {
        // 0.25 s spacing is 240 BPM before folding
        let audio = click_track(0.25, 20.0);
        assert_eq!(estimate_bpm(&audio), 120);
    }

    #[test]
    fn test_slow_clicks_in_range() {
        // 0.75 s spacing is 80 BPM, frame quantisation keeps it within 1 BPM
        let audio = click_track(0.75, 30.0);
        let bpm = estimate_bpm(&audio);
        assert!((79..=81).contains(&bpm), "got {}", bpm);
    }

    #[test]
    fn test_silence_uses_fallback() {
        let audio = AudioSamples::new(vec![0.0; SAMPLE_RATE as usize * 5], SAMPLE_RATE);
        assert_eq!(estimate_bpm(&audio), FALLBACK_BPM);
    }

    #[test]
    fn test_empty_and_tiny_buffers_use_fallback() {
        assert_eq!(estimate_bpm(&AudioSamples::new(Vec::new(), SAMPLE_RATE)), FALLBACK_BPM);
        assert_eq!(estimate_bpm(&AudioSamples::new(vec![0.5; 100], SAMPLE_RATE)), FALLBACK_BPM);
    }

    #[test]
    fn test_steady_tone_has_no_onsets() {
        let samples: Vec<f32> = (0..SAMPLE_RATE as usize * 3)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / SAMPLE_RATE as f32).sin())
            .collect();
        assert_eq!(estimate_bpm(&AudioSamples::new(samples, SAMPLE_RATE)), FALLBACK_BPM);
    }

    #[test]
    fn test_clicks_beyond_window_are_ignored() {
        // 35 s of silence with clicks only after the 30 s analysis window
        let mut samples = vec![0.0f32; SAMPLE_RATE as usize * 35];
        let mut start = SAMPLE_RATE as usize * 31;
        while start + CLICK_LEN < samples.len() {
            for s in &mut samples[start..start + CLICK_LEN] {
                *s = 0.9;
            }
            start += SAMPLE_RATE as usize / 2;
        }
        assert_eq!(estimate_bpm(&AudioSamples::new(samples, SAMPLE_RATE)), FALLBACK_BPM);
    }

    #[test]
    fn test_frame_energies() {
        let mut samples = vec![0.0f32; FRAME_SIZE * 3 + 10];
        for s in &mut samples[FRAME_SIZE..FRAME_SIZE * 2] {
            *s = -0.5;
        }
        let energies = frame_energies(&samples);
        assert_eq!(energies.len(), 3);
        assert_eq!(energies[0], 0.0);
        assert!((energies[1] - 0.5).abs() < 1e-6);
        assert_eq!(energies[2], 0.0);
    }

    #[test]
    fn test_frame_energies_skips_exact_tail_frame() {
        // len - FRAME_SIZE == 2 * FRAME_SIZE, so only frames 0 and 1 qualify
        let samples = vec![0.1f32; FRAME_SIZE * 3];
        assert_eq!(frame_energies(&samples).len(), 2);
    }

    #[test]
    fn test_detect_onsets_rules() {
        // Index 2 rises 2x and beats its neighbour
        // Index 4 rises only 10% and is rejected
        // Index 6 is below the noise floor
        let energies = [0.0, 0.1, 0.2, 0.1, 0.11, 0.0, 0.009, 0.0];
        assert_eq!(detect_onsets(&energies), vec![2]);
    }

    #[test]
    fn test_onset_requires_drop_after() {
        let energies = [0.0, 0.2, 0.2, 0.0];
        // Index 1 is not above its successor, index 2 does not rise over index 1
        assert!(detect_onsets(&energies).is_empty());
    }

    #[test]
    fn test_fold_bpm() {
        assert_eq!(fold_bpm(120), 120);
        assert_eq!(fold_bpm(60), 60);
        assert_eq!(fold_bpm(180), 180);
        assert_eq!(fold_bpm(45), 90);
        assert_eq!(fold_bpm(25), 100);
        assert_eq!(fold_bpm(181), 91);
        assert_eq!(fold_bpm(300), 150);
        assert_eq!(fold_bpm(600), 150);
        assert_eq!(fold_bpm(0), FALLBACK_BPM);
    }

    #[test]
    fn test_fold_bpm_always_in_range() {
        for bpm in 1..2000 {
            let folded = fold_bpm(bpm);
            assert!((MIN_BPM..=MAX_BPM).contains(&folded), "{} -> {}", bpm, folded);
        }
    }
}
