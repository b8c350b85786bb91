//! Seeded mock features
//!
//! Used when the audio behind a source cannot be decoded (corrupt upload,
//! streaming-platform URL, network failure). The result is a pure function
//! of the seed string, so the same source always shows the same attributes,
//! including across restarts. It says nothing about the actual audio.

use promptune_common::{FeatureResult, Mood, PitchClass, Rhythm, Scale};

/// Keys in circle-of-fifths order
const MOCK_KEYS: [PitchClass; 12] = [
    PitchClass::C,
    PitchClass::G,
    PitchClass::D,
    PitchClass::A,
    PitchClass::E,
    PitchClass::B,
    PitchClass::FSharp,
    PitchClass::CSharp,
    PitchClass::F,
    PitchClass::ASharp,
    PitchClass::DSharp,
    PitchClass::GSharp,
];

const MOCK_RHYTHMS: [Rhythm; 7] = [
    Rhythm::FourOnTheFloor,
    Rhythm::Syncopated,
    Rhythm::Trap,
    Rhythm::Waltz,
    Rhythm::Breakbeat,
    Rhythm::HipHop,
    Rhythm::Swing,
];

/// Number of leading [`Mood::ALL`] entries the mock draws from
const MOCK_MOOD_COUNT: usize = 8;

pub const MOCK_BPM_BASE: u32 = 70;
pub const MOCK_BPM_SPAN: u32 = 80;

/// Deterministic features for `seed`
///
/// Draw order is fixed: key, scale, bpm, rhythm, mood.
pub fn mock_features(seed: &str) -> FeatureResult {
    let mut random = SeededRandom::new(seed);

    let key = random.pick(&MOCK_KEYS);
    let scale = random.pick(&Scale::ALL);
    let bpm = (random.next_f64() * MOCK_BPM_SPAN as f64).floor() as u32 + MOCK_BPM_BASE;
    let rhythm = random.pick(&MOCK_RHYTHMS);
    let mood = random.pick(&Mood::ALL[..MOCK_MOOD_COUNT]);

    FeatureResult {
        key,
        scale,
        bpm,
        rhythm,
        mood,
    }
}

/// 32-bit polynomial rolling hash (`h * 31 + c`) over UTF-16 code units
pub fn seed_hash(seed: &str) -> i32 {
    seed.encode_utf16().fold(0i32, |hash, unit| {
        (hash << 5).wrapping_sub(hash).wrapping_add(unit as i32)
    })
}

/// Sine-scrambled generator producing values in [0, 1)
///
/// Each draw replaces the state with `sin(state) * 10000` and yields its
/// fractional part.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: f64,
}

impl SeededRandom {
    pub fn new(seed: &str) -> Self {
        Self {
            state: seed_hash(seed) as f64,
        }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.sin() * 10000.0;
        self.state - self.state.floor()
    }

    /// Uniform pick driven by one draw
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        let index = (self.next_f64() * items.len() as f64).floor() as usize;
        items[index.min(items.len() - 1)]
    }
}
