//! Musical attribute vocabulary and analysis records
//!
//! Every label an analysis can produce is a closed enumeration here, so a
//! [`FeatureResult`] can never carry free text. Serialized forms are the
//! human-readable labels shown to users and fed into prompt templates
//! (e.g. `"C#"`, `"Four on the floor"`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One of the 12 equal-tempered pitch classes, sharps spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "B")]
    B,
}

impl PitchClass {
    /// Chromatic order starting at C (index == semitones above C)
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Pitch class for a semitone index; wraps modulo 12
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Semitones above C (0..12)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scale / mode names
///
/// The spectral key estimator only ever decides between `Major` and `Minor`;
/// the modal names are reachable through the seeded mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scale {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
}

impl Scale {
    pub const ALL: [Scale; 7] = [
        Scale::Major,
        Scale::Minor,
        Scale::Dorian,
        Scale::Phrygian,
        Scale::Lydian,
        Scale::Mixolydian,
        Scale::Locrian,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "Major",
            Scale::Minor => "Minor",
            Scale::Dorian => "Dorian",
            Scale::Phrygian => "Phrygian",
            Scale::Lydian => "Lydian",
            Scale::Mixolydian => "Mixolydian",
            Scale::Locrian => "Locrian",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rhythm style labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rhythm {
    #[serde(rename = "Four on the floor")]
    FourOnTheFloor,
    Syncopated,
    Breakbeat,
    #[serde(rename = "Hip hop")]
    HipHop,
    Trap,
    Waltz,
    Swing,
    Progressive,
    Polyrhythmic,
}

impl Rhythm {
    pub const ALL: [Rhythm; 9] = [
        Rhythm::FourOnTheFloor,
        Rhythm::Syncopated,
        Rhythm::Breakbeat,
        Rhythm::HipHop,
        Rhythm::Trap,
        Rhythm::Waltz,
        Rhythm::Swing,
        Rhythm::Progressive,
        Rhythm::Polyrhythmic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rhythm::FourOnTheFloor => "Four on the floor",
            Rhythm::Syncopated => "Syncopated",
            Rhythm::Breakbeat => "Breakbeat",
            Rhythm::HipHop => "Hip hop",
            Rhythm::Trap => "Trap",
            Rhythm::Waltz => "Waltz",
            Rhythm::Swing => "Swing",
            Rhythm::Progressive => "Progressive",
            Rhythm::Polyrhythmic => "Polyrhythmic",
        }
    }
}

impl fmt::Display for Rhythm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mood labels
///
/// The energy/zero-crossing classifier reaches only `Energetic`,
/// `Aggressive`, `Upbeat` and `Chill`. The rest stay in the vocabulary for
/// the mock generator and downstream prompt templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Melancholic,
    Upbeat,
    Dramatic,
    Chill,
    Energetic,
    Dreamy,
    Nostalgic,
    Aggressive,
    Mysterious,
    Romantic,
}

impl Mood {
    pub const ALL: [Mood; 10] = [
        Mood::Melancholic,
        Mood::Upbeat,
        Mood::Dramatic,
        Mood::Chill,
        Mood::Energetic,
        Mood::Dreamy,
        Mood::Nostalgic,
        Mood::Aggressive,
        Mood::Mysterious,
        Mood::Romantic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mood::Melancholic => "Melancholic",
            Mood::Upbeat => "Upbeat",
            Mood::Dramatic => "Dramatic",
            Mood::Chill => "Chill",
            Mood::Energetic => "Energetic",
            Mood::Dreamy => "Dreamy",
            Mood::Nostalgic => "Nostalgic",
            Mood::Aggressive => "Aggressive",
            Mood::Mysterious => "Mysterious",
            Mood::Romantic => "Romantic",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Estimated musical attributes of one piece of audio
///
/// **Invariant:** `bpm` lies in [60, 180] for results produced by signal
/// analysis; seeded mock results lie in [70, 150).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureResult {
    pub key: PitchClass,
    pub scale: Scale,
    pub bpm: u32,
    pub rhythm: Rhythm,
    pub mood: Mood,
}

/// Where an analysed piece of audio came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Url,
}

/// Analysis result as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub filename: String,
    pub source: SourceKind,
    #[serde(flatten)]
    pub features: FeatureResult,
    /// True when the features come from the seeded mock instead of the signal
    pub approximate: bool,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(
        filename: impl Into<String>,
        source: SourceKind,
        features: FeatureResult,
        approximate: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            source,
            features,
            approximate,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class_index_roundtrip() {
        for (i, pc) in PitchClass::ALL.iter().enumerate() {
            assert_eq!(pc.index(), i);
            assert_eq!(PitchClass::from_index(i), *pc);
        }
        assert_eq!(PitchClass::from_index(21), PitchClass::A);
    }

    #[test]
    fn test_labels_serialize_as_display_names() {
        assert_eq!(serde_json::to_string(&PitchClass::CSharp).unwrap(), "\"C#\"");
        assert_eq!(
            serde_json::to_string(&Rhythm::FourOnTheFloor).unwrap(),
            "\"Four on the floor\""
        );
        assert_eq!(serde_json::to_string(&Rhythm::HipHop).unwrap(), "\"Hip hop\"");
        assert_eq!(serde_json::to_string(&Mood::Chill).unwrap(), "\"Chill\"");

        for rhythm in Rhythm::ALL {
            let json = serde_json::to_string(&rhythm).unwrap();
            assert_eq!(json, format!("\"{}\"", rhythm));
        }
        for key in PitchClass::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key));
        }
    }

    #[test]
    fn test_record_flattens_features() {
        let record = AnalysisRecord::new(
            "song.wav",
            SourceKind::File,
            FeatureResult {
                key: PitchClass::A,
                scale: Scale::Minor,
                bpm: 120,
                rhythm: Rhythm::Swing,
                mood: Mood::Upbeat,
            },
            false,
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["filename"], "song.wav");
        assert_eq!(json["source"], "file");
        assert_eq!(json["key"], "A");
        assert_eq!(json["scale"], "Minor");
        assert_eq!(json["bpm"], 120);
        assert_eq!(json["rhythm"], "Swing");
        assert_eq!(json["mood"], "Upbeat");
        assert_eq!(json["approximate"], false);
        assert!(json["created_at"].is_string());
    }
}
