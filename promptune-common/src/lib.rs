//! # Promptune Common Library
//!
//! Shared code for Promptune crates:
//! - Musical attribute vocabulary (keys, scales, rhythms, moods)
//! - Feature and analysis record types
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod music;

pub use error::{Error, Result};
pub use music::{AnalysisRecord, FeatureResult, Mood, PitchClass, Rhythm, Scale, SourceKind};
