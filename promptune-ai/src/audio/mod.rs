//! Audio input handling

pub mod decoder;

pub use decoder::{decode_audio_bytes, DecodedAudio};
