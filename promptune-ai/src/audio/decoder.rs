//! Audio decoding
//!
//! Decodes an in-memory audio file (upload body or downloaded URL) to mono
//! f32 PCM. Uses symphonia for format-agnostic decoding (MP3, FLAC, AAC, WAV,
//! OGG, ...).

use anyhow::{anyhow, bail, Context, Result};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::{debug, warn};

use crate::analysis::AudioSamples;

/// Decoded audio result
#[derive(Debug)]
pub struct DecodedAudio {
    /// Mono audio samples (f32, range [-1.0, 1.0])
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Original channel count
    pub channels: usize,
    /// Duration in seconds
    pub duration_seconds: f64,
}

impl From<DecodedAudio> for AudioSamples {
    fn from(decoded: DecodedAudio) -> Self {
        AudioSamples::new(decoded.samples, decoded.sample_rate)
    }
}

/// Decode an in-memory audio file to mono f32 PCM samples
///
/// **Algorithm:**
/// 1. Probe the container (extension of `name_hint` used as a hint)
/// 2. Pick the first track with a real codec
/// 3. Decode every packet of that track, skipping corrupt packets
/// 4. Average all channels down to mono
///
/// # Errors
/// * Unrecognised or unsupported format
/// * No audio track
/// * Stream that decodes to zero samples
pub fn decode_audio_bytes(bytes: Vec<u8>, name_hint: Option<&str>) -> Result<DecodedAudio> {
    let label = name_hint.unwrap_or("<memory>").to_string();
    debug!(source = %label, bytes = bytes.len(), "Decoding audio");

    if bytes.is_empty() {
        bail!("Empty audio data: {}", label);
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = name_hint
        .and_then(|name| Path::new(name).extension())
        .and_then(|e| e.to_str())
    {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Failed to probe audio: {}", label))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channel_count = track.codec_params.channels.map(|c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("Failed to create decoder for: {}", label))?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(anyhow!("Error reading packet in {}: {}", label, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!(source = %label, "Skipping corrupt packet: {}", e);
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Fatal decode error in: {}", label)),
        };

        let spec = decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channel_count.get_or_insert(spec.channels.count());

        append_mono(&decoded, &mut all_samples);
    }

    let sample_rate = sample_rate.context("Sample rate unknown")?;
    if sample_rate == 0 {
        bail!("Invalid sample rate 0 in: {}", label);
    }
    if all_samples.is_empty() {
        bail!("No audio samples decoded from: {}", label);
    }

    let duration_seconds = all_samples.len() as f64 / sample_rate as f64;

    debug!(
        source = %label,
        total_samples = all_samples.len(),
        sample_rate = sample_rate,
        duration_seconds = format!("{:.2}", duration_seconds),
        "Audio decoding complete"
    );

    Ok(DecodedAudio {
        samples: all_samples,
        sample_rate,
        channels: channel_count.unwrap_or(1),
        duration_seconds,
    })
}

/// Append the channel average of every frame in `decoded` to `out`
fn append_mono(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::U8(buf) => mix_planes(buf, out),
        AudioBufferRef::U16(buf) => mix_planes(buf, out),
        AudioBufferRef::U24(buf) => mix_planes(buf, out),
        AudioBufferRef::U32(buf) => mix_planes(buf, out),
        AudioBufferRef::S8(buf) => mix_planes(buf, out),
        AudioBufferRef::S16(buf) => mix_planes(buf, out),
        AudioBufferRef::S24(buf) => mix_planes(buf, out),
        AudioBufferRef::S32(buf) => mix_planes(buf, out),
        AudioBufferRef::F32(buf) => mix_planes(buf, out),
        AudioBufferRef::F64(buf) => mix_planes(buf, out),
    }
}

fn mix_planes<S>(buf: &AudioBuffer<S>, out: &mut Vec<f32>)
where
    S: Sample,
    f32: FromSample<S>,
{
    let num_channels = buf.spec().channels.count();
    if num_channels == 0 {
        return;
    }

    out.reserve(buf.frames());
    for frame_idx in 0..buf.frames() {
        let sum: f32 = (0..num_channels)
            .map(|ch| f32::from_sample(buf.chan(ch)[frame_idx]))
            .sum();
        out.push(sum / num_channels as f32);
    }
}
