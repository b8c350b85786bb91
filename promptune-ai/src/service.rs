//! Analysis service
//!
//! Resolves an [`AudioSource`] to an [`AnalysisRecord`]. Real signal
//! analysis is tried first; any failure along the way (fetch, decode, or the
//! extraction task itself) falls back to the seeded mock and marks the record
//! approximate. The service therefore always produces a record.

use anyhow::{Context, Result};
use promptune_common::{AnalysisRecord, FeatureResult, SourceKind};
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::{extract_features, mock_features, AudioSamples};
use crate::audio::decode_audio_bytes;
use crate::sources::{filename_from_url, source_identity, AudioSource, SourceFetcher};

/// Record plus the reason real analysis was abandoned, if it was
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub record: AnalysisRecord,
    pub fallback_reason: Option<String>,
}

#[derive(Clone)]
pub struct AnalysisService {
    fetcher: Arc<SourceFetcher>,
}

impl AnalysisService {
    pub fn new(fetcher: SourceFetcher) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    pub async fn analyze(&self, source: AudioSource) -> AnalysisOutcome {
        let kind = source.kind();
        match source {
            AudioSource::File { bytes, name } => {
                let analysed = analyze_bytes(bytes, name.clone()).await;
                finish(name.clone(), kind, &name, analysed)
            }
            AudioSource::Url(url) => {
                let filename = filename_from_url(&url);
                let analysed = match self.fetcher.fetch(&url).await {
                    Ok(bytes) => analyze_bytes(bytes, filename.clone()).await,
                    Err(e) => Err(e.into()),
                };
                finish(filename, kind, &source_identity(&url), analysed)
            }
        }
    }
}

/// Decode and extract on the blocking pool
///
/// A panic inside extraction surfaces as an error here instead of taking the
/// request down.
async fn analyze_bytes(bytes: Vec<u8>, name: String) -> Result<FeatureResult> {
    tokio::task::spawn_blocking(move || -> Result<FeatureResult> {
        let decoded = decode_audio_bytes(bytes, Some(&name))?;
        let audio = AudioSamples::from(decoded);
        Ok(extract_features(&audio, &mut rand::thread_rng()))
    })
    .await
    .context("Feature extraction task failed")?
}

fn finish(
    filename: String,
    source: SourceKind,
    mock_seed: &str,
    analysed: Result<FeatureResult>,
) -> AnalysisOutcome {
    match analysed {
        Ok(features) => {
            info!(filename = %filename, bpm = features.bpm, key = %features.key, "Audio analysed");
            AnalysisOutcome {
                record: AnalysisRecord::new(filename, source, features, false),
                fallback_reason: None,
            }
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            warn!(
                filename = %filename,
                seed = %mock_seed,
                reason = %reason,
                "Audio analysis unavailable, using seeded mock"
            );
            AnalysisOutcome {
                record: AnalysisRecord::new(filename, source, mock_features(mock_seed), true),
                fallback_reason: Some(reason),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptune_common::config::FetchConfig;
    use std::io::Cursor;

    fn service() -> AnalysisService {
        let config = FetchConfig {
            timeout_secs: 2,
            ..FetchConfig::default()
        };
        AnalysisService::new(SourceFetcher::new(&config, 1024 * 1024).unwrap())
    }

    fn tone_wav(freq: f32, seconds: f32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            let total = (22050.0 * seconds) as usize;
            for i in 0..total {
                let t = i as f32 / 22050.0;
                let s = 0.4 * (2.0 * std::f32::consts::PI * freq * t).sin();
                writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[tokio::test]
    async fn test_file_is_analysed() {
        let outcome = service()
            .analyze(AudioSource::File {
                bytes: tone_wav(440.0, 1.0),
                name: "tone.wav".to_string(),
            })
            .await;

        assert!(outcome.fallback_reason.is_none());
        assert!(!outcome.record.approximate);
        assert_eq!(outcome.record.filename, "tone.wav");
        assert_eq!(outcome.record.source, SourceKind::File);
        assert_eq!(outcome.record.features.key, promptune_common::PitchClass::A);
    }

    #[tokio::test]
    async fn test_undecodable_file_falls_back_to_filename_mock() {
        let svc = service();
        let outcome = svc
            .analyze(AudioSource::File {
                bytes: b"not audio at all".to_vec(),
                name: "broken.mp3".to_string(),
            })
            .await;

        assert!(outcome.record.approximate);
        assert!(outcome.fallback_reason.is_some());
        assert_eq!(outcome.record.features, mock_features("broken.mp3"));
    }

    #[tokio::test]
    async fn test_unfetchable_url_falls_back_to_identity_mock() {
        let url = "http://127.0.0.1:1/watch?v=abc";
        let outcome = service().analyze(AudioSource::Url(url.to_string())).await;

        assert!(outcome.record.approximate);
        assert_eq!(outcome.record.source, SourceKind::Url);
        assert_eq!(outcome.record.features, mock_features(url));
    }

    #[tokio::test]
    async fn test_streaming_urls_share_identity_mock() {
        let svc = service();
        let a = svc
            .analyze(AudioSource::Url("https://youtu.be/dQw4w9WgXcQ".to_string()))
            .await;
        let b = svc
            .analyze(AudioSource::Url(
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            ))
            .await;

        // Whether or not the network is reachable, neither is raw audio
        assert!(a.record.approximate);
        assert!(b.record.approximate);
        assert_eq!(a.record.features, b.record.features);
        assert_eq!(a.record.features, mock_features("dQw4w9WgXcQ"));
    }
}
