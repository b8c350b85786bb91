//! Analysis endpoints
//!
//! - `POST /analyze` - multipart upload, field `file`
//! - `POST /analyze-url` - JSON `{ "url": "..." }`
//!
//! Both always answer with an [`AnalysisRecord`]; `approximate: true` marks a
//! seeded mock result.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use promptune_common::AnalysisRecord;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::service::AnalysisOutcome;
use crate::sources::AudioSource;
use crate::AppState;

/// Multipart field carrying the audio file
pub const FILE_FIELD: &str = "file";

/// POST /analyze-url request body
#[derive(Debug, Deserialize)]
pub struct AnalyzeUrlRequest {
    pub url: String,
}

/// POST /analyze
pub async fn analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalysisRecord>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no filename".to_string()))?;
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes.to_vec()));
    }

    let (name, bytes) = upload
        .ok_or_else(|| ApiError::BadRequest(format!("Missing '{}' field", FILE_FIELD)))?;

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    debug!(filename = %name, bytes = bytes.len(), "Upload received");

    let outcome = state.service.analyze(AudioSource::File { bytes, name }).await;
    Ok(Json(remember(&state, outcome).await))
}

/// POST /analyze-url
pub async fn analyze_url(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeUrlRequest>,
) -> ApiResult<Json<AnalysisRecord>> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::BadRequest("url is required".to_string()));
    }

    let outcome = state.service.analyze(AudioSource::Url(url.to_string())).await;
    Ok(Json(remember(&state, outcome).await))
}

async fn remember(state: &AppState, outcome: AnalysisOutcome) -> AnalysisRecord {
    if let Some(reason) = outcome.fallback_reason {
        *state.last_fallback.write().await = Some(reason);
    }
    outcome.record
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze_upload))
        .route("/analyze-url", post(analyze_url))
}
