//! promptune-ai library interface
//!
//! Extracts musical features (key, scale, tempo, rhythm, mood) from uploaded
//! audio or remote URLs and serves them over HTTP.

pub mod analysis;
pub mod api;
pub mod audio;
pub mod error;
pub mod service;
pub mod sources;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::service::AnalysisService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: AnalysisService,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Reason the most recent request fell back to a mock result
    pub last_fallback: Arc<RwLock<Option<String>>>,
    /// Request body cap for uploads
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(service: AnalysisService, max_upload_bytes: usize) -> Self {
        Self {
            service,
            startup_time: Utc::now(),
            last_fallback: Arc::new(RwLock::new(None)),
            max_upload_bytes,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .merge(api::analyze_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
