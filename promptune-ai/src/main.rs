//! promptune-ai - audio feature extraction service
//!
//! Serves `POST /analyze`, `POST /analyze-url` and `GET /health`.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use promptune_common::config::{load_config, CONFIG_ENV_VAR};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptune_ai::service::AnalysisService;
use promptune_ai::sources::SourceFetcher;
use promptune_ai::AppState;

/// Command-line arguments for promptune-ai
#[derive(Parser, Debug)]
#[command(name = "promptune-ai")]
#[command(about = "Audio feature extraction service")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "PROMPTUNE_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(short, long, env = "PROMPTUNE_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Log level (overrides config)
    #[arg(short, long, env = "PROMPTUNE_LOG")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref(), CONFIG_ENV_VAR)
        .context("Failed to load configuration")?;

    let level = args.log_level.unwrap_or_else(|| config.logging.level.clone());

    // RUST_LOG still wins when set
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("promptune_ai={level},promptune_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting promptune-ai v{}", env!("CARGO_PKG_VERSION"));

    let bind_address = args
        .bind_address
        .unwrap_or_else(|| config.server.bind_address.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_address, port))?;

    let fetcher = SourceFetcher::new(&config.fetch, config.server.max_upload_bytes)
        .context("Failed to build HTTP client")?;
    let state = AppState::new(AnalysisService::new(fetcher), config.server.max_upload_bytes);
    let app = promptune_ai::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
