//! harp-rp (Risk Prediction) - Heart attack risk prediction service
//!
//! Loads the pretrained classifier once at startup and serves batch
//! predictions for uploaded CSV files over HTTP.

use anyhow::Result;
use clap::Parser;
use harp_rp::config::{self, CliArgs};
use harp_rp::pipeline::ModelHandle;
use harp_rp::{build_router, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = config::resolve(&args)?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        "Starting HARP Risk Prediction (harp-rp) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config.config_file {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => info!("No configuration file, using environment and defaults"),
    }

    let model = ModelHandle::load(&config.model_path);
    if !model.is_loaded() {
        warn!("Serving without a model; /process will report the model as unavailable");
    }

    let state = AppState::new(model).with_max_upload_bytes(config.max_upload_bytes);
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("harp-rp listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
