//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from
//! main.rs for better organization and testability.

pub mod routes;
pub mod server;

use crate::job_queue::UploadJobQueue;
use crate::state::AppState;
use anyhow::{Context, Result};
use clipgate_core::{Config, UrlSigner};
use clipgate_stream::{StreamApiClient, TusUploadClient};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    // Initialize telemetry first
    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    // Build clients and application state
    let state = build_state(&config)?;

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Construct the backend clients and the shared application state.
pub fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let signer = UrlSigner::new(
        config.signing.security_key.clone(),
        config.signing.token_validity_secs,
    );

    let registrar = Arc::new(
        StreamApiClient::new(&config.stream)
            .map_err(|e| anyhow::anyhow!("Failed to create stream API client: {}", e))?,
    );
    let uploader = Arc::new(
        TusUploadClient::new(
            &config.stream,
            &config.signing,
            config.upload.chunk_size_bytes,
        )
        .map_err(|e| anyhow::anyhow!("Failed to create upload client: {}", e))?,
    );

    let uploads = UploadJobQueue::new(
        registrar.clone(),
        uploader,
        config.upload.max_concurrent,
        config.upload.queue_size,
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        signer,
        registrar,
        uploads,
    }))
}
