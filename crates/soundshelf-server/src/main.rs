//! Soundshelf - upload, list and delete audio files over HTTP
//!
//! Accepted MP3/WAV files are kept in one directory whose total size is
//! capped; the oldest files are evicted to make room for new uploads.

mod config;
mod error;
mod server;
mod types;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::server::{start_server, ServerState, SharedState};
use bounded_file_store::{BoundedStore, FsBackend};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env()
        .add_directive("soundshelf_server=info".parse()?)
        .add_directive("bounded_file_store=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Soundshelf...");

    let config = ServerConfig::from_env()?;
    info!("Port: {}", config.port);
    info!("Upload dir: {:?}", config.upload_dir);
    info!(
        "Max storage size: {} MB",
        config.max_storage_bytes / (1024 * 1024)
    );
    info!("Eviction policy: {}", config.eviction_policy);
    if config.api_key.is_none() {
        warn!("API_KEY is not set; every delete request will be rejected");
    }

    let backend = FsBackend::new(&config.upload_dir);
    backend.init().await?;
    let store = BoundedStore::new(Arc::new(backend), config.store_config());

    let stats = store.stats().await?;
    info!(
        items = stats.items,
        total_bytes = stats.total_bytes,
        "Loaded existing uploads"
    );

    let state: SharedState = Arc::new(ServerState::new(store));

    // Start HTTP server (blocking)
    start_server(state, &config).await?;

    Ok(())
}
