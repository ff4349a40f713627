//! flipstock server binary

use anyhow::Context;
use flipstock_engine::StorageEngine;
use flipstock_server::{config, telemetry, AppState, FlipstockServer, ServerConfig};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = config::cli().get_matches();
    let config = ServerConfig::from_matches(&matches)?;

    telemetry::init(config.log_format);

    info!("Starting flipstock server");
    info!(data_dir = %config.data_dir.display(), bind = %config.bind, "configuration loaded");

    if !config.data_dir.exists() {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("failed to create data directory {}", config.data_dir.display())
        })?;
        info!(data_dir = %config.data_dir.display(), "created data directory");
    }

    let engine = StorageEngine::new(&config.data_dir).context("failed to open storage")?;
    info!("Storage engine initialized");

    let state = AppState::new(&config.auth, Arc::new(engine))?;
    let server = FlipstockServer::new(state);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    server.serve(config.bind, shutdown).await?;
    info!("Server shutdown gracefully");
    Ok(())
}
