//! WebFinger server - discovery endpoints for a single site
//!
//! Serves /.well-known/webfinger, /.well-known/host-meta and /main/ownerxrd
//! for the actors and notes loaded from DIRECTORY_SEED.

use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};
use webfinger_server::error::Result;
use webfinger_server::{start_server, AppState, Config, LocalResourceResolver, MemoryStore, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("webfinger_server=info".parse()?);

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

    info!("Starting WebFinger server...");

    let config = Config::from_env();
    info!("Port: {}", config.port);
    info!("Site: {} ({})", config.site_domain, config.site_url);
    if config.legacy_http_aliases {
        info!("Publishing legacy http: aliases");
    }

    let store = match &config.seed_path {
        Some(path) => MemoryStore::load_seed(path).await?,
        None => {
            warn!("DIRECTORY_SEED not set, serving an empty directory");
            MemoryStore::new()
        }
    };

    let resolver = LocalResourceResolver::new(Arc::new(store), &config);
    let port = config.port;
    let state: SharedState = Arc::new(AppState::new(config, resolver));

    // Start HTTP server (blocking)
    start_server(state, port).await?;

    Ok(())
}
