//! HTTP server for envmond

use crate::config::Config;
use crate::routes;
use anyhow::{Context, Result};
use axum::Router;
use envmon_common::{
    DataMode, ReadingStore, SeriesResolver, SqliteReadingStore, TelemetryQueryService,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    pub resolver: Arc<SeriesResolver>,
    pub start_time: Instant,
    /// Expose series provenance in a response header
    pub debug_mode: bool,
}

impl AppState {
    pub fn new(resolver: SeriesResolver, debug_mode: bool) -> Self {
        Self {
            resolver: Arc::new(resolver),
            start_time: Instant::now(),
            debug_mode,
        }
    }

    /// Build state from config, opening the store when the data mode needs it.
    ///
    /// A store that fails to open is not fatal: queries fall back to synthesis.
    pub fn from_config(config: &Config) -> Self {
        let query = match config.storage.mode {
            DataMode::Synthetic => {
                info!("  Data mode synthetic, store not opened");
                TelemetryQueryService::detached()
            }
            DataMode::Database => match SqliteReadingStore::open_at(&config.storage.db_path) {
                Ok(store) => {
                    info!("  Reading store at {}", config.storage.db_path);
                    let store: Arc<dyn ReadingStore> = Arc::new(store);
                    TelemetryQueryService::new(store)
                }
                Err(e) => {
                    warn!(
                        "  Could not open reading store at {}: {}",
                        config.storage.db_path, e
                    );
                    TelemetryQueryService::detached()
                }
            },
        };

        let resolver = SeriesResolver::new(query, config.storage.mode, config.thresholds.clone());
        Self::new(resolver, config.debug_mode())
    }
}

/// Assemble the router with all route groups
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::data_routes())
        .merge(routes::catalog_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(config: Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(&config));
    let app = router(state);

    let addr = config.server.bind_addr.as_str();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Shutting down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
