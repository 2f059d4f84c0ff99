//! Envmon Daemon - serves sensor telemetry series for charting

use anyhow::Result;
use envmond::config::Config;
use envmond::server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("[BOOT] envmond v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    info!(
        "[BOOT] Config loaded (data mode: {}, debug: {})",
        config.storage.mode,
        config.debug_mode()
    );

    server::run(config).await
}
