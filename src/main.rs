//! Novel site SSR server
//!
//! Entry point: loads configuration, sets up telemetry, and serves either the
//! dev middleware or the production edge handler.

use std::sync::Arc;

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use dotenvy::dotenv;
use tracing::info;

use novel_ssr::{config::AppConfig, server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = Arc::new(AppConfig::load()?);

    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init(config.server.json_logs);
    let metrics_handle = telemetry::install_metrics()?;

    info!(
        name: "config.loaded",
        mode = ?config.server.mode,
        index_html = %config.paths.index_html.display(),
        "Configuration loaded"
    );

    server::start_server(config, metrics_handle).await
}
