//! PlayoffPurge dashboard server.
//!
//! Reads league data from a Google Sheet and serves it as HTML and JSON.

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use playoffpurge_core::{Config, LeagueCache, SheetsClient, SnapshotSource};
use playoffpurge_web::{build_router, AppState, SiteSettings};

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes buffered log lines on drop, so keep it alive
/// for the life of the process.
fn init_tracing() -> WorkerGuard {
    // RUST_LOG controls the level, e.g. RUST_LOG=playoffpurge_core=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = tracing_appender::non_blocking(io::stdout());
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();

    let config = Config::from_env().context("Invalid configuration")?;
    info!(sheet_id = %config.sheet_id, "PlayoffPurge starting");
    if config.uses_default_admin_password() {
        warn!("ADMIN_PASSWORD is the default; set it before exposing /refresh");
    }

    let client = SheetsClient::from_config(&config).context("Failed to set up Sheets client")?;
    let source: Arc<dyn SnapshotSource> = Arc::new(client);
    let cache = Arc::new(LeagueCache::new(source, config.cache_ttl));
    info!(ttl_secs = cache.ttl().as_secs(), "League cache ready");

    // Warm the cache; a failure here is not fatal, requests retry the fetch
    if let Err(e) = cache.snapshot().await {
        warn!(error = %e, kind = e.kind(), "Initial league load failed");
    }

    let state = AppState::new(cache, SiteSettings::from_config(&config));
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("PlayoffPurge stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
