//! # OrderDesk Web Server
//!
//! ## Usage
//! ```bash
//! # Defaults, or ~/.config/orderdesk/orderdesk.toml when present
//! cargo run -p orderdesk-web
//!
//! # Explicit config file
//! cargo run -p orderdesk-web -- --config ./orderdesk.toml
//!
//! # Environment overrides
//! ORDERDESK_PORT=9000 ORDERDESK_DB_PATH=./dev.db cargo run -p orderdesk-web
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use orderdesk_db::Database;
use orderdesk_web::{build_router, init_tracing, views, AppConfig, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("OrderDesk Web Server");
                println!();
                println!("Usage: orderdesk-web [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                println!();
                println!("Environment: ORDERDESK_DB_PATH, ORDERDESK_PORT, ORDERDESK_BIND_ADDR, RUST_LOG");
                return Ok(());
            }
            other => {
                anyhow::bail!("Unknown argument '{}', see --help", other);
            }
        }
        i += 1;
    }

    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "Starting OrderDesk");

    let config = AppConfig::load(config_path).context("Failed to load configuration")?;
    info!(
        bind = %config.server.bind_address(),
        db = %config.database.path.display(),
        page_size = config.listing.page_size,
        "Configuration loaded"
    );

    views::check().context("Failed to compile templates")?;

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;

    let state = AppState::new(db.clone(), config.listing.page_size);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address()))?;
    info!(addr = %config.server.bind_address(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
