//! # Weather Gateway Server
//!
//! ## Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin weather-gateway
//!
//! # Run with specific environment
//! WEATHER_GATEWAY_ENV=production cargo run --bin weather-gateway
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use weather_gateway::bootstrap;
use weather_gateway::config::ConfigManager;
use weather_gateway::logging;
use weather_gateway::web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    info!("Starting Weather Gateway...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "   Build Mode: {}",
        if cfg!(debug_assertions) {
            "Debug"
        } else {
            "Release"
        }
    );

    let config_manager = ConfigManager::load().context("Failed to load configuration")?;
    info!("   Environment: {}", config_manager.environment());

    let handle = bootstrap::bootstrap(&config_manager)
        .await
        .context("Failed to initialize gateway services")?;

    let bind_address = config_manager.config().server.bind_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("   Listening on {}", bind_address);
    info!("   Press Ctrl+C to shutdown gracefully");

    let app = web::create_app(handle.state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    handle.stop();
    info!("Weather Gateway shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
