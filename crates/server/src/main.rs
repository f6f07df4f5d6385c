mod bootstrap;
mod health;
mod render;

use anyhow::Result;
use dopgen_core::config::{AppConfig, LoadOptions};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) {
    use dopgen_core::config::LogFormat::*;

    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    if let Some(port) = app.config.server.health_check_port {
        health::spawn(
            &app.config.server.bind_address,
            port,
            health::HealthState::new(app.catalog.clone()),
        )
        .await?;
    }

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        clients = app.catalog.clients.len(),
        products = app.catalog.products.len(),
        locations = app.catalog.locations.len(),
        "dopgen-server started"
    );

    tokio::select! {
        result = app.runner.start() => {
            result?;
            tracing::warn!(
                event_name = "system.server.polling_stopped",
                correlation_id = "runtime",
                "telegram polling stopped; waiting for shutdown signal"
            );
            wait_for_shutdown().await?;
        }
        result = wait_for_shutdown() => result?,
    }

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "dopgen-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
