use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod api;
mod config;
mod engine;
mod evaluate;
mod metrics;
mod models;
mod probe;
mod reporter;
mod scheduler;

use crate::config::MonitorConfig;
use crate::engine::Engine;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config = MonitorConfig::load(&config_path)?;

    init_logging(&config)?;

    info!(
        "Health monitor starting: {} app targets every {}s, system metrics every {}s",
        config.apps.targets.len(),
        config.apps.check_interval_secs,
        config.system.check_interval_secs
    );

    let mut engine = Engine::new(&config);
    engine.start_all()?;

    let state = engine.state();
    let api_port = config.api_port;
    tokio::spawn(async move {
        api::start_server(api_port, state).await;
    });

    signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping monitors...");
    engine.stop_all().await;

    Ok(())
}

fn init_logging(config: &MonitorConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let console = tracing_subscriber::fmt::layer().with_ansi(true);
    let registry = tracing_subscriber::registry().with(filter).with(console);

    match &config.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Arc::new(file))
                        .with_ansi(false),
                )
                .init();
        }
        None => registry.init(),
    }
    Ok(())
}
