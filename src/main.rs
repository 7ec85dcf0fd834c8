//! GreenForce Monitor - Main Entry Point
//!
//! Terminal client for the GreenForce sustainability dashboard

use anyhow::Context;
use greenforce_monitor::app::application::run_app;
use greenforce_monitor::domain::config::AppConfig;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = init_tracing(&config);

    tracing::info!("Starting GreenForce Monitor...");
    run_app(config).await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let Some(dir) = &config.log_dir else {
        tracing_subscriber::registry().with(console).init();
        return None;
    };

    let appender = tracing_appender::rolling::daily(dir, "greenforce-monitor.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter());

    tracing_subscriber::registry().with(console).with(file).init();
    Some(guard)
}
