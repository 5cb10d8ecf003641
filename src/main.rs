//! Hostsync - Entry point.
//!
//! Loads the configuration, runs one fetch cycle immediately and then, when an
//! interval is configured, repeats the cycle until interrupted.

use std::borrow::Cow;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hostsync::config::Config;
use hostsync::updater::Updater;

fn log_config(config: &Config) {
    info!("Starting hostsync...");
    info!("Output directory: {}", config.output_dir.display());
    info!("HTTP timeout: {} seconds", config.http_client.timeout_seconds);
    info!("Whitelist patterns: {}", config.whitelist.len());
    info!("Sources configured: {}", config.sources.len());
    for source in &config.sources {
        let format = source.output_format.map_or("none", |format| format.as_str());
        info!(url = %source.url, filename = %source.filename, format, "source");
    }
    if config.interval_seconds == 0 {
        info!("Update interval: disabled (single run)");
    } else {
        info!("Update interval: {} seconds", config.interval_seconds);
    }
}

fn log_next_update(interval: Duration) {
    match chrono::Duration::from_std(interval) {
        Ok(delta) => {
            let next = chrono::Local::now() + delta;
            info!("Next update at {}", next.to_rfc3339());
        }
        Err(err) => warn!("Cannot compute next update time: {err}"),
    }
}

async fn run() -> Result<()> {
    let config_path = std::env::var("CONFIG_PATH")
        .map(Cow::Owned)
        .unwrap_or(Cow::Borrowed("config.toml"));
    let config = Config::load(config_path.as_ref()).context("Failed to load configuration")?;

    // Initialize metrics (must be done early, before any metrics are recorded)
    hostsync::metrics::init(&config.metrics).context("Failed to initialize metrics")?;
    if config.metrics.enabled {
        info!("Metrics enabled on {}", config.metrics.listen);
    }

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create output directory {}",
                config.output_dir.display()
            )
        })?;

    log_config(&config);

    let mut updater = Updater::from_config(&config).context("Failed to create updater")?;
    let summary = updater.run_cycle(&config.sources).await;
    info!(
        written = summary.written,
        unchanged = summary.unchanged,
        not_modified = summary.not_modified,
        failed = summary.failed,
        "Initial update completed"
    );

    if config.interval_seconds == 0 {
        return Ok(());
    }

    let interval = Duration::from_secs(config.interval_seconds);
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; the initial cycle already ran.
    ticker.tick().await;
    log_next_update(interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down...");
                break;
            }
            _ = ticker.tick() => {
                let summary = updater.run_cycle(&config.sources).await;
                info!(
                    written = summary.written,
                    unchanged = summary.unchanged,
                    not_modified = summary.not_modified,
                    failed = summary.failed,
                    "Update completed"
                );
                log_next_update(interval);
            }
        }
    }

    info!("Shutdown complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    run().await
}
