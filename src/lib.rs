//! Symbol Scraper - market-snapshot scraping job runner
//!
//! Walks the active cash-equity symbol universe, fetches a quote page per
//! symbol from a configured provider, and appends the extracted metrics to
//! a unified DuckDB time-series table. Jobs are started, stopped and polled
//! over a small REST API.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod scheduler;
pub mod scraper;
pub mod state;

use api::ApiServer;
use error::Result;
use scheduler::JobSweeper;
use state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHUTDOWN_SLACK_SECS: u64 = 5;

/// Initialize and run the service until Ctrl-C
pub async fn run() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "symbol_scraper=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Symbol Scraper...");

    let state = Arc::new(AppState::new(config::data_dir_from_env())?);
    tracing::info!("Application state initialized");

    let sweeper = JobSweeper::new(state.jobs.clone(), state.retention()).start();

    let mut server = ApiServer::new();
    server
        .start(state.clone(), &state.settings.api_host, state.settings.api_port)
        .await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    server.stop();
    sweeper.abort();

    // In-flight fetches are bounded by the fetch timeout
    let grace = Duration::from_secs(state.settings.fetch_timeout_secs + SHUTDOWN_SLACK_SECS);
    let still_running = state.controller.shutdown(grace).await;
    if still_running > 0 {
        tracing::warn!("{} jobs did not stop within {:?}", still_running, grace);
    }

    Ok(())
}
