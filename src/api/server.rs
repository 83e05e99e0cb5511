//! HTTP server for the job control API

use crate::api::handlers;
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the API router over shared state
pub fn build_router(state: Arc<AppState>) -> Router {
    // Build CORS layer (allow all for local tooling)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ================================================================
        // Health check
        // ================================================================
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::health_check))

        // ================================================================
        // Scrape jobs
        // ================================================================
        .route("/api/v1/scrape/start", post(handlers::start_scrape))
        .route("/api/v1/scrape/stop", post(handlers::stop_scrape))
        .route("/api/v1/scrape/status/:job_id", get(handlers::get_job_status))
        .route("/api/v1/scrape/jobs", get(handlers::list_jobs))

        // ================================================================
        // Connections and settings
        // ================================================================
        .route(
            "/api/v1/connections",
            get(handlers::list_connections).post(handlers::create_connection),
        )
        .route(
            "/api/v1/settings",
            get(handlers::get_settings).post(handlers::update_settings),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// API server manager
#[derive(Default)]
pub struct ApiServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: Option<SocketAddr>,
}

impl ApiServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind and serve in a background task. Returns the bound address,
    /// which differs from the requested one when port 0 is used.
    pub async fn start(&mut self, state: Arc<AppState>, host: &str, port: u16) -> Result<SocketAddr> {
        if self.is_running() {
            return Err(AppError::Internal("API server already running".to_string()));
        }

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address {}:{}: {}", host, port, e)))?;

        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            });

            if let Err(e) = server.await {
                error!("API server error: {}", e);
            }
        });

        info!("Symbol scraper API listening on {}", local_addr);
        info!("  GET  http://{}/health", local_addr);
        info!("  POST http://{}/api/v1/scrape/start", local_addr);
        info!("  POST http://{}/api/v1/scrape/stop", local_addr);
        info!("  GET  http://{}/api/v1/scrape/status/{{job_id}}", local_addr);
        info!("  GET  http://{}/api/v1/scrape/jobs", local_addr);

        Ok(local_addr)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("API server stop signal sent");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}
