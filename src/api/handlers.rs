//! REST API endpoint handlers
//!
//! Handlers are thin: they validate input, call the job controller or the
//! SQLite store, and wrap the result in the response envelope. Errors are
//! returned as `AppError`, which renders itself as a JSON error response.

use crate::api::types::*;
use crate::db::sqlite::models::{ScraperSettings, SettingsUpdate};
use crate::error::{AppError, Result};
use crate::jobs::{JobState, JobStatus, StopOutcome};
use crate::scraper::ConnectionConfig;
use crate::state::AppState;
use axum::{
    extract::{Json, Path, State as AxumState},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::info;

type ApiResult<T> = Result<Json<ApiResponse<T>>>;

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint - GET /health or GET /
pub async fn health_check() -> Json<ApiResponse<Empty>> {
    Json(ApiResponse::success_with_message("Symbol scraper API is running"))
}

// ============================================================================
// Scrape Jobs
// ============================================================================

/// Start a scrape job - POST /api/v1/scrape/start
pub async fn start_scrape(
    AxumState(state): AxumState<Arc<AppState>>,
    Json(request): Json<StartScrapeRequest>,
) -> ApiResult<StartScrapeData> {
    if request.connection_id <= 0 {
        return Err(AppError::Validation(
            "connection_id must be a positive integer".to_string(),
        ));
    }

    // The completion handle is dropped; the job keeps running detached
    let handle = state.controller.start(request.connection_id)?;
    info!(
        "Scrape job {} started via API for connection {}",
        handle.job_id, request.connection_id
    );

    Ok(Json(ApiResponse::success_with_both(
        "Scrape job started",
        StartScrapeData {
            job_id: handle.job_id,
            connection_id: request.connection_id,
            status: JobState::Processing,
        },
    )))
}

/// Request a job stop - POST /api/v1/scrape/stop
pub async fn stop_scrape(
    AxumState(state): AxumState<Arc<AppState>>,
    Json(request): Json<StopScrapeRequest>,
) -> ApiResult<StopScrapeData> {
    let job_id = request.job_id.trim();
    if job_id.is_empty() {
        return Err(AppError::Validation("job_id is required".to_string()));
    }

    let (message, stop_requested, status) = match state.controller.stop(job_id)? {
        StopOutcome::Requested => (
            "Stop requested; the job ends after the current symbol".to_string(),
            true,
            JobState::Processing,
        ),
        StopOutcome::AlreadyFinished(finished) => {
            (format!("Job already finished ({:?})", finished), false, finished)
        }
    };

    Ok(Json(ApiResponse::success_with_both(
        &message,
        StopScrapeData {
            job_id: job_id.to_string(),
            stop_requested,
            status,
        },
    )))
}

/// Job status - GET /api/v1/scrape/status/:job_id
pub async fn get_job_status(
    AxumState(state): AxumState<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<JobStatus> {
    let status = state.controller.get_status(&job_id)?;
    Ok(Json(ApiResponse::success_with_data(status)))
}

/// All retained jobs - GET /api/v1/scrape/jobs
pub async fn list_jobs(AxumState(state): AxumState<Arc<AppState>>) -> ApiResult<Vec<JobStatus>> {
    Ok(Json(ApiResponse::success_with_data(state.controller.list_jobs())))
}

// ============================================================================
// Connections
// ============================================================================

/// GET /api/v1/connections
pub async fn list_connections(
    AxumState(state): AxumState<Arc<AppState>>,
) -> ApiResult<Vec<ConnectionConfig>> {
    Ok(Json(ApiResponse::success_with_data(state.sqlite.list_connections()?)))
}

/// POST /api/v1/connections
pub async fn create_connection(
    AxumState(state): AxumState<Arc<AppState>>,
    Json(request): Json<CreateConnectionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ConnectionConfig>>)> {
    let id = state.sqlite.insert_connection(
        &request.name,
        &request.base_url_template,
        request.connection_type,
    )?;
    let connection = state
        .sqlite
        .get_connection(id)?
        .ok_or_else(|| AppError::Internal(format!("Connection {} vanished after insert", id)))?;

    info!("Created connection {} ({})", connection.id, connection.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_data(connection)),
    ))
}

// ============================================================================
// Settings
// ============================================================================

/// GET /api/v1/settings
pub async fn get_settings(AxumState(state): AxumState<Arc<AppState>>) -> ApiResult<ScraperSettings> {
    Ok(Json(ApiResponse::success_with_data(state.sqlite.get_settings()?)))
}

/// POST /api/v1/settings - applied on next start
pub async fn update_settings(
    AxumState(state): AxumState<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<ScraperSettings> {
    let settings = state.sqlite.update_settings(update)?;
    Ok(Json(ApiResponse::success_with_both(
        "Settings saved; restart to apply",
        settings,
    )))
}
