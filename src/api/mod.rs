//! REST API for scrape job control
//!
//! Routes:
//! - `GET  /health`
//! - `POST /api/v1/scrape/start` `{connection_id}`
//! - `POST /api/v1/scrape/stop` `{job_id}`
//! - `GET  /api/v1/scrape/status/:job_id`
//! - `GET  /api/v1/scrape/jobs`
//! - `GET|POST /api/v1/connections`
//! - `GET|POST /api/v1/settings`

pub mod handlers;
mod server;
mod types;

pub use server::{build_router, ApiServer};
pub use types::{
    ApiResponse, CreateConnectionRequest, Empty, StartScrapeData, StartScrapeRequest,
    StopScrapeData, StopScrapeRequest,
};
