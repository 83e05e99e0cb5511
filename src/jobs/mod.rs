//! Scrape job lifecycle
//!
//! `JobController` spawns one task per job; progress lives in the shared
//! `JobRegistry`, which the API handlers and the sweeper read.

mod controller;
mod registry;
mod status;

use crate::error::Result;
use crate::scraper::ConnectionConfig;

pub use controller::{JobController, JobHandle};
pub use registry::{JobRegistry, StopFlag, StopOutcome};
pub use status::{JobError, JobState, JobStatus};

/// Read access to configured connections
pub trait ConnectionStore: Send + Sync {
    fn get_connection(&self, id: i64) -> Result<Option<ConnectionConfig>>;
}
