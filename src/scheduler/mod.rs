//! Background maintenance tasks
//!
//! - Finished-job sweeper (registry retention)

mod job_sweeper;

pub use job_sweeper::{JobSweeper, SWEEP_INTERVAL};
