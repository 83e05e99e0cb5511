//! Finished-job sweeper
//!
//! Terminal jobs stay queryable for a retention window, then are dropped
//! from the registry so it does not grow without bound. Jobs that are
//! still PROCESSING are never touched.

use crate::jobs::JobRegistry;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// How often the sweeper wakes up
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct JobSweeper {
    registry: Arc<JobRegistry>,
    retention: Duration,
    interval: Duration,
}

impl JobSweeper {
    pub fn new(registry: Arc<JobRegistry>, retention: Duration) -> Self {
        Self {
            registry,
            retention,
            interval: SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Evict jobs that finished longer ago than the retention window
    pub fn sweep_once(&self) -> usize {
        let retention = chrono::Duration::from_std(self.retention)
            .unwrap_or_else(|_| chrono::Duration::days(36_500));
        let evicted = self.registry.evict_finished(retention, Utc::now());
        if evicted > 0 {
            info!("Evicted {} finished jobs", evicted);
        }
        evicted
    }

    /// Spawn the sweep loop on the runtime
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Job sweeper started (every {}s, retention {}s)",
                self.interval.as_secs(),
                self.retention.as_secs()
            );

            let mut ticker = tokio::time::interval(self.interval);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let evicted = self.sweep_once();
                debug!("Sweep done, {} evicted, {} retained", evicted, self.registry.len());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{JobState, JobStatus};

    fn finished_job(registry: &JobRegistry, id: &str, age: chrono::Duration) {
        let mut status = JobStatus::new(id, 1, 10);
        status.finish(JobState::Completed, None);
        status.finished_at = Some(Utc::now() - age);
        registry.register(status);
    }

    #[test]
    fn test_sweep_once_respects_retention() {
        let registry = Arc::new(JobRegistry::new());
        finished_job(&registry, "old", chrono::Duration::hours(2));
        finished_job(&registry, "recent", chrono::Duration::minutes(5));
        registry.register(JobStatus::new("running", 1, 10));

        let sweeper = JobSweeper::new(registry.clone(), Duration::from_secs(3600));
        assert_eq!(sweeper.sweep_once(), 1);
        assert!(registry.get("old").is_none());
        assert!(registry.get("recent").is_some());
        assert!(registry.get("running").is_some());
    }

    #[tokio::test]
    async fn test_background_loop_evicts() {
        let registry = Arc::new(JobRegistry::new());
        finished_job(&registry, "old", chrono::Duration::seconds(10));

        let handle = JobSweeper::new(registry.clone(), Duration::from_secs(1))
            .with_interval(Duration::from_millis(20))
            .start();

        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();
        assert!(registry.is_empty());
    }
}
