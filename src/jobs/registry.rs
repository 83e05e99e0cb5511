//! In-memory registry of scrape jobs and their stop flags

use super::{JobState, JobStatus};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between the registry and a job task
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Flag set; the job stops before its next symbol
    Requested,
    /// Job had already reached a terminal state
    AlreadyFinished(JobState),
}

struct JobEntry {
    status: JobStatus,
    stop: StopFlag,
}

/// Job id -> status and stop flag.
///
/// Each entry is guarded by its DashMap shard lock, so every update to a
/// single job is serialized.
#[derive(Default)]
pub struct JobRegistry {
    jobs: DashMap<String, JobEntry>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh job and return its stop flag
    pub fn register(&self, status: JobStatus) -> StopFlag {
        let stop = StopFlag::new();
        self.jobs.insert(
            status.job_id.clone(),
            JobEntry {
                status,
                stop: stop.clone(),
            },
        );
        stop
    }

    /// Apply a mutation to a job's status under its entry lock
    pub fn update<F>(&self, job_id: &str, f: F) -> Option<JobStatus>
    where
        F: FnOnce(&mut JobStatus),
    {
        self.jobs.get_mut(job_id).map(|mut entry| {
            f(&mut entry.status);
            entry.status.clone()
        })
    }

    pub fn get(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.get(job_id).map(|entry| entry.status.clone())
    }

    /// All known jobs, oldest first
    pub fn list(&self) -> Vec<JobStatus> {
        let mut jobs: Vec<JobStatus> = self.jobs.iter().map(|e| e.status.clone()).collect();
        jobs.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.job_id.cmp(&b.job_id)));
        jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Set the stop flag. Idempotent; a no-op for finished jobs.
    pub fn request_stop(&self, job_id: &str) -> Result<StopOutcome> {
        let entry = self
            .jobs
            .get(job_id)
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

        if entry.status.is_terminal() {
            return Ok(StopOutcome::AlreadyFinished(entry.status.status));
        }

        entry.stop.request();
        Ok(StopOutcome::Requested)
    }

    /// Drop terminal jobs that finished more than `retention` before `now`
    pub fn evict_finished(&self, retention: chrono::Duration, now: DateTime<Utc>) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|_, entry| match entry.status.finished_at {
            Some(finished_at) if entry.status.is_terminal() => now - finished_at < retention,
            _ => true,
        });
        before - self.jobs.len()
    }
}
