//! Job status and its state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Lifecycle state of a scrape job. Every state but `Processing` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Processing,
    Completed,
    Failed,
    Stopped,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Processing)
    }
}

/// Short per-symbol failure sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub symbol: String,
    pub message: String,
}

/// Live progress snapshot of one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub connection_id: i64,
    pub status: JobState,
    pub total_symbols: usize,
    pub symbols_processed: usize,
    pub symbols_succeeded: usize,
    pub symbols_failed: usize,
    pub total_records_inserted: usize,
    pub percentage: f64,
    pub errors: VecDeque<JobError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
    #[serde(skip)]
    max_errors: usize,
}

impl JobStatus {
    pub fn new(job_id: impl Into<String>, connection_id: i64, max_errors: usize) -> Self {
        Self {
            job_id: job_id.into(),
            connection_id,
            status: JobState::Processing,
            total_symbols: 0,
            symbols_processed: 0,
            symbols_succeeded: 0,
            symbols_failed: 0,
            total_records_inserted: 0,
            percentage: 0.0,
            errors: VecDeque::new(),
            started_at: Utc::now(),
            finished_at: None,
            message: None,
            max_errors,
        }
    }

    pub fn begin(&mut self, total_symbols: usize) {
        self.total_symbols = total_symbols;
    }

    pub fn record_success(&mut self, records_inserted: usize) {
        if self.is_full() {
            return;
        }
        self.symbols_processed += 1;
        self.symbols_succeeded += 1;
        self.total_records_inserted += records_inserted;
        self.recompute_percentage();
    }

    pub fn record_failure(&mut self, symbol: &str, message: impl Into<String>) {
        if self.is_full() {
            return;
        }
        self.symbols_processed += 1;
        self.symbols_failed += 1;
        self.push_error(symbol, message.into());
        self.recompute_percentage();
    }

    /// Move to a terminal state. Returns false if the job already finished.
    pub fn finish(&mut self, state: JobState, message: Option<String>) -> bool {
        if self.status.is_terminal() || !state.is_terminal() {
            return false;
        }
        self.status = state;
        self.message = message;
        self.finished_at = Some(Utc::now());
        if state == JobState::Completed {
            self.percentage = 100.0;
        }
        true
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn is_full(&self) -> bool {
        self.status.is_terminal() || self.symbols_processed >= self.total_symbols
    }

    /// Oldest entry is evicted once the cap is reached
    fn push_error(&mut self, symbol: &str, message: String) {
        if self.max_errors == 0 {
            return;
        }
        while self.errors.len() >= self.max_errors {
            self.errors.pop_front();
        }
        self.errors.push_back(JobError {
            symbol: symbol.to_string(),
            message,
        });
    }

    fn recompute_percentage(&mut self) {
        self.percentage = if self.total_symbols == 0 {
            0.0
        } else {
            let raw = self.symbols_processed as f64 / self.total_symbols as f64 * 100.0;
            (raw * 100.0).round() / 100.0
        };
    }
}
