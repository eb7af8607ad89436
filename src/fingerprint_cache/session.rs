//! Run bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters for a single batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Files handed to the run
    pub discovered: usize,
    /// Files that were (re)processed
    pub processed: usize,
    /// Files skipped because their fingerprint matched the cache
    pub skipped: usize,
    /// Files left alone because every export target was disabled
    pub untargeted: usize,
    /// Renderer invocations issued
    pub exports: usize,
    /// Renderer invocations that exited non-zero
    pub failed_exports: usize,
}

/// Summary of a finished (or in-progress) batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub command: String, // "convert" or "normalize"
    pub stats: RunStats,
}

impl RunSummary {
    pub fn new(command: &str) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            command: command.to_string(),
            stats: RunStats::default(),
        }
    }

    /// Mark the run as finished
    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// Wall-clock duration, if the run has finished
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}
