//! Outcome reporting for a single sync pass

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Counters accumulated over one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Directories visited by the change scan (root included).
    pub dirs_scanned: u64,
    /// Directories whose mtime crossed the last-sync timestamp.
    pub dirs_changed: u64,
    /// Files copied (root files plus changed-directory contents).
    pub files_copied: u64,
    /// Aggregate bytes copied.
    pub bytes_copied: u64,
    /// Stale files removed from the target.
    pub files_deleted: u64,
    /// Stale directories removed from the target.
    pub dirs_deleted: u64,
    /// Per-item failures that were skipped over.
    pub errors: u64,
}

/// A single item the pass failed to process and skipped over.
///
/// Skips are warnings, not pass aborts, but any skip marks the pass dirty
/// so the caller retries the item on the next run.
#[derive(Debug, Clone)]
pub struct SkippedItem {
    /// Absolute path of the item.
    pub path: PathBuf,
    /// Operation that failed ("copy", "delete", "scan").
    pub action: &'static str,
    /// Underlying error, formatted.
    pub reason: String,
}

/// Result of one sync pass for one job.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Wall-clock time captured before phase 1. This is the value to
    /// persist as the job's last-sync timestamp: source changes made
    /// while the pass runs stay newer than it and are picked up next run.
    pub started_at: DateTime<Utc>,
    /// Counters for the pass.
    pub stats: SyncStats,
    /// Itemized per-item failures.
    pub skipped: Vec<SkippedItem>,
}

impl SyncOutcome {
    /// Create an outcome stamped with the pass start time.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            stats: SyncStats::default(),
            skipped: Vec::new(),
        }
    }

    /// True when every item was processed; only then may the stored
    /// timestamp advance.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.stats.errors == 0
    }

    /// Record a per-item failure and keep going.
    pub fn skip(&mut self, path: PathBuf, action: &'static str, reason: impl ToString) {
        self.stats.errors += 1;
        self.skipped.push(SkippedItem {
            path,
            action,
            reason: reason.to_string(),
        });
    }
}
