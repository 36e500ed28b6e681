//! Run command: drive every configured job through the sync engine
//!
//! Jobs run sequentially in file order. One job failing - fatally or
//! with skipped items - never stops the rest, and never blocks another
//! job's timestamp from being recorded.

use crate::config::SyncJob;
use crate::engine;
use crate::state::StateStore;
use crate::types::SyncOutcome;
use chrono::{DateTime, Utc};
use console::style;
use indicatif::HumanBytes;

/// Aggregate result of a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Jobs that completed cleanly and had their timestamp recorded.
    pub succeeded: usize,
    /// Jobs that failed fatally, finished with skipped items, or could
    /// not persist their timestamp.
    pub failed: usize,
}

impl RunReport {
    /// True when every job advanced its timestamp
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Total number of jobs attempted
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Execute every job in order, recording timestamps for clean passes
pub fn run(jobs: &[SyncJob], state: &mut StateStore) -> RunReport {
    let mut report = RunReport::default();

    for job in jobs {
        let since = state.get(&job.name);
        print_job_header(job, since);

        match engine::sync(&job.source, &job.target, since) {
            Ok(outcome) => {
                print_outcome(&outcome);

                if outcome.is_clean() {
                    match state.record(&job.name, outcome.started_at) {
                        Ok(()) => {
                            println!("  Status: {}", style("ok").green());
                            report.succeeded += 1;
                        }
                        Err(e) => {
                            // The pass itself succeeded, but without a
                            // durable timestamp the next run repeats it.
                            eprintln!("Error: {}", e);
                            println!("  Status: {}", style("state not recorded").red());
                            report.failed += 1;
                        }
                    }
                } else {
                    println!(
                        "  Status: {} ({} item(s) skipped; will retry next run)",
                        style("partial failure").yellow(),
                        outcome.skipped.len()
                    );
                    report.failed += 1;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                println!("  Status: {}", style("failed").red());
                report.failed += 1;
            }
        }
    }

    print_run_footer(&report);
    report
}

fn print_job_header(job: &SyncJob, since: DateTime<Utc>) {
    println!("{}", style(format!("=== {} ===", job.name)).bold());
    println!("  Source: {}", job.source.display());
    println!("  Target: {}", job.target.display());
    if since == DateTime::UNIX_EPOCH {
        println!("  Last sync: never (full sync)");
    } else {
        println!("  Last sync: {}", since.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

fn print_outcome(outcome: &SyncOutcome) {
    let stats = &outcome.stats;
    println!(
        "  Scanned {} directories, {} changed",
        stats.dirs_scanned, stats.dirs_changed
    );
    println!(
        "  Copied {} file(s) ({}), deleted {} file(s) and {} dir(s)",
        stats.files_copied,
        HumanBytes(stats.bytes_copied),
        stats.files_deleted,
        stats.dirs_deleted
    );

    for item in &outcome.skipped {
        eprintln!(
            "  Warning: {} failed for {}: {}",
            item.action,
            item.path.display(),
            item.reason
        );
    }
}

fn print_run_footer(report: &RunReport) {
    let summary = format!(
        "Run complete: {}/{} job(s) succeeded",
        report.succeeded,
        report.total()
    );
    if report.all_succeeded() {
        println!("{}", style(summary).green());
    } else {
        println!("{}", style(summary).yellow());
    }
}
