//! Sync engine - one four-phase pass per job
//!
//! Phase order is fixed: root-file sync, changed-directory scan,
//! directory sync, target cleanup. Each phase finishes before the next
//! starts and everything runs on the caller's thread.

mod cleanup;
mod copy;
mod scan;

pub use copy::copy_file;
pub use scan::scan_changed_dirs;

use crate::types::{MirraError, SyncOutcome};
use chrono::Utc;
use std::fs;
use std::path::Path;

/// Run one sync pass: mirror `source_root` into `target_root`
///
/// `since` is the job's last recorded sync time; only subdirectories
/// whose mtime crossed it are re-copied. Root files are copied on every
/// pass, and cleanup always runs in full.
///
/// The returned outcome carries the pass start time - the caller persists
/// that (not the finish time) so source changes made while the pass ran
/// are still newer than the recorded timestamp on the next run. Per-item
/// failures are skipped and itemized; `Err` is reserved for roots that
/// cannot be enumerated or created at all.
pub fn sync(
    source_root: &Path,
    target_root: &Path,
    since: chrono::DateTime<Utc>,
) -> Result<SyncOutcome, MirraError> {
    let started_at = Utc::now();

    let root_entries = fs::read_dir(source_root).map_err(|e| MirraError::SourceUnreadable {
        path: source_root.to_path_buf(),
        source: e,
    })?;
    fs::create_dir_all(target_root).map_err(|e| MirraError::TargetUnavailable {
        path: target_root.to_path_buf(),
        source: e,
    })?;

    let mut outcome = SyncOutcome::new(started_at);

    // Phase 1: root files, unconditionally.
    sync_root_files(root_entries, source_root, target_root, &mut outcome);

    // Phase 2: detection.
    let changed_dirs = scan::scan_changed_dirs(source_root, since, &mut outcome);

    // Phase 3: copy the direct contents of each changed directory. Nested
    // subdirectories are not recursed into here; the scan already listed
    // them as their own entries.
    for rel in &changed_dirs {
        sync_directory(source_root, target_root, rel, &mut outcome);
    }

    // Phase 4: reconcile deletions.
    cleanup::cleanup_target(source_root, target_root, &mut outcome);

    Ok(outcome)
}

/// Copy every file directly inside the source root (phase 1)
///
/// Root files are few and cheap, and the root's own mtime is awkward as a
/// change signal, so they are re-copied on every pass.
fn sync_root_files(
    entries: fs::ReadDir,
    source_root: &Path,
    target_root: &Path,
    outcome: &mut SyncOutcome,
) {
    copy_dir_files(entries, target_root, outcome);

    // Keep the target root's mtime matching the source root so the trees
    // stay comparable. Failure here costs re-work, not correctness.
    if let Err(e) = copy::mirror_dir_mtime(source_root, target_root) {
        eprintln!(
            "Warning: could not preserve timestamp for {}: {}",
            target_root.display(),
            e
        );
    }
}

/// Copy every file directly inside one changed directory (phase 3)
fn sync_directory(
    source_root: &Path,
    target_root: &Path,
    rel: &Path,
    outcome: &mut SyncOutcome,
) {
    let source_dir = source_root.join(rel);
    let target_dir = target_root.join(rel);

    if let Err(e) = fs::create_dir_all(&target_dir) {
        eprintln!(
            "Warning: cannot create directory {}: {}",
            target_dir.display(),
            e
        );
        outcome.skip(target_dir, "copy", e);
        return;
    }

    let entries = match fs::read_dir(&source_dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!(
                "Warning: cannot read directory {}: {}",
                source_dir.display(),
                e
            );
            outcome.skip(source_dir, "copy", e);
            return;
        }
    };

    copy_dir_files(entries, &target_dir, outcome);

    // Keep the mirrored directory's timestamp matching the source;
    // see copy::mirror_dir_mtime for the rationale.
    if let Err(e) = copy::mirror_dir_mtime(&source_dir, &target_dir) {
        eprintln!(
            "Warning: could not preserve timestamp for {}: {}",
            target_dir.display(),
            e
        );
    }
}

/// Copy the plain files from one directory listing into `target_dir`,
/// overwriting unconditionally. Subdirectory entries are left alone.
fn copy_dir_files(entries: fs::ReadDir, target_dir: &Path, outcome: &mut SyncOutcome) {
    for result in entries {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("Warning: error reading directory entry: {}", e);
                outcome.skip(target_dir.to_path_buf(), "copy", e);
                continue;
            }
        };

        let src_path = entry.path();
        // Follows symlinks: a link to a file mirrors as the file content.
        let is_file = match fs::metadata(&src_path) {
            Ok(metadata) => metadata.is_file(),
            Err(e) => {
                eprintln!("Warning: cannot stat {}: {}", src_path.display(), e);
                outcome.skip(src_path, "copy", e);
                continue;
            }
        };
        if !is_file {
            continue;
        }

        let dest_path = target_dir.join(entry.file_name());
        match copy::copy_file(&src_path, &dest_path) {
            Ok(bytes) => {
                outcome.stats.files_copied += 1;
                outcome.stats.bytes_copied += bytes;
            }
            Err(e) => {
                eprintln!("Warning: cannot copy {}: {}", src_path.display(), e);
                outcome.skip(src_path, "copy", e);
            }
        }
    }
}
