//! Target cleanup (reconciliation phase)
//!
//! Deletes every target path with no counterpart under the source root.
//! Runs unconditionally on every pass: deletions in source do not
//! reliably bump ancestor mtimes, so the change scan alone cannot drive
//! the deletion side of the mirror.

use crate::types::SyncOutcome;
use ignore::WalkBuilder;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Remove target files and directories that no longer exist in source
///
/// Files go first, then stale directories deepest-first so every
/// directory is empty by the time it is considered. A directory that is
/// still non-empty (because one of its children failed to delete) is
/// itself recorded as a skipped item rather than force-removed.
pub fn cleanup_target(source_root: &Path, target_root: &Path, outcome: &mut SyncOutcome) {
    if !target_root.exists() {
        return;
    }

    let (source_files, source_dirs) = collect_source_paths(source_root, outcome);

    let mut stale_dirs: Vec<PathBuf> = Vec::new();

    for result in WalkBuilder::new(target_root).standard_filters(false).build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!(
                    "Warning: error during target traversal: {}. \
                     Cleanup will continue with remaining entries.",
                    e
                );
                outcome.skip(target_root.to_path_buf(), "scan", e);
                continue;
            }
        };

        if entry.path() == target_root {
            continue;
        }

        let rel = match entry.path().strip_prefix(target_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };

        let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        if is_dir {
            if !source_dirs.contains(&rel) {
                stale_dirs.push(rel);
            }
        } else if !source_files.contains(&rel) {
            match fs::remove_file(entry.path()) {
                Ok(()) => outcome.stats.files_deleted += 1,
                Err(e) => {
                    eprintln!("Warning: cannot delete {}: {}", entry.path().display(), e);
                    outcome.skip(entry.path().to_path_buf(), "delete", e);
                }
            }
        }
    }

    // Children before parents: deepest paths first.
    stale_dirs.sort_by_key(|rel| Reverse(rel.components().count()));

    for rel in stale_dirs {
        let abs = target_root.join(&rel);
        match fs::remove_dir(&abs) {
            Ok(()) => outcome.stats.dirs_deleted += 1,
            Err(e) => {
                eprintln!("Warning: cannot delete directory {}: {}", abs.display(), e);
                outcome.skip(abs, "delete", e);
            }
        }
    }
}

/// One walk over source building the file and directory manifests
/// cleanup compares the target against.
fn collect_source_paths(
    source_root: &Path,
    outcome: &mut SyncOutcome,
) -> (HashSet<PathBuf>, HashSet<PathBuf>) {
    let mut files = HashSet::new();
    let mut dirs = HashSet::new();

    for result in WalkBuilder::new(source_root).standard_filters(false).build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!(
                    "Warning: error during source traversal: {}. \
                     Cleanup manifest may be incomplete; keeping extra target entries.",
                    e
                );
                outcome.skip(source_root.to_path_buf(), "scan", e);
                continue;
            }
        };

        if entry.path() == source_root {
            continue;
        }

        let rel = match entry.path().strip_prefix(source_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            dirs.insert(rel);
        } else {
            files.insert(rel);
        }
    }

    (files, dirs)
}
