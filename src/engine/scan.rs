//! Changed-directory scan (detection phase)

use crate::types::SyncOutcome;
use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Collect source-relative subdirectories modified after `since`
///
/// The only change signal is each directory's own mtime, which moves when
/// an entry directly inside it is added, removed, or renamed - not when a
/// file's content is edited in place. Editing a file without touching its
/// directory's entry list is therefore invisible to this scan; that is
/// the accepted cost of skipping per-file stat calls across the tree.
///
/// The source root itself is counted as scanned but never selected; root
/// files are synced unconditionally by the engine instead.
pub fn scan_changed_dirs(
    source_root: &Path,
    since: DateTime<Utc>,
    outcome: &mut SyncOutcome,
) -> Vec<PathBuf> {
    let mut changed = Vec::new();

    // Standard filters off: a mirror includes hidden files and ignores
    // nothing, unlike a gitignore-aware walk.
    let walker = WalkBuilder::new(source_root).standard_filters(false).build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!(
                    "Warning: error during source traversal: {}. \
                     Scan will continue with remaining directories.",
                    e
                );
                outcome.skip(source_root.to_path_buf(), "scan", e);
                continue;
            }
        };

        let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        outcome.stats.dirs_scanned += 1;
        if entry.path() == source_root {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                eprintln!(
                    "Warning: cannot stat directory {}: {}",
                    entry.path().display(),
                    e
                );
                outcome.skip(entry.path().to_path_buf(), "scan", e);
                continue;
            }
        };

        let mtime = match metadata.modified() {
            Ok(mtime) => mtime,
            Err(e) => {
                eprintln!(
                    "Warning: no modification time for {}: {}",
                    entry.path().display(),
                    e
                );
                outcome.skip(entry.path().to_path_buf(), "scan", e);
                continue;
            }
        };

        if DateTime::<Utc>::from(mtime) > since {
            match entry.path().strip_prefix(source_root) {
                Ok(rel) => {
                    changed.push(rel.to_path_buf());
                    outcome.stats.dirs_changed += 1;
                }
                Err(_) => {
                    eprintln!(
                        "Warning: {} is outside the source root and will be skipped.",
                        entry.path().display()
                    );
                    outcome.skip(entry.path().to_path_buf(), "scan", "outside source root");
                }
            }
        }
    }

    changed
}
