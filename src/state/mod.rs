//! Last-sync state store
//!
//! A single JSON file maps job names to the start time of their most
//! recent successful pass. The file is read once per run and rewritten
//! in full after each job succeeds, always through a temp file plus
//! rename so a reader never observes a half-written record.

use crate::types::MirraError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Durable name -> last-sync timestamp store
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    entries: BTreeMap<String, DateTime<Utc>>,
}

impl StateStore {
    /// Load the store from disk
    ///
    /// A missing or unparsable file degrades to an empty store (every job
    /// then syncs from the epoch). Loading never fails the run.
    pub fn load(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    eprintln!(
                        "Warning: state file {} is not valid JSON: {}. \
                         Starting from empty state; all jobs will do a full sync.",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                eprintln!(
                    "Warning: cannot read state file {}: {}. \
                     Starting from empty state; all jobs will do a full sync.",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    /// Last-sync timestamp for a job, or the Unix epoch if never synced
    pub fn get(&self, name: &str) -> DateTime<Utc> {
        self.entries
            .get(name)
            .copied()
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Record a job's last-sync timestamp and persist the full map
    ///
    /// On persistence failure the in-memory entry is rolled back to its
    /// prior value and the previously durable file is left untouched.
    /// The rollback keeps memory and disk in agreement: a job reported
    /// as "state not recorded" must not have its timestamp smuggled to
    /// disk by a later job's successful flush.
    pub fn record(&mut self, name: &str, timestamp: DateTime<Utc>) -> Result<(), MirraError> {
        let previous = self.entries.insert(name.to_string(), timestamp);

        if let Err(e) = self.persist() {
            match previous {
                Some(prev) => {
                    self.entries.insert(name.to_string(), prev);
                }
                None => {
                    self.entries.remove(name);
                }
            }
            return Err(e);
        }

        Ok(())
    }

    /// Path of the durable record (for reporting)
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), MirraError> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| self.state_err(io::Error::other(e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.state_err(e))?;
            }
        }

        // Write-then-rename: the durable file is replaced in one rename,
        // and the temp file is removed on every failure path.
        let tmp_path = self.path.with_extension("json.tmp");
        let written = write_durable(&tmp_path, json.as_bytes())
            .and_then(|()| fs::rename(&tmp_path, &self.path));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.state_err(e));
        }

        Ok(())
    }

    fn state_err(&self, source: io::Error) -> MirraError {
        MirraError::State {
            path: self.path.clone(),
            source,
        }
    }
}

fn write_durable(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}
