//! Configuration management
//!
//! Jobs come from a TOML file of `[[job]]` tables. The loader hands the
//! run command an already-validated, immutable job list; nothing else in
//! the crate touches the file format.

use crate::types::MirraError;
use clap::Parser;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Command-line interface for mirra
#[derive(Debug, Parser)]
#[command(
    name = "mirra",
    version,
    about = "Directory-level mirror sync - fast change detection, no database, no hashing"
)]
pub struct Cli {
    /// Path to the TOML job file
    #[arg(short, long, default_value = "mirra.toml")]
    pub config: PathBuf,

    /// Path to the last-sync state file
    #[arg(short, long, default_value = ".mirra_state.json")]
    pub state: PathBuf,

    /// Run only the named job(s); may be repeated
    #[arg(short, long)]
    pub job: Vec<String>,
}

/// One named source -> target sync job
///
/// Immutable for the duration of a run. The name doubles as the key in
/// the state store, so it must be unique across the job file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SyncJob {
    /// Unique job name (state-store key)
    pub name: String,

    /// Directory to mirror from (never mutated)
    pub source: PathBuf,

    /// Directory to mirror into
    pub target: PathBuf,
}

#[derive(Debug, Deserialize)]
struct JobFile {
    #[serde(default)]
    job: Vec<SyncJob>,
}

/// Load and validate the job list from a TOML file
pub fn load_jobs(path: &Path) -> Result<Vec<SyncJob>, MirraError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        MirraError::Config(format!("Cannot read job file {}: {}", path.display(), e))
    })?;

    let file: JobFile = toml::from_str(&raw).map_err(|e| {
        MirraError::Config(format!("Cannot parse job file {}: {}", path.display(), e))
    })?;

    validate_jobs(&file.job)?;
    Ok(file.job)
}

/// Validate a job list
///
/// Rejects an empty list, empty or duplicate names, and jobs whose
/// source and target are the same path.
pub fn validate_jobs(jobs: &[SyncJob]) -> Result<(), MirraError> {
    if jobs.is_empty() {
        return Err(MirraError::Config(
            "Job file contains no [[job]] entries".to_string(),
        ));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for job in jobs {
        if job.name.is_empty() {
            return Err(MirraError::Config(
                "Job name must not be empty".to_string(),
            ));
        }
        if !seen.insert(job.name.as_str()) {
            return Err(MirraError::Config(format!(
                "Duplicate job name: {}",
                job.name
            )));
        }
        if job.source == job.target {
            return Err(MirraError::Config(format!(
                "Job {}: source and target cannot be the same path",
                job.name
            )));
        }
    }

    Ok(())
}

/// Filter the job list down to the names requested on the CLI
///
/// An empty selection means "run everything". Requesting a name that is
/// not in the file is a configuration error, not a silent no-op.
pub fn select_jobs(jobs: Vec<SyncJob>, names: &[String]) -> Result<Vec<SyncJob>, MirraError> {
    if names.is_empty() {
        return Ok(jobs);
    }

    let known: HashSet<&str> = jobs.iter().map(|j| j.name.as_str()).collect();
    for name in names {
        if !known.contains(name.as_str()) {
            return Err(MirraError::Config(format!("Unknown job name: {}", name)));
        }
    }

    Ok(jobs
        .into_iter()
        .filter(|j| names.iter().any(|n| n == &j.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn job(name: &str, source: &str, target: &str) -> SyncJob {
        SyncJob {
            name: name.to_string(),
            source: PathBuf::from(source),
            target: PathBuf::from(target),
        }
    }

    #[test]
    fn test_load_jobs_from_toml() {
        let mut file = NamedTempFile::new().expect("create temp job file");
        writeln!(
            file,
            r#"
[[job]]
name = "books"
source = "/data/books"
target = "/backup/books"

[[job]]
name = "photos"
source = "/data/photos"
target = "/backup/photos"
"#
        )
        .expect("write job file");

        let jobs = load_jobs(file.path()).expect("load should succeed");
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "books");
        assert_eq!(jobs[0].source, PathBuf::from("/data/books"));
        assert_eq!(jobs[1].name, "photos");
    }

    #[test]
    fn test_load_jobs_missing_file() {
        let err = load_jobs(Path::new("/nonexistent/mirra.toml")).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("Cannot read job file"));
    }

    #[test]
    fn test_load_jobs_bad_toml() {
        let mut file = NamedTempFile::new().expect("create temp job file");
        writeln!(file, "not [ valid toml").expect("write job file");

        let err = load_jobs(file.path()).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("Cannot parse job file"));
    }

    #[test]
    fn test_validate_rejects_empty_list() {
        let err = validate_jobs(&[]).unwrap_err();
        assert!(err.to_string().contains("no [[job]] entries"));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let jobs = vec![job("a", "/s1", "/t1"), job("a", "/s2", "/t2")];
        let err = validate_jobs(&jobs).unwrap_err();
        assert!(err.to_string().contains("Duplicate job name: a"));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let jobs = vec![job("", "/s", "/t")];
        let err = validate_jobs(&jobs).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_validate_rejects_source_equals_target() {
        let jobs = vec![job("same", "/data", "/data")];
        let err = validate_jobs(&jobs).unwrap_err();
        assert!(err.to_string().contains("source and target"));
    }

    #[test]
    fn test_select_jobs_empty_selection_keeps_all() {
        let jobs = vec![job("a", "/s1", "/t1"), job("b", "/s2", "/t2")];
        let selected = select_jobs(jobs.clone(), &[]).expect("select should succeed");
        assert_eq!(selected, jobs);
    }

    #[test]
    fn test_select_jobs_filters_by_name() {
        let jobs = vec![job("a", "/s1", "/t1"), job("b", "/s2", "/t2")];
        let selected =
            select_jobs(jobs, &["b".to_string()]).expect("select should succeed");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "b");
    }

    #[test]
    fn test_select_jobs_unknown_name_is_error() {
        let jobs = vec![job("a", "/s1", "/t1")];
        let err = select_jobs(jobs, &["missing".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown job name: missing"));
    }
}
