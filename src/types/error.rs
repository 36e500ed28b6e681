//! Error types for mirra

use std::path::PathBuf;
use thiserror::Error;

/// Error types for mirra operations
#[derive(Debug, Error)]
pub enum MirraError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration (CLI arguments, job file, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source root cannot be enumerated; fatal for that job only
    #[error("Source unreadable: {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Target root cannot be created or entered; fatal for that job only
    #[error("Target unavailable: {path}: {source}")]
    TargetUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file could not be persisted; the old record stays durable
    #[error("State persistence failed: {path}: {source}")]
    State {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MirraError {
    /// Check if this error aborts a single job rather than the whole run
    pub fn is_job_fatal(&self) -> bool {
        matches!(
            self,
            MirraError::SourceUnreadable { .. } | MirraError::TargetUnavailable { .. }
        )
    }

    /// Check if this error is a configuration problem
    pub fn is_config_error(&self) -> bool {
        matches!(self, MirraError::Config(_))
    }
}
