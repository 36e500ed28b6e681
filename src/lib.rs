//! # mirra - Directory-Level Mirror Sync
//!
//! Mirrors source directory trees into target trees using directory
//! modification timestamps as the only change signal: no database, no
//! content hashing, no per-file stat sweep. Detection is fast and simple
//! at the cost of re-copying every file in a directory whose entry list
//! churned, and of missing in-place content edits that leave the
//! containing directory's mtime untouched (a documented limitation).
//!
//! Well suited to nested collections - ebook libraries, photo archives,
//! document trees - where files are grouped into small directories.

// Module declarations
pub mod commands;
pub mod config;
pub mod engine;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use config::SyncJob;
pub use state::StateStore;
pub use types::{MirraError, SkippedItem, SyncOutcome, SyncStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
