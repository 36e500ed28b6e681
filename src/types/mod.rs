//! Core type definitions for mirra

mod error;
mod summary;

pub use error::MirraError;
pub use summary::{SkippedItem, SyncOutcome, SyncStats};
