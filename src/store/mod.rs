//! Durable storage for the two shared records: alert state and history.
//!
//! Both stores load their record once when opened (an absent or
//! unparsable file yields defaults), keep it in memory behind a mutex,
//! and write the whole file back on every mutation. The mutex serializes
//! concurrent read-modify-write cycles so a manual poll racing a
//! scheduled one cannot lose updates.

mod history;
mod state;

pub use history::{HistoryStore, HISTORY_CAPACITY};
pub use state::StateStore;

use std::path::PathBuf;

use thiserror::Error;

/// Durable read or write failure for a persisted record.
///
/// An absent record is not an error (defaults are synthesized); this
/// covers genuinely broken storage such as bad permissions or a full
/// disk.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the record file failed for a reason other than absence.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the record file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the record as JSON failed.
    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}
