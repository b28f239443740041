//! Persisted alert state.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::{Mutex, MutexGuard};

use crate::data::AlertState;

use super::StoreError;

/// Durable store for the singleton [`AlertState`] record.
///
/// The record is loaded once at open and held behind a mutex. Callers
/// lock it for the whole evaluate-notify-commit cycle of a poll and call
/// [`StateStore::persist`] before releasing the guard, so the persisted
/// representation always reflects the last completed mutation.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: Mutex<AlertState>,
}

impl StateStore {
    /// Open the store, loading the persisted record.
    ///
    /// A missing file yields the default state (no observations, no
    /// alerts). An unparsable file is logged and also yields defaults;
    /// any other read failure is a [`StoreError`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let state = load_state(&path)?;
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// The file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock the state for a read-modify-write cycle.
    pub async fn lock(&self) -> MutexGuard<'_, AlertState> {
        self.state.lock().await
    }

    /// Write the given state through to disk.
    ///
    /// Callers pass the guard they already hold; the lock stays held
    /// across the write so concurrent cycles cannot interleave.
    pub fn persist(&self, state: &AlertState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// A point-in-time copy of the current state.
    pub async fn snapshot(&self) -> AlertState {
        self.state.lock().await.clone()
    }
}

fn load_state(path: &Path) -> Result<AlertState, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(AlertState::default()),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_str(&content) {
        Ok(state) => Ok(state),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Unparsable state file, starting fresh");
            Ok(AlertState::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use tempfile::tempdir;

    use crate::data::Severity;

    #[tokio::test]
    async fn missing_file_yields_default_state() {
        let dir = tempdir().unwrap();
        let store = StateStore::open(dir.path().join("state.json")).unwrap();

        assert_eq!(store.snapshot().await, AlertState::default());
    }

    #[tokio::test]
    async fn corrupt_file_yields_default_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let store = StateStore::open(&path).unwrap();
        assert_eq!(store.snapshot().await, AlertState::default());
    }

    #[tokio::test]
    async fn persisted_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = StateStore::open(&path).unwrap();
        {
            let mut state = store.lock().await;
            state.record_alert(Severity::Warning, Utc::now());
            state.record_observation(Severity::Warning);
            store.persist(&state).unwrap();
        }

        let reopened = StateStore::open(&path).unwrap();
        let state = reopened.snapshot().await;
        assert_eq!(state.last_status, Some(Severity::Warning));
        assert_eq!(state.last_alert_status, Some(Severity::Warning));
        assert!(state.last_alert_time.is_some());
    }

    #[tokio::test]
    async fn persist_to_unwritable_path_is_an_error() {
        let store = StateStore::open("/nonexistent/dir/state.json").unwrap();
        let state = store.snapshot().await;

        let err = store.persist(&state).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }
}
