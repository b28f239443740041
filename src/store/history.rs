//! Bounded on-disk history of readings.

use std::collections::VecDeque;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::data::Reading;

use super::StoreError;

/// Maximum number of readings retained.
pub const HISTORY_CAPACITY: usize = 200;

/// Append-only, capacity-bounded log of readings with FIFO eviction.
///
/// Readings are kept oldest-first; when an append pushes the log past
/// [`HISTORY_CAPACITY`], entries are dropped from the head. Every
/// successful append rewrites the whole backing file, so the persisted
/// log always reflects the post-eviction state.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Mutex<VecDeque<Reading>>,
}

impl HistoryStore {
    /// Open the store, loading the persisted log.
    ///
    /// A missing file yields an empty log; an unparsable one is logged
    /// and also yields an empty log. A persisted log longer than the
    /// capacity (hand-edited, or written by an older build) is trimmed
    /// from the head on load.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut entries = load_entries(&path)?;
        while entries.len() > HISTORY_CAPACITY {
            entries.pop_front();
        }
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// The file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a reading, evicting from the head past capacity.
    ///
    /// The write-through happens before this returns: on `Ok` the file
    /// reflects the new log, on `Err` the in-memory log has still
    /// advanced and the next successful append will persist it.
    pub async fn append(&self, reading: Reading) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.push_back(reading);
        while entries.len() > HISTORY_CAPACITY {
            entries.pop_front();
        }
        self.persist(&entries)
    }

    /// A snapshot of the log, oldest first.
    pub async fn list(&self) -> Vec<Reading> {
        self.entries.lock().await.iter().cloned().collect()
    }

    /// Number of retained readings.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn persist(&self, entries: &VecDeque<Reading>) -> Result<(), StoreError> {
        let ordered: Vec<&Reading> = entries.iter().collect();
        let json = serde_json::to_string_pretty(&ordered)?;
        fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn load_entries(path: &Path) -> Result<VecDeque<Reading>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(VecDeque::new()),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_str::<Vec<Reading>>(&content) {
        Ok(entries) => Ok(entries.into()),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Unparsable history file, starting fresh");
            Ok(VecDeque::new())
        }
    }
}
