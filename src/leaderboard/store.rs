//! Record Stores
//!
//! Flat per-circuit persistence. Stores are plain load/save; callers
//! serialize read-modify-write cycles per circuit.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

use super::record::{format_records, parse_records, ScoreRecord};

/// Record store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("record store I/O error: {0}")]
    Io(#[from] io::Error),

    /// Store contents could not be decoded at all.
    #[error("corrupt record store for circuit {circuit}: {reason}")]
    Corrupt {
        /// Circuit id
        circuit: u32,
        /// What went wrong
        reason: String,
    },
}

/// Per-circuit ordered record persistence.
pub trait RecordStore: Send + Sync {
    /// Stored list for `circuit`; empty when nothing was stored yet.
    fn load(&self, circuit: u32) -> Result<Vec<ScoreRecord>, StoreError>;

    /// Replace the stored list for `circuit`.
    fn save(&self, circuit: u32, records: &[ScoreRecord]) -> Result<(), StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for std::sync::Arc<S> {
    fn load(&self, circuit: u32) -> Result<Vec<ScoreRecord>, StoreError> {
        (**self).load(circuit)
    }

    fn save(&self, circuit: u32, records: &[ScoreRecord]) -> Result<(), StoreError> {
        (**self).save(circuit, records)
    }
}

/// File name of the store for `circuit`.
pub fn records_file_name(circuit: u32) -> String {
    format!("parcours{circuit}.txt")
}

// =============================================================================
// File store
// =============================================================================

/// One `parcours{n}.txt` text file per circuit in a directory.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the store file for `circuit`.
    pub fn path_for(&self, circuit: u32) -> PathBuf {
        self.dir.join(records_file_name(circuit))
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self, circuit: u32) -> Result<Vec<ScoreRecord>, StoreError> {
        let bytes = match fs::read(self.path_for(circuit)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let text = String::from_utf8(bytes).map_err(|e| StoreError::Corrupt {
            circuit,
            reason: e.to_string(),
        })?;
        Ok(parse_records(&text))
    }

    fn save(&self, circuit: u32, records: &[ScoreRecord]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(circuit);
        let tmp = path.with_extension("txt.tmp");
        fs::write(&tmp, format_records(records))?;
        fs::rename(&tmp, &path)?;
        debug!(circuit, entries = records.len(), "records saved");
        Ok(())
    }
}

// =============================================================================
// Memory store
// =============================================================================

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    lists: RwLock<BTreeMap<u32, Vec<ScoreRecord>>>,
}

impl MemoryRecordStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with one circuit's list.
    pub fn with_records(circuit: u32, records: Vec<ScoreRecord>) -> Self {
        let store = Self::new();
        store
            .lists
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(circuit, records);
        store
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self, circuit: u32) -> Result<Vec<ScoreRecord>, StoreError> {
        let lists = self.lists.read().unwrap_or_else(|e| e.into_inner());
        Ok(lists.get(&circuit).cloned().unwrap_or_default())
    }

    fn save(&self, circuit: u32, records: &[ScoreRecord]) -> Result<(), StoreError> {
        let mut lists = self.lists.write().unwrap_or_else(|e| e.into_inner());
        lists.insert(circuit, records.to_vec());
        Ok(())
    }
}
