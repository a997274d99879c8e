//! Storage for call logs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::config::LogBackend;
use crate::{EvalError, EvalResult};

use super::record::CallRecord;

/// Durable home of a call log.
///
/// Stores are read and rewritten whole; callers go through
/// [`LogDestination`], which serializes the load/modify/save sequence.
pub trait LogStore: Send {
    /// Reads every record, oldest first. A store that was never written
    /// holds an empty log.
    fn load(&mut self) -> EvalResult<Vec<CallRecord>>;

    /// Replaces the stored log with `records`.
    fn save(&mut self, records: &[CallRecord]) -> EvalResult<()>;

    /// Human-readable location for log events.
    fn location(&self) -> String;
}

// ═══════════════════════════════════════════════════════════════════════════
// JSON file
// ═══════════════════════════════════════════════════════════════════════════

/// Log stored as a JSON array in a single file.
///
/// Every save writes a sibling temporary file and renames it over the log, so
/// readers never observe a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LogStore for JsonFileStore {
    fn load(&mut self) -> EvalResult<Vec<CallRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&mut self, records: &[CallRecord]) -> EvalResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(records)?;
        let temp = self.temp_path();
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// In memory
// ═══════════════════════════════════════════════════════════════════════════

/// Log kept in memory; lost when the last handle is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<CallRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for MemoryStore {
    fn load(&mut self) -> EvalResult<Vec<CallRecord>> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[CallRecord]) -> EvalResult<()> {
        self.records = records.to_vec();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Shared destination
// ═══════════════════════════════════════════════════════════════════════════

/// Reference-counted handle to a [`LogStore`].
///
/// Cloning the handle shares the store: recorders holding clones append to
/// the same log, and each append is a single locked load/push/save, so
/// concurrent appends from different threads are never lost.
#[derive(Clone)]
pub struct LogDestination {
    store: Arc<Mutex<Box<dyn LogStore>>>,
    location: String,
}

impl LogDestination {
    pub fn new<S: LogStore + 'static>(store: S) -> Self {
        let location = store.location();
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
            location,
        }
    }

    /// JSON file destination.
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFileStore::new(path))
    }

    /// In-memory destination.
    pub fn memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// SQLite destination.
    #[cfg(feature = "sqlite")]
    pub fn sqlite(path: impl AsRef<Path>) -> EvalResult<Self> {
        Ok(Self::new(super::sqlite::SqliteStore::open(path)?))
    }

    /// Destination for `backend` at `path`.
    pub fn open(backend: LogBackend, path: impl AsRef<Path>) -> EvalResult<Self> {
        match backend {
            LogBackend::Json => Ok(Self::json(path.as_ref())),
            #[cfg(feature = "sqlite")]
            LogBackend::Sqlite => Self::sqlite(path),
            #[cfg(not(feature = "sqlite"))]
            LogBackend::Sqlite => Err(EvalError::config(
                "SQLite call logs require the 'sqlite' feature",
            )),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether both handles point at the same store.
    pub fn shares_store_with(&self, other: &LogDestination) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    fn lock(&self) -> EvalResult<MutexGuard<'_, Box<dyn LogStore>>> {
        self.store
            .lock()
            .map_err(|_| EvalError::log_store(format!("lock on '{}' poisoned", self.location)))
    }

    /// All records, oldest first.
    pub fn records(&self) -> EvalResult<Vec<CallRecord>> {
        self.lock()?.load()
    }

    /// Number of records.
    pub fn len(&self) -> EvalResult<usize> {
        Ok(self.records()?.len())
    }

    pub fn is_empty(&self) -> EvalResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Truncates the log to empty.
    pub fn reset(&self) -> EvalResult<()> {
        self.lock()?.save(&[])
    }

    /// Makes sure the destination holds a log, writing an empty one if it
    /// holds nothing yet. Existing records are kept.
    pub fn ensure_initialized(&self) -> EvalResult<()> {
        let mut store = self.lock()?;
        let records = store.load()?;
        store.save(&records)
    }

    /// Appends `record` at the end of the log and rewrites the log.
    ///
    /// The record's index is set to its final position. Returns that index.
    pub fn append(&self, mut record: CallRecord) -> EvalResult<u64> {
        let mut store = self.lock()?;
        let mut records = store.load()?;
        let index = records.len() as u64;
        record.index = index;
        records.push(record);
        store.save(&records)?;
        Ok(index)
    }
}

impl fmt::Debug for LogDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogDestination")
            .field("location", &self.location)
            .finish()
    }
}
