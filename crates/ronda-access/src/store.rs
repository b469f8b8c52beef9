//! Backing stores for the access list.
//!
//! The on-disk format is a pretty-printed JSON array of digit-only phone
//! numbers, rewritten in full on every mutation. The file is created with
//! an empty array on first open. A crash mid-write can corrupt the store;
//! repair is out of scope.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Errors from access-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("access file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("access file is not a JSON array of strings: {0}")]
    Format(#[from] serde_json::Error),

    #[error("number already present: {0}")]
    Duplicate(String),
}

/// Backing store for the ordered access list.
///
/// Implementations keep the in-memory list authoritative and persist on
/// every mutation. Insertion order is preserved; duplicates are rejected.
pub trait AccessStore: Send {
    /// Snapshot of the list in insertion order.
    fn list(&self) -> Vec<String>;

    /// Whether the exact number is present.
    fn contains(&self, number: &str) -> bool;

    /// Append a number and persist. Fails on duplicates.
    fn add(&mut self, number: String) -> Result<(), StoreError>;

    /// Remove a number and persist. Returns `false` if it was absent
    /// (the file is left untouched in that case).
    fn remove(&mut self, number: &str) -> Result<bool, StoreError>;

    /// Current entry count.
    fn len(&self) -> usize;

    /// Whether the list is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// File-backed store: a JSON array mirrored in memory.
#[derive(Debug)]
pub struct JsonAccessStore {
    path: PathBuf,
    entries: Vec<String>,
}

impl JsonAccessStore {
    /// Open the store at `path`, creating it with an empty array if absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&path, "[]")?;
            info!(path = %path.display(), "access file created");
            Vec::new()
        };

        debug!(path = %path.display(), entries = entries.len(), "access store opened");
        Ok(Self { path, entries })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the whole file from the in-memory list.
    fn persist(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl AccessStore for JsonAccessStore {
    fn list(&self) -> Vec<String> {
        self.entries.clone()
    }

    fn contains(&self, number: &str) -> bool {
        self.entries.iter().any(|n| n == number)
    }

    fn add(&mut self, number: String) -> Result<(), StoreError> {
        if self.contains(&number) {
            return Err(StoreError::Duplicate(number));
        }
        self.entries.push(number);
        self.persist()
    }

    fn remove(&mut self, number: &str) -> Result<bool, StoreError> {
        let before = self.entries.len();
        self.entries.retain(|n| n != number);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Memory-only store for tests and dry runs. Same semantics as the file
/// store, minus the file.
#[derive(Debug, Default)]
pub struct MemoryAccessStore {
    entries: Vec<String>,
}

impl MemoryAccessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store.
    pub fn with_entries(entries: Vec<String>) -> Self {
        Self { entries }
    }
}

impl AccessStore for MemoryAccessStore {
    fn list(&self) -> Vec<String> {
        self.entries.clone()
    }

    fn contains(&self, number: &str) -> bool {
        self.entries.iter().any(|n| n == number)
    }

    fn add(&mut self, number: String) -> Result<(), StoreError> {
        if self.contains(&number) {
            return Err(StoreError::Duplicate(number));
        }
        self.entries.push(number);
        Ok(())
    }

    fn remove(&mut self, number: &str) -> Result<bool, StoreError> {
        let before = self.entries.len();
        self.entries.retain(|n| n != number);
        Ok(self.entries.len() != before)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
