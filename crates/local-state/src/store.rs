//! Named string slots backed by a directory or by memory

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{Result, StorageError};

/// Result of reading a slot
///
/// Keeps "nothing stored" apart from "could not read" so callers can log the
/// difference even when they treat both the same way.
#[derive(Debug)]
pub enum SlotRead {
    Present(String),
    Absent,
    Failed(StorageError),
}

impl SlotRead {
    pub fn present(self) -> Option<String> {
        match self {
            SlotRead::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// String-keyed slot storage
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> SlotRead;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// One file per slot inside a data directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        debug!(dir = ?dir, "Opened local state directory");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> SlotRead {
        if let Err(e) = validate_key(key) {
            return SlotRead::Failed(e);
        }
        match std::fs::read_to_string(self.slot_path(key)) {
            Ok(value) => SlotRead::Present(value),
            Err(e) if e.kind() == ErrorKind::NotFound => SlotRead::Absent,
            Err(e) => SlotRead::Failed(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        // Write-then-rename so a crash never leaves a half-written slot
        let tmp = self.dir.join(format!(".{key}.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, self.slot_path(key))?;
        Ok(())
    }
}

/// In-memory slots, lost on restart
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> SlotRead {
        match self.slots.lock() {
            Ok(slots) => match slots.get(key) {
                Some(value) => SlotRead::Present(value.clone()),
                None => SlotRead::Absent,
            },
            Err(_) => SlotRead::Failed(StorageError::Poisoned),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
