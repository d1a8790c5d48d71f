//! Flat-file storage for the order ledger
//!
//! The whole ledger (players + orders) is serialized on every save and
//! overwrites the previous file. There is no write-ahead log: a crash
//! between a mutation and the next save loses that mutation.
//!
//! # Durability
//!
//! Writes go to `<file>.tmp` first and are then renamed over the target,
//! so a crash mid-write never leaves a truncated ledger behind.

use shared::order::LedgerData;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Load/save seam for the ledger
pub trait LedgerStorage: Send + Sync {
    /// Read the raw ledger structure
    fn load(&self) -> StorageResult<LedgerData>;

    /// Replace the stored ledger with `data`
    fn save(&self, data: &LedgerData) -> StorageResult<()>;
}

/// Ledger stored as a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LedgerStorage for JsonFileStorage {
    fn load(&self) -> StorageResult<LedgerData> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Ledger file not found, starting empty");
                return Ok(LedgerData::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save(&self, data: &LedgerData) -> StorageResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }

        let bytes = serde_json::to_vec_pretty(data)?;

        // Atomic write: tmp file + rename
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, &bytes).map_err(|e| self.io_error(e))?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(e));
        }

        tracing::debug!(
            path = %self.path.display(),
            orders = data.orders.len(),
            players = data.players.len(),
            "Ledger saved"
        );
        Ok(())
    }
}

/// In-memory storage (for testing)
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: parking_lot::Mutex<LedgerData>,
    saves: std::sync::atomic::AtomicUsize,
    fail_saves: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn with_data(data: LedgerData) -> Self {
        Self {
            data: parking_lot::Mutex::new(data),
            ..Default::default()
        }
    }

    /// Last saved contents
    pub fn data(&self) -> LedgerData {
        self.data.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Make every following save fail with an I/O error
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl LedgerStorage for MemoryStorage {
    fn load(&self) -> StorageResult<LedgerData> {
        Ok(self.data.lock().clone())
    }

    fn save(&self, data: &LedgerData) -> StorageResult<()> {
        if self.fail_saves.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StorageError::Io {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::other("save disabled"),
            });
        }
        *self.data.lock() = data.clone();
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
