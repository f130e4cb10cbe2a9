use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::services::ledger_service::LedgerService;

use super::format;
use super::traits::LedgerStore;

/// High-level storage operations: save/load the ledger to/from bytes
/// or files in the TSIM container format.
pub struct StorageManager;

impl StorageManager {
    /// Serialize a ledger to raw bytes (portable, platform-independent).
    ///
    /// Flow: Ledger → bincode → TSIM container bytes
    pub fn save_to_bytes(ledger: &Ledger) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(ledger)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))?;
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }

    /// Deserialize a ledger from raw bytes.
    ///
    /// Flow: TSIM bytes → parse header → bincode → Ledger → invariant check
    ///
    /// A file whose contents violate ledger invariants (negative cash,
    /// zero-quantity holdings, duplicate transaction ids) is rejected
    /// with `InvalidState` rather than loaded.
    pub fn load_from_bytes(data: &[u8]) -> Result<Ledger, CoreError> {
        let (_header, payload) = format::read_file(data)?;
        let ledger: Ledger = bincode::deserialize(payload)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize ledger: {e}")))?;
        LedgerService::validate(&ledger)?;
        Ok(ledger)
    }

    /// Save the ledger to a file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(ledger: &Ledger, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(ledger)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load the ledger from a file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Ledger, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes)
    }
}

/// File-backed implementation of the `LedgerStore` contract.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileStore {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl LedgerStore for FileStore {
    fn save(&self, ledger: &Ledger) -> Result<(), CoreError> {
        StorageManager::save_to_file(ledger, &self.path)
    }

    fn load(&self) -> Result<Option<Ledger>, CoreError> {
        if !self.path.exists() {
            return Ok(None); // first run
        }
        StorageManager::load_from_file(&self.path).map(Some)
    }
}
