//! The persistence seam for progress state.
//!
//! The engine takes a `ProgressStore` as an injected collaborator:
//! load once at startup, save after every mutating operation. Stores
//! are synchronous and must round-trip every field of the state
//! losslessly, bounded histories included.

use std::sync::Mutex;

use crate::error::StorageError;
use crate::progress::ProgressState;

/// Synchronous load/save contract for one user's progress.
pub trait ProgressStore: Send {
    /// Load the persisted state, `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<ProgressState>, StorageError>;

    /// Persist the full state.
    fn save(&self, state: &ProgressState) -> Result<(), StorageError>;
}

/// In-memory store for tests and store-less embedding.
///
/// Goes through the serialized representation so the round-trip is
/// exercised the same way the database store does it.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Option<ProgressState>, StorageError> {
        let guard = self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_deref() {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| StorageError::CorruptSnapshot(e.to_string())),
        }
    }

    fn save(&self, state: &ProgressState) -> Result<(), StorageError> {
        let raw = serde_json::to_string(state)
            .map_err(|e| StorageError::EncodeFailed(e.to_string()))?;
        let mut guard = self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(raw);
        Ok(())
    }
}
