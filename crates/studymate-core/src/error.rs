//! Core error types for studymate-core.
//!
//! Three failure classes exist in the engine: storage failures (the
//! persistence collaborator is unavailable or holds a corrupt
//! snapshot), validation failures (a caller handed us an invalid
//! preference value), and plain IO/serialization errors. Malformed
//! telemetry input -- an unrecognized emotion label, an out-of-range
//! confidence, an unknown achievement id -- is never an error: the
//! specific datum is dropped and the engine keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studymate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence-specific errors.
///
/// A storage failure never corrupts in-memory state: mutating
/// operations apply in memory first and the caller retries the save.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// The persisted progress snapshot could not be decoded
    #[error("Corrupt progress snapshot: {0}")]
    CorruptSnapshot(String),

    /// The progress snapshot could not be encoded for saving
    #[error("Failed to encode progress snapshot: {0}")]
    EncodeFailed(String),

    /// Failed to load the preferences file
    #[error("Failed to load preferences from {path}: {message}")]
    PrefsLoadFailed { path: PathBuf, message: String },

    /// Failed to save the preferences file
    #[error("Failed to save preferences to {path}: {message}")]
    PrefsSaveFailed { path: PathBuf, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
