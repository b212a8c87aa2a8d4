//! Error types for storage operations.

use librodb_model::RecordError;
use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur inside a storage backend.
///
/// Absence is never an error: `load` returns `Ok(None)` and `delete`
/// returns `Ok(false)` for an unknown id.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying medium could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The tabular file could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The document file could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The markup file could not be parsed or serialized.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The relational store failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Persisted data decoded into an invalid entity record.
    #[error("corrupt record: {0}")]
    InvalidRecord(#[from] RecordError),

    /// The requested storage format name is not recognized.
    #[error("unsupported storage format: {name}")]
    UnknownFormat {
        /// The rejected format name.
        name: String,
    },
}

impl StoreError {
    /// Creates an unknown-format error.
    pub fn unknown_format(name: impl Into<String>) -> Self {
        Self::UnknownFormat { name: name.into() }
    }
}
