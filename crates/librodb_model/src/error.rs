//! Error types for the entity model.

use thiserror::Error;

/// Errors raised when an entity fails field validation.
///
/// Validation runs at construction and again before every save, so an
/// invalid entity never reaches a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is empty or blank.
    #[error("required field is empty: {field}")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// An ISBN failed its checksum.
    #[error("invalid ISBN: {value}")]
    InvalidIsbn {
        /// The rejected ISBN as given.
        value: String,
    },

    /// An e-mail address does not match the address pattern.
    #[error("invalid e-mail address: {value}")]
    InvalidEmail {
        /// The rejected address.
        value: String,
    },
}

impl ValidationError {
    /// Creates an empty-field error.
    pub fn empty_field(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    /// Creates an invalid-ISBN error.
    pub fn invalid_isbn(value: impl Into<String>) -> Self {
        Self::InvalidIsbn {
            value: value.into(),
        }
    }

    /// Creates an invalid-e-mail error.
    pub fn invalid_email(value: impl Into<String>) -> Self {
        Self::InvalidEmail {
            value: value.into(),
        }
    }
}

/// Errors raised while decoding an entity from a flat record.
///
/// These indicate corrupt persisted data, not a caller mistake, and are
/// therefore distinct from [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid record field `{field}`: {message}")]
pub struct RecordError {
    /// The field that failed to decode.
    pub field: String,
    /// What went wrong.
    pub message: String,
}

impl RecordError {
    /// Creates a record error for a field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
