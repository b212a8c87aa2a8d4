//! Error types for the repository and migration layer.

use librodb_model::ValidationError;
use librodb_store::StoreError;
use thiserror::Error;

/// Result type for repository and manager operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by repositories, the entity manager, and migrations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The entity failed validation before it reached storage.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A multi-collection migration stopped partway.
    ///
    /// Collections in `completed` were fully copied into the destination
    /// format; `failed` is the collection whose copy broke. Because every
    /// copy is an upsert, retrying the whole migration is safe.
    #[error("migration failed while copying `{failed}` (completed: {completed:?}): {source}")]
    Migration {
        /// Collections copied before the failure, in order.
        completed: Vec<&'static str>,
        /// The collection that failed to copy.
        failed: &'static str,
        /// The underlying storage failure.
        source: StoreError,
    },
}

impl CoreError {
    /// Creates a migration failure for the given step.
    pub fn migration(
        completed: Vec<&'static str>,
        failed: &'static str,
        source: StoreError,
    ) -> Self {
        Self::Migration {
            completed,
            failed,
            source,
        }
    }
}
