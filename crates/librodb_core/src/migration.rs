//! Copying collections between storage formats.

use crate::error::CoreError;
use librodb_model::{Author, Book, Category, Entity, Loan, User};
use librodb_store::{BackendFactory, Format, StoreError};
use tracing::info;

/// What a completed migration copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Source format.
    pub from: Format,
    /// Destination format.
    pub to: Format,
    /// `(collection, entity count)` per copied collection, in order.
    pub migrated: Vec<(&'static str, usize)>,
}

impl MigrationReport {
    fn new(from: Format, to: Format) -> Self {
        Self {
            from,
            to,
            migrated: Vec::new(),
        }
    }

    /// Total number of entities copied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.migrated.iter().map(|(_, count)| count).sum()
    }
}

/// Copies entity collections from one format to another.
///
/// A migration never deletes source data and every destination write is
/// an upsert, so a failed run can simply be retried. Cross-collection
/// atomicity is out of scope; on failure the report in the error says
/// which collections already made it.
pub struct MigrationManager {
    factory: BackendFactory,
}

impl MigrationManager {
    /// Creates a manager migrating under the factory's base directory.
    #[must_use]
    pub fn new(factory: BackendFactory) -> Self {
        Self { factory }
    }

    /// Copies one collection from `from` to `to`, returning the number of
    /// entities copied.
    ///
    /// # Errors
    ///
    /// Returns the first storage failure; already-copied entities stay in
    /// the destination.
    pub fn migrate<E: Entity>(&self, from: Format, to: Format) -> Result<usize, StoreError> {
        let source = self.factory.open::<E>(from)?;
        let destination = self.factory.open::<E>(to)?;

        let entities = source.load_all()?;
        for entity in &entities {
            destination.save(entity)?;
        }
        info!(
            collection = E::COLLECTION,
            %from,
            %to,
            count = entities.len(),
            "collection migrated"
        );
        Ok(entities.len())
    }

    /// Copies every collection from `from` to `to`, stopping at the first
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Migration`] naming the completed collections
    /// and the one that failed.
    pub fn migrate_all(&self, from: Format, to: Format) -> Result<MigrationReport, CoreError> {
        let mut report = MigrationReport::new(from, to);
        self.step::<Author>(&mut report)?;
        self.step::<Category>(&mut report)?;
        self.step::<Book>(&mut report)?;
        self.step::<User>(&mut report)?;
        self.step::<Loan>(&mut report)?;
        Ok(report)
    }

    fn step<E: Entity>(&self, report: &mut MigrationReport) -> Result<(), CoreError> {
        match self.migrate::<E>(report.from, report.to) {
            Ok(count) => {
                report.migrated.push((E::COLLECTION, count));
                Ok(())
            }
            Err(source) => {
                let completed: Vec<&'static str> =
                    report.migrated.iter().map(|(name, _)| *name).collect();
                Err(CoreError::migration(completed, E::COLLECTION, source))
            }
        }
    }
}
