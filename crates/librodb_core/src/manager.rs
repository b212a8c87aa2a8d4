//! The entity manager: one repository per entity type, one active format.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::migration::{MigrationManager, MigrationReport};
use crate::repository::Repository;
use librodb_model::Entity;
use librodb_store::{BackendFactory, Format};
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Hands out repositories bound to the active storage format.
///
/// Repositories are constructed lazily, one per entity type, and cached
/// until the format changes. [`EntityManager::set_format`] migrates all
/// data first and only then rebinds; on a failed migration the active
/// format and every cached repository stay as they were.
pub struct EntityManager {
    factory: BackendFactory,
    format: Mutex<Format>,
    repositories: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl EntityManager {
    /// Creates a manager from a configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            factory: BackendFactory::new(config.base_dir()),
            format: Mutex::new(config.format()),
            repositories: Mutex::new(HashMap::new()),
        }
    }

    /// The currently active storage format.
    #[must_use]
    pub fn format(&self) -> Format {
        *self.format.lock()
    }

    /// Returns the repository for entity type `E`, creating it on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    pub fn repository<E: Entity>(&self) -> CoreResult<Arc<Repository<E>>> {
        let format = self.format.lock();
        let mut repositories = self.repositories.lock();

        if let Some(cached) = repositories.get(&TypeId::of::<E>()) {
            if let Ok(repository) = Arc::clone(cached).downcast::<Repository<E>>() {
                return Ok(repository);
            }
        }

        let repository = Arc::new(Repository::new(self.factory.open::<E>(*format)?));
        repositories.insert(
            TypeId::of::<E>(),
            Arc::clone(&repository) as Arc<dyn Any + Send + Sync>,
        );
        Ok(repository)
    }

    /// Migrates all collections into `to` and makes it the active format.
    ///
    /// The switch happens only after every collection has been copied;
    /// cached repositories are then discarded so subsequent
    /// [`EntityManager::repository`] calls bind to the new format.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Migration`] on a failed copy. The active
    /// format is left unchanged; retrying is safe because every copy is
    /// an upsert.
    pub fn set_format(&self, to: Format) -> Result<MigrationReport, CoreError> {
        let mut format = self.format.lock();
        let from = *format;
        if from == to {
            return Ok(MigrationReport {
                from,
                to,
                migrated: Vec::new(),
            });
        }

        let report = MigrationManager::new(self.factory.clone()).migrate_all(from, to)?;

        self.repositories.lock().clear();
        *format = to;
        info!(%from, %to, total = report.total(), "storage format switched");
        Ok(report)
    }
}
