//! Generic repository over a storage backend.

use crate::error::CoreResult;
use librodb_model::{Entity, EntityId};
use librodb_store::{Criteria, StorageBackend};

/// A typed repository for one entity collection.
///
/// Thin layer over a [`StorageBackend`] that adds what storage should not
/// know about: validation before every write and the `updated_at` touch.
pub struct Repository<E: Entity> {
    backend: Box<dyn StorageBackend<E>>,
}

impl<E: Entity> Repository<E> {
    /// Wraps a backend.
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend<E>>) -> Self {
        Self { backend }
    }

    /// Validates, touches `updated_at`, and upserts the entity.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is written, or a store
    /// error if the write fails.
    pub fn save(&self, entity: &mut E) -> CoreResult<()> {
        entity.validate()?;
        entity.touch();
        self.backend.save(entity)?;
        Ok(())
    }

    /// Loads an entity by id; `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn get(&self, id: &EntityId) -> CoreResult<Option<E>> {
        Ok(self.backend.load(id)?)
    }

    /// Loads the whole collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn get_all(&self) -> CoreResult<Vec<E>> {
        Ok(self.backend.load_all()?)
    }

    /// Deletes by id, reporting whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn delete(&self, id: &EntityId) -> CoreResult<bool> {
        Ok(self.backend.delete(id)?)
    }

    /// Whether an entity with this id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn exists(&self, id: &EntityId) -> CoreResult<bool> {
        Ok(self.backend.exists(id)?)
    }

    /// Finds entities matching all criteria fields by equality.
    ///
    /// Linear in collection size on the file backends; the relational
    /// backend answers with a `WHERE` clause.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn find_by(&self, criteria: &Criteria) -> CoreResult<Vec<E>> {
        Ok(self.backend.search(criteria)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use librodb_model::Book;
    use librodb_store::{BackendFactory, Format};
    use tempfile::TempDir;

    fn repo(dir: &TempDir) -> Repository<Book> {
        let backend = BackendFactory::new(dir.path())
            .open::<Book>(Format::Text)
            .unwrap();
        Repository::new(backend)
    }

    #[test]
    fn save_touches_updated_at() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let mut book = Book::new("Title", EntityId::new(), None, 2020, "Essay", 50).unwrap();
        let before = book.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(5));
        repo.save(&mut book).unwrap();
        assert!(book.updated_at > before);

        let stored = repo.get(&book.id).unwrap().unwrap();
        assert_eq!(stored.updated_at, book.updated_at);
    }

    #[test]
    fn save_rejects_invalid_without_writing() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let mut book = Book::new("Title", EntityId::new(), None, 2020, "Essay", 50).unwrap();
        book.title = String::new();
        let err = repo.save(&mut book).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn never_saved_id_is_none() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);
        assert_eq!(repo.get(&EntityId::new()).unwrap(), None);
        assert!(!repo.exists(&EntityId::new()).unwrap());
    }

    #[test]
    fn find_by_filters_on_equality() {
        let dir = TempDir::new().unwrap();
        let repo = repo(&dir);

        let author = EntityId::new();
        let mut a = Book::new("A", author.clone(), None, 2020, "Essay", 50).unwrap();
        let mut b = Book::new("B", EntityId::new(), None, 2020, "Essay", 50).unwrap();
        repo.save(&mut a).unwrap();
        repo.save(&mut b).unwrap();

        let hits = repo
            .find_by(&Criteria::new().eq("author_id", author.as_str()))
            .unwrap();
        assert_eq!(hits, vec![a]);
    }
}
