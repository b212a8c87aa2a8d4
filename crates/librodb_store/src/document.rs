//! Document backend: one pretty-printed JSON file per collection.

use crate::backend::{upsert, StorageBackend};
use crate::error::StoreResult;
use librodb_model::{Entity, EntityId};
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Stores a collection as `<collection>.json` with the shape
/// `{ "<collection>": [ ... ] }`.
///
/// A missing file, or a file whose root lacks the collection key, reads
/// as an empty collection.
pub struct DocumentBackend<E: Entity> {
    path: PathBuf,
    lock: Mutex<()>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> DocumentBackend<E> {
    /// Opens the backend for `E` under `base_dir`, creating the directory
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(base_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(base_dir)?;
        Ok(Self {
            path: base_dir.join(format!("{}.json", E::COLLECTION)),
            lock: Mutex::new(()),
            _entity: PhantomData,
        })
    }

    fn read_all(&self) -> StoreResult<Vec<E>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let root: serde_json::Value = serde_json::from_str(&content)?;
        match root.get(E::COLLECTION) {
            Some(items) => Ok(serde_json::from_value(items.clone())?),
            None => Ok(Vec::new()),
        }
    }

    fn write_all(&self, entities: &[E]) -> StoreResult<()> {
        let mut root = serde_json::Map::new();
        root.insert(E::COLLECTION.to_string(), serde_json::to_value(entities)?);
        let content = serde_json::to_string_pretty(&serde_json::Value::Object(root))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl<E: Entity> StorageBackend<E> for DocumentBackend<E> {
    fn save(&self, entity: &E) -> StoreResult<()> {
        let _guard = self.lock.lock();
        tracing::debug!(collection = E::COLLECTION, id = %entity.id(), "document save");
        let mut entities = self.read_all()?;
        upsert(&mut entities, entity.clone());
        self.write_all(&entities)
    }

    fn load(&self, id: &EntityId) -> StoreResult<Option<E>> {
        Ok(self.read_all()?.into_iter().find(|e| e.id() == id))
    }

    fn load_all(&self) -> StoreResult<Vec<E>> {
        self.read_all()
    }

    fn delete(&self, id: &EntityId) -> StoreResult<bool> {
        let _guard = self.lock.lock();
        let mut entities = self.read_all()?;
        let before = entities.len();
        entities.retain(|e| e.id() != id);
        if entities.len() == before {
            return Ok(false);
        }
        tracing::debug!(collection = E::COLLECTION, %id, "document delete");
        self.write_all(&entities)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use librodb_model::Author;
    use tempfile::TempDir;

    fn backend() -> (TempDir, DocumentBackend<Author>) {
        let dir = TempDir::new().unwrap();
        let backend = DocumentBackend::open(dir.path()).unwrap();
        (dir, backend)
    }

    #[test]
    fn file_is_keyed_by_collection_name() {
        let (dir, backend) = backend();
        let author = Author::new("Ursula K. Le Guin", "American", "").unwrap();
        backend.save(&author).unwrap();

        let content = fs::read_to_string(dir.path().join("authors.json")).unwrap();
        let root: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(root.get("authors").unwrap().is_array());
        assert_eq!(root["authors"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn roundtrip_and_upsert() {
        let (_dir, backend) = backend();
        let mut author = Author::new("N. K. Jemisin", "American", "").unwrap();
        backend.save(&author).unwrap();

        author.biography = "Hugo award winner".to_string();
        backend.save(&author).unwrap();

        let all = backend.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], author);
    }

    #[test]
    fn root_without_collection_key_reads_empty() {
        let (dir, backend) = backend();
        fs::write(dir.path().join("authors.json"), "{}").unwrap();
        assert!(backend.load_all().unwrap().is_empty());
    }

    #[test]
    fn delete_unknown_id_is_false() {
        let (_dir, backend) = backend();
        assert!(!backend.delete(&EntityId::new()).unwrap());
    }
}
