//! Line-structured text backend: one JSON object per line.

use crate::backend::{upsert, StorageBackend};
use crate::error::StoreResult;
use librodb_model::{Entity, EntityId};
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Stores a collection as `<collection>.txt`, one serialized entity per
/// line. A missing file is an empty collection, never an error.
pub struct TextBackend<E: Entity> {
    path: PathBuf,
    lock: Mutex<()>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> TextBackend<E> {
    /// Opens the backend for `E` under `base_dir`, creating the directory
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(base_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(base_dir)?;
        Ok(Self {
            path: base_dir.join(format!("{}.txt", E::COLLECTION)),
            lock: Mutex::new(()),
            _entity: PhantomData,
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StoreResult<Vec<E>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entities = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            entities.push(serde_json::from_str(line)?);
        }
        Ok(entities)
    }

    fn write_all(&self, entities: &[E]) -> StoreResult<()> {
        let mut out = String::new();
        for entity in entities {
            out.push_str(&serde_json::to_string(entity)?);
            out.push('\n');
        }
        fs::write(&self.path, out)?;
        Ok(())
    }
}

impl<E: Entity> StorageBackend<E> for TextBackend<E> {
    fn save(&self, entity: &E) -> StoreResult<()> {
        let _guard = self.lock.lock();
        tracing::debug!(collection = E::COLLECTION, id = %entity.id(), "text save");
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
        tracing::debug!(collection = E::COLLECTION, %id, "text delete");
        self.write_all(&entities)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Criteria;
    use librodb_model::Book;
    use tempfile::TempDir;

    fn backend() -> (TempDir, TextBackend<Book>) {
        let dir = TempDir::new().unwrap();
        let backend = TextBackend::open(dir.path()).unwrap();
        (dir, backend)
    }

    fn book(title: &str) -> Book {
        Book::new(title, EntityId::new(), None, 2001, "Fiction", 250).unwrap()
    }

    #[test]
    fn missing_file_is_empty_collection() {
        let (_dir, backend) = backend();
        assert!(backend.load_all().unwrap().is_empty());
        assert_eq!(backend.load(&EntityId::new()).unwrap(), None);
    }

    #[test]
    fn save_then_load_roundtrip() {
        let (_dir, backend) = backend();
        let book = book("Dune");
        backend.save(&book).unwrap();
        assert_eq!(backend.load(&book.id).unwrap(), Some(book));
    }

    #[test]
    fn save_is_upsert() {
        let (_dir, backend) = backend();
        let mut book = book("Dune");
        backend.save(&book).unwrap();
        book.genre = "Science Fiction".to_string();
        backend.save(&book).unwrap();

        let all = backend.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].genre, "Science Fiction");
    }

    #[test]
    fn load_all_preserves_insertion_order() {
        let (_dir, backend) = backend();
        let titles = ["A", "B", "C"];
        for title in titles {
            backend.save(&book(title)).unwrap();
        }
        let loaded: Vec<String> = backend
            .load_all()
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(loaded, titles);
    }

    #[test]
    fn delete_reports_absence() {
        let (_dir, backend) = backend();
        let book = book("Dune");
        backend.save(&book).unwrap();

        assert!(backend.delete(&book.id).unwrap());
        assert!(!backend.delete(&book.id).unwrap());
        assert!(!backend.exists(&book.id).unwrap());
    }

    #[test]
    fn search_by_equality() {
        let (_dir, backend) = backend();
        let a = book("Dune");
        let b = book("Hyperion");
        backend.save(&a).unwrap();
        backend.save(&b).unwrap();

        let hits = backend
            .search(&Criteria::new().eq("title", "Hyperion"))
            .unwrap();
        assert_eq!(hits, vec![b]);

        let none = backend
            .search(&Criteria::new().eq("title", "Hyperion").eq("pages", 1))
            .unwrap();
        assert!(none.is_empty());
    }
}
