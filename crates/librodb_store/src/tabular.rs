//! Tabular backend: one CSV file per collection with a header row.

use crate::backend::{upsert, StorageBackend};
use crate::error::StoreResult;
use librodb_model::{Entity, EntityId, Record};
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Stores a collection as `<collection>.csv`. The first row is the field
/// header; every entity is one row, with optional fields written as empty
/// cells.
pub struct TabularBackend<E: Entity> {
    path: PathBuf,
    lock: Mutex<()>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> TabularBackend<E> {
    /// Opens the backend for `E` under `base_dir`, creating the directory
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(base_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(base_dir)?;
        Ok(Self {
            path: base_dir.join(format!("{}.csv", E::COLLECTION)),
            lock: Mutex::new(()),
            _entity: PhantomData,
        })
    }

    fn read_all(&self) -> StoreResult<Vec<E>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(file);
        let headers = reader.headers()?.clone();
        let mut entities = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut record = Record::new();
            for (field, value) in headers.iter().zip(row.iter()) {
                record.insert(field, value);
            }
            entities.push(E::from_record(&record)?);
        }
        Ok(entities)
    }

    fn write_all(&self, entities: &[E]) -> StoreResult<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(E::FIELDS)?;
        for entity in entities {
            let record = entity.to_record();
            let row: Vec<&str> = E::FIELDS
                .iter()
                .map(|field| record.raw(field).unwrap_or(""))
                .collect();
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl<E: Entity> StorageBackend<E> for TabularBackend<E> {
    fn save(&self, entity: &E) -> StoreResult<()> {
        let _guard = self.lock.lock();
        tracing::debug!(collection = E::COLLECTION, id = %entity.id(), "tabular save");
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
        tracing::debug!(collection = E::COLLECTION, %id, "tabular delete");
        self.write_all(&entities)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use librodb_model::{Loan, Role, User};
    use tempfile::TempDir;

    #[test]
    fn roundtrip_with_quoting_and_optionals() {
        let dir = TempDir::new().unwrap();
        let backend: TabularBackend<User> = TabularBackend::open(dir.path()).unwrap();

        let mut user = User::new(
            "Ada, \"the first\"",
            Some("ada@example.org".to_string()),
            Role::Librarian,
        )
        .unwrap();
        user.borrowed_books = vec![EntityId::from("b1"), EntityId::from("b2")];
        backend.save(&user).unwrap();

        let loaded = backend.load(&user.id).unwrap().unwrap();
        assert_eq!(loaded, user);
        assert_eq!(loaded.borrowed_books.len(), 2);
    }

    #[test]
    fn header_row_matches_field_order() {
        let dir = TempDir::new().unwrap();
        let backend: TabularBackend<Loan> = TabularBackend::open(dir.path()).unwrap();

        let now = Utc::now();
        let loan = Loan::new(
            EntityId::new(),
            EntityId::new(),
            now,
            now + chrono::Duration::days(14),
        );
        backend.save(&loan).unwrap();

        let content = fs::read_to_string(dir.path().join("loans.csv")).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, Loan::FIELDS.join(","));
    }

    #[test]
    fn missing_file_is_empty_collection() {
        let dir = TempDir::new().unwrap();
        let backend: TabularBackend<Loan> = TabularBackend::open(dir.path()).unwrap();
        assert!(backend.load_all().unwrap().is_empty());
    }

    #[test]
    fn delete_rewrites_remaining_rows() {
        let dir = TempDir::new().unwrap();
        let backend: TabularBackend<User> = TabularBackend::open(dir.path()).unwrap();

        let a = User::new("A", None, Role::User).unwrap();
        let b = User::new("B", None, Role::User).unwrap();
        backend.save(&a).unwrap();
        backend.save(&b).unwrap();

        assert!(backend.delete(&a.id).unwrap());
        let remaining = backend.load_all().unwrap();
        assert_eq!(remaining, vec![b]);
    }
}
