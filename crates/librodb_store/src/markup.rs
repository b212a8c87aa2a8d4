//! Markup backend: one XML file per collection.
//!
//! Layout is `<books><book><field>value</field>...</book>...</books>`.
//! Absent and empty fields are written as empty elements and read back
//! through the same flat-record conventions the tabular backend uses.

use crate::backend::{upsert, StorageBackend};
use crate::error::StoreResult;
use librodb_model::{Entity, EntityId, Record};
use parking_lot::Mutex;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::io::{self, Cursor};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Stores a collection as `<collection>.xml`.
pub struct MarkupBackend<E: Entity> {
    path: PathBuf,
    lock: Mutex<()>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> MarkupBackend<E> {
    /// Opens the backend for `E` under `base_dir`, creating the directory
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(base_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(base_dir)?;
        Ok(Self {
            path: base_dir.join(format!("{}.xml", E::COLLECTION)),
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

        // No trim_text: leaf text must come back byte-for-byte, edge
        // whitespace included. Indentation between elements arrives as
        // text events with no field open and is dropped below.
        let mut reader = Reader::from_str(&content);
        let mut buf = Vec::new();

        let mut entities = Vec::new();
        let mut current: Option<Record> = None;
        let mut field: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if name == E::ITEM {
                        current = Some(Record::new());
                    } else if current.is_some() && name != E::COLLECTION {
                        field = Some(name);
                    }
                }
                Event::Empty(e) => {
                    if let Some(record) = current.as_mut() {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        record.insert(&name, "");
                    }
                }
                Event::Text(t) => {
                    if let (Some(record), Some(name)) = (current.as_mut(), field.as_ref()) {
                        record.insert(name, t.unescape()?.into_owned());
                    }
                }
                Event::End(e) => {
                    if e.name().as_ref() == E::ITEM.as_bytes() {
                        if let Some(record) = current.take() {
                            entities.push(E::from_record(&record)?);
                        }
                    }
                    field = None;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(entities)
    }

    fn write_all(&self, entities: &[E]) -> StoreResult<()> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Start(BytesStart::new(E::COLLECTION)))?;
        for entity in entities {
            let record = entity.to_record();
            writer.write_event(Event::Start(BytesStart::new(E::ITEM)))?;
            for field in E::FIELDS {
                let value = record.raw(field).unwrap_or("");
                if value.is_empty() {
                    writer.write_event(Event::Empty(BytesStart::new(*field)))?;
                } else {
                    writer.write_event(Event::Start(BytesStart::new(*field)))?;
                    writer.write_event(Event::Text(BytesText::new(value)))?;
                    writer.write_event(Event::End(BytesEnd::new(*field)))?;
                }
            }
            writer.write_event(Event::End(BytesEnd::new(E::ITEM)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(E::COLLECTION)))?;

        fs::write(&self.path, writer.into_inner().into_inner())?;
        Ok(())
    }
}

impl<E: Entity> StorageBackend<E> for MarkupBackend<E> {
    fn save(&self, entity: &E) -> StoreResult<()> {
        let _guard = self.lock.lock();
        tracing::debug!(collection = E::COLLECTION, id = %entity.id(), "markup save");
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
        tracing::debug!(collection = E::COLLECTION, %id, "markup delete");
        self.write_all(&entities)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use librodb_model::Book;
    use tempfile::TempDir;

    fn backend() -> (TempDir, MarkupBackend<Book>) {
        let dir = TempDir::new().unwrap();
        let backend = MarkupBackend::open(dir.path()).unwrap();
        (dir, backend)
    }

    fn book(title: &str) -> Book {
        Book::new(title, EntityId::new(), None, 1999, "Fiction", 320).unwrap()
    }

    #[test]
    fn roundtrip_preserves_every_field() {
        let (_dir, backend) = backend();
        let mut book = book("Blindsight");
        book.mark_borrowed(
            EntityId::new(),
            chrono::Utc::now(),
            chrono::Utc::now() + chrono::Duration::days(14),
        );
        backend.save(&book).unwrap();
        assert_eq!(backend.load(&book.id).unwrap(), Some(book));
    }

    #[test]
    fn absent_optionals_survive_as_none() {
        let (_dir, backend) = backend();
        let book = book("Solaris");
        backend.save(&book).unwrap();

        let loaded = backend.load(&book.id).unwrap().unwrap();
        assert_eq!(loaded.isbn, None);
        assert_eq!(loaded.borrowed_by, None);
        assert_eq!(loaded, book);
    }

    #[test]
    fn edge_whitespace_is_preserved() {
        let (_dir, backend) = backend();
        let mut book = book(" Padded Title ");
        book.genre = "Fiction  ".to_string();
        backend.save(&book).unwrap();

        let loaded = backend.load(&book.id).unwrap().unwrap();
        assert_eq!(loaded.title, " Padded Title ");
        assert_eq!(loaded.genre, "Fiction  ");
        assert_eq!(loaded, book);
    }

    #[test]
    fn values_are_escaped() {
        let (_dir, backend) = backend();
        let book = book("Cats & <Dogs>");
        backend.save(&book).unwrap();
        assert_eq!(backend.load(&book.id).unwrap().unwrap().title, "Cats & <Dogs>");
    }

    #[test]
    fn document_is_rooted_at_collection() {
        let (dir, backend) = backend();
        backend.save(&book("Ubik")).unwrap();

        let content = fs::read_to_string(dir.path().join("books.xml")).unwrap();
        assert!(content.starts_with("<books>"));
        assert!(content.trim_end().ends_with("</books>"));
        assert!(content.contains("<book>"));
    }

    #[test]
    fn missing_file_is_empty_collection() {
        let (_dir, backend) = backend();
        assert!(backend.load_all().unwrap().is_empty());
    }

    #[test]
    fn upsert_replaces_in_place() {
        let (_dir, backend) = backend();
        let mut book = book("Ubik");
        backend.save(&book).unwrap();
        book.pages = 224;
        backend.save(&book).unwrap();

        let all = backend.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].pages, 224);
    }
}
