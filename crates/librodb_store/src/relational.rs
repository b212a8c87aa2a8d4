//! Relational backend: all collections share one SQLite database file.

use crate::backend::{Criteria, StorageBackend};
use crate::error::StoreResult;
use librodb_model::{flat_value, Entity, EntityId, Record};
use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

/// Name of the shared database file under the base directory.
pub const DATABASE_FILE: &str = "library.db";

/// Stores a collection as one table in `library.db`.
///
/// Every column is `TEXT` and carries the flat-record encoding, so a row
/// reads back through the same conventions as the tabular and markup
/// files. The table is created on open if it does not exist.
pub struct RelationalBackend<E: Entity> {
    conn: Mutex<Connection>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RelationalBackend<E> {
    /// Opens the shared database under `base_dir` and ensures the table
    /// for `E` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be opened.
    pub fn open(base_dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(base_dir)?;
        let conn = Connection::open(base_dir.join(DATABASE_FILE))?;

        let columns: Vec<String> = E::FIELDS
            .iter()
            .map(|field| {
                if *field == "id" {
                    "id TEXT PRIMARY KEY".to_string()
                } else {
                    format!("{field} TEXT NOT NULL")
                }
            })
            .collect();
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                E::COLLECTION,
                columns.join(", ")
            ),
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            _entity: PhantomData,
        })
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Record> {
        let mut record = Record::new();
        for (i, field) in E::FIELDS.iter().enumerate() {
            let value: String = row.get(i)?;
            record.insert(field, value);
        }
        Ok(record)
    }

    fn select_clause() -> String {
        format!("SELECT {} FROM {}", E::FIELDS.join(", "), E::COLLECTION)
    }
}

impl<E: Entity> StorageBackend<E> for RelationalBackend<E> {
    fn save(&self, entity: &E) -> StoreResult<()> {
        let conn = self.conn.lock();
        tracing::debug!(collection = E::COLLECTION, id = %entity.id(), "relational save");
        let record = entity.to_record();
        let placeholders: Vec<String> = (1..=E::FIELDS.len()).map(|i| format!("?{i}")).collect();
        let values: Vec<String> = E::FIELDS
            .iter()
            .map(|field| record.raw(field).unwrap_or("").to_string())
            .collect();
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
                E::COLLECTION,
                E::FIELDS.join(", "),
                placeholders.join(", ")
            ),
            params_from_iter(values),
        )?;
        Ok(())
    }

    fn load(&self, id: &EntityId) -> StoreResult<Option<E>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                &format!("{} WHERE id = ?1", Self::select_clause()),
                [id.as_str()],
                Self::row_to_record,
            )
            .optional()?;
        match record {
            Some(record) => Ok(Some(E::from_record(&record)?)),
            None => Ok(None),
        }
    }

    fn load_all(&self) -> StoreResult<Vec<E>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&Self::select_clause())?;
        let rows = stmt.query_map([], Self::row_to_record)?;

        let mut entities = Vec::new();
        for record in rows {
            entities.push(E::from_record(&record?)?);
        }
        Ok(entities)
    }

    fn delete(&self, id: &EntityId) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", E::COLLECTION),
            [id.as_str()],
        )?;
        if affected > 0 {
            tracing::debug!(collection = E::COLLECTION, %id, "relational delete");
        }
        Ok(affected > 0)
    }

    fn exists(&self, id: &EntityId) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let found: Option<i64> = conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", E::COLLECTION),
                [id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn search(&self, criteria: &Criteria) -> StoreResult<Vec<E>> {
        if criteria.is_empty() {
            return self.load_all();
        }
        // Unknown fields cannot match anything; they would also be a SQL
        // injection vector if spliced into the statement.
        if criteria
            .fields()
            .iter()
            .any(|(field, _)| !E::FIELDS.contains(&field.as_str()))
        {
            return Ok(Vec::new());
        }

        let clauses: Vec<String> = criteria
            .fields()
            .iter()
            .enumerate()
            .map(|(i, (field, _))| format!("{field} = ?{}", i + 1))
            .collect();
        // Columns hold the flat-record encoding, so criteria values must
        // be reduced through the same conventions before they compare.
        let params: Vec<String> = criteria
            .fields()
            .iter()
            .map(|(_, value)| flat_value(value))
            .collect();

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE {}",
            Self::select_clause(),
            clauses.join(" AND ")
        ))?;
        let rows = stmt.query_map(params_from_iter(params), Self::row_to_record)?;

        let mut entities = Vec::new();
        for record in rows {
            entities.push(E::from_record(&record?)?);
        }
        Ok(entities)
    }
}
