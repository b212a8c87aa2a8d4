//! The Author entity.

use crate::entity::Entity;
use crate::error::{RecordError, ValidationError};
use crate::id::EntityId;
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An author referenced by books through `Book::author_id`.
///
/// Storage has no foreign-key awareness; the catalogue service refuses to
/// delete an author while any book still references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Unique identifier.
    pub id: EntityId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp.
    pub updated_at: DateTime<Utc>,
    /// Display name; must be non-empty.
    pub name: String,
    /// Nationality label.
    pub nationality: String,
    /// Free-form biography.
    pub biography: String,
}

impl Author {
    /// Creates and validates a new author.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name is empty.
    pub fn new(
        name: impl Into<String>,
        nationality: impl Into<String>,
        biography: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now();
        let author = Self {
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
            name: name.into(),
            nationality: nationality.into(),
            biography: biography.into(),
        };
        author.validate()?;
        Ok(author)
    }
}

impl Entity for Author {
    const COLLECTION: &'static str = "authors";
    const ITEM: &'static str = "author";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "name",
        "nationality",
        "biography",
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        Ok(())
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id", self.id.as_str());
        record.insert_datetime("created_at", &self.created_at);
        record.insert_datetime("updated_at", &self.updated_at);
        record.insert("name", &self.name);
        record.insert("nationality", &self.nationality);
        record.insert("biography", &self.biography);
        record
    }

    fn from_record(record: &Record) -> Result<Self, RecordError> {
        Ok(Self {
            id: EntityId::from(record.require("id")?),
            created_at: record.datetime("created_at")?,
            updated_at: record.datetime("updated_at")?,
            name: record.text("name"),
            nationality: record.text("nationality"),
            biography: record.text("biography"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_rejected() {
        assert!(Author::new("", "Chilean", "").is_err());
    }

    #[test]
    fn record_roundtrip() {
        let author = Author::new("Isabel Allende", "Chilean", "Novelist.").unwrap();
        let decoded = Author::from_record(&author.to_record()).unwrap();
        assert_eq!(decoded, author);
    }
}
