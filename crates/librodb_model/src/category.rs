//! The Category entity.

use crate::entity::Entity;
use crate::error::{RecordError, ValidationError};
use crate::id::EntityId;
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalogue category; `parent_id` allows a simple hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier.
    pub id: EntityId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp.
    pub updated_at: DateTime<Utc>,
    /// Category name; must be non-empty.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Optional parent category.
    pub parent_id: Option<EntityId>,
}

impl Category {
    /// Creates and validates a new category.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name is empty.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parent_id: Option<EntityId>,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now();
        let category = Self {
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
            name: name.into(),
            description: description.into(),
            parent_id,
        };
        category.validate()?;
        Ok(category)
    }
}

impl Entity for Category {
    const COLLECTION: &'static str = "categories";
    const ITEM: &'static str = "category";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "name",
        "description",
        "parent_id",
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
        record.insert("description", &self.description);
        record.insert_opt("parent_id", self.parent_id.as_ref().map(EntityId::as_str));
        record
    }

    fn from_record(record: &Record) -> Result<Self, RecordError> {
        Ok(Self {
            id: EntityId::from(record.require("id")?),
            created_at: record.datetime("created_at")?,
            updated_at: record.datetime("updated_at")?,
            name: record.text("name"),
            description: record.text("description"),
            parent_id: record.opt_text("parent_id").map(EntityId::from),
        })
    }
}
