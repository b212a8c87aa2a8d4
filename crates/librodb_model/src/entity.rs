//! The entity contract shared by every storage backend.

use crate::error::{RecordError, ValidationError};
use crate::id::EntityId;
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A uniquely identified domain value that can be persisted.
///
/// Backends are generic over this trait and never know about concrete
/// entity types. Two codecs are provided:
///
/// - serde (`Serialize`/`DeserializeOwned`) for the JSON-shaped formats
/// - the flat [`Record`] codec for tabular, markup, and relational storage
///
/// # Invariants
///
/// - `id()` is assigned at construction and never reassigned on round-trip
/// - `FIELDS` is the complete, fixed column order for flat formats
/// - `to_record` followed by `from_record` reproduces the entity
///   field-for-field
pub trait Entity:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Plural collection name; used as file stem, table name, and JSON/XML
    /// root.
    const COLLECTION: &'static str;

    /// Singular element name used by the markup backend.
    const ITEM: &'static str;

    /// Fixed, explicit field order for the flat formats.
    const FIELDS: &'static [&'static str];

    /// Returns the entity's immutable id.
    fn id(&self) -> &EntityId;

    /// Returns when the entity was last modified.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Bumps `updated_at`; called by the repository before every save.
    fn touch(&mut self);

    /// Checks all field invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ValidationError`].
    fn validate(&self) -> Result<(), ValidationError>;

    /// Encodes the entity into a flat record.
    fn to_record(&self) -> Record;

    /// Decodes an entity from a flat record.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if a field is missing or unparseable.
    fn from_record(record: &Record) -> Result<Self, RecordError>;
}
