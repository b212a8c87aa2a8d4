//! Storage backend trait definition.

use crate::error::StoreResult;
use librodb_model::{Entity, EntityId};

/// Equality criteria for a backend search.
///
/// Every listed field must match its value exactly; fields are addressed
/// by their serialized names.
///
/// # Example
///
/// ```rust,ignore
/// let criteria = Criteria::new()
///     .eq("author_id", author.id.as_str())
///     .eq("available", true);
/// let hits = backend.search(&criteria)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    fields: Vec<(String, serde_json::Value)>,
}

impl Criteria {
    /// Creates empty criteria, which match every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exact-equality condition on a field.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }

    /// Whether no conditions have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The `(field, value)` conditions in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, serde_json::Value)] {
        &self.fields
    }

    /// Checks an entity against all conditions.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity cannot be serialized for comparison.
    pub fn matches<E: Entity>(&self, entity: &E) -> StoreResult<bool> {
        let doc = serde_json::to_value(entity)?;
        Ok(self
            .fields
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value)))
    }
}

/// A storage backend for one entity type.
///
/// All five implementations satisfy the same contract:
///
/// - `save` is an upsert keyed by id; an existing entity is fully
///   replaced, a new one appended
/// - `load` returns `Ok(None)` for an unknown id, never an error
/// - `load_all` preserves insertion order on the file-based backends
/// - `delete` reports whether anything was removed
/// - `search` matches all given fields by equality
///
/// # Concurrency
///
/// File-based backends rewrite the whole collection on every `save` and
/// `delete`; a per-collection mutex serializes writers within this
/// process. Concurrent writers from *other* processes are unsupported
/// and will lose updates.
pub trait StorageBackend<E: Entity>: Send + Sync {
    /// Inserts or replaces an entity by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read or written.
    fn save(&self, entity: &E) -> StoreResult<()>;

    /// Loads an entity by id; `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn load(&self, id: &EntityId) -> StoreResult<Option<E>>;

    /// Loads the full collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn load_all(&self) -> StoreResult<Vec<E>>;

    /// Deletes an entity by id; `Ok(false)` if it was absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read or written.
    fn delete(&self, id: &EntityId) -> StoreResult<bool>;

    /// Whether an entity with this id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn exists(&self, id: &EntityId) -> StoreResult<bool> {
        Ok(self.load(id)?.is_some())
    }

    /// Returns all entities matching the criteria by field equality.
    ///
    /// The default implementation is a full scan; backends that can
    /// answer cheaper override it.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn search(&self, criteria: &Criteria) -> StoreResult<Vec<E>> {
        let mut hits = Vec::new();
        for entity in self.load_all()? {
            if criteria.matches(&entity)? {
                hits.push(entity);
            }
        }
        Ok(hits)
    }
}

/// Replaces the entity with the same id or appends at the end.
pub(crate) fn upsert<E: Entity>(entities: &mut Vec<E>, entity: E) {
    match entities.iter_mut().find(|e| e.id() == entity.id()) {
        Some(slot) => *slot = entity,
        None => entities.push(entity),
    }
}
