//! Storage format selection and backend construction.

use crate::backend::StorageBackend;
use crate::document::DocumentBackend;
use crate::error::{StoreError, StoreResult};
use crate::markup::MarkupBackend;
use crate::relational::RelationalBackend;
use crate::tabular::TabularBackend;
use crate::text::TextBackend;
use librodb_model::Entity;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The five interchangeable storage formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// One JSON object per line in a `.txt` file.
    Text,
    /// CSV with a header row.
    Csv,
    /// A single JSON document per collection.
    Json,
    /// An XML document per collection.
    Xml,
    /// Tables in a shared SQLite database.
    Sqlite,
}

impl Format {
    /// All formats, in migration order.
    pub const ALL: [Format; 5] = [
        Format::Text,
        Format::Csv,
        Format::Json,
        Format::Xml,
        Format::Sqlite,
    ];

    /// The canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Format::Text),
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "sqlite" | "db" => Ok(Format::Sqlite),
            other => Err(StoreError::unknown_format(other)),
        }
    }
}

/// Builds storage backends for any entity type under one base directory.
///
/// All formats for all collections live side by side in the base
/// directory, so switching formats never moves files around.
#[derive(Debug, Clone)]
pub struct BackendFactory {
    base_dir: PathBuf,
}

impl BackendFactory {
    /// Creates a factory rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The directory all backends store under.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Opens a backend for entity type `E` in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if the base directory or database cannot be
    /// prepared.
    pub fn open<E: Entity>(&self, format: Format) -> StoreResult<Box<dyn StorageBackend<E>>> {
        Ok(match format {
            Format::Text => Box::new(TextBackend::open(&self.base_dir)?),
            Format::Csv => Box::new(TabularBackend::open(&self.base_dir)?),
            Format::Json => Box::new(DocumentBackend::open(&self.base_dir)?),
            Format::Xml => Box::new(MarkupBackend::open(&self.base_dir)?),
            Format::Sqlite => Box::new(RelationalBackend::open(&self.base_dir)?),
        })
    }
}
