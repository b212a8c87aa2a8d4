//! Library configuration.

use librodb_store::Format;
use std::path::{Path, PathBuf};

/// Configuration for an [`EntityManager`](crate::EntityManager).
///
/// Built with chained setters:
///
/// ```rust,ignore
/// let config = Config::new("./library-data").with_format(Format::Sqlite);
/// let manager = EntityManager::new(config);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    base_dir: PathBuf,
    format: Format,
}

impl Config {
    /// Creates a configuration storing under `base_dir` in the default
    /// JSON document format.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            format: Format::Json,
        }
    }

    /// Sets the initial storage format.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// The directory all data files live in.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The initial storage format.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }
}
