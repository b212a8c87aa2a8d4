//! # librodb store
//!
//! Interchangeable storage backends for librodb entities.
//!
//! Five formats implement one [`StorageBackend`] contract: line-oriented
//! text, CSV, JSON documents, XML, and SQLite. A [`BackendFactory`]
//! builds any of them for any entity type under a shared base directory,
//! and every pair of formats round-trips the same data, which is what
//! makes live format migration possible.

mod backend;
mod document;
mod error;
mod factory;
mod markup;
mod relational;
mod tabular;
mod text;

pub use backend::{Criteria, StorageBackend};
pub use document::DocumentBackend;
pub use error::{StoreError, StoreResult};
pub use factory::{BackendFactory, Format};
pub use markup::MarkupBackend;
pub use relational::{RelationalBackend, DATABASE_FILE};
pub use tabular::TabularBackend;
pub use text::TextBackend;
