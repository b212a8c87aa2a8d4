//! # librodb core
//!
//! Repositories and lifecycle management on top of the storage layer:
//!
//! - [`Repository`] adds validation and `updated_at` touching to a
//!   backend
//! - [`EntityManager`] hands out one lazily-built repository per entity
//!   type, all bound to the active format
//! - [`MigrationManager`] copies collections between formats;
//!   [`EntityManager::set_format`] is migrate-then-switch with the old
//!   format kept on failure

mod config;
mod error;
mod manager;
mod migration;
mod repository;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use manager::EntityManager;
pub use migration::{MigrationManager, MigrationReport};
pub use repository::Repository;
