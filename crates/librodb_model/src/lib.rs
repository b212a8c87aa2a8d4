//! # librodb model
//!
//! Entity types for the librodb persistence framework.
//!
//! This crate defines:
//! - the [`Entity`] contract every storage backend is generic over
//! - the five domain entities (Book, Author, User, Loan, Category) with
//!   constructor-time field validation
//! - the flat [`Record`] codec used by the tabular, markup, and
//!   relational formats
//!
//! Entities are plain values. Cross-entity relationships are by
//! [`EntityId`] only; there is no object graph.

mod author;
mod book;
mod category;
mod entity;
mod error;
mod id;
mod isbn;
mod loan;
mod record;
mod user;

pub use author::Author;
pub use book::Book;
pub use category::Category;
pub use entity::Entity;
pub use error::{RecordError, ValidationError};
pub use id::EntityId;
pub use isbn::is_valid_isbn;
pub use loan::Loan;
pub use record::{flat_value, Record, LIST_SEPARATOR};
pub use user::{Action, Role, User};
