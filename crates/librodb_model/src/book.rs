//! The Book entity.

use crate::entity::Entity;
use crate::error::{RecordError, ValidationError};
use crate::id::EntityId;
use crate::isbn::is_valid_isbn;
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A book in the catalogue.
///
/// Borrow state lives on the book itself: `borrowed_by` is `Some` exactly
/// when `available` is `false`. That invariant is maintained by
/// [`Book::mark_borrowed`] and [`Book::mark_returned`]; the loan service is
/// the only expected writer of those fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier, assigned at construction.
    pub id: EntityId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp, touched on save.
    pub updated_at: DateTime<Utc>,
    /// Title; must be non-empty.
    pub title: String,
    /// Id of the author; referential integrity is the service layer's job.
    pub author_id: EntityId,
    /// Optional ISBN-10 or ISBN-13; checksum-validated when present.
    pub isbn: Option<String>,
    /// Year of publication.
    pub publication_year: i32,
    /// Genre label.
    pub genre: String,
    /// Page count.
    pub pages: u32,
    /// Whether the book can currently be borrowed.
    pub available: bool,
    /// Borrower's user id while the book is out.
    pub borrowed_by: Option<EntityId>,
    /// When the current borrow started.
    pub borrow_date: Option<DateTime<Utc>>,
    /// When the current borrow is due back.
    pub due_date: Option<DateTime<Utc>>,
}

impl Book {
    /// Creates and validates a new, available book.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty title or a bad ISBN.
    pub fn new(
        title: impl Into<String>,
        author_id: EntityId,
        isbn: Option<String>,
        publication_year: i32,
        genre: impl Into<String>,
        pages: u32,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now();
        let book = Self {
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
            title: title.into(),
            author_id,
            isbn,
            publication_year,
            genre: genre.into(),
            pages,
            available: true,
            borrowed_by: None,
            borrow_date: None,
            due_date: None,
        };
        book.validate()?;
        Ok(book)
    }

    /// Transitions the book into the borrowed state.
    pub fn mark_borrowed(
        &mut self,
        user_id: EntityId,
        borrow_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) {
        self.available = false;
        self.borrowed_by = Some(user_id);
        self.borrow_date = Some(borrow_date);
        self.due_date = Some(due_date);
    }

    /// Transitions the book back to the available state.
    pub fn mark_returned(&mut self) {
        self.available = true;
        self.borrowed_by = None;
        self.borrow_date = None;
        self.due_date = None;
    }
}

impl Entity for Book {
    const COLLECTION: &'static str = "books";
    const ITEM: &'static str = "book";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "title",
        "author_id",
        "isbn",
        "publication_year",
        "genre",
        "pages",
        "available",
        "borrowed_by",
        "borrow_date",
        "due_date",
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
        if self.title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        if let Some(isbn) = &self.isbn {
            if !is_valid_isbn(isbn) {
                return Err(ValidationError::invalid_isbn(isbn));
            }
        }
        Ok(())
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id", self.id.as_str());
        record.insert_datetime("created_at", &self.created_at);
        record.insert_datetime("updated_at", &self.updated_at);
        record.insert("title", &self.title);
        record.insert("author_id", self.author_id.as_str());
        record.insert_opt("isbn", self.isbn.as_deref());
        record.insert("publication_year", self.publication_year.to_string());
        record.insert("genre", &self.genre);
        record.insert("pages", self.pages.to_string());
        record.insert_bool("available", self.available);
        record.insert_opt("borrowed_by", self.borrowed_by.as_ref().map(EntityId::as_str));
        record.insert_opt_datetime("borrow_date", self.borrow_date.as_ref());
        record.insert_opt_datetime("due_date", self.due_date.as_ref());
        record
    }

    fn from_record(record: &Record) -> Result<Self, RecordError> {
        Ok(Self {
            id: EntityId::from(record.require("id")?),
            created_at: record.datetime("created_at")?,
            updated_at: record.datetime("updated_at")?,
            title: record.text("title"),
            author_id: EntityId::from(record.require("author_id")?),
            isbn: record.opt_text("isbn"),
            publication_year: record.number("publication_year")?,
            genre: record.text("genre"),
            pages: record.number("pages")?,
            available: record.boolean("available")?,
            borrowed_by: record.opt_text("borrowed_by").map(EntityId::from),
            borrow_date: record.opt_datetime("borrow_date")?,
            due_date: record.opt_datetime("due_date")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        Book::new(
            "The Name of the Wind",
            EntityId::new(),
            Some("9780306406157".to_string()),
            2007,
            "Fantasy",
            662,
        )
        .unwrap()
    }

    #[test]
    fn empty_title_rejected() {
        let err = Book::new("  ", EntityId::new(), None, 2000, "Fiction", 100).unwrap_err();
        assert_eq!(err, ValidationError::empty_field("title"));
    }

    #[test]
    fn bad_isbn_rejected() {
        let err = Book::new(
            "Title",
            EntityId::new(),
            Some("1234567890".to_string()),
            2000,
            "Fiction",
            100,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidIsbn { .. }));
    }

    #[test]
    fn missing_isbn_is_fine() {
        assert!(Book::new("Title", EntityId::new(), None, 2000, "Fiction", 100).is_ok());
    }

    #[test]
    fn borrow_state_invariant() {
        let mut book = sample();
        assert!(book.available);
        assert!(book.borrowed_by.is_none());

        let user = EntityId::new();
        let now = Utc::now();
        book.mark_borrowed(user.clone(), now, now + chrono::Duration::days(14));
        assert!(!book.available);
        assert_eq!(book.borrowed_by, Some(user));
        assert!(book.due_date.is_some());

        book.mark_returned();
        assert!(book.available);
        assert!(book.borrowed_by.is_none());
        assert!(book.borrow_date.is_none());
    }

    #[test]
    fn record_roundtrip() {
        let mut book = sample();
        book.mark_borrowed(
            EntityId::new(),
            Utc::now(),
            Utc::now() + chrono::Duration::days(7),
        );
        let decoded = Book::from_record(&book.to_record()).unwrap();
        assert_eq!(decoded, book);
    }

    #[test]
    fn record_roundtrip_with_absent_optionals() {
        let book = sample();
        let record = book.to_record();
        assert_eq!(record.raw("borrowed_by"), Some(""));
        let decoded = Book::from_record(&record).unwrap();
        assert_eq!(decoded, book);
        assert_eq!(decoded.borrow_date, None);
    }
}
