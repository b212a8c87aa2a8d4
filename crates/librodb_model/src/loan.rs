//! The Loan entity.

use crate::entity::Entity;
use crate::error::{RecordError, ValidationError};
use crate::id::EntityId;
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A borrowing record.
///
/// Loans are created when a book is borrowed, mutated once on return, and
/// never physically deleted; the collection is the borrowing history.
/// "Overdue" is not a stored state, it is the derived predicate
/// [`Loan::is_overdue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Unique identifier.
    pub id: EntityId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp.
    pub updated_at: DateTime<Utc>,
    /// The borrowed book.
    pub book_id: EntityId,
    /// The borrowing user.
    pub user_id: EntityId,
    /// When the borrow started.
    pub borrow_date: DateTime<Utc>,
    /// When the book is due back.
    pub due_date: DateTime<Utc>,
    /// When the book came back; `None` while the loan is open.
    pub return_date: Option<DateTime<Utc>>,
    /// Late-return penalty, non-negative; set on return.
    pub penalty_amount: f64,
}

impl Loan {
    /// Creates a new open loan.
    #[must_use]
    pub fn new(
        book_id: EntityId,
        user_id: EntityId,
        borrow_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
            book_id,
            user_id,
            borrow_date,
            due_date,
            return_date: None,
            penalty_amount: 0.0,
        }
    }

    /// Whether the loan is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Derived overdue predicate: open and past due at `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && now > self.due_date
    }

    /// Whole days late for a return at `returned_at`; zero when on time.
    #[must_use]
    pub fn days_late(&self, returned_at: DateTime<Utc>) -> i64 {
        (returned_at - self.due_date).num_days().max(0)
    }
}

impl Entity for Loan {
    const COLLECTION: &'static str = "loans";
    const ITEM: &'static str = "loan";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "book_id",
        "user_id",
        "borrow_date",
        "due_date",
        "return_date",
        "penalty_amount",
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
        // Ids are typed and dates are total; nothing further to check.
        Ok(())
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id", self.id.as_str());
        record.insert_datetime("created_at", &self.created_at);
        record.insert_datetime("updated_at", &self.updated_at);
        record.insert("book_id", self.book_id.as_str());
        record.insert("user_id", self.user_id.as_str());
        record.insert_datetime("borrow_date", &self.borrow_date);
        record.insert_datetime("due_date", &self.due_date);
        record.insert_opt_datetime("return_date", self.return_date.as_ref());
        record.insert("penalty_amount", self.penalty_amount.to_string());
        record
    }

    fn from_record(record: &Record) -> Result<Self, RecordError> {
        Ok(Self {
            id: EntityId::from(record.require("id")?),
            created_at: record.datetime("created_at")?,
            updated_at: record.datetime("updated_at")?,
            book_id: EntityId::from(record.require("book_id")?),
            user_id: EntityId::from(record.require("user_id")?),
            borrow_date: record.datetime("borrow_date")?,
            due_date: record.datetime("due_date")?,
            return_date: record.opt_datetime("return_date")?,
            penalty_amount: record.number("penalty_amount")?,
        })
    }
}
