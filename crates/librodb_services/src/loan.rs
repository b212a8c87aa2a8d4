//! Borrowing, returns, extensions, and late penalties.

use crate::error::LoanError;
use chrono::{DateTime, Duration, Utc};
use librodb_core::Repository;
use librodb_model::{Book, EntityId, Loan, User};
use librodb_store::Criteria;
use std::sync::Arc;
use tracing::{info, warn};

/// Lending rules.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanPolicy {
    /// Loan length in days when the caller does not choose one.
    pub default_loan_days: i64,
    /// Penalty per whole day late, in currency units.
    pub fine_per_day: f64,
    /// Maximum simultaneously borrowed books per user.
    pub max_loans_per_user: usize,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            default_loan_days: 14,
            fine_per_day: 0.50,
            max_loans_per_user: 3,
        }
    }
}

/// The borrow / return / extend state machine.
///
/// Borrow state is written in three places that must agree: the book's
/// borrow fields, the open loan, and the user's `borrowed_books` list.
/// This service is the only writer of all three.
pub struct LoanService {
    books: Arc<Repository<Book>>,
    users: Arc<Repository<User>>,
    loans: Arc<Repository<Loan>>,
    policy: LoanPolicy,
}

impl LoanService {
    /// Creates the service over the three repositories.
    #[must_use]
    pub fn new(
        books: Arc<Repository<Book>>,
        users: Arc<Repository<User>>,
        loans: Arc<Repository<Loan>>,
        policy: LoanPolicy,
    ) -> Self {
        Self {
            books,
            users,
            loans,
            policy,
        }
    }

    /// The active lending rules.
    #[must_use]
    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    /// Borrows a book for the policy's default loan length.
    ///
    /// # Errors
    ///
    /// See [`LoanService::borrow_for`].
    pub fn borrow(&self, book_id: &EntityId, user_id: &EntityId) -> Result<Loan, LoanError> {
        self.borrow_for(book_id, user_id, self.policy.default_loan_days)
    }

    /// Borrows a book for `days`, creating the open loan.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError::BookUnavailable`] if the book is out,
    /// [`LoanError::UserInactive`] for a deactivated account, and
    /// [`LoanError::LoanLimitReached`] when the user is at the policy
    /// limit.
    pub fn borrow_for(
        &self,
        book_id: &EntityId,
        user_id: &EntityId,
        days: i64,
    ) -> Result<Loan, LoanError> {
        let mut book = self
            .books
            .get(book_id)?
            .ok_or_else(|| LoanError::BookNotFound {
                id: book_id.clone(),
            })?;
        if !book.available {
            return Err(LoanError::BookUnavailable {
                id: book_id.clone(),
            });
        }

        let mut user = self
            .users
            .get(user_id)?
            .ok_or_else(|| LoanError::UserNotFound {
                id: user_id.clone(),
            })?;
        if !user.active {
            return Err(LoanError::UserInactive {
                id: user_id.clone(),
            });
        }
        if user.borrowed_books.len() >= self.policy.max_loans_per_user {
            return Err(LoanError::LoanLimitReached {
                limit: self.policy.max_loans_per_user,
            });
        }

        let now = Utc::now();
        let due = now + Duration::days(days);

        book.mark_borrowed(user_id.clone(), now, due);
        self.books.save(&mut book)?;

        let mut loan = Loan::new(book_id.clone(), user_id.clone(), now, due);
        self.loans.save(&mut loan)?;

        user.borrowed_books.push(book_id.clone());
        self.users.save(&mut user)?;

        info!(book = %book_id, user = %user_id, due = %due, "book borrowed");
        Ok(loan)
    }

    /// Returns a borrowed book now; see [`LoanService::return_book_at`].
    ///
    /// # Errors
    ///
    /// Returns [`LoanError::NotBorrowed`] if the book is on the shelf.
    pub fn return_book(&self, book_id: &EntityId) -> Result<f64, LoanError> {
        self.return_book_at(book_id, Utc::now())
    }

    /// Returns a borrowed book as of `returned_at` and computes the
    /// penalty: whole days late (never negative) times the per-day fine.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError::NotBorrowed`] if the book is on the shelf.
    pub fn return_book_at(
        &self,
        book_id: &EntityId,
        returned_at: DateTime<Utc>,
    ) -> Result<f64, LoanError> {
        let mut book = self
            .books
            .get(book_id)?
            .ok_or_else(|| LoanError::BookNotFound {
                id: book_id.clone(),
            })?;
        if book.available {
            return Err(LoanError::NotBorrowed {
                id: book_id.clone(),
            });
        }

        let open_loan = self
            .loans
            .find_by(
                &Criteria::new()
                    .eq("book_id", book_id.as_str())
                    .eq("return_date", serde_json::Value::Null),
            )?
            .into_iter()
            .next();

        let penalty = match open_loan {
            Some(mut loan) => {
                let days_late = loan.days_late(returned_at);
                let penalty = days_late as f64 * self.policy.fine_per_day;
                loan.return_date = Some(returned_at);
                loan.penalty_amount = penalty;
                self.loans.save(&mut loan)?;
                penalty
            }
            None => {
                // The book claims to be borrowed but no open loan backs
                // it; fall back to the book's own due date.
                warn!(book = %book_id, "borrowed book has no open loan");
                match book.due_date {
                    Some(due) => {
                        (returned_at - due).num_days().max(0) as f64 * self.policy.fine_per_day
                    }
                    None => 0.0,
                }
            }
        };

        let borrower = book.borrowed_by.clone();
        book.mark_returned();
        self.books.save(&mut book)?;

        if let Some(user_id) = borrower {
            if let Some(mut user) = self.users.get(&user_id)? {
                user.borrowed_books.retain(|id| id != book_id);
                self.users.save(&mut user)?;
            }
        }

        info!(book = %book_id, penalty, "book returned");
        Ok(penalty)
    }

    /// Pushes the due date of an active borrow out by `extra_days`,
    /// on both the book and its open loan.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError::NotBorrowed`] if the book is on the shelf.
    pub fn extend(
        &self,
        book_id: &EntityId,
        extra_days: i64,
    ) -> Result<DateTime<Utc>, LoanError> {
        let mut book = self
            .books
            .get(book_id)?
            .ok_or_else(|| LoanError::BookNotFound {
                id: book_id.clone(),
            })?;
        let due = match (book.available, book.due_date) {
            (false, Some(due)) => due,
            _ => {
                return Err(LoanError::NotBorrowed {
                    id: book_id.clone(),
                })
            }
        };

        let new_due = due + Duration::days(extra_days);
        book.due_date = Some(new_due);
        self.books.save(&mut book)?;

        let open_loan = self
            .loans
            .find_by(
                &Criteria::new()
                    .eq("book_id", book_id.as_str())
                    .eq("return_date", serde_json::Value::Null),
            )?
            .into_iter()
            .next();
        if let Some(mut loan) = open_loan {
            loan.due_date = new_due;
            self.loans.save(&mut loan)?;
        }

        info!(book = %book_id, due = %new_due, "loan extended");
        Ok(new_due)
    }

    /// All loans that are open and past due at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub fn overdue_loans(&self, now: DateTime<Utc>) -> Result<Vec<Loan>, LoanError> {
        Ok(self
            .loans
            .get_all()?
            .into_iter()
            .filter(|loan| loan.is_overdue(now))
            .collect())
    }

    /// All open loans held by one user.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub fn active_loans_for(&self, user_id: &EntityId) -> Result<Vec<Loan>, LoanError> {
        Ok(self.loans.find_by(
            &Criteria::new()
                .eq("user_id", user_id.as_str())
                .eq("return_date", serde_json::Value::Null),
        )?)
    }
}
