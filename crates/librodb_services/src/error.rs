//! Error types for the service layer.

use librodb_core::CoreError;
use librodb_model::{EntityId, ValidationError};
use thiserror::Error;

/// Why an authentication attempt was rejected.
///
/// Only carried internally (and in logs); the outward-facing message is
/// the single opaque "authentication failed" for every variant, so a
/// caller cannot probe which accounts exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No account with that e-mail address.
    UserNotFound,
    /// The password did not match.
    InvalidCredentials,
    /// The account exists but is deactivated.
    InactiveAccount,
}

/// Errors from [`AuthService`](crate::AuthService).
#[derive(Debug, Error)]
pub enum AuthError {
    /// The account data failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another account already uses this e-mail address.
    #[error("e-mail address already registered: {email}")]
    EmailTaken {
        /// The conflicting address.
        email: String,
    },

    /// The credentials were rejected; the reason is deliberately not in
    /// the message.
    #[error("authentication failed")]
    Failed(AuthFailure),

    /// The repository layer failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Errors from [`LoanService`](crate::LoanService).
#[derive(Debug, Error)]
pub enum LoanError {
    /// No book with this id.
    #[error("book not found: {id}")]
    BookNotFound {
        /// The unknown book id.
        id: EntityId,
    },

    /// No user with this id.
    #[error("user not found: {id}")]
    UserNotFound {
        /// The unknown user id.
        id: EntityId,
    },

    /// The book is already borrowed.
    #[error("book is not available: {id}")]
    BookUnavailable {
        /// The borrowed book's id.
        id: EntityId,
    },

    /// The book is not currently borrowed.
    #[error("book is not borrowed: {id}")]
    NotBorrowed {
        /// The shelved book's id.
        id: EntityId,
    },

    /// The borrowing account is deactivated.
    #[error("user account is inactive: {id}")]
    UserInactive {
        /// The inactive user's id.
        id: EntityId,
    },

    /// The user already holds the maximum number of loans.
    #[error("loan limit reached ({limit} books)")]
    LoanLimitReached {
        /// The configured per-user limit.
        limit: usize,
    },

    /// The repository layer failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Errors from [`CatalogService`](crate::CatalogService).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The entity failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A book references an author that does not exist.
    #[error("author not found: {id}")]
    AuthorNotFound {
        /// The unknown author id.
        id: EntityId,
    },

    /// The author still has books in the catalogue.
    #[error("author {author_id} has {dependents} book(s) in the catalogue")]
    ReferentialIntegrity {
        /// The author that cannot be deleted.
        author_id: EntityId,
        /// Number of books still referencing the author.
        dependents: usize,
    },

    /// The repository layer failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_message_is_opaque() {
        for failure in [
            AuthFailure::UserNotFound,
            AuthFailure::InvalidCredentials,
            AuthFailure::InactiveAccount,
        ] {
            assert_eq!(AuthError::Failed(failure).to_string(), "authentication failed");
        }
    }
}
