//! # librodb services
//!
//! Domain services on top of the repository layer:
//!
//! - [`AuthService`] — registration, credential checks, password
//!   changes; opaque failures outward
//! - [`LoanService`] — the borrow / return / extend state machine and
//!   late penalties
//! - [`CatalogService`] — book and author management with the
//!   referential-integrity check storage itself does not provide

mod auth;
mod catalog;
mod error;
mod loan;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use error::{AuthError, AuthFailure, CatalogError, LoanError};
pub use loan::{LoanPolicy, LoanService};
