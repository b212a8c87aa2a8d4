//! The User entity, roles, and permissions.

use crate::entity::Entity;
use crate::error::{RecordError, ValidationError};
use crate::id::EntityId;
use crate::record::Record;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid e-mail regex")
});

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular borrower.
    User,
    /// Can manage the catalogue.
    Librarian,
    /// Full access, including deletes and account management.
    Admin,
}

/// An action checked against a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read catalogue data.
    Read,
    /// Create or update catalogue data.
    Write,
    /// Delete catalogue data.
    Delete,
    /// Manage accounts and configuration.
    Admin,
}

impl Role {
    /// Whether the role is allowed to perform an action.
    #[must_use]
    pub fn allows(self, action: Action) -> bool {
        match self {
            Role::User => matches!(action, Action::Read),
            Role::Librarian => matches!(action, Action::Read | Action::Write),
            Role::Admin => true,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::User => "user",
            Role::Librarian => "librarian",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "librarian" => Ok(Role::Librarian),
            "admin" => Ok(Role::Admin),
            other => Err(RecordError::new("role", format!("unknown role: {other}"))),
        }
    }
}

/// A library user account.
///
/// `password_hash` is either `hex(salt)$hex(digest)` as written by the
/// auth service, or a bare legacy SHA-256 hex digest with no separator.
/// The model treats it as an opaque string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: EntityId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp.
    pub updated_at: DateTime<Utc>,
    /// Display name; must be non-empty.
    pub name: String,
    /// Optional e-mail address, pattern-checked when present.
    pub email: Option<String>,
    /// Credential hash; empty until the auth service sets it.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Whether the account may authenticate.
    pub active: bool,
    /// Ids of books currently borrowed by this user.
    pub borrowed_books: Vec<EntityId>,
}

impl User {
    /// Creates and validates a new, active user with no credentials.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty name or a malformed
    /// e-mail address.
    pub fn new(
        name: impl Into<String>,
        email: Option<String>,
        role: Role,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now();
        let user = Self {
            id: EntityId::new(),
            created_at: now,
            updated_at: now,
            name: name.into(),
            email,
            password_hash: String::new(),
            role,
            active: true,
            borrowed_books: Vec::new(),
        };
        user.validate()?;
        Ok(user)
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const ITEM: &'static str = "user";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "name",
        "email",
        "password_hash",
        "role",
        "active",
        "borrowed_books",
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
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if let Some(email) = &self.email {
            if !EMAIL_PATTERN.is_match(email) {
                return Err(ValidationError::invalid_email(email));
            }
        }
        Ok(())
    }

    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id", self.id.as_str());
        record.insert_datetime("created_at", &self.created_at);
        record.insert_datetime("updated_at", &self.updated_at);
        record.insert("name", &self.name);
        record.insert_opt("email", self.email.as_deref());
        record.insert("password_hash", &self.password_hash);
        record.insert("role", self.role.to_string());
        record.insert_bool("active", self.active);
        record.insert_list(
            "borrowed_books",
            self.borrowed_books.iter().map(EntityId::as_str),
        );
        record
    }

    fn from_record(record: &Record) -> Result<Self, RecordError> {
        Ok(Self {
            id: EntityId::from(record.require("id")?),
            created_at: record.datetime("created_at")?,
            updated_at: record.datetime("updated_at")?,
            name: record.text("name"),
            email: record.opt_text("email"),
            password_hash: record.text("password_hash"),
            role: record.require("role")?.parse()?,
            active: record.boolean("active")?,
            borrowed_books: record
                .list("borrowed_books")
                .into_iter()
                .map(EntityId::from)
                .collect(),
        })
    }
}
