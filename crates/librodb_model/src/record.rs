//! Flat string records.
//!
//! The tabular, markup, and relational backends all reduce an entity to a
//! flat mapping of field name to string. This module is the single place
//! where those string conventions live:
//!
//! - absent/`None` values are the empty string, and read back as absent
//! - booleans are `true`/`false`
//! - timestamps are RFC 3339
//! - list fields are joined with `;` and split losslessly on read

use crate::error::RecordError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Separator used for list-valued fields.
pub const LIST_SEPARATOR: char = ';';

/// A flat field-name → string-value mapping for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<String, String>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field to a raw string value.
    pub fn insert(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
    }

    /// Sets an optional field; `None` becomes the empty string.
    pub fn insert_opt(&mut self, field: &str, value: Option<&str>) {
        self.insert(field, value.unwrap_or(""));
    }

    /// Sets a boolean field.
    pub fn insert_bool(&mut self, field: &str, value: bool) {
        self.insert(field, if value { "true" } else { "false" });
    }

    /// Sets a timestamp field in RFC 3339 form.
    pub fn insert_datetime(&mut self, field: &str, value: &DateTime<Utc>) {
        self.insert(field, value.to_rfc3339());
    }

    /// Sets an optional timestamp field.
    pub fn insert_opt_datetime(&mut self, field: &str, value: Option<&DateTime<Utc>>) {
        match value {
            Some(dt) => self.insert_datetime(field, dt),
            None => self.insert(field, ""),
        }
    }

    /// Sets a list field, joining items with [`LIST_SEPARATOR`].
    pub fn insert_list<'a>(&mut self, field: &str, values: impl IntoIterator<Item = &'a str>) {
        let joined: Vec<&str> = values.into_iter().collect();
        self.insert(field, joined.join(&LIST_SEPARATOR.to_string()));
    }

    /// Returns the raw stored value, empty string included.
    #[must_use]
    pub fn raw(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Returns a non-empty value, treating absence and `""` alike.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.raw(field).filter(|v| !v.is_empty())
    }

    /// Returns a plain text field; absent fields decode as `""`.
    #[must_use]
    pub fn text(&self, field: &str) -> String {
        self.raw(field).unwrap_or_default().to_string()
    }

    /// Returns an optional text field.
    #[must_use]
    pub fn opt_text(&self, field: &str) -> Option<String> {
        self.get(field).map(str::to_string)
    }

    /// Returns a required, non-empty field.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the field is absent or empty.
    pub fn require(&self, field: &str) -> Result<&str, RecordError> {
        self.get(field)
            .ok_or_else(|| RecordError::new(field, "missing required value"))
    }

    /// Parses a required numeric field.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the field is absent or fails to parse.
    pub fn number<T>(&self, field: &str) -> Result<T, RecordError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.require(field)?
            .parse()
            .map_err(|e| RecordError::new(field, format!("not a number: {e}")))
    }

    /// Parses a required boolean field (`true`/`false`).
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] on absence or any other literal.
    pub fn boolean(&self, field: &str) -> Result<bool, RecordError> {
        match self.require(field)? {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(RecordError::new(field, format!("not a boolean: {other}"))),
        }
    }

    /// Parses a required RFC 3339 timestamp field.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] on absence or an unparseable timestamp.
    pub fn datetime(&self, field: &str) -> Result<DateTime<Utc>, RecordError> {
        parse_datetime(field, self.require(field)?)
    }

    /// Parses an optional RFC 3339 timestamp field.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if a present value cannot be parsed.
    pub fn opt_datetime(&self, field: &str) -> Result<Option<DateTime<Utc>>, RecordError> {
        match self.get(field) {
            Some(value) => parse_datetime(field, value).map(Some),
            None => Ok(None),
        }
    }

    /// Splits a list field back into its items.
    ///
    /// An absent or empty field is an empty list; items are otherwise
    /// preserved exactly as written.
    #[must_use]
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.get(field) {
            Some(value) => value.split(LIST_SEPARATOR).map(str::to_string).collect(),
            None => Vec::new(),
        }
    }
}

/// Encodes a JSON scalar with the same string conventions the `insert_*`
/// setters use, so a search criterion compares equal against what a flat
/// backend actually stored.
///
/// Numbers go through the native `Display` (`0.0` is `"0"`, matching
/// `f64::to_string`), and RFC 3339 strings are re-encoded the way
/// [`Record::insert_datetime`] writes them (`Z` becomes `+00:00`).
#[must_use]
pub fn flat_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else if let Some(f) = n.as_f64() {
                f.to_string()
            } else {
                n.to_string()
            }
        }
        serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => dt.with_timezone(&Utc).to_rfc3339(),
            Err(_) => s.clone(),
        },
        other => other.to_string(),
    }
}

fn parse_datetime(field: &str, value: &str) -> Result<DateTime<Utc>, RecordError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RecordError::new(field, format!("not an RFC 3339 timestamp: {e}")))
}
