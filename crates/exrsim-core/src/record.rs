//! The typed in-memory record model.
//!
//! A [`Document`] is an ordered field-name → [`Field`] mapping. Every stored
//! record carries an `id` (opaque string, assigned at creation) and a
//! `created_at` date-time; everything else is entity-specific. Conversion to
//! and from the storage-safe JSON form lives in [`crate::codec`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Number;

use crate::codec::ClockTime;

/// One record: a mapping from field name to typed value.
pub type Document = BTreeMap<String, Field>;

/// A typed field value. The storage layer accepts only JSON primitives, so
/// [`Field::DateTime`] and [`Field::Clock`] exist only in memory and are
/// string-encoded on the way out.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
  Null,
  Bool(bool),
  Number(Number),
  Text(String),
  /// A full date-time with UTC offset. Stored as an RFC 3339 string.
  DateTime(DateTime<Utc>),
  /// An hour-and-minute wall-clock value. Stored as `H:MM AM/PM`.
  Clock(ClockTime),
  List(Vec<Field>),
  Record(Document),
}

impl Field {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Number(n) => n.as_i64(),
      _ => None,
    }
  }

  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }
}

impl From<bool> for Field {
  fn from(b: bool) -> Self { Self::Bool(b) }
}

impl From<i64> for Field {
  fn from(n: i64) -> Self { Self::Number(Number::from(n)) }
}

impl From<&str> for Field {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Field {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<DateTime<Utc>> for Field {
  fn from(dt: DateTime<Utc>) -> Self { Self::DateTime(dt) }
}

impl From<ClockTime> for Field {
  fn from(t: ClockTime) -> Self { Self::Clock(t) }
}

/// Build a [`Document`] from `(name, value)` pairs.
pub fn doc<const N: usize>(entries: [(&str, Field); N]) -> Document {
  entries.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}
