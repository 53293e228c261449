//! The `RecordStore` trait and supporting filter types.
//!
//! The trait is the sole boundary between the core and the underlying
//! document database; every other component is I/O-free and unit-testable
//! without one. Implemented by storage backends (e.g.
//! `exrsim-store-sqlite`); higher layers depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use serde_json::Value;

/// The storage-safe form of one record: a JSON object whose date-time and
/// clock-time fields are string-encoded (see [`crate::codec`]).
pub type StoredDocument = serde_json::Map<String, Value>;

/// Cap applied to unbounded listings. The API deliberately uses a generous
/// finite limit instead of pagination — a documented limitation.
pub const DEFAULT_FIND_LIMIT: usize = 1000;

// ─── Filter ──────────────────────────────────────────────────────────────────

/// A predicate over one collection's records.
#[derive(Debug, Clone, Default)]
pub enum Filter {
  /// Every record in the collection.
  #[default]
  All,
  /// Conjunction of field = value equality tests.
  Eq(Vec<(String, Value)>),
  /// Case-insensitive substring match on one field. Used for the
  /// coordinator / safety-officer position lookups.
  Contains { field: String, pattern: String },
}

impl Filter {
  /// Equality on the record's `id` field.
  pub fn id(id: &str) -> Self {
    Self::Eq(vec![("id".to_owned(), Value::String(id.to_owned()))])
  }

  pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
    Self::Eq(vec![(field.into(), value.into())])
  }

  pub fn contains(field: impl Into<String>, pattern: impl Into<String>) -> Self {
    Self::Contains { field: field.into(), pattern: pattern.into() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a document-collection storage backend.
///
/// Each record has exactly two observable states, present and absent, and
/// every operation is a single atomic transition as provided by the
/// underlying store. "Not found" is a return value, never an error, so
/// callers can surface a 404-equivalent distinctly from backend failures.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the first record matching `filter`, or `None`.
  fn find_one<'a>(
    &'a self,
    collection: &'a str,
    filter: Filter,
  ) -> impl Future<Output = Result<Option<StoredDocument>, Self::Error>> + Send + 'a;

  /// Fetch matching records in insertion order, up to `limit`.
  fn find_many<'a>(
    &'a self,
    collection: &'a str,
    filter: Filter,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<StoredDocument>, Self::Error>> + Send + 'a;

  /// Persist exactly one record. The document must carry an `id` field;
  /// an id collision is an error (never expected, never retried).
  fn insert_one<'a>(
    &'a self,
    collection: &'a str,
    doc: StoredDocument,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Apply a field-level merge (not a full replacement) to the first
  /// record matching `filter`. Returns whether a record matched.
  fn update_merge<'a>(
    &'a self,
    collection: &'a str,
    filter: Filter,
    partial: StoredDocument,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove the first record matching `filter`. Returns whether a record
  /// was deleted.
  fn delete_one<'a>(
    &'a self,
    collection: &'a str,
    filter: Filter,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Distinct non-null, non-empty values of `field` across the collection,
  /// in ascending order. Backs the dropdown-style lookups (e.g. the
  /// provinces of the saved weather locations).
  fn distinct_values<'a>(
    &'a self,
    collection: &'a str,
    field: &'a str,
  ) -> impl Future<Output = Result<Vec<Value>, Self::Error>> + Send + 'a;
}
