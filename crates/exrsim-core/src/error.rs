//! Error types for `exrsim-core`.
//!
//! Only two conditions are ever surfaced to clients: a payload missing a
//! mandatory field, and a lookup for an id that is not in its collection.
//! Everything else (backend unavailable, id collisions) propagates as an
//! opaque store error — there is no retry anywhere in this crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The creation payload omitted (or set to null) a field the entity
  /// schema declares mandatory.
  #[error("{entity} payload is missing mandatory field {field:?}")]
  MissingField {
    entity: &'static str,
    field:  &'static str,
  },

  #[error("record not found in {collection}: {id}")]
  NotFound {
    collection: &'static str,
    id:         String,
  },

  /// An error from the storage backend, including id collisions — those
  /// are never expected (ids are 128-bit random) and never retried.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
