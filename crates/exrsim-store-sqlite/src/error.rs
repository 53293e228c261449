//! Error type for `exrsim-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Identifier collision on insert. Ids are 128-bit random, so this is
  /// never expected; it propagates uncaught — there is no regeneration or
  /// retry logic.
  #[error("duplicate id in {collection}: {id}")]
  DuplicateId { collection: String, id: String },

  /// The document handed to `insert_one` carries no string `id` field.
  #[error("document has no \"id\" field")]
  MissingId,

  /// A stored `doc` column did not contain a JSON object.
  #[error("stored document in {collection} is not a JSON object")]
  Corrupt { collection: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
