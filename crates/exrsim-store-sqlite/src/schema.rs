//! SQL schema for the EXRSIM SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// One table holds every collection. `seq` preserves insertion order for
/// listings; `(collection, id)` is the logical primary key.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS records (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    id         TEXT NOT NULL,
    doc        TEXT NOT NULL,   -- the record as a JSON object
    UNIQUE (collection, id)
);

CREATE INDEX IF NOT EXISTS records_collection_idx ON records(collection);

PRAGMA user_version = 1;
";
