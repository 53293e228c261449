//! SQLite backend for the EXRSIM record store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread pool without blocking the async runtime. Records are stored as
//! JSON documents in a single table and filtered with SQLite's
//! `json_extract`.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
