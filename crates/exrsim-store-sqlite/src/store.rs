//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::{types::Value as SqlValue, OptionalExtension as _};
use serde_json::Value;

use exrsim_core::store::{Filter, RecordStore, StoredDocument};

use crate::{schema::SCHEMA, Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An EXRSIM record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The handle
/// is injected here rather than read from process-wide state; the process
/// entry point opens it at startup and drops it at shutdown.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a query whose single selected column is the `doc` JSON text.
  async fn query_docs(
    &self,
    sql: String,
    params: Vec<SqlValue>,
  ) -> Result<Vec<String>> {
    let texts = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            row.get::<_, String>(0)
          })?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(texts)
  }
}

// ─── Filter compilation ──────────────────────────────────────────────────────

/// Append the WHERE fragment for `filter` (each condition prefixed with
/// ` AND`, following a `collection = ?` test) and push its bind values.
fn filter_clause(filter: Filter, params: &mut Vec<SqlValue>) -> String {
  match filter {
    Filter::All => String::new(),
    Filter::Eq(pairs) => {
      let mut clause = String::new();
      for (field, value) in pairs {
        params.push(SqlValue::Text(format!("$.{field}")));
        params.push(bind_json(&value));
        clause.push_str(" AND json_extract(doc, ?) = ?");
      }
      clause
    }
    Filter::Contains { field, pattern } => {
      params.push(SqlValue::Text(format!("$.{field}")));
      params.push(SqlValue::Text(pattern.to_lowercase()));
      " AND instr(lower(json_extract(doc, ?)), ?) > 0".to_owned()
    }
  }
}

/// Convert a JSON scalar to its bindable SQLite form. Matches how
/// `json_extract` surfaces values: strings unquoted, booleans as 0/1.
fn bind_json(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    other => SqlValue::Text(other.to_string()),
  }
}

/// Convert a SQLite value surfaced by `json_extract` back to JSON.
fn sql_to_json(value: SqlValue) -> Option<Value> {
  match value {
    SqlValue::Null => None,
    SqlValue::Integer(i) => Some(Value::Number(i.into())),
    SqlValue::Real(f) => serde_json::Number::from_f64(f).map(Value::Number),
    SqlValue::Text(s) => Some(Value::String(s)),
    SqlValue::Blob(_) => None,
  }
}

fn parse_doc(text: &str, collection: &str) -> Result<StoredDocument> {
  match serde_json::from_str::<Value>(text)? {
    Value::Object(map) => Ok(map),
    _ => Err(Error::Corrupt { collection: collection.to_owned() }),
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn find_one(
    &self,
    collection: &str,
    filter: Filter,
  ) -> Result<Option<StoredDocument>> {
    let mut params = vec![SqlValue::Text(collection.to_owned())];
    let clause = filter_clause(filter, &mut params);
    let sql = format!(
      "SELECT doc FROM records WHERE collection = ?{clause} ORDER BY seq LIMIT 1"
    );

    let texts = self.query_docs(sql, params).await?;
    texts
      .first()
      .map(|text| parse_doc(text, collection))
      .transpose()
  }

  async fn find_many(
    &self,
    collection: &str,
    filter: Filter,
    limit: usize,
  ) -> Result<Vec<StoredDocument>> {
    let mut params = vec![SqlValue::Text(collection.to_owned())];
    let clause = filter_clause(filter, &mut params);
    params.push(SqlValue::Integer(limit as i64));
    let sql = format!(
      "SELECT doc FROM records WHERE collection = ?{clause} ORDER BY seq LIMIT ?"
    );

    let texts = self.query_docs(sql, params).await?;
    texts
      .iter()
      .map(|text| parse_doc(text, collection))
      .collect()
  }

  async fn insert_one(&self, collection: &str, doc: StoredDocument) -> Result<()> {
    let id = doc
      .get("id")
      .and_then(Value::as_str)
      .ok_or(Error::MissingId)?
      .to_owned();

    let collection_owned = collection.to_owned();
    let id_param = id.clone();
    let doc_text = Value::Object(doc).to_string();

    let outcome = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (collection, id, doc) VALUES (?1, ?2, ?3)",
          rusqlite::params![collection_owned, id_param, doc_text],
        )?;
        Ok(())
      })
      .await;

    match outcome {
      Ok(()) => Ok(()),
      Err(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)))
        if e.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Err(Error::DuplicateId { collection: collection.to_owned(), id })
      }
      Err(e) => Err(Error::Database(e)),
    }
  }

  async fn update_merge(
    &self,
    collection: &str,
    filter: Filter,
    partial: StoredDocument,
  ) -> Result<bool> {
    let mut params = vec![SqlValue::Text(collection.to_owned())];
    let clause = filter_clause(filter, &mut params);
    let sql = format!(
      "SELECT seq, doc FROM records WHERE collection = ?{clause} ORDER BY seq LIMIT 1"
    );

    // Read, merge, and write back inside one connection call so no other
    // operation on this store interleaves with the merge.
    let matched = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(&sql, rusqlite::params_from_iter(params), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
          })
          .optional()?;

        let Some((seq, doc_text)) = row else {
          return Ok(false);
        };

        let mut doc: Value = serde_json::from_str(&doc_text)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        if let Value::Object(map) = &mut doc {
          for (key, value) in partial {
            map.insert(key, value);
          }
        }

        conn.execute(
          "UPDATE records SET doc = ?1 WHERE seq = ?2",
          rusqlite::params![doc.to_string(), seq],
        )?;
        Ok(true)
      })
      .await?;

    Ok(matched)
  }

  async fn distinct_values(
    &self,
    collection: &str,
    field: &str,
  ) -> Result<Vec<Value>> {
    let params = vec![
      SqlValue::Text(collection.to_owned()),
      SqlValue::Text(format!("$.{field}")),
    ];
    let sql = "SELECT DISTINCT json_extract(doc, ?2) FROM records
               WHERE collection = ?1
                 AND json_extract(doc, ?2) IS NOT NULL
                 AND json_extract(doc, ?2) != ''
               ORDER BY 1";

    let values = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            row.get::<_, SqlValue>(0)
          })?
          .collect::<rusqlite::Result<Vec<SqlValue>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(values.into_iter().filter_map(sql_to_json).collect())
  }

  async fn delete_one(&self, collection: &str, filter: Filter) -> Result<bool> {
    let mut params = vec![SqlValue::Text(collection.to_owned())];
    let clause = filter_clause(filter, &mut params);
    let sql = format!(
      "DELETE FROM records WHERE seq = (
         SELECT seq FROM records WHERE collection = ?{clause}
         ORDER BY seq LIMIT 1
       )"
    );

    let deleted = self
      .conn
      .call(move |conn| {
        let count = conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(count > 0)
      })
      .await?;

    Ok(deleted)
  }
}
