//! The generic record service — the five-operation contract every entity
//! route consumes.
//!
//! Composes the lifecycle manager, the document codec, and a
//! [`RecordStore`] backend: validate → stamp → encode → persist on the way
//! in, fetch → decode on the way out. Entity handlers hold no persistence
//! logic of their own.

use serde_json::Value;

use crate::{
  codec,
  entity::EntityKind,
  error::Error,
  lifecycle,
  record::Document,
  store::{DEFAULT_FIND_LIMIT, Filter, RecordStore},
  Result,
};

/// The record service, generic over its storage backend.
///
/// Cloning is as cheap as cloning the backend handle.
#[derive(Clone)]
pub struct RecordService<S> {
  store: S,
}

impl<S: RecordStore> RecordService<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Create a record: validate mandatory fields, assign id and timestamps,
  /// and persist. Returns the full stored record.
  pub async fn create(&self, kind: EntityKind, payload: Document) -> Result<Document> {
    let record = lifecycle::prepare_create(kind, payload)?;
    let stored = codec::encode_document(&record, kind.schema());
    self
      .store
      .insert_one(kind.collection(), stored)
      .await
      .map_err(box_store_err)?;
    Ok(record)
  }

  /// Fetch one record by id, decoded back to its typed form.
  pub async fn get(&self, kind: EntityKind, id: &str) -> Result<Document> {
    let stored = self
      .store
      .find_one(kind.collection(), Filter::id(id))
      .await
      .map_err(box_store_err)?
      .ok_or_else(|| Error::NotFound {
        collection: kind.collection(),
        id:         id.to_owned(),
      })?;
    Ok(codec::decode_document(stored, kind.schema()))
  }

  /// List records matching `filter`, in insertion order, capped at
  /// [`DEFAULT_FIND_LIMIT`].
  pub async fn list(&self, kind: EntityKind, filter: Filter) -> Result<Vec<Document>> {
    let stored = self
      .store
      .find_many(kind.collection(), filter, DEFAULT_FIND_LIMIT)
      .await
      .map_err(box_store_err)?;
    Ok(
      stored
        .into_iter()
        .map(|doc| codec::decode_document(doc, kind.schema()))
        .collect(),
    )
  }

  /// Apply a partial update: keys present in `payload` overwrite, all
  /// other fields are left untouched, and `id`/`created_at` are immutable.
  /// Returns the merged record.
  ///
  /// The read-merge-write round trip is not compare-and-swap protected;
  /// two concurrent updates to the same id can lose one writer's fields.
  pub async fn update(
    &self,
    kind: EntityKind,
    id: &str,
    payload: Document,
  ) -> Result<Document> {
    let existing = self.get(kind, id).await?;
    let merged = lifecycle::prepare_update(kind, &existing, &payload);

    // Write back only the keys the payload touched (plus the refreshed
    // stamp), so untouched fields are not even re-serialised.
    let mut changed = Document::new();
    for key in payload.keys() {
      if key == "id" || key == "created_at" {
        continue;
      }
      if let Some(value) = merged.get(key) {
        changed.insert(key.clone(), value.clone());
      }
    }
    if let Some(stamp) = merged.get("updated_at")
      && kind.schema().tracks_updated_at
    {
      changed.insert("updated_at".to_owned(), stamp.clone());
    }

    let partial = codec::encode_document(&changed, kind.schema());
    let matched = self
      .store
      .update_merge(kind.collection(), Filter::id(id), partial)
      .await
      .map_err(box_store_err)?;
    if !matched {
      return Err(Error::NotFound {
        collection: kind.collection(),
        id:         id.to_owned(),
      });
    }
    Ok(merged)
  }

  /// Distinct values of one field across the collection, ascending.
  pub async fn distinct(&self, kind: EntityKind, field: &str) -> Result<Vec<Value>> {
    self
      .store
      .distinct_values(kind.collection(), field)
      .await
      .map_err(box_store_err)
  }

  /// Delete one record by id.
  pub async fn delete(&self, kind: EntityKind, id: &str) -> Result<()> {
    let deleted = self
      .store
      .delete_one(kind.collection(), Filter::id(id))
      .await
      .map_err(box_store_err)?;
    if !deleted {
      return Err(Error::NotFound {
        collection: kind.collection(),
        id:         id.to_owned(),
      });
    }
    Ok(())
  }
}

fn box_store_err<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}
