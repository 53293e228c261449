//! Generic per-collection CRUD handlers.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/{collection}` | Query params become equality filters, e.g. `?exercise_id=…` |
//! | `POST`   | `/{collection}` | Body: creation payload; returns 201 + stored record |
//! | `GET`    | `/{collection}/{id}` | 404 if not found |
//! | `PUT`    | `/{collection}/{id}` | Partial merge — only supplied keys overwrite |
//! | `DELETE` | `/{collection}/{id}` | 404 if not found |
//!
//! The collection segment is resolved against the entity catalog; an
//! unknown collection is a 404.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use exrsim_core::{
  codec,
  entity::EntityKind,
  record::Document,
  service::RecordService,
  store::{Filter, RecordStore},
};
use serde_json::{Value, json};

use crate::error::ApiError;

// ─── Shared helpers ──────────────────────────────────────────────────────────

fn kind_for(collection: &str) -> Result<EntityKind, ApiError> {
  EntityKind::from_collection(collection)
    .ok_or_else(|| ApiError::NotFound(format!("unknown collection {collection:?}")))
}

/// Decode a JSON request body into the typed document form.
fn decode_body(kind: EntityKind, body: Value) -> Result<Document, ApiError> {
  match body {
    Value::Object(map) => Ok(codec::decode_document(map, kind.schema())),
    _ => Err(ApiError::BadRequest("request body must be a JSON object".into())),
  }
}

/// Encode a typed record back into its JSON wire form.
pub(crate) fn encode_response(kind: EntityKind, record: &Document) -> Value {
  Value::Object(codec::encode_document(record, kind.schema()))
}

/// Interpret a query-param value the way it will be compared. Stored
/// numbers and booleans never equal a bound string, so numeric- and
/// boolean-looking values coerce; everything else matches as a string.
fn query_value(raw: String) -> Value {
  if let Ok(n) = raw.parse::<i64>() {
    return Value::Number(n.into());
  }
  if let Ok(f) = raw.parse::<f64>()
    && let Some(n) = serde_json::Number::from_f64(f)
  {
    return Value::Number(n);
  }
  if let Ok(b) = raw.parse::<bool>() {
    return Value::Bool(b);
  }
  Value::String(raw)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /{collection}[?field=value…]`
pub async fn list<S: RecordStore>(
  State(service): State<Arc<RecordService<S>>>,
  Path(collection): Path<String>,
  Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
  let kind = kind_for(&collection)?;

  let filter = if params.is_empty() {
    Filter::All
  } else {
    Filter::Eq(
      params
        .into_iter()
        .map(|(field, value)| (field, query_value(value)))
        .collect(),
    )
  };

  let records = service.list(kind, filter).await?;
  let encoded: Vec<Value> = records
    .iter()
    .map(|record| encode_response(kind, record))
    .collect();
  Ok(Json(Value::Array(encoded)))
}

/// `POST /{collection}` — returns 201 + the stored record.
pub async fn create<S: RecordStore>(
  State(service): State<Arc<RecordService<S>>>,
  Path(collection): Path<String>,
  Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
  let kind = kind_for(&collection)?;
  let payload = decode_body(kind, body)?;
  let record = service.create(kind, payload).await?;
  Ok((StatusCode::CREATED, Json(encode_response(kind, &record))))
}

/// `GET /{collection}/{id}`
pub async fn get_one<S: RecordStore>(
  State(service): State<Arc<RecordService<S>>>,
  Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
  let kind = kind_for(&collection)?;
  let record = service.get(kind, &id).await?;
  Ok(Json(encode_response(kind, &record)))
}

/// `PUT /{collection}/{id}` — partial merge; omitted fields are untouched.
pub async fn update<S: RecordStore>(
  State(service): State<Arc<RecordService<S>>>,
  Path((collection, id)): Path<(String, String)>,
  Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
  let kind = kind_for(&collection)?;
  let payload = decode_body(kind, body)?;
  let record = service.update(kind, &id, payload).await?;
  Ok(Json(encode_response(kind, &record)))
}

/// `DELETE /{collection}/{id}`
pub async fn delete<S: RecordStore>(
  State(service): State<Arc<RecordService<S>>>,
  Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
  let kind = kind_for(&collection)?;
  service.delete(kind, &id).await?;
  Ok(Json(json!({ "message": format!("record {id} deleted") })))
}
