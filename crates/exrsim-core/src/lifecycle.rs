//! The record lifecycle manager.
//!
//! Owns the identity and temporal metadata of every record: id assignment
//! at creation, timestamp stamping, and partial-update merging. These are
//! pure functions over their inputs (plus the clock) — they perform no I/O
//! and never partially apply.

use chrono::Utc;
use uuid::Uuid;

use crate::{
  entity::EntityKind,
  error::Error,
  record::{Document, Field},
  Result,
};

/// Generate a fresh opaque record identifier — a random UUID, hyphenated.
/// 128 random bits make collision probability negligible; there is no
/// retry-on-collision logic anywhere.
pub fn new_record_id() -> String { Uuid::new_v4().hyphenated().to_string() }

/// Build the full record for a creation payload: verify the schema's
/// mandatory fields, assign a fresh id, and stamp `created_at` (and
/// `updated_at`, where the entity tracks it) with the current UTC instant.
///
/// Any `id`, `created_at`, or `updated_at` supplied by the caller is
/// overwritten — those fields are server-assigned. Clock-time fields the
/// schema declares are materialised as null when the payload omits them.
pub fn prepare_create(kind: EntityKind, payload: Document) -> Result<Document> {
  let schema = kind.schema();
  for field in schema.mandatory.iter().copied() {
    match payload.get(field) {
      None | Some(Field::Null) => {
        return Err(Error::MissingField { entity: schema.collection, field });
      }
      Some(_) => {}
    }
  }

  let now = Utc::now();
  let mut record = payload;
  record.insert("id".to_owned(), Field::Text(new_record_id()));
  record.insert("created_at".to_owned(), Field::DateTime(now));
  if schema.tracks_updated_at {
    record.insert("updated_at".to_owned(), Field::DateTime(now));
  }
  // Declared clock-time fields always exist in the stored record, so an
  // omitted one is stamped null here and lands in storage as `""`.
  for field in schema.clock_fields.iter().copied() {
    record.entry(field.to_owned()).or_insert(Field::Null);
  }
  Ok(record)
}

/// Merge a partial update onto an existing record.
///
/// Every key present in `payload` overwrites the existing value; keys
/// absent from `payload` — including nested list fields — are preserved
/// unchanged. `id` and `created_at` are immutable and ignored even if
/// supplied. `updated_at` is refreshed where the entity tracks it.
pub fn prepare_update(
  kind: EntityKind,
  existing: &Document,
  payload: &Document,
) -> Document {
  let mut merged = existing.clone();
  for (key, value) in payload {
    if key == "id" || key == "created_at" {
      continue;
    }
    merged.insert(key.clone(), value.clone());
  }
  if kind.schema().tracks_updated_at {
    merged.insert("updated_at".to_owned(), Field::DateTime(Utc::now()));
  }
  merged
}

/// Compute the next value of a per-parent incrementing counter: `max + 1`
/// over the given records' `key` field, starting at 1.
///
/// Only unique within the set passed in — the caller must pre-filter to the
/// records sharing the same parent (e.g. all lessons of one exercise).
pub fn next_sequence(records: &[Document], key: &str) -> i64 {
  records
    .iter()
    .filter_map(|record| record.get(key))
    .filter_map(Field::as_i64)
    .max()
    .unwrap_or(0)
    + 1
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;
  use crate::record::doc;

  fn exercise_payload() -> Document {
    doc([
      ("name", Field::from("Flood Drill")),
      ("description", Field::from("River overflow tabletop")),
      ("start_date", Field::from("2024-12-15")),
      ("end_date", Field::from("2024-12-16")),
    ])
  }

  // ── prepare_create ────────────────────────────────────────────────────

  #[test]
  fn create_assigns_id_and_timestamps() {
    let record = prepare_create(EntityKind::Exercise, exercise_payload()).unwrap();

    assert!(matches!(record.get("id"), Some(Field::Text(id)) if !id.is_empty()));
    assert!(matches!(record.get("created_at"), Some(Field::DateTime(_))));
    assert!(matches!(record.get("updated_at"), Some(Field::DateTime(_))));
    assert_eq!(record["name"], Field::from("Flood Drill"));
  }

  #[test]
  fn create_skips_updated_at_where_untracked() {
    let payload = doc([
      ("name", Field::from("Jordan Millar")),
      ("email", Field::from("jordan@example.com")),
      ("phone", Field::from("555-0123")),
      ("role", Field::from("safety_officer")),
    ]);
    let record = prepare_create(EntityKind::Participant, payload).unwrap();
    assert!(record.get("updated_at").is_none());
    assert!(record.get("created_at").is_some());
  }

  #[test]
  fn create_rejects_missing_mandatory_field() {
    let mut payload = exercise_payload();
    payload.remove("description");
    let err = prepare_create(EntityKind::Exercise, payload).unwrap_err();
    assert!(matches!(
      err,
      Error::MissingField { field: "description", .. }
    ));
  }

  #[test]
  fn create_rejects_null_mandatory_field() {
    let mut payload = exercise_payload();
    payload.insert("name".into(), Field::Null);
    assert!(prepare_create(EntityKind::Exercise, payload).is_err());
  }

  #[test]
  fn create_overwrites_caller_supplied_id() {
    let mut payload = exercise_payload();
    payload.insert("id".into(), Field::from("spoofed"));
    let record = prepare_create(EntityKind::Exercise, payload).unwrap();
    assert_ne!(record["id"], Field::from("spoofed"));
  }

  #[test]
  fn create_materialises_omitted_clock_fields_as_null() {
    let payload = doc([("exercise_id", Field::from("ex1"))]);
    let record = prepare_create(EntityKind::ScribeLog, payload).unwrap();
    assert_eq!(record.get("start_time"), Some(&Field::Null));
    assert_eq!(record.get("end_time"), Some(&Field::Null));

    let payload = doc([
      ("exercise_id", Field::from("ex1")),
      ("start_time", Field::from(crate::codec::ClockTime::new(9, 0).unwrap())),
    ]);
    let record = prepare_create(EntityKind::ScribeLog, payload).unwrap();
    assert!(matches!(record.get("start_time"), Some(Field::Clock(_))));
    assert_eq!(record.get("end_time"), Some(&Field::Null));
  }

  #[test]
  fn hundred_thousand_ids_have_no_duplicates() {
    let ids: HashSet<String> = (0..100_000).map(|_| new_record_id()).collect();
    assert_eq!(ids.len(), 100_000);
  }

  // ── prepare_update ────────────────────────────────────────────────────

  #[test]
  fn update_overwrites_only_present_keys() {
    let existing = prepare_create(EntityKind::Exercise, exercise_payload()).unwrap();
    let patch = doc([("name", Field::from("renamed"))]);

    let merged = prepare_update(EntityKind::Exercise, &existing, &patch);

    assert_eq!(merged["name"], Field::from("renamed"));
    assert_eq!(merged["description"], existing["description"]);
    assert_eq!(merged["start_date"], existing["start_date"]);
  }

  #[test]
  fn update_preserves_untouched_nested_lists() {
    let goals = Field::List(vec![Field::Record(doc([
      ("id", Field::from(1)),
      ("name", Field::from("G1")),
    ]))]);
    let mut payload = exercise_payload();
    payload.insert("goals".into(), goals.clone());
    let existing = prepare_create(EntityKind::Exercise, payload).unwrap();

    let patch = doc([("name", Field::from("renamed"))]);
    let merged = prepare_update(EntityKind::Exercise, &existing, &patch);

    assert_eq!(merged["goals"], goals);
  }

  #[test]
  fn update_never_changes_id_or_created_at() {
    let existing = prepare_create(EntityKind::Exercise, exercise_payload()).unwrap();
    let patch = doc([
      ("id", Field::from("spoofed")),
      ("created_at", Field::from("1970-01-01T00:00:00+00:00")),
      ("name", Field::from("renamed")),
    ]);

    let merged = prepare_update(EntityKind::Exercise, &existing, &patch);

    assert_eq!(merged["id"], existing["id"]);
    assert_eq!(merged["created_at"], existing["created_at"]);
    assert_eq!(merged["name"], Field::from("renamed"));
  }

  #[test]
  fn update_refreshes_updated_at_where_tracked() {
    let existing = prepare_create(EntityKind::Exercise, exercise_payload()).unwrap();
    let merged = prepare_update(EntityKind::Exercise, &existing, &Document::new());
    assert!(matches!(merged.get("updated_at"), Some(Field::DateTime(_))));
  }

  // ── next_sequence ─────────────────────────────────────────────────────

  #[test]
  fn next_sequence_starts_at_one_and_increments_the_max() {
    assert_eq!(next_sequence(&[], "serial_number"), 1);

    let records = vec![
      doc([("serial_number", Field::from(2))]),
      doc([("serial_number", Field::from(7))]),
      doc([("serial_number", Field::from(4))]),
    ];
    assert_eq!(next_sequence(&records, "serial_number"), 8);
  }

  #[test]
  fn next_sequence_ignores_records_without_the_key() {
    let records = vec![
      doc([("serial_number", Field::from(3))]),
      doc([("name", Field::from("no serial"))]),
    ];
    assert_eq!(next_sequence(&records, "serial_number"), 4);
  }
}
