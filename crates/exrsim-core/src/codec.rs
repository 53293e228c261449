//! The document codec: bidirectional, recursive conversion between typed
//! in-memory field values and the string/primitive forms the storage layer
//! accepts.
//!
//! Two field families need string encoding: date-times (RFC 3339, exact
//! round-trip including UTC offset) and clock-times (`H:MM AM/PM`, 12-hour,
//! no leading zero, uppercase suffix). Decoding is schema-directed for
//! clock-times and heuristic for date-times: any string containing `T` is a
//! candidate, and a failed parse keeps the original string untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  entity::EntitySchema,
  record::{Document, Field},
  store::StoredDocument,
};

// ─── Clock time ──────────────────────────────────────────────────────────────

/// An hour-and-minute value with no date or seconds component, used for the
/// scribe-log time-of-day fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
  /// 0..=23
  pub hour:   u8,
  /// 0..=59
  pub minute: u8,
}

impl ClockTime {
  pub fn new(hour: u8, minute: u8) -> Option<Self> {
    (hour <= 23 && minute <= 59).then_some(Self { hour, minute })
  }
}

/// Format as `H:MM AM/PM` — 12-hour wall clock, no leading zero on the hour.
/// Midnight is `12:00 AM`, noon is `12:00 PM`.
pub fn format_clock_time(t: ClockTime) -> String {
  let suffix = if t.hour < 12 { "AM" } else { "PM" };
  let hour_12 = match t.hour % 12 {
    0 => 12,
    h => h,
  };
  format!("{hour_12}:{:02} {suffix}", t.minute)
}

/// Parse `H:MM AM/PM` (case-insensitive suffix), or bare `HH:MM` which is
/// taken as already-24-hour. Malformed input yields `None`, never an error.
pub fn parse_clock_time(s: &str) -> Option<ClockTime> {
  let s = s.trim();
  if s.is_empty() {
    return None;
  }

  let (digits, suffix) = match s.rsplit_once(' ') {
    Some((front, suf))
      if suf.eq_ignore_ascii_case("AM") || suf.eq_ignore_ascii_case("PM") =>
    {
      (front.trim(), Some(suf.eq_ignore_ascii_case("PM")))
    }
    _ => (s, None),
  };

  let (hour_str, minute_str) = digits.split_once(':')?;
  let hour: u8 = hour_str.trim().parse().ok()?;
  let minute: u8 = minute_str.trim().parse().ok()?;
  if minute > 59 {
    return None;
  }

  match suffix {
    // Bare HH:MM — already 24-hour.
    None => ClockTime::new(hour, minute),
    Some(is_pm) => {
      if !(1..=12).contains(&hour) {
        return None;
      }
      let hour_24 = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
      };
      Some(ClockTime { hour: hour_24, minute })
    }
  }
}

// ─── Date-time ───────────────────────────────────────────────────────────────

pub fn encode_datetime(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

/// Outcome of attempting to recognise a string as a date-time.
///
/// The fallback is a tagged value rather than a swallowed error so callers
/// (and tests) can distinguish "plain string" from "looked like a date-time
/// but failed to parse". Fallbacks are never surfaced as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum DateOutcome {
  Parsed(DateTime<Utc>),
  Fallback(String),
}

/// Try to parse a stored string as a date-time. Only strings containing `T`
/// are candidates; anything else (and any failed parse) falls back to the
/// original string unchanged.
pub fn parse_datetime_candidate(s: String) -> DateOutcome {
  if s.contains('T')
    && let Ok(dt) = DateTime::parse_from_rfc3339(&s)
  {
    return DateOutcome::Parsed(dt.with_timezone(&Utc));
  }
  DateOutcome::Fallback(s)
}

// ─── Document encode ─────────────────────────────────────────────────────────

/// Convert a typed record into the JSON form the storage layer accepts.
///
/// Date-times become RFC 3339 strings, clock-times become `H:MM AM/PM`, and
/// a null in a declared clock-time position becomes an empty string (never
/// JSON null). List-of-record fields are encoded recursively with the
/// schema's nested clock-time field names.
pub fn encode_document(doc: &Document, schema: &EntitySchema) -> StoredDocument {
  encode_map(doc, schema.clock_fields, schema.nested_clock_fields)
}

fn encode_map(
  doc: &Document,
  clock_fields: &[&str],
  nested_clock: &[&str],
) -> StoredDocument {
  doc
    .iter()
    .map(|(key, field)| {
      let in_clock_position = clock_fields.contains(&key.as_str());
      (key.clone(), encode_field(field, in_clock_position, nested_clock))
    })
    .collect()
}

fn encode_field(
  field: &Field,
  in_clock_position: bool,
  nested_clock: &[&str],
) -> Value {
  match field {
    // A missing clock-time encodes to an empty string, never null.
    Field::Null if in_clock_position => Value::String(String::new()),
    Field::Null => Value::Null,
    Field::Bool(b) => Value::Bool(*b),
    Field::Number(n) => Value::Number(n.clone()),
    Field::Text(s) => Value::String(s.clone()),
    Field::DateTime(dt) => Value::String(encode_datetime(*dt)),
    Field::Clock(t) => Value::String(format_clock_time(*t)),
    Field::List(items) => Value::Array(
      items
        .iter()
        .map(|item| encode_field(item, false, nested_clock))
        .collect(),
    ),
    Field::Record(nested) => {
      Value::Object(encode_map(nested, nested_clock, nested_clock))
    }
  }
}

// ─── Document decode ─────────────────────────────────────────────────────────

/// Convert a stored JSON document back into a typed record.
///
/// Declared clock-time fields are parsed from their string form (a
/// malformed or empty string decodes to null, never an error). All other
/// strings go through the date-time heuristic. Decoding never fails:
/// re-encoding a decoded document produces the same stored form.
pub fn decode_document(stored: StoredDocument, schema: &EntitySchema) -> Document {
  decode_map(stored, schema.clock_fields, schema.nested_clock_fields)
}

fn decode_map(
  stored: StoredDocument,
  clock_fields: &[&str],
  nested_clock: &[&str],
) -> Document {
  stored
    .into_iter()
    .map(|(key, value)| {
      let in_clock_position = clock_fields.contains(&key.as_str());
      let field = decode_value(value, in_clock_position, nested_clock);
      (key, field)
    })
    .collect()
}

fn decode_value(
  value: Value,
  in_clock_position: bool,
  nested_clock: &[&str],
) -> Field {
  match value {
    Value::Null => Field::Null,
    Value::Bool(b) => Field::Bool(b),
    Value::Number(n) => Field::Number(n),
    Value::String(s) if in_clock_position => {
      parse_clock_time(&s).map(Field::Clock).unwrap_or(Field::Null)
    }
    Value::String(s) => match parse_datetime_candidate(s) {
      DateOutcome::Parsed(dt) => Field::DateTime(dt),
      DateOutcome::Fallback(original) => Field::Text(original),
    },
    Value::Array(items) => Field::List(
      items
        .into_iter()
        .map(|item| decode_value(item, false, nested_clock))
        .collect(),
    ),
    Value::Object(map) => Field::Record(decode_map(map, nested_clock, nested_clock)),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use serde_json::json;

  use super::*;
  use crate::{entity::EntityKind, record::doc};

  fn clock(hour: u8, minute: u8) -> ClockTime {
    ClockTime::new(hour, minute).unwrap()
  }

  // ── Clock-time formatting ─────────────────────────────────────────────

  #[test]
  fn clock_formatting_follows_wall_clock_convention() {
    assert_eq!(format_clock_time(clock(0, 0)), "12:00 AM");
    assert_eq!(format_clock_time(clock(12, 0)), "12:00 PM");
    assert_eq!(format_clock_time(clock(13, 5)), "1:05 PM");
    assert_eq!(format_clock_time(clock(23, 59)), "11:59 PM");
    assert_eq!(format_clock_time(clock(9, 30)), "9:30 AM");
  }

  #[test]
  fn clock_round_trips_all_minutes_of_the_day() {
    for hour in 0..24u8 {
      for minute in 0..60u8 {
        let t = clock(hour, minute);
        let encoded = format_clock_time(t);
        assert_eq!(parse_clock_time(&encoded), Some(t), "via {encoded:?}");
      }
    }
  }

  #[test]
  fn clock_parse_accepts_bare_24_hour_form() {
    assert_eq!(parse_clock_time("13:05"), Some(clock(13, 5)));
    assert_eq!(parse_clock_time("00:00"), Some(clock(0, 0)));
    assert_eq!(parse_clock_time("23:59"), Some(clock(23, 59)));
  }

  #[test]
  fn clock_parse_is_case_insensitive_on_the_suffix() {
    assert_eq!(parse_clock_time("1:05 pm"), Some(clock(13, 5)));
    assert_eq!(parse_clock_time("12:00 am"), Some(clock(0, 0)));
  }

  #[test]
  fn malformed_clock_strings_yield_none() {
    for s in ["not-a-time", "", "  ", "25:00", "13:60", "13:05 PM", "0:10 AM",
              "12", "a:b PM", "7:5x AM"]
    {
      assert_eq!(parse_clock_time(s), None, "input {s:?}");
    }
  }

  // ── Date-time ─────────────────────────────────────────────────────────

  #[test]
  fn datetime_round_trips_exactly() {
    let t = Utc.with_ymd_and_hms(2024, 12, 15, 9, 0, 0).unwrap();
    let encoded = encode_datetime(t);
    assert_eq!(parse_datetime_candidate(encoded), DateOutcome::Parsed(t));
  }

  #[test]
  fn datetime_parse_preserves_the_instant_across_offsets() {
    // +02:00 normalises to the same UTC instant.
    let outcome = parse_datetime_candidate("2024-12-15T11:00:00+02:00".into());
    let expected = Utc.with_ymd_and_hms(2024, 12, 15, 9, 0, 0).unwrap();
    assert_eq!(outcome, DateOutcome::Parsed(expected));
  }

  #[test]
  fn non_candidate_strings_fall_back_untouched() {
    let outcome = parse_datetime_candidate("Flood Drill".into());
    assert_eq!(outcome, DateOutcome::Fallback("Flood Drill".into()));
  }

  #[test]
  fn failed_candidate_parse_is_a_tagged_fallback() {
    // Contains 'T' so it is attempted, but it is not a date-time.
    let outcome = parse_datetime_candidate("NOT-A-DATE-T".into());
    assert_eq!(outcome, DateOutcome::Fallback("NOT-A-DATE-T".into()));
  }

  // ── Document encode/decode ────────────────────────────────────────────

  #[test]
  fn document_round_trips_through_storage_form() {
    let schema = EntityKind::Exercise.schema();
    let start = Utc.with_ymd_and_hms(2024, 12, 15, 9, 0, 0).unwrap();
    let record = doc([
      ("name", Field::from("Flood Drill")),
      ("start_date", Field::from(start)),
      ("completed", Field::from(false)),
      ("goals", Field::List(vec![Field::Record(doc([
        ("id", Field::from(1)),
        ("name", Field::from("G1")),
      ]))])),
    ]);

    let stored = encode_document(&record, schema);
    assert_eq!(stored["name"], json!("Flood Drill"));
    assert_eq!(stored["start_date"], json!(start.to_rfc3339()));

    let decoded = decode_document(stored, schema);
    assert_eq!(decoded, record);
  }

  #[test]
  fn scribe_clock_fields_encode_as_strings_and_decode_back() {
    let schema = EntityKind::ScribeLog.schema();
    let record = doc([
      ("exercise_id", Field::from("ex-1")),
      ("start_time", Field::from(clock(0, 0))),
      ("end_time", Field::Null),
      ("timeline", Field::List(vec![Field::Record(doc([
        ("time", Field::from(clock(13, 5))),
        ("entry", Field::from("first inject delivered")),
      ]))])),
    ]);

    let stored = encode_document(&record, schema);
    assert_eq!(stored["start_time"], json!("12:00 AM"));
    // Missing clock-time encodes to an empty string, never null.
    assert_eq!(stored["end_time"], json!(""));
    assert_eq!(stored["timeline"][0]["time"], json!("1:05 PM"));

    let decoded = decode_document(stored, schema);
    assert_eq!(decoded, record);
  }

  #[test]
  fn malformed_clock_field_decodes_to_null_not_error() {
    let schema = EntityKind::ScribeLog.schema();
    let stored: StoredDocument = json!({ "start_time": "not-a-time" })
      .as_object()
      .unwrap()
      .clone();
    let decoded = decode_document(stored, schema);
    assert_eq!(decoded["start_time"], Field::Null);
  }

  #[test]
  fn decode_is_idempotent_through_the_storage_form() {
    let schema = EntityKind::Exercise.schema();
    let stored: StoredDocument = json!({
      "name": "Flood Drill",
      "start_date": "2024-12-15T09:00:00+00:00",
      "notes": "contains a T but is plain text",
    })
    .as_object()
    .unwrap()
    .clone();

    let once = decode_document(stored, schema);
    let again = decode_document(encode_document(&once, schema), schema);
    assert_eq!(again, once);
    // The near-miss string stayed a plain string both times.
    assert_eq!(once["notes"], Field::from("contains a T but is plain text"));
  }
}
