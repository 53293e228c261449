//! Lookups that need their own paths.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/participants/position/{pattern}` | Case-insensitive substring match on `position` |
//! | `GET`  | `/lessons-learned/serial/{exercise_id}` | Next serial number scoped to the exercise |
//! | `GET`  | `/weather-locations/provinces` | Distinct provinces of the saved weather locations |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use exrsim_core::{
  entity::EntityKind,
  lifecycle,
  service::RecordService,
  store::{Filter, RecordStore},
};
use serde_json::{Value, json};

use crate::{error::ApiError, records::encode_response};

/// `GET /participants/position/{pattern}` — e.g. `coordinator` or
/// `safety officer`.
pub async fn participants_by_position<S: RecordStore>(
  State(service): State<Arc<RecordService<S>>>,
  Path(pattern): Path<String>,
) -> Result<Json<Value>, ApiError> {
  let kind = EntityKind::Participant;
  let records = service
    .list(kind, Filter::contains("position", pattern))
    .await?;
  let encoded: Vec<Value> = records
    .iter()
    .map(|record| encode_response(kind, record))
    .collect();
  Ok(Json(Value::Array(encoded)))
}

/// `GET /weather-locations/provinces` — the distinct provinces across the
/// saved weather locations, ascending. Feeds the location-picker dropdown.
pub async fn weather_location_provinces<S: RecordStore>(
  State(service): State<Arc<RecordService<S>>>,
) -> Result<Json<Value>, ApiError> {
  let provinces = service
    .distinct(EntityKind::WeatherLocation, "province")
    .await?;
  Ok(Json(Value::Array(provinces)))
}

/// `GET /lessons-learned/serial/{exercise_id}` — the serial number the next
/// lesson for this exercise should carry. Only unique within the exercise's
/// own lessons.
pub async fn next_lesson_serial<S: RecordStore>(
  State(service): State<Arc<RecordService<S>>>,
  Path(exercise_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
  let lessons = service
    .list(
      EntityKind::LessonLearned,
      Filter::eq("exercise_id", exercise_id),
    )
    .await?;
  let serial = lifecycle::next_sequence(&lessons, "serial_number");
  Ok(Json(json!({ "serial_number": serial })))
}
