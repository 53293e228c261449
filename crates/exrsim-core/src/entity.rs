//! The entity catalog.
//!
//! Every domain entity is the same generic record shape; the only things
//! that vary per entity are captured in a static [`EntitySchema`]: the
//! collection name, the mandatory-field set, the clock-time field names,
//! and whether the entity tracks `updated_at`. Handlers never re-implement
//! any of this per entity.

use serde::{Deserialize, Serialize};

/// The kind of domain entity a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  Exercise,
  HiraEntry,
  MselEvent,
  Participant,
  ScribeLog,
  EvaluationReport,
  MapObject,
  WeatherLocation,
  Resource,
  Location,
  LessonLearned,
}

/// The per-entity parameters of the persistence pipeline.
#[derive(Debug)]
pub struct EntitySchema {
  /// Collection name; doubles as the API route segment.
  pub collection:          &'static str,
  /// Fields that must be present (and non-null) in a creation payload.
  pub mandatory:           &'static [&'static str],
  /// Top-level fields holding a clock-time (`H:MM AM/PM`) string.
  pub clock_fields:        &'static [&'static str],
  /// Clock-time fields inside nested list items (scribe timeline entries).
  pub nested_clock_fields: &'static [&'static str],
  /// Whether updates refresh an `updated_at` stamp. The simpler entities
  /// carry only `created_at`.
  pub tracks_updated_at:   bool,
}

impl EntityKind {
  pub const ALL: [EntityKind; 11] = [
    Self::Exercise,
    Self::HiraEntry,
    Self::MselEvent,
    Self::Participant,
    Self::ScribeLog,
    Self::EvaluationReport,
    Self::MapObject,
    Self::WeatherLocation,
    Self::Resource,
    Self::Location,
    Self::LessonLearned,
  ];

  pub fn schema(self) -> &'static EntitySchema {
    match self {
      Self::Exercise => &EntitySchema {
        collection:          "exercises",
        mandatory:           &["name", "description", "start_date", "end_date"],
        clock_fields:        &[],
        nested_clock_fields: &[],
        tracks_updated_at:   true,
      },
      Self::HiraEntry => &EntitySchema {
        collection:          "hira",
        mandatory:           &[
          "name",
          "description",
          "disaster_type",
          "frequency",
          "fatalities",
          "injuries",
          "evacuation",
          "property_damage",
          "critical_infrastructure",
          "environmental_damage",
          "business_financial_impact",
          "psychosocial_impact",
        ],
        clock_fields:        &[],
        nested_clock_fields: &[],
        tracks_updated_at:   false,
      },
      Self::MselEvent => &EntitySchema {
        collection:          "msel",
        mandatory:           &[
          "exercise_id",
          "event_number",
          "time_offset",
          "event_description",
        ],
        clock_fields:        &[],
        nested_clock_fields: &[],
        tracks_updated_at:   false,
      },
      Self::Participant => &EntitySchema {
        collection:          "participants",
        mandatory:           &["name", "email", "phone", "role"],
        clock_fields:        &[],
        nested_clock_fields: &[],
        tracks_updated_at:   false,
      },
      Self::ScribeLog => &EntitySchema {
        collection:          "scribe-logs",
        mandatory:           &["exercise_id"],
        clock_fields:        &["start_time", "end_time"],
        nested_clock_fields: &["time"],
        tracks_updated_at:   true,
      },
      Self::EvaluationReport => &EntitySchema {
        collection:          "evaluations",
        mandatory:           &["exercise_id"],
        clock_fields:        &[],
        nested_clock_fields: &[],
        tracks_updated_at:   true,
      },
      Self::MapObject => &EntitySchema {
        collection:          "map-objects",
        mandatory:           &["exercise_id", "object_type"],
        clock_fields:        &[],
        nested_clock_fields: &[],
        tracks_updated_at:   true,
      },
      Self::WeatherLocation => &EntitySchema {
        collection:          "weather-locations",
        mandatory:           &["name"],
        clock_fields:        &[],
        nested_clock_fields: &[],
        tracks_updated_at:   true,
      },
      Self::Resource => &EntitySchema {
        collection:          "resources",
        mandatory:           &["name"],
        clock_fields:        &[],
        nested_clock_fields: &[],
        tracks_updated_at:   true,
      },
      Self::Location => &EntitySchema {
        collection:          "locations",
        mandatory:           &["name"],
        clock_fields:        &[],
        nested_clock_fields: &[],
        tracks_updated_at:   true,
      },
      Self::LessonLearned => &EntitySchema {
        collection:          "lessons-learned",
        mandatory:           &["exercise_id"],
        clock_fields:        &[],
        nested_clock_fields: &[],
        tracks_updated_at:   true,
      },
    }
  }

  pub fn collection(self) -> &'static str { self.schema().collection }

  /// Resolve an API route segment / collection name back to its kind.
  pub fn from_collection(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|kind| kind.collection() == name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn collection_names_are_unique_and_resolvable() {
    for kind in EntityKind::ALL {
      assert_eq!(EntityKind::from_collection(kind.collection()), Some(kind));
    }
    assert_eq!(EntityKind::from_collection("no-such-collection"), None);
  }

  #[test]
  fn only_the_scribe_log_declares_clock_fields() {
    for kind in EntityKind::ALL {
      let schema = kind.schema();
      if kind == EntityKind::ScribeLog {
        assert!(!schema.clock_fields.is_empty());
        assert_eq!(schema.nested_clock_fields, &["time"]);
      } else {
        assert!(schema.clock_fields.is_empty());
        assert!(schema.nested_clock_fields.is_empty());
      }
    }
  }
}
