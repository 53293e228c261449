//! JSON REST API for EXRSIM.
//!
//! Exposes an axum [`Router`] backed by any
//! [`exrsim_core::store::RecordStore`]. Every entity collection shares the
//! same five generic handlers; per-entity behavior lives entirely in the
//! core's entity schemas. CORS, tracing, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", exrsim_api::api_router(service.clone()))
//! ```

pub mod error;
pub mod lookup;
pub mod records;


use std::sync::Arc;

use axum::{Json, Router, routing::get};
use exrsim_core::{service::RecordService, store::RecordStore};
use serde_json::{Value, json};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(service: Arc<RecordService<S>>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    .route("/", get(health))
    // Lookups with dedicated paths
    .route(
      "/participants/position/{pattern}",
      get(lookup::participants_by_position::<S>),
    )
    .route(
      "/lessons-learned/serial/{exercise_id}",
      get(lookup::next_lesson_serial::<S>),
    )
    .route(
      "/weather-locations/provinces",
      get(lookup::weather_location_provinces::<S>),
    )
    // Generic per-collection CRUD
    .route(
      "/{collection}",
      get(records::list::<S>).post(records::create::<S>),
    )
    .route(
      "/{collection}/{id}",
      get(records::get_one::<S>)
        .put(records::update::<S>)
        .delete(records::delete::<S>),
    )
    .with_state(service)
}

/// `GET /` — health check.
async fn health() -> Json<Value> {
  Json(json!({ "message": "EXRSIM API is running" }))
}
