//! Core types and trait definitions for the EXRSIM exercise-planning store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod codec;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod record;
pub mod service;
pub mod store;

pub use error::{Error, Result};
