//! Application layer for the shopforge catalog.
//!
//! Command handlers orchestrate one unit of work each: shape validation,
//! cross-aggregate rules, aggregate mutation, a single atomic save, then
//! post-save event announcement. Query handlers run untracked reads and
//! return DTOs, never live aggregates.

pub mod announce;
pub mod commands;
pub mod error;
pub mod queries;

pub use announce::{CatalogEnvelope, announce_catalog_events, spawn_logging_subscriber};
pub use error::{AppError, AppResult};
