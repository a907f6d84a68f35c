#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Postcode boundary import for the location lookup.
//!
//! Reads the gzip-compressed postcode boundary feed feature by feature,
//! derives each area's centroid from its boundary rings, and upserts the
//! resulting [`PostcodeRecord`]s in a single transaction keyed by postcode.
//! Storage is abstracted behind [`store::PostcodeStore`] so the same
//! pipeline runs against `DuckDB` in production and an in-memory table in
//! tests.

pub mod feed;
pub mod import;
pub mod locations;
pub mod progress;
pub mod reconcile;
pub mod store;

pub use fuel_map_postcode_models::{ImportSummary, PostcodeRecord};

/// Errors that can occur during postcode import and lookup.
#[derive(Debug, thiserror::Error)]
pub enum PostcodeError {
    /// I/O error (file open or read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The storage backend rejected an operation.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of what went wrong.
        message: String,
    },

    /// A blocking decode task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A feature could not be turned into a record.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
