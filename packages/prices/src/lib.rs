#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scheduled price fetching for Hamburg and Schleswig-Holstein.
//!
//! A [`job::PriceRegionJob`] walks a fixed list of circle centers covering
//! the region and asks the price provider for every station around each
//! center. Provider keys are shared by a [`credentials::CredentialPool`]
//! that moves on to the next key after a fixed number of requests.
//! Payloads go out through a fire-and-forget [`publish::Publisher`].
//! [`schedule::spawn_job`] drives jobs on a fixed interval or a daily wall
//! clock time until shutdown is signalled.

pub mod config;
pub mod credentials;
pub mod fetch;
pub mod job;
pub mod publish;
pub mod regions;
pub mod schedule;

/// Errors that can occur while configuring or running price jobs.
#[derive(Debug, thiserror::Error)]
pub enum PricesError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (reading sample messages).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The price provider answered but reported a failure.
    #[error("Price API error: {message}")]
    Api {
        /// Description of what went wrong.
        message: String,
    },

    /// A fetch did not finish within its time limit.
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
}
