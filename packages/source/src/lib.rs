#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Event data acquisition.
//!
//! Two ways into the pipeline:
//!
//! - [`csv_file`] loads a previously-saved events CSV, validating each row
//!   and partitioning the file into usable records and excluded rows.
//! - [`ra_co`] fetches event listings from the RA.co GraphQL API page by
//!   page and writes them out in the same CSV shape.
//!
//! All HTTP goes through [`retry`], which adds bounded exponential backoff
//! for transient failures. [`progress`] defines the reporting trait used
//! by long-running fetch and geocode loops.

pub mod csv_file;
pub mod progress;
pub mod ra_co;
pub mod retry;

use thiserror::Error;

/// Errors from data acquisition operations.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server returned something other than the expected shape.
    #[error("Unexpected response: {message}")]
    Response {
        /// Description of what was wrong with the response.
        message: String,
    },
}
