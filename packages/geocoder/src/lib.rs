#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address resolution for event map data.
//!
//! Converts free-text event addresses to latitude/longitude coordinates
//! via Nominatim / `OpenStreetMap`, configured from an embedded TOML file
//! (`services/nominatim.toml`).
//!
//! The [`AddressResolver`] trait separates two outcomes that the rest of
//! the pipeline treats very differently:
//!
//! - `Ok(None)`: the service answered and found nothing. A permanent
//!   miss; the record is excluded and the run continues.
//! - `Err(_)`: the service could not be reached or misbehaved. Transient
//!   failures are retried inside the client; an error surfacing here
//!   means retries were exhausted.
//!
//! Also provides address cleaning for normalizing venue addresses before
//! they hit the network.

pub mod address;
pub mod config;
pub mod nominatim;

use async_trait::async_trait;
use thiserror::Error;

/// A geocoding result: coordinates plus the service's canonical name for
/// the match.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// The matched/canonical address returned by the geocoder.
    pub display_name: Option<String>,
}

/// Errors from geocoding operations.
///
/// Every variant is a service-side or transport problem. "Address not
/// found" is not an error; see [`AddressResolver::resolve`].
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed (after retries, for transient failures).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit still exceeded after backing off.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Resolves a free-text address to a coordinate.
///
/// Implementations own their rate limiting, timeouts, and retry policy;
/// callers just loop over records.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolves `address` to its best match.
    ///
    /// Returns `Ok(None)` when the service finds no match (a permanent
    /// miss; callers exclude the record and continue).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the service cannot be reached or
    /// returns garbage after all retries.
    async fn resolve(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError>;
}
