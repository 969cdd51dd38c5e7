//! Address cleaning for venue addresses.
//!
//! Event listings carry addresses as free text typed by promoters:
//! trailing whitespace, doubled spaces, and placeholder strings like
//! `"TBA"` or `"Address available on RA"` are all common. This module
//! normalizes what can be normalized and rejects what can never geocode,
//! so the pipeline skips the network call entirely for junk input.

use regex::Regex;
use std::sync::LazyLock;

/// Regex collapsing runs of interior whitespace to a single space.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Placeholder strings promoters use instead of a real address.
static SKIP_PATTERNS: &[&str] = &[
    "UNKNOWN",
    "N/A",
    "NA",
    "NONE",
    "TBA",
    "TBC",
    "TBD",
    "SECRET LOCATION",
    "ADDRESS AVAILABLE ON RA",
];

/// Result of cleaning a venue address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanedAddress {
    /// A normalized query string suitable for geocoding.
    Query(String),
    /// The address can never geocode (empty or a known placeholder).
    NotGeocodable,
}

/// Cleans and normalizes a venue address for geocoding.
///
/// Trims, collapses interior whitespace, and rejects placeholder
/// non-addresses.
#[must_use]
pub fn clean_address(raw: &str) -> CleanedAddress {
    let addr = WHITESPACE_RE.replace_all(raw.trim(), " ").to_string();

    if addr.is_empty() || SKIP_PATTERNS.iter().any(|p| addr.eq_ignore_ascii_case(p)) {
        return CleanedAddress::NotGeocodable;
    }

    CleanedAddress::Query(addr)
}
