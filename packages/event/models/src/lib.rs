#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared event record and pipeline report types.
//!
//! This crate defines the plain data types that flow through the event map
//! pipeline: the validated CSV row ([`EventRecord`]), the fully-resolved
//! row ready for rendering ([`PlottedEvent`]), and the end-of-run
//! accounting types ([`ExclusionReason`], [`RunReport`]).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One validated row from the events CSV.
///
/// Immutable after loading; resolution and scaling attach their results
/// via [`PlottedEvent`] rather than mutating the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Display name of the event.
    pub event_name: String,
    /// Name of the venue hosting the event.
    pub venue_name: String,
    /// Free-text street address used for geocoding.
    pub address: String,
    /// Number of guests attending.
    pub attending: u64,
    /// Relative URL path to the event detail page, if published.
    pub content_url: Option<String>,
    /// Listing date (`YYYY-MM-DD`), if present in the source data.
    pub date: Option<String>,
}

/// An [`EventRecord`] whose address resolved, carrying the coordinate and
/// the scaled attendance magnitude.
///
/// Constructing this type is the gate into the rendering stages: a record
/// without a coordinate or a scaled magnitude never becomes a
/// `PlottedEvent`, so downstream code does not re-check resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlottedEvent {
    /// The source record.
    pub record: EventRecord,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Attendance rescaled into the configured radius range.
    pub scaled_attendance: i64,
}

/// Why a record was dropped from the run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExclusionReason {
    /// The address column was missing, blank, or a known placeholder.
    MissingAddress,
    /// The attendance column was missing or not a non-negative integer.
    InvalidAttendance,
    /// The geocoding service returned no match for the address.
    AddressNotFound,
    /// The geocoding service failed after all retries.
    GeocodingFailed,
    /// The row could not be parsed at all (wrong column count, bad UTF-8).
    MalformedRow,
}

/// A dropped record paired with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedRecord {
    /// Display name of the event (or the raw row's best label).
    pub event_name: String,
    /// The address as it appeared in the source, if any.
    pub address: Option<String>,
    /// Why the record was excluded.
    pub reason: ExclusionReason,
}

/// End-of-run accounting: what was loaded, plotted, and dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Rows read from the source file, valid or not.
    pub rows_read: usize,
    /// Records that made it onto the map.
    pub plotted: usize,
    /// Records dropped at any stage, with reasons.
    pub excluded: Vec<ExcludedRecord>,
}

impl RunReport {
    /// Returns the number of excluded records with the given reason.
    #[must_use]
    pub fn excluded_count(&self, reason: ExclusionReason) -> usize {
        self.excluded.iter().filter(|e| e.reason == reason).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusion_reason_display_is_screaming_snake() {
        assert_eq!(ExclusionReason::AddressNotFound.to_string(), "ADDRESS_NOT_FOUND");
        assert_eq!(ExclusionReason::MissingAddress.as_ref(), "MISSING_ADDRESS");
    }

    #[test]
    fn report_counts_by_reason() {
        let report = RunReport {
            rows_read: 3,
            plotted: 1,
            excluded: vec![
                ExcludedRecord {
                    event_name: "a".to_string(),
                    address: None,
                    reason: ExclusionReason::MissingAddress,
                },
                ExcludedRecord {
                    event_name: "b".to_string(),
                    address: Some("nowhere".to_string()),
                    reason: ExclusionReason::AddressNotFound,
                },
            ],
        };
        assert_eq!(report.excluded_count(ExclusionReason::MissingAddress), 1);
        assert_eq!(report.excluded_count(ExclusionReason::AddressNotFound), 1);
        assert_eq!(report.excluded_count(ExclusionReason::GeocodingFailed), 0);
    }
}
