//! Events CSV loading and per-row validation.
//!
//! Reads the CSV written by [`crate::ra_co::write_events_csv`] (or any
//! file with the same header). Rows are validated individually: a row
//! missing its address or carrying a non-numeric attendance count is
//! excluded with a reason, never fatal. Only a missing or unreadable
//! file aborts the load.

use std::io::Read;
use std::path::Path;

use event_map_event_models::{EventRecord, ExcludedRecord, ExclusionReason};
use serde::Deserialize;

use crate::SourceError;

/// The result of loading an events CSV: usable records plus the rows
/// that were dropped, with reasons.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Rows read from the file, valid or not.
    pub rows_read: usize,
    /// Validated records, in file order.
    pub records: Vec<EventRecord>,
    /// Rows dropped during validation.
    pub excluded: Vec<ExcludedRecord>,
}

/// One raw CSV row before validation. Every field is optional so a
/// sparse row still deserializes and can be excluded with a precise
/// reason instead of a parse error.
#[derive(Debug, Deserialize)]
struct RawEventRow {
    #[serde(rename = "Event_name")]
    event_name: Option<String>,
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Venue_name")]
    venue_name: Option<String>,
    #[serde(rename = "Address")]
    address: Option<String>,
    #[serde(rename = "Event_URL")]
    event_url: Option<String>,
    #[serde(rename = "Guests_attending")]
    guests_attending: Option<String>,
}

/// Loads and validates the events CSV at `path`.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file is missing or unreadable.
/// Individual bad rows never fail the load; they land in
/// [`LoadOutcome::excluded`].
pub fn load_events(path: &Path) -> Result<LoadOutcome, SourceError> {
    let file = std::fs::File::open(path)?;
    log::info!("Loading events from {}", path.display());
    let outcome = load_from_reader(file)?;
    log::info!(
        "Loaded {} records ({} rows excluded during validation)",
        outcome.records.len(),
        outcome.excluded.len()
    );
    Ok(outcome)
}

/// Loads and validates events CSV content from any reader.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] only if the header itself cannot be read;
/// per-row errors are converted into exclusions.
pub fn load_from_reader<R: Read>(reader: R) -> Result<LoadOutcome, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut outcome = LoadOutcome::default();

    for (idx, result) in rdr.deserialize::<RawEventRow>().enumerate() {
        outcome.rows_read += 1;
        match result {
            Ok(raw) => match validate_row(raw) {
                Ok(record) => outcome.records.push(record),
                Err(excluded) => {
                    log::warn!(
                        "Row {}: excluding '{}' ({})",
                        idx + 2, // 1-based, after the header line
                        excluded.event_name,
                        excluded.reason
                    );
                    outcome.excluded.push(excluded);
                }
            },
            Err(e) => {
                log::warn!("Row {}: unparseable ({e})", idx + 2);
                outcome.excluded.push(ExcludedRecord {
                    event_name: format!("(row {})", idx + 2),
                    address: None,
                    reason: ExclusionReason::MalformedRow,
                });
            }
        }
    }

    Ok(outcome)
}

/// Validates a raw row, producing either a usable [`EventRecord`] or an
/// [`ExcludedRecord`] naming what was wrong.
fn validate_row(raw: RawEventRow) -> Result<EventRecord, ExcludedRecord> {
    let event_name = raw
        .event_name
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "(unnamed event)".to_string());

    let address = raw.address.filter(|s| !s.is_empty());
    let Some(address) = address else {
        return Err(ExcludedRecord {
            event_name,
            address: None,
            reason: ExclusionReason::MissingAddress,
        });
    };

    let attending = raw
        .guests_attending
        .as_deref()
        .and_then(|s| s.parse::<u64>().ok());
    let Some(attending) = attending else {
        return Err(ExcludedRecord {
            event_name,
            address: Some(address),
            reason: ExclusionReason::InvalidAttendance,
        });
    };

    Ok(EventRecord {
        event_name,
        venue_name: raw.venue_name.unwrap_or_default(),
        address,
        attending,
        content_url: raw.event_url.filter(|s| !s.is_empty()),
        date: raw.date.filter(|s| !s.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Event_name,Date,Start_Time,End_Time,Artists,Venue_name,Address,Event_URL,Guests_attending";

    fn load(rows: &str) -> LoadOutcome {
        let data = format!("{HEADER}\n{rows}");
        load_from_reader(data.as_bytes()).unwrap()
    }

    #[test]
    fn loads_valid_rows() {
        let outcome = load(
            "Warehouse Night,2024-01-20,23:00,06:00,\"DJ A, DJ B\",De School,Doctor Jan van Breemenstraat 1 Amsterdam,/events/123,250\n\
             Day Party,2024-01-21,14:00,22:00,DJ C,Thuishaven,Contactweg 68 Amsterdam,/events/456,80",
        );
        assert_eq!(outcome.rows_read, 2);
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.excluded.is_empty());

        let first = &outcome.records[0];
        assert_eq!(first.event_name, "Warehouse Night");
        assert_eq!(first.venue_name, "De School");
        assert_eq!(first.attending, 250);
        assert_eq!(first.content_url.as_deref(), Some("/events/123"));
        assert_eq!(first.date.as_deref(), Some("2024-01-20"));
    }

    #[test]
    fn excludes_row_without_address() {
        let outcome = load("No Address,,,,,Somewhere,,/events/1,100");
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.excluded.len(), 1);
        assert_eq!(outcome.excluded[0].reason, ExclusionReason::MissingAddress);
        assert_eq!(outcome.excluded[0].event_name, "No Address");
    }

    #[test]
    fn excludes_row_with_non_numeric_attendance() {
        let outcome = load("Bad Count,,,,,Club,Some Street 1,/events/2,lots");
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.excluded.len(), 1);
        assert_eq!(
            outcome.excluded[0].reason,
            ExclusionReason::InvalidAttendance
        );
        assert_eq!(outcome.excluded[0].address.as_deref(), Some("Some Street 1"));
    }

    #[test]
    fn mixed_file_partitions_rows() {
        let outcome = load(
            "Good,,,,,Club,Street 1,,50\n\
             No Address,,,,,Club,,,60\n\
             Bad Count,,,,,Club,Street 3,,n/a",
        );
        assert_eq!(outcome.rows_read, 3);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.excluded.len(), 2);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_events(Path::new("/nonexistent/events.csv")).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
