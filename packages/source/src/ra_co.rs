//! RA.co event listing fetcher.
//!
//! Queries the RA.co GraphQL endpoint for event listings in an area and
//! date window, one page at a time, and writes the results as the events
//! CSV consumed by [`crate::csv_file`].
//!
//! RA.co has no documented rate limit but is unhappy with bursts; a fixed
//! one-second delay is inserted between page fetches.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::progress::ProgressCallback;
use crate::{SourceError, retry};

/// GraphQL endpoint for event listings.
pub const RA_GRAPHQL_URL: &str = "https://ra.co/graphql";

/// Delay between page fetches.
const PAGE_DELAY: Duration = Duration::from_secs(1);

/// Listings per page. RA.co caps this server-side at 20.
const PAGE_SIZE: u32 = 20;

/// Referer header RA.co expects on API calls.
const REFERER: &str = "https://ra.co/events";

/// Browser-like user agent; the endpoint rejects the reqwest default.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:106.0) Gecko/20100101 Firefox/106.0";

/// The event listing query document.
const LISTING_QUERY: &str = "\
query EVENT_LISTINGS($filters: FilterInputDtoInput, $pageSize: Int, $page: Int) {
  eventListings(filters: $filters, pageSize: $pageSize, page: $page) {
    data {
      event {
        title
        date
        startTime
        endTime
        contentUrl
        attending
        artists { name }
        venue { name address }
      }
    }
  }
}";

/// An area and listing-date window to fetch.
#[derive(Debug, Clone)]
pub struct EventListingQuery {
    /// RA.co area code (e.g., 29 for Amsterdam).
    pub area: u32,
    /// Inclusive window start, as the API's `gte` filter string.
    pub listing_date_gte: String,
    /// Inclusive window end, as the API's `lte` filter string.
    pub listing_date_lte: String,
}

impl EventListingQuery {
    /// Builds a query covering the whole of `start..=end` in `area`.
    #[must_use]
    pub fn for_window(area: u32, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            area,
            listing_date_gte: format!("{}T00:00:00.000Z", start.format("%Y-%m-%d")),
            listing_date_lte: format!("{}T23:59:59.999Z", end.format("%Y-%m-%d")),
        }
    }
}

/// One event listing as returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedEvent {
    /// Event title.
    pub title: String,
    /// Listing date (`YYYY-MM-DD`).
    pub date: String,
    /// Doors-open time, if published.
    pub start_time: String,
    /// Close time, if published.
    pub end_time: String,
    /// Billed artists, in listing order.
    pub artists: Vec<String>,
    /// Venue name.
    pub venue_name: String,
    /// Venue street address.
    pub address: String,
    /// Relative URL path to the event page.
    pub content_url: String,
    /// Number of guests attending.
    pub attending: u64,
}

/// Fetches event listings from RA.co.
pub struct RaCoFetcher {
    client: reqwest::Client,
}

impl RaCoFetcher {
    /// Creates a fetcher with the headers RA.co requires.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    /// Fetches a single page of listings (pages start at 1).
    ///
    /// An empty page means the window is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails after retries or the
    /// response does not have the expected shape.
    pub async fn fetch_page(
        &self,
        query: &EventListingQuery,
        page: u32,
    ) -> Result<Vec<FetchedEvent>, SourceError> {
        let payload = serde_json::json!({
            "query": LISTING_QUERY,
            "variables": {
                "filters": {
                    "areas": { "eq": query.area },
                    "listingDate": {
                        "gte": query.listing_date_gte,
                        "lte": query.listing_date_lte,
                    },
                },
                "pageSize": PAGE_SIZE,
                "page": page,
            },
        });

        let body = retry::send_json(|| {
            self.client
                .post(RA_GRAPHQL_URL)
                .header(reqwest::header::REFERER, REFERER)
                .json(&payload)
        })
        .await?;

        parse_listings(&body)
    }

    /// Fetches every page in the window until a page comes back empty,
    /// with a politeness delay between pages.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if any page fetch fails.
    pub async fn fetch_all(
        &self,
        query: &EventListingQuery,
        limit: Option<u64>,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Vec<FetchedEvent>, SourceError> {
        let mut events: Vec<FetchedEvent> = Vec::new();
        let mut page: u32 = 1;

        loop {
            progress.set_message(format!("Fetching page {page}..."));
            let page_events = self.fetch_page(query, page).await?;

            if page_events.is_empty() {
                break;
            }

            let count = page_events.len() as u64;
            events.extend(page_events);
            progress.inc(count);
            log::info!("Page {page}: {count} listings (total so far: {})", events.len());

            if let Some(limit) = limit
                && events.len() as u64 >= limit
            {
                events.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
                log::info!("Reached limit of {limit} listings");
                break;
            }

            page += 1;
            tokio::time::sleep(PAGE_DELAY).await;
        }

        progress.finish(format!("Fetched {} listings", events.len()));
        Ok(events)
    }
}

/// Extracts listings from a GraphQL response body.
fn parse_listings(body: &serde_json::Value) -> Result<Vec<FetchedEvent>, SourceError> {
    let listings = body["data"]["eventListings"]["data"]
        .as_array()
        .ok_or_else(|| SourceError::Response {
            message: "missing data.eventListings.data in response".to_string(),
        })?;

    let events = listings
        .iter()
        .filter_map(|listing| {
            let event = &listing["event"];
            if event.is_null() {
                return None;
            }
            Some(FetchedEvent {
                title: text(event, "title"),
                date: text(event, "date"),
                start_time: text(event, "startTime"),
                end_time: text(event, "endTime"),
                artists: event["artists"]
                    .as_array()
                    .map(|artists| {
                        artists
                            .iter()
                            .filter_map(|a| a["name"].as_str().map(String::from))
                            .collect()
                    })
                    .unwrap_or_default(),
                venue_name: event["venue"]["name"].as_str().unwrap_or_default().to_string(),
                address: event["venue"]["address"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                content_url: text(event, "contentUrl"),
                attending: event["attending"].as_u64().unwrap_or(0),
            })
        })
        .collect();

    Ok(events)
}

/// Returns a string field of `value`, or `""` when absent or null.
fn text(value: &serde_json::Value, field: &str) -> String {
    value[field].as_str().unwrap_or_default().to_string()
}

/// Writes fetched events as the canonical events CSV.
///
/// The header matches what [`crate::csv_file::load_from_reader`] expects;
/// artists are joined with `", "`.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be written.
pub fn write_events_csv(events: &[FetchedEvent], path: &Path) -> Result<(), SourceError> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "Event_name",
        "Date",
        "Start_Time",
        "End_Time",
        "Artists",
        "Venue_name",
        "Address",
        "Event_URL",
        "Guests_attending",
    ])?;

    for event in events {
        let artists = event.artists.join(", ");
        let attending = event.attending.to_string();
        writer.write_record([
            event.title.as_str(),
            event.date.as_str(),
            event.start_time.as_str(),
            event.end_time.as_str(),
            artists.as_str(),
            event.venue_name.as_str(),
            event.address.as_str(),
            event.content_url.as_str(),
            attending.as_str(),
        ])?;
    }

    writer.flush()?;
    log::info!("Wrote {} events to {}", events.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listing_response() {
        let body = serde_json::json!({
            "data": { "eventListings": { "data": [
                { "event": {
                    "title": "Warehouse Night",
                    "date": "2024-01-20",
                    "startTime": "23:00",
                    "endTime": "06:00",
                    "contentUrl": "/events/123",
                    "attending": 250,
                    "artists": [{ "name": "DJ A" }, { "name": "DJ B" }],
                    "venue": { "name": "De School", "address": "Doctor Jan van Breemenstraat 1" }
                }}
            ]}}
        });

        let events = parse_listings(&body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Warehouse Night");
        assert_eq!(events[0].artists, vec!["DJ A", "DJ B"]);
        assert_eq!(events[0].venue_name, "De School");
        assert_eq!(events[0].attending, 250);
    }

    #[test]
    fn empty_page_parses_to_empty_vec() {
        let body = serde_json::json!({
            "data": { "eventListings": { "data": [] } }
        });
        assert!(parse_listings(&body).unwrap().is_empty());
    }

    #[test]
    fn missing_data_is_a_response_error() {
        let body = serde_json::json!({ "errors": [{ "message": "rate limited" }] });
        let err = parse_listings(&body).unwrap_err();
        assert!(matches!(err, SourceError::Response { .. }));
    }

    #[test]
    fn window_query_formats_bounds() {
        let query = EventListingQuery::for_window(
            29,
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 27).unwrap(),
        );
        assert_eq!(query.listing_date_gte, "2024-01-20T00:00:00.000Z");
        assert_eq!(query.listing_date_lte, "2024-01-27T23:59:59.999Z");
    }
}
