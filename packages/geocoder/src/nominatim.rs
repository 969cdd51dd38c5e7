//! Nominatim / OpenStreetMap geocoder client.
//!
//! Free-form search against the public Nominatim instance, which allows
//! **1 request per second** maximum. The client enforces that interval
//! itself, so callers can loop over addresses without thinking about it.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::address::{CleanedAddress, clean_address};
use crate::config::NominatimConfig;
use crate::{AddressResolver, GeocodeError, GeocodedAddress};

/// Maximum retry attempts for transient failures (timeouts, connection
/// errors, HTTP 429/5xx). Backoff doubles per attempt: 2s, 4s, 8s.
const MAX_RETRIES: u32 = 3;

/// Nominatim-backed [`AddressResolver`] with built-in rate limiting,
/// per-call timeout, and retry.
pub struct NominatimResolver {
    client: reqwest::Client,
    base_url: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimResolver {
    /// Creates a resolver from a service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &NominatimConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            min_interval: Duration::from_millis(config.rate_limit_ms),
            last_request: Mutex::new(None),
        })
    }

    /// Creates a resolver from the embedded `services/nominatim.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn from_embedded_config() -> Result<Self, GeocodeError> {
        Self::new(&NominatimConfig::embedded())
    }

    /// Sleeps until at least `min_interval` has passed since the previous
    /// request left this resolver.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// One search attempt, no retry.
    async fn request(&self, query: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }

    /// Searches with retry: transient failures back off and try again,
    /// a clean "no results" answer returns immediately.
    async fn search(&self, query: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        let mut last_error: Option<GeocodeError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_secs(1u64 << attempt);
                log::warn!("Nominatim retry {attempt}/{MAX_RETRIES} in {delay:?}...");
                tokio::time::sleep(delay).await;
            }

            self.throttle().await;

            match self.request(query).await {
                Ok(result) => return Ok(result),
                Err(e) if is_retryable(&e) && attempt < MAX_RETRIES => {
                    log::warn!("Nominatim transient failure for '{query}': {e}");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(GeocodeError::RateLimited))
    }
}

#[async_trait]
impl AddressResolver for NominatimResolver {
    async fn resolve(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        // Placeholder addresses never geocode; skip the network entirely.
        let query = match clean_address(address) {
            CleanedAddress::Query(q) => q,
            CleanedAddress::NotGeocodable => return Ok(None),
        };

        self.search(&query).await
    }
}

/// Returns `true` for failures worth another attempt.
fn is_retryable(e: &GeocodeError) -> bool {
    match e {
        GeocodeError::RateLimited => true,
        GeocodeError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.is_request()
                || e.status().is_some_and(|s| s.is_server_error())
        }
        GeocodeError::Parse { .. } => false,
    }
}

/// Parses a Nominatim JSON response into the best match, if any.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    let display_name = first["display_name"].as_str().map(String::from);

    Ok(Some(GeocodedAddress {
        latitude: lat,
        longitude: lon,
        display_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "52.3643889",
            "lon": "4.8712701",
            "display_name": "Amsterdam, Noord-Holland, Nederland"
        }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude - 52.3643889).abs() < 1e-6);
        assert!((result.longitude - 4.8712701).abs() < 1e-6);
        assert_eq!(
            result.display_name.as_deref(),
            Some("Amsterdam, Noord-Holland, Nederland")
        );
    }

    #[test]
    fn empty_result_array_is_a_miss() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn non_array_response_is_a_parse_error() {
        let body = serde_json::json!({ "error": "unavailable" });
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse { .. }));
    }

    #[test]
    fn missing_coordinates_is_a_parse_error() {
        let body = serde_json::json!([{ "display_name": "somewhere" }]);
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, GeocodeError::Parse { .. }));
    }

    #[tokio::test]
    async fn placeholder_address_resolves_to_miss_without_network() {
        let resolver = NominatimResolver::from_embedded_config().unwrap();
        let result = resolver.resolve("TBA").await.unwrap();
        assert!(result.is_none());
    }
}
