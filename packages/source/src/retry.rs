//! HTTP retry helpers for transient errors.
//!
//! Fetchers call [`send_json`] instead of `reqwest::RequestBuilder::send()`
//! directly so every request gets automatic retry with exponential backoff
//! for failures that tend to clear on their own: connection errors,
//! timeouts, HTTP 429, and HTTP 5xx. Other 4xx statuses are permanent and
//! fail immediately.
//!
//! The request is passed as a closure returning a fresh
//! [`reqwest::RequestBuilder`] because builders are consumed by `.send()`;
//! this lets any request shape (GET, POST with a JSON body, extra headers)
//! be retried.

use std::time::Duration;

use crate::SourceError;

/// Maximum number of retry attempts for transient HTTP errors.
///
/// With exponential backoff (2s, 4s, 8s, 16s) the total wait before
/// giving up is 30 seconds.
const MAX_RETRIES: u32 = 4;

/// Sends an HTTP request and parses the response body as JSON.
///
/// Retries transient failures up to [`MAX_RETRIES`] times. A body that
/// arrives but does not parse as JSON is not retried: for the small
/// responses this crate deals with, a garbled body means the server sent
/// something else entirely (an HTML error page, usually) and the
/// [`SourceError::Json`] message is more useful than another attempt.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries, the
/// server returns a non-retryable status code, or the body cannot be
/// parsed as JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, MAX_RETRIES).await?;
    let value = response.json::<serde_json::Value>().await?;
    Ok(value)
}

/// Core retry loop: sends the request built by `build_request`, retrying
/// transient errors with exponential backoff, and returns the successful
/// response (status 2xx or 3xx).
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<SourceError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt); // 2s, 4s, 8s...
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(SourceError::Http(e));
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                // 429 and 5xx are retryable; any other 4xx is permanent.
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error()
                {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status}");
                        last_error = Some(SourceError::Response {
                            message: format!("HTTP {status}"),
                        });
                        continue;
                    }
                    return Err(SourceError::Response {
                        message: format!("HTTP {status} after {max_retries} retries"),
                    });
                }

                if status.is_client_error() {
                    return Err(SourceError::Response {
                        message: format!("HTTP {status}"),
                    });
                }

                return Ok(response);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| SourceError::Response {
        message: "request failed after all retries".to_string(),
    }))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}
