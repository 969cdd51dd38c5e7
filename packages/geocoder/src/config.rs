//! Compile-time embedded Nominatim service configuration.
//!
//! The provider settings live in `services/nominatim.toml` and are
//! embedded at compile time, so a binary never depends on finding config
//! files at runtime.

use serde::Deserialize;

/// Nominatim service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimConfig {
    /// Search endpoint URL (e.g., `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// User agent sent on every request. The public instance rejects
    /// anonymous clients, so this must identify the application.
    pub user_agent: String,
    /// Minimum delay between requests in milliseconds.
    pub rate_limit_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

impl NominatimConfig {
    /// Returns the embedded service configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a compile-time artifact,
    /// caught by the tests below).
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(NOMINATIM_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded nominatim config: {e}"))
    }
}
