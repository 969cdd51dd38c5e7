#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive map document generation.
//!
//! Consumes what the pipeline produces, a marker per plotted event and a
//! timestamped feature collection for playback, and writes a
//! self-contained Leaflet HTML document. The transformation core knows
//! nothing about any rendering library; everything vendor-specific lives
//! behind [`MapRenderer`].

pub mod features;
pub mod leaflet;

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Errors from map rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing the document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing markers or features failed.
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The platform browser opener exited unsuccessfully.
    #[error("Failed to open browser: {message}")]
    BrowserLaunch {
        /// Description of the launch failure.
        message: String,
    },
}

/// Which layers the generated document carries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Backend {
    /// Fixed-radius circle markers with popups and hover tooltips.
    Static,
    /// Static layers plus the time-animated growing-bubble layer.
    Animated,
}

/// Map viewport and title.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    /// Center latitude.
    pub center_latitude: f64,
    /// Center longitude.
    pub center_longitude: f64,
    /// Initial zoom level.
    pub zoom: u8,
    /// Heading rendered above the map.
    pub title: String,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center_latitude: 52.364_388_9,
            center_longitude: 4.871_270_1,
            zoom: 12,
            title: "RA Events in Amsterdam".to_string(),
        }
    }
}

/// One static point marker with its popup payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Circle radius in pixels (the event's scaled attendance).
    pub radius: f64,
    /// HTML shown when the marker is clicked.
    pub popup: String,
    /// Plain text shown on hover.
    pub tooltip: String,
}

/// Playback parameters for the animated layer.
///
/// Defaults match the report visualization this crate exists for: one
/// animation step per second of playback time, an hour-long time axis,
/// a 100 ms inter-frame transition, and autoplay on load.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackOptions {
    /// Playback step as an ISO-8601 period (e.g., `"PT1S"`).
    pub period: String,
    /// Total loop duration as an ISO-8601 period (e.g., `"PT1H"`).
    pub duration: String,
    /// Inter-frame transition time in milliseconds.
    pub transition_ms: u64,
    /// Start playing as soon as the document loads.
    pub auto_play: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            period: "PT1S".to_string(),
            duration: "PT1H".to_string(),
            transition_ms: 100,
            auto_play: true,
        }
    }
}

/// Everything a renderer needs to produce one document.
#[derive(Debug, Clone)]
pub struct MapDocument {
    /// Viewport and title.
    pub view: MapView,
    /// Static markers, one per plotted event.
    pub markers: Vec<Marker>,
    /// Timestamped features for the playback layer.
    pub animation: geojson::FeatureCollection,
    /// Playback parameters for the animated layer.
    pub playback: PlaybackOptions,
}

/// Renders a [`MapDocument`] to an interactive file.
pub trait MapRenderer {
    /// Writes the document to `out` and returns the written path.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if encoding or writing fails.
    fn render(&self, doc: &MapDocument, out: &Path) -> Result<PathBuf, RenderError>;
}

/// Opens `path` in the platform's default browser.
///
/// # Errors
///
/// Returns [`RenderError::BrowserLaunch`] if the opener cannot be spawned
/// or exits unsuccessfully.
pub fn open_in_browser(path: &Path) -> Result<(), RenderError> {
    let status = if cfg!(target_os = "windows") {
        Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(path)
            .status()
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(path).status()
    } else {
        Command::new("xdg-open").arg(path).status()
    };

    match status {
        Ok(status) if status.success() => {
            log::info!("Opened {} in browser", path.display());
            Ok(())
        }
        Ok(status) => Err(RenderError::BrowserLaunch {
            message: format!("opener exited with {status}"),
        }),
        Err(e) => Err(RenderError::BrowserLaunch {
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_from_cli_strings() {
        assert_eq!("static".parse::<Backend>().unwrap(), Backend::Static);
        assert_eq!("animated".parse::<Backend>().unwrap(), Backend::Animated);
        assert!("webgl".parse::<Backend>().is_err());
    }

    #[test]
    fn playback_defaults_match_report_settings() {
        let playback = PlaybackOptions::default();
        assert_eq!(playback.period, "PT1S");
        assert_eq!(playback.duration, "PT1H");
        assert_eq!(playback.transition_ms, 100);
        assert!(playback.auto_play);
    }
}
