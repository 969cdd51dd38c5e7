//! Leaflet HTML backend.
//!
//! Produces a single self-contained document: an OpenStreetMap tile
//! layer, one circle marker per plotted event (popup + hover tooltip),
//! and, for [`Backend::Animated`], a Leaflet.TimeDimension playback
//! layer fed by the timestamped feature collection. Library code is
//! referenced from CDNs; the data is inlined, so the file works from
//! `file://` without a server.

use std::path::{Path, PathBuf};

use crate::{Backend, MapDocument, MapRenderer, RenderError};

/// Base document template.
const MAP_TEMPLATE: &str = include_str!("../templates/map.html");

/// Playback-layer snippet, spliced in for the animated backend.
const ANIMATION_TEMPLATE: &str = include_str!("../templates/animation.js");

/// [`MapRenderer`] writing Leaflet HTML documents.
pub struct LeafletRenderer {
    backend: Backend,
}

impl LeafletRenderer {
    /// Creates a renderer for the given backend.
    #[must_use]
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Builds the `L.map` options object, which is where
    /// Leaflet.TimeDimension wants its playback configuration.
    fn map_options(&self, doc: &MapDocument) -> serde_json::Value {
        match self.backend {
            Backend::Static => serde_json::json!({}),
            Backend::Animated => serde_json::json!({
                "timeDimension": true,
                "timeDimensionOptions": { "period": doc.playback.period },
                "timeDimensionControl": true,
                "timeDimensionControlOptions": {
                    "autoPlay": doc.playback.auto_play,
                    "loopButton": true,
                    "playerOptions": {
                        "transitionTime": doc.playback.transition_ms,
                        "loop": true
                    }
                }
            }),
        }
    }

    /// Builds the document body.
    fn document(&self, doc: &MapDocument) -> Result<String, RenderError> {
        let animation_setup = match self.backend {
            Backend::Static => String::new(),
            Backend::Animated => ANIMATION_TEMPLATE
                .replace(
                    "{{ANIMATION_GEOJSON}}",
                    &serde_json::to_string(&doc.animation)?,
                )
                .replace("{{DURATION}}", &doc.playback.duration),
        };

        let html = MAP_TEMPLATE
            .replace("{{TITLE}}", &doc.view.title)
            .replace("{{MAP_OPTIONS}}", &self.map_options(doc).to_string())
            .replace("{{CENTER_LAT}}", &doc.view.center_latitude.to_string())
            .replace("{{CENTER_LNG}}", &doc.view.center_longitude.to_string())
            .replace("{{ZOOM}}", &doc.view.zoom.to_string())
            .replace("{{MARKERS_JSON}}", &serde_json::to_string(&doc.markers)?)
            .replace("{{ANIMATION_SETUP}}", &animation_setup);

        Ok(html)
    }
}

impl MapRenderer for LeafletRenderer {
    fn render(&self, doc: &MapDocument, out: &Path) -> Result<PathBuf, RenderError> {
        if let Some(parent) = out.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let html = self.document(doc)?;
        std::fs::write(out, html)?;

        log::info!(
            "Map document written: {} ({} markers, {} animation frames, {} backend)",
            out.display(),
            doc.markers.len(),
            doc.animation.features.len(),
            self.backend
        );

        Ok(out.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MapView, Marker, PlaybackOptions};
    use event_map_transform::AnimationFeature;

    fn doc() -> MapDocument {
        let frames = vec![AnimationFeature {
            longitude: 4.8712701,
            latitude: 52.3643889,
            time: chrono::NaiveDateTime::parse_from_str(
                "2024-01-20T00:00:00",
                "%Y-%m-%dT%H:%M:%S",
            )
            .unwrap(),
            radius: 1.0,
            fill_opacity: 0.6,
            color: "#53c688".to_string(),
            stroke: false,
            popup: "Warehouse Night at De School (250 guests)".to_string(),
        }];

        MapDocument {
            view: MapView::default(),
            markers: vec![Marker {
                lat: 52.3643889,
                lng: 4.8712701,
                radius: 42.0,
                popup: "<b>Warehouse Night</b>".to_string(),
                tooltip: "Warehouse Night".to_string(),
            }],
            animation: crate::features::feature_collection(&frames),
            playback: PlaybackOptions::default(),
        }
    }

    #[test]
    fn static_document_has_markers_but_no_playback_layer() {
        let html = LeafletRenderer::new(Backend::Static).document(&doc()).unwrap();
        assert!(html.contains("RA Events in Amsterdam"));
        assert!(html.contains("<b>Warehouse Night</b>"));
        assert!(!html.contains("timeDimension\":true"));
        assert!(!html.contains("L.timeDimension.layer.geoJson"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn animated_document_embeds_features_and_playback() {
        let html = LeafletRenderer::new(Backend::Animated)
            .document(&doc())
            .unwrap();
        assert!(html.contains("L.timeDimension.layer.geoJson"));
        assert!(html.contains("\"period\":\"PT1S\""));
        assert!(html.contains("'PT1H'"));
        assert!(html.contains("\"transitionTime\":100"));
        assert!(html.contains("2024-01-20T00:00:00"));
        assert!(html.contains("#53c688"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn render_writes_the_file() {
        let out = std::env::temp_dir().join("event_map_render_test/map.html");
        let written = LeafletRenderer::new(Backend::Animated)
            .render(&doc(), &out)
            .unwrap();
        let html = std::fs::read_to_string(&written).unwrap();
        assert!(html.contains("RA Events in Amsterdam"));
        std::fs::remove_dir_all(out.parent().unwrap()).ok();
    }
}
