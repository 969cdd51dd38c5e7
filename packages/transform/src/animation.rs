//! Growing-circle animation frame generation.
//!
//! Each plotted event becomes a timestamp-ordered sequence of point
//! features at the event's coordinate: one small, faint "seed" frame,
//! then `step_count` frames whose radius grows linearly up to the
//! event's scaled attendance. Downstream rendering groups features by
//! timestamp to drive playback; position never changes within a
//! sequence, only radius, opacity, and color.

use chrono::{Duration, NaiveDateTime};
use event_map_event_models::PlottedEvent;
use serde::{Deserialize, Serialize};

/// Seed-frame fill color (the first, faint frame of each sequence).
pub const SEED_COLOR: &str = "#53c688";

/// Grown-frame fill color.
pub const GROWN_COLOR: &str = "#69b3a2";

/// Configuration for one run's growth animations.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Timestamp of the seed frame; steps are offset from here.
    pub start_time: NaiveDateTime,
    /// Number of growth steps after the seed frame. Must be at least 1.
    pub step_count: u32,
    /// Animation-time spacing between consecutive frames.
    pub step_interval: Duration,
    /// Radius of the seed frame, in the renderer's radius units.
    pub initial_radius: f64,
    /// Fill opacity of the seed frame.
    pub seed_opacity: f64,
    /// Fill opacity of the growth frames.
    pub grown_opacity: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            start_time: NaiveDateTime::parse_from_str("2024-01-20T00:00:00", "%Y-%m-%dT%H:%M:%S")
                .expect("valid timestamp literal"),
            step_count: 10,
            step_interval: Duration::seconds(1),
            initial_radius: 1.0,
            seed_opacity: 0.6,
            grown_opacity: 0.8,
        }
    }
}

/// One frame of a growth animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationFeature {
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Frame timestamp on the animation's time axis.
    pub time: NaiveDateTime,
    /// Circle radius at this frame.
    pub radius: f64,
    /// Fill opacity at this frame.
    pub fill_opacity: f64,
    /// Fill color at this frame.
    pub color: String,
    /// Whether the circle outline is drawn at this frame.
    pub stroke: bool,
    /// Popup text shown when the circle is clicked.
    pub popup: String,
}

/// Error returned when an animation is requested with zero growth steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroStepsError;

impl std::fmt::Display for ZeroStepsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "animation step_count must be at least 1")
    }
}

impl std::error::Error for ZeroStepsError {}

/// Builds the growth sequence for one plotted event.
///
/// The sequence has `step_count + 1` frames: a seed frame at
/// `config.start_time` with `initial_radius`, then one frame per step at
/// `start_time + k * step_interval` with
/// `radius(k) = initial_radius + (scaled - initial_radius) * k / step_count`.
/// The final frame's radius is exactly the event's scaled attendance.
///
/// A scaled attendance at or below `initial_radius` produces a flat or
/// shrinking sequence; that is legal and never divides by zero.
///
/// # Errors
///
/// Returns [`ZeroStepsError`] if `config.step_count` is 0.
pub fn build_growth_sequence(
    event: &PlottedEvent,
    config: &AnimationConfig,
) -> Result<Vec<AnimationFeature>, ZeroStepsError> {
    if config.step_count == 0 {
        return Err(ZeroStepsError);
    }

    let popup = format!(
        "{} at {} ({} guests)",
        event.record.event_name, event.record.venue_name, event.record.attending
    );

    let mut features = Vec::with_capacity(config.step_count as usize + 1);

    features.push(AnimationFeature {
        longitude: event.longitude,
        latitude: event.latitude,
        time: config.start_time,
        radius: config.initial_radius,
        fill_opacity: config.seed_opacity,
        color: SEED_COLOR.to_string(),
        stroke: false,
        popup: popup.clone(),
    });

    #[allow(clippy::cast_precision_loss)]
    let final_radius = event.scaled_attendance as f64;
    let growth = final_radius - config.initial_radius;

    for k in 1..=config.step_count {
        let time = config.start_time + config.step_interval * i32::try_from(k).unwrap_or(i32::MAX);
        let radius = config.initial_radius + growth * f64::from(k) / f64::from(config.step_count);

        features.push(AnimationFeature {
            longitude: event.longitude,
            latitude: event.latitude,
            time,
            radius,
            fill_opacity: config.grown_opacity,
            color: GROWN_COLOR.to_string(),
            stroke: true,
            popup: popup.clone(),
        });
    }

    Ok(features)
}

/// Builds and concatenates growth sequences for every plotted event, in
/// the order given. Ordering across events carries no meaning; within an
/// event, frames are timestamp-ascending.
///
/// # Errors
///
/// Returns [`ZeroStepsError`] if `config.step_count` is 0.
pub fn build_dataset(
    events: &[PlottedEvent],
    config: &AnimationConfig,
) -> Result<Vec<AnimationFeature>, ZeroStepsError> {
    let mut features = Vec::with_capacity(events.len() * (config.step_count as usize + 1));
    for event in events {
        features.extend(build_growth_sequence(event, config)?);
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_map_event_models::EventRecord;

    fn plotted(scaled: i64) -> PlottedEvent {
        PlottedEvent {
            record: EventRecord {
                event_name: "Warehouse Night".to_string(),
                venue_name: "De School".to_string(),
                address: "Doctor Jan van Breemenstraat 1".to_string(),
                attending: 250,
                content_url: None,
                date: None,
            },
            latitude: 52.3643889,
            longitude: 4.8712701,
            scaled_attendance: scaled,
        }
    }

    #[test]
    fn seed_and_final_radius_are_exact() {
        let features = build_growth_sequence(&plotted(50), &AnimationConfig::default()).unwrap();
        assert_eq!(features.len(), 11);
        assert!((features[0].radius - 1.0).abs() < f64::EPSILON);
        assert!((features[10].radius - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn radius_is_monotonically_non_decreasing_when_growing() {
        let features = build_growth_sequence(&plotted(50), &AnimationConfig::default()).unwrap();
        for window in features.windows(2) {
            assert!(
                window[1].radius >= window[0].radius,
                "radius shrank: {} -> {}",
                window[0].radius,
                window[1].radius
            );
        }
    }

    #[test]
    fn position_is_fixed_across_frames() {
        let features = build_growth_sequence(&plotted(50), &AnimationConfig::default()).unwrap();
        assert!(features
            .iter()
            .all(|f| (f.longitude - 4.8712701).abs() < f64::EPSILON
                && (f.latitude - 52.3643889).abs() < f64::EPSILON));
    }

    #[test]
    fn timestamps_are_spaced_by_the_interval() {
        let config = AnimationConfig::default();
        let features = build_growth_sequence(&plotted(50), &config).unwrap();
        for (k, feature) in features.iter().enumerate() {
            let expected =
                config.start_time + config.step_interval * i32::try_from(k).unwrap();
            assert_eq!(feature.time, expected);
        }
    }

    #[test]
    fn seed_frame_style_differs_from_growth_frames() {
        let features = build_growth_sequence(&plotted(50), &AnimationConfig::default()).unwrap();
        assert_eq!(features[0].color, SEED_COLOR);
        assert!(!features[0].stroke);
        assert!((features[0].fill_opacity - 0.6).abs() < f64::EPSILON);
        for frame in &features[1..] {
            assert_eq!(frame.color, GROWN_COLOR);
            assert!(frame.stroke);
            assert!((frame.fill_opacity - 0.8).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn small_magnitude_shrinks_without_panicking() {
        let features = build_growth_sequence(&plotted(0), &AnimationConfig::default()).unwrap();
        assert!((features[0].radius - 1.0).abs() < f64::EPSILON);
        assert!((features[10].radius - 0.0).abs() < f64::EPSILON);
        for window in features.windows(2) {
            assert!(window[1].radius <= window[0].radius);
        }
    }

    #[test]
    fn zero_steps_is_rejected() {
        let config = AnimationConfig {
            step_count: 0,
            ..AnimationConfig::default()
        };
        assert_eq!(
            build_growth_sequence(&plotted(50), &config),
            Err(ZeroStepsError)
        );
    }

    #[test]
    fn dataset_concatenates_in_event_order() {
        let config = AnimationConfig::default();
        let events = vec![plotted(20), plotted(40)];
        let features = build_dataset(&events, &config).unwrap();
        assert_eq!(features.len(), 22);
        // The last frame of each sequence carries that event's magnitude.
        assert!((features[10].radius - 20.0).abs() < f64::EPSILON);
        assert!((features[21].radius - 40.0).abs() < f64::EPSILON);
    }
}
