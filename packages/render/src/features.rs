//! GeoJSON encoding of animation frames.
//!
//! The playback layer consumes a `FeatureCollection` where every feature
//! is a point tagged with an ISO-8601 `time` property and a nested
//! `iconstyle` describing the circle at that instant. Coordinates are
//! `[longitude, latitude]`, per GeoJSON.

use event_map_transform::AnimationFeature;
use geojson::{Feature, FeatureCollection, Geometry, Value};

/// Timestamp format for the `time` property.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Encodes animation frames as a timestamped `FeatureCollection`.
#[must_use]
pub fn feature_collection(frames: &[AnimationFeature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: frames.iter().map(frame_to_feature).collect(),
        foreign_members: None,
    }
}

/// Encodes one frame as a GeoJSON point feature.
fn frame_to_feature(frame: &AnimationFeature) -> Feature {
    let mut iconstyle = serde_json::Map::new();
    iconstyle.insert("fillOpacity".to_string(), frame.fill_opacity.into());
    iconstyle.insert("stroke".to_string(), frame.stroke.into());
    iconstyle.insert("radius".to_string(), frame.radius.into());
    iconstyle.insert("color".to_string(), frame.color.clone().into());

    let mut properties = serde_json::Map::new();
    properties.insert(
        "time".to_string(),
        frame.time.format(TIME_FORMAT).to_string().into(),
    );
    properties.insert("popup".to_string(), frame.popup.clone().into());
    properties.insert("icon".to_string(), "circle".into());
    properties.insert(
        "iconstyle".to_string(),
        serde_json::Value::Object(iconstyle),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            frame.longitude,
            frame.latitude,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn frame() -> AnimationFeature {
        AnimationFeature {
            longitude: 4.8712701,
            latitude: 52.3643889,
            time: NaiveDateTime::parse_from_str("2024-01-20T00:00:05", "%Y-%m-%dT%H:%M:%S")
                .unwrap(),
            radius: 25.5,
            fill_opacity: 0.8,
            color: "#69b3a2".to_string(),
            stroke: true,
            popup: "Warehouse Night at De School (250 guests)".to_string(),
        }
    }

    #[test]
    fn coordinates_are_longitude_first() {
        let collection = feature_collection(&[frame()]);
        let geometry = collection.features[0].geometry.as_ref().unwrap();
        let Value::Point(ref coords) = geometry.value else {
            panic!("expected a point geometry");
        };
        assert!((coords[0] - 4.8712701).abs() < f64::EPSILON);
        assert!((coords[1] - 52.3643889).abs() < f64::EPSILON);
    }

    #[test]
    fn properties_carry_time_and_nested_iconstyle() {
        let collection = feature_collection(&[frame()]);
        let props = collection.features[0].properties.as_ref().unwrap();

        assert_eq!(
            props["time"],
            serde_json::json!("2024-01-20T00:00:05")
        );
        assert_eq!(props["icon"], serde_json::json!("circle"));
        assert_eq!(props["iconstyle"]["radius"], serde_json::json!(25.5));
        assert_eq!(props["iconstyle"]["color"], serde_json::json!("#69b3a2"));
        assert_eq!(props["iconstyle"]["stroke"], serde_json::json!(true));
        assert_eq!(props["iconstyle"]["fillOpacity"], serde_json::json!(0.8));
    }

    #[test]
    fn collection_preserves_frame_order() {
        let mut second = frame();
        second.radius = 50.0;
        let collection = feature_collection(&[frame(), second]);
        assert_eq!(collection.features.len(), 2);
        let radius_of = |i: usize| {
            collection.features[i].properties.as_ref().unwrap()["iconstyle"]["radius"]
                .as_f64()
                .unwrap()
        };
        assert!((radius_of(0) - 25.5).abs() < f64::EPSILON);
        assert!((radius_of(1) - 50.0).abs() < f64::EPSILON);
    }
}
