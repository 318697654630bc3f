//! Tests for the loader and type modules.
//!
//! Covers BoundingBox geometry, quads, detector response parsing and the
//! expected-localizations file format.

use detection_verdict::labels::{classify_traffic, TrafficClass, TrafficCounts};
use detection_verdict::loader::{
    load_detections_from_file, load_detections_from_str, load_localizations_from_file,
    load_localizations_from_str,
};
use detection_verdict::types::{
    BoundingBox, DetectedObject, ExpectedBox, GroupSizeCategory, LocalizationQuality,
    NormalizedQuad, Verdict, Vertex,
};
use std::io::Write;

#[test]
fn test_bounding_box_new() {
    let bbox = BoundingBox::new(0.1, 0.2, 0.4, 0.6);
    assert_eq!(bbox.x_min, 0.1);
    assert_eq!(bbox.y_min, 0.2);
    assert_eq!(bbox.x_max, 0.4);
    assert_eq!(bbox.y_max, 0.6);
}

#[test]
fn test_bounding_box_dimensions() {
    let bbox = BoundingBox::new(0.0, 0.0, 0.5, 0.25);
    assert_eq!(bbox.width(), 0.5);
    assert_eq!(bbox.height(), 0.25);
    assert_eq!(bbox.area(), 0.125);
}

#[test]
fn test_bounding_box_area_zero() {
    let bbox = BoundingBox::new(0.3, 0.3, 0.3, 0.7);
    assert_eq!(bbox.area(), 0.0);
    assert!(!bbox.is_valid());
    assert!(bbox.validate().is_ok());
}

#[test]
fn test_bounding_box_inverted() {
    let bbox = BoundingBox::new(0.5, 0.5, 0.1, 0.1);
    assert!(!bbox.is_valid());
    assert!(bbox.validate().is_err());
}

#[test]
fn test_bounding_box_serde_field_names() {
    let bbox = BoundingBox::new(0.25, 0.5, 0.75, 1.0);
    let json = serde_json::to_value(bbox).unwrap();
    assert_eq!(json["x_min"], 0.25);
    assert_eq!(json["y_max"], 1.0);
}

#[test]
fn test_quad_reduces_to_enclosing_rectangle() {
    // Slightly rotated quad
    let quad = NormalizedQuad::new(&[
        Vertex::new(0.2, 0.1),
        Vertex::new(0.5, 0.15),
        Vertex::new(0.45, 0.6),
        Vertex::new(0.15, 0.55),
    ])
    .unwrap();

    let bbox = quad.to_bbox();
    assert_eq!(bbox, BoundingBox::new(0.15, 0.1, 0.5, 0.6));
}

#[test]
fn test_quad_from_bbox_round_trip() {
    let bbox = BoundingBox::new(0.1, 0.2, 0.3, 0.4);
    let quad = NormalizedQuad::from_bbox(&bbox);
    assert_eq!(quad.vertices()[0], Vertex::new(0.1, 0.2));
    assert_eq!(quad.vertices()[2], Vertex::new(0.3, 0.4));
    assert_eq!(quad.to_bbox(), bbox);
}

#[test]
fn test_quad_serializes_as_vertex_list() {
    let quad = NormalizedQuad::from_bbox(&BoundingBox::new(0.0, 0.0, 1.0, 1.0));
    let json = serde_json::to_value(quad).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 4);

    let bad: Result<NormalizedQuad, _> = serde_json::from_str(r#"[{"x": 0.1, "y": 0.1}]"#);
    assert!(bad.is_err());
}

#[test]
fn test_detected_object_confidence_bounds() {
    let quad = NormalizedQuad::from_bbox(&BoundingBox::new(0.1, 0.1, 0.2, 0.2));
    assert!(DetectedObject::new("Person", 0.0, quad).is_ok());
    assert!(DetectedObject::new("Person", 1.0, quad).is_ok());
    assert!(DetectedObject::new("Person", 1.01, quad).is_err());
    assert!(DetectedObject::new("Person", f64::NAN, quad).is_err());
}

// ============================================================================
// DETECTOR RESPONSES
// ============================================================================

#[test]
fn test_load_wrapped_response() {
    let json = r#"{"localized_object_annotations": [
        {"name": "Person", "score": 0.93, "bounding_poly": {"normalized_vertices": [
            {"x": 0.1, "y": 0.2}, {"x": 0.3, "y": 0.2}, {"x": 0.3, "y": 0.9}, {"x": 0.1, "y": 0.9}
        ]}},
        {"name": "Car", "score": 0.71, "bounding_poly": {"normalized_vertices": [
            {"x": 0.5, "y": 0.5}, {"x": 0.9, "y": 0.5}, {"x": 0.9, "y": 0.8}, {"x": 0.5, "y": 0.8}
        ]}}
    ]}"#;

    let detections = load_detections_from_str(json).unwrap();
    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].label, "Person");
    assert_eq!(detections[0].confidence, 0.93);
    assert_eq!(detections[1].to_bbox(), BoundingBox::new(0.5, 0.5, 0.9, 0.8));
}

#[test]
fn test_load_bare_array() {
    let json = r#"[{"name": "Bus", "score": 0.8, "bounding_poly": {"normalized_vertices": [
        {"x": 0.1, "y": 0.1}, {"x": 0.2, "y": 0.1}, {"x": 0.2, "y": 0.2}, {"x": 0.1, "y": 0.2}
    ]}}]"#;
    let detections = load_detections_from_str(json).unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].label, "Bus");
}

#[test]
fn test_load_empty_response() {
    let detections = load_detections_from_str(r#"{"localized_object_annotations": []}"#).unwrap();
    assert!(detections.is_empty());
}

#[test]
fn test_missing_vertex_coordinates_default_to_zero() {
    // Detectors omit zero-valued coordinates
    let json = r#"[{"name": "Person", "score": 0.9, "bounding_poly": {"normalized_vertices": [
        {}, {"x": 0.4}, {"x": 0.4, "y": 0.6}, {"y": 0.6}
    ]}}]"#;
    let detections = load_detections_from_str(json).unwrap();
    assert_eq!(detections[0].to_bbox(), BoundingBox::new(0.0, 0.0, 0.4, 0.6));
}

#[test]
fn test_load_detections_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"localized_object_annotations": [{{"name": "Stop sign", "score": 0.88, "bounding_poly": {{"normalized_vertices": [
            {{"x": 0.6, "y": 0.1}}, {{"x": 0.7, "y": 0.1}}, {{"x": 0.7, "y": 0.2}}, {{"x": 0.6, "y": 0.2}}
        ]}}}}]}}"#
    )
    .unwrap();

    let detections = load_detections_from_file(file.path()).unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(classify_traffic(&detections[0].label), Some(TrafficClass::StopSign));
}

// ============================================================================
// EXPECTED LOCALIZATIONS
// ============================================================================

const LOCALIZATIONS: &str = r#"{"test_cases": {
    "P-02": {"localizations": [
        {"bounding_box": {"x_min": 0.1, "y_min": 0.2, "x_max": 0.3, "y_max": 0.8}, "type": "person"},
        {"bounding_box": {"x_min": 0.5, "y_min": 0.2, "x_max": 0.7, "y_max": 0.8}, "type": "person"}
    ]},
    "PT-05": {"localizations": []},
    "c-01": {"localizations": [
        {"bounding_box": {"x_min": 0.2, "y_min": 0.5, "x_max": 0.6, "y_max": 0.9}}
    ]}
}}"#;

#[test]
fn test_load_localizations() {
    let localizations = load_localizations_from_str(LOCALIZATIONS).unwrap();
    assert_eq!(localizations.len(), 3);

    let boxes = localizations.boxes_for("P-02").unwrap();
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0].kind.as_deref(), Some("person"));
    assert_eq!(boxes[1].bounding_box, BoundingBox::new(0.5, 0.2, 0.7, 0.8));

    let car = localizations.boxes_for("c-01").unwrap();
    assert_eq!(car[0].kind, None);
}

#[test]
fn test_empty_or_missing_localizations_skip() {
    let localizations = load_localizations_from_str(LOCALIZATIONS).unwrap();
    assert!(localizations.boxes_for("PT-05").is_none());
    assert!(localizations.boxes_for("S-01").is_none());
}

#[test]
fn test_load_localizations_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(LOCALIZATIONS.as_bytes()).unwrap();

    let localizations = load_localizations_from_file(file.path()).unwrap();
    assert!(!localizations.is_empty());
    assert!(localizations.boxes_for("P-02").is_some());
}

#[test]
fn test_expected_box_serializes_type_field() {
    let expected = ExpectedBox::new(BoundingBox::new(0.1, 0.1, 0.2, 0.2)).with_kind("car");
    let json = serde_json::to_value(&expected).unwrap();
    assert_eq!(json["type"], "car");
}

// ============================================================================
// ENUMS AND VERDICT SERIALIZATION
// ============================================================================

#[test]
fn test_group_size_category_parse() {
    assert_eq!("crowd".parse::<GroupSizeCategory>().unwrap(), GroupSizeCategory::Crowd);
    assert_eq!(" Medium ".parse::<GroupSizeCategory>().unwrap(), GroupSizeCategory::Medium);
    assert_eq!(GroupSizeCategory::Individual.to_string(), "individual");
}

#[test]
fn test_localization_quality_bands() {
    assert_eq!(LocalizationQuality::from_average_iou(0.5), LocalizationQuality::Good);
    assert_eq!(LocalizationQuality::from_average_iou(0.3), LocalizationQuality::Acceptable);
    assert_eq!(LocalizationQuality::from_average_iou(0.29), LocalizationQuality::Poor);
}

#[test]
fn test_verdict_json() {
    let verdict = detection_verdict::evaluate(4, 2, GroupSizeCategory::Small, 85.0).unwrap();
    let json = serde_json::to_string(&verdict).unwrap();
    assert!(json.contains(r#""group_size_category":"small""#));

    let parsed: Verdict = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, verdict);
    assert_eq!(parsed.status(), "FAIL");
}

#[test]
fn test_traffic_counts_from_detections() {
    let quad = NormalizedQuad::from_bbox(&BoundingBox::new(0.1, 0.1, 0.2, 0.2));
    let detections: Vec<DetectedObject> = ["Traffic light", "Stop sign", "Speed limit sign", "Sign", "Tree"]
        .iter()
        .map(|label| DetectedObject::new(*label, 0.9, quad).unwrap())
        .collect();

    let counts = TrafficCounts::tally(&detections);
    assert_eq!(counts.total_stoplights, 1);
    assert_eq!(counts.total_signs, 3);
    assert_eq!(counts.stop_sign, 1);
    assert_eq!(counts.speed_limit_sign, 1);
    assert_eq!(counts.total(), 4);
}
