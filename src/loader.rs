//! JSON loading for detector responses and expected localizations.
//!
//! Detector responses arrive in the localized-object-annotation shape and
//! are converted into [`DetectedObject`] at this boundary; nothing past it
//! sees the raw response.

use crate::error::{Result, VerdictError};
use crate::types::{DetectedObject, ExpectedBox, NormalizedQuad, Vertex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Polygon wrapper as emitted by the detector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub normalized_vertices: Vec<Vertex>,
}

/// One localized object annotation from the detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectAnnotation {
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
}

impl TryFrom<ObjectAnnotation> for DetectedObject {
    type Error = VerdictError;

    fn try_from(annotation: ObjectAnnotation) -> Result<Self> {
        let quad = NormalizedQuad::new(&annotation.bounding_poly.normalized_vertices).map_err(|e| {
            VerdictError::InvalidInput(format!("annotation '{}': {}", annotation.name, e))
        })?;
        DetectedObject::new(annotation.name, annotation.score, quad)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetectorResponse {
    Wrapped {
        localized_object_annotations: Vec<ObjectAnnotation>,
    },
    Bare(Vec<ObjectAnnotation>),
}

impl DetectorResponse {
    fn into_annotations(self) -> Vec<ObjectAnnotation> {
        match self {
            DetectorResponse::Wrapped {
                localized_object_annotations,
            } => localized_object_annotations,
            DetectorResponse::Bare(annotations) => annotations,
        }
    }
}

/// Load detections from a detector response JSON string.
///
/// Accepts either `{"localized_object_annotations": [...]}` or a bare array
/// of annotations. Vertices that omit `x` or `y` read as 0.0.
///
/// # Errors
///
/// Returns an error if the JSON cannot be parsed, an annotation does not
/// have exactly four vertices, or a score lies outside [0, 1].
///
/// # Example
///
/// ```
/// use detection_verdict::loader::load_detections_from_str;
///
/// let json = r#"{"localized_object_annotations": [{
///     "name": "Person",
///     "score": 0.91,
///     "bounding_poly": {"normalized_vertices": [
///         {"x": 0.1, "y": 0.2}, {"x": 0.3, "y": 0.2},
///         {"x": 0.3, "y": 0.8}, {"x": 0.1, "y": 0.8}
///     ]}
/// }]}"#;
/// let detections = load_detections_from_str(json).unwrap();
/// assert_eq!(detections.len(), 1);
/// ```
pub fn load_detections_from_str(json_str: &str) -> Result<Vec<DetectedObject>> {
    let response: DetectorResponse = serde_json::from_str(json_str)?;
    convert_annotations(response.into_annotations())
}

/// Load detections from a detector response JSON file.
pub fn load_detections_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<DetectedObject>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let response: DetectorResponse = serde_json::from_reader(reader)?;
    convert_annotations(response.into_annotations())
}

fn convert_annotations(annotations: Vec<ObjectAnnotation>) -> Result<Vec<DetectedObject>> {
    annotations
        .into_iter()
        .map(DetectedObject::try_from)
        .collect()
}

/// Expected boxes for one test case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseLocalizations {
    #[serde(default)]
    pub localizations: Vec<ExpectedBox>,
}

/// Contents of an `expected_localizations.json` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedLocalizations {
    #[serde(default)]
    pub test_cases: BTreeMap<String, CaseLocalizations>,
}

impl ExpectedLocalizations {
    /// Expected boxes for a test case.
    ///
    /// `None` when the case has no entry or an empty list, meaning the
    /// localization check is skipped for it.
    pub fn boxes_for(&self, test_id: &str) -> Option<&[ExpectedBox]> {
        self.test_cases
            .get(test_id)
            .map(|case| case.localizations.as_slice())
            .filter(|boxes| !boxes.is_empty())
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }
}

/// Load expected localizations from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON cannot be parsed or any box has non-finite
/// or inverted coordinates.
pub fn load_localizations_from_str(json_str: &str) -> Result<ExpectedLocalizations> {
    let localizations: ExpectedLocalizations = serde_json::from_str(json_str)?;
    validate_localizations(&localizations)?;
    Ok(localizations)
}

/// Load expected localizations from a JSON file.
pub fn load_localizations_from_file<P: AsRef<Path>>(path: P) -> Result<ExpectedLocalizations> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let localizations: ExpectedLocalizations = serde_json::from_reader(reader)?;
    validate_localizations(&localizations)?;
    Ok(localizations)
}

fn validate_localizations(localizations: &ExpectedLocalizations) -> Result<()> {
    for (test_id, case) in &localizations.test_cases {
        for (i, expected) in case.localizations.iter().enumerate() {
            expected.bounding_box.validate().map_err(|e| match e {
                VerdictError::InvalidInput(msg) => {
                    VerdictError::InvalidInput(format!("{} box {}: {}", test_id, i + 1, msg))
                }
                other => {
                    VerdictError::InvalidBoundingBox(format!("{} box {}: {}", test_id, i + 1, other))
                }
            })?;
        }
    }
    Ok(())
}
