//! Core data types for detections, ground truth and verdicts.

use crate::error::{Result, VerdictError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned bounding box in normalized image coordinates.
///
/// Coordinates are corners in XYXY format where:
/// - x_min / y_min: top-left corner
/// - x_max / y_max: bottom-right corner
///
/// All values are image-relative and expected in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its corners.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self { x_min, y_min, x_max, y_max }
    }

    /// Width of the box (x_max - x_min).
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the box (y_max - y_min).
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Get the area of the bounding box.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Check if the bounding box is valid (positive dimensions).
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Reject non-finite or inverted coordinates.
    ///
    /// A NaN or infinite coordinate is `InvalidInput`; finite corners in the
    /// wrong order are `InvalidBoundingBox`. Zero-area boxes pass: they are legitimate detector noise and score an
    /// IoU of zero downstream.
    pub fn validate(&self) -> Result<()> {
        let coords = [self.x_min, self.y_min, self.x_max, self.y_max];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(VerdictError::InvalidInput(format!(
                "non-finite coordinate in {:?}",
                coords
            )));
        }
        if self.x_max < self.x_min || self.y_max < self.y_min {
            return Err(VerdictError::InvalidBoundingBox(format!(
                "max corner ({}, {}) lies before min corner ({}, {})",
                self.x_max, self.y_max, self.x_min, self.y_min
            )));
        }
        Ok(())
    }
}

/// A single normalized vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Quadrilateral in image-relative coordinates, as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vertex>", into = "Vec<Vertex>")]
pub struct NormalizedQuad {
    vertices: [Vertex; 4],
}

impl NormalizedQuad {
    /// Build a quad from exactly four finite vertices.
    pub fn new(vertices: &[Vertex]) -> Result<Self> {
        let vertices: [Vertex; 4] = vertices.try_into().map_err(|_| {
            VerdictError::InvalidInput(format!(
                "quad needs 4 vertices, got {}",
                vertices.len()
            ))
        })?;

        if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
            return Err(VerdictError::InvalidInput(
                "quad vertex has a non-finite coordinate".to_string(),
            ));
        }

        Ok(Self { vertices })
    }

    /// Quad covering an axis-aligned rectangle, clockwise from top-left.
    pub fn from_bbox(bbox: &BoundingBox) -> Self {
        Self {
            vertices: [
                Vertex::new(bbox.x_min, bbox.y_min),
                Vertex::new(bbox.x_max, bbox.y_min),
                Vertex::new(bbox.x_max, bbox.y_max),
                Vertex::new(bbox.x_min, bbox.y_max),
            ],
        }
    }

    pub fn vertices(&self) -> &[Vertex; 4] {
        &self.vertices
    }

    /// Reduce to the enclosing axis-aligned rectangle (min/max of each axis).
    pub fn to_bbox(&self) -> BoundingBox {
        let (mut x_min, mut y_min) = (f64::INFINITY, f64::INFINITY);
        let (mut x_max, mut y_max) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for v in &self.vertices {
            x_min = x_min.min(v.x);
            y_min = y_min.min(v.y);
            x_max = x_max.max(v.x);
            y_max = y_max.max(v.y);
        }
        BoundingBox::new(x_min, y_min, x_max, y_max)
    }
}

impl TryFrom<Vec<Vertex>> for NormalizedQuad {
    type Error = VerdictError;

    fn try_from(vertices: Vec<Vertex>) -> Result<Self> {
        Self::new(&vertices)
    }
}

impl From<NormalizedQuad> for Vec<Vertex> {
    fn from(quad: NormalizedQuad) -> Self {
        quad.vertices.to_vec()
    }
}

/// One object reported by the detector for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    /// Detector confidence in [0, 1].
    pub confidence: f64,
    pub quad: NormalizedQuad,
}

impl DetectedObject {
    /// Create a detection, checking the confidence range.
    pub fn new(label: impl Into<String>, confidence: f64, quad: NormalizedQuad) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(VerdictError::InvalidInput(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                confidence
            )));
        }
        Ok(Self {
            label: label.into(),
            confidence,
            quad,
        })
    }

    /// Bounding rectangle of the detection's quad.
    pub fn to_bbox(&self) -> BoundingBox {
        self.quad.to_bbox()
    }
}

/// Ground-truth box authored for a test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedBox {
    pub bounding_box: BoundingBox,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ExpectedBox {
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Group-size tier used to pick a count tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupSizeCategory {
    Individual,
    Small,
    Medium,
    Large,
    Crowd,
}

impl GroupSizeCategory {
    pub const ALL: [GroupSizeCategory; 5] = [
        GroupSizeCategory::Individual,
        GroupSizeCategory::Small,
        GroupSizeCategory::Medium,
        GroupSizeCategory::Large,
        GroupSizeCategory::Crowd,
    ];

    /// Derive the category from a ground-truth count.
    ///
    /// 0-1 individual, 2-5 small, 6-10 medium, 11-20 large, >20 crowd.
    pub fn from_count(count: u64) -> Self {
        match count {
            0..=1 => GroupSizeCategory::Individual,
            2..=5 => GroupSizeCategory::Small,
            6..=10 => GroupSizeCategory::Medium,
            11..=20 => GroupSizeCategory::Large,
            _ => GroupSizeCategory::Crowd,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupSizeCategory::Individual => "individual",
            GroupSizeCategory::Small => "small",
            GroupSizeCategory::Medium => "medium",
            GroupSizeCategory::Large => "large",
            GroupSizeCategory::Crowd => "crowd",
        }
    }
}

impl fmt::Display for GroupSizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupSizeCategory {
    type Err = VerdictError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                VerdictError::InvalidInput(format!("unrecognized group size category '{}'", s))
            })
    }
}

/// Outcome of the count-tolerance check for one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub expected_count: u64,
    pub detected_count: u64,
    pub group_size_category: GroupSizeCategory,
    /// Detected / expected in percent; 0 when nothing is expected.
    pub detection_rate: f64,
    pub detection_rate_threshold: f64,
    pub tolerance: u64,
    pub count_error: u64,
    pub within_tolerance: bool,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub passed: bool,
    /// Failure reasons, in check order. Empty when the verdict passed.
    pub reasons: Vec<String>,
}

impl Verdict {
    pub fn status(&self) -> &'static str {
        if self.passed {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

/// One row of the expected-major matching table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub expected_index: usize,
    pub detected_index: Option<usize>,
    /// Best IoU found for this expected box, kept even below threshold.
    pub iou: f64,
    pub matched: bool,
}

/// Localization score of detected boxes against expected boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_count: usize,
    /// Mean IoU over matched pairs only.
    pub average_iou: f64,
    pub details: Vec<MatchDetail>,
}

impl MatchResult {
    /// Fraction of expected boxes that found a partner.
    pub fn recall(&self) -> f64 {
        if self.details.is_empty() {
            0.0
        } else {
            self.matched_count as f64 / self.details.len() as f64
        }
    }

    pub fn quality(&self) -> LocalizationQuality {
        LocalizationQuality::from_average_iou(self.average_iou)
    }
}

/// Coarse grade of an average IoU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalizationQuality {
    Good,
    Acceptable,
    Poor,
}

impl LocalizationQuality {
    pub fn from_average_iou(average_iou: f64) -> Self {
        if average_iou >= 0.5 {
            LocalizationQuality::Good
        } else if average_iou >= 0.3 {
            LocalizationQuality::Acceptable
        } else {
            LocalizationQuality::Poor
        }
    }
}
