//! Confidence score thresholding utilities.

use crate::error::{Result, VerdictError};
use crate::types::DetectedObject;

/// Mean confidence below which a report carries a low-confidence warning.
///
/// The warning never fails a case on its own.
pub const CONFIDENCE_WARNING_THRESHOLD: f64 = 0.75;

/// Filter detections by confidence score threshold.
///
/// # Arguments
///
/// * `objects` - Detections to filter
/// * `threshold` - Minimum confidence score (0.0 to 1.0)
///
/// # Returns
///
/// Returns a new vector containing only detections with confidence >= threshold.
///
/// # Errors
///
/// Returns an error if the threshold is not in the valid range [0.0, 1.0].
///
/// # Example
///
/// ```
/// use detection_verdict::threshold::filter_by_confidence;
/// use detection_verdict::types::{BoundingBox, DetectedObject, NormalizedQuad};
///
/// let quad = NormalizedQuad::from_bbox(&BoundingBox::new(0.1, 0.2, 0.3, 0.4));
/// let objects = vec![
///     DetectedObject::new("Person", 0.9, quad).unwrap(),
///     DetectedObject::new("Person", 0.3, quad).unwrap(),
/// ];
///
/// let filtered = filter_by_confidence(&objects, 0.5).unwrap();
/// assert_eq!(filtered.len(), 1);
/// ```
pub fn filter_by_confidence(objects: &[DetectedObject], threshold: f64) -> Result<Vec<DetectedObject>> {
    validate_threshold(threshold)?;

    Ok(objects
        .iter()
        .filter(|obj| obj.confidence >= threshold)
        .cloned()
        .collect())
}

/// Mean confidence of a detection list, `None` when it is empty.
pub fn average_confidence(objects: &[DetectedObject]) -> Option<f64> {
    if objects.is_empty() {
        return None;
    }
    Some(objects.iter().map(|obj| obj.confidence).sum::<f64>() / objects.len() as f64)
}

/// Highest confidence in a detection list, 0.0 when it is empty.
pub fn max_confidence(objects: &[DetectedObject]) -> f64 {
    objects
        .iter()
        .map(|obj| obj.confidence)
        .fold(0.0, f64::max)
}

/// Warning text when the mean confidence drops below
/// [`CONFIDENCE_WARNING_THRESHOLD`].
pub fn low_confidence_warning(objects: &[DetectedObject]) -> Option<String> {
    average_confidence(objects)
        .filter(|&avg| avg < CONFIDENCE_WARNING_THRESHOLD)
        .map(|avg| {
            format!(
                "Average confidence {:.2} below {:.2} (warning)",
                avg, CONFIDENCE_WARNING_THRESHOLD
            )
        })
}

/// Validate that a threshold is in the valid range [0.0, 1.0].
fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(VerdictError::InvalidThreshold(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}
