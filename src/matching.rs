//! Greedy IoU matching of expected boxes against detected boxes.

use crate::error::{Result, VerdictError};
use crate::metrics::iou::calculate_iou;
use crate::types::{BoundingBox, DetectedObject, ExpectedBox, MatchDetail, MatchResult};

/// IoU needed for an expected box to count as localized.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.3;

/// Match expected boxes to detected boxes.
///
/// Uses greedy, expected-major matching: expected boxes are visited in input
/// order, and each one claims the unused detected box with the highest IoU
/// (lowest index on ties). A claim only happens when that IoU reaches
/// `iou_threshold`; otherwise the expected box stays unmatched and the best
/// IoU seen is still recorded in its detail row.
///
/// Only overlapping detections are candidates: a detection with IoU 0 is
/// never paired, even at a threshold of 0.
///
/// An earlier expected box can take a detection that a later one would have
/// fit better. There is no backtracking.
///
/// # Arguments
///
/// * `expected` - Ground-truth rectangles
/// * `detected` - Detector rectangles (quads already reduced)
/// * `iou_threshold` - Minimum IoU to consider a match, in [0, 1]
///
/// # Returns
///
/// Returns a `MatchResult` with one detail row per expected box, in input
/// order. `average_iou` is the mean over matched pairs only; with both
/// inputs empty it is 1.0, with exactly one empty it is 0.0.
///
/// # Errors
///
/// Returns an error if the threshold is out of range or any box has
/// non-finite or inverted coordinates.
///
/// # Example
///
/// ```
/// use detection_verdict::matching::match_boxes;
/// use detection_verdict::types::BoundingBox;
///
/// let expected = vec![BoundingBox::new(0.1, 0.1, 0.4, 0.4)];
/// let detected = vec![BoundingBox::new(0.1, 0.1, 0.4, 0.4)];
/// let result = match_boxes(&expected, &detected, 0.3).unwrap();
/// assert_eq!(result.matched_count, 1);
/// assert!((result.average_iou - 1.0).abs() < 1e-10);
/// ```
pub fn match_boxes(
    expected: &[BoundingBox],
    detected: &[BoundingBox],
    iou_threshold: f64,
) -> Result<MatchResult> {
    validate_iou_threshold(iou_threshold)?;
    for bbox in expected.iter().chain(detected) {
        bbox.validate()?;
    }

    if expected.is_empty() && detected.is_empty() {
        return Ok(MatchResult {
            matched_count: 0,
            average_iou: 1.0,
            details: Vec::new(),
        });
    }

    let mut used = vec![false; detected.len()];
    let mut details = Vec::with_capacity(expected.len());
    let mut matched_ious = Vec::new();

    for (expected_index, exp_box) in expected.iter().enumerate() {
        let mut best_iou = 0.0;
        let mut best_idx: Option<usize> = None;

        for (det_idx, det_box) in detected.iter().enumerate() {
            if used[det_idx] {
                continue;
            }

            let iou = calculate_iou(exp_box, det_box);
            if iou > best_iou {
                best_iou = iou;
                best_idx = Some(det_idx);
            }
        }

        let claimed = match best_idx {
            Some(det_idx) if best_iou >= iou_threshold => {
                used[det_idx] = true;
                matched_ious.push(best_iou);
                Some(det_idx)
            }
            _ => None,
        };

        log::trace!(
            "expected box {} -> {:?} (best iou {:.4})",
            expected_index,
            claimed,
            best_iou
        );

        details.push(MatchDetail {
            expected_index,
            detected_index: claimed,
            iou: best_iou,
            matched: claimed.is_some(),
        });
    }

    let matched_count = matched_ious.len();
    let average_iou = if matched_ious.is_empty() {
        0.0
    } else {
        matched_ious.iter().sum::<f64>() / matched_count as f64
    };

    log::debug!(
        "matched {}/{} expected boxes against {} detections, average iou {:.4}",
        matched_count,
        expected.len(),
        detected.len(),
        average_iou
    );

    Ok(MatchResult {
        matched_count,
        average_iou,
        details,
    })
}

/// Match ground-truth boxes against detector output.
///
/// Reduces each detection's quad to its bounding rectangle before matching.
pub fn match_detections(
    expected: &[ExpectedBox],
    detections: &[DetectedObject],
    iou_threshold: f64,
) -> Result<MatchResult> {
    let expected_boxes: Vec<BoundingBox> = expected.iter().map(|e| e.bounding_box).collect();
    let detected_boxes: Vec<BoundingBox> = detections.iter().map(|d| d.to_bbox()).collect();
    match_boxes(&expected_boxes, &detected_boxes, iou_threshold)
}

/// Validate that an IoU threshold is in the valid range [0.0, 1.0].
pub(crate) fn validate_iou_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(VerdictError::InvalidThreshold(format!(
            "IoU threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}
