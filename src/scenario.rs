//! Scenario runner: filter detections, evaluate counts, score boxes, report.

use crate::error::{Result, VerdictError};
use crate::evaluator::evaluate;
use crate::labels::{filter_objects, LabelCategory, TrafficCounts};
use crate::matching::match_detections;
use crate::registry::{ResolvedCase, TestRegistry};
use crate::report::{LocalizationReport, TestReport};
use crate::types::{DetectedObject, ExpectedBox};

/// Evaluate detector output for one registered test case.
///
/// Steps:
/// 1. resolve the case's ground truth and thresholds from the registry
/// 2. reduce `detections` to `category` (falling back to the case's suite)
/// 3. run the count-tolerance evaluator on the filtered count
/// 4. for signs, tally the per-class breakdown; when the case registers an
///    expected breakdown, every class count must match or the verdict fails
///    with one reason per mismatched class
/// 5. when `expected_boxes` is non-empty, greedily match them against the
///    filtered detections
///
/// # Errors
///
/// Returns `UnknownTestCase` for unregistered ids, and `InvalidInput` when
/// neither `category` nor the case's suite names a label category.
pub fn run_case(
    registry: &TestRegistry,
    test_id: &str,
    detections: &[DetectedObject],
    category: Option<LabelCategory>,
    expected_boxes: Option<&[ExpectedBox]>,
) -> Result<TestReport> {
    let case = registry.resolve(test_id)?;
    let category = category.or(case.suite).ok_or_else(|| {
        VerdictError::InvalidInput(format!(
            "{}: no label category given and none registered for the case",
            test_id
        ))
    })?;

    evaluate_resolved(&case, detections, category, expected_boxes)
}

/// Evaluate detector output against an already resolved case.
pub fn evaluate_resolved(
    case: &ResolvedCase,
    detections: &[DetectedObject],
    category: LabelCategory,
    expected_boxes: Option<&[ExpectedBox]>,
) -> Result<TestReport> {
    let relevant = filter_objects(detections, category);

    let detected_count = i64::try_from(relevant.len()).map_err(|_| {
        VerdictError::InvalidInput(format!("{} detections overflow a count", relevant.len()))
    })?;
    let expected_count = i64::try_from(case.expected_count).map_err(|_| {
        VerdictError::InvalidInput(format!("expected_count {} is too large", case.expected_count))
    })?;

    let mut verdict = evaluate(
        expected_count,
        detected_count,
        case.group_size_category,
        case.detection_rate_threshold,
    )?;

    let traffic = (category == LabelCategory::Signs).then(|| TrafficCounts::tally(&relevant));
    if let (Some(detected), Some(expected)) = (&traffic, &case.expected_traffic) {
        let mismatches = detected.mismatches(expected);
        if !mismatches.is_empty() {
            verdict.passed = false;
            verdict.reasons.extend(mismatches);
        }
    }

    let localization = match expected_boxes {
        Some(boxes) if !boxes.is_empty() => {
            let result = match_detections(boxes, &relevant, case.iou_threshold)?;
            Some(LocalizationReport::new(boxes.len(), case.iou_threshold, result))
        }
        _ => {
            log::debug!("{}: no expected localizations, skipping IoU check", case.test_id);
            None
        }
    };

    if verdict.passed {
        log::info!(
            "{}: PASS ({} of {} {})",
            case.test_id,
            verdict.detected_count,
            verdict.expected_count,
            category
        );
    } else {
        log::info!("{}: FAIL - {}", case.test_id, verdict.reasons.join("; "));
    }

    let mut report = TestReport::new(case.test_id.clone(), verdict, localization, &relevant);
    report.suite = Some(category);
    report.description = case.description.clone();
    report.traffic = traffic;
    Ok(report)
}
