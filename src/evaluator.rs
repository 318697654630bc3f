//! Count-tolerance verdicts for a single test case.

use crate::error::{Result, VerdictError};
use crate::metrics::tolerance::ToleranceSpec;
use crate::types::{GroupSizeCategory, Verdict};

/// Detection rate (percent) a case must reach unless overridden.
pub const DEFAULT_DETECTION_RATE_THRESHOLD: f64 = 85.0;

/// Decide pass/fail for one test case from ground truth and detector output.
///
/// **Zero expected**: the case is a pure false-positive check. It passes
/// only when nothing was detected; tolerance bands do not apply.
///
/// **Positive expected**: two independent checks, each adding its own
/// reason on failure:
/// 1. detection rate (`detected / expected * 100`) must reach
///    `detection_rate_threshold`
/// 2. `|detected - expected|` must stay within the category's tolerance
///
/// # Arguments
///
/// * `expected_count` - Ground-truth object count
/// * `detected_count` - Objects of the target class the detector reported
/// * `group_size_category` - Tolerance tier for this case
/// * `detection_rate_threshold` - Required detection rate, in (0, 100]
///
/// # Errors
///
/// Returns `InvalidInput` for negative counts and `InvalidThreshold` for a
/// threshold outside (0, 100]. A failed check is not an error.
///
/// # Example
///
/// ```
/// use detection_verdict::evaluator::evaluate;
/// use detection_verdict::types::GroupSizeCategory;
///
/// let verdict = evaluate(12, 11, GroupSizeCategory::Large, 85.0).unwrap();
/// assert!(verdict.passed);
/// assert_eq!(verdict.tolerance, 2);
/// ```
pub fn evaluate(
    expected_count: i64,
    detected_count: i64,
    group_size_category: GroupSizeCategory,
    detection_rate_threshold: f64,
) -> Result<Verdict> {
    let expected = non_negative("expected_count", expected_count)?;
    let detected = non_negative("detected_count", detected_count)?;
    validate_detection_rate_threshold(detection_rate_threshold)?;

    let tolerance = ToleranceSpec::for_category(group_size_category).tolerance(expected);
    let count_error = expected.abs_diff(detected);
    let mut reasons = Vec::new();

    let (detection_rate, within_tolerance, passed) = if expected == 0 {
        let passed = detected == 0;
        if !passed {
            reasons.push(format!(
                "False positive: Expected 0 but detected {}",
                detected
            ));
        }
        (0.0, passed, passed)
    } else {
        let detection_rate = detected as f64 * 100.0 / expected as f64;
        let rate_ok = detection_rate >= detection_rate_threshold;
        let within_tolerance = count_error <= tolerance;

        if !rate_ok {
            reasons.push(format!(
                "Detection rate {:.1}% below {}% threshold",
                detection_rate, detection_rate_threshold
            ));
        }
        if !within_tolerance {
            reasons.push(format!(
                "Count error {} exceeds ±{} tolerance",
                count_error, tolerance
            ));
        }
        (detection_rate, within_tolerance, rate_ok && within_tolerance)
    };

    log::debug!(
        "verdict expected={} detected={} category={} rate={:.1}% tolerance={} -> {}",
        expected,
        detected,
        group_size_category,
        detection_rate,
        tolerance,
        if passed { "PASS" } else { "FAIL" }
    );

    Ok(Verdict {
        expected_count: expected,
        detected_count: detected,
        group_size_category,
        detection_rate,
        detection_rate_threshold,
        tolerance,
        count_error,
        within_tolerance,
        false_positives: detected.saturating_sub(expected),
        false_negatives: expected.saturating_sub(detected),
        passed,
        reasons,
    })
}

/// Evaluate with the category derived from the expected count and the
/// default 85% detection-rate threshold.
pub fn evaluate_with_defaults(expected_count: i64, detected_count: i64) -> Result<Verdict> {
    let expected = non_negative("expected_count", expected_count)?;
    evaluate(
        expected_count,
        detected_count,
        GroupSizeCategory::from_count(expected),
        DEFAULT_DETECTION_RATE_THRESHOLD,
    )
}

/// Validate that a detection-rate threshold is in (0, 100].
pub(crate) fn validate_detection_rate_threshold(threshold: f64) -> Result<()> {
    if !(threshold > 0.0 && threshold <= 100.0) {
        return Err(VerdictError::InvalidThreshold(format!(
            "Detection rate threshold must be in (0, 100], got {}",
            threshold
        )));
    }
    Ok(())
}

fn non_negative(name: &str, count: i64) -> Result<u64> {
    u64::try_from(count).map_err(|_| {
        VerdictError::InvalidInput(format!("{} must be non-negative, got {}", name, count))
    })
}
