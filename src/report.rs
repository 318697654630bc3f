//! Serializable per-case reports and suite-level summaries.

use crate::error::Result;
use crate::labels::{LabelCategory, TrafficCounts};
use crate::threshold::{average_confidence, low_confidence_warning, max_confidence};
use crate::types::{BoundingBox, DetectedObject, LocalizationQuality, MatchResult, Verdict};
use serde::{Deserialize, Serialize};

/// A detection as it appears in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// 1-based position in the filtered detection list.
    pub id: usize,
    pub label: String,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
}

/// Localization section of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationReport {
    pub expected_boxes: usize,
    pub iou_threshold: f64,
    pub quality: LocalizationQuality,
    pub recall: f64,
    #[serde(flatten)]
    pub result: MatchResult,
}

impl LocalizationReport {
    pub fn new(expected_boxes: usize, iou_threshold: f64, result: MatchResult) -> Self {
        Self {
            expected_boxes,
            iou_threshold,
            quality: result.quality(),
            recall: result.recall(),
            result,
        }
    }
}

/// Everything known about one evaluated test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub test_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<LabelCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localization: Option<LocalizationReport>,
    /// Per-class sign and stoplight tally, signs cases only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic: Option<TrafficCounts>,
    pub detections: Vec<DetectionRecord>,
    pub max_confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f64>,
    /// Informational only; never fails the case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl TestReport {
    /// Assemble a report from the filtered detections and computed results.
    pub fn new(
        test_id: impl Into<String>,
        verdict: Verdict,
        localization: Option<LocalizationReport>,
        detections: &[DetectedObject],
    ) -> Self {
        let records = detections
            .iter()
            .enumerate()
            .map(|(i, obj)| DetectionRecord {
                id: i + 1,
                label: obj.label.clone(),
                confidence: obj.confidence,
                bounding_box: obj.to_bbox(),
            })
            .collect();

        Self {
            test_id: test_id.into(),
            suite: None,
            description: None,
            verdict,
            localization,
            traffic: None,
            detections: records,
            max_confidence: max_confidence(detections),
            average_confidence: average_confidence(detections),
            warning: low_confidence_warning(detections),
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict.passed
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Running tally over a batch of reports.
///
/// # Example
///
/// ```
/// use detection_verdict::report::SuiteSummary;
///
/// let summary = SuiteSummary::new();
/// assert_eq!(summary.total, 0);
/// assert_eq!(summary.pass_rate(), 0.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteSummary {
    /// Total number of cases recorded
    pub total: usize,

    /// Cases whose verdict passed
    pub passed: usize,

    /// Cases whose verdict failed
    pub failed: usize,

    /// Failed zero-expected cases (detector reported something from nothing)
    pub false_positive_failures: usize,

    /// Cases that carried a localization check
    pub localization_cases: usize,

    /// Sum of average IoU across localization cases
    iou_sum: f64,

    /// Ids of failed cases, in the order they were recorded
    pub failed_ids: Vec<String>,
}

impl SuiteSummary {
    /// Create a new `SuiteSummary` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one report
    pub fn record(&mut self, report: &TestReport) {
        self.total += 1;

        if report.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
            self.failed_ids.push(report.test_id.clone());
            if report.verdict.expected_count == 0 {
                self.false_positive_failures += 1;
            }
        }

        if let Some(localization) = &report.localization {
            self.localization_cases += 1;
            self.iou_sum += localization.result.average_iou;
        }
    }

    /// Mean of the per-case average IoU, `None` without localization cases
    pub fn mean_average_iou(&self) -> Option<f64> {
        if self.localization_cases == 0 {
            None
        } else {
            Some(self.iou_sum / self.localization_cases as f64)
        }
    }

    /// Share of passed cases in percent
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &SuiteSummary) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.false_positive_failures += other.false_positive_failures;
        self.localization_cases += other.localization_cases;
        self.iou_sum += other.iou_sum;
        self.failed_ids.extend(other.failed_ids.iter().cloned());
    }
}

impl<'a> FromIterator<&'a TestReport> for SuiteSummary {
    fn from_iter<I: IntoIterator<Item = &'a TestReport>>(iter: I) -> Self {
        let mut summary = SuiteSummary::new();
        for report in iter {
            summary.record(report);
        }
        summary
    }
}
