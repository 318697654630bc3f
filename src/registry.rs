//! Ground-truth registry: expected counts and per-case thresholds.
//!
//! The registry is plain configuration handed to the scenario runner. It is
//! usually read from TOML:
//!
//! ```toml
//! [defaults]
//! detection_rate_threshold = 85.0
//! iou_threshold = 0.3
//!
//! [cases."PT-10"]
//! expected_count = 12
//! suite = "people"
//! description = "Daylight, clear, busy cityscape, 12 people"
//!
//! [cases."PT-25"]
//! expected_count = 21
//! suite = "people"
//! detection_rate_threshold = 60.0
//!
//! [cases."S-13"]
//! expected_count = 4
//! suite = "signs"
//!
//! [cases."S-13".traffic]
//! total_signs = 4
//! stop_sign = 1
//! street_sign = 2
//! speed_limit_sign = 1
//! ```

use crate::error::{Result, VerdictError};
use crate::evaluator::{validate_detection_rate_threshold, DEFAULT_DETECTION_RATE_THRESHOLD};
use crate::labels::{LabelCategory, TrafficCounts};
use crate::matching::{validate_iou_threshold, DEFAULT_IOU_THRESHOLD};
use crate::types::GroupSizeCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
struct RegistryFile {
    defaults: Option<DefaultsFile>,
    #[serde(default)]
    cases: BTreeMap<String, CaseFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DefaultsFile {
    detection_rate_threshold: Option<f64>,
    iou_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CaseFile {
    expected_count: i64,
    group_size_category: Option<String>,
    detection_rate_threshold: Option<f64>,
    iou_threshold: Option<f64>,
    suite: Option<String>,
    description: Option<String>,
    traffic: Option<TrafficCounts>,
}

/// Registry-wide thresholds applied when a case does not set its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegistryDefaults {
    pub detection_rate_threshold: f64,
    pub iou_threshold: f64,
}

impl Default for RegistryDefaults {
    fn default() -> Self {
        Self {
            detection_rate_threshold: DEFAULT_DETECTION_RATE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

/// Ground truth and overrides for one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseConfig {
    pub expected_count: u64,
    pub group_size_category: Option<GroupSizeCategory>,
    pub detection_rate_threshold: Option<f64>,
    pub iou_threshold: Option<f64>,
    pub suite: Option<LabelCategory>,
    pub description: Option<String>,
    /// Expected per-class breakdown for signs cases.
    pub expected_traffic: Option<TrafficCounts>,
}

impl TestCaseConfig {
    pub fn new(expected_count: u64) -> Self {
        Self {
            expected_count,
            group_size_category: None,
            detection_rate_threshold: None,
            iou_threshold: None,
            suite: None,
            description: None,
            expected_traffic: None,
        }
    }

    pub fn with_category(mut self, category: GroupSizeCategory) -> Self {
        self.group_size_category = Some(category);
        self
    }

    pub fn with_detection_rate_threshold(mut self, threshold: f64) -> Self {
        self.detection_rate_threshold = Some(threshold);
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f64) -> Self {
        self.iou_threshold = Some(threshold);
        self
    }

    pub fn with_suite(mut self, suite: LabelCategory) -> Self {
        self.suite = Some(suite);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_expected_traffic(mut self, counts: TrafficCounts) -> Self {
        self.expected_traffic = Some(counts);
        self
    }

    fn validate(&self, test_id: &str) -> Result<()> {
        if let Some(threshold) = self.detection_rate_threshold {
            validate_detection_rate_threshold(threshold)
                .map_err(|e| VerdictError::InvalidThreshold(format!("{}: {}", test_id, e)))?;
        }
        if let Some(threshold) = self.iou_threshold {
            validate_iou_threshold(threshold)
                .map_err(|e| VerdictError::InvalidThreshold(format!("{}: {}", test_id, e)))?;
        }
        Ok(())
    }
}

/// A test case with every threshold settled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCase {
    pub test_id: String,
    pub expected_count: u64,
    pub group_size_category: GroupSizeCategory,
    pub detection_rate_threshold: f64,
    pub iou_threshold: f64,
    pub suite: Option<LabelCategory>,
    pub description: Option<String>,
    pub expected_traffic: Option<TrafficCounts>,
}

/// Mapping from test id to ground truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestRegistry {
    defaults: RegistryDefaults,
    cases: BTreeMap<String, TestCaseConfig>,
}

impl TestRegistry {
    pub fn new(defaults: RegistryDefaults) -> Self {
        Self {
            defaults,
            cases: BTreeMap::new(),
        }
    }

    /// Parse a registry from TOML.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed TOML, negative expected counts,
    /// unknown group-size or suite names, and out-of-range thresholds.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(toml_str)?;
        Self::from_file_config(file)
    }

    /// Read and parse a TOML registry file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let registry = Self::from_toml_str(&raw)?;
        log::info!(
            "loaded {} test cases from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    fn from_file_config(file: RegistryFile) -> Result<Self> {
        let defaults_file = file.defaults.unwrap_or_default();
        let defaults = RegistryDefaults {
            detection_rate_threshold: defaults_file
                .detection_rate_threshold
                .unwrap_or(DEFAULT_DETECTION_RATE_THRESHOLD),
            iou_threshold: defaults_file.iou_threshold.unwrap_or(DEFAULT_IOU_THRESHOLD),
        };
        validate_detection_rate_threshold(defaults.detection_rate_threshold)?;
        validate_iou_threshold(defaults.iou_threshold)?;

        let mut registry = Self::new(defaults);
        for (test_id, case) in file.cases {
            let expected_count = u64::try_from(case.expected_count).map_err(|_| {
                VerdictError::InvalidInput(format!(
                    "{}: expected_count must be non-negative, got {}",
                    test_id, case.expected_count
                ))
            })?;
            let group_size_category = case
                .group_size_category
                .as_deref()
                .map(str::parse::<GroupSizeCategory>)
                .transpose()?;
            let suite = case
                .suite
                .as_deref()
                .map(str::parse::<LabelCategory>)
                .transpose()?;

            let config = TestCaseConfig {
                expected_count,
                group_size_category,
                detection_rate_threshold: case.detection_rate_threshold,
                iou_threshold: case.iou_threshold,
                suite,
                description: case.description,
                expected_traffic: case.traffic,
            };
            registry.insert(test_id, config)?;
        }
        Ok(registry)
    }

    /// Add or replace a case.
    pub fn insert(&mut self, test_id: impl Into<String>, config: TestCaseConfig) -> Result<()> {
        let test_id = test_id.into();
        config.validate(&test_id)?;
        self.cases.insert(test_id, config);
        Ok(())
    }

    pub fn defaults(&self) -> &RegistryDefaults {
        &self.defaults
    }

    pub fn get(&self, test_id: &str) -> Option<&TestCaseConfig> {
        self.cases.get(test_id)
    }

    /// Test ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }

    /// Ids of the cases belonging to one suite.
    pub fn ids_in_suite(&self, suite: LabelCategory) -> impl Iterator<Item = &str> {
        self.cases
            .iter()
            .filter(move |(_, case)| case.suite == Some(suite))
            .map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Settle every threshold for a case: case value, then registry default.
    /// The category falls back to the one implied by the expected count.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTestCase` when the id is not registered.
    pub fn resolve(&self, test_id: &str) -> Result<ResolvedCase> {
        let case = self
            .cases
            .get(test_id)
            .ok_or_else(|| VerdictError::UnknownTestCase(test_id.to_string()))?;

        Ok(ResolvedCase {
            test_id: test_id.to_string(),
            expected_count: case.expected_count,
            group_size_category: case
                .group_size_category
                .unwrap_or_else(|| GroupSizeCategory::from_count(case.expected_count)),
            detection_rate_threshold: case
                .detection_rate_threshold
                .unwrap_or(self.defaults.detection_rate_threshold),
            iou_threshold: case.iou_threshold.unwrap_or(self.defaults.iou_threshold),
            suite: case.suite,
            description: case.description.clone(),
            expected_traffic: case.expected_traffic.clone(),
        })
    }
}
