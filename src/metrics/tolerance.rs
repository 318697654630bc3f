//! Count tolerance bands per group-size category.

use crate::types::GroupSizeCategory;
use serde::{Deserialize, Serialize};

/// Fraction of the expected count allowed as error for large groups and crowds.
pub const PERCENT_TOLERANCE: f64 = 0.20;

/// How far a detected count may stray from the expected count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ToleranceSpec {
    /// A fixed number of objects either way.
    Absolute(u64),
    /// A fraction of the expected count, truncated toward zero.
    Percent(f64),
}

impl ToleranceSpec {
    /// Tolerance band for a category.
    ///
    /// individual/small allow ±1, medium ±2, large and crowd ±20%.
    pub fn for_category(category: GroupSizeCategory) -> Self {
        match category {
            GroupSizeCategory::Individual | GroupSizeCategory::Small => ToleranceSpec::Absolute(1),
            GroupSizeCategory::Medium => ToleranceSpec::Absolute(2),
            GroupSizeCategory::Large | GroupSizeCategory::Crowd => {
                ToleranceSpec::Percent(PERCENT_TOLERANCE)
            }
        }
    }

    /// Resolve to a whole number of objects for the given expected count.
    ///
    /// ```
    /// use detection_verdict::metrics::tolerance::ToleranceSpec;
    /// use detection_verdict::types::GroupSizeCategory;
    ///
    /// let spec = ToleranceSpec::for_category(GroupSizeCategory::Large);
    /// assert_eq!(spec.tolerance(12), 2);
    /// assert_eq!(spec.tolerance(14), 2);
    /// ```
    pub fn tolerance(&self, expected_count: u64) -> u64 {
        match *self {
            ToleranceSpec::Absolute(n) => n,
            // Exact integer floor for the standard 20% band.
            ToleranceSpec::Percent(fraction) if fraction == PERCENT_TOLERANCE => expected_count / 5,
            ToleranceSpec::Percent(fraction) => (expected_count as f64 * fraction).floor().max(0.0) as u64,
        }
    }
}
