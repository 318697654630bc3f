//! # detection-verdict
//!
//! Pass/fail evaluation of object-detector output against hand-authored
//! ground truth.
//!
//! The detector itself lives elsewhere; this library takes its response
//! (labels, confidences, normalized quadrilaterals) and answers two
//! questions for a test case:
//! - **Count verdict**: did the detector find the right number of objects,
//!   within a tolerance band that widens with the size of the group?
//! - **Localization**: how well do the detected boxes cover the expected
//!   boxes, using greedy IoU (Intersection over Union) matching?
//!
//! ## Features
//!
//! - Group-size tolerance bands (individual, small, medium, large, crowd)
//! - Zero-expected cases treated as strict false-positive checks
//! - Greedy, order-stable IoU matching with per-box diagnostics
//! - Declarative label filters for people, vehicles and traffic signs
//! - TOML test registry and JSON loaders for detector responses and
//!   expected localizations
//! - Serializable reports and suite summaries
//!
//! ## Quick Start
//!
//! ```rust
//! use detection_verdict::evaluator::evaluate;
//! use detection_verdict::matching::match_boxes;
//! use detection_verdict::types::{BoundingBox, GroupSizeCategory};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let verdict = evaluate(12, 11, GroupSizeCategory::Large, 85.0)?;
//! assert!(verdict.passed);
//!
//! let expected = vec![BoundingBox::new(0.0, 0.0, 0.5, 0.5)];
//! let detected = vec![BoundingBox::new(0.0, 0.0, 0.5, 0.2)];
//! let result = match_boxes(&expected, &detected, 0.3)?;
//! assert_eq!(result.matched_count, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Detector format
//!
//! Detector responses are read in the localized-object-annotation shape:
//!
//! ```json
//! {
//!   "localized_object_annotations": [
//!     {
//!       "name": "Person",
//!       "score": 0.93,
//!       "bounding_poly": {
//!         "normalized_vertices": [
//!           {"x": 0.1, "y": 0.2}, {"x": 0.3, "y": 0.2},
//!           {"x": 0.3, "y": 0.8}, {"x": 0.1, "y": 0.8}
//!         ]
//!       }
//!     }
//!   ]
//! }
//! ```

pub mod error;
pub mod types;
pub mod loader;
pub mod threshold;
pub mod metrics;
pub mod matching;
pub mod evaluator;
pub mod labels;
pub mod registry;
pub mod report;
pub mod scenario;

// Re-export commonly used types and functions
pub use error::{Result, VerdictError};
pub use types::{
    BoundingBox, DetectedObject, ExpectedBox, GroupSizeCategory, LocalizationQuality,
    MatchDetail, MatchResult, NormalizedQuad, Verdict, Vertex,
};
pub use evaluator::{evaluate, evaluate_with_defaults, DEFAULT_DETECTION_RATE_THRESHOLD};
pub use matching::{match_boxes, match_detections, DEFAULT_IOU_THRESHOLD};
pub use labels::{filter_objects, LabelCategory};
pub use loader::{load_detections_from_file, load_detections_from_str};
pub use registry::{TestCaseConfig, TestRegistry};
pub use report::{SuiteSummary, TestReport};
pub use scenario::run_case;
