//! Geometric and count metrics used by the evaluator and matcher.

pub mod iou;
pub mod tolerance;

pub use iou::{calculate_iou, calculate_iou_matrix};
pub use tolerance::ToleranceSpec;
