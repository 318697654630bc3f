//! Intersection over Union (IoU) calculation.

use crate::types::BoundingBox;

/// Calculate the Intersection over Union (IoU) between two bounding boxes.
///
/// IoU is defined as the area of intersection divided by the area of union.
/// Boxes that do not overlap, and pairs whose union is zero (two degenerate
/// boxes), both score 0.0.
///
/// # Arguments
///
/// * `bbox1` - First bounding box
/// * `bbox2` - Second bounding box
///
/// # Returns
///
/// Returns a value between 0.0 (no overlap) and 1.0 (perfect overlap).
///
/// # Example
///
/// ```
/// use detection_verdict::metrics::iou::calculate_iou;
/// use detection_verdict::types::BoundingBox;
///
/// let bbox1 = BoundingBox::new(0.0, 0.0, 0.4, 0.4);
/// let bbox2 = BoundingBox::new(0.2, 0.2, 0.6, 0.6);
/// let iou = calculate_iou(&bbox1, &bbox2);
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(bbox1: &BoundingBox, bbox2: &BoundingBox) -> f64 {
    let x_left = bbox1.x_min.max(bbox2.x_min);
    let y_top = bbox1.y_min.max(bbox2.y_min);
    let x_right = bbox1.x_max.min(bbox2.x_max);
    let y_bottom = bbox1.y_max.min(bbox2.y_max);

    if x_right < x_left || y_bottom < y_top {
        return 0.0;
    }

    let intersection_area = (x_right - x_left) * (y_bottom - y_top);
    let union_area = bbox1.area() + bbox2.area() - intersection_area;

    if union_area <= 0.0 {
        return 0.0;
    }

    intersection_area / union_area
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a 2D vector where `result[i][j]` is the IoU between `bboxes1[i]`
/// and `bboxes2[j]`.
///
/// ```
/// use detection_verdict::metrics::iou::calculate_iou_matrix;
/// use detection_verdict::types::BoundingBox;
///
/// let bboxes1 = vec![BoundingBox::new(0.0, 0.0, 0.5, 0.5)];
/// let bboxes2 = vec![BoundingBox::new(0.25, 0.25, 0.75, 0.75)];
/// let iou_matrix = calculate_iou_matrix(&bboxes1, &bboxes2);
/// assert_eq!(iou_matrix.len(), 1);
/// assert_eq!(iou_matrix[0].len(), 1);
/// ```
pub fn calculate_iou_matrix(bboxes1: &[BoundingBox], bboxes2: &[BoundingBox]) -> Vec<Vec<f64>> {
    bboxes1
        .iter()
        .map(|bbox1| {
            bboxes2
                .iter()
                .map(|bbox2| calculate_iou(bbox1, bbox2))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_boxes() {
        let bbox1 = BoundingBox::new(0.1, 0.1, 0.6, 0.6);
        let bbox2 = BoundingBox::new(0.1, 0.1, 0.6, 0.6);
        let iou = calculate_iou(&bbox1, &bbox2);
        assert!((iou - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_overlap() {
        let bbox1 = BoundingBox::new(0.0, 0.0, 0.2, 0.2);
        let bbox2 = BoundingBox::new(0.5, 0.5, 0.7, 0.7);
        assert_eq!(calculate_iou(&bbox1, &bbox2), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let bbox1 = BoundingBox::new(0.0, 0.0, 0.2, 0.2);
        let bbox2 = BoundingBox::new(0.1, 0.1, 0.3, 0.3);
        let iou = calculate_iou(&bbox1, &bbox2);

        // Intersection: 0.1 x 0.1 = 0.01
        // Union: 0.04 + 0.04 - 0.01 = 0.07
        assert!((iou - 0.01 / 0.07).abs() < 1e-9);
    }

    #[test]
    fn test_touching_edges() {
        let bbox1 = BoundingBox::new(0.0, 0.0, 0.5, 0.5);
        let bbox2 = BoundingBox::new(0.5, 0.0, 1.0, 0.5);
        assert_eq!(calculate_iou(&bbox1, &bbox2), 0.0);
    }

    #[test]
    fn test_degenerate_boxes() {
        let point = BoundingBox::new(0.3, 0.3, 0.3, 0.3);
        assert_eq!(calculate_iou(&point, &point), 0.0);

        let line = BoundingBox::new(0.1, 0.2, 0.5, 0.2);
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(calculate_iou(&line, &bbox), 0.0);
    }

    #[test]
    fn test_contained_box() {
        let outer = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let inner = BoundingBox::new(0.25, 0.25, 0.75, 0.75);
        assert!((calculate_iou(&outer, &inner) - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_iou_matrix() {
        let bboxes1 = vec![
            BoundingBox::new(0.0, 0.0, 0.2, 0.2),
            BoundingBox::new(0.1, 0.1, 0.3, 0.3),
        ];
        let bboxes2 = vec![BoundingBox::new(0.0, 0.0, 0.2, 0.2)];

        let matrix = calculate_iou_matrix(&bboxes1, &bboxes2);
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0].len(), 1);
        assert!((matrix[0][0] - 1.0).abs() < 1e-10);
    }
}
