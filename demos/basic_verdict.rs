//! Walk through a count verdict, a localization score and a full case report.

use detection_verdict::{
    evaluate, load_detections_from_str, match_boxes, run_case, BoundingBox, ExpectedBox,
    GroupSizeCategory, SuiteSummary, TestRegistry,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Detection Verdict Example ===\n");

    // Example 1: Count verdicts
    println!("1. Count Verdicts");
    for (expected, detected, category) in [
        (12, 11, GroupSizeCategory::Large),
        (4, 2, GroupSizeCategory::Small),
        (0, 1, GroupSizeCategory::Individual),
    ] {
        let verdict = evaluate(expected, detected, category, 85.0)?;
        println!(
            "   expected {:>2}, detected {:>2} ({}): {} {:?}",
            expected,
            detected,
            category,
            verdict.status(),
            verdict.reasons
        );
    }
    println!();

    // Example 2: Greedy IoU matching
    println!("2. Localization");
    let expected = vec![BoundingBox::new(0.0, 0.0, 0.5, 0.25), BoundingBox::new(0.0, 0.0, 0.5, 0.3)];
    let detected = vec![BoundingBox::new(0.0, 0.0, 0.5, 0.5)];
    let result = match_boxes(&expected, &detected, 0.3)?;
    println!(
        "   matched {}/{} boxes, average IoU {:.3}",
        result.matched_count,
        expected.len(),
        result.average_iou
    );
    for detail in &result.details {
        println!(
            "   expected {} -> {:?} (IoU {:.3})",
            detail.expected_index, detail.detected_index, detail.iou
        );
    }
    println!();

    // Example 3: Registry-driven case
    println!("3. Registered Case");
    let registry = TestRegistry::from_toml_str(
        r#"
        [cases."P-02"]
        expected_count = 2
        suite = "people"
        description = "Night, clear, busy cityscape"
        "#,
    )?;
    let detections = load_detections_from_str(
        r#"{"localized_object_annotations": [
            {"name": "Person", "score": 0.91, "bounding_poly": {"normalized_vertices": [
                {"x": 0.1, "y": 0.2}, {"x": 0.3, "y": 0.2}, {"x": 0.3, "y": 0.8}, {"x": 0.1, "y": 0.8}]}},
            {"name": "Person", "score": 0.84, "bounding_poly": {"normalized_vertices": [
                {"x": 0.5, "y": 0.2}, {"x": 0.7, "y": 0.2}, {"x": 0.7, "y": 0.8}, {"x": 0.5, "y": 0.8}]}},
            {"name": "Car", "score": 0.77, "bounding_poly": {"normalized_vertices": [
                {"x": 0.6, "y": 0.6}, {"x": 0.9, "y": 0.6}, {"x": 0.9, "y": 0.9}, {"x": 0.6, "y": 0.9}]}}
        ]}"#,
    )?;
    let boxes = vec![
        ExpectedBox::new(BoundingBox::new(0.1, 0.2, 0.3, 0.8)).with_kind("person"),
        ExpectedBox::new(BoundingBox::new(0.5, 0.25, 0.7, 0.8)).with_kind("person"),
    ];
    let report = run_case(&registry, "P-02", &detections, None, Some(boxes.as_slice()))?;
    println!("{}", report.to_json()?);
    println!();

    let summary: SuiteSummary = [&report].into_iter().collect();
    println!(
        "   {} of {} passed ({:.1}%)",
        summary.passed,
        summary.total,
        summary.pass_rate()
    );

    Ok(())
}
