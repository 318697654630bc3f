use anyhow::{Context, Result};
use clap::Parser;
use detection_verdict::labels::LabelCategory;
use detection_verdict::loader::{load_detections_from_file, load_localizations_from_file};
use detection_verdict::registry::TestRegistry;
use detection_verdict::scenario::run_case;
use detection_verdict::threshold::filter_by_confidence;
use std::path::PathBuf;
use std::process::ExitCode;

/// Evaluate one detector response against a registered test case and print
/// the JSON report. Exits with status 1 when the case fails.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML registry of expected counts and thresholds
    #[arg(long, env = "DETECTION_VERDICT_REGISTRY")]
    registry: PathBuf,

    /// Test case id as listed in the registry
    #[arg(long)]
    test_id: String,

    /// Detector response JSON for the case's image
    #[arg(long)]
    detections: PathBuf,

    /// Label category to count (people, vehicles, signs); defaults to the
    /// case's registered suite
    #[arg(long)]
    category: Option<LabelCategory>,

    /// expected_localizations.json for IoU scoring
    #[arg(long)]
    localizations: Option<PathBuf>,

    /// Drop detections below this confidence before evaluating
    #[arg(long)]
    min_confidence: Option<f64>,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let registry = TestRegistry::from_path(&args.registry)
        .with_context(|| format!("reading registry {}", args.registry.display()))?;

    let mut detections = load_detections_from_file(&args.detections)
        .with_context(|| format!("reading detections {}", args.detections.display()))?;
    if let Some(min_confidence) = args.min_confidence {
        let before = detections.len();
        detections = filter_by_confidence(&detections, min_confidence)?;
        log::debug!(
            "confidence filter {:.2}: kept {} of {} detections",
            min_confidence,
            detections.len(),
            before
        );
    }

    let localizations = args
        .localizations
        .as_ref()
        .map(|path| {
            load_localizations_from_file(path)
                .with_context(|| format!("reading localizations {}", path.display()))
        })
        .transpose()?;
    let expected_boxes = localizations
        .as_ref()
        .and_then(|loc| loc.boxes_for(&args.test_id));
    if localizations.is_some() && expected_boxes.is_none() {
        log::warn!(
            "{}: no expected localizations found, skipping IoU verification",
            args.test_id
        );
    }

    let report = run_case(
        &registry,
        &args.test_id,
        &detections,
        args.category,
        expected_boxes,
    )?;

    println!("{}", report.to_json()?);

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
