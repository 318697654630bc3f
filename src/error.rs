//! Error types for the detection-verdict library.

use thiserror::Error;

/// Result type for detection-verdict operations.
pub type Result<T> = std::result::Result<T, VerdictError>;

/// Error types that can occur while evaluating detector output.
///
/// Domain failures (wrong count, poor overlap) are never errors; they come
/// back as a failed [`Verdict`](crate::types::Verdict). Only malformed input
/// lands here.
#[derive(Error, Debug)]
pub enum VerdictError {
    /// Negative counts, malformed quads, NaN or infinite box coordinates,
    /// unknown group-size categories.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bounding box whose finite corners are inverted (max before min).
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Detection-rate or IoU threshold outside its valid range.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Test id not present in the registry.
    #[error("Unknown test case: {0}")]
    UnknownTestCase(String),

    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error while parsing a TOML registry.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
