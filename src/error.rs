//! Error types for metraj.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading project, catalog or plan files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the file from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid project/catalog JSON.
    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to decode the floor-plan raster.
    #[error("failed to decode image '{path}': {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}

/// Reasons a scale calibration is rejected. The caller must re-prompt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// Calibration needs exactly two reference points.
    #[error("expected 2 reference points, got {count}")]
    PointCount { count: usize },

    /// The declared real-world length must be a positive number of meters.
    #[error("real length must be positive, got {meters}")]
    NonPositiveLength { meters: f64 },

    /// Both reference points coincide.
    #[error("reference points are identical")]
    ZeroDistance,
}

/// Errors raised when an edit session cannot be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The unit being edited no longer exists in its pool.
    #[error("unit #{id} no longer exists")]
    UnitGone { id: u64 },

    /// A drawn shape needs at least three vertices.
    #[error("polygon needs at least 3 points, got {count}")]
    DegeneratePolygon { count: usize },

    /// The referenced element does not exist in the staged unit.
    #[error("element #{id} not found")]
    ElementNotFound { id: u64 },
}

/// Errors that can occur when reading an external price feed snapshot.
#[derive(Debug, Error)]
pub enum PriceFeedError {
    /// Failed to read the snapshot file.
    #[error("failed to read price feed '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON.
    #[error("invalid price feed JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// The feed reported a non-success status.
    #[error("price feed returned status '{status}'")]
    Rejected { status: String },
}
