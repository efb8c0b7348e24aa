use std::path::PathBuf;
use thiserror::Error;

use crate::count::CountReport;

/// The main error type for labelprep operations.
#[derive(Debug, Error)]
pub enum LabelprepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to list directory {path}: {source}")]
    DirList {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report as JSON: {0}")]
    ReportJson(#[from] serde_json::Error),

    #[error(
        "No valid image-label pairs found in {images_dir} with labels in {labels_dir}. Check the images and labels directories."
    )]
    NoValidPairs {
        images_dir: PathBuf,
        labels_dir: PathBuf,
    },

    #[error("Invalid split parameters: {message}")]
    InvalidSplitParams { message: String },

    #[error("Invalid clean-labels parameters: {message}")]
    InvalidRenameParams { message: String },

    #[error("{below} species have fewer than {min} image(s)")]
    CountBelowMinimum {
        min: usize,
        below: usize,
        report: CountReport,
    },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}
