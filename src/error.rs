//! Fatal pipeline errors.
//!
//! Data-quality anomalies are not errors: they are removed and counted in
//! [`crate::clean::CleaningReport`]. Everything here aborts the run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to retrieve source {location}: {reason}")]
    Retrieval { location: String, reason: String },

    #[error("Source {source_name} is missing expected column '{column}'")]
    MissingColumn { source_name: String, column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
