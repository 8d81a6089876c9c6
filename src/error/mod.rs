//! Error handling for the longevity pipeline.
//!
//! Only table-level problems are errors. Field-level parse failures and
//! sanity-bound violations are recoverable and are reported through the
//! normalization and emission audits instead.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for the pipeline
#[derive(Debug, thiserror::Error)]
pub enum LongevityError {
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error building or reading Arrow data (including CSV decoding)
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error writing Parquet output
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error converting between Rust rows and Arrow batches
    #[error("Arrow conversion error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),

    /// Error reading or writing JSON (configuration, audit reports)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A source table could not be loaded at all
    #[error("Failed to load {}: {message}", path.display())]
    Load {
        /// Path of the table that failed to load
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// A table is missing a required column or has an unexpected layout
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input that violates a precondition of a pipeline stage
    #[error("Validation error: {0}")]
    Validation(String),
}

impl LongevityError {
    /// Create a load error for a path
    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, LongevityError>;
