//! Error handling for the NHANES pipeline.
//!
//! Every failure is fatal for a run: the pipeline has no retry path, so the
//! variants below only need to carry enough context to explain what stopped it.

pub mod util;

use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use thiserror::Error;

/// Specialized error type for the pipeline
#[derive(Debug, Error)]
pub enum NhanesError {
    /// An input source could not be read or parsed as tabular data
    #[error("Source error in {}: {message}", path.display())]
    Source { path: PathBuf, message: String },

    /// An expected column is absent
    #[error("Schema error: column '{column}' not found in {context}")]
    Schema { column: String, context: String },

    /// A regression could not be fitted
    #[error("Fit error in model '{model}': {message}")]
    Fit { model: String, message: String },

    /// Configuration names a variable that does not exist or is of the wrong kind
    #[error("Config error: {0}")]
    Config(String),

    /// Error creating output directories or writing reports
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error raised by an Arrow compute kernel
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// A chart could not be drawn
    #[error("Render error in chart '{chart}': {message}")]
    Render { chart: String, message: String },

    /// Rows could not be converted between Arrow and Rust records
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// The JSON report could not be serialized
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NhanesError {
    /// Create a source error for the given path
    pub fn source_error(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Source {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a missing-column error
    pub fn schema_error(column: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
            context: context.into(),
        }
    }

    /// Create a fit error for the named model
    pub fn fit_error(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fit {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a render error for the named chart
    pub fn render_error(chart: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Render {
            chart: chart.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_arrow::Error> for NhanesError {
    fn from(err: serde_arrow::Error) -> Self {
        Self::Conversion(err.to_string())
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, NhanesError>;
