//! Crate-wide error type; every failure is surfaced synchronously, no retries.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VizError>;

#[derive(Debug, Error)]
pub enum VizError {
    /// A configured path exists but is not a directory, or cannot be created.
    #[error("configuration error: {0}")]
    Config(String),

    /// Requested template id has no file in the configured directory.
    #[error("failed to find template '{template}' in directory {}", directory.display())]
    TemplateNotFound {
        template: String,
        directory: PathBuf,
    },

    /// Failure while reading a template or writing an output file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization of a series payload failed.
    #[error("failed to serialize chart data: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A column length does not match the table's row index length.
    #[error("column '{column}' has {values} values but the index has {rows} rows")]
    ShapeMismatch {
        column: String,
        values: usize,
        rows: usize,
    },
}

impl VizError {
    /// Attaches the offending path to a raw I/O error.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
