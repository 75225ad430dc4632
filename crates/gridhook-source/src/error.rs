use std::path::PathBuf;

/// Errors from reading the tabular data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source content is not a grid or workbook.
    #[error("malformed source {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// The workbook contains no sheet to read.
    #[error("workbook has no sheets")]
    NoSheet,

    /// The source is unreachable for another reason.
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for source operations.
pub type SourceResult<T> = Result<T, SourceError>;
