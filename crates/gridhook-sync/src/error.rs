use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that end a reconciliation cycle early.
///
/// Delivery failures are not represented here; they are recorded per push
/// in the cycle report.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The grid could not be read. Nothing was changed.
    #[error("grid source unavailable: {0}")]
    SourceUnavailable(#[from] gridhook_source::SourceError),

    /// Another cycle held the document lock for longer than the bounded wait.
    #[error("could not acquire lock for document {document} within {waited:?}")]
    LockTimeout { document: String, waited: Duration },

    /// The cross-process lock file could not be opened or locked.
    #[error("lock file {path}: {source}")]
    LockFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Baseline encode or persistence failure.
    #[error("baseline store error: {0}")]
    Store(#[from] gridhook_store::StoreError),
}

pub type SyncResult<T> = Result<T, SyncError>;
