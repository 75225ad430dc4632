use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),

    #[error("unknown change kind: {0}")]
    UnknownChangeKind(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
