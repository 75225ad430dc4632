use thiserror::Error;

/// Errors from pushing an event to the downstream receiver.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The receiver answered with a non-success status.
    #[error("receiver returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    /// The HTTP client could not be constructed from the configuration.
    #[error("invalid delivery configuration: {0}")]
    InvalidConfig(String),
}

pub type DeliveryResult<T> = Result<T, DeliveryError>;
