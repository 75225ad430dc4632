use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default webhook receiver.
pub const DEFAULT_ENDPOINT: &str = "https://anysite.com/google-sheet-webhook";

/// Default static credential sent in every envelope.
pub const DEFAULT_TOKEN: &str = "token";

/// Configuration for [`HttpDelivery`](crate::HttpDelivery).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// URL every event is POSTed to.
    pub endpoint: String,
    /// Credential placed in the envelope's `token` field.
    pub token: String,
    /// Per-request timeout covering connect, send and response.
    pub timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: DEFAULT_TOKEN.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl DeliveryConfig {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
