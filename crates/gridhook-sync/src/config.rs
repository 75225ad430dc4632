use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`Reconciler`](crate::Reconciler).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Document identifier; scopes the lock and appears in every log line.
    pub document: String,
    /// Maximum wait for the document lock before a cycle gives up.
    pub lock_timeout: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            document: "default".to_string(),
            lock_timeout: Duration::from_secs(30),
        }
    }
}

impl ReconcilerConfig {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            ..Default::default()
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}
