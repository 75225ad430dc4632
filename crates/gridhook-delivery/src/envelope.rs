use gridhook_types::{EventKind, RowObject};
use serde::{Deserialize, Serialize};

use crate::error::{DeliveryError, DeliveryResult};

/// JSON body of one outbound event.
///
/// ```json
/// { "event": "add", "stones": [{ "id": 3, "val": "d" }], "token": "token" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: EventKind,
    /// Affected rows keyed by column name.
    pub stones: Vec<RowObject>,
    pub token: String,
}

impl EventEnvelope {
    pub fn new(event: EventKind, stones: Vec<RowObject>, token: impl Into<String>) -> Self {
        Self {
            event,
            stones,
            token: token.into(),
        }
    }

    pub fn to_json(&self) -> DeliveryResult<String> {
        serde_json::to_string(self).map_err(|e| DeliveryError::Serialization(e.to_string()))
    }
}
