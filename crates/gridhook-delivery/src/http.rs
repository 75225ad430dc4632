//! Webhook delivery over HTTP.

use async_trait::async_trait;
use gridhook_types::{EventKind, RowObject};
use tracing::{debug, info, warn};

use crate::config::DeliveryConfig;
use crate::envelope::EventEnvelope;
use crate::error::{DeliveryError, DeliveryResult};
use crate::traits::{Delivery, DeliveryReceipt};

/// POSTs each event as an [`EventEnvelope`] JSON body to a fixed endpoint.
#[derive(Clone, Debug)]
pub struct HttpDelivery {
    client: reqwest::Client,
    config: DeliveryConfig,
}

impl HttpDelivery {
    pub fn new(config: DeliveryConfig) -> DeliveryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DeliveryError::InvalidConfig(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }
}

#[async_trait]
impl Delivery for HttpDelivery {
    async fn push(&self, event: EventKind, rows: &[RowObject]) -> DeliveryResult<DeliveryReceipt> {
        let envelope = EventEnvelope::new(event, rows.to_vec(), self.config.token.clone());
        info!(event = %event, rows = rows.len(), endpoint = %self.config.endpoint, "posting data for event");

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        info!(event = %event, status = status.as_u16(), "response code");
        debug!(event = %event, body = %body, "response body");

        if !status.is_success() {
            warn!(event = %event, status = status.as_u16(), "receiver rejected event");
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(DeliveryReceipt {
            status: status.as_u16(),
            body,
        })
    }
}
