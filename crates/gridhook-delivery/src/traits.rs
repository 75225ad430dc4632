use async_trait::async_trait;
use gridhook_types::{EventKind, RowObject};

use crate::error::DeliveryResult;

/// What the receiver answered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// HTTP status code (or the backend's equivalent).
    pub status: u16,
    /// Response body, logged but otherwise ignored.
    pub body: String,
}

impl DeliveryReceipt {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Push interface to the downstream receiver.
///
/// One call per event. Implementations do not retry.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn push(&self, event: EventKind, rows: &[RowObject]) -> DeliveryResult<DeliveryReceipt>;
}

#[async_trait]
impl<T: Delivery + ?Sized> Delivery for std::sync::Arc<T> {
    async fn push(&self, event: EventKind, rows: &[RowObject]) -> DeliveryResult<DeliveryReceipt> {
        (**self).push(event, rows).await
    }
}
