use std::collections::HashSet;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use gridhook_types::{EventKind, RowObject};

use crate::error::{DeliveryError, DeliveryResult};
use crate::traits::{Delivery, DeliveryReceipt};

/// One push seen by [`InMemoryDelivery`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedPush {
    pub event: EventKind,
    pub rows: Vec<RowObject>,
}

/// In-process delivery that records every push.
///
/// Events listed with [`fail_on`](Self::fail_on) are recorded and then
/// rejected with a 500 status. An optional delay is awaited before each
/// push completes.
#[derive(Debug, Default)]
pub struct InMemoryDelivery {
    pushes: RwLock<Vec<RecordedPush>>,
    failing: RwLock<HashSet<EventKind>>,
    delay: RwLock<Duration>,
}

impl InMemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject future pushes of `event`.
    pub fn fail_on(&self, event: EventKind) {
        self.failing.write().expect("lock poisoned").insert(event);
    }

    /// Accept every event again.
    pub fn clear_failures(&self) {
        self.failing.write().expect("lock poisoned").clear();
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write().expect("lock poisoned") = delay;
    }

    /// All pushes so far, in call order.
    pub fn pushes(&self) -> Vec<RecordedPush> {
        self.pushes.read().expect("lock poisoned").clone()
    }

    /// Event kinds pushed so far, in call order.
    pub fn events(&self) -> Vec<EventKind> {
        self.pushes
            .read()
            .expect("lock poisoned")
            .iter()
            .map(|p| p.event)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pushes.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Delivery for InMemoryDelivery {
    async fn push(&self, event: EventKind, rows: &[RowObject]) -> DeliveryResult<DeliveryReceipt> {
        let delay = *self.delay.read().expect("lock poisoned");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.pushes.write().expect("lock poisoned").push(RecordedPush {
            event,
            rows: rows.to_vec(),
        });
        if self.failing.read().expect("lock poisoned").contains(&event) {
            return Err(DeliveryError::Status {
                status: 500,
                body: format!("{event} rejected"),
            });
        }
        Ok(DeliveryReceipt::ok("ok"))
    }
}
