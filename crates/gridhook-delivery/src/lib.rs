//! Delivery boundary for gridhook.
//!
//! Change events leave the process through the [`Delivery`] trait. Each call
//! carries one event kind and the rows flattened into column-name objects;
//! the wire body is an [`EventEnvelope`].
//!
//! # Backends
//!
//! - [`HttpDelivery`] -- JSON POST to a webhook endpoint via `reqwest`
//! - [`InMemoryDelivery`] -- Records pushes, with scripted failures and delay
//!
//! Delivery is at-most-once: callers log failures and move on.

pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use config::DeliveryConfig;
pub use envelope::EventEnvelope;
pub use error::{DeliveryError, DeliveryResult};
pub use http::HttpDelivery;
pub use memory::{InMemoryDelivery, RecordedPush};
pub use traits::{Delivery, DeliveryReceipt};
