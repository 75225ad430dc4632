//! Baseline snapshot storage for gridhook.
//!
//! The host environment offers a document-scoped key-value store with
//! string keys and string values. This crate models that store as the
//! [`KeyValueStore`] trait and layers [`BaselineStore`] on top of it, which
//! owns the only encode/decode boundary for the persisted baseline grid.
//!
//! # Storage Backends
//!
//! - [`InMemoryKeyValueStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileKeyValueStore`] -- JSON object file, rewritten atomically on each write
//!
//! # Persisted Keys
//!
//! | Key             | Value                                         |
//! |-----------------|-----------------------------------------------|
//! | `isInitialized` | `"true"` or absent                            |
//! | `initial-state` | baseline grid, JSON array of arrays           |
//! | `current-state` | last grid read by a change cycle (diagnostic) |

pub mod baseline;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use baseline::{BaselineStore, keys};
pub use error::{StoreError, StoreResult};
pub use file::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;
pub use traits::KeyValueStore;
