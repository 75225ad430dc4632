//! Reconciliation engine for gridhook.
//!
//! A [`Reconciler`] owns one document's grid source, baseline store and
//! delivery backend. It exposes the two entry points of the system:
//!
//! - [`Reconciler::on_open`] -- bootstrap: push the whole grid as
//!   `initialLoad` and commit it as the baseline
//! - [`Reconciler::on_change`] -- one change cycle: diff against the
//!   baseline, push each non-empty category, commit the new baseline
//!
//! Cycles for the same document are serialized by a [`DocumentLock`] with a
//! bounded wait, across processes when the lock is backed by a lock file. Delivery failures never abort a cycle; they are recorded in
//! the [`CycleReport`].

pub mod config;
pub mod error;
pub mod lock;
pub mod reconciler;
pub mod report;
pub mod state;

pub use config::ReconcilerConfig;
pub use error::{SyncError, SyncResult};
pub use lock::{DocumentGuard, DocumentLock};
pub use reconciler::Reconciler;
pub use report::{BootstrapOutcome, CycleOutcome, CycleReport, PushOutcome, StatusReport};
pub use state::CycleState;
