use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the reconciler is within a cycle.
///
/// `Idle -> AcquiringLock -> Reconciling -> Pushing -> CommittingBaseline -> Idle`,
/// with `Failed` entered when a cycle ends in an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    #[default]
    Idle,
    AcquiringLock,
    Reconciling,
    Pushing,
    CommittingBaseline,
    Failed,
}

impl CycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleState::Idle => "idle",
            CycleState::AcquiringLock => "acquiring_lock",
            CycleState::Reconciling => "reconciling",
            CycleState::Pushing => "pushing",
            CycleState::CommittingBaseline => "committing_baseline",
            CycleState::Failed => "failed",
        }
    }

    /// Returns `true` while a cycle is in progress.
    pub fn is_busy(&self) -> bool {
        !matches!(self, CycleState::Idle | CycleState::Failed)
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
