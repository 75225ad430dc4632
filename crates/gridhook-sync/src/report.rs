use gridhook_types::{ChangeKind, ChangeSet, EventKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of a single push attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PushOutcome {
    Delivered {
        event: EventKind,
        rows: usize,
        status: u16,
    },
    Failed {
        event: EventKind,
        rows: usize,
        error: String,
    },
}

impl PushOutcome {
    pub fn event(&self) -> EventKind {
        match self {
            PushOutcome::Delivered { event, .. } | PushOutcome::Failed { event, .. } => *event,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, PushOutcome::Delivered { .. })
    }
}

/// How a change cycle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The grid matched the baseline; nothing was pushed or committed.
    NoChanges,
    /// Changes were pushed (or attempted) and the baseline advanced.
    Committed,
}

/// Summary of one change cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub document: String,
    pub outcome: CycleOutcome,
    pub changes: ChangeSet,
    /// One entry per non-empty category, in push order.
    pub pushes: Vec<PushOutcome>,
}

impl CycleReport {
    pub fn no_changes(cycle_id: Uuid, document: impl Into<String>) -> Self {
        Self {
            cycle_id,
            document: document.into(),
            outcome: CycleOutcome::NoChanges,
            changes: ChangeSet::new(),
            pushes: Vec::new(),
        }
    }

    /// Row count for one category.
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.rows(kind).len()
    }

    /// Pushes that did not reach the receiver.
    pub fn failures(&self) -> impl Iterator<Item = &PushOutcome> {
        self.pushes.iter().filter(|p| !p.is_delivered())
    }
}

/// Result of the bootstrap path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BootstrapOutcome {
    /// The whole grid was pushed as `initialLoad` and committed.
    Loaded { rows: usize, delivered: bool },
    /// The initialized flag was already set; nothing happened.
    AlreadyInitialized,
}

/// Snapshot of persisted state for one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub document: String,
    pub initialized: bool,
    /// Data rows in the committed baseline, if one exists.
    pub baseline_rows: Option<usize>,
    /// Data rows in the last grid read by a change cycle.
    pub current_rows: Option<usize>,
}
