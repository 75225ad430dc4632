use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::grid::Row;

/// A category of row-level change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    /// Row identity present only in the current grid.
    Add,
    /// Row identity present only in the baseline.
    Delete,
    /// Row identity present in both, with different content.
    Update,
}

impl ChangeKind {
    /// All kinds in push order.
    pub const ALL: [ChangeKind; 3] = [ChangeKind::Add, ChangeKind::Delete, ChangeKind::Update];

    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Update => "update",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "delete" => Ok(Self::Delete),
            "update" => Ok(Self::Update),
            other => Err(TypeError::UnknownChangeKind(other.to_string())),
        }
    }
}

/// The `event` tag on an outbound payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// The whole dataset, sent once per bootstrap.
    InitialLoad,
    Add,
    Delete,
    Update,
}

impl EventKind {
    /// Wire name of this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialLoad => "initialLoad",
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Update => "update",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initialLoad" => Ok(Self::InitialLoad),
            "add" => Ok(Self::Add),
            "delete" => Ok(Self::Delete),
            "update" => Ok(Self::Update),
            other => Err(TypeError::UnknownEventKind(other.to_string())),
        }
    }
}

impl From<ChangeKind> for EventKind {
    fn from(kind: ChangeKind) -> Self {
        match kind {
            ChangeKind::Add => Self::Add,
            ChangeKind::Delete => Self::Delete,
            ChangeKind::Update => Self::Update,
        }
    }
}

/// The partition of rows produced by one diff.
///
/// Transient: produced by the differ and consumed by the reconciler within
/// the same cycle; never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub add: Vec<Row>,
    pub delete: Vec<Row>,
    pub update: Vec<Row>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if all three categories are empty.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.delete.is_empty() && self.update.is_empty()
    }

    /// Total number of rows across all categories.
    pub fn len(&self) -> usize {
        self.add.len() + self.delete.len() + self.update.len()
    }

    /// Rows of one category.
    pub fn rows(&self, kind: ChangeKind) -> &[Row] {
        match kind {
            ChangeKind::Add => &self.add,
            ChangeKind::Delete => &self.delete,
            ChangeKind::Update => &self.update,
        }
    }

    /// Non-empty categories in push order (add, delete, update).
    pub fn non_empty(&self) -> impl Iterator<Item = (ChangeKind, &[Row])> + '_ {
        ChangeKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.rows(kind)))
            .filter(|(_, rows)| !rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_change_set() {
        let cs = ChangeSet::new();
        assert!(cs.is_empty());
        assert_eq!(cs.len(), 0);
        assert_eq!(cs.non_empty().count(), 0);
    }

    #[test]
    fn non_empty_skips_empty_categories_in_fixed_order() {
        let cs = ChangeSet {
            add: vec![vec![json!(3)]],
            delete: vec![],
            update: vec![vec![json!(2)], vec![json!(4)]],
        };
        let kinds: Vec<ChangeKind> = cs.non_empty().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![ChangeKind::Add, ChangeKind::Update]);
        assert_eq!(cs.len(), 3);
        assert_eq!(cs.rows(ChangeKind::Update).len(), 2);
    }

    #[test]
    fn event_kind_wire_names() {
        assert_eq!(serde_json::to_string(&EventKind::InitialLoad).unwrap(), r#""initialLoad""#);
        assert_eq!(serde_json::to_string(&EventKind::Add).unwrap(), r#""add""#);
        assert_eq!(serde_json::to_string(&EventKind::Delete).unwrap(), r#""delete""#);
        assert_eq!(serde_json::to_string(&EventKind::Update).unwrap(), r#""update""#);
    }

    #[test]
    fn display_matches_wire_name() {
        for kind in [EventKind::InitialLoad, EventKind::Add, EventKind::Delete, EventKind::Update] {
            let wire = serde_json::to_string(&kind).unwrap();
            assert_eq!(wire.trim_matches('"'), kind.to_string());
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn change_kind_maps_to_event_kind() {
        assert_eq!(EventKind::from(ChangeKind::Add), EventKind::Add);
        assert_eq!(EventKind::from(ChangeKind::Delete), EventKind::Delete);
        assert_eq!(EventKind::from(ChangeKind::Update), EventKind::Update);
    }

    #[test]
    fn parse_unknown_kinds() {
        assert!(matches!(
            "rename".parse::<ChangeKind>(),
            Err(TypeError::UnknownChangeKind(_))
        ));
        assert!(matches!(
            "initial".parse::<EventKind>(),
            Err(TypeError::UnknownEventKind(_))
        ));
    }
}
