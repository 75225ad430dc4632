use gridhook_types::Grid;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::KeyValueStore;

/// Persisted key names.
pub mod keys {
    /// One-shot bootstrap latch, `"true"` or absent.
    pub const IS_INITIALIZED: &str = "isInitialized";
    /// The committed baseline grid.
    pub const INITIAL_STATE: &str = "initial-state";
    /// The most recent grid read by a change cycle.
    pub const CURRENT_STATE: &str = "current-state";
}

const TRUE: &str = "true";

/// Typed access to the single baseline snapshot and its initialized flag.
///
/// The store holds at most one baseline. It is not versioned; comparison
/// belongs to the differ. Callers only ever see [`Grid`] values.
#[derive(Debug)]
pub struct BaselineStore<S> {
    kv: S,
}

impl<S: KeyValueStore> BaselineStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// The underlying key-value store.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// The committed baseline, or an empty grid if none exists.
    ///
    /// A stored value that cannot be decoded is logged and treated as an
    /// empty baseline, so the next diff reports every current row as added.
    pub fn load_baseline(&self) -> StoreResult<Grid> {
        match self.kv.get(keys::INITIAL_STATE)? {
            None => Ok(Grid::empty()),
            Some(text) => match Grid::from_json(&text) {
                Ok(grid) => Ok(grid),
                Err(e) => {
                    warn!(key = keys::INITIAL_STATE, error = %e, "stored baseline is corrupt; using empty baseline");
                    Ok(Grid::empty())
                }
            },
        }
    }

    /// Replace the baseline with `grid`.
    pub fn commit_baseline(&self, grid: &Grid) -> StoreResult<()> {
        let text = encode(grid)?;
        self.kv.set(keys::INITIAL_STATE, &text)?;
        debug!(rows = grid.len(), "baseline committed");
        Ok(())
    }

    /// Record the grid most recently read by a change cycle.
    pub fn record_current(&self, grid: &Grid) -> StoreResult<()> {
        let text = encode(grid)?;
        self.kv.set(keys::CURRENT_STATE, &text)
    }

    /// The last recorded current grid, if any and if it decodes.
    pub fn load_current(&self) -> StoreResult<Option<Grid>> {
        Ok(self
            .kv
            .get(keys::CURRENT_STATE)?
            .and_then(|text| Grid::from_json(&text).ok()))
    }

    /// Returns `true` if a baseline value is stored.
    pub fn has_baseline(&self) -> StoreResult<bool> {
        self.kv.contains(keys::INITIAL_STATE)
    }

    pub fn is_initialized(&self) -> StoreResult<bool> {
        Ok(self.kv.get(keys::IS_INITIALIZED)?.as_deref() == Some(TRUE))
    }

    pub fn mark_initialized(&self) -> StoreResult<()> {
        self.kv.set(keys::IS_INITIALIZED, TRUE)
    }

    pub fn clear_initialized(&self) -> StoreResult<()> {
        self.kv.delete(keys::IS_INITIALIZED)?;
        Ok(())
    }

    /// Explicit re-initialization: forget the baseline, the diagnostic
    /// snapshot, and the initialized flag.
    pub fn reset(&self) -> StoreResult<()> {
        self.kv.delete(keys::INITIAL_STATE)?;
        self.kv.delete(keys::CURRENT_STATE)?;
        self.kv.delete(keys::IS_INITIALIZED)?;
        debug!("baseline store reset");
        Ok(())
    }
}

fn encode(grid: &Grid) -> StoreResult<String> {
    grid.to_json()
        .map_err(|e| StoreError::Serialization(e.to_string()))
}
