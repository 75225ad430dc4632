//! The reconciler: bootstrap and change cycles for one document.

use std::sync::RwLock;

use gridhook_delivery::Delivery;
use gridhook_diff::diff_grids;
use gridhook_source::GridSource;
use gridhook_store::{BaselineStore, KeyValueStore};
use gridhook_types::{to_row_objects, EventKind, Grid, RowObject};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::ReconcilerConfig;
use crate::error::SyncResult;
use crate::lock::{DocumentGuard, DocumentLock};
use crate::report::{BootstrapOutcome, CycleOutcome, CycleReport, PushOutcome, StatusReport};
use crate::state::CycleState;

/// Detects row-level changes in one document and pushes them downstream.
///
/// The baseline only advances at the end of a change cycle that found
/// changes, after every push has been attempted. A failed push is logged and
/// reported but does not stop the cycle, so delivery is at-most-once.
pub struct Reconciler<Src, Kv, D> {
    source: Src,
    store: BaselineStore<Kv>,
    delivery: D,
    lock: DocumentLock,
    config: ReconcilerConfig,
    state: RwLock<CycleState>,
}

impl<Src, Kv, D> Reconciler<Src, Kv, D>
where
    Src: GridSource,
    Kv: KeyValueStore,
    D: Delivery,
{
    /// Create a reconciler with its own lock for `config.document`.
    pub fn new(source: Src, kv: Kv, delivery: D, config: ReconcilerConfig) -> Self {
        let lock = DocumentLock::new(config.document.clone());
        Self::with_lock(source, kv, delivery, config, lock)
    }

    /// Create a reconciler that shares an existing document lock.
    pub fn with_lock(
        source: Src,
        kv: Kv,
        delivery: D,
        config: ReconcilerConfig,
        lock: DocumentLock,
    ) -> Self {
        Self {
            source,
            store: BaselineStore::new(kv),
            delivery,
            lock,
            config,
            state: RwLock::new(CycleState::Idle),
        }
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    pub fn store(&self) -> &BaselineStore<Kv> {
        &self.store
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub fn lock(&self) -> &DocumentLock {
        &self.lock
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// The state of the cycle holding the lock, or of the last cycle to
    /// finish. A cycle that times out waiting for the lock leaves a running
    /// cycle's state alone.
    pub fn state(&self) -> CycleState {
        *self.state.read().expect("lock poisoned")
    }

    /// Bootstrap path: push the entire grid as one `initialLoad` event and
    /// commit it as the baseline.
    ///
    /// The initialized flag is cleared before it is checked, so every call
    /// performs a fresh full push.
    pub async fn on_open(&self) -> SyncResult<BootstrapOutcome> {
        let cycle_id = Uuid::now_v7();
        let span = info_span!("bootstrap", cycle_id = %cycle_id, document = %self.config.document);
        async {
            let _guard = self.acquire().await?;
            let result = self.bootstrap().await;
            self.settle(&result);
            result
        }
        .instrument(span)
        .await
    }

    /// Change path: diff the current grid against the baseline, push each
    /// non-empty category, then commit the current grid.
    pub async fn on_change(&self) -> SyncResult<CycleReport> {
        let cycle_id = Uuid::now_v7();
        let span = info_span!("cycle", cycle_id = %cycle_id, document = %self.config.document);
        async {
            let _guard = self.acquire().await?;
            let result = self.change_cycle(cycle_id).await;
            self.settle(&result);
            result
        }
        .instrument(span)
        .await
    }

    /// Explicit re-initialization: forget the baseline, the last recorded
    /// grid, and the initialized flag.
    pub async fn reset(&self) -> SyncResult<()> {
        let _guard = self.lock.acquire(self.config.lock_timeout).await?;
        self.store.reset()?;
        info!(document = %self.config.document, "baseline reset");
        Ok(())
    }

    /// Persisted state summary. Does not take the lock.
    pub fn status(&self) -> SyncResult<StatusReport> {
        let baseline_rows = if self.store.has_baseline()? {
            Some(self.store.load_baseline()?.data_len())
        } else {
            None
        };
        Ok(StatusReport {
            document: self.config.document.clone(),
            initialized: self.store.is_initialized()?,
            baseline_rows,
            current_rows: self.store.load_current()?.map(|g| g.data_len()),
        })
    }

    /// Wait for the document lock. Only touches the shared state when no
    /// other cycle is running.
    async fn acquire(&self) -> SyncResult<DocumentGuard> {
        self.transition_if_waiting(CycleState::AcquiringLock);
        match self.lock.acquire(self.config.lock_timeout).await {
            Ok(guard) => Ok(guard),
            Err(e) => {
                warn!(error = %e, "cycle aborted");
                self.transition_if_waiting(CycleState::Failed);
                Err(e)
            }
        }
    }

    /// Runs with the document lock held.
    async fn bootstrap(&self) -> SyncResult<BootstrapOutcome> {
        self.store.clear_initialized()?;
        if self.store.is_initialized()? {
            return Ok(BootstrapOutcome::AlreadyInitialized);
        }

        self.transition(CycleState::Reconciling);
        let grid = self.source.read_grid()?;
        let objects = flatten(&grid, grid.data_rows());

        self.transition(CycleState::Pushing);
        let delivered = self.push(EventKind::InitialLoad, &objects).await.is_delivered();

        self.transition(CycleState::CommittingBaseline);
        self.store.commit_baseline(&grid)?;
        self.store.mark_initialized()?;
        info!(rows = objects.len(), delivered, "initial load complete");

        Ok(BootstrapOutcome::Loaded {
            rows: objects.len(),
            delivered,
        })
    }

    /// Runs with the document lock held.
    async fn change_cycle(&self, cycle_id: Uuid) -> SyncResult<CycleReport> {
        self.transition(CycleState::Reconciling);
        let baseline = self.store.load_baseline()?;
        let current = self.source.read_grid()?;
        self.store.record_current(&current)?;

        let changes = diff_grids(&baseline, &current);
        if changes.is_empty() {
            info!("no changes detected");
            return Ok(CycleReport::no_changes(cycle_id, self.config.document.clone()));
        }
        info!(
            add = changes.add.len(),
            delete = changes.delete.len(),
            update = changes.update.len(),
            "changes detected"
        );

        self.transition(CycleState::Pushing);
        let mut pushes = Vec::new();
        for (kind, rows) in changes.non_empty() {
            let objects = flatten(&current, rows);
            pushes.push(self.push(EventKind::from(kind), &objects).await);
        }

        self.transition(CycleState::CommittingBaseline);
        self.store.commit_baseline(&current)?;

        Ok(CycleReport {
            cycle_id,
            document: self.config.document.clone(),
            outcome: CycleOutcome::Committed,
            changes,
            pushes,
        })
    }

    /// Push one event; failures become a `Failed` outcome, never an error.
    async fn push(&self, event: EventKind, objects: &[RowObject]) -> PushOutcome {
        match self.delivery.push(event, objects).await {
            Ok(receipt) => {
                debug!(event = %event, status = receipt.status, "event delivered");
                PushOutcome::Delivered {
                    event,
                    rows: objects.len(),
                    status: receipt.status,
                }
            }
            Err(e) => {
                warn!(event = %event, rows = objects.len(), error = %e, "event delivery failed");
                PushOutcome::Failed {
                    event,
                    rows: objects.len(),
                    error: e.to_string(),
                }
            }
        }
    }

    fn transition(&self, next: CycleState) {
        let mut state = self.state.write().expect("lock poisoned");
        let prev = *state;
        if prev != next {
            debug!(from = %prev, to = %next, "state transition");
            *state = next;
        }
    }

    /// Like [`transition`](Self::transition), but a no-op while another
    /// cycle holds the lock.
    fn transition_if_waiting(&self, next: CycleState) {
        let mut state = self.state.write().expect("lock poisoned");
        let prev = *state;
        let waiting = matches!(
            prev,
            CycleState::Idle | CycleState::AcquiringLock | CycleState::Failed
        );
        if waiting && prev != next {
            debug!(from = %prev, to = %next, "state transition");
            *state = next;
        }
    }

    /// Record how a locked cycle ended. Called before the guard drops.
    fn settle<T>(&self, result: &SyncResult<T>) {
        match result {
            Ok(_) => self.transition(CycleState::Idle),
            Err(e) => {
                warn!(error = %e, "cycle aborted");
                self.transition(CycleState::Failed);
            }
        }
    }
}

/// Key `rows` by the column names in `grid`'s header.
fn flatten(grid: &Grid, rows: &[gridhook_types::Row]) -> Vec<RowObject> {
    to_row_objects(&grid.header_names(), rows)
}

impl<Src, Kv, D> std::fmt::Debug for Reconciler<Src, Kv, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("document", &self.config.document)
            .field("state", &*self.state.read().expect("lock poisoned"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use gridhook_delivery::InMemoryDelivery;
    use gridhook_source::InMemoryGridSource;
    use gridhook_store::{keys, FileKeyValueStore, InMemoryKeyValueStore};
    use gridhook_types::ChangeKind;
    use serde_json::json;

    use crate::error::SyncError;

    type TestReconciler =
        Reconciler<Arc<InMemoryGridSource>, Arc<InMemoryKeyValueStore>, Arc<InMemoryDelivery>>;

    struct Harness {
        source: Arc<InMemoryGridSource>,
        kv: Arc<InMemoryKeyValueStore>,
        delivery: Arc<InMemoryDelivery>,
        reconciler: TestReconciler,
    }

    fn harness_with(config: ReconcilerConfig) -> Harness {
        let source = Arc::new(InMemoryGridSource::new(Grid::with_header(
            vec![json!("id"), json!("val")],
            vec![vec![json!(1), json!("a")], vec![json!(2), json!("b")]],
        )));
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let delivery = Arc::new(InMemoryDelivery::new());
        let reconciler = Reconciler::new(
            Arc::clone(&source),
            Arc::clone(&kv),
            Arc::clone(&delivery),
            config,
        );
        Harness {
            source,
            kv,
            delivery,
            reconciler,
        }
    }

    fn harness() -> Harness {
        harness_with(ReconcilerConfig::new("doc"))
    }

    fn obj(pairs: &[(&str, serde_json::Value)]) -> RowObject {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Bootstrap
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn open_pushes_initial_load_and_commits() {
        let h = harness();
        let outcome = h.reconciler.on_open().await.unwrap();
        assert_eq!(
            outcome,
            BootstrapOutcome::Loaded {
                rows: 2,
                delivered: true
            }
        );

        let pushes = h.delivery.pushes();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].event, EventKind::InitialLoad);
        assert_eq!(
            pushes[0].rows,
            vec![
                obj(&[("id", json!(1)), ("val", json!("a"))]),
                obj(&[("id", json!(2)), ("val", json!("b"))]),
            ]
        );

        assert!(h.reconciler.store().is_initialized().unwrap());
        assert_eq!(
            h.reconciler.store().load_baseline().unwrap(),
            h.source.read_grid().unwrap()
        );
        assert_eq!(h.reconciler.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn open_twice_pushes_twice() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        let second = h.reconciler.on_open().await.unwrap();
        assert!(matches!(second, BootstrapOutcome::Loaded { .. }));
        assert_eq!(
            h.delivery.events(),
            vec![EventKind::InitialLoad, EventKind::InitialLoad]
        );
    }

    #[tokio::test]
    async fn open_with_failed_delivery_still_commits() {
        let h = harness();
        h.delivery.fail_on(EventKind::InitialLoad);
        let outcome = h.reconciler.on_open().await.unwrap();
        assert_eq!(
            outcome,
            BootstrapOutcome::Loaded {
                rows: 2,
                delivered: false
            }
        );
        assert!(h.reconciler.store().is_initialized().unwrap());
        assert!(h.reconciler.store().has_baseline().unwrap());
    }

    #[tokio::test]
    async fn open_with_unavailable_source_fails() {
        let h = harness();
        h.source.set_unavailable(Some("sheet deleted".into()));
        let err = h.reconciler.on_open().await.unwrap_err();
        assert!(matches!(err, SyncError::SourceUnavailable(_)));
        assert!(h.delivery.is_empty());
        assert!(!h.reconciler.store().has_baseline().unwrap());
        assert_eq!(h.reconciler.state(), CycleState::Failed);
    }

    // -----------------------------------------------------------------------
    // Change cycles
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn change_pushes_add_and_update() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();

        h.source.set_cell(2, 1, json!("c"));
        h.source.push_row(vec![json!(3), json!("d")]);

        let report = h.reconciler.on_change().await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::Committed);
        assert_eq!(report.changes.add, vec![vec![json!(3), json!("d")]]);
        assert_eq!(report.changes.update, vec![vec![json!(2), json!("c")]]);
        assert!(report.changes.delete.is_empty());

        let pushes = h.delivery.pushes();
        assert_eq!(pushes.len(), 3);
        assert_eq!(pushes[1].event, EventKind::Add);
        assert_eq!(pushes[1].rows, vec![obj(&[("id", json!(3)), ("val", json!("d"))])]);
        assert_eq!(pushes[2].event, EventKind::Update);
        assert_eq!(pushes[2].rows, vec![obj(&[("id", json!(2)), ("val", json!("c"))])]);

        assert_eq!(
            h.reconciler.store().load_baseline().unwrap(),
            h.source.read_grid().unwrap()
        );
    }

    #[tokio::test]
    async fn change_pushes_delete() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        h.source.remove_row(2);

        let report = h.reconciler.on_change().await.unwrap();
        assert_eq!(report.count(ChangeKind::Delete), 1);
        assert_eq!(h.delivery.events().last(), Some(&EventKind::Delete));
        assert_eq!(
            h.delivery.pushes().last().unwrap().rows,
            vec![obj(&[("id", json!(2)), ("val", json!("b"))])]
        );
    }

    #[tokio::test]
    async fn categories_pushed_in_fixed_order() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        h.source.set_cell(1, 1, json!("changed"));
        h.source.remove_row(2);
        h.source.push_row(vec![json!(9), json!("new")]);

        let report = h.reconciler.on_change().await.unwrap();
        let order: Vec<_> = report.pushes.iter().map(|p| p.event()).collect();
        assert_eq!(order, vec![EventKind::Add, EventKind::Delete, EventKind::Update]);
    }

    #[tokio::test]
    async fn second_run_without_edits_is_a_no_op() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        h.source.push_row(vec![json!(3), json!("d")]);

        let first = h.reconciler.on_change().await.unwrap();
        assert_eq!(first.outcome, CycleOutcome::Committed);
        let pushes_after_first = h.delivery.len();

        let second = h.reconciler.on_change().await.unwrap();
        assert_eq!(second.outcome, CycleOutcome::NoChanges);
        assert!(second.changes.is_empty());
        assert!(second.pushes.is_empty());
        assert_eq!(h.delivery.len(), pushes_after_first);
    }

    #[tokio::test]
    async fn no_changes_skips_baseline_write() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        // Plant a marker that a baseline rewrite would clobber.
        let stored = h.kv.get(keys::INITIAL_STATE).unwrap().unwrap();
        h.kv.set(keys::INITIAL_STATE, &format!(" {stored}")).unwrap();

        let report = h.reconciler.on_change().await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::NoChanges);
        assert!(h.kv.get(keys::INITIAL_STATE).unwrap().unwrap().starts_with(' '));
        // The diagnostic snapshot is still recorded.
        assert!(h.reconciler.store().load_current().unwrap().is_some());
    }

    #[tokio::test]
    async fn failed_update_still_commits_and_pushes_others() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        h.delivery.fail_on(EventKind::Update);

        h.source.set_cell(1, 1, json!("z"));
        h.source.remove_row(2);
        h.source.push_row(vec![json!(3), json!("d")]);

        let report = h.reconciler.on_change().await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::Committed);
        assert_eq!(report.pushes.len(), 3);
        assert!(report.pushes[0].is_delivered());
        assert!(report.pushes[1].is_delivered());
        assert!(!report.pushes[2].is_delivered());
        assert_eq!(report.failures().count(), 1);

        // Baseline advanced anyway: the failed update is not retried.
        assert_eq!(
            h.reconciler.store().load_baseline().unwrap(),
            h.source.read_grid().unwrap()
        );
        h.delivery.clear_failures();
        let next = h.reconciler.on_change().await.unwrap();
        assert_eq!(next.outcome, CycleOutcome::NoChanges);
    }

    #[tokio::test]
    async fn change_without_bootstrap_reports_everything_added() {
        let h = harness();
        let report = h.reconciler.on_change().await.unwrap();
        assert_eq!(report.count(ChangeKind::Add), 2);
        assert_eq!(h.delivery.events(), vec![EventKind::Add]);
        // The change path never sets the initialized flag.
        assert!(!h.reconciler.store().is_initialized().unwrap());
    }

    #[tokio::test]
    async fn corrupt_baseline_treats_all_rows_as_added() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        h.kv.set(keys::INITIAL_STATE, "{garbage").unwrap();

        let report = h.reconciler.on_change().await.unwrap();
        assert_eq!(report.count(ChangeKind::Add), 2);
        assert_eq!(report.count(ChangeKind::Update), 0);
        // The rewritten baseline is valid again.
        assert_eq!(
            h.reconciler.store().load_baseline().unwrap(),
            h.source.read_grid().unwrap()
        );
    }

    #[tokio::test]
    async fn unavailable_source_mutates_nothing() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        let before = h.kv.keys();
        let baseline_before = h.kv.get(keys::INITIAL_STATE).unwrap();
        h.source.set_unavailable(Some("gone".into()));

        let err = h.reconciler.on_change().await.unwrap_err();
        assert!(matches!(err, SyncError::SourceUnavailable(_)));
        assert_eq!(h.kv.keys(), before);
        assert_eq!(h.kv.get(keys::INITIAL_STATE).unwrap(), baseline_before);
        assert_eq!(h.delivery.len(), 1);
        assert_eq!(h.reconciler.state(), CycleState::Failed);
        assert!(!h.reconciler.lock().is_locked());
    }

    #[tokio::test]
    async fn untracked_rows_are_ignored() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        h.source.push_row(vec![json!(""), json!("no id")]);
        h.source.push_row(vec![json!(null), json!("null id")]);

        let report = h.reconciler.on_change().await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::NoChanges);
    }

    // -----------------------------------------------------------------------
    // Locking
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn lock_timeout_aborts_without_side_effects() {
        let h = harness_with(
            ReconcilerConfig::new("doc").with_lock_timeout(Duration::from_millis(30)),
        );
        h.reconciler.on_open().await.unwrap();
        h.source.push_row(vec![json!(3), json!("d")]);
        let baseline_before = h.kv.get(keys::INITIAL_STATE).unwrap();

        let held = h.reconciler.lock().try_acquire().unwrap().unwrap();
        let err = h.reconciler.on_change().await.unwrap_err();
        match err {
            SyncError::LockTimeout { document, waited } => {
                assert_eq!(document, "doc");
                assert_eq!(waited, Duration::from_millis(30));
            }
            other => panic!("expected lock timeout, got {other:?}"),
        }
        assert_eq!(h.reconciler.state(), CycleState::Failed);
        assert_eq!(h.delivery.len(), 1);
        assert_eq!(h.kv.get(keys::INITIAL_STATE).unwrap(), baseline_before);
        assert!(h.kv.get(keys::CURRENT_STATE).unwrap().is_none());

        // Once released, the next cycle picks up the change.
        drop(held);
        let report = h.reconciler.on_change().await.unwrap();
        assert_eq!(report.count(ChangeKind::Add), 1);
        assert_eq!(h.reconciler.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn concurrent_cycles_do_not_interleave() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        h.source.push_row(vec![json!(3), json!("d")]);
        h.delivery.set_delay(Duration::from_millis(100));

        let (a, b) = tokio::join!(h.reconciler.on_change(), h.reconciler.on_change());
        let (a, b) = (a.unwrap(), b.unwrap());

        let mut outcomes = vec![a.outcome, b.outcome];
        outcomes.sort_by_key(|o| *o == CycleOutcome::NoChanges);
        assert_eq!(outcomes, vec![CycleOutcome::Committed, CycleOutcome::NoChanges]);
        // Exactly one add push: the second cycle saw the committed baseline.
        assert_eq!(h.delivery.events(), vec![EventKind::InitialLoad, EventKind::Add]);
    }

    #[tokio::test]
    async fn reconcilers_sharing_a_lock_serialize() {
        let h = harness_with(
            ReconcilerConfig::new("doc").with_lock_timeout(Duration::from_millis(30)),
        );
        let other = Reconciler::with_lock(
            Arc::clone(&h.source),
            Arc::clone(&h.kv),
            Arc::clone(&h.delivery),
            h.reconciler.config().clone(),
            h.reconciler.lock().clone(),
        );
        let _held = h.reconciler.lock().try_acquire().unwrap().unwrap();
        let err = other.on_change().await.unwrap_err();
        assert!(matches!(err, SyncError::LockTimeout { .. }));
    }

    #[tokio::test]
    async fn timed_out_waiter_leaves_running_state_alone() {
        let h = harness_with(
            ReconcilerConfig::new("doc").with_lock_timeout(Duration::from_millis(50)),
        );
        h.reconciler.on_open().await.unwrap();
        h.source.push_row(vec![json!(3), json!("d")]);
        h.delivery.set_delay(Duration::from_millis(300));

        let late = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let err = h.reconciler.on_change().await.unwrap_err();
            assert!(matches!(err, SyncError::LockTimeout { .. }));
            h.reconciler.state()
        };
        let (first, seen_after_timeout) = tokio::join!(h.reconciler.on_change(), late);

        assert_eq!(seen_after_timeout, CycleState::Pushing);
        assert_eq!(first.unwrap().outcome, CycleOutcome::Committed);
        assert_eq!(h.reconciler.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn separately_built_reconcilers_share_one_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");
        let lock_path = dir.path().join("doc.cycle.lock");
        let source = Arc::new(InMemoryGridSource::new(Grid::with_header(
            vec![json!("id"), json!("val")],
            vec![vec![json!(1), json!("a")], vec![json!(2), json!("b")]],
        )));
        let delivery = Arc::new(InMemoryDelivery::new());
        // Each reconciler opens its own store and lock, as two CLI runs would.
        let build = || {
            Reconciler::with_lock(
                Arc::clone(&source),
                FileKeyValueStore::open(&state_path).unwrap(),
                Arc::clone(&delivery),
                ReconcilerConfig::new("doc"),
                DocumentLock::with_lock_file("doc", &lock_path),
            )
        };
        let first = build();
        let second = build();

        first.on_open().await.unwrap();
        source.push_row(vec![json!(3), json!("d")]);
        delivery.set_delay(Duration::from_millis(100));

        let (a, b) = tokio::join!(first.on_change(), second.on_change());
        let mut outcomes = vec![a.unwrap().outcome, b.unwrap().outcome];
        outcomes.sort_by_key(|o| *o == CycleOutcome::NoChanges);
        assert_eq!(outcomes, vec![CycleOutcome::Committed, CycleOutcome::NoChanges]);
        assert_eq!(delivery.events(), vec![EventKind::InitialLoad, EventKind::Add]);
        assert_eq!(
            second.store().load_baseline().unwrap(),
            source.read_grid().unwrap()
        );
    }

    #[tokio::test]
    async fn bootstrap_waits_for_the_document_lock() {
        let h = harness_with(
            ReconcilerConfig::new("doc").with_lock_timeout(Duration::from_millis(30)),
        );
        let _held = h.reconciler.lock().try_acquire().unwrap().unwrap();
        let err = h.reconciler.on_open().await.unwrap_err();
        assert!(matches!(err, SyncError::LockTimeout { .. }));
        assert!(h.delivery.is_empty());
    }

    // -----------------------------------------------------------------------
    // Reset and status
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn status_reflects_persisted_state() {
        let h = harness();
        let empty = h.reconciler.status().unwrap();
        assert!(!empty.initialized);
        assert_eq!(empty.baseline_rows, None);
        assert_eq!(empty.current_rows, None);

        h.reconciler.on_open().await.unwrap();
        h.source.push_row(vec![json!(3), json!("d")]);
        h.reconciler.on_change().await.unwrap();

        let status = h.reconciler.status().unwrap();
        assert_eq!(status.document, "doc");
        assert!(status.initialized);
        assert_eq!(status.baseline_rows, Some(3));
        assert_eq!(status.current_rows, Some(3));
    }

    #[tokio::test]
    async fn reset_forgets_everything() {
        let h = harness();
        h.reconciler.on_open().await.unwrap();
        h.reconciler.on_change().await.unwrap();

        h.reconciler.reset().await.unwrap();
        assert!(h.kv.is_empty());

        let report = h.reconciler.on_change().await.unwrap();
        assert_eq!(report.count(ChangeKind::Add), 2);
    }
}
