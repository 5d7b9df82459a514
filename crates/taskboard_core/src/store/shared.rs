//! Shared handle over one explicitly constructed `TaskStore`.
//!
//! # Responsibility
//! - Let the mutation controller, drag resolver and UI share one store instance.
//! - Publish revision changes to subscribers.
//!
//! # Invariants
//! - The lock is released before any await point; closures passed to
//!   `read`/`write` are synchronous.
//! - Subscribers are notified only when the store revision actually changed.

use super::task_store::TaskStore;
use crate::model::task::Task;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable handle to the canonical store.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<TaskStore>>,
    changes: Arc<watch::Sender<u64>>,
}

impl SharedStore {
    pub fn new(store: TaskStore) -> Self {
        let (changes, _) = watch::channel(store.revision());
        Self {
            inner: Arc::new(Mutex::new(store)),
            changes: Arc::new(changes),
        }
    }

    /// Runs a read-only closure against the store.
    pub fn read<T>(&self, f: impl FnOnce(&TaskStore) -> T) -> T {
        let store = self.inner.lock();
        f(&store)
    }

    /// Runs a mutating closure and notifies subscribers on change.
    pub fn write<T>(&self, f: impl FnOnce(&mut TaskStore) -> T) -> T {
        let (result, revision) = {
            let mut store = self.inner.lock();
            let before = store.revision();
            let result = f(&mut store);
            let after = store.revision();
            (result, (after != before).then_some(after))
        };
        if let Some(revision) = revision {
            self.changes.send_replace(revision);
        }
        result
    }

    pub fn view(&self) -> Vec<Task> {
        self.read(TaskStore::view)
    }

    pub fn revision(&self) -> u64 {
        self.read(TaskStore::revision)
    }

    /// Receiver that observes every published revision.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new(TaskStore::new())
    }
}

/// Caches the last computed view until the store revision changes.
#[derive(Debug, Default)]
pub struct ViewMemo {
    cached: Option<(u64, Vec<Task>)>,
}

impl ViewMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized view, recomputing it when `store` has moved on.
    pub fn view(&mut self, store: &TaskStore) -> &[Task] {
        let revision = store.revision();
        let stale = !matches!(&self.cached, Some((cached, _)) if *cached == revision);
        if stale {
            self.cached = Some((revision, store.view()));
        }
        match &self.cached {
            Some((_, tasks)) => tasks,
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SharedStore, ViewMemo};
    use crate::model::task::{Task, TaskDraft, TaskStatus};
    use crate::store::filter::FilterPatch;
    use crate::store::task_store::TaskStore;
    use uuid::Uuid;

    fn seeded() -> SharedStore {
        let mut store = TaskStore::new();
        store.replace_all(vec![
            Task::from_draft(Uuid::new_v4(), TaskDraft::new("alpha"), 1),
            Task::from_draft(Uuid::new_v4(), TaskDraft::new("beta"), 2),
        ]);
        SharedStore::new(store)
    }

    #[test]
    fn write_publishes_only_real_changes() {
        let shared = seeded();
        let mut changes = shared.subscribe();
        assert!(!changes.has_changed().unwrap());

        let ghost = Uuid::new_v4();
        let failed = shared.write(|store| store.remove(ghost));
        assert!(failed.is_err());
        assert!(!changes.has_changed().unwrap());

        let id = shared.read(|store| store.tasks()[0].id);
        shared
            .write(|store| store.set_status(id, TaskStatus::Done, 10))
            .unwrap();
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), shared.revision());
    }

    #[test]
    fn memo_recomputes_after_revision_change() {
        let mut store = TaskStore::new();
        store.replace_all(vec![Task::from_draft(
            Uuid::new_v4(),
            TaskDraft::new("alpha"),
            1,
        )]);
        let mut memo = ViewMemo::new();
        assert_eq!(memo.view(&store).len(), 1);

        store.set_filters(FilterPatch::search("zzz"));
        assert!(memo.view(&store).is_empty());
    }
}
