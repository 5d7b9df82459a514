//! Canonical in-memory task collection.
//!
//! # Responsibility
//! - Own the canonical task list and current filter criteria.
//! - Apply committed mutations and expose the derived, filtered view.
//!
//! # Invariants
//! - At most one task per id at any time.
//! - Iteration order is newest-first for inserted tasks; `replace` keeps position.
//! - `view()` is a pure projection: it never mutates filters or tasks.
//! - Failed operations leave the collection and `revision` untouched.

use super::filter::{FilterPatch, TaskFilters};
use crate::model::task::{Task, TaskId, TaskStatus};
use log::warn;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Contract violations raised by store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    DuplicateId(TaskId),
    NotFound(TaskId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "task already present in store: {id}"),
            Self::NotFound(id) => write!(f, "task not found in store: {id}"),
        }
    }
}

impl Error for StoreError {}

/// One board column: the view restricted to a single status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

impl BoardColumn {
    /// Splits an already filtered view into the three columns, in board order.
    pub fn group(view: &[Task]) -> [BoardColumn; 3] {
        TaskStatus::ALL.map(|status| BoardColumn {
            status,
            tasks: view
                .iter()
                .filter(|task| task.status == status)
                .cloned()
                .collect(),
        })
    }

    pub fn label(&self) -> &'static str {
        self.status.label()
    }

    pub fn count(&self) -> usize {
        self.tasks.len()
    }
}

/// Task store holding canonical tasks, filters and load state.
#[derive(Debug, Default)]
pub struct TaskStore {
    items: Vec<Task>,
    filters: TaskFilters,
    loading: bool,
    error: Option<String>,
    revision: u64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the canonical collection wholesale and clears error state.
    ///
    /// Input order becomes iteration order. Later duplicates of an id are
    /// dropped so uniqueness holds for any input.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        let mut seen = HashSet::with_capacity(tasks.len());
        let mut items = Vec::with_capacity(tasks.len());
        for task in tasks {
            if seen.insert(task.id) {
                items.push(task);
            } else {
                warn!(
                    "event=store_replace_all module=store status=dropped_duplicate task_id={}",
                    task.id
                );
            }
        }
        self.items = items;
        self.error = None;
        self.bump();
    }

    /// Adds a task at the front of iteration order.
    pub fn insert(&mut self, task: Task) -> StoreResult<()> {
        if self.contains(task.id) {
            return Err(StoreError::DuplicateId(task.id));
        }
        self.items.insert(0, task);
        self.bump();
        Ok(())
    }

    /// Overwrites the task with the same id, keeping its position.
    pub fn replace(&mut self, task: Task) -> StoreResult<()> {
        let index = self.index_of(task.id)?;
        self.items[index] = task;
        self.bump();
        Ok(())
    }

    pub fn remove(&mut self, id: TaskId) -> StoreResult<Task> {
        let index = self.index_of(id)?;
        let removed = self.items.remove(index);
        self.bump();
        Ok(removed)
    }

    /// Optimistic status change used by drag moves.
    pub fn set_status(
        &mut self,
        id: TaskId,
        status: TaskStatus,
        timestamp_ms: i64,
    ) -> StoreResult<()> {
        let index = self.index_of(id)?;
        let task = &mut self.items[index];
        task.status = status;
        task.touch(timestamp_ms);
        self.bump();
        Ok(())
    }

    pub fn set_filters(&mut self, patch: FilterPatch) {
        if patch.is_empty() {
            return;
        }
        self.filters.merge(patch);
        self.bump();
    }

    pub fn filters(&self) -> &TaskFilters {
        &self.filters
    }

    /// Filtered view in canonical order. Recomputed on every call.
    pub fn view(&self) -> Vec<Task> {
        let predicate = self.filters.predicate();
        self.items
            .iter()
            .filter(|task| predicate(task))
            .cloned()
            .collect()
    }

    /// Groups `view()` per column in board order.
    pub fn columns(&self) -> [BoardColumn; 3] {
        BoardColumn::group(&self.view())
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.items.iter().find(|task| task.id == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Canonical tasks, unfiltered.
    pub fn tasks(&self) -> &[Task] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.bump();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
        self.bump();
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Increments on every accepted change; used to memoize the view.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn index_of(&self, id: TaskId) -> StoreResult<usize> {
        self.items
            .iter()
            .position(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
