//! Optimistic mutation controller.
//!
//! # Responsibility
//! - Turn create/update/delete/move intents into adapter calls.
//! - Reconcile the store with each call's outcome and report one notification.
//!
//! # Invariants
//! - Create, update and delete touch the store only after the adapter confirms.
//! - Move applies to the store before the adapter call, and a failed move
//!   resynchronizes the whole collection from `get_all`.
//! - Adapter failures are recovered here and never corrupt the store.
//! - Store contract violations and validation failures are returned, never swallowed.
//! - At most one in-flight mutation per task is a caller contract; nothing here
//!   serializes overlapping writes to the same id.

use super::notification::Notification;
use crate::adapter::{AdapterError, TaskAdapter};
use crate::model::task::{
    now_epoch_ms, TaskDraft, TaskId, TaskPatch, TaskStatus, TaskValidationError,
};
use crate::store::{SharedStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// User mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Move,
}

/// When a mutation reaches the store relative to its adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyPolicy {
    /// Store changes only after the adapter confirms.
    Pessimistic,
    /// Store changes immediately; the adapter call confirms afterwards.
    Optimistic,
}

/// What happens to the store when the adapter call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Nothing was applied, so nothing is undone.
    LeaveStore,
    /// Discard local state and reload everything from the adapter.
    FullResync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationPolicy {
    pub kind: MutationKind,
    pub apply: ApplyPolicy,
    pub on_failure: FailurePolicy,
}

impl MutationKind {
    pub const fn policy(self) -> MutationPolicy {
        let (apply, on_failure) = match self {
            Self::Create | Self::Update | Self::Delete => {
                (ApplyPolicy::Pessimistic, FailurePolicy::LeaveStore)
            }
            Self::Move => (ApplyPolicy::Optimistic, FailurePolicy::FullResync),
        };
        MutationPolicy {
            kind: self,
            apply,
            on_failure,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Move => "move",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Create | Self::Update => "Failed to save task",
            Self::Delete => "Failed to delete task",
            Self::Move => "Failed to move task",
        }
    }
}

/// Apply/failure policy per mutation kind.
pub const MUTATION_POLICIES: [MutationPolicy; 4] = [
    MutationKind::Create.policy(),
    MutationKind::Update.policy(),
    MutationKind::Delete.policy(),
    MutationKind::Move.policy(),
];

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load tasks";

/// Errors a mutation returns instead of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Payload rejected before any adapter call.
    Validation(TaskValidationError),
    /// Store contract violation.
    Store(StoreError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for BoardError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for BoardError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub type MutationResult = Result<Notification, BoardError>;

/// Coordinates the store and the persistence adapter.
pub struct MutationController<A: TaskAdapter> {
    adapter: A,
    store: SharedStore,
}

impl<A: TaskAdapter> MutationController<A> {
    pub fn new(adapter: A, store: SharedStore) -> Self {
        Self { adapter, store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Loads the full collection into the store.
    ///
    /// Returns `None` on success, or the failure notification.
    pub async fn load(&self) -> Option<Notification> {
        self.store.write(|store| store.set_loading(true));
        let outcome = self.adapter.get_all().await;
        self.store.write(|store| {
            store.set_loading(false);
            match outcome {
                Ok(tasks) => {
                    info!(
                        "event=board_load module=service status=ok count={}",
                        tasks.len()
                    );
                    store.replace_all(tasks);
                    None
                }
                Err(err) => {
                    error!("event=board_load module=service status=error error={err}");
                    store.set_error(Some(LOAD_FAILED_MESSAGE.to_string()));
                    Some(Notification::error(LOAD_FAILED_MESSAGE))
                }
            }
        })
    }

    /// Creates a task once the adapter has assigned its id.
    pub async fn create(&self, draft: TaskDraft) -> MutationResult {
        draft.validate()?;
        match self.adapter.create(draft.normalized()).await {
            Ok(task) => {
                let id = task.id;
                self.store.write(|store| store.insert(task))?;
                Ok(self.succeeded(MutationKind::Create, id, "Task created"))
            }
            Err(err) => Ok(self.failed(MutationKind::Create.policy(), None, err).await),
        }
    }

    /// Applies a field edit after the adapter confirms it.
    pub async fn update(&self, id: TaskId, changes: TaskPatch) -> MutationResult {
        changes.validate()?;
        match self.adapter.update(id, changes).await {
            Ok(task) => {
                self.store.write(|store| store.replace(task))?;
                Ok(self.succeeded(MutationKind::Update, id, "Task updated"))
            }
            Err(err) => Ok(self.failed(MutationKind::Update.policy(), Some(id), err).await),
        }
    }

    /// Removes a task after the adapter confirms deletion.
    pub async fn delete(&self, id: TaskId) -> MutationResult {
        match self.adapter.delete(id).await {
            Ok(()) => {
                self.store.write(|store| store.remove(id))?;
                Ok(self.succeeded(MutationKind::Delete, id, "Task deleted"))
            }
            Err(err) => Ok(self.failed(MutationKind::Delete.policy(), Some(id), err).await),
        }
    }

    /// Moves a task to another column, optimistically.
    pub async fn move_task(&self, id: TaskId, status: TaskStatus) -> MutationResult {
        self.move_with(MutationKind::Move.policy(), id, status).await
    }

    // `move_task` always passes the table's optimistic policy; the pessimistic
    // branch runs only when a policy is passed explicitly.
    async fn move_with(
        &self,
        policy: MutationPolicy,
        id: TaskId,
        status: TaskStatus,
    ) -> MutationResult {
        let optimistic = policy.apply == ApplyPolicy::Optimistic;
        if optimistic {
            self.store
                .write(|store| store.set_status(id, status, now_epoch_ms()))?;
        } else if !self.store.read(|store| store.contains(id)) {
            return Err(StoreError::NotFound(id).into());
        }

        match self.adapter.update(id, TaskPatch::status(status)).await {
            Ok(task) => {
                if !optimistic {
                    self.store.write(|store| store.replace(task))?;
                }
                let message = format!("Moved to {}", status.label());
                Ok(self.succeeded(policy.kind, id, &message))
            }
            Err(err) => Ok(self.failed(policy, Some(id), err).await),
        }
    }

    fn succeeded(&self, kind: MutationKind, id: TaskId, message: &str) -> Notification {
        info!(
            "event=mutation module=service kind={} status=ok task_id={id}",
            kind.as_str()
        );
        Notification::success(message)
    }

    async fn failed(
        &self,
        policy: MutationPolicy,
        id: Option<TaskId>,
        err: AdapterError,
    ) -> Notification {
        warn!(
            "event=mutation module=service kind={} status=error task_id={} error={err}",
            policy.kind.as_str(),
            id.map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        match policy.on_failure {
            FailurePolicy::LeaveStore => {}
            FailurePolicy::FullResync => self.resync().await,
        }
        Notification::error(policy.kind.failure_message())
    }

    // Reloads everything rather than reverting one task: any server-side change
    // made since the last load shows up here too.
    async fn resync(&self) {
        match self.adapter.get_all().await {
            Ok(tasks) => {
                info!(
                    "event=board_resync module=service status=ok count={}",
                    tasks.len()
                );
                self.store.write(|store| store.replace_all(tasks));
            }
            Err(err) => {
                error!("event=board_resync module=service status=error error={err}");
                self.store
                    .write(|store| store.set_error(Some(LOAD_FAILED_MESSAGE.to_string())));
            }
        }
    }
}
