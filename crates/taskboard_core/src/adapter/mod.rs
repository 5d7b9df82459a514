//! Persistence adapter contract and the simulated network API.
//!
//! # Responsibility
//! - Define the async CRUD surface the mutation controller talks to.
//! - Provide `LocalStoreAdapter`, a latent, fallible API that persists locally.
//!
//! # Invariants
//! - The adapter is the sole source of durable truth; it assigns ids and timestamps.
//! - `update` always returns the task with a fresh, non-decreasing `updated_at`.
//! - `update`/`delete` on an unknown id fail with `NotFound`.
//! - Any call may fail with `Transport`, independent of argument validity.
//! - There is no cancellation; dropping a pending call just ignores its result.

use crate::db::DbError;
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod fault;
pub mod local_store;
pub mod seed;

pub use fault::FaultInjector;
pub use local_store::LocalStoreAdapter;
pub use seed::{seed_tasks, TASKS_STORAGE_KEY};

pub type AdapterResult<T> = Result<T, AdapterError>;

/// Adapter operation kinds, used for fault scheduling and call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterOp {
    GetAll,
    Create,
    Update,
    Delete,
}

impl AdapterOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetAll => "get_all",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Errors surfaced by persistence adapters.
#[derive(Debug)]
pub enum AdapterError {
    NotFound(TaskId),
    /// Simulated network/backend failure.
    Transport(String),
    Storage(DbError),
    InvalidData(String),
}

impl Display for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored task data: {message}"),
        }
    }
}

impl Error for AdapterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::Transport(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for AdapterError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for AdapterError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

/// Async CRUD surface over the durable task collection.
#[async_trait]
pub trait TaskAdapter: Send + Sync {
    /// Full current collection, in stored order.
    async fn get_all(&self) -> AdapterResult<Vec<Task>>;
    /// Persists a draft and returns it with assigned id and timestamps.
    async fn create(&self, draft: TaskDraft) -> AdapterResult<Task>;
    /// Merges `changes` and returns the updated task.
    async fn update(&self, id: TaskId, changes: TaskPatch) -> AdapterResult<Task>;
    async fn delete(&self, id: TaskId) -> AdapterResult<()>;
}

#[async_trait]
impl<A: TaskAdapter + ?Sized> TaskAdapter for Arc<A> {
    async fn get_all(&self) -> AdapterResult<Vec<Task>> {
        (**self).get_all().await
    }

    async fn create(&self, draft: TaskDraft) -> AdapterResult<Task> {
        (**self).create(draft).await
    }

    async fn update(&self, id: TaskId, changes: TaskPatch) -> AdapterResult<Task> {
        (**self).update(id, changes).await
    }

    async fn delete(&self, id: TaskId) -> AdapterResult<()> {
        (**self).delete(id).await
    }
}
