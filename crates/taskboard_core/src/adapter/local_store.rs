//! Simulated network API persisting to a local key/value store.
//!
//! # Responsibility
//! - Keep the whole task collection as one JSON document under `tasks-db`.
//! - Simulate request latency and transport failures.
//!
//! # Invariants
//! - The first `get_all` on an empty store seeds the demo tasks.
//! - Writes on a missing document start from an empty collection.
//! - Read paths reject invalid persisted tasks instead of masking them.
//! - Each call reads and rewrites the document under one lock and one
//!   transaction; concurrent calls never lose each other's writes.
//! - The connection lock is never held across an await point.

use super::fault::FaultInjector;
use super::seed::{seed_tasks, TASKS_STORAGE_KEY};
use super::{AdapterError, AdapterOp, AdapterResult, TaskAdapter};
use crate::config::AdapterConfig;
use crate::db::{open_db, open_db_in_memory};
use crate::model::task::{now_epoch_ms, Task, TaskDraft, TaskId, TaskPatch};
use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// Persistence adapter backed by the SQLite `local_storage` table.
pub struct LocalStoreAdapter {
    conn: Mutex<Connection>,
    config: AdapterConfig,
    faults: FaultInjector,
}

impl LocalStoreAdapter {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection, config: AdapterConfig) -> Self {
        let faults = FaultInjector::new(config.failure_rate);
        Self {
            conn: Mutex::new(conn),
            config,
            faults,
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>, config: AdapterConfig) -> AdapterResult<Self> {
        Ok(Self::new(open_db(path)?, config))
    }

    pub fn in_memory(config: AdapterConfig) -> AdapterResult<Self> {
        Ok(Self::new(open_db_in_memory()?, config))
    }

    /// Fault schedule and call counters.
    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Overwrites the stored collection, bypassing latency and faults.
    pub fn store_tasks(&self, tasks: &[Task]) -> AdapterResult<()> {
        write_document(&self.conn.lock(), tasks)
    }

    /// Reads the stored collection without seeding, latency or faults.
    pub fn stored_tasks(&self) -> AdapterResult<Option<Vec<Task>>> {
        read_document(&self.conn.lock())
    }

    async fn simulate(&self, op: AdapterOp) -> AdapterResult<()> {
        let latency = match op {
            AdapterOp::GetAll => self.config.list_latency(),
            AdapterOp::Create | AdapterOp::Update | AdapterOp::Delete => {
                self.config.write_latency()
            }
        };
        if latency > Duration::ZERO {
            tokio::time::sleep(latency).await;
        }
        self.faults.check(op).inspect_err(|err| {
            warn!(
                "event=adapter_call module=adapter status=error op={} error={}",
                op.as_str(),
                err
            );
        })
    }

    /// Runs one read-modify-write of the stored document.
    ///
    /// The connection lock and an immediate transaction are held for the whole
    /// closure, so concurrent writers cannot overwrite each other's changes.
    fn with_document<T>(
        &self,
        f: impl FnOnce(&Connection, Option<Vec<Task>>) -> AdapterResult<T>,
    ) -> AdapterResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = read_document(&tx)?;
        let result = f(&tx, current)?;
        tx.commit()?;
        Ok(result)
    }

    fn load_or_seed(&self) -> AdapterResult<Vec<Task>> {
        self.with_document(|conn, current| {
            if let Some(tasks) = current {
                return Ok(tasks);
            }
            let seeded = seed_tasks();
            write_document(conn, &seeded)?;
            debug!(
                "event=adapter_seed module=adapter status=ok count={}",
                seeded.len()
            );
            Ok(seeded)
        })
    }

    fn create_now(&self, draft: TaskDraft) -> AdapterResult<Task> {
        self.with_document(|conn, current| {
            let mut tasks = current.unwrap_or_default();
            let task = Task::from_draft(Uuid::new_v4(), draft, now_epoch_ms());
            tasks.insert(0, task.clone());
            write_document(conn, &tasks)?;
            Ok(task)
        })
    }

    fn update_now(&self, id: TaskId, changes: &TaskPatch) -> AdapterResult<Task> {
        self.with_document(|conn, current| {
            let mut tasks = current.unwrap_or_default();
            let task = tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or(AdapterError::NotFound(id))?;
            task.apply_patch(changes, now_epoch_ms());
            let updated = task.clone();
            write_document(conn, &tasks)?;
            Ok(updated)
        })
    }

    fn delete_now(&self, id: TaskId) -> AdapterResult<()> {
        self.with_document(|conn, current| {
            let mut tasks = current.unwrap_or_default();
            let index = tasks
                .iter()
                .position(|task| task.id == id)
                .ok_or(AdapterError::NotFound(id))?;
            tasks.remove(index);
            write_document(conn, &tasks)
        })
    }
}

fn read_document(conn: &Connection) -> AdapterResult<Option<Vec<Task>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM local_storage WHERE storage_key = ?1;",
            [TASKS_STORAGE_KEY],
            |row| row.get(0),
        )
        .optional()?;

    let Some(raw) = raw else {
        return Ok(None);
    };
    let tasks: Vec<Task> = serde_json::from_str(&raw)
        .map_err(|err| AdapterError::InvalidData(format!("`{TASKS_STORAGE_KEY}`: {err}")))?;
    for task in &tasks {
        task.validate()
            .map_err(|err| AdapterError::InvalidData(format!("task {}: {err}", task.id)))?;
    }
    Ok(Some(tasks))
}

fn write_document(conn: &Connection, tasks: &[Task]) -> AdapterResult<()> {
    let raw =
        serde_json::to_string(tasks).map_err(|err| AdapterError::InvalidData(err.to_string()))?;
    conn.execute(
        "INSERT INTO local_storage (storage_key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(storage_key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![TASKS_STORAGE_KEY, raw, now_epoch_ms()],
    )?;
    Ok(())
}

#[async_trait]
impl TaskAdapter for LocalStoreAdapter {
    async fn get_all(&self) -> AdapterResult<Vec<Task>> {
        self.simulate(AdapterOp::GetAll).await?;
        self.load_or_seed()
    }

    async fn create(&self, draft: TaskDraft) -> AdapterResult<Task> {
        self.simulate(AdapterOp::Create).await?;
        self.create_now(draft)
    }

    async fn update(&self, id: TaskId, changes: TaskPatch) -> AdapterResult<Task> {
        self.simulate(AdapterOp::Update).await?;
        self.update_now(id, &changes)
    }

    async fn delete(&self, id: TaskId) -> AdapterResult<()> {
        self.simulate(AdapterOp::Delete).await?;
        self.delete_now(id)
    }
}

#[cfg(test)]
mod tests {
    use super::LocalStoreAdapter;
    use crate::adapter::{seed_tasks, AdapterError, AdapterOp, TaskAdapter};
    use crate::config::AdapterConfig;
    use crate::model::task::{TaskDraft, TaskPatch, TaskStatus};
    use uuid::Uuid;

    fn adapter() -> LocalStoreAdapter {
        LocalStoreAdapter::in_memory(AdapterConfig::instant()).unwrap()
    }

    #[tokio::test]
    async fn first_get_all_seeds_demo_tasks() {
        let adapter = adapter();
        assert!(adapter.stored_tasks().unwrap().is_none());

        let tasks = adapter.get_all().await.unwrap();
        assert_eq!(tasks, seed_tasks());
        assert_eq!(adapter.stored_tasks().unwrap().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn create_on_missing_document_starts_empty() {
        let adapter = adapter();
        let created = adapter.create(TaskDraft::new("solo")).await.unwrap();

        assert!(!created.id.is_nil());
        assert_eq!(created.created_at, created.updated_at);
        let stored = adapter.stored_tasks().unwrap().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, created.id);
    }

    #[tokio::test]
    async fn create_inserts_newest_first() {
        let adapter = adapter();
        adapter.get_all().await.unwrap();
        let created = adapter.create(TaskDraft::new("newest")).await.unwrap();

        let tasks = adapter.get_all().await.unwrap();
        assert_eq!(tasks[0].id, created.id);
        assert_eq!(tasks.len(), 8);
    }

    #[tokio::test]
    async fn update_merges_patch_and_refreshes_timestamp() {
        let adapter = adapter();
        let original = adapter.get_all().await.unwrap().remove(4);

        let updated = adapter
            .update(original.id, TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.title, original.title);
        assert!(updated.updated_at >= original.updated_at);
    }

    #[tokio::test]
    async fn unknown_ids_fail_with_not_found() {
        let adapter = adapter();
        let ghost = Uuid::new_v4();

        let err = adapter
            .update(ghost, TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::NotFound(id) if id == ghost));

        let err = adapter.delete(ghost).await.unwrap_err();
        assert!(matches!(err, AdapterError::NotFound(id) if id == ghost));
    }

    #[tokio::test]
    async fn injected_failure_leaves_document_untouched() {
        let adapter = adapter();
        let tasks = adapter.get_all().await.unwrap();
        adapter.faults().fail_next(AdapterOp::Delete);

        let err = adapter.delete(tasks[0].id).await.unwrap_err();
        assert!(matches!(err, AdapterError::Transport(_)));
        assert_eq!(adapter.stored_tasks().unwrap().unwrap(), tasks);
        assert_eq!(adapter.faults().calls(AdapterOp::Delete), 1);
    }

    #[tokio::test]
    async fn corrupt_document_is_rejected() {
        let adapter = adapter();
        adapter
            .conn
            .lock()
            .execute(
                "INSERT INTO local_storage (storage_key, value) VALUES ('tasks-db', '{oops');",
                [],
            )
            .unwrap();

        let err = adapter.get_all().await.unwrap_err();
        assert!(matches!(err, AdapterError::InvalidData(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn calls_wait_for_configured_latency() {
        let adapter = LocalStoreAdapter::in_memory(AdapterConfig::default()).unwrap();
        let started = tokio::time::Instant::now();
        adapter.get_all().await.unwrap();
        assert!(started.elapsed() >= std::time::Duration::from_millis(300));
    }
}
