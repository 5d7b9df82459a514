#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use taskboard_core::{
    AdapterError, AdapterOp, AdapterResult, MutationController, SharedStore, Task, TaskAdapter,
    TaskDraft, TaskId, TaskPatch, TaskPriority, TaskStatus,
};
use tokio::sync::{oneshot, Notify};
use uuid::Uuid;

/// In-memory adapter double with scripted failures and a pausable `update`.
#[derive(Default)]
pub struct ScriptedAdapter {
    backend: Mutex<Vec<Task>>,
    failing: Mutex<HashSet<AdapterOp>>,
    calls: Mutex<HashMap<AdapterOp, usize>>,
    update_gate: Mutex<Option<oneshot::Receiver<()>>>,
    update_started: Notify,
    clock: Mutex<i64>,
}

impl ScriptedAdapter {
    pub fn with_tasks(tasks: Vec<Task>) -> Arc<Self> {
        let adapter = Self::default();
        *adapter.backend.lock() = tasks;
        *adapter.clock.lock() = 10_000;
        Arc::new(adapter)
    }

    /// Every later call of `op` fails with a transport error.
    pub fn fail(&self, op: AdapterOp) {
        self.failing.lock().insert(op);
    }

    pub fn recover(&self, op: AdapterOp) {
        self.failing.lock().remove(&op);
    }

    pub fn calls(&self, op: AdapterOp) -> usize {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    /// Holds the next `update` until the returned sender fires.
    pub fn gate_next_update(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.update_gate.lock() = Some(rx);
        tx
    }

    /// Resolves once an `update` call has started.
    pub async fn update_started(&self) {
        self.update_started.notified().await;
    }

    pub fn backend(&self) -> Vec<Task> {
        self.backend.lock().clone()
    }

    /// Simulates a change made elsewhere, behind the client's back.
    pub fn push_backend(&self, task: Task) {
        self.backend.lock().insert(0, task);
    }

    fn enter(&self, op: AdapterOp) -> AdapterResult<()> {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        if self.failing.lock().contains(&op) {
            return Err(AdapterError::Transport(format!("scripted {} failure", op.as_str())));
        }
        Ok(())
    }

    fn tick(&self) -> i64 {
        let mut clock = self.clock.lock();
        *clock += 1_000;
        *clock
    }
}

#[async_trait]
impl TaskAdapter for ScriptedAdapter {
    async fn get_all(&self) -> AdapterResult<Vec<Task>> {
        self.enter(AdapterOp::GetAll)?;
        Ok(self.backend())
    }

    async fn create(&self, draft: TaskDraft) -> AdapterResult<Task> {
        self.enter(AdapterOp::Create)?;
        let task = Task::from_draft(Uuid::new_v4(), draft, self.tick());
        self.backend.lock().insert(0, task.clone());
        Ok(task)
    }

    async fn update(&self, id: TaskId, changes: TaskPatch) -> AdapterResult<Task> {
        *self.calls.lock().entry(AdapterOp::Update).or_insert(0) += 1;
        self.update_started.notify_one();
        let gate = self.update_gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.failing.lock().contains(&AdapterOp::Update) {
            return Err(AdapterError::Transport("scripted update failure".to_string()));
        }

        let now = self.tick();
        let mut backend = self.backend.lock();
        let task = backend
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(AdapterError::NotFound(id))?;
        task.apply_patch(&changes, now);
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> AdapterResult<()> {
        self.enter(AdapterOp::Delete)?;
        let mut backend = self.backend.lock();
        let index = backend
            .iter()
            .position(|task| task.id == id)
            .ok_or(AdapterError::NotFound(id))?;
        backend.remove(index);
        Ok(())
    }
}

pub fn task(title: &str, status: TaskStatus, priority: TaskPriority) -> Task {
    let mut draft = TaskDraft::new(title);
    draft.status = status;
    draft.priority = priority;
    Task::from_draft(Uuid::new_v4(), draft, 1_000)
}

/// "Write unit tests" (todo, medium) and "Deploy to production" (todo, low).
pub fn board_fixture() -> Vec<Task> {
    let mut tests = task("Write unit tests", TaskStatus::Todo, TaskPriority::Medium);
    tests.description = Some("Add tests for core components and utilities".to_string());
    let mut deploy = task("Deploy to production", TaskStatus::Todo, TaskPriority::Low);
    deploy.description = Some("Deploy application to production servers".to_string());
    vec![tests, deploy]
}

/// Controller loaded from a scripted adapter seeded with `tasks`.
pub async fn loaded_controller(
    tasks: Vec<Task>,
) -> (MutationController<Arc<ScriptedAdapter>>, Arc<ScriptedAdapter>) {
    let adapter = ScriptedAdapter::with_tasks(tasks);
    let controller = MutationController::new(adapter.clone(), SharedStore::default());
    assert!(controller.load().await.is_none());
    (controller, adapter)
}
