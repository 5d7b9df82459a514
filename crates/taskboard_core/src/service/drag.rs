//! Drag transition resolver.
//!
//! Maps a drop gesture's raw target id to a target column and delegates the
//! move. Any column may move to any other column; only unresolvable targets
//! and drops onto the current column are rejected, silently.

use super::mutation::{BoardError, MutationController};
use super::notification::Notification;
use crate::adapter::TaskAdapter;
use crate::model::task::{TaskId, TaskStatus};
use crate::store::TaskStore;
use log::debug;
use uuid::Uuid;

/// Where a drag gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// A column's empty area.
    Column(TaskStatus),
    /// Another card; means "join this card's column".
    Task(TaskId),
    Unknown,
}

impl DropTarget {
    /// Column ids win over task ids.
    pub fn parse(raw: &str) -> Self {
        if let Some(status) = TaskStatus::parse(raw) {
            return Self::Column(status);
        }
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Self::Task(id),
            Err(_) => Self::Unknown,
        }
    }
}

/// Resolves the status a drop should move `dragged` to.
///
/// Returns `None` when the dragged task is gone, the target cannot be
/// resolved, or the task already sits in the target column.
pub fn resolve_drop(store: &TaskStore, dragged: TaskId, target: DropTarget) -> Option<TaskStatus> {
    let current = store.get(dragged)?.status;
    let resolved = match target {
        DropTarget::Column(status) => status,
        DropTarget::Task(sibling) => store.get(sibling)?.status,
        DropTarget::Unknown => return None,
    };
    (resolved != current).then_some(resolved)
}

/// Handles a finished drag gesture.
///
/// `Ok(None)` means the drop was a silent no-op: no adapter call, no store change.
pub async fn handle_drop<A: TaskAdapter>(
    controller: &MutationController<A>,
    dragged: TaskId,
    raw_target: &str,
) -> Result<Option<Notification>, BoardError> {
    let target = DropTarget::parse(raw_target);
    let resolved = controller
        .store()
        .read(|store| resolve_drop(store, dragged, target));

    let Some(status) = resolved else {
        debug!("event=drag_drop module=service status=ignored task_id={dragged} target={raw_target}");
        return Ok(None);
    };
    controller.move_task(dragged, status).await.map(Some)
}
