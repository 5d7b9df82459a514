mod common;

use common::{board_fixture, loaded_controller, task, ScriptedAdapter};
use taskboard_core::{
    AdapterOp, BoardError, MutationController, NotificationLevel, SharedStore, StoreError,
    TaskDraft, TaskPatch, TaskPriority, TaskStatus, TaskValidationError,
};
use uuid::Uuid;

#[tokio::test]
async fn load_replaces_store_in_adapter_order() {
    let fixture = board_fixture();
    let (controller, adapter) = loaded_controller(fixture.clone()).await;

    let store = controller.store();
    let ids: Vec<_> = store.read(|store| store.tasks().iter().map(|task| task.id).collect());
    assert_eq!(ids, fixture.iter().map(|task| task.id).collect::<Vec<_>>());
    assert!(!store.read(|store| store.is_loading()));
    assert_eq!(store.read(|store| store.error().map(str::to_string)), None);
    assert_eq!(adapter.calls(AdapterOp::GetAll), 1);
}

#[tokio::test]
async fn load_failure_sets_error_and_reports_once() {
    let adapter = ScriptedAdapter::with_tasks(board_fixture());
    adapter.fail(AdapterOp::GetAll);
    let controller = MutationController::new(adapter.clone(), SharedStore::default());

    let notification = controller.load().await.unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert_eq!(notification.description, "Failed to load tasks");

    let store = controller.store();
    assert!(store.read(|store| store.is_empty()));
    assert!(!store.read(|store| store.is_loading()));
    assert_eq!(
        store.read(|store| store.error().map(str::to_string)),
        Some("Failed to load tasks".to_string())
    );

    adapter.recover(AdapterOp::GetAll);
    assert!(controller.load().await.is_none());
    assert_eq!(store.read(|store| store.len()), 2);
    assert_eq!(store.read(|store| store.error().map(str::to_string)), None);
}

#[tokio::test]
async fn create_inserts_adapter_task_at_the_front() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;

    let mut draft = TaskDraft::new("  Review pull request  ");
    draft.priority = TaskPriority::High;
    draft.description = Some("   ".to_string());
    let notification = controller.create(draft).await.unwrap();

    assert!(notification.is_success());
    assert_eq!(notification.description, "Task created");

    let created = adapter.backend()[0].clone();
    let store = controller.store();
    let first = store.read(|store| store.tasks()[0].clone());
    assert_eq!(first, created);
    assert_eq!(first.title, "Review pull request");
    assert_eq!(first.description, None);
    assert_eq!(store.read(|store| store.len()), 3);
}

#[tokio::test]
async fn blank_title_is_rejected_before_the_adapter() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;
    let revision = controller.store().revision();

    let err = controller.create(TaskDraft::new("   ")).await.unwrap_err();
    assert_eq!(err, BoardError::Validation(TaskValidationError::EmptyTitle));

    let id = adapter.backend()[0].id;
    let patch = TaskPatch {
        title: Some(String::new()),
        ..TaskPatch::default()
    };
    let err = controller.update(id, patch).await.unwrap_err();
    assert_eq!(err, BoardError::Validation(TaskValidationError::EmptyTitle));

    assert_eq!(adapter.calls(AdapterOp::Create), 0);
    assert_eq!(adapter.calls(AdapterOp::Update), 0);
    assert_eq!(controller.store().revision(), revision);
}

#[tokio::test]
async fn failed_create_leaves_store_untouched() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;
    adapter.fail(AdapterOp::Create);
    let before = controller.store().read(|store| store.tasks().to_vec());

    let notification = controller.create(TaskDraft::new("Ship it")).await.unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert_eq!(notification.description, "Failed to save task");
    assert_eq!(controller.store().read(|store| store.tasks().to_vec()), before);
    assert_eq!(adapter.calls(AdapterOp::GetAll), 1);
}

#[tokio::test]
async fn update_replaces_entry_in_place() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;
    let id = adapter.backend()[1].id;

    let patch = TaskPatch {
        title: Some("Deploy to staging".to_string()),
        priority: Some(TaskPriority::High),
        ..TaskPatch::default()
    };
    let notification = controller.update(id, patch).await.unwrap();
    assert_eq!(notification.description, "Task updated");

    let store = controller.store();
    let updated = store.read(|store| store.tasks()[1].clone());
    assert_eq!(updated.id, id);
    assert_eq!(updated.title, "Deploy to staging");
    assert_eq!(updated.priority, TaskPriority::High);
    assert!(updated.updated_at >= updated.created_at);
    assert_eq!(updated, adapter.backend()[1]);
}

#[tokio::test]
async fn failed_update_leaves_store_untouched() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;
    adapter.fail(AdapterOp::Update);
    let before = controller.store().read(|store| store.tasks().to_vec());
    let id = before[0].id;

    let notification = controller
        .update(id, TaskPatch::status(TaskStatus::Done))
        .await
        .unwrap();
    assert_eq!(notification.description, "Failed to save task");
    assert_eq!(controller.store().read(|store| store.tasks().to_vec()), before);
    assert_eq!(adapter.calls(AdapterOp::GetAll), 1);
}

#[tokio::test]
async fn delete_removes_only_after_the_adapter_confirms() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;
    let id = adapter.backend()[0].id;

    adapter.fail(AdapterOp::Delete);
    let notification = controller.delete(id).await.unwrap();
    assert_eq!(notification.description, "Failed to delete task");
    assert!(controller.store().read(|store| store.contains(id)));

    adapter.recover(AdapterOp::Delete);
    let notification = controller.delete(id).await.unwrap();
    assert_eq!(notification.description, "Task deleted");
    assert!(!controller.store().read(|store| store.contains(id)));
    assert_eq!(adapter.backend().len(), 1);
}

#[tokio::test]
async fn delete_of_task_missing_locally_surfaces_store_error() {
    let (controller, adapter) = loaded_controller(Vec::new()).await;
    let ghost = task("Only on the server", TaskStatus::Todo, TaskPriority::Low);
    adapter.push_backend(ghost.clone());

    let err = controller.delete(ghost.id).await.unwrap_err();
    assert_eq!(err, BoardError::Store(StoreError::NotFound(ghost.id)));
    assert!(adapter.backend().is_empty());
}

#[tokio::test]
async fn move_is_visible_before_the_adapter_confirms() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;
    let id = adapter.backend()[0].id;
    let release = adapter.gate_next_update();
    let changes = controller.store().subscribe();

    let moving = controller.move_task(id, TaskStatus::InProgress);
    let observer = async {
        adapter.update_started().await;
        let observed = controller.store().read(|store| store.get(id).map(|task| task.status));
        let published = changes.has_changed().unwrap();
        release.send(()).unwrap();
        (observed, published)
    };
    let (outcome, (observed, published)) = tokio::join!(moving, observer);

    assert_eq!(observed, Some(TaskStatus::InProgress));
    assert!(published);
    let notification = outcome.unwrap();
    assert!(notification.is_success());
    assert_eq!(notification.description, "Moved to In Progress");
    assert_eq!(adapter.backend()[0].status, TaskStatus::InProgress);
}

#[tokio::test]
async fn move_never_moves_updated_at_backwards() {
    let mut fixture = board_fixture();
    fixture[0].updated_at = i64::MAX - 1;
    let (controller, _adapter) = loaded_controller(fixture).await;
    let id = controller.store().read(|store| store.tasks()[0].id);

    controller.move_task(id, TaskStatus::Done).await.unwrap();
    let moved = controller.store().read(|store| store.get(id).cloned()).unwrap();
    assert_eq!(moved.status, TaskStatus::Done);
    assert_eq!(moved.updated_at, i64::MAX - 1);
}

#[tokio::test]
async fn failed_move_resyncs_from_the_adapter() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;
    adapter.fail(AdapterOp::Update);
    let id = adapter.backend()[0].id;

    let notification = controller.move_task(id, TaskStatus::Done).await.unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert_eq!(notification.description, "Failed to move task");
    assert_eq!(adapter.calls(AdapterOp::GetAll), 2);
    assert_eq!(
        controller.store().read(|store| store.get(id).map(|task| task.status)),
        Some(TaskStatus::Todo)
    );
    assert_eq!(controller.store().view(), adapter.backend());
}

#[tokio::test]
async fn failed_move_resync_also_picks_up_foreign_changes() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;
    adapter.fail(AdapterOp::Update);
    let foreign = task("Created in another tab", TaskStatus::Done, TaskPriority::Medium);
    adapter.push_backend(foreign.clone());
    assert!(!controller.store().read(|store| store.contains(foreign.id)));

    let id = adapter.backend()[1].id;
    controller.move_task(id, TaskStatus::Done).await.unwrap();

    assert!(controller.store().read(|store| store.contains(foreign.id)));
    assert_eq!(controller.store().read(|store| store.len()), 3);
}

#[tokio::test]
async fn failed_resync_keeps_optimistic_state_and_sets_error() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;
    adapter.fail(AdapterOp::Update);
    adapter.fail(AdapterOp::GetAll);
    let id = adapter.backend()[0].id;

    let notification = controller.move_task(id, TaskStatus::Done).await.unwrap();
    assert_eq!(notification.description, "Failed to move task");
    assert_eq!(
        controller.store().read(|store| store.get(id).map(|task| task.status)),
        Some(TaskStatus::Done)
    );
    assert_eq!(
        controller.store().read(|store| store.error().map(str::to_string)),
        Some("Failed to load tasks".to_string())
    );
}

#[tokio::test]
async fn move_of_unknown_task_fails_before_the_adapter() {
    let (controller, adapter) = loaded_controller(board_fixture()).await;
    let ghost = Uuid::new_v4();

    let err = controller.move_task(ghost, TaskStatus::Done).await.unwrap_err();
    assert_eq!(err, BoardError::Store(StoreError::NotFound(ghost)));
    assert_eq!(adapter.calls(AdapterOp::Update), 0);
}
