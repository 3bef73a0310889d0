//! Storage constraint tests for [`InMemoryTaskRepository`].

use crate::in_memory::helpers::{Board, board};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use taskboard::{
    task::{
        domain::{
            Label, LabelId, LabelName, PersistedLabelData, PersistedTaskData, Task, TaskId,
            TaskStatus, TaskTitle,
        },
        ports::{TaskRepository, TaskRepositoryError},
    },
    user::domain::UserId,
};

fn label(name: &str) -> Label {
    let timestamp = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).single().unwrap_or_default();
    Label::from_persisted(PersistedLabelData {
        id: LabelId::new(),
        name: LabelName::new(name).expect("valid label name"),
        created_at: timestamp,
        updated_at: timestamp,
    })
}

fn task_with_labels(labels: Vec<Label>) -> Task {
    let timestamp = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).single().unwrap_or_default();
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        title: TaskTitle::new("Imported").expect("valid title"),
        description: String::from("Loaded from a fixture"),
        status: TaskStatus::Open,
        owner: UserId::new(),
        labels,
        created_at: timestamp,
        updated_at: timestamp,
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_label_names_on_one_task_are_rejected(board: Board) {
    let task = task_with_labels(vec![label("ops"), label("ops")]);

    let result = board.task_repository.store(&task).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateLabel(id)) if id == task.id()
    ));
    assert!(
        board
            .task_repository
            .find_by_id(task.id())
            .await
            .expect("lookup should succeed")
            .is_none()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_label_name_on_different_tasks_is_allowed(board: Board) {
    board
        .task_repository
        .store(&task_with_labels(vec![label("ops")]))
        .await
        .expect("first task should store");
    board
        .task_repository
        .store(&task_with_labels(vec![label("ops")]))
        .await
        .expect("second task should store");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn storing_the_same_task_twice_is_rejected(board: Board) {
    let task = task_with_labels(Vec::new());
    board
        .task_repository
        .store(&task)
        .await
        .expect("first store should succeed");

    let result = board.task_repository.store(&task).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updating_a_missing_task_reports_not_found(board: Board) {
    let task = task_with_labels(Vec::new());

    let result = board.task_repository.update(&task).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::NotFound(id)) if id == task.id()
    ));
}
