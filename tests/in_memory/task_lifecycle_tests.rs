//! In-memory integration tests for task lifecycle operations.

use crate::in_memory::helpers::{Board, board, label_names};
use eyre::ensure;
use rstest::rstest;
use taskboard::task::{
    domain::{SortField, SortOrder, TaskDomainError, TaskQuery, TaskStatus},
    services::{CreateTaskRequest, TaskLifecycleError, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_walks_forward_through_every_status(board: Board) -> eyre::Result<()> {
    let owner = board.register("Grace Hopper", "grace@example.com").await?;
    let created = board
        .tasks
        .create_task(CreateTaskRequest::new(
            "Ship compiler",
            "Finish the A-0 system",
            owner.id(),
        ))
        .await?;
    ensure!(created.status() == TaskStatus::Open);

    let started = board
        .tasks
        .update_task(
            created.id(),
            UpdateTaskRequest::new().with_status(TaskStatus::InProgress),
        )
        .await?;
    let finished = board
        .tasks
        .update_task(
            started.id(),
            UpdateTaskRequest::new().with_status(TaskStatus::Done),
        )
        .await?;
    ensure!(finished.status() == TaskStatus::Done);

    let reopened = board
        .tasks
        .update_task(
            finished.id(),
            UpdateTaskRequest::new().with_status(TaskStatus::Open),
        )
        .await;
    ensure!(matches!(
        reopened,
        Err(TaskLifecycleError::Domain(
            TaskDomainError::InvalidStatusTransition
        ))
    ));

    let stored = board.tasks.find_by_id(created.id()).await?;
    ensure!(stored.map(|task| task.status()) == Some(TaskStatus::Done));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn label_updates_keep_surviving_label_identity(board: Board) -> eyre::Result<()> {
    let owner = board.register("Grace Hopper", "grace@example.com").await?;
    let created = board
        .tasks
        .create_task(
            CreateTaskRequest::new("Write docs", "Document the API", owner.id())
                .with_labels(["docs", "api", "Docs"]),
        )
        .await?;
    ensure!(label_names(&created) == vec!["docs", "api"]);
    let docs_id = created
        .labels()
        .first()
        .map(|label| label.id())
        .ok_or_else(|| eyre::eyre!("expected a docs label"))?;

    let updated = board
        .tasks
        .update_task(
            created.id(),
            UpdateTaskRequest::new().with_labels([" DOCS ", "release"]),
        )
        .await?;

    ensure!(label_names(&updated) == vec!["docs", "release"]);
    ensure!(updated.labels().first().map(|label| label.id()) == Some(docs_id));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_and_remove_labels_round_trip_through_storage(board: Board) -> eyre::Result<()> {
    let owner = board.register("Grace Hopper", "grace@example.com").await?;
    let created = board
        .tasks
        .create_task(
            CreateTaskRequest::new("Triage", "Sort incoming bugs", owner.id())
                .with_labels(["bug"]),
        )
        .await?;

    board
        .tasks
        .add_labels(created.id(), ["urgent", "BUG", "backend"])
        .await?;
    let after_remove = board
        .tasks
        .remove_labels(created.id(), ["Urgent", "missing"])
        .await?;
    ensure!(label_names(&after_remove) == vec!["bug", "backend"]);

    let stored = board
        .tasks
        .find_by_id(created.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should still exist"))?;
    ensure!(stored == after_remove);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_filters_and_pages_across_owners(board: Board) -> eyre::Result<()> {
    let grace = board.register("Grace Hopper", "grace@example.com").await?;
    let ada = board.register("Ada Lovelace", "ada@example.com").await?;

    for (title, owner, label) in [
        ("Alpha report", grace.id(), "report"),
        ("Beta report", ada.id(), "report"),
        ("Gamma fix", grace.id(), "bugfix"),
        ("Delta report", ada.id(), "weekly-report"),
    ] {
        board
            .tasks
            .create_task(
                CreateTaskRequest::new(title, "Quarterly numbers", owner).with_labels([label]),
            )
            .await?;
    }

    let query = TaskQuery::new()
        .with_labels(["REPORT"])
        .with_sort(SortField::Title, SortOrder::Desc)
        .with_page_size(2)?
        .with_page(2)?;
    let page = board.tasks.list_tasks(&query).await?;

    ensure!(page.total_items() == 3);
    ensure!(page.total_pages() == 2);
    let titles: Vec<&str> = page.items().iter().map(|task| task.title().as_str()).collect();
    ensure!(titles == vec!["Alpha report"]);

    let owned_by_grace = board.tasks.find_by_owner(grace.id()).await?;
    ensure!(owned_by_grace.len() == 2);
    ensure!(owned_by_grace.iter().all(|task| task.owner() == grace.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassigning_to_another_user_moves_ownership(board: Board) -> eyre::Result<()> {
    let grace = board.register("Grace Hopper", "grace@example.com").await?;
    let ada = board.register("Ada Lovelace", "ada@example.com").await?;
    let created = board
        .tasks
        .create_task(CreateTaskRequest::new("Handover", "Pass it on", grace.id()))
        .await?;

    board
        .tasks
        .update_task(created.id(), UpdateTaskRequest::new().with_owner(ada.id()))
        .await?;

    ensure!(board.tasks.find_by_owner(grace.id()).await?.is_empty());
    ensure!(board.tasks.find_by_owner(ada.id()).await?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_task_disappears_from_listings(board: Board) -> eyre::Result<()> {
    let owner = board.register("Grace Hopper", "grace@example.com").await?;
    let created = board
        .tasks
        .create_task(CreateTaskRequest::new("Scratch", "Throwaway", owner.id()))
        .await?;

    board.tasks.delete_task(created.id()).await?;

    let page = board.tasks.list_tasks(&TaskQuery::new()).await?;
    ensure!(page.total_items() == 0);
    ensure!(page.total_pages() == 0);
    ensure!(matches!(
        board.tasks.delete_task(created.id()).await,
        Err(TaskLifecycleError::TaskNotFound(id)) if id == created.id()
    ));
    Ok(())
}
