//! `PostgreSQL` tests for task persistence, label rows, and listing.

use mockable::DefaultClock;
use rstest::rstest;
use taskboard::task::{
    domain::{LabelName, SortField, SortOrder, Task, TaskQuery, TaskStatus, TaskUpdate},
    ports::{TaskRepository, TaskRepositoryError},
};

use crate::postgres::helpers::{BoxError, PostgresContext, context, label, task};

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|item| item.title().as_str()).collect()
}

fn label_names(task: &Task) -> Vec<&str> {
    task.labels()
        .iter()
        .map(|item| item.name().as_str())
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_store_round_trips_task_with_labels(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let owner = ctx.owner("grace@example.com").await?;
    let stored = task(
        owner.id(),
        "Write docs",
        TaskStatus::InProgress,
        vec![label("docs", 0), label("API", 1)],
        0,
    );

    ctx.tasks.store(&stored).await?;
    let fetched = ctx.tasks.find_by_id(stored.id()).await?;

    assert_eq!(fetched, Some(stored));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_update_keeps_surviving_label_rows_and_deletes_dropped_ones(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let owner = ctx.owner("grace@example.com").await?;
    let mut stored = task(
        owner.id(),
        "Learn NestJS",
        TaskStatus::Open,
        vec![label("course", 0), label("NestJS", 1)],
        0,
    );
    ctx.tasks.store(&stored).await?;
    let nest_id = stored
        .labels()
        .iter()
        .find(|item| item.name().as_str() == "NestJS")
        .map(|item| item.id())
        .ok_or("NestJS label missing")?;

    stored.apply_update(
        TaskUpdate {
            labels: Some(LabelName::parse_all(["nestjs", "important"])?),
            ..TaskUpdate::default()
        },
        &DefaultClock,
    )?;
    ctx.tasks.update(&stored).await?;

    let fetched = ctx
        .tasks
        .find_by_id(stored.id())
        .await?
        .ok_or("updated task missing")?;
    assert_eq!(label_names(&fetched), ["NestJS", "important"]);
    assert_eq!(
        fetched
            .labels()
            .iter()
            .find(|item| item.name().as_str() == "NestJS")
            .map(|item| item.id()),
        Some(nest_id)
    );
    assert_eq!(ctx.label_rows(stored.id()).await?, 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_clearing_labels_removes_every_label_row(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let owner = ctx.owner("grace@example.com").await?;
    let mut stored = task(
        owner.id(),
        "Tidy up",
        TaskStatus::Open,
        vec![label("chore", 0), label("later", 1)],
        0,
    );
    ctx.tasks.store(&stored).await?;

    stored.apply_update(
        TaskUpdate {
            labels: Some(Vec::new()),
            ..TaskUpdate::default()
        },
        &DefaultClock,
    )?;
    ctx.tasks.update(&stored).await?;

    assert_eq!(ctx.label_rows(stored.id()).await?, 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_delete_cascades_to_label_rows(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let owner = ctx.owner("grace@example.com").await?;
    let stored = task(
        owner.id(),
        "Short lived",
        TaskStatus::Open,
        vec![label("temp", 0), label("scratch", 1)],
        0,
    );
    ctx.tasks.store(&stored).await?;
    assert_eq!(ctx.label_rows(stored.id()).await?, 2);

    ctx.tasks.delete(stored.id()).await?;

    assert_eq!(ctx.label_rows(stored.id()).await?, 0);
    assert_eq!(ctx.tasks.find_by_id(stored.id()).await?, None);
    assert!(matches!(
        ctx.tasks.delete(stored.id()).await,
        Err(TaskRepositoryError::NotFound(id)) if id == stored.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_duplicate_label_names_are_rejected_atomically(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let owner = ctx.owner("grace@example.com").await?;
    let clashing = task(
        owner.id(),
        "Clashing labels",
        TaskStatus::Open,
        vec![label("urgent", 0), label("urgent", 1)],
        0,
    );

    let result = ctx.tasks.store(&clashing).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateLabel(id)) if id == clashing.id()
    ));
    assert_eq!(ctx.tasks.find_by_id(clashing.id()).await?, None);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_update_of_unknown_task_is_not_found(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let owner = ctx.owner("grace@example.com").await?;
    let never_stored = task(owner.id(), "Ghost", TaskStatus::Open, Vec::new(), 0);

    let result = ctx.tasks.update(&never_stored).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::NotFound(id)) if id == never_stored.id()
    ));
    Ok(())
}

#[rstest]
#[case(SortOrder::Asc, ["Bravo", "Charlie", "Alpha"])]
#[case(SortOrder::Desc, ["Alpha", "Charlie", "Bravo"])]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_status_sort_follows_lifecycle_order(
    #[future] context: Result<PostgresContext, BoxError>,
    #[case] order: SortOrder,
    #[case] expected: [&str; 3],
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let owner = ctx.owner("grace@example.com").await?;
    for stored in [
        task(owner.id(), "Alpha", TaskStatus::Done, Vec::new(), 0),
        task(owner.id(), "Bravo", TaskStatus::Open, Vec::new(), 1),
        task(owner.id(), "Charlie", TaskStatus::InProgress, Vec::new(), 2),
    ] {
        ctx.tasks.store(&stored).await?;
    }

    let page = ctx
        .tasks
        .list(&TaskQuery::new().with_sort(SortField::Status, order))
        .await?;

    assert_eq!(titles(page.items()), expected);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_label_fragment_filter_matches_any_label_and_paginates(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let owner = ctx.owner("grace@example.com").await?;
    for stored in [
        task(
            owner.id(),
            "Server",
            TaskStatus::Open,
            vec![label("Backend-API", 0)],
            0,
        ),
        task(
            owner.id(),
            "Client",
            TaskStatus::Open,
            vec![label("frontend", 1), label("ui", 2)],
            1,
        ),
        task(owner.id(), "Guide", TaskStatus::Open, vec![label("docs", 2)], 2),
    ] {
        ctx.tasks.store(&stored).await?;
    }

    let query = TaskQuery::new()
        .with_labels(["END"])
        .with_sort(SortField::CreatedAt, SortOrder::Asc)
        .with_page_size(1)?
        .with_page(2)?;
    let page = ctx.tasks.list(&query).await?;

    assert_eq!(page.total_items(), 2);
    assert_eq!(page.total_pages(), 2);
    assert_eq!(titles(page.items()), ["Client"]);
    assert_eq!(
        page.items().first().map(label_names),
        Some(vec!["frontend", "ui"])
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_search_treats_wildcards_literally(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let owner = ctx.owner("grace@example.com").await?;
    for stored in [
        task(owner.id(), "Reach 100% coverage", TaskStatus::Open, Vec::new(), 0),
        task(owner.id(), "File 1000 reports", TaskStatus::Open, Vec::new(), 1),
        task(owner.id(), "Rename snake_case", TaskStatus::Open, Vec::new(), 2),
        task(owner.id(), "Rename snakeXcase", TaskStatus::Open, Vec::new(), 3),
    ] {
        ctx.tasks.store(&stored).await?;
    }

    let percent = ctx
        .tasks
        .list(&TaskQuery::new().with_search("0%"))
        .await?;
    let underscore = ctx
        .tasks
        .list(&TaskQuery::new().with_search("e_c"))
        .await?;

    assert_eq!(titles(percent.items()), ["Reach 100% coverage"]);
    assert_eq!(titles(underscore.items()), ["Rename snake_case"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_find_by_owner_returns_owned_tasks_oldest_first(
    #[future] context: Result<PostgresContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let grace = ctx.owner("grace@example.com").await?;
    let ada = ctx.owner("ada@example.com").await?;
    for stored in [
        task(grace.id(), "Second", TaskStatus::Open, Vec::new(), 5),
        task(ada.id(), "Not mine", TaskStatus::Open, Vec::new(), 1),
        task(grace.id(), "First", TaskStatus::Done, Vec::new(), 0),
    ] {
        ctx.tasks.store(&stored).await?;
    }

    let owned = ctx.tasks.find_by_owner(grace.id()).await?;

    assert_eq!(titles(&owned), ["First", "Second"]);
    Ok(())
}
