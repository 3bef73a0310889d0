//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{LabelRow, NewLabelRow, NewTaskRow, TaskRow},
    schema::{task_labels, tasks},
};
use crate::storage::PgPool;
use crate::task::{
    domain::{
        Label, LabelId, LabelName, Page, PersistedLabelData, PersistedTaskData, SortField,
        SortOrder, Task, TaskId, TaskQuery, TaskStatus, TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Integer;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

const LABEL_NAME_CONSTRAINT: &str = "task_labels_task_id_name_key";

/// Lifecycle rank used when ordering by status.
const STATUS_RANK_SQL: &str =
    "CASE tasks.status WHEN 'OPEN' THEN 0 WHEN 'IN_PROGRESS' THEN 1 ELSE 2 END";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);
        let label_rows = to_label_rows(task);

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|conn| {
                    diesel::insert_into(tasks::table)
                        .values(&new_row)
                        .execute(conn)?;
                    if !label_rows.is_empty() {
                        diesel::insert_into(task_labels::table)
                            .values(&label_rows)
                            .execute(conn)?;
                    }
                    Ok(())
                })
                .map_err(|err| map_write_error(task_id, err))
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changes = to_new_row(task);
        let label_rows = to_label_rows(task);

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|conn| {
                    let updated = diesel::update(tasks::table.find(task_id.into_inner()))
                        .set(&changes)
                        .execute(conn)?;
                    if updated == 0 {
                        return Err(DieselError::NotFound);
                    }

                    let current_ids: Vec<Uuid> = label_rows.iter().map(|row| row.id).collect();
                    diesel::delete(
                        task_labels::table
                            .filter(task_labels::task_id.eq(task_id.into_inner()))
                            .filter(task_labels::id.ne_all(current_ids)),
                    )
                    .execute(conn)?;

                    if !label_rows.is_empty() {
                        diesel::insert_into(task_labels::table)
                            .values(&label_rows)
                            .on_conflict(task_labels::id)
                            .do_nothing()
                            .execute(conn)?;
                    }
                    Ok(())
                })
                .map_err(|err| map_write_error(task_id, err))
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            // Labels go with the task through `ON DELETE CASCADE`.
            let deleted = diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            let Some(task_row) = row else {
                return Ok(None);
            };
            let mut labels = load_labels(connection, &[task_row.id])?;
            let task_labels = labels.remove(&task_row.id).unwrap_or_default();
            row_to_task(task_row, task_labels).map(Some)
        })
        .await
    }

    async fn find_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_id.eq(owner.into_inner()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            assemble_tasks(connection, rows)
        })
        .await
    }

    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Page<Task>> {
        let criteria = query.clone();
        self.run_blocking(move |connection| {
            let label_matches = if criteria.labels().is_empty() {
                None
            } else {
                Some(task_ids_with_label_fragments(connection, criteria.labels())?)
            };

            let total: i64 = filtered_tasks(&criteria, label_matches.clone())
                .count()
                .get_result(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let total_items = u64::try_from(total).map_err(TaskRepositoryError::persistence)?;

            let offset =
                i64::try_from(criteria.offset()).map_err(TaskRepositoryError::persistence)?;
            let rows = ordered(filtered_tasks(&criteria, label_matches), &criteria)
                .limit(i64::from(criteria.page_size()))
                .offset(offset)
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;

            let items = assemble_tasks(connection, rows)?;
            Ok(Page::new(items, total_items, &criteria))
        })
        .await
    }
}

fn filtered_tasks(
    query: &TaskQuery,
    label_matches: Option<Vec<Uuid>>,
) -> tasks::BoxedQuery<'static, Pg> {
    let mut statement = tasks::table.into_boxed();

    if let Some(status) = query.status() {
        statement = statement.filter(tasks::status.eq(status.as_str()));
    }
    if let Some(search) = query.search() {
        let pattern = contains_pattern(search);
        statement = statement.filter(
            tasks::title
                .ilike(pattern.clone())
                .or(tasks::description.ilike(pattern)),
        );
    }
    if let Some(ids) = label_matches {
        statement = statement.filter(tasks::id.eq_any(ids));
    }
    statement
}

fn ordered(
    statement: tasks::BoxedQuery<'static, Pg>,
    query: &TaskQuery,
) -> tasks::BoxedQuery<'static, Pg> {
    let sorted = match (query.sort_by(), query.sort_order()) {
        (SortField::Title, SortOrder::Asc) => statement.order(tasks::title.asc()),
        (SortField::Title, SortOrder::Desc) => statement.order(tasks::title.desc()),
        (SortField::Description, SortOrder::Asc) => statement.order(tasks::description.asc()),
        (SortField::Description, SortOrder::Desc) => statement.order(tasks::description.desc()),
        (SortField::Status, SortOrder::Asc) => {
            statement.order(sql::<Integer>(STATUS_RANK_SQL).asc())
        }
        (SortField::Status, SortOrder::Desc) => {
            statement.order(sql::<Integer>(STATUS_RANK_SQL).desc())
        }
        (SortField::CreatedAt, SortOrder::Asc) => statement.order(tasks::created_at.asc()),
        (SortField::CreatedAt, SortOrder::Desc) => statement.order(tasks::created_at.desc()),
        (SortField::UpdatedAt, SortOrder::Asc) => statement.order(tasks::updated_at.asc()),
        (SortField::UpdatedAt, SortOrder::Desc) => statement.order(tasks::updated_at.desc()),
    };
    sorted.then_order_by(tasks::id.asc())
}

/// Returns ids of tasks carrying a label that contains any of `fragments`.
fn task_ids_with_label_fragments(
    connection: &mut PgConnection,
    fragments: &[String],
) -> TaskRepositoryResult<Vec<Uuid>> {
    let mut ids = BTreeSet::new();
    for fragment in fragments {
        let matched = task_labels::table
            .filter(task_labels::name.ilike(contains_pattern(fragment)))
            .select(task_labels::task_id)
            .distinct()
            .load::<Uuid>(connection)
            .map_err(TaskRepositoryError::persistence)?;
        ids.extend(matched);
    }
    Ok(ids.into_iter().collect())
}

fn contains_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn load_labels(
    connection: &mut PgConnection,
    task_ids: &[Uuid],
) -> TaskRepositoryResult<HashMap<Uuid, Vec<Label>>> {
    let rows = task_labels::table
        .filter(task_labels::task_id.eq_any(task_ids.to_vec()))
        .order((task_labels::created_at.asc(), task_labels::id.asc()))
        .select(LabelRow::as_select())
        .load::<LabelRow>(connection)
        .map_err(TaskRepositoryError::persistence)?;

    let mut grouped: HashMap<Uuid, Vec<Label>> = HashMap::new();
    for row in rows {
        let task_id = row.task_id;
        grouped.entry(task_id).or_default().push(row_to_label(row)?);
    }
    Ok(grouped)
}

fn assemble_tasks(
    connection: &mut PgConnection,
    rows: Vec<TaskRow>,
) -> TaskRepositoryResult<Vec<Task>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut labels = load_labels(connection, &ids)?;
    rows.into_iter()
        .map(|row| {
            let task_labels = labels.remove(&row.id).unwrap_or_default();
            row_to_task(row, task_labels)
        })
        .collect()
}

fn map_write_error(task_id: TaskId, err: DieselError) -> TaskRepositoryError {
    match err {
        DieselError::NotFound => TaskRepositoryError::NotFound(task_id),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_label_name_unique_violation(info.as_ref()) =>
        {
            TaskRepositoryError::DuplicateLabel(task_id)
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TaskRepositoryError::DuplicateTask(task_id)
        }
        _ => TaskRepositoryError::persistence(err),
    }
}

fn is_label_name_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name() == Some(LABEL_NAME_CONSTRAINT)
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        owner_id: task.owner().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn to_label_rows(task: &Task) -> Vec<NewLabelRow> {
    let task_id = task.id().into_inner();
    task.labels()
        .iter()
        .map(|label| NewLabelRow {
            id: label.id().into_inner(),
            task_id,
            name: label.name().as_str().to_owned(),
            created_at: label.created_at(),
            updated_at: label.updated_at(),
        })
        .collect()
}

fn row_to_label(row: LabelRow) -> TaskRepositoryResult<Label> {
    let name = LabelName::new(row.name).map_err(TaskRepositoryError::persistence)?;
    Ok(Label::from_persisted(PersistedLabelData {
        id: LabelId::from_uuid(row.id),
        name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_task(row: TaskRow, labels: Vec<Label>) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title: persisted_title,
        description,
        status: persisted_status,
        owner_id,
        created_at,
        updated_at,
    } = row;

    let title = TaskTitle::new(persisted_title).map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        description,
        status,
        owner: UserId::from_uuid(owner_id),
        labels,
        created_at,
        updated_at,
    }))
}
