//! Service layer for task creation, updates, labels, and listing.

use crate::task::{
    domain::{
        LabelName, Page, Task, TaskDomainError, TaskDraft, TaskId, TaskQuery, TaskStatus,
        TaskTitle, TaskUpdate,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use crate::user::{
    domain::UserId,
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: String,
    owner: UserId,
    status: Option<TaskStatus>,
    labels: Vec<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required task fields.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>, owner: UserId) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            owner,
            status: None,
            labels: Vec::new(),
        }
    }

    /// Sets the initial status. Defaults to [`TaskStatus::Open`].
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the initial label names.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }
}

/// Request payload for a partial task update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
    owner: Option<UserId>,
    labels: Option<Vec<String>>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Requests a status change.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Reassigns the task.
    #[must_use]
    pub const fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the desired label names.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    fn into_update(self) -> Result<TaskUpdate, TaskDomainError> {
        Ok(TaskUpdate {
            title: self.title.map(TaskTitle::new).transpose()?,
            description: self.description,
            status: self.status,
            owner: self.owner,
            labels: self.labels.map(LabelName::parse_all).transpose()?,
        })
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// User repository lookup failed.
    #[error(transparent)]
    UserRepository(#[from] UserRepositoryError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The referenced owner does not exist.
    #[error("user not found: {0}")]
    OwnerNotFound(UserId),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<R, U, C>
where
    R: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    users: Arc<U>,
    clock: Arc<C>,
}

impl<R, U, C> Clone for TaskLifecycleService<R, U, C>
where
    R: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            users: Arc::clone(&self.users),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, U, C> TaskLifecycleService<R, U, C>
where
    R: TaskRepository + ?Sized,
    U: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            repository,
            users,
            clock,
        }
    }

    /// Creates a task owned by an existing user.
    ///
    /// Repeated label names collapse to a single label.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when validation fails,
    /// [`TaskLifecycleError::OwnerNotFound`] when the owner does not exist, or
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let CreateTaskRequest {
            title,
            description,
            owner,
            status,
            labels,
        } = request;

        let draft = TaskDraft::new(TaskTitle::new(title)?, description, owner)?
            .with_status(status.unwrap_or_default())
            .with_labels(LabelName::parse_all(labels)?);
        self.ensure_owner_exists(draft.owner()).await?;

        let task = Task::create(draft, &*self.clock);
        self.repository.store(&task).await?;
        info!(task_id = %task.id(), owner = %task.owner(), "created task");
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_id(&self, id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Applies a partial update to a task.
    ///
    /// The task is loaded first, then a backwards status change is rejected
    /// before the remaining fields are validated or the owner is looked up.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::OwnerNotFound`],
    /// [`TaskLifecycleError::Domain`] (including
    /// [`TaskDomainError::InvalidStatusTransition`]), or repository errors
    /// such as [`TaskRepositoryError::DuplicateLabel`] unchanged.
    pub async fn update_task(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load(id).await?;
        if let Some(requested) = request.status {
            task.check_transition(requested).inspect_err(|_| {
                warn!(
                    task_id = %id,
                    from = %task.status(),
                    to = %requested,
                    "rejected task status transition"
                );
            })?;
        }

        let update = request.into_update()?;
        if let Some(owner) = update.owner {
            self.ensure_owner_exists(owner).await?;
        }
        task.apply_update(update, &*self.clock)?;

        self.repository.update(&task).await?;
        info!(task_id = %id, status = %task.status(), "updated task");
        Ok(task)
    }

    /// Adds labels to a task, skipping names already present.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for invalid names,
    /// [`TaskLifecycleError::TaskNotFound`], or repository errors.
    pub async fn add_labels<I, S>(&self, id: TaskId, names: I) -> TaskLifecycleResult<Task>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label_names = LabelName::parse_all(names)?;
        let mut task = self.load(id).await?;
        let added = task.add_labels(&label_names, &*self.clock);
        if added > 0 {
            self.repository.update(&task).await?;
            info!(task_id = %id, added, "added task labels");
        }
        Ok(task)
    }

    /// Removes labels from a task by name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for invalid names,
    /// [`TaskLifecycleError::TaskNotFound`], or repository errors.
    pub async fn remove_labels<I, S>(&self, id: TaskId, names: I) -> TaskLifecycleResult<Task>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label_names = LabelName::parse_all(names)?;
        let mut task = self.load(id).await?;
        let removed = task.remove_labels(&label_names, &*self.clock);
        if !removed.is_empty() {
            self.repository.update(&task).await?;
            info!(task_id = %id, removed = removed.len(), "removed task labels");
        }
        Ok(task)
    }

    /// Deletes a task together with its labels.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when the task does not
    /// exist.
    pub async fn delete_task(&self, id: TaskId) -> TaskLifecycleResult<()> {
        self.repository.delete(id).await.map_err(|err| match err {
            TaskRepositoryError::NotFound(missing) => TaskLifecycleError::TaskNotFound(missing),
            other => TaskLifecycleError::Repository(other),
        })?;
        info!(task_id = %id, "deleted task");
        Ok(())
    }

    /// Lists one page of tasks matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn list_tasks(&self, query: &TaskQuery) -> TaskLifecycleResult<Page<Task>> {
        Ok(self.repository.list(query).await?)
    }

    /// Returns every task owned by `owner`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub async fn find_by_owner(&self, owner: UserId) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_owner(owner).await?)
    }

    async fn load(&self, id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(id))
    }

    async fn ensure_owner_exists(&self, owner: UserId) -> TaskLifecycleResult<()> {
        if self.users.find_by_id(owner).await?.is_none() {
            return Err(TaskLifecycleError::OwnerNotFound(owner));
        }
        Ok(())
    }
}
