//! Repository port for task aggregate persistence and lookup.

use crate::task::domain::{Page, Task, TaskId, TaskQuery};
use crate::user::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Implementations store the task together with its labels as one
/// aggregate: labels are never addressable outside their task.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task and its labels.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists or [`TaskRepositoryError::DuplicateLabel`] when two labels share
    /// a stored name.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists the current state of an existing task.
    ///
    /// Labels missing from `task` are deleted and new ones inserted in the
    /// same transaction as the task row.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::DuplicateLabel`] when the label set violates
    /// the per-task name uniqueness constraint.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Deletes a task and, with it, all of its labels.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns all tasks owned by `owner`, oldest first.
    async fn find_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns one page of tasks matching `query`.
    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Page<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// Two labels on the task share a stored name.
    #[error("duplicate label name on task {0}")]
    DuplicateLabel(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
