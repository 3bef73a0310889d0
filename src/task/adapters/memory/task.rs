//! In-memory repository for task management tests and local runs.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Page, Task, TaskId, TaskQuery},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Mirrors the `UNIQUE (task_id, name)` storage constraint.
fn ensure_unique_label_names(task: &Task) -> TaskRepositoryResult<()> {
    let mut names = HashSet::new();
    if task
        .labels()
        .iter()
        .all(|label| names.insert(label.name().as_str()))
    {
        Ok(())
    } else {
        Err(TaskRepositoryError::DuplicateLabel(task.id()))
    }
}

fn lock_error(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        ensure_unique_label_names(task)?;
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.contains_key(&task.id()) {
            return Err(TaskRepositoryError::NotFound(task.id()));
        }
        ensure_unique_label_names(task)?;
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskRepositoryError::NotFound(id))
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut owned: Vec<Task> = state
            .values()
            .filter(|task| task.owner() == owner)
            .cloned()
            .collect();
        owned.sort_by(|left, right| TaskQuery::new().compare(left, right));
        Ok(owned)
    }

    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Page<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut matching: Vec<&Task> = state.values().filter(|task| query.matches(task)).collect();
        matching.sort_by(|left, right| query.compare(left, right));

        let total_items = u64::try_from(matching.len()).map_err(TaskRepositoryError::persistence)?;
        let offset = usize::try_from(query.offset()).map_err(TaskRepositoryError::persistence)?;
        let limit = usize::try_from(query.page_size()).map_err(TaskRepositoryError::persistence)?;
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(Page::new(items, total_items, query))
    }
}
