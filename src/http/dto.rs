//! Request and response bodies.
//!
//! All JSON field names are camelCase.

use crate::task::domain::{Label, Page, SortField, SortOrder, Task, TaskQuery, TaskStatus};
use crate::user::domain::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiErrorResponse;

/// Label reference in request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelInput {
    /// Label name.
    pub name: String,
}

pub(crate) fn label_names(labels: Vec<LabelInput>) -> Vec<String> {
    labels.into_iter().map(|label| label.name).collect()
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Initial status; defaults to `OPEN`.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Owning user.
    pub user_id: Uuid,
    /// Initial labels.
    #[serde(default)]
    pub labels: Option<Vec<LabelInput>>,
}

/// Body of `PATCH /tasks/{id}`. Absent and `null` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskBody {
    /// Replacement title.
    #[serde(default)]
    pub title: Option<String>,
    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,
    /// Requested status.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Replacement owner.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Desired label set.
    #[serde(default)]
    pub labels: Option<Vec<LabelInput>>,
}

/// Body of the label add and remove endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct LabelsBody(pub Vec<LabelInput>);

impl LabelsBody {
    /// Returns the label names.
    #[must_use]
    pub fn into_names(self) -> Vec<String> {
        label_names(self.0)
    }
}

/// Query string of `GET /tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksParams {
    /// One-based page.
    pub page: Option<u32>,
    /// Tasks per page.
    pub page_size: Option<u32>,
    /// Status filter.
    pub status: Option<String>,
    /// Title or description substring.
    pub search: Option<String>,
    /// Comma-separated label fragments.
    pub labels: Option<String>,
    /// Sort field.
    pub sort_by: Option<String>,
    /// `ASC` or `DESC`.
    pub sort_order: Option<String>,
}

impl ListTasksParams {
    /// Builds a validated task query.
    ///
    /// # Errors
    ///
    /// Returns a 400 response for out-of-range pagination or unknown
    /// status, sort field, or sort order values.
    pub fn into_query(self) -> Result<TaskQuery, ApiErrorResponse> {
        let mut query = TaskQuery::new();
        if let Some(page) = self.page {
            query = query.with_page(page)?;
        }
        if let Some(page_size) = self.page_size {
            query = query.with_page_size(page_size)?;
        }
        if let Some(status) = self.status.as_deref().filter(|raw| !raw.trim().is_empty()) {
            query = query.with_status(TaskStatus::try_from(status)?);
        }
        if let Some(search) = self.search {
            query = query.with_search(search);
        }
        if let Some(labels) = self.labels {
            query = query.with_labels(labels.split(','));
        }
        let sort_by = self
            .sort_by
            .as_deref()
            .map(SortField::try_from)
            .transpose()?
            .unwrap_or_default();
        let sort_order = self
            .sort_order
            .as_deref()
            .map(SortOrder::try_from)
            .transpose()?
            .unwrap_or_default();
        Ok(query.with_sort(sort_by, sort_order))
    }
}

/// Label as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    /// Label identifier.
    pub id: Uuid,
    /// Label name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Label> for LabelResponse {
    fn from(label: &Label) -> Self {
        Self {
            id: label.id().into_inner(),
            name: label.name().as_str().to_owned(),
            created_at: label.created_at(),
            updated_at: label.updated_at(),
        }
    }
}

/// Task as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Task identifier.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Owning user.
    pub user_id: Uuid,
    /// Attached labels.
    pub labels: Vec<LabelResponse>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().into_inner(),
            title: task.title().as_str().to_owned(),
            description: task.description().to_owned(),
            status: task.status(),
            user_id: task.owner().into_inner(),
            labels: task.labels().iter().map(LabelResponse::from).collect(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// One page of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPageResponse {
    /// Matching tasks across all pages.
    pub total_items: u64,
    /// One-based page.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Number of pages.
    pub total_pages: u64,
    /// Tasks on this page.
    pub items: Vec<TaskResponse>,
}

impl From<Page<Task>> for TaskPageResponse {
    fn from(page: Page<Task>) -> Self {
        let total_pages = page.total_pages();
        let mapped = page.map(|task| TaskResponse::from(&task));
        Self {
            total_items: mapped.total_items(),
            page: mapped.page(),
            page_size: mapped.page_size(),
            total_pages,
            items: mapped.into_items(),
        }
    }
}

/// Body of `POST /auth`.
#[derive(Clone, Deserialize)]
pub struct RegisterBody {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Body of `POST /auth/login`.
#[derive(Clone, Deserialize)]
pub struct LoginBody {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// User as returned to clients. The password hash is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Identifiers of tasks owned by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ids: Option<Vec<Uuid>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().into_inner(),
            name: user.name().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            task_ids: None,
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Body of `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDirectoryResponse {
    /// Registered users with their task ids.
    pub users: Vec<UserResponse>,
    /// Number of registered users.
    pub total_users: usize,
}
