//! Task aggregate root and the values used to create and update it.

use super::{
    Label, LabelName, TaskDomainError, TaskId, TaskStatus, new_labels, reconcile_labels,
    split_labels,
};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::fmt;

/// Maximum length for a task title, matching the `VARCHAR(100)` column.
const MAX_TITLE_LENGTH: usize = 100;

/// Validated, trimmed task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated task title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the value is empty after
    /// trimming or [`TaskDomainError::TitleTooLong`] when it exceeds 100
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }

        if trimmed.chars().count() > MAX_TITLE_LENGTH {
            return Err(TaskDomainError::TitleTooLong {
                max: MAX_TITLE_LENGTH,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: TaskTitle,
    description: String,
    status: TaskStatus,
    owner: UserId,
    labels: Vec<LabelName>,
}

impl TaskDraft {
    /// Creates a draft with the required task fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDescription`] when the description is
    /// blank.
    pub fn new(
        title: TaskTitle,
        description: impl Into<String>,
        owner: UserId,
    ) -> Result<Self, TaskDomainError> {
        let text = description.into();
        if text.trim().is_empty() {
            return Err(TaskDomainError::EmptyDescription);
        }

        Ok(Self {
            title,
            description: text,
            status: TaskStatus::default(),
            owner,
            labels: Vec::new(),
        })
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the initial label names.
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<LabelName>) -> Self {
        self.labels = labels;
        self
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }
}

/// Partial update applied to an existing task.
///
/// Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Replacement title.
    pub title: Option<TaskTitle>,
    /// Replacement description.
    pub description: Option<String>,
    /// Requested status; must not move backwards.
    pub status: Option<TaskStatus>,
    /// Replacement owner.
    pub owner: Option<UserId>,
    /// Desired label names, reconciled against the current labels.
    pub labels: Option<Vec<LabelName>>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: String,
    status: TaskStatus,
    owner: UserId,
    labels: Vec<Label>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: String,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted owner reference.
    pub owner: UserId,
    /// Persisted labels.
    pub labels: Vec<Label>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task from a validated draft.
    ///
    /// Repeated label names in the draft collapse to a single label.
    #[must_use]
    pub fn create(draft: TaskDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let TaskDraft {
            title,
            description,
            status,
            owner,
            labels,
        } = draft;

        Self {
            id: TaskId::new(),
            title,
            description,
            status,
            owner,
            labels: new_labels(&[], &labels, clock),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            owner: data.owner,
            labels: data.labels,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the task status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the labels attached to this task.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Checks that the task may move to `requested`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when `requested`
    /// precedes the current status.
    pub fn check_transition(&self, requested: TaskStatus) -> Result<(), TaskDomainError> {
        if self.status.can_transition_to(requested) {
            Ok(())
        } else {
            Err(TaskDomainError::InvalidStatusTransition)
        }
    }

    /// Applies a partial update.
    ///
    /// The status guard runs before any field is written, so a rejected
    /// transition leaves the task exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the requested
    /// status precedes the current one.
    pub fn apply_update(
        &mut self,
        update: TaskUpdate,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if let Some(requested) = update.status {
            self.check_transition(requested)?;
        }

        let TaskUpdate {
            title,
            description,
            status,
            owner,
            labels,
        } = update;

        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_status) = status {
            self.status = new_status;
        }
        if let Some(new_owner) = owner {
            self.owner = new_owner;
        }
        if let Some(desired) = labels {
            let current = std::mem::take(&mut self.labels);
            self.labels = reconcile_labels(current, &desired, clock).into_labels();
        }

        self.touch(clock);
        Ok(())
    }

    /// Appends labels whose names are not already present. Never removes.
    ///
    /// Returns the number of labels added.
    pub fn add_labels(&mut self, names: &[LabelName], clock: &impl Clock) -> usize {
        let added = new_labels(&self.labels, names, clock);
        let count = added.len();
        if count > 0 {
            self.labels.extend(added);
            self.touch(clock);
        }
        count
    }

    /// Removes labels whose names match any of `names`.
    ///
    /// Returns the removed labels.
    pub fn remove_labels(&mut self, names: &[LabelName], clock: &impl Clock) -> Vec<Label> {
        let current = std::mem::take(&mut self.labels);
        let (kept, removed) = split_labels(current, names);
        self.labels = kept;
        if !removed.is_empty() {
            self.touch(clock);
        }
        removed
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
