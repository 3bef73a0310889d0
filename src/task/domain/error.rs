//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating task domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The requested status would move the task backwards.
    #[error("wrong task status transition")]
    InvalidStatusTransition,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the storage limit.
    #[error("task title exceeds {max} characters")]
    TitleTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// A label name is empty after trimming.
    #[error("label name must not be empty")]
    EmptyLabelName,

    /// A label name exceeds the storage limit.
    #[error("label name '{0}' exceeds 100 characters")]
    LabelNameTooLong(String),
}

/// Error returned while parsing task statuses from requests or storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
