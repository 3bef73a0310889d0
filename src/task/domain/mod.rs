//! Domain model for tasks and their labels.
//!
//! The task domain owns the forward-only status guard and label
//! reconciliation while keeping all infrastructure concerns outside of the
//! domain boundary.

mod error;
mod ids;
mod label;
mod query;
mod status;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{LabelId, TaskId};
pub use label::{
    Label, LabelName, LabelReconciliation, PersistedLabelData, new_labels, reconcile_labels,
    split_labels,
};
pub use query::{Page, SortField, SortOrder, TaskQuery, TaskQueryError};
pub use status::TaskStatus;
pub use task::{PersistedTaskData, Task, TaskDraft, TaskTitle, TaskUpdate};
