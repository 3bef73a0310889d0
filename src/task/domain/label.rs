//! Task labels and name-based label reconciliation.
//!
//! Label names are compared after trimming and lower-casing. The stored name
//! keeps the casing it was first supplied with, so reconciling `"NestJS"`
//! against an existing `"nestjs"` label keeps the existing record untouched.

use super::{LabelId, TaskDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashSet;
use std::fmt;

/// Maximum length for a label name, matching the `VARCHAR(100)` column.
const MAX_LABEL_NAME_LENGTH: usize = 100;

/// Validated, trimmed label name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelName(String);

impl LabelName {
    /// Creates a validated label name.
    ///
    /// Surrounding whitespace is removed; casing is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyLabelName`] when the value is empty
    /// after trimming or [`TaskDomainError::LabelNameTooLong`] when it exceeds
    /// 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyLabelName);
        }

        if trimmed.chars().count() > MAX_LABEL_NAME_LENGTH {
            return Err(TaskDomainError::LabelNameTooLong(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Parses a list of raw names.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub fn parse_all<I, S>(values: I) -> Result<Vec<Self>, TaskDomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().map(Self::new).collect()
    }

    /// Returns the name as supplied (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the comparison key for this name.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for LabelName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label attached to exactly one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    id: LabelId,
    name: LabelName,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedLabelData {
    /// Persisted label identifier.
    pub id: LabelId,
    /// Persisted label name.
    pub name: LabelName,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Label {
    /// Creates a fresh label record.
    #[must_use]
    pub fn new(name: LabelName, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: LabelId::new(),
            name,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a label from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedLabelData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the label identifier.
    #[must_use]
    pub const fn id(&self) -> LabelId {
        self.id
    }

    /// Returns the label name.
    #[must_use]
    pub const fn name(&self) -> &LabelName {
        &self.name
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
}

/// Outcome of reconciling a label set against desired names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelReconciliation {
    kept: Vec<Label>,
    added: Vec<Label>,
    removed: Vec<Label>,
}

impl LabelReconciliation {
    /// Existing labels that survive unchanged.
    #[must_use]
    pub fn kept(&self) -> &[Label] {
        &self.kept
    }

    /// Labels created for names not already present.
    #[must_use]
    pub fn added(&self) -> &[Label] {
        &self.added
    }

    /// Existing labels no longer wanted.
    #[must_use]
    pub fn removed(&self) -> &[Label] {
        &self.removed
    }

    /// Returns whether the reconciliation changes nothing.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Consumes the outcome, returning the resulting label set.
    #[must_use]
    pub fn into_labels(self) -> Vec<Label> {
        let Self {
            mut kept, added, ..
        } = self;
        kept.extend(added);
        kept
    }
}

/// Computes the minimal delta turning `existing` into `desired`.
///
/// Existing labels whose name is desired are kept with their identity and
/// timestamps. Desired names absent from `existing` become new labels; among
/// repeated names the first occurrence wins. Everything else is removed.
#[must_use]
pub fn reconcile_labels(
    existing: Vec<Label>,
    desired: &[LabelName],
    clock: &impl Clock,
) -> LabelReconciliation {
    let wanted: HashSet<String> = desired.iter().map(LabelName::normalized).collect();
    let (kept, removed): (Vec<Label>, Vec<Label>) = existing
        .into_iter()
        .partition(|label| wanted.contains(&label.name().normalized()));
    let added = new_labels(&kept, desired, clock);

    LabelReconciliation {
        kept,
        added,
        removed,
    }
}

/// Creates labels for candidate names not already present in `current`.
///
/// Never removes anything; repeated candidates collapse to one label.
#[must_use]
pub fn new_labels(current: &[Label], candidates: &[LabelName], clock: &impl Clock) -> Vec<Label> {
    let mut seen: HashSet<String> = current
        .iter()
        .map(|label| label.name().normalized())
        .collect();

    candidates
        .iter()
        .filter(|name| seen.insert(name.normalized()))
        .map(|name| Label::new(name.clone(), clock))
        .collect()
}

/// Splits `existing` into labels to keep and labels named in `names`.
///
/// Matching uses the same trimmed, case-insensitive comparison as
/// [`reconcile_labels`].
#[must_use]
pub fn split_labels(existing: Vec<Label>, names: &[LabelName]) -> (Vec<Label>, Vec<Label>) {
    let unwanted: HashSet<String> = names.iter().map(LabelName::normalized).collect();
    existing
        .into_iter()
        .partition(|label| !unwanted.contains(&label.name().normalized()))
}
