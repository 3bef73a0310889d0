//! Task status and the forward-only transition guard.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Work has not started.
    #[default]
    Open,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Done,
}

impl TaskStatus {
    /// Statuses in lifecycle order. A task may only move rightwards.
    pub const ORDER: [Self; 3] = [Self::Open, Self::InProgress, Self::Done];

    /// Returns the zero-based position of this status in [`Self::ORDER`].
    #[must_use]
    pub fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|status| *status == self)
            .unwrap_or_default()
    }

    /// Returns whether moving from `self` to `requested` is permitted.
    ///
    /// Staying at the same status is always accepted.
    #[must_use]
    pub fn can_transition_to(self, requested: Self) -> bool {
        requested.position() >= self.position()
    }

    /// Returns the canonical storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ORDER
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseTaskStatusError(value.to_owned()))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
