//! Task listing criteria and paginated results.

use super::{Task, TaskStatus};
use std::cmp::Ordering;
use thiserror::Error;

/// Errors returned while building a task query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskQueryError {
    /// Page numbers start at one.
    #[error("page must be at least 1, got {0}")]
    InvalidPage(u32),

    /// Page size is outside the accepted range.
    #[error("page size must be between 1 and {max}, got {requested}")]
    InvalidPageSize {
        /// Requested page size.
        requested: u32,
        /// Largest accepted page size.
        max: u32,
    },

    /// Unknown sort field.
    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    /// Unknown sort order.
    #[error("unknown sort order: {0}")]
    UnknownSortOrder(String),
}

/// Field used to order listed tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    /// Order by title.
    Title,
    /// Order by description.
    Description,
    /// Order by lifecycle position of the status.
    Status,
    /// Order by creation time.
    #[default]
    CreatedAt,
    /// Order by last update time.
    UpdatedAt,
}

impl SortField {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Status => "status",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }
}

impl TryFrom<&str> for SortField {
    type Error = TaskQueryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "status" => Ok(Self::Status),
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            _ => Err(TaskQueryError::UnknownSortField(value.to_owned())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl TryFrom<&str> for SortOrder {
    type Error = TaskQueryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(TaskQueryError::UnknownSortOrder(value.to_owned())),
        }
    }
}

/// Filtering, ordering, and pagination criteria for listing tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    page: u32,
    page_size: u32,
    status: Option<TaskStatus>,
    search: Option<String>,
    labels: Vec<String>,
    sort_by: SortField,
    sort_order: SortOrder,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
            status: None,
            search: None,
            labels: Vec::new(),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl TaskQuery {
    /// Page size used when none is requested.
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    /// Largest accepted page size.
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Creates a query for the first page with default ordering.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a one-based page.
    ///
    /// # Errors
    ///
    /// Returns [`TaskQueryError::InvalidPage`] for page zero.
    pub fn with_page(mut self, page: u32) -> Result<Self, TaskQueryError> {
        if page == 0 {
            return Err(TaskQueryError::InvalidPage(page));
        }
        self.page = page;
        Ok(self)
    }

    /// Sets the number of tasks per page.
    ///
    /// # Errors
    ///
    /// Returns [`TaskQueryError::InvalidPageSize`] outside `1..=100`.
    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, TaskQueryError> {
        if page_size == 0 || page_size > Self::MAX_PAGE_SIZE {
            return Err(TaskQueryError::InvalidPageSize {
                requested: page_size,
                max: Self::MAX_PAGE_SIZE,
            });
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Restricts results to one status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts results to tasks whose title or description contains `text`.
    ///
    /// Blank text is ignored.
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        let raw = text.into();
        let trimmed = raw.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_lowercase());
        self
    }

    /// Restricts results to tasks carrying a label containing any fragment.
    ///
    /// Blank fragments are ignored.
    #[must_use]
    pub fn with_labels<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.labels = fragments
            .into_iter()
            .map(|fragment| fragment.as_ref().trim().to_lowercase())
            .filter(|fragment| !fragment.is_empty())
            .collect();
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub const fn with_sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = field;
        self.sort_order = order;
        self
    }

    /// Returns the one-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the status filter.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the lower-cased search text.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns the lower-cased label fragments.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the sort field.
    #[must_use]
    pub const fn sort_by(&self) -> SortField {
        self.sort_by
    }

    /// Returns the sort order.
    #[must_use]
    pub const fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Number of matching tasks to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// Returns whether `task` satisfies every filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let status_matches = self.status.is_none_or(|status| task.status() == status);
        let search_matches = self.search.as_deref().is_none_or(|needle| {
            task.title().as_str().to_lowercase().contains(needle)
                || task.description().to_lowercase().contains(needle)
        });
        let labels_match = self.labels.is_empty()
            || task.labels().iter().any(|label| {
                let name = label.name().normalized();
                self.labels.iter().any(|fragment| name.contains(fragment))
            });

        status_matches && search_matches && labels_match
    }

    /// Orders two tasks by the sort field and direction, ties broken by id.
    #[must_use]
    pub fn compare(&self, left: &Task, right: &Task) -> Ordering {
        let by_field = match self.sort_by {
            SortField::Title => left.title().as_str().cmp(right.title().as_str()),
            SortField::Description => left.description().cmp(right.description()),
            SortField::Status => left.status().position().cmp(&right.status().position()),
            SortField::CreatedAt => left.created_at().cmp(&right.created_at()),
            SortField::UpdatedAt => left.updated_at().cmp(&right.updated_at()),
        };
        let directed = match self.sort_order {
            SortOrder::Asc => by_field,
            SortOrder::Desc => by_field.reverse(),
        };
        directed.then_with(|| left.id().into_inner().cmp(&right.id().into_inner()))
    }
}

/// One page of results.
///
/// Built from a [`TaskQuery`], so the page size is always at least one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    total_items: u64,
    page: u32,
    page_size: u32,
}

impl<T> Page<T> {
    /// Creates a page for `query`.
    #[must_use]
    pub const fn new(items: Vec<T>, total_items: u64, query: &TaskQuery) -> Self {
        Self {
            items,
            total_items,
            page: query.page(),
            page_size: query.page_size(),
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Number of items across all pages.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of pages needed for all items; zero when there are none.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.page_size as u64)
    }

    /// Maps page items, keeping pagination metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
