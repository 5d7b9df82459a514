//! Filter criteria for the derived board view.

use crate::model::task::{Task, TaskPriority, TaskStatus};

/// Status criterion: one column or every column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    /// Parses `all` or a column id.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "all" => Some(Self::All),
            other => TaskStatus::parse(other).map(Self::Only),
        }
    }

    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == status,
        }
    }
}

/// Priority criterion: one priority or every priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(TaskPriority),
}

impl PriorityFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "all" => Some(Self::All),
            other => TaskPriority::parse(other).map(Self::Only),
        }
    }

    pub fn matches(self, priority: TaskPriority) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == priority,
        }
    }
}

/// Current filter criteria. Ephemeral, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    pub search: String,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

impl TaskFilters {
    /// Merges every field that is set on `patch`.
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(search) = patch.search {
            self.search = search;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }

    /// Builds a reusable predicate; the search needle is lowercased once.
    pub fn predicate(&self) -> impl Fn(&Task) -> bool + '_ {
        let needle = self.search.to_lowercase();
        move |task: &Task| {
            task.matches_search(&needle)
                && self.status.matches(task.status)
                && self.priority.matches(task.priority)
        }
    }
}

/// Partial filter update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub priority: Option<PriorityFilter>,
}

impl FilterPatch {
    pub fn search(value: impl Into<String>) -> Self {
        Self {
            search: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn status(value: StatusFilter) -> Self {
        Self {
            status: Some(value),
            ..Self::default()
        }
    }

    pub fn priority(value: PriorityFilter) -> Self {
        Self {
            priority: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
