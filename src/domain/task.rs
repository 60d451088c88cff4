//! Task domain model and lifecycle
//!
//! A task belongs to exactly one group and moves between two states,
//! working and completed. Completion stamps `completed_at`; reopening
//! clears it. Tasks are never deleted (a deliberate asymmetry with groups,
//! carried over from the persisted layout this tracker inherits).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A unit of work attached to exactly one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Content-derived id (truncated SHA-1 of `text`)
    #[serde(rename = "task_id")]
    pub id: String,

    /// Id of the owning group
    #[serde(rename = "group_id")]
    pub group_id: i64,

    /// The task text; required to be non-empty
    #[serde(rename = "task")]
    pub text: String,

    /// Completion state
    #[serde(default)]
    pub completed: bool,

    /// Creation instant, stamped by the store
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,

    /// Completion instant; present exactly when `completed` is true
    #[serde(rename = "completed_at", default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new working task
    pub fn new(id: String, group_id: i64, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            group_id,
            text,
            completed: false,
            created_at,
            completed_at: None,
        }
    }

    /// Marks the task completed, stamping `completed_at`
    ///
    /// Completing an already-completed task is a `Conflict` and leaves the
    /// task unchanged.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.completed {
            return Err(Error::conflict("already of this type"));
        }
        self.completed = true;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Moves the task back to working, clearing `completed_at`
    pub fn reopen(&mut self) -> Result<()> {
        if !self.completed {
            return Err(Error::conflict("already of this type"));
        }
        self.completed = false;
        self.completed_at = None;
        Ok(())
    }
}

/// Sort order for task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// Lexicographic on task text
    Name,
    /// Ascending owning group id
    Group,
    /// Original collection order
    #[default]
    Unsorted,
}

impl TaskSort {
    /// Parses an optional query keyword; an absent keyword means unsorted
    pub fn from_param(param: Option<&str>) -> Result<Self> {
        match param {
            None => Ok(TaskSort::Unsorted),
            Some("name") => Ok(TaskSort::Name),
            Some("group") => Ok(TaskSort::Group),
            Some("none") => Ok(TaskSort::Unsorted),
            Some(other) => Err(Error::not_found(format!("unknown task sort '{other}'"))),
        }
    }
}

/// Completion-state filter for task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    /// Only completed tasks
    Completed,
    /// Only tasks still being worked on
    Working,
    /// Everything
    #[default]
    All,
}

impl TaskFilter {
    /// Parses an optional query keyword; an absent keyword means all
    pub fn from_param(param: Option<&str>) -> Result<Self> {
        match param {
            None => Ok(TaskFilter::All),
            Some("completed") => Ok(TaskFilter::Completed),
            Some("working") => Ok(TaskFilter::Working),
            Some("all") => Ok(TaskFilter::All),
            Some(other) => Err(Error::not_found(format!("unknown task type '{other}'"))),
        }
    }

    /// Returns true if the task passes this filter
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::Completed => task.completed,
            TaskFilter::Working => !task.completed,
            TaskFilter::All => true,
        }
    }
}

/// Sorts tasks in place; both orders are stable, so equal keys keep their
/// original relative order
pub fn sort_tasks(tasks: &mut [Task], sort: TaskSort) {
    match sort {
        TaskSort::Name => tasks.sort_by(|a, b| a.text.cmp(&b.text)),
        TaskSort::Group => tasks.sort_by_key(|t| t.group_id),
        TaskSort::Unsorted => {}
    }
}

/// Keeps only the tasks matching the filter, preserving order
pub fn filter_tasks(tasks: Vec<Task>, filter: TaskFilter) -> Vec<Task> {
    match filter {
        TaskFilter::All => tasks,
        _ => tasks.into_iter().filter(|t| filter.matches(t)).collect(),
    }
}
