//! The in-memory dataset authority
//!
//! [`Store`] exclusively owns the group and task collections. Reads take a
//! shared lock, every mutation takes the exclusive lock, and no caller ever
//! sees the raw collections — the HTTP layer talks to the store and nothing
//! else. Persistence snapshots go through [`Store::snapshot`] so a shutdown
//! save cannot observe a torn write.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Local, Utc};
use serde::Deserialize;

use crate::domain::{
    children_of, contains_group, derive_task_id, filter_tasks, find_group, max_group_id,
    order_groups, sort_tasks, stat, would_create_cycle, Group, GroupSort, Period, Statistics,
    Task, TaskFilter, TaskSort, ROOT_PARENT,
};
use crate::error::{Error, Result};

/// Incoming fields for group create/edit requests
///
/// Field names mirror the wire format; `id` is ignored on create (the store
/// assigns the next free id) and names the replacement id on edit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupPayload {
    #[serde(rename = "group_id", default)]
    pub id: i64,
    #[serde(rename = "parent_id", default)]
    pub parent_id: i64,
    #[serde(rename = "group_name", default)]
    pub name: String,
    #[serde(rename = "group_description", default)]
    pub description: String,
}

struct Dataset {
    groups: Vec<Group>,
    tasks: Vec<Task>,
}

/// Owner of the authoritative group/task collections
pub struct Store {
    inner: RwLock<Dataset>,
    id_length: usize,
}

impl Store {
    /// Builds a store around an already-loaded dataset
    pub fn new(groups: Vec<Group>, tasks: Vec<Task>, id_length: usize) -> Self {
        Self {
            inner: RwLock::new(Dataset { groups, tasks }),
            id_length,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Dataset> {
        // A panicked writer cannot leave a half-applied mutation behind:
        // every operation validates before it touches the collections.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Dataset> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Clones both collections under the shared lock
    pub fn snapshot(&self) -> (Vec<Group>, Vec<Task>) {
        let data = self.read();
        (data.groups.clone(), data.tasks.clone())
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    /// Ordered view of all groups, truncated to `limit` when present
    pub fn list_groups(&self, sort: GroupSort, limit: Option<usize>) -> Vec<Group> {
        let data = self.read();
        let mut ordered = order_groups(&data.groups, sort);
        apply_limit(&mut ordered, limit);
        ordered
    }

    /// Root groups sorted by name, truncated to `limit` when present
    pub fn top_level_groups(&self, limit: Option<usize>) -> Vec<Group> {
        let data = self.read();
        let roots: Vec<Group> = data.groups.iter().filter(|g| g.is_root()).cloned().collect();
        let mut ordered = order_groups(&roots, GroupSort::Name);
        apply_limit(&mut ordered, limit);
        ordered
    }

    /// Fetches a single group by id
    pub fn group(&self, id: i64) -> Result<Group> {
        let data = self.read();
        find_group(&data.groups, id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("group {id} does not exist")))
    }

    /// Direct children of a group
    ///
    /// A group without children is an error rather than an empty list; the
    /// wire format this tracker is compatible with has always answered that
    /// way.
    pub fn children(&self, id: i64) -> Result<Vec<Group>> {
        let data = self.read();
        if !contains_group(&data.groups, id) {
            return Err(Error::not_found(format!("group {id} does not exist")));
        }
        let children = children_of(&data.groups, id);
        if children.is_empty() {
            return Err(Error::invalid_input(format!("group {id} has no children")));
        }
        Ok(children)
    }

    /// Creates a group, assigning the next unused id
    pub fn create_group(&self, payload: GroupPayload) -> Result<Group> {
        let mut data = self.write();
        if payload.name.is_empty() {
            return Err(Error::invalid_input("group name is not specified"));
        }
        if payload.parent_id != ROOT_PARENT && !contains_group(&data.groups, payload.parent_id) {
            return Err(Error::invalid_input(format!(
                "parent group {} does not exist",
                payload.parent_id
            )));
        }
        let group = Group {
            id: max_group_id(&data.groups) + 1,
            parent_id: payload.parent_id,
            name: payload.name,
            description: payload.description,
        };
        data.groups.push(group.clone());
        tracing::info!(group_id = group.id, parent_id = group.parent_id, "group created");
        Ok(group)
    }

    /// Replaces the group identified by `id` with the payload
    ///
    /// The payload may carry a new id, but only for a group that no child
    /// group or task depends on.
    pub fn edit_group(&self, id: i64, payload: GroupPayload) -> Result<Group> {
        let mut data = self.write();
        let Some(position) = data.groups.iter().position(|g| g.id == id) else {
            return Err(Error::not_found(format!("group {id} does not exist")));
        };
        // 0 is the root sentinel in parent pointers, not an assignable id;
        // a group renumbered to 0 could never be referenced as a parent.
        if payload.id == ROOT_PARENT {
            return Err(Error::invalid_input(format!(
                "group id {ROOT_PARENT} is reserved for the root sentinel"
            )));
        }
        if payload.id != id && contains_group(&data.groups, payload.id) {
            return Err(Error::conflict(format!(
                "group {} already exists",
                payload.id
            )));
        }
        if payload.id != id && !children_of(&data.groups, id).is_empty() {
            return Err(Error::conflict(format!("group {id} has dependent groups")));
        }
        if payload.id != id && data.tasks.iter().any(|t| t.group_id == id) {
            return Err(Error::conflict(format!("group {id} has dependent tasks")));
        }
        if payload.parent_id != ROOT_PARENT && !contains_group(&data.groups, payload.parent_id) {
            return Err(Error::invalid_input(format!(
                "parent group {} does not exist",
                payload.parent_id
            )));
        }
        if would_create_cycle(&data.groups, payload.id, payload.parent_id)
            || (payload.id != id && would_create_cycle(&data.groups, id, payload.parent_id))
        {
            return Err(Error::invalid_input(format!(
                "group {id} cannot become its own ancestor"
            )));
        }
        let group = Group {
            id: payload.id,
            parent_id: payload.parent_id,
            name: payload.name,
            description: payload.description,
        };
        data.groups[position] = group.clone();
        tracing::info!(group_id = id, new_id = group.id, "group edited");
        Ok(group)
    }

    /// Removes a group that nothing depends on
    pub fn delete_group(&self, id: i64) -> Result<()> {
        let mut data = self.write();
        if !contains_group(&data.groups, id) {
            return Err(Error::not_found(format!("group {id} does not exist")));
        }
        if !children_of(&data.groups, id).is_empty() {
            return Err(Error::conflict(format!("group {id} has dependent groups")));
        }
        if data.tasks.iter().any(|t| t.group_id == id) {
            return Err(Error::conflict(format!("group {id} has dependent tasks")));
        }
        data.groups.retain(|g| g.id != id);
        tracing::info!(group_id = id, "group deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// Sorted, filtered view of all tasks, truncated to `limit` when present
    ///
    /// Order of operations matters: sort first, then filter, then limit.
    pub fn list_tasks(&self, sort: TaskSort, filter: TaskFilter, limit: Option<usize>) -> Vec<Task> {
        let data = self.read();
        let mut tasks = data.tasks.clone();
        sort_tasks(&mut tasks, sort);
        let mut tasks = filter_tasks(tasks, filter);
        apply_limit(&mut tasks, limit);
        tasks
    }

    /// Fetches a single task by id
    pub fn task(&self, id: &str) -> Result<Task> {
        let data = self.read();
        data.tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("task {id} does not exist")))
    }

    /// Tasks belonging to one group, optionally filtered by completion state
    ///
    /// Like [`Store::children`], an empty result is an error, both before
    /// and after the filter.
    pub fn tasks_for_group(&self, group_id: i64, filter: TaskFilter) -> Result<Vec<Task>> {
        let data = self.read();
        if !contains_group(&data.groups, group_id) {
            return Err(Error::not_found(format!("group {group_id} does not exist")));
        }
        let tasks: Vec<Task> = data
            .tasks
            .iter()
            .filter(|t| t.group_id == group_id)
            .cloned()
            .collect();
        if tasks.is_empty() {
            return Err(Error::invalid_input(format!(
                "group {group_id} has no dependent tasks"
            )));
        }
        let tasks = filter_tasks(tasks, filter);
        if tasks.is_empty() {
            return Err(Error::invalid_input(format!(
                "group {group_id} has no dependent tasks of this type"
            )));
        }
        Ok(tasks)
    }

    /// Creates a working task with a content-derived id
    pub fn create_task(&self, group_id: i64, text: String) -> Result<Task> {
        let mut data = self.write();
        let id = self.validate_task_fields(&data, group_id, &text)?;
        if data.tasks.iter().any(|t| t.id == id) {
            return Err(Error::conflict(format!("task {id} already exists")));
        }
        let task = Task::new(id, group_id, text, Utc::now());
        data.tasks.push(task.clone());
        tracing::info!(task_id = %task.id, group_id, "task created");
        Ok(task)
    }

    /// Replaces a task's text and group, re-deriving its id
    ///
    /// Completion state and both timestamps are preserved. The collision
    /// check ignores the task being edited, so re-submitting the same text
    /// (a group-only move) is not a conflict.
    pub fn edit_task(&self, id: &str, group_id: i64, text: String) -> Result<Task> {
        let mut data = self.write();
        let Some(position) = data.tasks.iter().position(|t| t.id == id) else {
            return Err(Error::not_found(format!("task {id} does not exist")));
        };
        let new_id = self.validate_task_fields(&data, group_id, &text)?;
        if data
            .tasks
            .iter()
            .enumerate()
            .any(|(i, t)| t.id == new_id && i != position)
        {
            return Err(Error::conflict(format!("task {new_id} already exists")));
        }
        let task = &mut data.tasks[position];
        task.id = new_id;
        task.group_id = group_id;
        task.text = text;
        let task = task.clone();
        tracing::info!(task_id = %id, new_id = %task.id, "task edited");
        Ok(task)
    }

    /// Drives the completion state machine in either direction
    pub fn set_completed(&self, id: &str, completed: bool) -> Result<Task> {
        let mut data = self.write();
        let Some(task) = data.tasks.iter_mut().find(|t| t.id == id) else {
            return Err(Error::not_found(format!("task {id} does not exist")));
        };
        if completed {
            task.complete(Utc::now())?;
        } else {
            task.reopen()?;
        }
        let task = task.clone();
        tracing::info!(task_id = %id, completed, "task transitioned");
        Ok(task)
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    /// Created/completed counts for the period, anchored at local now
    pub fn statistics(&self, period: Period) -> Statistics {
        let data = self.read();
        stat(&data.tasks, period, Local::now())
    }

    fn validate_task_fields(&self, data: &Dataset, group_id: i64, text: &str) -> Result<String> {
        if text.is_empty() {
            return Err(Error::invalid_input("task text is not specified"));
        }
        if !contains_group(&data.groups, group_id) {
            return Err(Error::invalid_input(format!(
                "group {group_id} does not exist"
            )));
        }
        Ok(derive_task_id(text, self.id_length))
    }
}

fn apply_limit<T>(items: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
}
