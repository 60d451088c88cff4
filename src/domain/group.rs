//! Group domain model
//!
//! Groups form a forest: every group points at its parent by id, and a
//! `parent_id` of [`ROOT_PARENT`] marks a root. JSON field names follow the
//! persisted layout (`group_id`, `parent_id`, `group_name`,
//! `group_description`).

use serde::{Deserialize, Serialize};

/// Sentinel parent id for root groups
pub const ROOT_PARENT: i64 = 0;

/// A named node in the group hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique id across the collection
    #[serde(rename = "group_id")]
    pub id: i64,

    /// Id of the parent group, or [`ROOT_PARENT`] for roots
    #[serde(rename = "parent_id", default)]
    pub parent_id: i64,

    /// Display name; required to be non-empty on creation
    #[serde(rename = "group_name")]
    pub name: String,

    /// Free-form description
    #[serde(rename = "group_description", default)]
    pub description: String,
}

impl Group {
    /// Returns true if this group is a root of the forest
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT
    }
}

/// Returns true if a group with the given id exists
pub fn contains_group(groups: &[Group], id: i64) -> bool {
    groups.iter().any(|g| g.id == id)
}

/// Finds a group by id
pub fn find_group(groups: &[Group], id: i64) -> Option<&Group> {
    groups.iter().find(|g| g.id == id)
}

/// Returns the direct children of a group, in collection order
pub fn children_of(groups: &[Group], id: i64) -> Vec<Group> {
    groups.iter().filter(|g| g.parent_id == id).cloned().collect()
}

/// Returns the highest group id in use, or 0 for an empty collection
///
/// New groups are assigned `max_group_id + 1`, so the first group in an
/// empty collection gets id 1.
pub fn max_group_id(groups: &[Group]) -> i64 {
    groups.iter().map(|g| g.id).max().unwrap_or(0)
}
