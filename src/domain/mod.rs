//! Domain models and pure logic for taskgrove
//!
//! Contains the core business logic without any I/O concerns: the group
//! and task records, content-derived task identity, the group ordering
//! policies, and the statistics windows.

mod group;
mod id;
mod order;
mod stats;
mod task;

pub use group::{children_of, contains_group, find_group, max_group_id, Group, ROOT_PARENT};
pub use id::{derive_task_id, DEFAULT_ID_LENGTH};
pub use order::{order_groups, would_create_cycle, GroupSort};
pub use stats::{period_window, stat, Period, Statistics};
pub use task::{filter_tasks, sort_tasks, Task, TaskFilter, TaskSort};
