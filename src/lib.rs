//! taskgrove - A hierarchical task and group tracker served over HTTP
//!
//! Groups form a forest (parent pointers, `parent_id = 0` meaning root) and
//! tasks belong to exactly one group. Task ids are derived from task text
//! (truncated SHA-1), so identical text collides by design. The in-memory
//! dataset is owned by a single [`store::Store`] behind a read/write lock;
//! persistence is two JSON array files loaded at startup and written back
//! at graceful shutdown.

pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod storage;
pub mod store;

pub use domain::{Group, GroupSort, Period, Statistics, Task, TaskFilter, TaskSort};
pub use error::{Error, Result};
pub use store::Store;
