//! Task persistence.
//!
//! The query engine only depends on the [`TaskStore`] trait. Two stores ship
//! with the crate: an in-memory table and a JSON file.

mod json_file;
mod memory;
mod table;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, FixedOffset};

pub use json_file::{JsonFileStore, DEFAULT_DATA_FILE};
pub use memory::MemoryStore;

use crate::error::{TaskError, TaskResult};
use crate::filter::{DateRange, TaskFilter};
use crate::sort::SortKey;
use crate::task::{NewTask, Task, TaskId, TaskUpdate};

/// Record storage behind the task service.
///
/// Each mutation is atomic for the task it touches. `snapshot` and the list
/// queries each observe one consistent state of the store.
pub trait TaskStore: Send + Sync {
    /// Stores a new pending task and returns it with its assigned id.
    fn create_task(&self, new: NewTask) -> TaskResult<Task>;

    fn get_task(&self, id: TaskId) -> TaskResult<Task>;

    fn update_task(&self, id: TaskId, update: TaskUpdate) -> TaskResult<Task>;

    /// Flips pending and completed without touching other fields.
    fn toggle_task_complete(&self, id: TaskId) -> TaskResult<Task>;

    fn delete_task(&self, id: TaskId) -> TaskResult<()>;

    fn list_tasks(&self, filter: &TaskFilter, sort: SortKey) -> TaskResult<Vec<Task>>;

    /// Tasks in a named date range, earliest due date first. Unrecognized
    /// ranges return every task.
    fn list_tasks_by_date_filter(
        &self,
        range: &DateRange,
        now: DateTime<FixedOffset>,
    ) -> TaskResult<Vec<Task>>;

    /// Every task, read in one go.
    fn snapshot(&self) -> TaskResult<Vec<Task>>;
}

fn read_table<T>(lock: &RwLock<T>) -> TaskResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| TaskError::unavailable("task table lock poisoned"))
}

fn write_table<T>(lock: &RwLock<T>) -> TaskResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| TaskError::unavailable("task table lock poisoned"))
}
