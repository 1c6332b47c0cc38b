use std::sync::{Arc, RwLock};

use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use super::table::TaskTable;
use super::{read_table, write_table, TaskStore};
use crate::due::{Clock, SystemClock};
use crate::error::TaskResult;
use crate::filter::{DateRange, TaskFilter};
use crate::sort::SortKey;
use crate::task::{NewTask, Task, TaskId, TaskUpdate};

/// Volatile store, used by tests and as the engine behind embedding callers.
pub struct MemoryStore {
    table: RwLock<TaskTable>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Timestamps created and updated tasks with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: RwLock::new(TaskTable::default()),
            clock,
        }
    }

    /// Starts from existing tasks, keeping their ids and timestamps.
    /// Duplicate ids or invalid titles are rejected.
    pub fn with_tasks(tasks: Vec<Task>, clock: Arc<dyn Clock>) -> TaskResult<Self> {
        Ok(Self {
            table: RwLock::new(TaskTable::from_tasks(tasks)?),
            clock,
        })
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }
}

impl TaskStore for MemoryStore {
    fn create_task(&self, new: NewTask) -> TaskResult<Task> {
        let now = self.now();
        let task = write_table(&self.table)?.create(new, now)?;
        debug!(id = %task.id, "created task in memory");
        Ok(task)
    }

    fn get_task(&self, id: TaskId) -> TaskResult<Task> {
        read_table(&self.table)?.get(id)
    }

    fn update_task(&self, id: TaskId, update: TaskUpdate) -> TaskResult<Task> {
        let now = self.now();
        write_table(&self.table)?.update(id, update, now)
    }

    fn toggle_task_complete(&self, id: TaskId) -> TaskResult<Task> {
        let now = self.now();
        write_table(&self.table)?.toggle(id, now)
    }

    fn delete_task(&self, id: TaskId) -> TaskResult<()> {
        write_table(&self.table)?.delete(id)
    }

    fn list_tasks(&self, filter: &TaskFilter, sort: SortKey) -> TaskResult<Vec<Task>> {
        Ok(read_table(&self.table)?.list(filter, sort))
    }

    fn list_tasks_by_date_filter(
        &self,
        range: &DateRange,
        now: DateTime<FixedOffset>,
    ) -> TaskResult<Vec<Task>> {
        Ok(read_table(&self.table)?.list_by_date(range, now))
    }

    fn snapshot(&self) -> TaskResult<Vec<Task>> {
        Ok(read_table(&self.table)?.all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::due::FixedClock;
    use crate::error::TaskError;
    use crate::task::{Priority, TaskStatus};
    use chrono::{Duration, TimeZone};

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::utc(
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn create_assigns_ids_and_timestamps() {
        let store = MemoryStore::with_clock(clock());
        let task = store
            .create_task(NewTask::new("Pay rent").priority(Priority::High))
            .unwrap();

        assert_eq!(task.id, TaskId(1));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, clock().now().with_timezone(&Utc));
        assert_eq!(store.get_task(task.id).unwrap(), task);
    }

    #[test]
    fn oversized_title_is_not_persisted() {
        let store = MemoryStore::new();
        let err = store.create_task(NewTask::new("a".repeat(256))).unwrap_err();
        assert!(matches!(err, TaskError::Validation { field: "title", .. }));
        assert!(store.snapshot().unwrap().is_empty());
    }

    #[test]
    fn date_filter_orders_by_due_date() {
        let store = MemoryStore::with_clock(clock());
        let now = clock().now().with_timezone(&Utc);
        store
            .create_task(NewTask::new("later").due(now + Duration::days(5)))
            .unwrap();
        store
            .create_task(NewTask::new("sooner").due(now + Duration::days(1)))
            .unwrap();
        store.create_task(NewTask::new("someday")).unwrap();

        let week = store
            .list_tasks_by_date_filter(&DateRange::Week, clock().now())
            .unwrap();
        let titles: Vec<&str> = week.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["sooner", "later"]);

        let all = store
            .list_tasks_by_date_filter(&DateRange::from_token("someday"), clock().now())
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn delete_is_hard_removal() {
        let store = MemoryStore::new();
        let task = store.create_task(NewTask::new("gone")).unwrap();
        store.delete_task(task.id).unwrap();
        assert!(store.get_task(task.id).unwrap_err().is_not_found());
        assert!(store.delete_task(task.id).unwrap_err().is_not_found());
    }
}
