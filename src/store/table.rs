use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TaskError, TaskResult};
use crate::filter::{DateRange, TaskFilter};
use crate::sort::{sorted, SortField, SortKey};
use crate::task::{normalize_description, normalize_title, NewTask, Task, TaskId, TaskUpdate};

/// Task rows plus the id counter, shared by both stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TaskTable {
    #[serde(default)]
    next_id: u32,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl TaskTable {
    /// Seeds a table with existing rows, subject to the same checks as a
    /// loaded file.
    pub(crate) fn from_tasks(tasks: Vec<Task>) -> TaskResult<Self> {
        Self { next_id: 0, tasks }.verified()
    }

    /// Checks rows that did not come through `create`: every id appears
    /// once and text fields obey the create-time rules.
    pub(crate) fn verified(mut self) -> TaskResult<Self> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &mut self.tasks {
            let id = task.id;
            if !seen.insert(id) {
                return Err(TaskError::unavailable(format!("duplicate task id {id}")));
            }
            let reject = |err: TaskError| TaskError::unavailable(format!("task {id}: {err}"));
            task.title = normalize_title(&task.title).map_err(reject)?;
            task.description = normalize_description(&task.description).map_err(reject)?;
        }
        self.repair_next_id();
        Ok(self)
    }

    /// Keeps the counter past every stored id so deleted ids are not reused.
    fn repair_next_id(&mut self) {
        let floor = self
            .tasks
            .iter()
            .map(|task| task.id.0.saturating_add(1))
            .max()
            .unwrap_or(1);
        self.next_id = self.next_id.max(floor);
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    fn position(&self, id: TaskId) -> TaskResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(TaskError::NotFound { id })
    }

    pub(crate) fn create(&mut self, new: NewTask, now: DateTime<Utc>) -> TaskResult<Task> {
        let new = new.validated()?;
        if self.next_id == u32::MAX {
            return Err(TaskError::unavailable("task id space exhausted"));
        }
        let id = TaskId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        let task = Task::create(id, new, now);
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub(crate) fn get(&self, id: TaskId) -> TaskResult<Task> {
        let index = self.position(id)?;
        Ok(self.tasks[index].clone())
    }

    pub(crate) fn update(
        &mut self,
        id: TaskId,
        update: TaskUpdate,
        now: DateTime<Utc>,
    ) -> TaskResult<Task> {
        let index = self.position(id)?;
        let update = update.validated()?;
        let task = &mut self.tasks[index];
        update.apply_to(task, now);
        Ok(task.clone())
    }

    pub(crate) fn toggle(&mut self, id: TaskId, now: DateTime<Utc>) -> TaskResult<Task> {
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        task.status = task.status.toggled();
        task.updated_at = now;
        Ok(task.clone())
    }

    pub(crate) fn delete(&mut self, id: TaskId) -> TaskResult<()> {
        let index = self.position(id)?;
        self.tasks.remove(index);
        Ok(())
    }

    pub(crate) fn list(&self, filter: &TaskFilter, sort: SortKey) -> Vec<Task> {
        sorted(filter.apply(self.tasks.clone()), sort)
    }

    pub(crate) fn list_by_date(&self, range: &DateRange, now: DateTime<FixedOffset>) -> Vec<Task> {
        if !range.is_recognized() {
            return self.list(&TaskFilter::default(), SortKey::default());
        }
        sorted(
            range.apply(self.tasks.clone(), now),
            SortKey::asc(SortField::DueDate),
        )
    }

    pub(crate) fn all(&self) -> Vec<Task> {
        self.tasks.clone()
    }
}
