//! Task service facade.
//!
//! Composes a [`TaskStore`] with the filter, sort and summary engines. Every
//! call reads fresh from the store and evaluates overdue state against the
//! service clock at that moment; nothing derived is kept between calls.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::due::{task_is_overdue, Clock, RelativeDue, SystemClock};
use crate::error::{TaskError, TaskResult};
use crate::filter::{self, DateRange, TaskFilter};
use crate::sort::{sorted, SortKey};
use crate::store::TaskStore;
use crate::summary::{summarize, DashboardLimits, TaskStats};
use crate::task::{NewTask, Task, TaskId, TaskUpdate};

/// Criteria for [`TaskService::get_tasks`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    /// Explicit ordering. `None` keeps the default (newest first), or due
    /// date order for date-range queries.
    pub sort: Option<SortKey>,
    pub date_range: Option<DateRange>,
}

impl TaskQuery {
    /// Builds a query from raw parameters. Empty strings mean "not given";
    /// unknown tokens are ignored.
    pub fn from_params(
        status: &str,
        priority: &str,
        sort_by: &str,
        sort_order: &str,
        date_filter: &str,
    ) -> Self {
        let date_filter = date_filter.trim();
        Self {
            filter: TaskFilter::from_params(status, priority),
            sort: SortKey::parse(sort_by, sort_order),
            date_range: (!date_filter.is_empty()).then(|| DateRange::from_token(date_filter)),
        }
    }

    pub fn with_filter(mut self, filter: TaskFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    pub fn in_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }
}

/// A task plus the values derived from it at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub is_overdue: bool,
    pub due_label: Option<RelativeDue>,
}

impl TaskView {
    pub fn new(task: Task, now: DateTime<FixedOffset>) -> Self {
        Self {
            is_overdue: task_is_overdue(&task, now),
            due_label: task.due_date.map(|due| RelativeDue::evaluate(due, now)),
            task,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardData {
    pub stats: TaskStats,
    pub recent_tasks: Vec<TaskView>,
    pub overdue_tasks: Vec<TaskView>,
    pub today_tasks: Vec<TaskView>,
    pub upcoming_tasks: Vec<TaskView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub id: TaskId,
    pub error: String,
}

/// Outcome of [`TaskService::bulk_update_tasks`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkUpdateReport {
    pub updated: Vec<TaskId>,
    pub failed: Vec<BulkFailure>,
}

impl BulkUpdateReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct TaskService {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    limits: DashboardLimits,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            limits: DashboardLimits::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_limits(mut self, limits: DashboardLimits) -> Self {
        self.limits = limits;
        self
    }

    fn views(&self, tasks: Vec<Task>, now: DateTime<FixedOffset>) -> Vec<TaskView> {
        tasks.into_iter().map(|task| TaskView::new(task, now)).collect()
    }

    /// Counters and highlight lists, all computed from one store snapshot.
    pub fn get_dashboard_data(&self) -> TaskResult<DashboardData> {
        let now = self.clock.now();
        let tasks = self.store.snapshot()?;
        let summary = summarize(&tasks, now, self.limits);
        debug!(
            total = summary.stats.total,
            overdue = summary.stats.overdue,
            "computed dashboard"
        );

        Ok(DashboardData {
            stats: summary.stats,
            recent_tasks: self.views(summary.recent, now),
            overdue_tasks: self.views(summary.overdue, now),
            today_tasks: self.views(summary.today, now),
            upcoming_tasks: self.views(summary.upcoming, now),
        })
    }

    /// Lists tasks matching `query`.
    ///
    /// A recognized date range is resolved by the store first; status and
    /// priority then narrow that result in memory. Without one, the store
    /// filters and sorts directly.
    pub fn get_tasks(&self, query: &TaskQuery) -> TaskResult<Vec<TaskView>> {
        let now = self.clock.now();
        let tasks = match &query.date_range {
            Some(range) if range.is_recognized() => {
                let in_range = self.store.list_tasks_by_date_filter(range, now)?;
                let narrowed = query.filter.apply(in_range);
                match query.sort {
                    Some(key) => sorted(narrowed, key),
                    None => narrowed,
                }
            }
            range => {
                if let Some(range) = range {
                    warn!(token = %range, "ignoring unrecognized date filter");
                }
                self.store
                    .list_tasks(&query.filter, query.sort.unwrap_or_default())?
            }
        };
        debug!(count = tasks.len(), "listed tasks");
        Ok(self.views(tasks, now))
    }

    pub fn get_task(&self, id: TaskId) -> TaskResult<TaskView> {
        let task = self.store.get_task(id)?;
        Ok(TaskView::new(task, self.clock.now()))
    }

    /// Case-insensitive search over titles and descriptions, newest first.
    pub fn search_tasks(&self, query: &str) -> TaskResult<Vec<TaskView>> {
        let now = self.clock.now();
        let all = self
            .store
            .list_tasks(&TaskFilter::default(), SortKey::default())?;
        let found = filter::search(all, query)?;
        Ok(self.views(found, now))
    }

    pub fn create_task(&self, new: NewTask) -> TaskResult<Task> {
        let task = self.store.create_task(new.validated()?)?;
        info!(id = %task.id, title = %task.title, "created task");
        Ok(task)
    }

    pub fn update_task(&self, id: TaskId, update: TaskUpdate) -> TaskResult<Task> {
        let task = self.store.update_task(id, update.validated()?)?;
        info!(id = %task.id, "updated task");
        Ok(task)
    }

    pub fn toggle_task_complete(&self, id: TaskId) -> TaskResult<Task> {
        let task = self.store.toggle_task_complete(id)?;
        info!(id = %task.id, status = %task.status, "toggled task");
        Ok(task)
    }

    pub fn delete_task(&self, id: TaskId) -> TaskResult<()> {
        self.store.delete_task(id)?;
        info!(id = %id, "deleted task");
        Ok(())
    }

    /// Applies one update to several tasks. The update is validated once up
    /// front; per-task failures are collected rather than aborting the batch.
    pub fn bulk_update_tasks(
        &self,
        ids: &[TaskId],
        update: TaskUpdate,
    ) -> TaskResult<BulkUpdateReport> {
        if ids.is_empty() {
            return Err(TaskError::validation("ids", "no task ids provided"));
        }
        let update = update.validated()?;

        let mut report = BulkUpdateReport::default();
        for &id in ids {
            match self.store.update_task(id, update.clone()) {
                Ok(task) => report.updated.push(task.id),
                Err(err) => {
                    warn!(id = %id, error = %err, "bulk update skipped task");
                    report.failed.push(BulkFailure {
                        id,
                        error: err.to_string(),
                    });
                }
            }
        }
        info!(
            updated = report.updated.len(),
            failed = report.failed.len(),
            "bulk update finished"
        );
        Ok(report)
    }
}
