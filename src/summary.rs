//! Dashboard aggregation.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::due::{calendar_days_until, task_is_overdue};
use crate::filter::DateRange;
use crate::sort::{sort_tasks, SortField, SortKey};
use crate::task::{Task, TaskStatus};

pub const DEFAULT_RECENT_LIMIT: usize = 5;
pub const DEFAULT_OVERDUE_LIMIT: usize = 3;

/// Sizes of the dashboard highlight lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardLimits {
    pub recent: usize,
    pub overdue: usize,
}

impl Default for DashboardLimits {
    fn default() -> Self {
        Self {
            recent: DEFAULT_RECENT_LIMIT,
            overdue: DEFAULT_OVERDUE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub stats: TaskStats,
    /// Newest tasks first, any status.
    pub recent: Vec<Task>,
    /// Most overdue first.
    pub overdue: Vec<Task>,
    /// Due today, any status.
    pub today: Vec<Task>,
    /// Due within the coming week, excluding today.
    pub upcoming: Vec<Task>,
}

pub fn count(tasks: &[Task], now: DateTime<FixedOffset>) -> TaskStats {
    tasks.iter().fold(
        TaskStats {
            total: tasks.len(),
            ..TaskStats::default()
        },
        |mut stats, task| {
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
            if task_is_overdue(task, now) {
                stats.overdue += 1;
            }
            stats
        },
    )
}

fn newest_first(a: &Task, b: &Task) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Selects from `tasks` without touching it.
pub fn summarize(tasks: &[Task], now: DateTime<FixedOffset>, limits: DashboardLimits) -> Summary {
    let mut recent: Vec<Task> = tasks.to_vec();
    recent.sort_by(newest_first);
    recent.truncate(limits.recent);

    let by_due = SortKey::asc(SortField::DueDate);

    let mut overdue: Vec<Task> = tasks
        .iter()
        .filter(|task| task_is_overdue(task, now))
        .cloned()
        .collect();
    sort_tasks(&mut overdue, by_due);
    overdue.truncate(limits.overdue);

    let mut today: Vec<Task> = tasks
        .iter()
        .filter(|task| DateRange::Today.matches(task, now))
        .cloned()
        .collect();
    sort_tasks(&mut today, by_due);

    let mut upcoming: Vec<Task> = tasks
        .iter()
        .filter(|task| {
            task.due_date
                .is_some_and(|due| calendar_days_until(due, now) > 0)
                && DateRange::Week.matches(task, now)
        })
        .cloned()
        .collect();
    sort_tasks(&mut upcoming, by_due);

    Summary {
        stats: count(tasks, now),
        recent,
        overdue,
        today,
        upcoming,
    }
}
