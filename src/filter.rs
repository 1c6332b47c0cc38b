//! Task narrowing by status, priority and named date ranges.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use tracing::warn;

use crate::due::{calendar_days_until, task_is_overdue};
use crate::error::{TaskError, TaskResult};
use crate::task::{Priority, Task, TaskStatus};

/// Days after today still counted by the `week` range.
pub const WEEK_SPAN_DAYS: i64 = 7;

/// Status and priority constraints. Absent fields do not constrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    /// Lenient parsing for queries: empty, `all` and unknown tokens mean
    /// "no constraint".
    pub fn from_params(status: &str, priority: &str) -> Self {
        Self {
            status: lenient_token(status, "status"),
            priority: lenient_token(priority, "priority"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
    }

    /// Keeps matching tasks in their original order.
    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        if self.is_empty() {
            return tasks;
        }
        tasks.into_iter().filter(|task| self.matches(task)).collect()
    }
}

fn lenient_token<T>(raw: &str, what: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(token = raw, "ignoring unrecognized {what} filter");
            None
        }
    }
}

/// Named due-date bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRange {
    /// Due on today's calendar day.
    Today,
    /// Due between today and seven days from now, inclusive.
    Week,
    /// Pending and past due.
    Overdue,
    /// No due date.
    NoDate,
    /// Any other token. Matches every task.
    Unrecognized(String),
}

impl DateRange {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "today" => DateRange::Today,
            "week" => DateRange::Week,
            "overdue" => DateRange::Overdue,
            "no_date" => DateRange::NoDate,
            _ => DateRange::Unrecognized(token.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, DateRange::Unrecognized(_))
    }

    pub fn matches(&self, task: &Task, now: DateTime<FixedOffset>) -> bool {
        match self {
            DateRange::Today => task
                .due_date
                .is_some_and(|due| calendar_days_until(due, now) == 0),
            DateRange::Week => task.due_date.is_some_and(|due| {
                (0..=WEEK_SPAN_DAYS).contains(&calendar_days_until(due, now))
            }),
            DateRange::Overdue => task_is_overdue(task, now),
            DateRange::NoDate => task.due_date.is_none(),
            DateRange::Unrecognized(_) => true,
        }
    }

    pub fn apply(&self, tasks: Vec<Task>, now: DateTime<FixedOffset>) -> Vec<Task> {
        if !self.is_recognized() {
            warn!(token = %self, "ignoring unrecognized date filter");
            return tasks;
        }
        tasks
            .into_iter()
            .filter(|task| self.matches(task, now))
            .collect()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::Today => f.write_str("today"),
            DateRange::Week => f.write_str("week"),
            DateRange::Overdue => f.write_str("overdue"),
            DateRange::NoDate => f.write_str("no_date"),
            DateRange::Unrecognized(token) => f.write_str(token),
        }
    }
}

/// Case-insensitive substring search over title and description.
pub fn search(tasks: Vec<Task>, query: &str) -> TaskResult<Vec<Task>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(TaskError::validation("query", "search query cannot be empty"));
    }
    Ok(tasks
        .into_iter()
        .filter(|task| {
            task.title.to_lowercase().contains(&needle)
                || task.description.to_lowercase().contains(&needle)
        })
        .collect())
}
