use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TaskError, TaskResult};

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Store-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort rank, `low < medium < high`.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(TaskError::validation(
                "priority",
                format!("unknown priority '{other}', expected low, medium or high"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(TaskError::validation(
                "status",
                format!("unknown status '{other}', expected pending or completed"),
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a freshly created task. Status always starts pending.
    pub fn create(id: TaskId, new: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            priority: new.priority.unwrap_or_default(),
            status: TaskStatus::Pending,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

pub(crate) fn normalize_title(title: &str) -> TaskResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::validation("title", "title cannot be empty"));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(TaskError::validation(
            "title",
            format!("title is {len} characters, maximum is {MAX_TITLE_CHARS}"),
        ));
    }
    Ok(title.to_string())
}

pub(crate) fn normalize_description(description: &str) -> TaskResult<String> {
    let description = description.trim();
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_CHARS {
        return Err(TaskError::validation(
            "description",
            format!("description is {len} characters, maximum is {MAX_DESCRIPTION_CHARS}"),
        ));
    }
    Ok(description.to_string())
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Trims text fields and checks their limits.
    pub fn validated(self) -> TaskResult<Self> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            description: normalize_description(&self.description)?,
            ..self
        })
    }
}

/// Partial update of a task. `None` leaves a field unchanged.
///
/// `due_date` is doubly optional: `Some(None)` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskUpdate {
    /// Parses raw field values. Empty strings mean "leave unchanged"; any other
    /// unknown status or priority is rejected.
    pub fn from_params(
        title: &str,
        description: &str,
        status: &str,
        priority: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> TaskResult<Self> {
        fn non_empty(value: &str) -> Option<&str> {
            let value = value.trim();
            (!value.is_empty()).then_some(value)
        }

        Ok(Self {
            title: non_empty(title).map(str::to_string),
            description: non_empty(description).map(str::to_string),
            status: non_empty(status).map(str::parse::<TaskStatus>).transpose()?,
            priority: non_empty(priority).map(str::parse::<Priority>).transpose()?,
            due_date: due_date.map(Some),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }

    pub fn validated(self) -> TaskResult<Self> {
        if self.is_empty() {
            return Err(TaskError::validation("update", "no fields to update"));
        }
        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            description: self
                .description
                .as_deref()
                .map(normalize_description)
                .transpose()?,
            ..self
        })
    }

    /// Writes the present fields into `task`. Callers validate first.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description.clone_from(description);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        task.updated_at = now;
    }
}
