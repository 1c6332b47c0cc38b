//! Error types for task operations.

use thiserror::Error;

use crate::task::TaskId;

/// Errors returned by stores and the task service.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Input was rejected before reaching the store
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// No task with this id
    #[error("task {id} not found")]
    NotFound { id: TaskId },

    /// The store could not be read or written
    #[error("task store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// Bad configuration value
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl TaskError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        Self::unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        Self::unavailable(format!("malformed task data: {err}"))
    }
}

/// Result alias used throughout the crate.
pub type TaskResult<T> = Result<T, TaskError>;
