//! # taskers
//!
//! Personal task manager core: overdue evaluation, filtering, sorting and
//! dashboard aggregation over a pluggable task store.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use taskers::{MemoryStore, NewTask, TaskQuery, TaskService};
//!
//! let service = TaskService::new(Arc::new(MemoryStore::new()));
//! service.create_task(NewTask::new("Buy milk"))?;
//! let dashboard = service.get_dashboard_data()?;
//! let pending = service.get_tasks(&TaskQuery::from_params("pending", "", "", "", ""))?;
//! ```

pub mod config;
pub mod due;
pub mod error;
pub mod filter;
pub mod service;
pub mod sort;
pub mod store;
pub mod summary;
pub mod task;

pub use config::Config;
pub use due::{Clock, FixedClock, RelativeDue, SystemClock};
pub use error::{TaskError, TaskResult};
pub use filter::{DateRange, TaskFilter};
pub use service::{BulkUpdateReport, DashboardData, TaskQuery, TaskService, TaskView};
pub use sort::{SortDirection, SortField, SortKey};
pub use store::{JsonFileStore, MemoryStore, TaskStore};
pub use summary::{DashboardLimits, TaskStats};
pub use task::{NewTask, Priority, Task, TaskId, TaskStatus, TaskUpdate};
