use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info};

use super::table::TaskTable;
use super::{read_table, write_table, TaskStore};
use crate::due::{Clock, SystemClock};
use crate::error::{TaskError, TaskResult};
use crate::filter::{DateRange, TaskFilter};
use crate::sort::SortKey;
use crate::task::{NewTask, Task, TaskId, TaskUpdate};

pub const DEFAULT_DATA_FILE: &str = "taskers.json";

/// Store backed by a pretty-printed JSON document.
///
/// The whole table is rewritten after each mutation, while the write lock is
/// held. If the write fails the in-memory table is left as it was.
pub struct JsonFileStore {
    path: PathBuf,
    table: RwLock<TaskTable>,
    clock: Arc<dyn Clock>,
}

impl JsonFileStore {
    /// Loads `path`, treating a missing file as an empty store.
    pub fn open(path: impl AsRef<Path>) -> TaskResult<Self> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    pub fn open_with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> TaskResult<Self> {
        let path = path.as_ref().to_path_buf();
        let table = load_table(&path)?;
        info!(path = %path.display(), tasks = table.len(), "opened task file");
        Ok(Self {
            path,
            table: RwLock::new(table),
            clock,
        })
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    /// Applies `change` to a copy of the table and swaps it in once saved.
    fn mutate<R>(
        &self,
        change: impl FnOnce(&mut TaskTable, DateTime<Utc>) -> TaskResult<R>,
    ) -> TaskResult<R> {
        let now = self.now();
        let mut guard = write_table(&self.table)?;
        let mut draft = guard.clone();
        let result = change(&mut draft, now)?;
        save_table(&self.path, &draft)?;
        *guard = draft;
        Ok(result)
    }
}

fn load_table(path: &Path) -> TaskResult<TaskTable> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "task file missing, starting empty");
            return Ok(TaskTable::default());
        }
        Err(err) => {
            return Err(TaskError::unavailable(format!(
                "failed to read {}: {err}",
                path.display()
            )))
        }
    };
    let data = data.trim_start();
    if data.is_empty() {
        return Ok(TaskTable::default());
    }
    // Kanban board files are a bare array of rows.
    if data.starts_with('[') {
        return Err(TaskError::unavailable(format!(
            "{} is a kanban board file, not a task file; move it aside or pick another data file",
            path.display()
        )));
    }
    let table: TaskTable = serde_json::from_str(data)?;
    table.verified()
}

fn save_table(path: &Path, table: &TaskTable) -> TaskResult<()> {
    let failed = |err: std::io::Error| {
        TaskError::unavailable(format!("failed to save {}: {err}", path.display()))
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(failed)?;
    }
    let content = serde_json::to_string_pretty(table)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, content)
        .and_then(|()| fs::rename(&staging, path))
        .map_err(failed)
}

impl TaskStore for JsonFileStore {
    fn create_task(&self, new: NewTask) -> TaskResult<Task> {
        let task = self.mutate(|table, now| table.create(new, now))?;
        info!(id = %task.id, "task created");
        Ok(task)
    }

    fn get_task(&self, id: TaskId) -> TaskResult<Task> {
        read_table(&self.table)?.get(id)
    }

    fn update_task(&self, id: TaskId, update: TaskUpdate) -> TaskResult<Task> {
        self.mutate(|table, now| table.update(id, update, now))
    }

    fn toggle_task_complete(&self, id: TaskId) -> TaskResult<Task> {
        self.mutate(|table, now| table.toggle(id, now))
    }

    fn delete_task(&self, id: TaskId) -> TaskResult<()> {
        self.mutate(|table, _| table.delete(id))
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
    use crate::task::{Priority, TaskStatus};
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("tasks.json");
        (temp_dir, path)
    }

    #[test]
    fn missing_file_opens_empty() {
        let (_temp, path) = setup();
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.snapshot().unwrap().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn mutations_survive_reopen() {
        let (_temp, path) = setup();
        let store = JsonFileStore::open(&path).unwrap();
        let task = store
            .create_task(NewTask::new("Water plants").priority(Priority::Low))
            .unwrap();
        store.toggle_task_complete(task.id).unwrap();
        store.create_task(NewTask::new("Call mum")).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        let tasks = reopened.snapshot().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Water plants");
        assert_eq!(tasks[0].status, TaskStatus::Completed);
    }

    #[test]
    fn deleted_ids_stay_retired_across_reopen() {
        let (_temp, path) = setup();
        let store = JsonFileStore::open(&path).unwrap();
        store.create_task(NewTask::new("one")).unwrap();
        let two = store.create_task(NewTask::new("two")).unwrap();
        store.delete_task(two.id).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        let three = reopened.create_task(NewTask::new("three")).unwrap();
        assert_eq!(three.id, TaskId(3));
    }

    #[test]
    fn corrupt_file_reports_store_unavailable() {
        let (_temp, path) = setup();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(&path).err().unwrap();
        assert!(matches!(err, TaskError::StoreUnavailable { .. }));
    }

    #[test]
    fn duplicate_ids_in_file_are_rejected() {
        let (_temp, path) = setup();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"next_id":2,"tasks":[
                {"id":1,"title":"a","description":"","priority":"medium","status":"pending",
                 "due_date":null,"created_at":"2024-03-15T12:00:00Z","updated_at":"2024-03-15T12:00:00Z"},
                {"id":1,"title":"b","description":"","priority":"medium","status":"pending",
                 "due_date":null,"created_at":"2024-03-15T12:00:00Z","updated_at":"2024-03-15T12:00:00Z"}
            ]}"#,
        )
        .unwrap();

        let err = JsonFileStore::open(&path).err().unwrap();
        assert!(matches!(err, TaskError::StoreUnavailable { .. }));
        assert!(err.to_string().contains("duplicate task id 1"));
    }

    #[test]
    fn blank_titles_in_file_are_rejected_and_padding_is_trimmed() {
        let (_temp, path) = setup();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let row = |id: u32, title: &str| {
            format!(
                r#"{{"id":{id},"title":"{title}","description":" notes ","priority":"low","status":"pending","due_date":null,"created_at":"2024-03-15T12:00:00Z","updated_at":"2024-03-15T12:00:00Z"}}"#
            )
        };

        fs::write(&path, format!(r#"{{"next_id":3,"tasks":[{},{}]}}"#, row(1, "a"), row(2, ""))).unwrap();
        let err = JsonFileStore::open(&path).err().unwrap();
        assert!(err.to_string().contains("task 2"));

        fs::write(&path, format!(r#"{{"next_id":2,"tasks":[{}]}}"#, row(1, "  a  "))).unwrap();
        let task = JsonFileStore::open(&path).unwrap().get_task(TaskId(1)).unwrap();
        assert_eq!(task.title, "a");
        assert_eq!(task.description, "notes");
    }

    #[test]
    fn kanban_board_file_gets_a_clear_error() {
        let (_temp, path) = setup();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"[{"id":1,"description":"old","status":"Todo"}]"#).unwrap();

        let err = JsonFileStore::open(&path).err().unwrap();
        assert!(matches!(err, TaskError::StoreUnavailable { .. }));
        assert!(err.to_string().contains("kanban board file"));
    }

    #[test]
    fn failed_save_leaves_memory_unchanged() {
        let (temp, path) = setup();
        let store = JsonFileStore::open(&path).unwrap();
        // A regular file where the data directory should go.
        fs::write(temp.path().join("data"), "").unwrap();

        let err = store.create_task(NewTask::new("lost")).unwrap_err();
        assert!(matches!(err, TaskError::StoreUnavailable { .. }));
        assert!(err.to_string().contains("tasks.json"));
        assert!(store.snapshot().unwrap().is_empty());
    }

    #[test]
    fn rejected_create_does_not_touch_the_file() {
        let (_temp, path) = setup();
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.create_task(NewTask::new("")).is_err());
        assert!(!path.exists());
    }
}
