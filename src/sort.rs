//! Deterministic task ordering.

use std::cmp::Ordering;
use std::fmt;

use tracing::warn;

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
    Title,
}

impl SortField {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            "due_date" => Some(SortField::DueDate),
            "priority" => Some(SortField::Priority),
            "title" => Some(SortField::Title),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::DueDate => "due_date",
            SortField::Priority => "priority",
            SortField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` selects descending; anything else is ascending.
    pub fn from_token(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortKey {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Parses query parameters. Returns `None` when no field was asked for
    /// or the field is unknown, so callers fall back to their default order.
    pub fn parse(sort_by: &str, sort_order: &str) -> Option<Self> {
        if sort_by.trim().is_empty() {
            return None;
        }
        let field = SortField::from_token(sort_by);
        if field.is_none() {
            warn!(token = sort_by, "ignoring unrecognized sort field");
        }
        field.map(|field| Self::new(field, SortDirection::from_token(sort_order)))
    }

    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let primary = match self.field {
            SortField::CreatedAt => self.direction.apply(a.created_at.cmp(&b.created_at)),
            SortField::UpdatedAt => self.direction.apply(a.updated_at.cmp(&b.updated_at)),
            SortField::Priority => self
                .direction
                .apply(a.priority.rank().cmp(&b.priority.rank())),
            SortField::Title => self.direction.apply(compare_titles(&a.title, &b.title)),
            // Missing due dates go last in both directions.
            SortField::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => self.direction.apply(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{} {}", self.field.as_str(), direction)
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable sort; ties are broken by ascending id.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey) {
    tasks.sort_by(|a, b| key.compare(a, b));
}

pub fn sorted(mut tasks: Vec<Task>, key: SortKey) -> Vec<Task> {
    sort_tasks(&mut tasks, key);
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, Priority, TaskId};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn task(id: u32, title: &str, priority: Priority, due_days: Option<i64>) -> Task {
        let mut new = NewTask::new(title).priority(priority);
        new.due_date = due_days.map(|d| base() + Duration::days(d));
        Task::create(TaskId(id), new, base() + Duration::minutes(i64::from(id)))
    }

    fn ids(tasks: &[Task]) -> Vec<u32> {
        tasks.iter().map(|t| t.id.0).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            task(1, "banana", Priority::Medium, Some(3)),
            task(2, "Apple", Priority::High, None),
            task(3, "cherry", Priority::Low, Some(1)),
            task(4, "apple", Priority::High, Some(3)),
        ]
    }

    #[test]
    fn default_is_newest_first() {
        assert_eq!(ids(&sorted(sample(), SortKey::default())), vec![4, 3, 2, 1]);
    }

    #[test]
    fn priority_uses_rank_not_name() {
        let asc = sorted(sample(), SortKey::asc(SortField::Priority));
        assert_eq!(ids(&asc), vec![3, 1, 2, 4]);

        let desc = sorted(sample(), SortKey::desc(SortField::Priority));
        // Ties keep ascending id order even when descending.
        assert_eq!(ids(&desc), vec![2, 4, 1, 3]);
    }

    #[test]
    fn missing_due_dates_sort_last_both_ways() {
        let asc = sorted(sample(), SortKey::asc(SortField::DueDate));
        assert_eq!(ids(&asc), vec![3, 1, 4, 2]);

        let desc = sorted(sample(), SortKey::desc(SortField::DueDate));
        assert_eq!(ids(&desc), vec![1, 4, 3, 2]);
    }

    #[test]
    fn titles_compare_case_insensitively() {
        let asc = sorted(sample(), SortKey::asc(SortField::Title));
        assert_eq!(ids(&asc), vec![2, 4, 1, 3]);
    }

    #[test]
    fn unknown_sort_params_are_ignored() {
        assert_eq!(SortKey::parse("", "asc"), None);
        assert_eq!(SortKey::parse("colour", "asc"), None);
        assert_eq!(
            SortKey::parse("priority", "DESC"),
            Some(SortKey::desc(SortField::Priority))
        );
        assert_eq!(
            SortKey::parse("title", "sideways"),
            Some(SortKey::asc(SortField::Title))
        );
    }

    #[test]
    fn sorting_twice_changes_nothing() {
        for field in [
            SortField::CreatedAt,
            SortField::DueDate,
            SortField::Priority,
            SortField::Title,
        ] {
            for key in [SortKey::asc(field), SortKey::desc(field)] {
                let once = sorted(sample(), key);
                let twice = sorted(once.clone(), key);
                assert_eq!(once, twice, "{key}");
            }
        }
    }
}
