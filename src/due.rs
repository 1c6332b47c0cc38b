//! Due-date evaluation: overdue state and relative labels.
//!
//! Everything here is a pure function of a due date and "now". Nothing is
//! cached on the task; callers pass the current instant on every read.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use serde::{Serialize, Serializer};

use crate::task::{Task, TaskStatus};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Source of the current instant.
///
/// The offset of the returned time decides where calendar days begin.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the machine's local offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to one instant, for tests and reproducible reports.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self(now.fixed_offset())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// A task is overdue when it is pending and its due date has passed.
pub fn is_overdue(
    status: TaskStatus,
    due_date: Option<DateTime<Utc>>,
    now: DateTime<FixedOffset>,
) -> bool {
    match due_date {
        Some(due) => status == TaskStatus::Pending && due < now.with_timezone(&Utc),
        None => false,
    }
}

pub fn task_is_overdue(task: &Task, now: DateTime<FixedOffset>) -> bool {
    is_overdue(task.status, task.due_date, now)
}

/// `ceil((due - now) / 1 day)`.
pub fn day_offset(due: DateTime<Utc>, now: DateTime<FixedOffset>) -> i64 {
    let millis = (due - now.with_timezone(&Utc)).num_milliseconds();
    // Integer division truncates toward zero, which is already the ceiling
    // for negative values.
    let days = millis / MILLIS_PER_DAY;
    if millis > 0 && millis % MILLIS_PER_DAY != 0 {
        days + 1
    } else {
        days
    }
}

/// Calendar date of `due` as seen from `now`'s offset.
pub fn due_day(due: DateTime<Utc>, now: DateTime<FixedOffset>) -> NaiveDate {
    due.with_timezone(now.offset()).date_naive()
}

/// Whole calendar days from today to the due date's day.
pub fn calendar_days_until(due: DateTime<Utc>, now: DateTime<FixedOffset>) -> i64 {
    (due_day(due, now) - now.date_naive()).num_days()
}

/// Display bucket for a due date relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDue {
    Today,
    Tomorrow,
    Yesterday,
    InDays(i64),
    DaysAgo(i64),
    On(NaiveDate),
}

impl RelativeDue {
    pub fn evaluate(due: DateTime<Utc>, now: DateTime<FixedOffset>) -> Self {
        match day_offset(due, now) {
            0 => RelativeDue::Today,
            1 => RelativeDue::Tomorrow,
            -1 => RelativeDue::Yesterday,
            days @ 2..=7 => RelativeDue::InDays(days),
            days @ -7..=-2 => RelativeDue::DaysAgo(-days),
            _ => RelativeDue::On(due_day(due, now)),
        }
    }
}

impl fmt::Display for RelativeDue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeDue::Today => f.write_str("today"),
            RelativeDue::Tomorrow => f.write_str("tomorrow"),
            RelativeDue::Yesterday => f.write_str("yesterday"),
            RelativeDue::InDays(days) => write!(f, "in {days} days"),
            RelativeDue::DaysAgo(days) => write!(f, "{days} days ago"),
            RelativeDue::On(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for RelativeDue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap().fixed_offset()
    }

    fn label(offset: Duration) -> String {
        let now = now();
        RelativeDue::evaluate(now.with_timezone(&Utc) + offset, now).to_string()
    }

    #[test]
    fn pending_task_past_due_is_overdue() {
        let due = now().with_timezone(&Utc) - Duration::minutes(1);
        assert!(is_overdue(TaskStatus::Pending, Some(due), now()));
    }

    #[test]
    fn completed_task_is_never_overdue() {
        let due = now().with_timezone(&Utc) - Duration::days(30);
        assert!(!is_overdue(TaskStatus::Completed, Some(due), now()));
    }

    #[test]
    fn missing_due_date_is_never_overdue() {
        assert!(!is_overdue(TaskStatus::Pending, None, now()));
    }

    #[test]
    fn due_exactly_now_is_not_overdue() {
        let due = now().with_timezone(&Utc);
        assert!(!is_overdue(TaskStatus::Pending, Some(due), now()));
    }

    #[test]
    fn day_offset_rounds_toward_the_future() {
        let now = now();
        let at = |d: Duration| now.with_timezone(&Utc) + d;
        assert_eq!(day_offset(at(Duration::zero()), now), 0);
        assert_eq!(day_offset(at(Duration::hours(1)), now), 1);
        assert_eq!(day_offset(at(Duration::hours(24)), now), 1);
        assert_eq!(day_offset(at(Duration::hours(25)), now), 2);
        assert_eq!(day_offset(at(-Duration::hours(1)), now), 0);
        assert_eq!(day_offset(at(-Duration::hours(24)), now), -1);
        assert_eq!(day_offset(at(-Duration::hours(36)), now), -1);
    }

    #[test]
    fn relative_labels_cover_each_bucket() {
        assert_eq!(label(-Duration::hours(3)), "today");
        assert_eq!(label(Duration::hours(20)), "tomorrow");
        assert_eq!(label(-Duration::hours(30)), "yesterday");
        assert_eq!(label(Duration::days(3)), "in 3 days");
        assert_eq!(label(Duration::days(7)), "in 7 days");
        assert_eq!(label(-Duration::days(7)), "7 days ago");
        assert_eq!(label(Duration::days(8)), "2024-03-23");
        assert_eq!(label(-Duration::days(10)), "2024-03-05");
    }

    #[test]
    fn calendar_days_use_the_clock_offset() {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        // 22:30 local time on the 15th.
        let now = offset.with_ymd_and_hms(2024, 3, 15, 22, 30, 0).unwrap();
        // 01:00 local time on the 16th, only two and a half hours later.
        let due = offset
            .with_ymd_and_hms(2024, 3, 16, 1, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(calendar_days_until(due, now), 1);
        assert_eq!(due_day(due, now), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    }

    #[test]
    fn fixed_clock_returns_its_instant() {
        let clock = FixedClock(now());
        assert_eq!(clock.now(), now());
    }
}
