//! Statistics over named time windows
//!
//! Counts tasks created and completed inside a window anchored at "now" in
//! local time. Window membership is strict on both ends (`start < t < end`),
//! so a task created exactly at the window start is excluded. A task with
//! no completion timestamp substitutes the current instant as its effective
//! completion time before the window test; since the windows end at (or
//! before) that same instant and the comparison is strict, such a task
//! never counts as completed. Both behaviors are inherited from the data
//! this tracker is compatible with and are pinned by tests.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::Serialize;

use crate::error::{Error, Result};

use super::task::Task;

/// A named relative time window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Local midnight of the current day until now
    Today,
    /// Local midnight of the previous day until midnight of the current day
    Yesterday,
    /// Seven calendar days ago, same clock time, until now
    Week,
    /// One calendar month ago, same day and clock time, until now
    Month,
}

impl Period {
    /// Parses a period keyword
    pub fn from_param(param: &str) -> Result<Self> {
        match param {
            "today" => Ok(Period::Today),
            "yesterday" => Ok(Period::Yesterday),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(Error::not_found(format!("unknown period '{other}'"))),
        }
    }
}

/// Aggregate counts for one period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Statistics {
    /// Tasks whose creation instant falls inside the window
    pub created: u64,
    /// Tasks whose (effective) completion instant falls inside the window
    pub completed: u64,
}

/// Computes the `(start, end)` bounds for a period relative to `now`;
/// membership tests in [`stat`] are strictly between both bounds
pub fn period_window(period: Period, now: DateTime<Local>) -> (DateTime<Local>, DateTime<Local>) {
    let today = now.date_naive();
    match period {
        Period::Today => (to_local(midnight(today), now), now),
        Period::Yesterday => {
            let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
            (to_local(midnight(yesterday), now), to_local(midnight(today), now))
        }
        Period::Week => {
            let start_day = today.checked_sub_days(Days::new(7)).unwrap_or(today);
            (to_local(start_day.and_time(now.time()), now), now)
        }
        Period::Month => (to_local(one_month_before(now.naive_local()), now), now),
    }
}

/// Counts tasks created/completed inside the period's window
pub fn stat(tasks: &[Task], period: Period, now: DateTime<Local>) -> Statistics {
    let (start, end) = period_window(period, now);
    let mut stats = Statistics::default();
    for task in tasks {
        let created = task.created_at.with_timezone(&Local);
        // An incomplete task is treated as if it completed right now.
        let completed = task
            .completed_at
            .map(|t| t.with_timezone(&Local))
            .unwrap_or(now);
        if created > start && created < end {
            stats.created += 1;
        }
        if completed > start && completed < end {
            stats.completed += 1;
        }
    }
    stats
}

fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// Resolves a naive local datetime to an instant; a time skipped or doubled
/// by a DST transition resolves to the earliest candidate, falling back to
/// `now` when the time does not exist at all
fn to_local(naive: NaiveDateTime, now: DateTime<Local>) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or(now)
}

/// One calendar month earlier, with day overflow rolling into the next
/// month (2024-03-31 minus one month is 2024-03-02)
fn one_month_before(naive: NaiveDateTime) -> NaiveDateTime {
    let (year, month) = if naive.month() == 1 {
        (naive.year() - 1, 12)
    } else {
        (naive.year(), naive.month() - 1)
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(naive.date());
    let date = first
        .checked_add_days(Days::new(u64::from(naive.day() - 1)))
        .unwrap_or(naive.date());
    date.and_time(naive.time())
}
