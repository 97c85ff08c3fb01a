//! Completion aggregation over task snapshots.
//!
//! Pure computations, re-run on every call; nothing here caches or
//! mutates. Tasks without a date are unscheduled and contribute to no
//! bucket.

use crate::models::Task;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Completed/total counts for one calendar day. Derived on demand,
/// never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub completed: usize,
    pub total: usize,
}

impl DayBucket {
    /// Integer percentage, round half up. 0 for an empty bucket.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (100.0 * self.completed as f64 / self.total as f64).round() as u32
    }
}

/// Completion percentage for the tasks scheduled on `day`.
pub fn daily_percent(tasks: &[Task], day: NaiveDate) -> u32 {
    let mut bucket = DayBucket::default();
    for task in tasks.iter().filter(|t| t.date == Some(day)) {
        bucket.total += 1;
        if task.completed {
            bucket.completed += 1;
        }
    }
    bucket.percent()
}

/// Group tasks by calendar day. Each group keeps ascending date order
/// with the original slice order as tie-break; undated tasks are
/// excluded.
pub fn group_by_day(tasks: &[Task]) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(date) = task.date {
            groups.entry(date).or_default().push(task);
        }
    }
    groups
}

/// Per-day completed/total counts across a task snapshot: the history
/// calendar feed.
pub fn day_buckets(tasks: &[Task]) -> BTreeMap<NaiveDate, DayBucket> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for task in tasks {
        if let Some(date) = task.date {
            let bucket = buckets.entry(date).or_default();
            bucket.total += 1;
            if task.completed {
                bucket.completed += 1;
            }
        }
    }
    buckets
}
