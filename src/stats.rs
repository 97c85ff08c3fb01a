//! Focus-time statistics over pomodoro session snapshots.
//!
//! Window arithmetic is done in unix seconds with midnight boundaries
//! (`now - now % 86400`); "month" is a 30-day window. All functions are
//! pure over the records they are given.

use crate::models::{FocusTask, PomodoroSession, SessionStatus};
use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::HashMap;

const DAY_SECS: i64 = 86400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsRange {
    Day,
    Week,
    Month,
    All,
}

/// Current window start plus the matching previous window, both half-open
/// on the right. `All` has no previous window to compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    pub current_start: i64,
    pub previous: Option<(i64, i64)>,
}

pub fn window(range: StatsRange, now: i64) -> StatsWindow {
    let today_start = now - now.rem_euclid(DAY_SECS);
    match range {
        StatsRange::Day => StatsWindow {
            current_start: today_start,
            previous: Some((today_start - DAY_SECS, today_start)),
        },
        StatsRange::Week => {
            let start = today_start - 7 * DAY_SECS;
            StatsWindow {
                current_start: start,
                previous: Some((start - 7 * DAY_SECS, start)),
            }
        }
        StatsRange::Month => {
            let start = today_start - 30 * DAY_SECS;
            StatsWindow {
                current_start: start,
                previous: Some((start - 30 * DAY_SECS, start)),
            }
        }
        StatsRange::All => StatsWindow {
            current_start: 0,
            previous: None,
        },
    }
}

/// Total focus minutes in a snapshot. Sessions without a recorded actual
/// contribute 0.
pub fn total_focus_minutes(sessions: &[PomodoroSession]) -> i64 {
    sessions
        .iter()
        .map(|s| s.actual_focus_minutes.unwrap_or(0))
        .sum()
}

/// Percent change between two totals: 100 when starting from zero with
/// any current activity, otherwise rounded relative difference.
pub fn percent_change(current: i64, previous: i64) -> i64 {
    if previous == 0 {
        return if current > 0 { 100 } else { 0 };
    }
    let diff = (current - previous) as f64;
    (100.0 * diff / previous as f64).round() as i64
}

/// Focus minutes keyed by the (UTC) calendar day a session started on.
pub fn minutes_by_day(sessions: &[PomodoroSession]) -> BTreeMap<NaiveDate, i64> {
    let mut days: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for session in sessions {
        let Some(date) = DateTime::from_timestamp(session.started_at, 0).map(|d| d.date_naive())
        else {
            continue;
        };
        *days.entry(date).or_insert(0) += session.actual_focus_minutes.unwrap_or(0);
    }
    days
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskFocus {
    pub task_id: i64,
    pub name: String,
    pub minutes: i64,
}

/// Rank focus tasks by total completed focus minutes, descending; ties
/// keep the original task order, tasks with no focus time are omitted.
/// Only sessions with status `completed` count.
pub fn minutes_by_task(sessions: &[PomodoroSession], tasks: &[FocusTask]) -> Vec<TaskFocus> {
    let mut minutes: HashMap<i64, i64> = HashMap::new();
    for session in sessions {
        if session.status != SessionStatus::Completed {
            continue;
        }
        if let Some(task_id) = session.task_id {
            *minutes.entry(task_id).or_insert(0) += session.actual_focus_minutes.unwrap_or(0);
        }
    }

    let mut ranked: Vec<TaskFocus> = tasks
        .iter()
        .filter_map(|t| {
            let id = t.id?;
            let mins = *minutes.get(&id).unwrap_or(&0);
            (mins > 0).then(|| TaskFocus {
                task_id: id,
                name: t.name.clone(),
                minutes: mins,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    ranked
}

pub fn count_with_status(sessions: &[PomodoroSession], status: SessionStatus) -> usize {
    sessions.iter().filter(|s| s.status == status).count()
}

/// Assembled statistics for one range selection.
#[derive(Debug, Clone, Serialize)]
pub struct FocusStats {
    pub total_minutes: i64,
    pub previous_minutes: i64,
    pub percent_change: i64,
    pub completed: usize,
    pub skipped: usize,
    pub daily_minutes: BTreeMap<NaiveDate, i64>,
    pub top_tasks: Vec<TaskFocus>,
}

pub fn summarize(
    current: &[PomodoroSession],
    previous: &[PomodoroSession],
    tasks: &[FocusTask],
) -> FocusStats {
    let total_minutes = total_focus_minutes(current);
    let previous_minutes = total_focus_minutes(previous);
    FocusStats {
        total_minutes,
        previous_minutes,
        percent_change: percent_change(total_minutes, previous_minutes),
        completed: count_with_status(current, SessionStatus::Completed),
        skipped: count_with_status(current, SessionStatus::Skipped),
        daily_minutes: minutes_by_day(current),
        top_tasks: minutes_by_task(current, tasks),
    }
}
