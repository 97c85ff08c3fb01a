//! Expansion of a recurrence request into concrete task records.
//!
//! Pure: the caller persists the emitted tasks (one insert per day) and
//! collects per-item failures in a `BatchReport`.

use crate::models::{Task, TaskKind};
use chrono::{Datelike, NaiveDate, Weekday};

/// A set of weekdays, bit-indexed with Sunday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_sunday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_sunday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// A recurrence request: one task per qualifying calendar day in
/// `[start_day, end_day]`.
#[derive(Debug, Clone)]
pub struct RecurrencePlan {
    pub name: String,
    pub kind: TaskKind,
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
    pub active_weekdays: WeekdaySet,
    pub reminder_at: Option<i64>,
}

/// Expand a plan into unsaved task records, chronological order.
///
/// An empty weekday set or an inverted range yields an empty vec; neither
/// is an error.
pub fn expand(challenge_id: i64, plan: &RecurrencePlan, created_at: i64) -> Vec<Task> {
    let mut tasks = Vec::new();
    if plan.active_weekdays.is_empty() {
        return tasks;
    }

    let mut day = plan.start_day;
    while day <= plan.end_day {
        if plan.active_weekdays.contains(day.weekday()) {
            tasks.push(Task::new(
                challenge_id,
                &plan.name,
                plan.kind,
                Some(day),
                plan.reminder_at,
                created_at,
            ));
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan(start: NaiveDate, end: NaiveDate, weekdays: &[Weekday]) -> RecurrencePlan {
        RecurrencePlan {
            name: "Run 30 minutes".to_string(),
            kind: TaskKind::Main,
            start_day: start,
            end_day: end,
            active_weekdays: weekdays.iter().copied().collect(),
            reminder_at: None,
        }
    }

    #[test]
    fn test_one_week_mon_wed_fri() {
        // 2025-06-02 is a Monday.
        let p = plan(
            day(2025, 6, 2),
            day(2025, 6, 8),
            &[Weekday::Mon, Weekday::Wed, Weekday::Fri],
        );
        let tasks = expand(1, &p, 1700000000);

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].date, Some(day(2025, 6, 2)));
        assert_eq!(tasks[1].date, Some(day(2025, 6, 4)));
        assert_eq!(tasks[2].date, Some(day(2025, 6, 6)));
        assert!(tasks.iter().all(|t| !t.completed));
        assert!(tasks.iter().all(|t| t.name == "Run 30 minutes"));
    }

    #[test]
    fn test_empty_weekday_set_produces_no_tasks() {
        let p = plan(day(2025, 6, 2), day(2025, 6, 8), &[]);
        assert!(expand(1, &p, 0).is_empty());
    }

    #[test]
    fn test_inverted_range_produces_no_tasks() {
        let p = plan(day(2025, 6, 8), day(2025, 6, 2), &[Weekday::Mon]);
        assert!(expand(1, &p, 0).is_empty());
    }

    #[test]
    fn test_single_day_range_matching() {
        let p = plan(day(2025, 6, 2), day(2025, 6, 2), &[Weekday::Mon]);
        let tasks = expand(1, &p, 0);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].date, Some(day(2025, 6, 2)));
    }

    #[test]
    fn test_single_day_range_not_matching() {
        let p = plan(day(2025, 6, 2), day(2025, 6, 2), &[Weekday::Tue]);
        assert!(expand(1, &p, 0).is_empty());
    }

    #[test]
    fn test_all_weekdays_covers_every_day() {
        let all: Vec<Weekday> = [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ]
        .to_vec();
        let p = plan(day(2025, 6, 1), day(2025, 6, 30), &all);
        assert_eq!(expand(1, &p, 0).len(), 30);
    }

    #[test]
    fn test_count_matches_weekday_occurrences() {
        // Two full weeks: each selected weekday appears exactly twice.
        let p = plan(
            day(2025, 6, 2),
            day(2025, 6, 15),
            &[Weekday::Tue, Weekday::Sat],
        );
        assert_eq!(expand(1, &p, 0).len(), 4);
    }

    #[test]
    fn test_emission_is_chronological() {
        let p = plan(
            day(2025, 6, 2),
            day(2025, 6, 15),
            &[Weekday::Sun, Weekday::Thu],
        );
        let tasks = expand(1, &p, 0);
        let dates: Vec<_> = tasks.iter().filter_map(|t| t.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_weekday_set_basics() {
        let mut set = WeekdaySet::EMPTY;
        assert!(set.is_empty());
        set.insert(Weekday::Sun);
        set.insert(Weekday::Sat);
        assert_eq!(set.len(), 2);
        assert!(set.contains(Weekday::Sun));
        assert!(set.contains(Weekday::Sat));
        assert!(!set.contains(Weekday::Wed));
    }
}
