use crate::batch::BatchReport;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Challenge, ChallengeTask, Task};
use crate::progress::{self, DayBucket};
use crate::recurrence::{self, RecurrencePlan};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// Challenge and task lifecycle: creation, recurrence expansion into
/// per-day tasks, reordering, cascade delete and the progress views.
///
/// Every operation takes the user id explicitly; no ambient auth state.
pub struct ChallengeManager {
    db: Arc<Mutex<Database>>,
}

impl ChallengeManager {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    fn lock_db(&self) -> MutexGuard<'_, Database> {
        match self.db.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("ChallengeManager: database mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn create_challenge(
        &self,
        user_id: &str,
        title: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Challenge> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::validation("challenge title must not be empty"));
        }
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(Error::validation("start date is after end date"));
            }
        }

        let db = self.lock_db();
        let conn = db.connection();

        let position = Challenge::count(conn, user_id)?;
        let mut challenge =
            Challenge::new(user_id, title, start_date, end_date, position, unix_now());
        challenge.save(conn)?;

        info!(
            "created challenge {} for user {}",
            challenge.id.unwrap_or(0),
            user_id
        );
        Ok(challenge)
    }

    pub fn update_challenge(
        &self,
        user_id: &str,
        challenge_id: i64,
        title: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::validation("challenge title must not be empty"));
        }
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(Error::validation("start date is after end date"));
            }
        }

        let db = self.lock_db();
        let conn = db.connection();

        let affected =
            Challenge::update_details(conn, user_id, challenge_id, title, start_date, end_date)?;
        if affected == 0 {
            return Err(Error::validation("challenge not found"));
        }
        Ok(())
    }

    pub fn challenges(&self, user_id: &str) -> Result<Vec<Challenge>> {
        let db = self.lock_db();
        Ok(Challenge::find_all(db.connection(), user_id)?)
    }

    /// Persist a new display order, one position write per challenge.
    ///
    /// On the first failed write, every position written so far is
    /// restored to its previous value before the error is returned, so
    /// the stored order never ends up half-applied.
    pub fn reorder(&self, user_id: &str, ordered_ids: &[i64]) -> Result<()> {
        let db = self.lock_db();
        let conn = db.connection();

        let existing = Challenge::find_all(conn, user_id)?;
        let known: HashSet<i64> = existing.iter().filter_map(|c| c.id).collect();
        let requested: HashSet<i64> = ordered_ids.iter().copied().collect();
        if requested != known || ordered_ids.len() != existing.len() {
            return Err(Error::validation(
                "reorder list must contain each challenge exactly once",
            ));
        }

        let previous: Vec<(i64, i64)> = existing
            .iter()
            .filter_map(|c| c.id.map(|id| (id, c.position)))
            .collect();

        for (position, id) in ordered_ids.iter().enumerate() {
            if let Err(err) = Challenge::set_position(conn, user_id, *id, position as i64) {
                warn!(
                    "reorder failed at challenge {}, rolling back {} positions",
                    id,
                    previous.len()
                );
                for (prev_id, prev_position) in &previous {
                    if let Err(restore_err) =
                        Challenge::set_position(conn, user_id, *prev_id, *prev_position)
                    {
                        warn!(
                            "could not restore challenge {} to position {}: {}",
                            prev_id, prev_position, restore_err
                        );
                    }
                }
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Delete a challenge and all of its tasks. Tasks go first; the
    /// challenge row is removed only once every task delete succeeded.
    /// Failed task deletes are reported per index, not rolled back.
    pub fn delete_challenge(&self, user_id: &str, challenge_id: i64) -> Result<BatchReport> {
        let db = self.lock_db();
        let conn = db.connection();

        Challenge::find(conn, user_id, challenge_id)?
            .ok_or_else(|| Error::validation("challenge not found"))?;

        let tasks = Task::find_for_challenge(conn, challenge_id)?;
        let mut report = BatchReport::new(tasks.len());
        for (index, task) in tasks.iter().enumerate() {
            let Some(task_id) = task.id else { continue };
            if let Err(err) = Task::delete(conn, user_id, task_id) {
                report.record_failure(index, err.into());
            }
        }

        if report.is_complete() {
            Challenge::delete(conn, user_id, challenge_id)?;
            info!(
                "deleted challenge {} and its {} tasks",
                challenge_id, report.attempted
            );
        } else {
            warn!(
                "challenge {} kept: {} of {} task deletes failed",
                challenge_id,
                report.failures.len(),
                report.attempted
            );
        }
        Ok(report)
    }

    /// Expand a recurrence plan into per-day tasks and persist them, one
    /// insert per day. Partial failures stand (no rollback) and are
    /// returned in the report.
    pub fn plan_tasks(
        &self,
        user_id: &str,
        challenge_id: i64,
        plan: &RecurrencePlan,
    ) -> Result<BatchReport> {
        if plan.name.trim().is_empty() {
            return Err(Error::validation("task name must not be empty"));
        }

        let db = self.lock_db();
        let conn = db.connection();

        let challenge = Challenge::find(conn, user_id, challenge_id)?
            .ok_or_else(|| Error::validation("challenge not found"))?;

        // Task dates must stay inside the challenge's range when it has
        // one; checking the bounds covers every emitted day.
        if plan.start_day <= plan.end_day
            && !(challenge.contains_day(plan.start_day) && challenge.contains_day(plan.end_day))
        {
            return Err(Error::validation(
                "plan dates fall outside the challenge date range",
            ));
        }

        let tasks = recurrence::expand(challenge_id, plan, unix_now());
        let mut report = BatchReport::new(tasks.len());
        for (index, mut task) in tasks.into_iter().enumerate() {
            if let Err(err) = task.save(conn) {
                warn!("task insert {} of {} failed", index + 1, report.attempted);
                report.record_failure(index, err.into());
            }
        }

        info!(
            "expanded plan into {} tasks for challenge {} ({} failed)",
            report.attempted,
            challenge_id,
            report.failures.len()
        );
        Ok(report)
    }

    pub fn tasks(&self, user_id: &str, challenge_id: i64) -> Result<Vec<Task>> {
        let db = self.lock_db();
        let conn = db.connection();

        Challenge::find(conn, user_id, challenge_id)?
            .ok_or_else(|| Error::validation("challenge not found"))?;
        Ok(Task::find_for_challenge(conn, challenge_id)?)
    }

    /// Tasks across all challenges scheduled on one day, with challenge
    /// titles attached.
    pub fn tasks_on(&self, user_id: &str, day: NaiveDate) -> Result<Vec<ChallengeTask>> {
        let db = self.lock_db();
        Ok(Task::find_on_day(db.connection(), user_id, day)?)
    }

    pub fn set_completed(&self, user_id: &str, task_id: i64, completed: bool) -> Result<()> {
        let db = self.lock_db();
        let affected = Task::set_completed(db.connection(), user_id, task_id, completed)?;
        if affected == 0 {
            return Err(Error::validation("task not found"));
        }
        Ok(())
    }

    pub fn rename_task(&self, user_id: &str, task_id: i64, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("task name must not be empty"));
        }

        let db = self.lock_db();
        let affected = Task::rename(db.connection(), user_id, task_id, name, unix_now())?;
        if affected == 0 {
            return Err(Error::validation("task not found"));
        }
        Ok(())
    }

    pub fn delete_task(&self, user_id: &str, task_id: i64) -> Result<()> {
        let db = self.lock_db();
        let affected = Task::delete(db.connection(), user_id, task_id)?;
        if affected == 0 {
            return Err(Error::validation("task not found"));
        }
        Ok(())
    }

    /// Completion percentage for one challenge on one day.
    pub fn daily_progress(&self, user_id: &str, challenge_id: i64, day: NaiveDate) -> Result<u32> {
        let tasks = self.tasks(user_id, challenge_id)?;
        Ok(progress::daily_percent(&tasks, day))
    }

    /// Per-day completed/total buckets across every challenge: the
    /// history calendar feed.
    pub fn history(&self, user_id: &str) -> Result<BTreeMap<NaiveDate, DayBucket>> {
        let db = self.lock_db();
        let tasks = Task::find_all_for_user(db.connection(), user_id)?;
        Ok(progress::day_buckets(&tasks))
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System clock is before Unix epoch")
        .as_secs() as i64
}
