use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{FocusTask, PomodoroSession, SessionStatus};
use crate::stats::{self, FocusStats, StatsRange};
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
/// Upper bound on a configurable work or break length.
pub const MAX_SESSION_MINUTES: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Work,
    Break,
}

/// Outcome of one 1-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Timer is paused or idle; nothing moved.
    Idle,
    Running,
    /// Work countdown hit zero; the timer flipped to break mode and
    /// stopped.
    WorkFinished,
    /// Break countdown hit zero; the timer flipped back to work mode and
    /// stopped.
    BreakFinished,
}

/// In-memory countdown: `idle -> running -> (work | break finished) -> idle`.
///
/// Driven by an external 1-second tick; pausing suspends ticks without
/// losing the remaining time. Only one countdown exists per view, so
/// there is no contention to coordinate.
#[derive(Debug, Clone)]
pub struct Countdown {
    work_minutes: u32,
    break_minutes: u32,
    minutes: u32,
    seconds: u32,
    mode: Mode,
    running: bool,
}

impl Countdown {
    pub fn new(work_minutes: u32, break_minutes: u32) -> Self {
        Self {
            work_minutes,
            break_minutes,
            minutes: work_minutes,
            seconds: 0,
            mode: Mode::Work,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Back to a stopped work countdown at full length. Does not touch
    /// any persisted session.
    pub fn reset(&mut self) {
        self.running = false;
        self.mode = Mode::Work;
        self.minutes = self.work_minutes;
        self.seconds = 0;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        if self.seconds == 0 {
            if self.minutes == 0 {
                self.running = false;
                return match self.mode {
                    Mode::Work => {
                        self.mode = Mode::Break;
                        self.minutes = self.break_minutes;
                        Tick::WorkFinished
                    }
                    Mode::Break => {
                        self.mode = Mode::Work;
                        self.minutes = self.work_minutes;
                        Tick::BreakFinished
                    }
                };
            }
            self.minutes -= 1;
            self.seconds = 59;
        } else {
            self.seconds -= 1;
        }
        Tick::Running
    }

    pub fn remaining(&self) -> (u32, u32) {
        (self.minutes, self.seconds)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_MINUTES, DEFAULT_BREAK_MINUTES)
    }
}

struct CurrentSession {
    id: i64,
    user_id: String,
    task_id: Option<i64>,
    planned_minutes: i64,
}

/// Session bookkeeping around the countdown: one persisted record per
/// attempted session, created at start and terminally updated exactly
/// once on finish or skip.
pub struct PomodoroManager {
    db: Arc<Mutex<Database>>,
    current: Mutex<Option<CurrentSession>>,
}

impl PomodoroManager {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self {
            db,
            current: Mutex::new(None),
        }
    }

    fn lock_db(&self) -> MutexGuard<'_, Database> {
        match self.db.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("PomodoroManager: database mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<CurrentSession>> {
        self.current.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn add_focus_task(&self, user_id: &str, name: &str) -> Result<FocusTask> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("task name must not be empty"));
        }

        let db = self.lock_db();
        let mut task = FocusTask::new(user_id, name, unix_now());
        task.save(db.connection())?;
        Ok(task)
    }

    pub fn focus_tasks(&self, user_id: &str) -> Result<Vec<FocusTask>> {
        let db = self.lock_db();
        Ok(FocusTask::find_all(db.connection(), user_id)?)
    }

    /// Create the single session record for a new attempt and remember
    /// its id for the terminal update.
    pub fn start(
        &self,
        user_id: &str,
        task_id: Option<i64>,
        planned_minutes: i64,
    ) -> Result<PomodoroSession> {
        if planned_minutes < 1 || planned_minutes > MAX_SESSION_MINUTES as i64 {
            return Err(Error::validation(format!(
                "planned minutes must be between 1 and {}",
                MAX_SESSION_MINUTES
            )));
        }

        let mut current = self.lock_current();
        if current.is_some() {
            return Err(Error::validation("a session is already running"));
        }

        let db = self.lock_db();
        let mut session = PomodoroSession::new(user_id, task_id, planned_minutes, unix_now());
        session.save(db.connection())?;

        let id = session.id.unwrap_or(0);
        *current = Some(CurrentSession {
            id,
            user_id: user_id.to_string(),
            task_id,
            planned_minutes,
        });
        info!("started pomodoro session {} for user {}", id, user_id);
        Ok(session)
    }

    /// Terminal transition for a finished work countdown. Updates the
    /// record created at start; never creates a second one. Returns
    /// `None` when there is no start record to update.
    pub fn finish(&self, user_id: &str) -> Result<Option<PomodoroSession>> {
        self.close_current(user_id, SessionStatus::Completed)
    }

    /// Terminal transition for a user-cancelled attempt; the session is
    /// kept with zero focus minutes so statistics stay honest.
    pub fn skip(&self, user_id: &str) -> Result<Option<PomodoroSession>> {
        self.close_current(user_id, SessionStatus::Skipped)
    }

    fn close_current(
        &self,
        user_id: &str,
        status: SessionStatus,
    ) -> Result<Option<PomodoroSession>> {
        let mut current = self.lock_current();
        let Some(session) = current.take() else {
            // No start record: write nothing rather than risk a
            // duplicate statistics row.
            warn!("{} called with no running session", status.as_str());
            return Ok(None);
        };

        if session.user_id != user_id {
            // The remembered id belongs to another user's attempt; keep
            // it so the owner's terminal write can still land.
            let id = session.id;
            *current = Some(session);
            warn!("user {} tried to close session {} it did not start", user_id, id);
            return Err(Error::validation("no running session for this user"));
        }

        let actual_minutes = match status {
            SessionStatus::Completed => session.planned_minutes,
            SessionStatus::Running | SessionStatus::Skipped => 0,
        };

        let db = self.lock_db();
        let conn = db.connection();
        let updated = match PomodoroSession::mark_terminal(
            conn,
            user_id,
            session.id,
            status,
            unix_now(),
            actual_minutes,
        ) {
            Ok(updated) => updated,
            Err(err) => {
                // Keep the start record id so the caller can retry the
                // terminal write; the persisted row is still `running`.
                *current = Some(session);
                return Err(err.into());
            }
        };

        if !updated {
            warn!(
                "session {} was already terminal, skipping duplicate update",
                session.id
            );
            return Ok(None);
        }

        if let Some(task_id) = session.task_id {
            if let Err(err) = FocusTask::increment_counter(conn, user_id, task_id) {
                warn!("failed to bump counter for focus task {}: {}", task_id, err);
            }
        }

        info!("session {} closed as {}", session.id, status.as_str());
        Ok(PomodoroSession::find(conn, user_id, session.id)?)
    }

    pub fn statistics(&self, user_id: &str, range: StatsRange) -> Result<FocusStats> {
        self.statistics_at(user_id, range, unix_now())
    }

    /// Statistics with an explicit clock, for deterministic callers.
    pub fn statistics_at(&self, user_id: &str, range: StatsRange, now: i64) -> Result<FocusStats> {
        let window = stats::window(range, now);

        let db = self.lock_db();
        let conn = db.connection();

        let current = PomodoroSession::find_in_range(conn, user_id, window.current_start, i64::MAX)?;
        let previous = match window.previous {
            Some((start, end)) => PomodoroSession::find_in_range(conn, user_id, start, end)?,
            None => Vec::new(),
        };
        let tasks = FocusTask::find_all(conn, user_id)?;

        Ok(stats::summarize(&current, &previous, &tasks))
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System clock is before Unix epoch")
        .as_secs() as i64
}
