use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Completed,
    Skipped,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

impl FromStr for SessionStatus {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "running" => Ok(SessionStatus::Running),
            "completed" => Ok(SessionStatus::Completed),
            "skipped" => Ok(SessionStatus::Skipped),
            _ => Err(()),
        }
    }
}

impl ToSql for SessionStatus {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for SessionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|_| FromSqlError::InvalidType)
    }
}

/// One attempted pomodoro: created once at start, terminally updated at
/// most once. The terminal update is guarded on `status = 'running'` so a
/// duplicate finish or skip can never produce a second statistics row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroSession {
    pub id: Option<i64>,
    pub user_id: String,
    pub task_id: Option<i64>,
    pub planned_minutes: i64,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub status: SessionStatus,
    pub actual_focus_minutes: Option<i64>,
}

impl PomodoroSession {
    pub fn new(user_id: &str, task_id: Option<i64>, planned_minutes: i64, started_at: i64) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            task_id,
            planned_minutes,
            started_at,
            ended_at: None,
            status: SessionStatus::Running,
            actual_focus_minutes: None,
        }
    }

    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO pomodoro_sessions (user_id, task_id, planned_minutes, started_at, ended_at, status, actual_focus_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                self.user_id,
                self.task_id,
                self.planned_minutes,
                self.started_at,
                self.ended_at,
                self.status,
                self.actual_focus_minutes,
            ],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Apply the one allowed terminal transition. Returns false when the
    /// session was already terminal (or does not exist), in which case
    /// nothing was written.
    pub fn mark_terminal(
        conn: &Connection,
        user_id: &str,
        id: i64,
        status: SessionStatus,
        ended_at: i64,
        actual_focus_minutes: i64,
    ) -> Result<bool> {
        debug_assert!(status.is_terminal());
        let affected = conn.execute(
            "UPDATE pomodoro_sessions
             SET status = ?1, ended_at = ?2, actual_focus_minutes = ?3
             WHERE user_id = ?4 AND id = ?5 AND status = 'running'",
            params![status, ended_at, actual_focus_minutes, user_id, id],
        )?;
        Ok(affected == 1)
    }

    pub fn find(conn: &Connection, user_id: &str, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, task_id, planned_minutes, started_at, ended_at, status, actual_focus_minutes
             FROM pomodoro_sessions WHERE user_id = ?1 AND id = ?2",
        )?;

        let mut rows = stmt.query_map(params![user_id, id], Self::from_row)?;
        rows.next().transpose()
    }

    pub fn find_all(conn: &Connection, user_id: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, task_id, planned_minutes, started_at, ended_at, status, actual_focus_minutes
             FROM pomodoro_sessions WHERE user_id = ?1 ORDER BY started_at ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![user_id], Self::from_row)?;
        rows.collect()
    }

    /// Sessions with `started_at` in `[start, end)`.
    pub fn find_in_range(conn: &Connection, user_id: &str, start: i64, end: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, task_id, planned_minutes, started_at, ended_at, status, actual_focus_minutes
             FROM pomodoro_sessions
             WHERE user_id = ?1 AND started_at >= ?2 AND started_at < ?3
             ORDER BY started_at ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![user_id, start, end], Self::from_row)?;
        rows.collect()
    }

    pub fn count(conn: &Connection, user_id: &str) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM pomodoro_sessions WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
    }

    fn from_row(row: &rusqlite::Row<'_>) -> Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            user_id: row.get(1)?,
            task_id: row.get(2)?,
            planned_minutes: row.get(3)?,
            started_at: row.get(4)?,
            ended_at: row.get(5)?,
            status: row.get(6)?,
            actual_focus_minutes: row.get(7)?,
        })
    }
}
