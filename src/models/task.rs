use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    #[serde(rename = "quicktask")]
    Quick,
    #[serde(rename = "main")]
    Main,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Quick => "quicktask",
            TaskKind::Main => "main",
        }
    }
}

impl FromStr for TaskKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "quicktask" => Ok(TaskKind::Quick),
            "main" => Ok(TaskKind::Main),
            _ => Err(()),
        }
    }
}

impl ToSql for TaskKind {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TaskKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|_| FromSqlError::InvalidType)
    }
}

/// A single dated to-do item belonging to a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub challenge_id: i64,
    pub name: String,
    pub kind: TaskKind,
    /// Calendar day the task is scheduled on; a task without a date is
    /// unscheduled and contributes to no day bucket.
    pub date: Option<NaiveDate>,
    pub reminder_at: Option<i64>,
    pub completed: bool,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

/// A task joined with its parent challenge's title, for cross-challenge
/// day views.
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeTask {
    pub challenge_title: String,
    pub task: Task,
}

impl Task {
    pub fn new(
        challenge_id: i64,
        name: &str,
        kind: TaskKind,
        date: Option<NaiveDate>,
        reminder_at: Option<i64>,
        created_at: i64,
    ) -> Self {
        Self {
            id: None,
            challenge_id,
            name: name.to_string(),
            kind,
            date,
            reminder_at,
            completed: false,
            created_at,
            updated_at: None,
        }
    }

    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO tasks (challenge_id, name, kind, date, reminder_at, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                self.challenge_id,
                self.name,
                self.kind,
                self.date,
                self.reminder_at,
                self.completed,
                self.created_at,
                self.updated_at,
            ],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    pub fn find_for_challenge(conn: &Connection, challenge_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, challenge_id, name, kind, date, reminder_at, completed, created_at, updated_at
             FROM tasks WHERE challenge_id = ?1 ORDER BY date ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![challenge_id], Self::from_row)?;
        rows.collect()
    }

    /// All tasks across all of a user's challenges, date order.
    pub fn find_all_for_user(conn: &Connection, user_id: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT t.id, t.challenge_id, t.name, t.kind, t.date, t.reminder_at, t.completed, t.created_at, t.updated_at
             FROM tasks t JOIN challenges c ON t.challenge_id = c.id
             WHERE c.user_id = ?1 ORDER BY t.date ASC, t.id ASC",
        )?;

        let rows = stmt.query_map(params![user_id], Self::from_row)?;
        rows.collect()
    }

    /// Tasks scheduled on one calendar day across all of a user's
    /// challenges, with the challenge title attached.
    pub fn find_on_day(conn: &Connection, user_id: &str, day: NaiveDate) -> Result<Vec<ChallengeTask>> {
        let mut stmt = conn.prepare(
            "SELECT t.id, t.challenge_id, t.name, t.kind, t.date, t.reminder_at, t.completed, t.created_at, t.updated_at, c.title
             FROM tasks t JOIN challenges c ON t.challenge_id = c.id
             WHERE c.user_id = ?1 AND t.date = ?2 ORDER BY t.date ASC, t.id ASC",
        )?;

        let rows = stmt.query_map(params![user_id, day], |row| {
            Ok(ChallengeTask {
                task: Self::from_row(row)?,
                challenge_title: row.get(9)?,
            })
        })?;
        rows.collect()
    }

    /// Toggle/set the completion flag. Ownership is enforced through the
    /// parent challenge; returns the number of affected rows (0 when the
    /// task does not exist or belongs to another user).
    pub fn set_completed(
        conn: &Connection,
        user_id: &str,
        task_id: i64,
        completed: bool,
    ) -> Result<usize> {
        conn.execute(
            "UPDATE tasks SET completed = ?1
             WHERE id = ?2 AND challenge_id IN (SELECT id FROM challenges WHERE user_id = ?3)",
            params![completed, task_id, user_id],
        )
    }

    pub fn rename(
        conn: &Connection,
        user_id: &str,
        task_id: i64,
        name: &str,
        updated_at: i64,
    ) -> Result<usize> {
        conn.execute(
            "UPDATE tasks SET name = ?1, updated_at = ?2
             WHERE id = ?3 AND challenge_id IN (SELECT id FROM challenges WHERE user_id = ?4)",
            params![name, updated_at, task_id, user_id],
        )
    }

    pub fn delete(conn: &Connection, user_id: &str, task_id: i64) -> Result<usize> {
        conn.execute(
            "DELETE FROM tasks
             WHERE id = ?1 AND challenge_id IN (SELECT id FROM challenges WHERE user_id = ?2)",
            params![task_id, user_id],
        )
    }

    fn from_row(row: &rusqlite::Row<'_>) -> Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            challenge_id: row.get(1)?,
            name: row.get(2)?,
            kind: row.get(3)?,
            date: row.get(4)?,
            reminder_at: row.get(5)?,
            completed: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations, Database};
    use crate::models::Challenge;
    use tempfile::{tempdir, TempDir};

    fn setup_db() -> (Database, TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();
        (db, dir)
    }

    fn make_challenge(conn: &Connection, user_id: &str) -> i64 {
        let mut ch = Challenge::new(user_id, "Test challenge", None, None, 0, 1700000000);
        ch.save(conn).unwrap();
        ch.id.unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_save_and_find_task() {
        let (db, _dir) = setup_db();
        let conn = db.connection();
        let ch_id = make_challenge(conn, "u1");

        let mut task = Task::new(
            ch_id,
            "Run 30 minutes",
            TaskKind::Main,
            Some(day(2025, 6, 2)),
            None,
            1700000000,
        );
        task.save(conn).unwrap();

        let found = Task::find_for_challenge(conn, ch_id).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Run 30 minutes");
        assert_eq!(found[0].kind, TaskKind::Main);
        assert_eq!(found[0].date, Some(day(2025, 6, 2)));
        assert!(!found[0].completed);
    }

    #[test]
    fn test_find_for_challenge_date_order() {
        let (db, _dir) = setup_db();
        let conn = db.connection();
        let ch_id = make_challenge(conn, "u1");

        for d in [day(2025, 6, 6), day(2025, 6, 2), day(2025, 6, 4)] {
            Task::new(ch_id, "t", TaskKind::Quick, Some(d), None, 1700000000)
                .save(conn)
                .unwrap();
        }

        let found = Task::find_for_challenge(conn, ch_id).unwrap();
        let dates: Vec<_> = found.iter().filter_map(|t| t.date).collect();
        assert_eq!(dates, vec![day(2025, 6, 2), day(2025, 6, 4), day(2025, 6, 6)]);
    }

    #[test]
    fn test_find_on_day_carries_challenge_title() {
        let (db, _dir) = setup_db();
        let conn = db.connection();
        let ch_id = make_challenge(conn, "u1");

        Task::new(ch_id, "today", TaskKind::Quick, Some(day(2025, 6, 2)), None, 1700000000)
            .save(conn)
            .unwrap();
        Task::new(ch_id, "tomorrow", TaskKind::Quick, Some(day(2025, 6, 3)), None, 1700000000)
            .save(conn)
            .unwrap();

        let found = Task::find_on_day(conn, "u1", day(2025, 6, 2)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].task.name, "today");
        assert_eq!(found[0].challenge_title, "Test challenge");
    }

    #[test]
    fn test_set_completed() {
        let (db, _dir) = setup_db();
        let conn = db.connection();
        let ch_id = make_challenge(conn, "u1");

        let mut task = Task::new(ch_id, "t", TaskKind::Quick, Some(day(2025, 6, 2)), None, 0);
        task.save(conn).unwrap();
        let task_id = task.id.unwrap();

        let affected = Task::set_completed(conn, "u1", task_id, true).unwrap();
        assert_eq!(affected, 1);

        let found = Task::find_for_challenge(conn, ch_id).unwrap();
        assert!(found[0].completed);
    }

    #[test]
    fn test_set_completed_rejects_other_user() {
        let (db, _dir) = setup_db();
        let conn = db.connection();
        let ch_id = make_challenge(conn, "u1");

        let mut task = Task::new(ch_id, "t", TaskKind::Quick, None, None, 0);
        task.save(conn).unwrap();

        let affected = Task::set_completed(conn, "u2", task.id.unwrap(), true).unwrap();
        assert_eq!(affected, 0);
    }

    #[test]
    fn test_rename_sets_updated_at() {
        let (db, _dir) = setup_db();
        let conn = db.connection();
        let ch_id = make_challenge(conn, "u1");

        let mut task = Task::new(ch_id, "old", TaskKind::Quick, None, None, 0);
        task.save(conn).unwrap();

        Task::rename(conn, "u1", task.id.unwrap(), "new", 1700000500).unwrap();

        let found = Task::find_for_challenge(conn, ch_id).unwrap();
        assert_eq!(found[0].name, "new");
        assert_eq!(found[0].updated_at, Some(1700000500));
    }

    #[test]
    fn test_kind_roundtrip() {
        let (db, _dir) = setup_db();
        let conn = db.connection();
        let ch_id = make_challenge(conn, "u1");

        Task::new(ch_id, "a", TaskKind::Quick, None, None, 0)
            .save(conn)
            .unwrap();
        Task::new(ch_id, "b", TaskKind::Main, None, None, 0)
            .save(conn)
            .unwrap();

        let found = Task::find_for_challenge(conn, ch_id).unwrap();
        assert_eq!(found[0].kind, TaskKind::Quick);
        assert_eq!(found[1].kind, TaskKind::Main);
    }
}
