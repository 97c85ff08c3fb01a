use rusqlite::{params, Connection, Result};
use serde::{Deserialize, Serialize};

/// A named focus target for pomodoro sessions. Separate from challenge
/// tasks: sessions reference these, not dated to-do items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusTask {
    pub id: Option<i64>,
    pub user_id: String,
    pub name: String,
    /// Number of terminal sessions (completed or skipped) recorded
    /// against this task.
    pub counter: i64,
    pub created_at: i64,
}

impl FocusTask {
    pub fn new(user_id: &str, name: &str, created_at: i64) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            name: name.to_string(),
            counter: 0,
            created_at,
        }
    }

    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO focus_tasks (user_id, name, counter, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![self.user_id, self.name, self.counter, self.created_at],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    pub fn find_all(conn: &Connection, user_id: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, counter, created_at
             FROM focus_tasks WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(Self {
                id: Some(row.get(0)?),
                user_id: row.get(1)?,
                name: row.get(2)?,
                counter: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    pub fn increment_counter(conn: &Connection, user_id: &str, id: i64) -> Result<usize> {
        conn.execute(
            "UPDATE focus_tasks SET counter = counter + 1 WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )
    }
}
