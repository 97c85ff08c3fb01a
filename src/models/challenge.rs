use chrono::NaiveDate;
use rusqlite::{params, Connection, Result};
use serde::{Deserialize, Serialize};

/// A user-defined recurring goal, parent of many task records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Option<i64>,
    pub user_id: String,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Display/sort position within the user's challenge list.
    pub position: i64,
    pub created_at: i64,
}

impl Challenge {
    pub fn new(
        user_id: &str,
        title: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        position: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            title: title.to_string(),
            start_date,
            end_date,
            position,
            created_at,
        }
    }

    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO challenges (user_id, title, start_date, end_date, position, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.user_id,
                self.title,
                self.start_date,
                self.end_date,
                self.position,
                self.created_at,
            ],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    pub fn find_all(conn: &Connection, user_id: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, start_date, end_date, position, created_at
             FROM challenges WHERE user_id = ?1 ORDER BY position ASC",
        )?;

        let rows = stmt.query_map(params![user_id], Self::from_row)?;
        rows.collect()
    }

    pub fn find(conn: &Connection, user_id: &str, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, start_date, end_date, position, created_at
             FROM challenges WHERE user_id = ?1 AND id = ?2",
        )?;

        let mut rows = stmt.query_map(params![user_id, id], Self::from_row)?;
        rows.next().transpose()
    }

    pub fn count(conn: &Connection, user_id: &str) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM challenges WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
    }

    /// Update title and date range. Returns the number of affected rows.
    pub fn update_details(
        conn: &Connection,
        user_id: &str,
        id: i64,
        title: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<usize> {
        conn.execute(
            "UPDATE challenges SET title = ?1, start_date = ?2, end_date = ?3
             WHERE user_id = ?4 AND id = ?5",
            params![title, start_date, end_date, user_id, id],
        )
    }

    pub fn set_position(conn: &Connection, user_id: &str, id: i64, position: i64) -> Result<usize> {
        conn.execute(
            "UPDATE challenges SET position = ?1 WHERE user_id = ?2 AND id = ?3",
            params![position, user_id, id],
        )
    }

    pub fn delete(conn: &Connection, user_id: &str, id: i64) -> Result<usize> {
        conn.execute(
            "DELETE FROM challenges WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )
    }

    /// Whether `day` is acceptable for a task belonging to this challenge.
    /// An open-ended side of the range accepts any day.
    pub fn contains_day(&self, day: NaiveDate) -> bool {
        if let Some(start) = self.start_date {
            if day < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if day > end {
                return false;
            }
        }
        true
    }

    fn from_row(row: &rusqlite::Row<'_>) -> Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            user_id: row.get(1)?,
            title: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            position: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
