pub mod migrations;
pub mod schema;

use directories::ProjectDirs;
use rusqlite::{Connection, Result};
use std::path::PathBuf;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &PathBuf) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open the database at the platform data directory, creating it if
    /// needed. Callers embedding the crate usually prefer `open` with an
    /// explicit path.
    pub fn open_default() -> Result<Self> {
        Self::open(&default_db_path())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

pub fn default_db_path() -> PathBuf {
    let proj_dirs = ProjectDirs::from("com", "momentum", "Momentum")
        .expect("Could not determine project directories");
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).expect("Could not create data directory");
    data_dir.join("momentum.db")
}
